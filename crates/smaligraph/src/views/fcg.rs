//! FCG view: one node per method, edges to its outgoing callees (§4.7).

use super::{GraphView, ViewNode};
use crate::ir::Program;

pub fn build(program: &Program) -> GraphView {
    let mut nodes = Vec::new();

    for (class_index, class) in program.classes.iter().enumerate() {
        for method in &class.methods {
            let kinds = method
                .basic_blocks
                .iter()
                .flat_map(|b| b.instructions.iter().map(|i| i.kind))
                .collect();
            let degree = method.calls_in.len() + method.calls_out.len();

            nodes.push(ViewNode {
                id: method.id.as_usize(),
                label: format!("{}::{}", class.short_name, method.name),
                instruction_lines: Vec::new(),
                raw_texts: Vec::new(),
                kinds,
                last_kind: None,
                degree,
                children: method.calls_out.iter().map(|m| m.as_usize()).collect(),
                dot_id_prefix: "",
                class_index,
            });
        }
    }

    GraphView {
        nodes,
        total_instructions: program.total_instructions().saturating_sub(1),
    }
}
