//! CFG view: one node per basic block, edges to its children (§4.7).

use super::{GraphView, ViewNode};
use crate::ir::Program;

/// How a node's `degree` slot is computed — the standard summary feature
/// vector counts parents and children, the CFGExplainer variant counts only
/// children (`original_source/cfgexplainer_extract.py` vs. `output_graph.py`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeMode {
    Standard,
    CfgExplainer,
}

pub fn build(program: &Program, degree_mode: DegreeMode) -> GraphView {
    let mut nodes = Vec::new();

    for (class_index, class) in program.classes.iter().enumerate() {
        for method in &class.methods {
            for block in &method.basic_blocks {
                let kinds = block.instructions.iter().map(|i| i.kind).collect();
                let last_kind = block.instructions.last().map(|i| i.kind);
                let degree = match degree_mode {
                    DegreeMode::Standard => block.parent_ids.len() + block.child_ids.len(),
                    DegreeMode::CfgExplainer => block.child_ids.len(),
                };
                let instruction_lines = block
                    .instructions
                    .iter()
                    .map(|i| format!("{}: {}", i.line_num, i.label_text()))
                    .collect();
                let raw_texts = block.instructions.iter().map(|i| i.text.clone()).collect();

                nodes.push(ViewNode {
                    id: block.id.as_usize(),
                    label: String::new(),
                    instruction_lines,
                    raw_texts,
                    kinds,
                    last_kind,
                    degree,
                    children: block.child_ids.iter().map(|c| c.as_usize()).collect(),
                    dot_id_prefix: "",
                    class_index,
                });
            }
        }
    }

    GraphView {
        nodes,
        total_instructions: program.total_instructions().saturating_sub(1),
    }
}
