//! Hybrid view: methods that directly call into an "expansion set" are
//! expanded to full block-granularity CFG subgraphs; every other method
//! stays a single FCG node (§4.7).
//!
//! Node and edge ids are rewritten into a dense `0..N` range via a
//! translation table, since block ids and method ids otherwise share no
//! common numbering and would collide once mixed in one view.

use super::{GraphView, ViewNode};
use crate::ir::ids::{BlockId, MethodId};
use crate::ir::Program;
use std::collections::{HashMap, HashSet};

/// One entry of an expansion-methods file: `ClassName::methodName` or the
/// wildcard form `ClassName::*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionTarget {
    pub class_name: String,
    /// `None` for the `ClassName::*` wildcard form.
    pub method_name: Option<String>,
}

/// Parse an expansion-methods file (§6): one entry per line, blank lines and
/// any line containing `#` discarded.
pub fn parse_expansion_file(text: &str) -> Vec<ExpansionTarget> {
    text.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.contains('#'))
        .filter_map(|l| {
            let (class_name, method_name) = l.split_once("::")?;
            let method_name = if method_name == "*" {
                None
            } else {
                Some(method_name.to_string())
            };
            Some(ExpansionTarget {
                class_name: class_name.to_string(),
                method_name,
            })
        })
        .collect()
}

/// Intern `key` into the dense id space, allocating the next id the first
/// time it is seen.
fn intern(table: &mut HashMap<usize, usize>, next_id: &mut usize, key: usize) -> usize {
    *table.entry(key).or_insert_with(|| {
        let id = *next_id;
        *next_id += 1;
        id
    })
}

pub fn build(program: &Program, expansion_targets: &[ExpansionTarget]) -> GraphView {
    let mut method_name_index: HashMap<String, Vec<MethodId>> = HashMap::new();
    let mut block_method: HashMap<BlockId, MethodId> = HashMap::new();
    let mut method_entry_block: HashMap<MethodId, BlockId> = HashMap::new();

    for class in &program.classes {
        for method in &class.methods {
            method_name_index
                .entry(format!("{}::{}", class.short_name, method.name))
                .or_default()
                .push(method.id);
            method_entry_block.insert(method.id, method.entry_block_id());
            for block in &method.basic_blocks {
                block_method.insert(block.id, method.id);
            }
        }
    }

    let exp_method_ids: HashSet<MethodId> = expansion_targets
        .iter()
        .flat_map(|target| {
            method_name_index.iter().filter_map(move |(key, ids)| {
                let class_part = key.split("::").next().unwrap_or("");
                let matches = match &target.method_name {
                    None => class_part == target.class_name,
                    Some(m) => key.as_str() == format!("{}::{}", target.class_name, m),
                };
                matches.then(|| ids.clone())
            })
        })
        .flatten()
        .collect();

    let mut expanded_methods: HashSet<MethodId> = HashSet::new();
    for class in &program.classes {
        for method in &class.methods {
            if method.calls_out.iter().any(|callee| exp_method_ids.contains(callee)) {
                expanded_methods.insert(method.id);
            }
        }
    }

    let mut translate: HashMap<usize, usize> = HashMap::new();
    let mut next_id = 0usize;
    let mut nodes = Vec::new();

    for (class_index, class) in program.classes.iter().enumerate() {
        for method in &class.methods {
            if expanded_methods.contains(&method.id) {
                let intra_ids: HashSet<BlockId> = method.basic_blocks.iter().map(|b| b.id).collect();

                for block in &method.basic_blocks {
                    let id = intern(&mut translate, &mut next_id, block.id.as_usize());
                    let kinds = block.instructions.iter().map(|i| i.kind).collect();
                    let last_kind = block.instructions.last().map(|i| i.kind);
                    let degree = block.parent_ids.len() + block.child_ids.len();
                    let instruction_lines = block
                        .instructions
                        .iter()
                        .map(|i| format!("{}: {}", i.line_num, i.label_text()))
                        .collect();

                    let children = block
                        .child_ids
                        .iter()
                        .map(|&child| {
                            if intra_ids.contains(&child) {
                                intern(&mut translate, &mut next_id, child.as_usize())
                            } else {
                                // Crosses into another method: the edge always lands on that
                                // method's entry block, whether or not that method is itself
                                // expanded (§4.7) — only the translation key differs in intent,
                                // not in value, since an expanded callee's node *is* its entry
                                // block and an unexpanded callee's node is also keyed by it.
                                let target_method = block_method.get(&child).copied();
                                let key = target_method
                                    .and_then(|m| method_entry_block.get(&m))
                                    .map(|b| b.as_usize())
                                    .unwrap_or_else(|| child.as_usize());
                                intern(&mut translate, &mut next_id, key)
                            }
                        })
                        .collect();

                    nodes.push(ViewNode {
                        id,
                        label: String::new(),
                        instruction_lines,
                        raw_texts: Vec::new(),
                        kinds,
                        last_kind,
                        degree,
                        children,
                        dot_id_prefix: "i",
                        class_index,
                    });
                }
            } else {
                let entry_block_id = method.entry_block_id();
                let id = intern(&mut translate, &mut next_id, entry_block_id.as_usize());
                let kinds = method
                    .basic_blocks
                    .iter()
                    .flat_map(|b| b.instructions.iter().map(|i| i.kind))
                    .collect();
                let degree = method.calls_in.len() + method.calls_out.len();

                let children = method
                    .calls_out
                    .iter()
                    .filter_map(|callee| method_entry_block.get(callee))
                    .map(|entry| intern(&mut translate, &mut next_id, entry.as_usize()))
                    .collect();

                nodes.push(ViewNode {
                    id,
                    label: format!("{}::{}", class.short_name, method.name),
                    instruction_lines: Vec::new(),
                    raw_texts: Vec::new(),
                    kinds,
                    last_kind: None,
                    degree,
                    children,
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
