//! COO (coordinate sparse matrix) text writer (§6), grounded directly on
//! `original_source/output_graph.py`'s `output_cfg_coo`/`output_fcg_coo` and
//! `cfgexplainer_extract.py`'s `output_cfgexplainer_coo`.
//!
//! The textual list/dict rendering below follows Python's `str()` of a list
//! of ints closely enough to be a drop-in replacement, but the spec's
//! serializer-freedom non-goal means this is not byte-for-byte identical to
//! the original's `repr()` — notably Python's string-quoting rules for the
//! verbose-nodes instruction dump are approximated, not reproduced exactly.

use crate::features::{self, Layout};
use crate::lexicon::Kind;
use crate::views::GraphView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `output_cfg_coo`/`output_fcg_coo`: Summary (11-wide) feature layout,
    /// no adjacency value list.
    Standard,
    /// `output_cfgexplainer_coo`: Extended (12-wide) feature layout, plus a
    /// parallel adjacency-value list (`2` for an invoke-terminated edge, `1`
    /// otherwise).
    CfgExplainer,
}

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub variant: Variant,
    /// Append the trailing `{node_id: [instruction, ...]}` block.
    pub verbose_nodes: bool,
}

fn python_int_list(values: &[i64]) -> String {
    let joined = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
    format!("[{joined}]")
}

fn python_matrix(rows: &[Vec<i64>]) -> String {
    let joined = rows.iter().map(|r| python_int_list(r)).collect::<Vec<_>>().join(", ");
    format!("[{joined}]")
}

fn python_str_literal(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn python_string_list(values: &[String]) -> String {
    let joined = values.iter().map(|v| python_str_literal(v)).collect::<Vec<_>>().join(", ");
    format!("[{joined}]")
}

/// Render a view's COO text per the options' variant.
pub fn render(view: &GraphView, options: Options) -> String {
    let layout = match options.variant {
        Variant::Standard => Layout::Summary,
        Variant::CfgExplainer => Layout::Extended,
    };

    let mut feature_matrix = Vec::with_capacity(view.nodes.len());
    let mut feature_row = Vec::with_capacity(view.nodes.len());
    let feature_col = vec![0i64; view.nodes.len()];

    let mut adjacency_val = Vec::new();
    let mut adjacency_row = Vec::new();
    let mut adjacency_col = Vec::new();

    for node in &view.nodes {
        feature_matrix.push(features::project(layout, node.kinds.iter().copied(), node.degree, view.total_instructions));
        feature_row.push(node.id as i64);

        for &child in &node.children {
            adjacency_row.push(child as i64);
            adjacency_col.push(node.id as i64);
            if options.variant == Variant::CfgExplainer {
                adjacency_val.push(if node.last_kind == Some(Kind::Invoke) { 2 } else { 1 });
            }
        }
    }

    let width = layout.width();
    let mut out = format!("{},{}\n\n", view.nodes.len(), width);
    out.push_str(&python_matrix(&feature_matrix));
    out.push('\n');
    out.push_str(&python_int_list(&feature_row));
    out.push('\n');
    out.push_str(&python_int_list(&feature_col));
    out.push_str("\n\n");

    if options.variant == Variant::CfgExplainer {
        out.push_str(&python_int_list(&adjacency_val));
        out.push('\n');
    }
    out.push_str(&python_int_list(&adjacency_row));
    out.push('\n');
    out.push_str(&python_int_list(&adjacency_col));
    out.push('\n');

    if options.verbose_nodes {
        out.push('\n');
        let entries = view
            .nodes
            .iter()
            .map(|n| format!("{}: {}", n.id, python_string_list(&n.raw_texts)))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("{{{entries}}}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::ViewNode;

    fn node(id: usize, kinds: Vec<Kind>, last_kind: Option<Kind>, children: Vec<usize>) -> ViewNode {
        let degree = children.len();
        ViewNode {
            id,
            label: String::new(),
            instruction_lines: Vec::new(),
            raw_texts: vec!["return-void".to_string()],
            kinds,
            last_kind,
            degree,
            children,
            dot_id_prefix: "",
            class_index: 0,
        }
    }

    #[test]
    fn header_line_reports_node_count_and_feature_width() {
        let view = GraphView {
            nodes: vec![node(0, vec![Kind::Return], Some(Kind::Return), vec![])],
            total_instructions: 1,
        };
        let text = render(&view, Options { variant: Variant::Standard, verbose_nodes: false });
        assert!(text.starts_with("1,11\n\n"));
    }

    #[test]
    fn cfgexplainer_variant_uses_extended_width_and_adjacency_values() {
        let view = GraphView {
            nodes: vec![
                node(0, vec![Kind::Invoke], Some(Kind::Invoke), vec![1]),
                node(1, vec![Kind::Return], Some(Kind::Return), vec![]),
            ],
            total_instructions: 2,
        };
        let text = render(&view, Options { variant: Variant::CfgExplainer, verbose_nodes: false });
        assert!(text.starts_with("2,12\n\n"));
        assert!(text.contains("[2]"));
    }

    #[test]
    fn verbose_nodes_appends_instruction_dump() {
        let view = GraphView {
            nodes: vec![node(0, vec![], None, vec![])],
            total_instructions: 0,
        };
        let text = render(&view, Options { variant: Variant::Standard, verbose_nodes: true });
        assert!(text.trim_end().ends_with("{0: ['return-void']}"));
    }
}
