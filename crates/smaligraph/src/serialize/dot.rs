//! Digraph text writer (§6): `digraph { <node> [...]; <edge>; ... }`, one
//! color per owning class chosen at random from a fixed pool — matching
//! `output_graph.py`'s `random.choice(color_list)` per `gen_class_name`,
//! not a deterministic assignment.

use crate::views::GraphView;
use rand::seq::SliceRandom;
use std::collections::HashMap;

const COLOR_POOL: &[&str] = &[
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
    "#bcf60c", "#fabebe", "#008080", "#e6beff", "#9a6324", "#800000", "#808000", "#000075",
];

fn node_id(prefix: &str, id: usize) -> String {
    format!("{prefix}{id}")
}

/// Render a complete view as `digraph { ... }` text.
pub fn render(view: &GraphView) -> String {
    let mut rng = rand::thread_rng();
    let mut class_colors: HashMap<usize, &str> = HashMap::new();

    // A node's own `dot_id_prefix` only describes how *it* is declared — in
    // the hybrid view an edge can cross from an expanded block (`i`-prefixed)
    // to a plain method node (unprefixed) or back, so the destination id must
    // be looked up by the target node's own prefix, not inherited from the
    // source (§6: "block-originated ids within an expanded method are
    // prefixed `i` to avoid collision with method ids").
    let prefix_of: HashMap<usize, &'static str> =
        view.nodes.iter().map(|n| (n.id, n.dot_id_prefix)).collect();

    let mut out = String::from("digraph {\n");

    for node in &view.nodes {
        let color = *class_colors
            .entry(node.class_index)
            .or_insert_with(|| COLOR_POOL.choose(&mut rng).unwrap_or(&COLOR_POOL[0]));

        let label = if node.instruction_lines.is_empty() {
            node.label.clone()
        } else {
            node.instruction_lines.join("\\l") + "\\l"
        };
        let escaped = label.replace('$', "\u{2022}").replace('"', "'");

        out.push_str(&format!(
            "  {} [shape=box color=\"{}\" label=\"{}\"];\n",
            node_id(node.dot_id_prefix, node.id),
            color,
            escaped,
        ));
    }

    for node in &view.nodes {
        let src = node_id(node.dot_id_prefix, node.id);
        for &child in &node.children {
            let child_prefix = prefix_of.get(&child).copied().unwrap_or("");
            out.push_str(&format!("  {} -> {};\n", src, node_id(child_prefix, child)));
        }
    }

    out.push_str("}\n");
    out
}
