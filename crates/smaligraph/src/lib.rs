//! smaligraph — interprocedural program graph extraction from disassembled
//! Android (smali) applications.
//!
//! This crate turns a decompiled APK's `smali/` tree into CFG, FCG, or
//! hybrid program graphs, serialized as either digraph text or COO sparse
//! matrices, for use as GNN malware-classifier inputs.

pub mod driver;
pub mod errors;
pub mod features;
pub mod ir;
pub mod lexicon;
pub mod malgraph;
pub mod manifest;
pub mod parser;
pub mod resolve;
pub mod serialize;
pub mod views;

pub use anyhow::{Context, Result};
use std::path::Path;
use views::cfg::DegreeMode;
use views::GraphView;

/// Which projection of the resolved program to assemble (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Cfg,
    Fcg,
    Hybrid,
}

/// Which text format to serialize a view into (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Dot,
    Coo(serialize::coo::Variant),
}

/// End-to-end extraction: parse the app rooted at `root`, resolve it, and
/// assemble the requested view, ready to hand to a [`serialize`] writer.
///
/// `expansion_targets` is only consulted for [`ViewKind::Hybrid`]. `format`
/// decides a CFG view's degree accounting: the CFGExplainer COO variant
/// counts only children, every other format counts parents and children
/// (§4.6, `views::cfg::DegreeMode`). Returns the assembled view plus, when
/// `collect_malgraph_counts` is set, the library-call tally gathered before
/// resolution drained it (§10).
pub fn extract(
    root: &Path,
    view_kind: ViewKind,
    format: OutputFormat,
    expansion_targets: &[views::hybrid::ExpansionTarget],
    collect_malgraph_counts: bool,
) -> Result<(GraphView, ir::Program, Option<std::collections::HashMap<String, u64>>)> {
    let (program, counts) = driver::build_program(root, collect_malgraph_counts)?;

    let degree_mode = match format {
        OutputFormat::Coo(serialize::coo::Variant::CfgExplainer) => DegreeMode::CfgExplainer,
        _ => DegreeMode::Standard,
    };

    let view = match view_kind {
        ViewKind::Cfg => views::cfg::build(&program, degree_mode),
        ViewKind::Fcg => views::fcg::build(&program),
        ViewKind::Hybrid => views::hybrid::build(&program, expansion_targets),
    };

    Ok((view, program, counts))
}

/// Render an assembled view in the requested format (§6).
pub fn render(view: &GraphView, format: OutputFormat) -> String {
    match format {
        OutputFormat::Dot => serialize::dot::render(view),
        OutputFormat::Coo(variant) => serialize::coo::render(
            view,
            serialize::coo::Options { variant, verbose_nodes: false },
        ),
    }
}
