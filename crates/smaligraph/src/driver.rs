//! C10 core logic: the file-queue-as-cursor-loop driver that wires the
//! manifest reader, line parser, and resolvers together (§5), reusable by
//! both the CLI binary and integration tests.

use crate::errors::GraphError;
use crate::ir::Program;
use crate::malgraph;
use crate::manifest;
use crate::parser::Parser;
use crate::resolve;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Parse every file reachable from the manifest's declared activities (and
/// whatever cross-class invocations discover along the way) into a fully
/// resolved [`Program`] rooted at `root` (§5).
///
/// When `collect_malgraph_counts` is set, library-call counts are tallied
/// before [`resolve::resolve_library`] drains the per-class invocation
/// lists that carry them (§10).
pub fn build_program(root: &Path, collect_malgraph_counts: bool) -> Result<(Program, Option<HashMap<String, u64>>)> {
    let manifest_path = root.join("AndroidManifest.xml");
    let manifest_text = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read manifest at {}", manifest_path.display()))?;

    let activity_files = manifest::extract_activity_files(&manifest_text)?;
    if activity_files.is_empty() {
        log::error!("no activities found in manifest at {}", manifest_path.display());
        return Err(GraphError::NoEntryPoints { path: manifest_path.display().to_string() }.into());
    }
    for permission in manifest::extract_permissions(&manifest_text)? {
        log::info!("declared permission: {permission}");
    }

    let mut program = Program::new(activity_files);
    let mut cursor = 0;
    while cursor < program.file_queue.len() {
        let relative = program.file_queue[cursor].clone();
        cursor += 1;
        let file_path = root.join(&relative);

        let text = match std::fs::read_to_string(&file_path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("file {} not found on disk, treating as unresolved: {err}", file_path.display());
                continue;
            }
        };

        log::debug!("parsing {}", file_path.display());
        let mut parser = Parser::new(&mut program);
        for (i, line) in text.lines().enumerate() {
            parser.process_line(line, i + 1);
        }
        for warning in &parser.warnings {
            log::warn!("{warning}");
        }
        parser.finish_file();
    }

    let counts = collect_malgraph_counts.then(|| malgraph::count_library_calls(&program));

    for warning in resolve::resolve_cross_class(&mut program) {
        log::warn!("{warning}");
    }
    for warning in resolve::resolve_library(&mut program) {
        log::warn!("{warning}");
    }

    Ok((program, counts))
}
