//! MalGraph library-call counts (§10 supplemental feature), grounded on
//! `original_source/malgraph_extract.py`'s `extract_library_functions`: a
//! JSON side-file tallying how many times each distinct library call site
//! is invoked, merged with any counts already on disk.
//!
//! Counting must happen before [`crate::resolve::resolve_library`] drains
//! a class's `library` invocation list — the call *count* would otherwise
//! be lost to the dedup the method-level `calls_in`/`calls_out` sets apply.

use crate::ir::Program;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryCallCount {
    pub count: u64,
    pub method_id: usize,
}

fn bare_name_of(signature: &str) -> &str {
    signature.split('(').next().unwrap_or("")
}

/// Tally every library invocation still pending on `program`, keyed
/// `"{target_class_path}-{bare_method_name}"`. Must run before
/// [`crate::resolve::resolve_library`] is called.
pub fn count_library_calls(program: &Program) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for class in &program.classes {
        for inv in &class.library {
            let key = format!("{}-{}", inv.target_class_path, bare_name_of(&inv.target_method_sig));
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

/// Resolve each counted key to its synthesized stub method's id in the
/// now-resolved `program`, merge with whatever counts file already exists
/// at `path`, and write the result back out.
pub fn write_counts_file(path: &Path, program: &Program, counts: &HashMap<String, u64>) -> Result<()> {
    let mut existing: HashMap<String, LibraryCallCount> = if path.exists() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read existing counts file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("malformed counts file {}", path.display()))?
    } else {
        HashMap::new()
    };

    for (key, count) in counts {
        let method_id = resolve_method_id(program, key);
        existing
            .entry(key.clone())
            .and_modify(|entry| entry.count += count)
            .or_insert(LibraryCallCount { count: *count, method_id });
    }

    let json = serde_json::to_string(&existing).context("failed to serialize library call counts")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

fn resolve_method_id(program: &Program, key: &str) -> usize {
    let Some((class_path, method_name)) = key.rsplit_once('-') else {
        return 0;
    };
    program
        .find_class_by_full_path(class_path)
        .and_then(|id| program.class(id))
        .and_then(|class| class.find_method_by_name(method_name))
        .map(|id| id.as_usize())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Class, ExternalInvocation};

    #[test]
    fn tallies_repeated_library_calls_by_class_and_method() {
        let mut program = Program::new(Vec::new());
        let a_id = program.alloc_class_id();
        let m_id = program.alloc_method_id();
        let b_id = program.alloc_block_id();
        let mut class = Class::new(a_id, "A".into(), "com/app".into());
        for _ in 0..3 {
            class.library.push(ExternalInvocation {
                source_method: m_id,
                source_block: b_id,
                target_class_path: "java/lang/StringBuilder".into(),
                target_method_sig: "append(Ljava/lang/String;)Ljava/lang/StringBuilder;".into(),
            });
        }
        program.add_class(class);

        let counts = count_library_calls(&program);
        assert_eq!(counts.get("java/lang/StringBuilder-append"), Some(&3));
    }
}
