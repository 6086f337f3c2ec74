//! C4: intra-class resolution, run once per class immediately after its
//! last line has been parsed (§4.4).

use crate::ir::{Class, Method};

/// Expand a method's pending `(label, caller_block)` calls into concrete
/// child/parent block edges, following the switch alias table where the
/// label names a switch-table key. Unresolved entries are reported, not
/// dropped.
pub fn resolve_labels(method: &mut Method) -> Vec<String> {
    let mut warnings = Vec::new();
    let pending = std::mem::take(&mut method.pending_label_calls);

    for (label, caller_block) in pending {
        let targets = method
            .label_aliases
            .get(&label)
            .cloned()
            .unwrap_or_else(|| vec![label.clone()]);

        for target_label in targets {
            match method.find_block_by_leader_text(&target_label) {
                Some(target_id) => {
                    if let Some(caller) = method.block_mut(caller_block) {
                        caller.add_child(target_id);
                    }
                    if let Some(target) = method.block_mut(target_id) {
                        target.add_parent(caller_block);
                    }
                }
                None => warnings.push(format!(
                    "unresolved label call {label} (alias {target_label}) from block {caller_block}"
                )),
            }
        }
    }

    warnings
}

/// Resolve a class's recorded `invoke-direct` calls against its own method
/// table. Per §9 Open Question 1, only invocations already classified as
/// intra-class (which requires `invoke-direct`) reach this list; the
/// restriction is enforced at classification time, not here.
pub fn resolve_local_invocations(class: &mut Class) -> Vec<String> {
    let mut warnings = Vec::new();
    let invocations = std::mem::take(&mut class.intra_class);

    for inv in invocations {
        let bare_name = inv.target_method_sig.split('(').next().unwrap_or("");
        let Some(target_method) = class.find_method_by_name(bare_name) else {
            warnings.push(format!("unresolved intra-class call to {}", inv.target_method_sig));
            continue;
        };
        link_intra(class, inv.source_method, inv.source_block, target_method, &mut warnings);
    }

    warnings
}

/// Link a resolved call site to its target method within a single class:
/// block-level call edge, method-level call edge, and (§4.4's return-edge
/// policy) a block- and method-level back edge when the target is non-void.
fn link_intra(
    class: &mut Class,
    source_method: crate::ir::MethodId,
    source_block: crate::ir::BlockId,
    target_method: crate::ir::MethodId,
    warnings: &mut Vec<String>,
) {
    let target_entry = match class.method(target_method) {
        Some(m) if !m.basic_blocks.is_empty() => m.entry_block_id(),
        _ => {
            warnings.push("intra-class call target has no blocks".to_string());
            return;
        }
    };

    if let Some(method) = class.method_mut(source_method) {
        if let Some(block) = method.block_mut(source_block) {
            block.add_child(target_entry);
        }
    }
    if let Some(method) = class.method_mut(target_method) {
        if let Some(entry) = method.block_mut(target_entry) {
            entry.add_parent(source_block);
        }
    }
    if let Some(method) = class.method_mut(source_method) {
        method.calls_out.insert(target_method);
    }
    if let Some(method) = class.method_mut(target_method) {
        method.calls_in.insert(source_method);
    }

    let is_void = class.method(target_method).map(|m| m.is_void()).unwrap_or(true);
    if is_void {
        return;
    }

    let Some(target_last) = class.method(target_method).map(|m| m.last_block_id()) else {
        return;
    };

    if let Some(method) = class.method_mut(target_method) {
        if let Some(last) = method.block_mut(target_last) {
            last.add_child(source_block);
        }
    }
    if let Some(method) = class.method_mut(source_method) {
        if let Some(block) = method.block_mut(source_block) {
            block.add_parent(target_last);
        }
    }
    // §9 Open Question 2: the return edge also registers a method-level
    // back edge (callee -> caller). Implemented verbatim, not "fixed".
    if let Some(method) = class.method_mut(target_method) {
        method.calls_out.insert(source_method);
    }
    if let Some(method) = class.method_mut(source_method) {
        method.calls_in.insert(target_method);
    }
}
