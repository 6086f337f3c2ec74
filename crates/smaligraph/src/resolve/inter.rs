//! C5: interprocedural resolution, run once after every file has been
//! parsed (§4.5).

use crate::ir::ids::{BlockId, ClassId, MethodId};
use crate::ir::{BasicBlock, Class, Instruction, Method, Program};
use crate::lexicon::Kind;

/// Resolve every class's recorded cross-class calls against the whole
/// program's class/method tables. A failed lookup skips that one
/// invocation and continues with the rest (§9 Open Question 4).
pub fn resolve_cross_class(program: &mut Program) -> Vec<String> {
    let mut warnings = Vec::new();
    let work = drain_invocations(program, |class| &mut class.cross_class);

    for (src_idx, inv) in work {
        let target_short_name = short_name_of(&inv.target_class_path);
        let Some(target_class_id) = program.find_class_by_short_name(target_short_name) else {
            warnings.push(format!("unresolved cross-class target: {}", inv.target_class_path));
            continue;
        };
        let Some(target_idx) = class_index(program, target_class_id) else {
            continue;
        };

        let bare_name = bare_name_of(&inv.target_method_sig);
        let Some(target_method_id) = program.classes[target_idx].find_method_by_name(bare_name) else {
            warnings.push(format!(
                "unresolved cross-class method: {}::{}",
                inv.target_class_path, inv.target_method_sig
            ));
            continue;
        };

        link_cross_class(
            program,
            src_idx,
            inv.source_method,
            inv.source_block,
            target_idx,
            target_method_id,
            &mut warnings,
        );
    }

    warnings
}

/// Resolve every class's recorded library calls, synthesizing a stub
/// class/method pair the first time a given `(target_class, bare_name,
/// param_list, return_type)` tuple is seen (§4.5, testable property 6).
pub fn resolve_library(program: &mut Program) -> Vec<String> {
    let mut warnings = Vec::new();
    let work = drain_invocations(program, |class| &mut class.library);

    for (src_idx, inv) in work {
        let Some((bare_name, param_types, return_type)) =
            Method::parse_directive(&format!(".method public final {}", inv.target_method_sig))
        else {
            warnings.push(format!("malformed library call signature: {}", inv.target_method_sig));
            continue;
        };

        let target_class_id = match program.find_class_by_full_path(&inv.target_class_path) {
            Some(id) => id,
            None => match synthesize_class(program, &inv.target_class_path) {
                Some(id) => id,
                None => {
                    warnings.push(format!("malformed library target class: {}", inv.target_class_path));
                    continue;
                }
            },
        };
        let target_idx = class_index(program, target_class_id).expect("class just found or inserted");

        let existing = program.classes[target_idx]
            .methods
            .iter()
            .find(|m| m.name == bare_name && m.param_types == param_types && m.return_type == return_type)
            .map(|m| m.id);

        let target_method_id = existing.unwrap_or_else(|| {
            synthesize_method(program, target_idx, target_class_id, &inv, bare_name, param_types, return_type)
        });

        link_cross_class(
            program,
            src_idx,
            inv.source_method,
            inv.source_block,
            target_idx,
            target_method_id,
            &mut warnings,
        );
    }

    warnings
}

/// Drain one invocation list (cross-class or library) out of every class,
/// tagged with the owning class's index in `program.classes` so the caller
/// can look the owner back up once resolution needs to mutate it.
fn drain_invocations<T>(
    program: &mut Program,
    select: impl Fn(&mut Class) -> &mut Vec<T>,
) -> Vec<(usize, T)> {
    let mut work = Vec::new();
    for (idx, class) in program.classes.iter_mut().enumerate() {
        for inv in std::mem::take(select(class)) {
            work.push((idx, inv));
        }
    }
    work
}

fn short_name_of(full_path: &str) -> &str {
    full_path.rsplit('/').next().unwrap_or(full_path)
}

fn bare_name_of(signature: &str) -> &str {
    signature.split('(').next().unwrap_or("")
}

fn class_index(program: &Program, id: ClassId) -> Option<usize> {
    program.classes.iter().position(|c| c.id == id)
}

fn synthesize_class(program: &mut Program, target_class_path: &str) -> Option<ClassId> {
    let (short_name, path) = Class::parse_header(&format!(".class public final L{target_class_path};"))?;
    let id = program.alloc_class_id();
    program.add_class(Class::new(id, short_name, path));
    Some(id)
}

/// Build a stub method with a single dummy block whose sole instruction
/// records the original `target_class -> target_method` text, mirroring
/// the reference implementation's placeholder instruction for unresolved
/// library bodies (§4.5).
fn synthesize_method(
    program: &mut Program,
    target_idx: usize,
    target_class_id: ClassId,
    inv: &crate::ir::ExternalInvocation,
    bare_name: String,
    param_types: Vec<String>,
    return_type: String,
) -> MethodId {
    let method_id = program.alloc_method_id();
    let block_id = program.alloc_block_id();
    let instr_id = program.alloc_instr_id();
    let text = format!("{} -> {}", inv.target_class_path, inv.target_method_sig);
    let instr = Instruction::new(instr_id, text, Kind::Dummy, 0, block_id, method_id, target_class_id);

    let mut method = Method::new(method_id, bare_name, param_types, return_type);
    method.basic_blocks.push(BasicBlock::new(block_id, instr));
    program.classes[target_idx].methods.push(method);
    method_id
}

/// Link a resolved call site across (possibly the same) two classes:
/// block-level call edge, method-level call edge, and the §4.4 return-edge
/// policy when the target is non-void.
fn link_cross_class(
    program: &mut Program,
    src_idx: usize,
    source_method: MethodId,
    source_block: BlockId,
    target_idx: usize,
    target_method: MethodId,
    warnings: &mut Vec<String>,
) {
    let target_entry = match program.classes[target_idx].method(target_method) {
        Some(m) if !m.basic_blocks.is_empty() => m.entry_block_id(),
        _ => {
            warnings.push("cross-class call target has no blocks".to_string());
            return;
        }
    };

    if let Some(method) = program.classes[src_idx].method_mut(source_method) {
        if let Some(block) = method.block_mut(source_block) {
            block.add_child(target_entry);
        }
    }
    if let Some(method) = program.classes[target_idx].method_mut(target_method) {
        if let Some(entry) = method.block_mut(target_entry) {
            entry.add_parent(source_block);
        }
    }
    if let Some(method) = program.classes[src_idx].method_mut(source_method) {
        method.calls_out.insert(target_method);
    }
    if let Some(method) = program.classes[target_idx].method_mut(target_method) {
        method.calls_in.insert(source_method);
    }

    let is_void = program.classes[target_idx]
        .method(target_method)
        .map(|m| m.is_void())
        .unwrap_or(true);
    if is_void {
        return;
    }

    let Some(target_last) = program.classes[target_idx].method(target_method).map(|m| m.last_block_id()) else {
        return;
    };

    if let Some(method) = program.classes[target_idx].method_mut(target_method) {
        if let Some(last) = method.block_mut(target_last) {
            last.add_child(source_block);
        }
    }
    if let Some(method) = program.classes[src_idx].method_mut(source_method) {
        if let Some(block) = method.block_mut(source_block) {
            block.add_parent(target_last);
        }
    }
    if let Some(method) = program.classes[target_idx].method_mut(target_method) {
        method.calls_out.insert(source_method);
    }
    if let Some(method) = program.classes[src_idx].method_mut(source_method) {
        method.calls_in.insert(target_method);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ids::Idx;
    use crate::ir::{BasicBlock, ExternalInvocation};

    fn leader(id: usize, method_id: usize, class_id: usize, block_id: usize) -> Instruction {
        Instruction::new(Idx::new(id), "x", Kind::MethodStart, 1, Idx::new(block_id), Idx::new(method_id), Idx::new(class_id))
    }

    #[test]
    fn cross_class_call_links_block_and_method_edges() {
        let mut program = Program::new(Vec::new());

        let a_id = program.alloc_class_id();
        let mut a = Class::new(a_id, "A".into(), "com/app".into());
        let m1_id = program.alloc_method_id();
        let m1_block = program.alloc_block_id();
        let instr_id = program.alloc_instr_id();
        let mut m1 = Method::new(m1_id, "f".into(), vec![], "V".into());
        m1.basic_blocks.push(BasicBlock::new(m1_block, leader(instr_id.as_usize(), m1_id.as_usize(), a_id.as_usize(), m1_block.as_usize())));
        a.methods.push(m1);
        a.cross_class.push(ExternalInvocation {
            source_method: m1_id,
            source_block: m1_block,
            target_class_path: "com/app/B".into(),
            target_method_sig: "h()V".into(),
        });
        program.add_class(a);

        let b_id = program.alloc_class_id();
        let mut b = Class::new(b_id, "B".into(), "com/app".into());
        let m2_id = program.alloc_method_id();
        let m2_block = program.alloc_block_id();
        let instr_id2 = program.alloc_instr_id();
        let mut m2 = Method::new(m2_id, "h".into(), vec![], "V".into());
        m2.basic_blocks.push(BasicBlock::new(m2_block, leader(instr_id2.as_usize(), m2_id.as_usize(), b_id.as_usize(), m2_block.as_usize())));
        b.methods.push(m2);
        program.add_class(b);

        let warnings = resolve_cross_class(&mut program);
        assert!(warnings.is_empty());

        let a = program.class(a_id).unwrap();
        let m1 = a.method(m1_id).unwrap();
        assert!(m1.calls_out.contains(&m2_id));
        assert!(m1.block(m1_block).unwrap().child_ids.contains(&m2_block));
    }

    #[test]
    fn library_call_synthesizes_class_and_stub_method() {
        let mut program = Program::new(Vec::new());

        let a_id = program.alloc_class_id();
        let mut a = Class::new(a_id, "A".into(), "com/app".into());
        let m1_id = program.alloc_method_id();
        let m1_block = program.alloc_block_id();
        let instr_id = program.alloc_instr_id();
        let mut m1 = Method::new(m1_id, "f".into(), vec![], "V".into());
        m1.basic_blocks.push(BasicBlock::new(m1_block, leader(instr_id.as_usize(), m1_id.as_usize(), a_id.as_usize(), m1_block.as_usize())));
        a.methods.push(m1);
        a.library.push(ExternalInvocation {
            source_method: m1_id,
            source_block: m1_block,
            target_class_path: "java/lang/StringBuilder".into(),
            target_method_sig: "append(Ljava/lang/String;)Ljava/lang/StringBuilder;".into(),
        });
        program.add_class(a);

        let warnings = resolve_library(&mut program);
        assert!(warnings.is_empty());

        let synth_id = program.find_class_by_full_path("java/lang/StringBuilder").unwrap();
        let synth = program.class(synth_id).unwrap();
        assert_eq!(synth.short_name, "StringBuilder");
        assert_eq!(synth.path, "java/lang");
        assert_eq!(synth.methods.len(), 1);
        assert_eq!(synth.methods[0].name, "append");
        assert!(!synth.methods[0].is_void());

        let a = program.class(a_id).unwrap();
        let m1 = a.method(m1_id).unwrap();
        // non-void return gets the back edge onto the call block.
        assert!(m1.block(m1_block).unwrap().parent_ids.contains(&synth.methods[0].entry_block_id()));
    }
}
