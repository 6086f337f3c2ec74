//! Line parser (C3): turns a stream of trimmed smali lines into the typed IR.
//!
//! A [`Parser`] borrows a [`Program`] for the duration of one file and holds
//! the region flags plus the active class/method/block cursors (§9 — "Global
//! parser state"). It is not a process-wide singleton: the driver constructs
//! a fresh `Parser` per file and flushes its cursors into the `Program` when
//! the file is drained (mirroring the upstream extractor's per-file reset of
//! `ANNOTATION_FLAG`/`FIELD_FLAG`/`SWITCH_FLAG`/`METHOD_FLAG` and the active
//! class/method/block).

use crate::ir::{BasicBlock, BlockId, Class, Instruction, Method, Program};
use crate::lexicon::{self, Kind};
use crate::resolve::intra;

/// The small explicit state machine over which region of a smali file we are
/// currently inside (§4.3.1, §9).
#[derive(Debug, Default, Clone, Copy)]
struct RegionFlags {
    in_annotation: bool,
    in_field: bool,
    in_switch: bool,
    in_method: bool,
}

/// Stateful line-by-line parser for a single smali file.
///
/// Constructing a `Parser` does not touch the `Program` beyond borrowing it;
/// all mutation happens as lines are fed through [`Parser::process_line`],
/// and the parsed class is only handed to the `Program` by [`Parser::finish_file`].
pub struct Parser<'p> {
    program: &'p mut Program,
    flags: RegionFlags,
    active_class: Option<Class>,
    active_method: Option<Method>,
    active_block: Option<BasicBlock>,
    pending_terminator: bool,
    /// Resolution-phase and malformed-line reports, surfaced by the driver
    /// at `warning` level (§7).
    pub warnings: Vec<String>,
}

impl<'p> Parser<'p> {
    pub fn new(program: &'p mut Program) -> Self {
        Self {
            program,
            flags: RegionFlags::default(),
            active_class: None,
            active_method: None,
            active_block: None,
            pending_terminator: true,
            warnings: Vec::new(),
        }
    }

    /// Process one raw line from the input file (§4.3.1).
    pub fn process_line(&mut self, raw_line: &str, line_num: usize) {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            return;
        }
        let line = trimmed.split('#').next().unwrap_or("").trim_end();
        if line.is_empty() {
            return;
        }
        let kind = lexicon::classify(line);

        match kind {
            Kind::AnnotationStart => {
                self.flags.in_annotation = true;
                self.dispatch(line, kind, line_num);
            }
            Kind::AnnotationEnd => {
                self.dispatch(line, kind, line_num);
                self.flags.in_annotation = false;
            }
            Kind::FieldStart => {
                self.flags.in_field = true;
                self.dispatch(line, kind, line_num);
            }
            Kind::FieldEnd => {
                self.dispatch(line, kind, line_num);
                self.flags.in_field = false;
            }
            Kind::PswitchStart | Kind::SswitchStart => {
                self.flags.in_switch = true;
                self.flags.in_field = false;
                self.dispatch(line, kind, line_num);
            }
            Kind::PswitchEnd | Kind::SswitchEnd => {
                self.dispatch(line, kind, line_num);
                self.flags.in_switch = false;
            }
            Kind::MethodStart => {
                self.flags.in_method = true;
                self.flags.in_field = false;
                self.dispatch(line, kind, line_num);
            }
            Kind::MethodEnd => {
                self.dispatch(line, kind, line_num);
                self.flags.in_method = false;
            }
            _ => self.dispatch(line, kind, line_num),
        }
    }

    fn dispatch(&mut self, line: &str, kind: Kind, line_num: usize) {
        if self.flags.in_annotation {
            self.handle_annotation_region(line);
        } else if self.flags.in_field {
            self.handle_field_region(line);
        } else if self.flags.in_switch {
            self.handle_switch_region(line, kind);
        } else if self.flags.in_method {
            self.handle_method_body(line, kind, line_num);
        } else {
            self.handle_top_level(line, kind);
        }
    }

    // §4.3.1 step 4: annotation text is routed to whichever container is
    // currently active (method, class field list, or class annotation text).
    fn handle_annotation_region(&mut self, line: &str) {
        if self.flags.in_method {
            if let Some(method) = self.active_method.as_mut() {
                method.annotation_text.push_str(line);
                method.annotation_text.push('\n');
            }
        } else if self.flags.in_field {
            if let Some(class) = self.active_class.as_mut() {
                class.field_text.push_str(line);
                class.field_text.push('\n');
            }
        } else if let Some(class) = self.active_class.as_mut() {
            class.annotation_text.push_str(line);
            class.annotation_text.push('\n');
        }
    }

    fn handle_field_region(&mut self, line: &str) {
        if let Some(class) = self.active_class.as_mut() {
            class.field_text.push_str(line);
            class.field_text.push('\n');
        }
    }

    // §4.3.4: packed/sparse-switch data regions are not control flow. The
    // label preceding the region names the alias-table key; every label
    // line inside the region becomes an alias of that key.
    fn handle_switch_region(&mut self, line: &str, kind: Kind) {
        match kind {
            Kind::PswitchStart | Kind::SswitchStart => {
                let key = self
                    .active_block
                    .as_ref()
                    .map(|b| b.leader().text.clone())
                    .unwrap_or_default();
                if let Some(method) = self.active_method.as_mut() {
                    method.label_aliases.entry(key.clone()).or_default();
                    method.active_switch_key = Some(key);
                }
                self.active_block = None;
            }
            Kind::Label => {
                if let Some(method) = self.active_method.as_mut() {
                    if let Some(key) = method.active_switch_key.clone() {
                        method.label_aliases.entry(key).or_default().push(line.to_string());
                    }
                }
            }
            Kind::PswitchEnd | Kind::SswitchEnd => {}
            _ => {
                self.warnings
                    .push(format!("unexpected instruction in switch region: {line}"));
            }
        }
    }

    fn handle_top_level(&mut self, line: &str, kind: Kind) {
        match kind {
            Kind::Class => {
                let Some((short_name, path)) = Class::parse_header(line) else {
                    self.warnings.push(format!("malformed .class directive: {line}"));
                    return;
                };
                let id = self.program.alloc_class_id();
                self.active_class = Some(Class::new(id, short_name, path));
            }
            Kind::Super => {
                if let Some(class) = self.active_class.as_mut() {
                    class.set_super(line);
                }
            }
            Kind::Source => {
                if let Some(class) = self.active_class.as_mut() {
                    class.set_source(line);
                }
            }
            Kind::Comment => {}
            _ => {
                self.warnings
                    .push(format!("unhandled instruction outside of class context: {line}"));
            }
        }
    }

    fn handle_method_body(&mut self, line: &str, kind: Kind, line_num: usize) {
        match kind {
            Kind::MethodStart => self.start_method(line, line_num),
            Kind::Label => self.append_label(line, line_num),
            Kind::MethodEnd => {
                self.append_instruction(kind, line, line_num);
                if let Some(method) = self.active_method.as_mut() {
                    self.warnings.extend(intra::resolve_labels(method));
                }
            }
            Kind::Goto | Kind::If => {
                let block_id = self.append_instruction(kind, line, line_num);
                let label = line.split_whitespace().last().unwrap_or("").to_string();
                if let Some(method) = self.active_method.as_mut() {
                    method.add_label_call(label, block_id);
                }
            }
            Kind::Invoke => {
                let block_id = self.append_instruction(kind, line, line_num);
                self.classify_and_record_invocation(line, block_id);
            }
            Kind::Line => {}
            _ => {
                self.append_instruction(kind, line, line_num);
            }
        }
    }

    /// `method-start`: flush the previous method (if any) then allocate a
    /// fresh method and its entry block, led by a synthetic instruction
    /// whose text is the `.method` line itself (§4.3.3).
    fn start_method(&mut self, line: &str, line_num: usize) {
        self.flush_active_method();

        let Some((name, param_types, return_type)) = Method::parse_directive(line) else {
            self.warnings.push(format!("malformed .method directive: {line}"));
            return;
        };
        let Some(class_id) = self.active_class.as_ref().map(|c| c.id) else {
            self.warnings.push("method-start outside of any class".to_string());
            return;
        };

        let method_id = self.program.alloc_method_id();
        let block_id = self.program.alloc_block_id();
        let instr_id = self.program.alloc_instr_id();
        let leader = Instruction::new(instr_id, line, Kind::MethodStart, line_num, block_id, method_id, class_id);

        self.active_method = Some(Method::new(method_id, name, param_types, return_type));
        self.active_block = Some(BasicBlock::new(block_id, leader));
        self.pending_terminator = false;
    }

    /// Push the still-open block into the active method's block list (if
    /// any) and move the method onto the active class. A no-op at the start
    /// of a file, where there is no previous method to flush.
    fn flush_active_method(&mut self) {
        if let Some(mut method) = self.active_method.take() {
            if let Some(block) = self.active_block.take() {
                method.basic_blocks.push(block);
            }
            if let Some(class) = self.active_class.as_mut() {
                class.methods.push(method);
            }
        }
    }

    /// `label`: a leader, so it always closes the current block regardless
    /// of `pending_terminator` (§4.3.2).
    fn append_label(&mut self, line: &str, line_num: usize) {
        let (method_id, class_id) = match self.cursor_ids() {
            Some(ids) => ids,
            None => return,
        };
        let block_id = self.program.alloc_block_id();
        let instr_id = self.program.alloc_instr_id();
        let instr = Instruction::new(instr_id, line, Kind::Label, line_num, block_id, method_id, class_id);
        self.close_and_open_block(instr);
    }

    /// General instruction append (§4.3.2/§4.3.3): closes and starts a new
    /// block if the previous instruction terminated one, or if the switch
    /// region we just left discarded the active block entirely (the
    /// reference implementation has no analogous guard here; it is a
    /// resilience addition documented in DESIGN.md). Returns the block id
    /// the instruction landed in, for callers that need it as a call site.
    fn append_instruction(&mut self, kind: Kind, line: &str, line_num: usize) -> BlockId {
        let (method_id, class_id) = match self.cursor_ids() {
            Some(ids) => ids,
            None => return BlockId::new(0),
        };
        let instr_id = self.program.alloc_instr_id();
        let needs_new_block = self.pending_terminator || self.active_block.is_none();

        let block_id = if needs_new_block {
            let block_id = self.program.alloc_block_id();
            let instr = Instruction::new(instr_id, line, kind, line_num, block_id, method_id, class_id);
            self.close_and_open_block(instr);
            block_id
        } else {
            let block_id = self.active_block.as_ref().expect("checked above").id;
            let instr = Instruction::new(instr_id, line, kind, line_num, block_id, method_id, class_id);
            self.active_block.as_mut().expect("checked above").push(instr);
            block_id
        };

        if kind.is_terminator() {
            self.pending_terminator = true;
        }
        block_id
    }

    fn close_and_open_block(&mut self, leader: Instruction) {
        if let Some(mut old) = self.active_block.take() {
            let old_id = old.id;
            old.add_child(leader.block_id);
            if let Some(method) = self.active_method.as_mut() {
                method.basic_blocks.push(old);
            }
            let mut new_block = BasicBlock::new(leader.block_id, leader);
            new_block.add_parent(old_id);
            self.active_block = Some(new_block);
        } else {
            self.active_block = Some(BasicBlock::new(leader.block_id, leader));
        }
        self.pending_terminator = false;
    }

    fn cursor_ids(&self) -> Option<(crate::ir::MethodId, crate::ir::ClassId)> {
        let method_id = self.active_method.as_ref()?.id;
        let class_id = self.active_class.as_ref()?.id;
        Some((method_id, class_id))
    }

    /// §4.3.5: classify an `invoke*` line and file it into the owning
    /// class's intra-class/cross-class/library invocation lists, enqueuing
    /// the target file for cross-class calls.
    fn classify_and_record_invocation(&mut self, line: &str, block_id: BlockId) {
        let Some((opcode, target_class_token, target_method_sig)) = split_invoke(line) else {
            self.warnings.push(format!("malformed invoke instruction: {line}"));
            return;
        };
        let Some(method_id) = self.active_method.as_ref().map(|m| m.id) else {
            return;
        };
        let Some(class) = self.active_class.as_mut() else {
            return;
        };

        let invocation = class.classify_invocation(opcode, target_class_token, target_method_sig, method_id, block_id);
        match invocation {
            crate::ir::Invocation::IntraClass(local) => class.intra_class.push(local),
            crate::ir::Invocation::CrossClass(external) => {
                let file = format!("smali/{}.smali", external.target_class_path);
                self.program.enqueue_file(file);
                class.cross_class.push(external);
            }
            crate::ir::Invocation::Library(external) => class.library.push(external),
        }
    }

    /// Flush and push the active class into the program, then run the
    /// intra-class resolver (C4). Must be called once per file, after the
    /// last line has been processed.
    pub fn finish_file(mut self) {
        self.flush_active_method();
        if let Some(mut class) = self.active_class.take() {
            self.warnings.extend(intra::resolve_local_invocations(&mut class));
            self.program.add_class(class);
        }
    }
}

/// Split an `invoke*` instruction line into (opcode, `L...;` target class
/// token, target method signature), per §4.3.5's "`L…;` token before `->`,
/// signature after" extraction. Mirrors the reference's
/// `invoke_class_regex`/`invoke_params_regex` split without requiring a
/// regex crate: the target class token is the whitespace-delimited token
/// immediately preceding `->`, which always begins with `L` and ends at
/// `;->`. Anchoring on the *last* `L` in the line (rather than the start of
/// that token) would mis-slice any class name or path segment that itself
/// contains an uppercase `L` (`Ljava/util/ArrayList;`, `LoginActivity;`).
fn split_invoke(line: &str) -> Option<(&str, &str, &str)> {
    let opcode = line.split_whitespace().next()?;
    let arrow = line.find("->")?;
    let before_arrow = &line[..arrow];
    let token_start = before_arrow.rfind(char::is_whitespace).map(|i| i + 1).unwrap_or(0);
    let target_class = &before_arrow[token_start..];
    let target_method = line[arrow + 2..].trim();
    Some((opcode, target_class, target_method))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(lines: &[&str]) -> Program {
        let mut program = Program::new(Vec::new());
        {
            let mut parser = Parser::new(&mut program);
            for (i, line) in lines.iter().enumerate() {
                parser.process_line(line, i + 1);
            }
            parser.finish_file();
        }
        program
    }

    #[test]
    fn splits_invoke_line() {
        let (op, class, method) = split_invoke(
            "invoke-virtual {p0, p1}, Lcom/example/app/Bar;->h(Ljava/lang/String;)V",
        )
        .unwrap();
        assert_eq!(op, "invoke-virtual");
        assert_eq!(class, "Lcom/example/app/Bar;");
        assert_eq!(method, "h(Ljava/lang/String;)V");
    }

    #[test]
    fn splits_invoke_line_with_uppercase_l_inside_the_path() {
        // A class name or path segment containing an uppercase `L` (here,
        // `ArrayList` and `LoginActivity`) must not confuse the token-start
        // search — the target class always begins right after the last
        // whitespace before `->`, never at the last `L` in the line.
        let (_, class, _) = split_invoke(
            "invoke-virtual {p0}, Ljava/util/ArrayList;->add(Ljava/lang/Object;)Z",
        )
        .unwrap();
        assert_eq!(class, "Ljava/util/ArrayList;");

        let (_, class, _) =
            split_invoke("invoke-direct {p0}, Lcom/app/LoginActivity;-><init>()V").unwrap();
        assert_eq!(class, "Lcom/app/LoginActivity;");
    }

    #[test]
    fn single_method_straight_line() {
        let program = parse(&[
            ".class public Lcom/example/app/A;",
            ".super Ljava/lang/Object;",
            ".method public f()V",
            "const v0, 0x1",
            "return-void",
            ".end method",
        ]);

        assert_eq!(program.classes.len(), 1);
        let class = &program.classes[0];
        assert_eq!(class.methods.len(), 1);
        let method = &class.methods[0];
        // Leader (synthetic method-start) + const + return, all in one block:
        // nothing terminates until `return-void`.
        assert_eq!(method.basic_blocks.len(), 1);
        assert_eq!(method.basic_blocks[0].instructions.len(), 3);
        assert!(method.calls_out.is_empty());
    }

    #[test]
    fn conditional_branch_creates_three_blocks() {
        let program = parse(&[
            ".class public Lcom/example/app/A;",
            ".method public f()V",
            ":L0",
            "const v0, 0x0",
            "if-eqz v0, :L1",
            "const v0, 0x1",
            ":L1",
            "return-void",
            ".end method",
        ]);

        let method = &program.classes[0].methods[0];
        // entry block, :L0 block (ends at if-eqz), fallthrough block, :L1 block
        assert_eq!(method.basic_blocks.len(), 4);

        let if_block = method
            .basic_blocks
            .iter()
            .find(|b| b.leader().text == ":L0")
            .unwrap();
        assert_eq!(if_block.child_ids.len(), 2);

        let l1_block = method
            .basic_blocks
            .iter()
            .find(|b| b.leader().text == ":L1")
            .unwrap();
        assert_eq!(l1_block.parent_ids.len(), 2);
    }

    #[test]
    fn packed_switch_builds_alias_table() {
        let program = parse(&[
            ".class public Lcom/example/app/A;",
            ".method public f(I)V",
            "packed-switch p0, :pswitch_data_0",
            "goto :pswitch_data_0",
            ":pswitch_data_0",
            ".packed-switch 0x0",
            ":pswitch_0",
            ":pswitch_1",
            ".end packed-switch",
            "return-void",
            ".end method",
        ]);

        let method = &program.classes[0].methods[0];
        let aliases = method.label_aliases.get(":pswitch_data_0").unwrap();
        assert_eq!(aliases, &vec![":pswitch_0".to_string(), ":pswitch_1".to_string()]);
    }

    #[test]
    fn intra_class_direct_call_records_invocation() {
        let program = parse(&[
            ".class public Lcom/example/app/C;",
            ".method public m1()I",
            "invoke-direct {p0}, Lcom/example/app/C;->m2()I",
            "move-result v0",
            "return v0",
            ".end method",
            ".method private m2()I",
            "const v0, 0x2a",
            "return v0",
            ".end method",
        ]);

        let class = &program.classes[0];
        let m1 = &class.methods[0];
        assert!(m1.calls_out.contains(&class.methods[1].id));
    }

    #[test]
    fn cross_class_invocation_enqueues_target_file() {
        let program = parse(&[
            ".class public Lcom/app/A;",
            ".method public f()V",
            "invoke-virtual {p0}, Lcom/app/B;->h()V",
            "return-void",
            ".end method",
        ]);

        assert!(program.file_queue.contains(&"smali/com/app/B.smali".to_string()));
    }

    #[test]
    fn library_invocation_is_recorded_separately() {
        let program = parse(&[
            ".class public Lcom/app/A;",
            ".method public f()V",
            "invoke-virtual {p0}, Ljava/lang/StringBuilder;->append(Ljava/lang/String;)Ljava/lang/StringBuilder;",
            "return-void",
            ".end method",
        ]);

        let class = &program.classes[0];
        assert_eq!(class.library.len(), 1);
        assert!(class.cross_class.is_empty());
    }

    #[test]
    fn annotation_region_is_captured_verbatim() {
        let program = parse(&[
            ".class public Lcom/app/A;",
            ".annotation system Ldalvik/annotation/Signature;",
            "value = {\"Ljava/lang/Object;\"}",
            ".end annotation",
            ".method public f()V",
            "return-void",
            ".end method",
        ]);

        assert!(program.classes[0].annotation_text.contains("value ="));
    }
}
