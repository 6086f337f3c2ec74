use super::ids::BlockId;
use super::instruction::Instruction;
use std::collections::BTreeSet;

/// A maximal straight-line instruction sequence.
///
/// Invariants (enforced by construction, never by post-hoc validation):
/// the first instruction is always the block's leader; at most the last
/// instruction is a terminator; `parent_ids`/`child_ids` are only made
/// reciprocal once resolution (C4/C5) links blocks together — a freshly
/// parsed block may have children added by the line parser itself (the
/// fall-through successor) before resolution ever runs.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub id: BlockId,
    pub instructions: Vec<Instruction>,
    pub parent_ids: BTreeSet<BlockId>,
    pub child_ids: Vec<BlockId>,
    /// Line numbers of invoke instructions whose call target has not yet
    /// been resolved to a block. Cleared as resolution succeeds; entries
    /// that remain are reported, never silently dropped.
    pub unresolved_calls: BTreeSet<usize>,
}

impl BasicBlock {
    pub fn new(id: BlockId, leader: Instruction) -> Self {
        Self {
            id,
            instructions: vec![leader],
            parent_ids: BTreeSet::new(),
            child_ids: Vec::new(),
            unresolved_calls: BTreeSet::new(),
        }
    }

    pub fn push(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    pub fn leader(&self) -> &Instruction {
        &self.instructions[0]
    }

    /// The block's one and only terminator, if it has appended one yet.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|i| i.kind.is_terminator())
    }

    /// Children are an ordered list with possible duplicates: parallel
    /// edges encode branch multiplicity for some views, so callers that
    /// want a set should dedupe explicitly.
    pub fn add_child(&mut self, child: BlockId) {
        self.child_ids.push(child);
    }

    pub fn add_parent(&mut self, parent: BlockId) {
        self.parent_ids.insert(parent);
    }

    pub fn degree(&self) -> usize {
        self.parent_ids.len() + self.child_ids.len()
    }
}
