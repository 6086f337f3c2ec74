//! C7: view assemblers. Derive the CFG, FCG, and hybrid graph projections
//! from a resolved [`crate::ir::Program`] into one shared [`GraphView`] shape
//! that the digraph and COO serializers (C9) both know how to walk (§4.7).

pub mod cfg;
pub mod fcg;
pub mod hybrid;

use crate::lexicon::Kind;

/// One node of an assembled view: a CFG basic block, an FCG method, or
/// (in the hybrid view) either of those under a reindexed id.
#[derive(Debug, Clone)]
pub struct ViewNode {
    /// Node id in this view's own id space (block id, method id, or — for
    /// the hybrid view — a dense id from its translation table).
    pub id: usize,
    /// Used by the digraph emitter when `instruction_lines` is empty: the
    /// FCG-granularity label `ClassName::methodName`.
    pub label: String,
    /// `"{line_num}: {escaped text}"` per instruction, present only for
    /// block-granularity nodes (CFG, and expanded hybrid methods).
    pub instruction_lines: Vec<String>,
    /// Raw (unescaped) instruction text, for the verbose-nodes COO variant.
    pub raw_texts: Vec<String>,
    /// Instruction kinds, the feature projector's input.
    pub kinds: Vec<Kind>,
    /// The block's terminator kind, if any — used by the CFGExplainer COO
    /// variant to mark call edges.
    pub last_kind: Option<Kind>,
    /// Degree as computed by this view/variant (§4.6's caller-supplied slot).
    pub degree: usize,
    /// Child node ids in this view's id space, ordered, possibly repeated.
    pub children: Vec<usize>,
    /// `"i"` for hybrid expanded-method block ids (§6), `""` otherwise.
    pub dot_id_prefix: &'static str,
    /// Index of the owning class in `Program::classes`, used to keep one
    /// digraph color per class (§6).
    pub class_index: usize,
}

/// A complete assembled view, ready for serialization.
#[derive(Debug, Clone)]
pub struct GraphView {
    pub nodes: Vec<ViewNode>,
    /// Program-wide instruction count at assembly time, already adjusted to
    /// match the reference implementation's `instruction_id - 1` (DESIGN.md).
    pub total_instructions: usize,
}
