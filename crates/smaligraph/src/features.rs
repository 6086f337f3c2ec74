//! C6: feature-vector projector.
//!
//! Maps a block's (or method's) instruction kinds plus graph-local context
//! (degree, total program instructions) into a fixed-width integer vector
//! for GNN ingestion (§4.6). Grouping follows the MAGIC-paper summary used
//! by the original extractor (`original_source/output_graph.py`'s
//! `create_summary_feature_vector`), with an extended layout
//! (`cfgexplainer_extract.py`'s `create_cfgexplainer_feature_vector`) that
//! additionally distinguishes string constants from numeric ones.

use crate::lexicon::Kind;

/// Which fixed feature layout to project into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Width 11 — `numeric_const` covers both `const` and `const-string`.
    Summary,
    /// Width 12 — splits `numeric_const` into `numeric_const`/`string_const`.
    Extended,
}

impl Layout {
    pub fn width(self) -> usize {
        match self {
            Layout::Summary => 11,
            Layout::Extended => 12,
        }
    }
}

/// Slot indices for one layout. The last three slots are always
/// `num_total_instr`, `degree`, `num_instr_in_vertex` in that order.
struct Slots {
    numeric_const: usize,
    string_const: Option<usize>,
    transfer: usize,
    call: usize,
    arithmetic: usize,
    compare: usize,
    mv: usize,
    terminate: usize,
    data_declaration: usize,
    num_total_instr: usize,
    degree: usize,
    num_instr_in_vertex: usize,
}

const SUMMARY: Slots = Slots {
    numeric_const: 0,
    string_const: None,
    transfer: 1,
    call: 2,
    arithmetic: 3,
    compare: 4,
    mv: 5,
    terminate: 6,
    data_declaration: 7,
    num_total_instr: 8,
    degree: 9,
    num_instr_in_vertex: 10,
};

const EXTENDED: Slots = Slots {
    numeric_const: 0,
    string_const: Some(1),
    transfer: 2,
    call: 3,
    arithmetic: 4,
    compare: 5,
    mv: 6,
    terminate: 7,
    data_declaration: 8,
    num_total_instr: 9,
    degree: 10,
    num_instr_in_vertex: 11,
};

fn slots(layout: Layout) -> &'static Slots {
    match layout {
        Layout::Summary => &SUMMARY,
        Layout::Extended => &EXTENDED,
    }
}

/// The feature-group slot a given instruction kind contributes to, or `None`
/// if the kind is not tallied (it still counts toward `num_instr_in_vertex`).
fn category_slot(slots: &Slots, kind: Kind) -> Option<usize> {
    use Kind::*;
    match kind {
        Const => Some(slots.numeric_const),
        ConstString => Some(slots.string_const.unwrap_or(slots.numeric_const)),
        FillArrayData | Aget | Aput | Iget | Iput | Sget | Sput | InstanceOf => Some(slots.transfer),
        Invoke => Some(slots.call),
        PackedSwitch | SparseSwitch | Cmp | If => Some(slots.compare),
        Move => Some(slots.mv),
        Return => Some(slots.terminate),
        NewInstance | NewArray | FilledNewArray => Some(slots.data_declaration),
        Neg | Not | Add | Sub | Mul | Div | Rem | And | Or | Xor | Shl | Shr | Ushr | Rsub => Some(slots.arithmetic),
        _ => None,
    }
}

/// Project a sequence of instruction kinds plus graph-local context into a
/// feature vector (§4.6). `degree` is the caller's choice of combining
/// metric — parent+child block count for a standard CFG node, child count
/// alone for the CFGExplainer variant, or calls-in+calls-out for an FCG/
/// hybrid method node. `num_total_instr` is the program-wide instruction
/// count as of the moment of projection (the caller subtracts one to match
/// the reference implementation's `instruction_id - 1`, see DESIGN.md).
pub fn project(layout: Layout, kinds: impl IntoIterator<Item = Kind>, degree: usize, num_total_instr: usize) -> Vec<i64> {
    let slot_table = slots(layout);
    let mut vector = vec![0i64; layout.width()];
    let mut count = 0usize;

    for kind in kinds {
        count += 1;
        if let Some(slot) = category_slot(slot_table, kind) {
            vector[slot] += 1;
        }
    }

    vector[slot_table.num_total_instr] = num_total_instr as i64;
    vector[slot_table.degree] = degree as i64;
    vector[slot_table.num_instr_in_vertex] = count as i64;
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_layout_has_width_eleven() {
        assert_eq!(Layout::Summary.width(), 11);
    }

    #[test]
    fn extended_layout_has_width_twelve() {
        assert_eq!(Layout::Extended.width(), 12);
    }

    #[test]
    fn summary_groups_const_string_with_numeric_const() {
        let vector = project(Layout::Summary, [Kind::Const, Kind::ConstString], 0, 0);
        assert_eq!(vector[0], 2);
    }

    #[test]
    fn extended_splits_numeric_and_string_constants() {
        let vector = project(Layout::Extended, [Kind::Const, Kind::ConstString, Kind::ConstString], 0, 0);
        assert_eq!(vector[0], 1);
        assert_eq!(vector[1], 2);
    }

    #[test]
    fn tail_slots_come_from_caller_supplied_context() {
        let vector = project(Layout::Summary, [Kind::Return], 4, 123);
        assert_eq!(vector[6], 1); // terminate
        assert_eq!(vector[8], 123); // num_total_instr
        assert_eq!(vector[9], 4); // degree
        assert_eq!(vector[10], 1); // num_instr_in_vertex
    }

    #[test]
    fn unmapped_kind_only_counts_toward_vertex_size() {
        let vector = project(Layout::Summary, [Kind::Nop, Kind::Label], 0, 0);
        assert_eq!(vector.iter().sum::<i64>(), 2); // both land only in num_instr_in_vertex
        assert_eq!(vector[10], 2);
    }

    #[test]
    fn arithmetic_family_shares_one_slot() {
        let vector = project(Layout::Summary, [Kind::Add, Kind::Sub, Kind::Xor, Kind::Rsub], 0, 0);
        assert_eq!(vector[3], 4);
    }
}
