use super::block::BasicBlock;
use super::ids::{BlockId, MethodId};
use std::collections::{BTreeSet, HashMap};

/// A method and its basic blocks, plus the bookkeeping needed to resolve
/// intra-method label calls once the whole method has been parsed.
#[derive(Debug, Clone)]
pub struct Method {
    pub id: MethodId,
    pub name: String,
    pub param_types: Vec<String>,
    pub return_type: String,
    pub basic_blocks: Vec<BasicBlock>,
    pub calls_out: BTreeSet<MethodId>,
    pub calls_in: BTreeSet<MethodId>,
    pub annotation_text: String,
    /// (label text, caller block id) pairs awaiting label resolution (C4).
    pub pending_label_calls: Vec<(String, BlockId)>,
    /// label → aliases, populated while parsing a packed/sparse-switch region.
    pub label_aliases: HashMap<String, Vec<String>>,
    /// The switch-table key currently being populated, if inside a switch region.
    pub active_switch_key: Option<String>,
}

impl Method {
    pub fn new(id: MethodId, name: String, param_types: Vec<String>, return_type: String) -> Self {
        Self {
            id,
            name,
            param_types,
            return_type,
            basic_blocks: Vec::new(),
            calls_out: BTreeSet::new(),
            calls_in: BTreeSet::new(),
            annotation_text: String::new(),
            pending_label_calls: Vec::new(),
            label_aliases: HashMap::new(),
            active_switch_key: None,
        }
    }

    /// Parse a `.method` directive's trailing token (`name(param-types)return-type`)
    /// into name, parameter type list, and return type, per §4.2.
    ///
    /// The textual forms are kept verbatim: no canonicalization, including the
    /// trailing empty string `split(';')` leaves behind after the last `;`.
    pub fn parse_directive(line: &str) -> Option<(String, Vec<String>, String)> {
        let token = line.split_whitespace().last()?;
        let open = token.find('(')?;
        let close = token.find(')')?;
        if close < open {
            return None;
        }
        let name = token[..open].to_string();
        let params_str = &token[open + 1..close];
        let return_type = token[close + 1..].to_string();
        let param_types = if params_str.is_empty() {
            Vec::new()
        } else {
            params_str.split(';').map(|s| s.to_string()).collect()
        };
        Some((name, param_types, return_type))
    }

    pub fn is_void(&self) -> bool {
        self.return_type == "V"
    }

    pub fn entry_block(&self) -> &BasicBlock {
        &self.basic_blocks[0]
    }

    pub fn entry_block_id(&self) -> BlockId {
        self.basic_blocks[0].id
    }

    pub fn last_block(&self) -> &BasicBlock {
        self.basic_blocks.last().expect("method has at least one block")
    }

    pub fn last_block_id(&self) -> BlockId {
        self.last_block().id
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.basic_blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.basic_blocks.iter().find(|b| b.id == id)
    }

    /// Find the unique block whose leader's text equals `label`.
    pub fn find_block_by_leader_text(&self, label: &str) -> Option<BlockId> {
        self.basic_blocks
            .iter()
            .find(|b| b.leader().text == label)
            .map(|b| b.id)
    }

    /// Record a pending label call, expanding through the alias table if the
    /// label names a switch-table key (§4.4).
    pub fn add_label_call(&mut self, label: String, caller_block: BlockId) {
        self.pending_label_calls.push((label, caller_block));
    }
}
