use super::class::Class;
use super::ids::{BlockId, BlockIdTag, ClassId, ClassIdTag, IdCounter, InstrId, InstrIdTag, MethodId, MethodIdTag};

/// Owns every parsed/resolved entity plus the file-discovery queue.
///
/// Id counters are monotonic across the whole run and never reused (§3). The
/// file queue grows as the line parser discovers cross-class invocations
/// (§4.3.5); the driver must iterate it with a cursor rather than a
/// snapshot, since new entries can be appended mid-iteration (§5).
#[derive(Debug, Default)]
pub struct Program {
    pub classes: Vec<Class>,
    pub file_queue: Vec<String>,
    class_ids: IdCounter<ClassIdTag>,
    method_ids: IdCounter<MethodIdTag>,
    block_ids: IdCounter<BlockIdTag>,
    instr_ids: IdCounter<InstrIdTag>,
}

impl Program {
    pub fn new(initial_files: impl IntoIterator<Item = String>) -> Self {
        let mut program = Self::default();
        for file in initial_files {
            program.enqueue_file(file);
        }
        program
    }

    /// Append a file to the queue unless it is already present (§5).
    pub fn enqueue_file(&mut self, path: String) {
        if !self.file_queue.contains(&path) {
            self.file_queue.push(path);
        }
    }

    pub fn alloc_class_id(&mut self) -> ClassId {
        self.class_ids.alloc()
    }

    pub fn alloc_method_id(&mut self) -> MethodId {
        self.method_ids.alloc()
    }

    pub fn alloc_block_id(&mut self) -> BlockId {
        self.block_ids.alloc()
    }

    pub fn alloc_instr_id(&mut self) -> InstrId {
        self.instr_ids.alloc()
    }

    /// Total instructions allocated so far, used as the `num_total_instr`
    /// feature-vector slot (§4.6). The reference implementation reads this
    /// one past the last instruction actually appended (an off-by-one in the
    /// source retained for parity — see DESIGN.md).
    pub fn total_instructions(&self) -> usize {
        self.instr_ids.count()
    }

    pub fn class(&self, id: ClassId) -> Option<&Class> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut Class> {
        self.classes.iter_mut().find(|c| c.id == id)
    }

    pub fn add_class(&mut self, class: Class) {
        self.classes.push(class);
    }

    /// Locate a class by its short name — the last `/`-delimited segment of
    /// its full path (§4.5's cross-class lookup).
    pub fn find_class_by_short_name(&self, short_name: &str) -> Option<ClassId> {
        self.classes.iter().find(|c| c.short_name == short_name).map(|c| c.id)
    }

    /// Locate a class by its full `path/ShortName` (§4.5's library lookup).
    pub fn find_class_by_full_path(&self, full_path: &str) -> Option<ClassId> {
        self.classes.iter().find(|c| c.full_path() == full_path).map(|c| c.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_file_deduplicates() {
        let mut program = Program::new(["smali/com/app/A.smali".to_string()]);
        program.enqueue_file("smali/com/app/B.smali".to_string());
        program.enqueue_file("smali/com/app/A.smali".to_string());
        assert_eq!(program.file_queue.len(), 2);
    }

    #[test]
    fn ids_are_allocated_contiguously_per_space() {
        let mut program = Program::new(Vec::new());
        let c0 = program.alloc_class_id();
        let c1 = program.alloc_class_id();
        assert_eq!(c0.as_usize(), 0);
        assert_eq!(c1.as_usize(), 1);
    }
}
