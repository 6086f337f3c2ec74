//! Typed hierarchical IR: program → class → method → basic block → instruction.
//!
//! Every cross-entity reference (parent/child blocks, call edges, invocation
//! targets) is by id, never by ownership, so the resulting graph can be
//! arbitrary and cyclic without creating ownership cycles (§9).

pub mod block;
pub mod class;
pub mod ids;
pub mod instruction;
pub mod method;
pub mod program;

pub use block::BasicBlock;
pub use class::{Class, ExternalInvocation, Invocation, LocalInvocation};
pub use ids::{BlockId, ClassId, Idx, InstrId, MethodId};
pub use instruction::Instruction;
pub use method::Method;
pub use program::Program;
