//! Symbol resolution: turns pending label/invocation records into concrete
//! graph edges.
//!
//! Three phases, run in the order the driver calls them:
//! [`intra::resolve_labels`]/[`intra::resolve_local_invocations`] once per
//! class right after it is parsed (C4, §4.4), then
//! [`inter::resolve_cross_class`]/[`inter::resolve_library`] once over the
//! whole [`crate::ir::Program`] after every file has been parsed (C5, §4.5).

pub mod inter;
pub mod intra;

pub use inter::{resolve_cross_class, resolve_library};
pub use intra::{resolve_labels, resolve_local_invocations};
