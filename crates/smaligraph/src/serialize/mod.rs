//! C9: output writers. Both formats walk the same [`crate::views::GraphView`]
//! shape produced by C7, so a view need not know which format it will end
//! up in (§6).

pub mod coo;
pub mod dot;
