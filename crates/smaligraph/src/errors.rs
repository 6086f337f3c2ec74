//! The two fatal error cases of §7's taxonomy. Everything else (file-missing,
//! malformed-line, resolution-miss) is recovered locally and surfaced only as
//! a log record — it never becomes an `Err` value.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("no activities could be extracted from the manifest at {path}")]
    NoEntryPoints { path: String },
    #[error("failed to write output to {path}")]
    OutputWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
