//! Diagnostic logging for subsync.
//!
//! Diagnostics always go to stderr; stdout is reserved for the tool's own output
//! (status lists, progress, summaries).
mod logger;
pub use logger::*;
