//! Core error types and result alias shared by every stepgraph crate.
//!
//! All fallible operations across the workspace return [`Result`]. Errors
//! are explicit, typed, and recoverable - no panics allowed.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
