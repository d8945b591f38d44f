//! tds-reconcile
//!
//! Per-file reconciliation of the `<tds>.<md5>` naming convention.
//!
//! Architectural decisions:
//! - File content and the TDS portion of the name are ground truth; never altered
//! - Only the digest portion of the name and mtime/atime may change
//! - Every filesystem call takes an explicit directory (no process-wide chdir)
//! - Duplicate removal and collision rejection are two branches of one digest comparison
//! - Each failure is terminal for its path only; the caller moves on

mod engine;
mod error;
mod name;
mod path;
mod types;

pub use engine::Reconciler;
pub use error::RetagError;
pub use name::{canonical_name, parse_name};
pub use path::split_path;
pub use types::*;
