//! State module for tracking scan progress
//!
//! # Components
//!
//! - `ScanResult`: one link found in one article, `Pending` until verified
//! - `Outcome`, `FailureKind`: the closed classification tables
//! - `ResultStore`: results plus the resolved-URL status map, shared by
//!   concurrent verification completions

mod classify;
mod scan_result;
mod store;

// Re-export main types
pub use classify::{classify_failure, classify_status, Classification, FailureKind, Outcome};
pub use scan_result::{ScanResult, ScanStatus};
pub use store::ResultStore;
