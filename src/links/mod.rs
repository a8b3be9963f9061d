//! Link handling module for Article-Linkcheck
//!
//! This module provides the article -> links table built during extraction,
//! href trimming and resolution, and the normalizer that turns the table
//! into the list of links to verify.

mod normalize;
mod table;

// Re-export main functions
pub use normalize::{correlation_key, decode_link, normalize, resolve_href, trim_href, ELLIPSIS};
pub use table::{LinkEntry, LinkTable};
