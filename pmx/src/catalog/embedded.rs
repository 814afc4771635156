//! Embedded catalog
//!
//! Compiled into the binary from `data/catalog.yml` at build time.

/// Default vocabulary document
pub const CATALOG: &str = include_str!("../../data/catalog.yml");
