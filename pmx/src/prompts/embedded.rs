//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Group scene prompt
pub const GROUP: &str = include_str!("../../prompts/group.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "group" => {
            debug!("get_embedded: matched group");
            Some(GROUP)
        }
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
