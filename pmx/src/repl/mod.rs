//! Interactive REPL for promptmixer
//!
//! Drives the character, monster and group forms from a line editor. The
//! three tabs share one prompt bus, so `add` on a producing tab shows up in
//! the group roster straight away.

mod command;
mod session;

pub use command::{PartyCommand, ReplCommand};
pub use session::{ReplSession, SlashResult, run_interactive};
