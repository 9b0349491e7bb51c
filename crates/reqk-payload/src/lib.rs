//! reqk-payload
//!
//! Turns the header, the edited rows and the approval chain into the flat
//! submission record.
//!
//! - Drafts always assemble.
//! - Submissions are checked in a fixed order and rejected with the first
//!   failing reason: Others size, then any selection, then replacement reason.
//!
//! Deterministic, pure logic. No IO.

mod engine;
mod types;

pub use engine::{assemble, parse_qty, validate};
pub use types::*;
