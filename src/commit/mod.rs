//! The mutation committer.
//!
//! Maps an answered prompt's [`Action`] to a document path, applies it, and
//! reports the change as a single [`HighlightTrigger`].

mod action;
mod committer;
mod trigger;

pub use action::Action;
pub use committer::commit;
pub use trigger::{HighlightKind, HighlightTrigger, Locator};
