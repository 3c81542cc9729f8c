//! Highlight/scroll coordination.
//!
//! Commits emit a [`HighlightTrigger`](crate::commit::HighlightTrigger); the
//! [`Highlighter`] resolves it against what is rendered, emphasizes it for a
//! while, and asks for a scroll unless the user is scrolling by hand.

mod anchor;
mod coordinator;

pub use anchor::{Anchor, AnchorResolver, SectionAnchors};
pub use coordinator::{ActiveHighlight, Highlighter, ScrollIntent};
