//! Conversation threads.

use std::fmt;

use serde::Serialize;

use super::input::{FreeText, InputKind, InputSurface};
use super::message::Message;
use super::prompts::Prompt;
use super::reveal::RevealTask;

/// Identity of a thread within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ThreadId(pub u32);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Only the main thread may change the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadKind {
    Main,
    Side,
}

/// Content waiting behind a thinking placeholder.
#[derive(Debug, Clone)]
pub(crate) enum Pending {
    Prompt(Prompt),
    Reply(String),
}

/// One conversation: history, current input, and its timed state.
#[derive(Debug, Clone)]
pub struct Thread {
    id: ThreadId,
    kind: ThreadKind,
    pub(crate) messages: Vec<Message>,
    /// The question being answered (main thread only)
    pub(crate) prompt: Option<Prompt>,
    pub(crate) surface: InputSurface,
    pub(crate) pending: Option<Pending>,
    pub(crate) reveal: Option<RevealTask>,
    /// Submitted and waiting for the host to accept or reject
    pub(crate) awaiting: bool,
    pub(crate) focus_requested: bool,
}

impl Thread {
    pub(crate) fn new(id: ThreadId, kind: ThreadKind) -> Self {
        let surface = match kind {
            ThreadKind::Main => InputSurface::None,
            ThreadKind::Side => InputSurface::FreeText(FreeText::new()),
        };
        Self {
            id,
            kind,
            messages: Vec::new(),
            prompt: None,
            surface,
            pending: None,
            reveal: None,
            awaiting: false,
            focus_requested: false,
        }
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn kind(&self) -> ThreadKind {
        self.kind
    }

    pub fn is_main(&self) -> bool {
        self.kind == ThreadKind::Main
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn surface(&self) -> &InputSurface {
        &self.surface
    }

    /// Edit access for the presentation (toggles, list entries, typing).
    pub fn surface_mut(&mut self) -> &mut InputSurface {
        &mut self.surface
    }

    pub fn input_kind(&self) -> InputKind {
        self.surface.kind()
    }

    /// Waiting for content before it is revealed.
    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// Content is being disclosed; input stays locked until it completes.
    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    pub fn is_locked(&self) -> bool {
        self.awaiting || self.is_thinking() || self.is_revealing()
    }

    /// Whether the input should take focus. Cleared on read.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    pub(crate) fn message_mut(&mut self, id: u64) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_threads_take_free_text() {
        let side = Thread::new(ThreadId(1), ThreadKind::Side);
        assert_eq!(side.input_kind(), InputKind::FreeText);
        assert!(!side.is_main());

        let main = Thread::new(ThreadId(0), ThreadKind::Main);
        assert_eq!(main.input_kind(), InputKind::None);
        assert!(!main.is_locked());
    }

    #[test]
    fn test_focus_request_is_consumed() {
        let mut thread = Thread::new(ThreadId(0), ThreadKind::Main);
        thread.focus_requested = true;
        assert!(thread.take_focus_request());
        assert!(!thread.take_focus_request());
    }
}
