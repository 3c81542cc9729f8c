//! Conversation messages.

use serde::Serialize;

/// Identity of a message, unique across all threads of a session.
pub type MessageId = u64;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// What a message is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    /// A question driving the next input
    Prompt,
    /// The user's answer
    Answer,
    /// A side-thread reply
    Reply,
    /// Informational, e.g. a phase change
    Notice,
    /// A rejected answer; the same prompt follows
    Error,
}

/// One entry in a thread's append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub kind: MessageKind,
    pub content: String,
    /// Characters disclosed so far
    revealed: usize,
}

impl Message {
    /// A message that is shown in full immediately.
    pub fn new(id: MessageId, role: Role, kind: MessageKind, content: impl Into<String>) -> Self {
        let content = content.into();
        let revealed = content.chars().count();
        Self { id, role, kind, content, revealed }
    }

    /// A message whose content starts hidden and is disclosed over time.
    pub fn hidden(id: MessageId, role: Role, kind: MessageKind, content: impl Into<String>) -> Self {
        Self { id, role, kind, content: content.into(), revealed: 0 }
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub(crate) fn set_revealed(&mut self, chars: usize) {
        self.revealed = chars.min(self.char_len());
    }

    /// Replace the content and hide it again.
    pub(crate) fn replace_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.revealed = 0;
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.revealed >= self.char_len()
    }

    /// The disclosed prefix of the content.
    pub fn visible(&self) -> &str {
        match self.content.char_indices().nth(self.revealed) {
            Some((end, _)) => &self.content[..end],
            None => &self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_respects_char_boundaries() {
        let mut msg = Message::hidden(1, Role::Assistant, MessageKind::Prompt, "¿Qué tal?");
        assert_eq!(msg.visible(), "");
        msg.set_revealed(3);
        assert_eq!(msg.visible(), "¿Qu");
        msg.set_revealed(100);
        assert_eq!(msg.revealed(), 9);
        assert!(msg.is_fully_revealed());
        assert_eq!(msg.visible(), "¿Qué tal?");
    }

    #[test]
    fn test_replace_resets_disclosure() {
        let mut msg = Message::new(1, Role::Assistant, MessageKind::Reply, "hello");
        assert!(msg.is_fully_revealed());
        msg.replace_content("bye");
        assert_eq!(msg.visible(), "");
    }
}
