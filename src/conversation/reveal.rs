//! Progressive disclosure of long replies.

use super::message::{Message, MessageId};
use crate::core::{ConversationConfig, Millis};

/// Timing of thinking placeholders and chunked reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealSettings {
    /// Content longer than this many characters is revealed in chunks.
    pub threshold: usize,
    pub chunk: usize,
    pub interval: Millis,
    pub thinking_delay: Millis,
}

impl RevealSettings {
    /// Whether content of `len` characters is chunked rather than shown at once.
    pub fn is_chunked(&self, len: usize) -> bool {
        len > self.threshold
    }
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self::from(&ConversationConfig::default())
    }
}

impl From<&ConversationConfig> for RevealSettings {
    fn from(config: &ConversationConfig) -> Self {
        Self {
            threshold: config.reveal_threshold,
            chunk: config.reveal_chunk.max(1),
            interval: config.reveal_interval_ms,
            thinking_delay: config.thinking_delay_ms,
        }
    }
}

/// A reveal in progress, bound to one message.
///
/// The task itself holds no content; it only advances the message's
/// disclosed prefix, so freezing it never loses what was already shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTask {
    message: MessageId,
    chunk: usize,
    interval: Millis,
}

impl RevealTask {
    pub fn new(message: MessageId, settings: &RevealSettings) -> Self {
        Self { message, chunk: settings.chunk, interval: settings.interval }
    }

    pub fn message(&self) -> MessageId {
        self.message
    }

    pub fn interval(&self) -> Millis {
        self.interval
    }

    /// Disclose one more chunk. Returns true once the message is complete.
    pub fn step(&self, message: &mut Message) -> bool {
        message.set_revealed(message.revealed() + self.chunk);
        message.is_fully_revealed()
    }
}
