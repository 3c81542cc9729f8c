//! Reply generation for side threads.
//!
//! Side threads never touch the project. Their replies come from a
//! [`ReplyGenerator`] so a real assistant backend can be plugged in without
//! changing the controller.

use super::message::Message;
use crate::core::{Dictionary, Translator};

/// Produces the assistant reply for a side-thread question.
pub trait ReplyGenerator {
    /// Reply to `question`, given the thread's history before it.
    fn reply(&mut self, history: &[Message], question: &str, translator: &Translator) -> String;

    /// Backend name, for logs.
    fn name(&self) -> &str;
}

const ACKNOWLEDGE: Dictionary = Dictionary::new(
    "Noted: \"{question}\". This side thread is for thinking out loud and does not change your \
     document. Switch back to the main thread to keep building.",
    "Anotado: \"{question}\". Este hilo lateral sirve para pensar en voz alta y no cambia tu \
     documento. Vuelve al hilo principal para seguir construyendo.",
);

const FOLLOW_UP: Dictionary = Dictionary::new(
    "That makes {count} notes in this thread. Latest: \"{question}\".",
    "Ya son {count} notas en este hilo. La última: \"{question}\".",
);

/// Offline generator that acknowledges each note.
#[derive(Debug, Clone, Default)]
pub struct LocalReplies;

impl ReplyGenerator for LocalReplies {
    fn reply(&mut self, history: &[Message], question: &str, translator: &Translator) -> String {
        let asked = history.iter().filter(|m| m.role == super::Role::User).count();
        if asked == 0 {
            translator.translate_with(&ACKNOWLEDGE, &[("question", question)])
        } else {
            let count = (asked + 1).to_string();
            translator.translate_with(&FOLLOW_UP, &[("count", count.as_str()), ("question", question)])
        }
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{MessageKind, Role};
    use crate::core::Locale;

    #[test]
    fn test_local_replies_are_localized() {
        let mut replies = LocalReplies;
        let en = replies.reply(&[], "Why?", &Translator::new(Locale::En));
        let es = replies.reply(&[], "Why?", &Translator::new(Locale::Es));
        assert!(en.starts_with("Noted"));
        assert!(es.starts_with("Anotado"));
        assert!(en.contains("\"Why?\""));
    }

    #[test]
    fn test_follow_up_counts_notes() {
        let mut replies = LocalReplies;
        let history = vec![Message::new(1, Role::User, MessageKind::Answer, "first")];
        let reply = replies.reply(&history, "second", &Translator::new(Locale::En));
        assert!(reply.contains("2 notes"));
    }
}
