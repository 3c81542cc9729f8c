//! The guided conversation.
//!
//! The main thread asks one question at a time, chosen from the document
//! state. Side threads are free-form and never change the project.
//!
//! ## Layout
//!
//! - `input` - the input modalities and their validation
//! - `prompts` - which question comes next, and its text
//! - `reveal` - thinking delay and chunked disclosure
//! - `controller` - threads, submissions, timers

mod controller;
mod error;
mod input;
mod message;
mod prompts;
mod reply;
mod reveal;
mod thread;

pub use controller::{Conversation, DocState};
pub use error::{SubmitError, SubmitResult};
pub use input::{
    Answer, ChoiceOption, DynamicList, FreeText, InputKind, InputSurface, MultiSelect, Resolved,
    SingleSelect, MAX_RESUMABLE, OTHER,
};
pub use message::{Message, MessageId, MessageKind, Role};
pub use prompts::{
    flow_item_label, next_prompt, pending_step, phase_name, stage_name, Intent, Prompt, PromptContext, Step, CONTINUE,
    KEEP_GOING,
};
pub use reply::{LocalReplies, ReplyGenerator};
pub use reveal::{RevealSettings, RevealTask};
pub use thread::{Thread, ThreadId, ThreadKind};
