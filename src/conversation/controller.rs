//! The conversation controller.
//!
//! Owns every thread, the prompt shown on the main thread, and the timed
//! thinking/reveal state. It never writes to the project itself: main-thread
//! answers come back as an [`Intent`] for the host to apply, and the host
//! then calls [`Conversation::accept`] or [`Conversation::reject`].

use std::collections::HashSet;
use std::fmt;

use super::error::{SubmitError, SubmitResult};
use super::input::{Answer, InputSurface, Resolved};
use super::message::{Message, MessageId, MessageKind, Role};
use super::prompts::{self, Intent, Prompt, PromptContext, Step};
use super::reply::ReplyGenerator;
use super::reveal::{RevealSettings, RevealTask};
use super::thread::{Pending, Thread, ThreadId, ThreadKind};
use crate::core::{Dictionary, Millis, ProjectSummary, TimerSet, Translator};
use crate::document::{ExtractStage, Phase, Project};

const SIDE_GREETING: Dictionary = Dictionary::new(
    "Side thread. Ask anything; nothing here changes your document.",
    "Hilo lateral. Pregunta lo que quieras; nada aquí cambia tu documento.",
);

/// The document state prompt selection reads.
#[derive(Debug, Clone, Copy)]
pub struct DocState<'a> {
    pub project: &'a Project,
    pub stage: Option<ExtractStage>,
    pub resumable: &'a [ProjectSummary],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimerKey {
    Thinking(ThreadId),
    Reveal(ThreadId, MessageId),
}

/// Threads plus the single authority over their timers.
pub struct Conversation {
    threads: Vec<Thread>,
    active: ThreadId,
    next_thread: u32,
    next_message: MessageId,
    timers: TimerSet<TimerKey>,
    settings: RevealSettings,
    translator: Translator,
    replies: Box<dyn ReplyGenerator>,
    opened: bool,
    keep_going: Option<Phase>,
    skipped: HashSet<Step>,
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("threads", &self.threads.len())
            .field("active", &self.active)
            .field("replies", &self.replies.name())
            .field("opened", &self.opened)
            .finish_non_exhaustive()
    }
}

impl Conversation {
    pub const MAIN: ThreadId = ThreadId(0);

    pub fn new(
        settings: RevealSettings,
        translator: Translator,
        replies: Box<dyn ReplyGenerator>,
    ) -> Self {
        Self {
            threads: vec![Thread::new(Self::MAIN, ThreadKind::Main)],
            active: Self::MAIN,
            next_thread: 1,
            next_message: 1,
            timers: TimerSet::new(),
            settings,
            translator,
            replies,
            opened: false,
            keep_going: None,
            skipped: HashSet::new(),
        }
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn active_id(&self) -> ThreadId {
        self.active
    }

    pub fn active(&self) -> &Thread {
        self.thread(self.active).unwrap_or(&self.threads[0])
    }

    pub fn active_mut(&mut self) -> &mut Thread {
        let index = self.index_of(self.active).unwrap_or(0);
        &mut self.threads[index]
    }

    pub fn main(&self) -> &Thread {
        &self.threads[0]
    }

    pub fn thread(&self, id: ThreadId) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id() == id)
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    /// Whether the opening question has been answered or skipped by a resume.
    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    fn index_of(&self, id: ThreadId) -> Option<usize> {
        self.threads.iter().position(|t| t.id() == id)
    }

    fn thread_mut(&mut self, id: ThreadId) -> SubmitResult<&mut Thread> {
        let index = self.index_of(id).ok_or(SubmitError::UnknownThread(id.0))?;
        Ok(&mut self.threads[index])
    }

    fn message_id(&mut self) -> MessageId {
        let id = self.next_message;
        self.next_message += 1;
        id
    }

    fn push(&mut self, thread: ThreadId, role: Role, kind: MessageKind, content: String) {
        let id = self.message_id();
        if let Ok(t) = self.thread_mut(thread) {
            t.messages.push(Message::new(id, role, kind, content));
        }
    }

    fn prompt_context<'a>(&'a self, doc: &DocState<'a>) -> PromptContext<'a> {
        PromptContext {
            project: doc.project,
            stage: doc.stage,
            opened: self.opened,
            keep_going: self.keep_going == Some(doc.project.phase),
            skipped: &self.skipped,
            resumable: doc.resumable,
            translator: &self.translator,
        }
    }

    /// Show the current prompt on the main thread right away.
    pub fn open(&mut self, doc: &DocState<'_>, now: Millis) {
        let prompt = prompts::next_prompt(&self.prompt_context(doc));
        tracing::debug!(step = ?prompt.step, "Opening conversation");
        self.show_prompt(prompt, now);
    }

    /// Start over on a freshly loaded project, skipping the opening question.
    pub fn restart(&mut self, doc: &DocState<'_>, notice: Option<String>, now: Millis) {
        self.opened = true;
        self.keep_going = None;
        self.skipped.clear();
        let main = Self::MAIN;
        if let Some(tid) = self.index_of(main) {
            let thread = &mut self.threads[tid];
            if let Some(task) = thread.reveal.take() {
                self.timers.cancel(&TimerKey::Reveal(main, task.message()));
            }
            thread.pending = None;
            thread.awaiting = false;
        }
        self.timers.cancel(&TimerKey::Thinking(main));
        if let Some(text) = notice {
            self.push(main, Role::Assistant, MessageKind::Notice, text);
        }
        self.open(doc, now);
    }

    /// Submit an answer on `thread`.
    ///
    /// Main-thread answers return the intent the host must apply; side-thread
    /// answers are handled here and return `None`.
    pub fn submit(
        &mut self,
        thread: ThreadId,
        answer: Answer,
        now: Millis,
    ) -> SubmitResult<Option<Intent>> {
        let index = self.index_of(thread).ok_or(SubmitError::UnknownThread(thread.0))?;
        if thread != self.active {
            tracing::debug!(%thread, active = %self.active, "Discarding stale submission");
            return Err(SubmitError::StaleThreadSubmission(thread.0));
        }
        let target = &self.threads[index];
        if target.is_locked() {
            return Err(SubmitError::InputLocked);
        }

        if !target.is_main() {
            let Resolved::Value(crate::document::PatchValue::Text(question)) =
                target.surface().resolve(answer)?
            else {
                return Err(SubmitError::Blank);
            };
            self.push(thread, Role::User, MessageKind::Answer, question.clone());
            let history = &self.threads[index].messages;
            let reply = self.replies.reply(&history[..history.len() - 1], &question, &self.translator);
            let t = &mut self.threads[index];
            t.surface = InputSurface::FreeText(super::input::FreeText::new());
            t.pending = Some(Pending::Reply(reply));
            self.timers.arm(TimerKey::Thinking(thread), now + self.settings.thinking_delay);
            return Ok(None);
        }

        let prompt = target.prompt().ok_or(SubmitError::NoActivePrompt)?;
        let shown = describe(&prompt.surface, &answer);
        let intent = prompt.step.intent(prompt.surface.resolve(answer)?)?;

        self.push(thread, Role::User, MessageKind::Answer, shown);
        self.threads[index].awaiting = true;
        tracing::debug!(%thread, ?intent, "Accepted answer");
        Ok(Some(intent))
    }

    /// Submit whatever the active surface currently holds.
    ///
    /// The surface is read, not drained: a refused answer keeps its edit
    /// state and an accepted one is replaced by the next prompt.
    pub fn submit_current(&mut self, now: Millis) -> SubmitResult<Option<Intent>> {
        let active = self.active;
        let answer = self.active().surface().clone().current_answer().ok_or(SubmitError::Blank)?;
        self.submit(active, answer, now)
    }

    /// The host applied the last intent. Queue the next prompt behind a
    /// thinking placeholder.
    pub fn accept(&mut self, doc: &DocState<'_>, notice: Option<String>, now: Millis) {
        let answered_opening =
            self.main().prompt().is_some_and(|p| p.step == Step::Opening);
        if answered_opening {
            self.opened = true;
        }
        self.refresh(doc, notice, now);
    }

    /// Re-evaluate the main prompt after the document changed outside a
    /// submission, e.g. an explicit continue.
    pub fn refresh(&mut self, doc: &DocState<'_>, notice: Option<String>, now: Millis) {
        let main = Self::MAIN;
        if self.keep_going.is_some_and(|phase| phase != doc.project.phase) {
            self.keep_going = None;
        }
        if let Some(text) = notice {
            self.push(main, Role::Assistant, MessageKind::Notice, text);
        }

        let next = prompts::next_prompt(&self.prompt_context(doc));
        let thread = &mut self.threads[0];
        thread.awaiting = false;
        thread.surface = InputSurface::None;
        thread.pending = Some(Pending::Prompt(next));
        if self.active == main {
            self.timers.arm(TimerKey::Thinking(main), now + self.settings.thinking_delay);
        }
    }

    /// The host refused the last intent. The same prompt and its edit state
    /// stay in place below an error message.
    pub fn reject(&mut self, error: &dyn fmt::Display) {
        tracing::debug!(%error, "Answer rejected");
        self.threads[0].awaiting = false;
        self.push(Self::MAIN, Role::Assistant, MessageKind::Error, error.to_string());
    }

    /// Stay in the current phase.
    pub fn keep_going(&mut self, phase: Phase) {
        self.keep_going = Some(phase);
    }

    /// Mark an optional step as answered with nothing.
    pub fn skip(&mut self, step: Step) {
        self.skipped.insert(step);
    }

    fn show_prompt(&mut self, prompt: Prompt, now: Millis) {
        let id = self.message_id();
        let thread = &mut self.threads[0];
        thread.messages.push(Message::hidden(id, Role::Assistant, MessageKind::Prompt, prompt.text.clone()));
        thread.surface = prompt.surface.clone();
        thread.prompt = Some(prompt);
        self.start_reveal(Self::MAIN, id, now);
    }

    fn start_reveal(&mut self, thread: ThreadId, message: MessageId, now: Millis) {
        let Some(index) = self.index_of(thread) else { return };
        let settings = self.settings;
        let t = &mut self.threads[index];
        if let Some(previous) = t.reveal.take() {
            self.timers.cancel(&TimerKey::Reveal(thread, previous.message()));
            if previous.message() != message {
                if let Some(old) = t.message_mut(previous.message()) {
                    let len = old.char_len();
                    old.set_revealed(len);
                }
            }
        }
        let Some(msg) = t.message_mut(message) else { return };

        if settings.is_chunked(msg.char_len()) {
            t.reveal = Some(RevealTask::new(message, &settings));
            if thread == self.active {
                self.timers.arm(TimerKey::Reveal(thread, message), now + settings.interval);
            }
        } else {
            let len = msg.char_len();
            msg.set_revealed(len);
            t.focus_requested = true;
        }
    }

    /// Replace a message's content. Any reveal of it starts over.
    pub fn replace_message(
        &mut self,
        thread: ThreadId,
        message: MessageId,
        content: impl Into<String>,
        now: Millis,
    ) -> SubmitResult<()> {
        let t = self.thread_mut(thread)?;
        let msg = t.message_mut(message).ok_or(SubmitError::UnknownMessage(message))?;
        msg.replace_content(content);
        self.start_reveal(thread, message, now);
        Ok(())
    }

    /// Fire due timers.
    pub fn tick(&mut self, now: Millis) {
        for key in self.timers.due(now) {
            match key {
                TimerKey::Thinking(thread) => self.materialize(thread, now),
                TimerKey::Reveal(thread, message) => self.reveal_step(thread, message, now),
            }
        }
    }

    fn materialize(&mut self, thread: ThreadId, now: Millis) {
        let Some(index) = self.index_of(thread) else { return };
        let Some(pending) = self.threads[index].pending.take() else { return };
        match pending {
            Pending::Prompt(prompt) => self.show_prompt(prompt, now),
            Pending::Reply(text) => {
                let id = self.message_id();
                self.threads[index]
                    .messages
                    .push(Message::hidden(id, Role::Assistant, MessageKind::Reply, text));
                self.start_reveal(thread, id, now);
            }
        }
    }

    fn reveal_step(&mut self, thread: ThreadId, message: MessageId, now: Millis) {
        let Some(index) = self.index_of(thread) else { return };
        let t = &mut self.threads[index];
        let Some(task) = t.reveal.filter(|task| task.message() == message) else { return };
        let Some(msg) = t.message_mut(message) else { return };

        if task.step(msg) {
            t.reveal = None;
            t.focus_requested = true;
        } else {
            self.timers.arm(TimerKey::Reveal(thread, message), now + task.interval());
        }
    }

    /// Open a new side thread and make it active.
    pub fn new_thread(&mut self, now: Millis) -> ThreadId {
        let id = ThreadId(self.next_thread);
        self.next_thread += 1;
        self.threads.push(Thread::new(id, ThreadKind::Side));
        let greeting = self.translator.translate(&SIDE_GREETING).to_string();
        self.push(id, Role::Assistant, MessageKind::Notice, greeting);
        // Switching to a known id cannot fail
        let _ = self.switch_to(id, now);
        id
    }

    /// Make another thread active.
    ///
    /// In-flight timers of the thread being left are cancelled; whatever was
    /// already revealed stays as it is. Returning to a thread resumes its
    /// pending work from `now`.
    pub fn switch_to(&mut self, id: ThreadId, now: Millis) -> SubmitResult<()> {
        let index = self.index_of(id).ok_or(SubmitError::UnknownThread(id.0))?;
        let previous = self.active;
        if previous == id {
            return Ok(());
        }

        if let Some(prev) = self.index_of(previous) {
            self.timers.cancel(&TimerKey::Thinking(previous));
            if let Some(task) = self.threads[prev].reveal {
                self.timers.cancel(&TimerKey::Reveal(previous, task.message()));
                tracing::debug!(thread = %previous, message = task.message(), "Froze reveal");
            }
        }

        self.active = id;
        let thread = &self.threads[index];
        if thread.pending.is_some() {
            self.timers.arm(TimerKey::Thinking(id), now + self.settings.thinking_delay);
        }
        if let Some(task) = thread.reveal {
            self.timers.arm(TimerKey::Reveal(id, task.message()), now + task.interval());
        }
        tracing::debug!(from = %previous, to = %id, "Switched thread");
        Ok(())
    }

    /// Cancel every timer, e.g. when the presentation goes away.
    pub fn teardown(&mut self) {
        self.timers.clear();
    }
}

/// How an answer is echoed in the history.
fn describe(surface: &InputSurface, answer: &Answer) -> String {
    let label = |value: &str| {
        surface
            .options()
            .iter()
            .find(|o| o.value == value)
            .map_or_else(|| value.to_string(), |o| o.label.clone())
    };
    match answer {
        Answer::Choice(value) => label(value),
        Answer::Resume(id) => match surface {
            InputSurface::SingleSelect(s) => s
                .resumable
                .iter()
                .find(|p| &p.id == id)
                .map_or_else(|| id.clone(), |p| p.title.clone()),
            _ => id.clone(),
        },
        Answer::Selection { toggled, other } => toggled
            .iter()
            .map(|v| label(v))
            .chain(other.iter().filter(|o| !o.trim().is_empty()).cloned())
            .collect::<Vec<_>>()
            .join(", "),
        Answer::Entries(entries) => entries
            .iter()
            .filter(|e| !e.trim().is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n"),
        Answer::Text(text) => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::Action;
    use crate::conversation::{InputKind, LocalReplies};
    use crate::core::Locale;
    use crate::document::{PatchValue, ProfileField};

    fn settings() -> RevealSettings {
        RevealSettings { threshold: 20, chunk: 10, interval: 30, thinking_delay: 100 }
    }

    fn conversation() -> Conversation {
        Conversation::new(settings(), Translator::new(Locale::En), Box::new(LocalReplies))
    }

    fn doc(project: &Project) -> DocState<'_> {
        DocState { project, stage: None, resumable: &[] }
    }

    /// Drive timers until the active thread is idle.
    fn settle(c: &mut Conversation, mut now: Millis) -> Millis {
        while let Some(at) = c.next_deadline() {
            now = now.max(at);
            c.tick(now);
        }
        now
    }

    #[test]
    fn test_opening_prompt_is_revealed_in_chunks() {
        let project = Project::default();
        let mut c = conversation();
        c.open(&doc(&project), 0);

        let main = c.main();
        assert_eq!(main.input_kind(), InputKind::SingleSelectWithResume);
        assert!(main.is_revealing());
        assert!(main.is_locked());
        assert_eq!(main.messages()[0].visible(), "");

        c.tick(30);
        assert_eq!(c.main().messages()[0].revealed(), 10);
        assert_eq!(
            c.submit(Conversation::MAIN, Answer::Choice("standard".into()), 31),
            Err(SubmitError::InputLocked)
        );

        settle(&mut c, 30);
        assert!(!c.main().is_locked());
        assert!(c.main().messages()[0].is_fully_revealed());
        assert!(c.active_mut().take_focus_request());
    }

    #[test]
    fn test_main_submission_yields_intent_then_thinks() {
        let mut project = Project::default();
        let mut c = conversation();
        c.open(&doc(&project), 0);
        let now = settle(&mut c, 0);

        let intent = c.submit(Conversation::MAIN, Answer::Choice("growth".into()), now).unwrap();
        assert_eq!(
            intent,
            Some(Intent::Commit {
                action: Action::ChooseTrack,
                value: PatchValue::Text("growth".into())
            })
        );
        assert!(c.main().is_locked());

        project.set_track(crate::document::Track::Growth);
        c.accept(&doc(&project), None, now);
        assert!(c.is_opened());
        assert!(c.main().is_thinking());
        assert_eq!(c.main().input_kind(), InputKind::None);

        c.tick(now + 100);
        assert!(!c.main().is_thinking());
        let prompt = c.main().prompt().unwrap();
        assert_eq!(prompt.step, Step::Profile(ProfileField::BusinessName));
    }

    #[test]
    fn test_reject_keeps_prompt() {
        let project = Project::default();
        let mut c = conversation();
        c.restart(&doc(&project), None, 0);
        let now = settle(&mut c, 0);

        c.submit(Conversation::MAIN, Answer::Text("Acme".into()), now).unwrap();
        c.reject(&"Business name taken");
        let main = c.main();
        assert!(!main.is_locked());
        assert_eq!(main.messages().last().unwrap().kind, MessageKind::Error);
        assert_eq!(main.prompt().unwrap().step, Step::Profile(ProfileField::BusinessName));
    }

    #[test]
    fn test_typed_text_survives_refused_commit() {
        let project = Project::default();
        let mut c = conversation();
        c.restart(&doc(&project), None, 0);
        let now = settle(&mut c, 0);

        let InputSurface::FreeText(text) = c.active_mut().surface_mut() else {
            panic!("expected free text");
        };
        text.insert("Acme");
        assert!(c.submit_current(now).unwrap().is_some());
        c.reject(&"Section is read-only");

        let main = c.main();
        assert!(!main.is_locked());
        let InputSurface::FreeText(text) = main.surface() else { panic!("expected free text") };
        assert_eq!(text.content(), "Acme");

        // Accepting clears it for the next prompt
        c.submit_current(now).unwrap();
        c.accept(&doc(&project), None, now);
        assert_eq!(c.main().input_kind(), InputKind::None);
    }

    #[test]
    fn test_wrong_shape_is_refused() {
        let project = Project::default();
        let mut c = conversation();
        c.restart(&doc(&project), None, 0);
        let now = settle(&mut c, 0);
        assert_eq!(
            c.submit(Conversation::MAIN, Answer::Choice("x".into()), now),
            Err(SubmitError::WrongShape { expected: InputKind::FreeText })
        );
        assert!(!c.main().is_locked());
    }

    #[test]
    fn test_stale_thread_submission_is_discarded() {
        let project = Project::default();
        let mut c = conversation();
        c.restart(&doc(&project), None, 0);
        let now = settle(&mut c, 0);
        let before = c.main().messages().len();

        let side = c.new_thread(now);
        assert_eq!(c.active_id(), side);
        assert_eq!(
            c.submit(Conversation::MAIN, Answer::Text("Acme".into()), now),
            Err(SubmitError::StaleThreadSubmission(0))
        );
        assert_eq!(c.main().messages().len(), before);
        assert!(!c.main().is_locked());
    }

    #[test]
    fn test_side_thread_replies_locally() {
        let project = Project::default();
        let mut c = conversation();
        c.restart(&doc(&project), None, 0);
        settle(&mut c, 0);

        let side = c.new_thread(0);
        assert_eq!(c.submit(side, Answer::Text("Should sales own invoicing?".into()), 0), Ok(None));
        assert!(c.active().is_thinking());
        settle(&mut c, 0);

        let thread = c.thread(side).unwrap();
        let last = thread.messages().last().unwrap();
        assert_eq!(last.kind, MessageKind::Reply);
        assert!(last.is_fully_revealed());
        assert!(last.content.contains("Should sales own invoicing?"));
        assert_eq!(thread.input_kind(), InputKind::FreeText);
    }

    #[test]
    fn test_switching_freezes_partial_reveal() {
        let project = Project::default();
        let mut c = conversation();
        c.open(&doc(&project), 0);
        c.tick(30);
        assert_eq!(c.main().messages()[0].revealed(), 10);

        let side = c.new_thread(31);
        c.tick(10_000);
        assert_eq!(c.main().messages()[0].revealed(), 10, "frozen while away");
        assert!(c.thread(side).unwrap().messages()[0].is_fully_revealed());

        c.switch_to(Conversation::MAIN, 10_000).unwrap();
        c.tick(10_030);
        assert_eq!(c.main().messages()[0].revealed(), 20, "resumes where it stopped");
    }

    #[test]
    fn test_replacing_content_resets_reveal() {
        let project = Project::default();
        let mut c = conversation();
        c.open(&doc(&project), 0);
        c.tick(30);
        let id = c.main().messages()[0].id;

        c.replace_message(Conversation::MAIN, id, "A completely different long message body", 40)
            .unwrap();
        assert_eq!(c.main().messages()[0].revealed(), 0);
        c.tick(60);
        assert_eq!(c.main().messages()[0].revealed(), 0, "old deadline no longer applies");
        c.tick(70);
        assert_eq!(c.main().messages()[0].revealed(), 10);
    }

    #[test]
    fn test_unknown_thread() {
        let mut c = conversation();
        assert_eq!(c.switch_to(ThreadId(9), 0), Err(SubmitError::UnknownThread(9)));
        assert_eq!(
            c.submit(ThreadId(9), Answer::Text("x".into()), 0),
            Err(SubmitError::UnknownThread(9))
        );
    }

    #[test]
    fn test_teardown_clears_timers() {
        let project = Project::default();
        let mut c = conversation();
        c.open(&doc(&project), 0);
        assert!(c.next_deadline().is_some());
        c.teardown();
        assert!(c.next_deadline().is_none());
    }
}
