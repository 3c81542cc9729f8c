//! Session state and lifecycle.
//!
//! `App` wires the document, the phase machine, the conversation and the
//! highlighter together. It is the only place that applies conversation
//! intents to the project, so every write goes through one path.

use std::path::PathBuf;

use serde::Serialize;

use crate::commit::{self, HighlightTrigger};
use crate::conversation::{
    phase_name, stage_name, Answer, ChoiceOption, Conversation, DocState, InputKind, Intent,
    LocalReplies, MessageKind, ReplyGenerator, RevealSettings, Role, SubmitError, SubmitResult,
    ThreadId, ThreadKind,
};
use crate::core::{
    Clock, Config, Dictionary, Millis, ProjectStore, ProjectSummary, StoreResult, SystemClock,
    Translator,
};
use crate::document::{ExtractStage, Phase, PhaseReadiness, Project};
use crate::highlight::{ActiveHighlight, Highlighter, ScrollIntent, SectionAnchors};
use crate::workflow::{Advance, PhaseMachine, PhaseResult, SectionState};

const PHASE_ENTERED: Dictionary =
    Dictionary::new("Moving on to {phase}.", "Pasamos a {phase}.");

const STAGE_ENTERED: Dictionary =
    Dictionary::new("Next extract step: {stage}.", "Siguiente paso de extracción: {stage}.");

const PREVIEW_ENTERED: Dictionary = Dictionary::new(
    "Previewing {phase}. Finish integration to edit it.",
    "Vista previa de {phase}. Termina la integración para editarla.",
);

const RESUMED: Dictionary = Dictionary::new("Resumed \"{title}\".", "Retomado \"{title}\".");

const RESUME_FAILED: Dictionary = Dictionary::new(
    "Could not open that project: {error}",
    "No se pudo abrir ese proyecto: {error}",
);

fn doc<'a>(
    project: &'a Project,
    machine: &PhaseMachine,
    resumable: &'a [ProjectSummary],
) -> DocState<'a> {
    DocState { project, stage: machine.extract_stage(), resumable }
}

/// Main session state.
///
/// Time comes from `C` so scripted sessions and tests can drive it by hand.
#[derive(Debug)]
pub struct App<C: Clock = SystemClock> {
    /// Application configuration
    pub config: Config,

    /// The project being built
    project: Project,

    machine: PhaseMachine,

    conversation: Conversation,

    highlighter: Highlighter,

    /// Where projects are saved; `None` keeps the session in memory
    store: Option<ProjectStore>,

    clock: C,

    /// Prior projects offered by the opening prompt
    resumable: Vec<ProjectSummary>,

    /// Latest commit trigger, kept for the view
    last_trigger: Option<HighlightTrigger>,

    /// Whether the session should end
    pub should_quit: bool,
}

impl<C: Clock> App<C> {
    /// Start a session on a fresh project with local side-thread replies.
    pub fn new(config: Config, store: Option<ProjectStore>, clock: C) -> Self {
        Self::with_replies(config, store, clock, Box::new(LocalReplies))
    }

    /// Start a session with a specific reply generator for side threads.
    pub fn with_replies(
        config: Config,
        store: Option<ProjectStore>,
        clock: C,
        replies: Box<dyn ReplyGenerator>,
    ) -> Self {
        let resumable = store
            .as_ref()
            .map(|s| {
                s.recent(config.general.max_resumable).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Could not list saved projects");
                    Vec::new()
                })
            })
            .unwrap_or_default();

        let project = Project::default();
        let machine = PhaseMachine::for_project(&project);
        let conversation = Conversation::new(
            RevealSettings::from(&config.conversation),
            Translator::new(config.general.locale),
            replies,
        );
        let highlighter = Highlighter::new(&config.highlight);

        let mut app = Self {
            config,
            project,
            machine,
            conversation,
            highlighter,
            store,
            clock,
            resumable,
            last_trigger: None,
            should_quit: false,
        };
        let now = app.clock.now();
        app.conversation.open(&doc(&app.project, &app.machine, &app.resumable), now);
        tracing::info!(
            project = %app.project.id,
            resumable = app.resumable.len(),
            "Session started"
        );
        app
    }

    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Edit access for the input surface of the active thread.
    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn extract_stage(&self) -> Option<ExtractStage> {
        self.machine.extract_stage()
    }

    pub fn readiness(&self) -> PhaseReadiness {
        PhaseReadiness::evaluate(&self.project)
    }

    pub fn last_trigger(&self) -> Option<&HighlightTrigger> {
        self.last_trigger.as_ref()
    }

    fn translator(&self) -> Translator {
        *self.conversation.translator()
    }

    /// Submit an answer on a thread.
    ///
    /// Answers that do not fit are reported on the main thread and the same
    /// prompt stays up. Stale and locked submissions are discarded quietly.
    pub fn submit(&mut self, thread: ThreadId, answer: Answer) -> SubmitResult<()> {
        let now = self.now();
        match self.conversation.submit(thread, answer, now) {
            Ok(Some(intent)) => {
                self.apply(intent, now);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => Err(self.refuse(thread, err)),
        }
    }

    /// Submit whatever the active input currently holds.
    pub fn submit_current(&mut self) -> SubmitResult<()> {
        let now = self.now();
        let thread = self.conversation.active_id();
        match self.conversation.submit_current(now) {
            Ok(Some(intent)) => {
                self.apply(intent, now);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => Err(self.refuse(thread, err)),
        }
    }

    fn refuse(&mut self, thread: ThreadId, err: SubmitError) -> SubmitError {
        let quiet = matches!(
            err,
            SubmitError::StaleThreadSubmission(_)
                | SubmitError::InputLocked
                | SubmitError::UnknownThread(_)
        );
        if !quiet && thread == Conversation::MAIN {
            self.conversation.reject(&err);
        }
        err
    }

    fn apply(&mut self, intent: Intent, now: Millis) {
        let outcome: SubmitResult<Option<String>> = match intent {
            Intent::Commit { action, value } => {
                match commit::commit(&mut self.project, &action, value, now) {
                    Ok(trigger) => {
                        self.highlight(trigger, now);
                        self.autosave();
                        Ok(None)
                    }
                    Err(err) => Err(err.into()),
                }
            }
            Intent::Continue => match self.machine.continue_phase(&mut self.project) {
                Ok(advance) => {
                    self.autosave();
                    Ok(Some(self.advance_notice(advance)))
                }
                Err(err) => Err(err.into()),
            },
            Intent::KeepGoing => {
                self.conversation.keep_going(self.project.phase);
                Ok(None)
            }
            Intent::Skip(step) => {
                self.conversation.skip(step);
                Ok(None)
            }
            Intent::Resume(id) => {
                match self.resume_at(&id, now) {
                    Ok(()) => {}
                    Err(err) => {
                        let text = self
                            .translator()
                            .translate_with(&RESUME_FAILED, &[("error", err.to_string().as_str())]);
                        self.conversation.reject(&text);
                    }
                }
                return;
            }
        };

        let state = doc(&self.project, &self.machine, &self.resumable);
        match outcome {
            Ok(notice) => self.conversation.accept(&state, notice, now),
            Err(err) => self.conversation.reject(&err),
        }
    }

    fn highlight(&mut self, trigger: HighlightTrigger, now: Millis) {
        let anchors = SectionAnchors::new(&self.project);
        self.highlighter.trigger(&trigger, &anchors, now);
        self.last_trigger = Some(trigger);
    }

    fn advance_notice(&self, advance: Advance) -> String {
        let t = self.translator();
        match advance {
            Advance::Phase(phase) => {
                t.translate_with(&PHASE_ENTERED, &[("phase", t.translate(&phase_name(phase)))])
            }
            Advance::Stage(stage) => {
                t.translate_with(&STAGE_ENTERED, &[("stage", t.translate(&stage_name(stage)))])
            }
        }
    }

    /// Load a saved project and continue it from its first pending step.
    ///
    /// On failure nothing changes.
    pub fn resume(&mut self, id: &str) -> anyhow::Result<()> {
        let now = self.now();
        self.resume_at(id, now)?;
        Ok(())
    }

    fn resume_at(&mut self, id: &str, now: Millis) -> StoreResult<()> {
        let store = self.store.as_ref().ok_or_else(|| {
            crate::core::StoreError::NotFound(format!("{id} (no data directory)"))
        })?;
        let project = store.load(id)?;

        tracing::info!(project = %project.id, phase = %project.phase, "Resumed project");
        self.project = project;
        self.machine.sync(&self.project);
        self.highlighter.teardown();
        self.last_trigger = None;

        let t = self.translator();
        let notice = t.translate_with(&RESUMED, &[("title", self.project.title())]);
        let state = doc(&self.project, &self.machine, &self.resumable);
        self.conversation.restart(&state, Some(notice), now);
        Ok(())
    }

    /// Explicit continue, outside the conversation's own continue prompt.
    pub fn continue_phase(&mut self) -> PhaseResult<Advance> {
        let now = self.now();
        let advance = self.machine.continue_phase(&mut self.project)?;
        self.autosave();
        let notice = self.advance_notice(advance);
        let state = doc(&self.project, &self.machine, &self.resumable);
        self.conversation.refresh(&state, Some(notice), now);
        Ok(advance)
    }

    /// Enter optimize before integrate is complete. Its section is inert
    /// until integrate is satisfied.
    pub fn preview_optimize(&mut self) -> PhaseResult<()> {
        let now = self.now();
        self.machine.preview_optimize(&mut self.project)?;
        self.autosave();
        let t = self.translator();
        let notice = t
            .translate_with(&PREVIEW_ENTERED, &[("phase", t.translate(&phase_name(Phase::Optimize)))]);
        let state = doc(&self.project, &self.machine, &self.resumable);
        self.conversation.refresh(&state, Some(notice), now);
        Ok(())
    }

    /// The user scrolled or dragged the document view.
    pub fn note_manual_scroll(&mut self) {
        let now = self.now();
        self.highlighter.note_manual_scroll(now);
    }

    pub fn new_thread(&mut self) -> ThreadId {
        let now = self.now();
        self.conversation.new_thread(now)
    }

    pub fn switch_thread(&mut self, id: ThreadId) -> SubmitResult<()> {
        let now = self.now();
        self.conversation.switch_to(id, now)
    }

    /// Fire every due timer.
    pub fn tick(&mut self) {
        let now = self.now();
        self.conversation.tick(now);
        self.highlighter.tick(now);
    }

    /// Earliest pending deadline across the conversation and highlights.
    pub fn next_deadline(&self) -> Option<Millis> {
        match (self.conversation.next_deadline(), self.highlighter.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Save the project. Returns the file written, or `None` without a store.
    pub fn save(&self) -> anyhow::Result<Option<PathBuf>> {
        match &self.store {
            Some(store) => Ok(Some(store.save(&self.project)?)),
            None => Ok(None),
        }
    }

    fn autosave(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, project = %self.project.id, "Autosave failed");
        }
    }

    /// Cancel every timer.
    pub fn teardown(&mut self) {
        self.conversation.teardown();
        self.highlighter.teardown();
    }

    pub fn quit(&mut self) {
        self.teardown();
        self.should_quit = true;
    }

    /// Snapshot of everything the presentation renders.
    pub fn view(&self) -> SessionView {
        let readiness = self.readiness();
        let threads = self
            .conversation
            .threads()
            .iter()
            .map(|thread| ThreadView {
                id: thread.id(),
                kind: thread.kind(),
                active: thread.id() == self.conversation.active_id(),
                thinking: thread.is_thinking(),
                locked: thread.is_locked(),
                input: thread.input_kind(),
                options: thread.surface().options().to_vec(),
                messages: thread
                    .messages()
                    .iter()
                    .map(|m| MessageView { role: m.role, kind: m.kind, text: m.visible().to_string() })
                    .collect(),
            })
            .collect();

        SessionView {
            project: self.project.id.clone(),
            title: self.project.title().to_string(),
            phase: self.project.phase,
            stage: self.machine.extract_stage(),
            sections: PhaseMachine::sections(&self.project)
                .into_iter()
                .map(|(phase, state)| SectionView { phase, state, ready: readiness.get(phase) })
                .collect(),
            threads,
            highlights: self.highlighter.highlights().cloned().collect(),
            scroll_locked: self.highlighter.is_scroll_locked(self.now()),
        }
    }

    /// The latest scroll request, consumed by the presentation.
    pub fn take_scroll_intent(&mut self) -> Option<ScrollIntent> {
        self.highlighter.take_scroll_intent()
    }
}

/// Per-section presentation state with its ready badge.
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub phase: Phase,
    pub state: SectionState,
    pub ready: bool,
}

/// A message as currently disclosed.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub role: Role,
    pub kind: MessageKind,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadView {
    pub id: ThreadId,
    pub kind: ThreadKind,
    pub active: bool,
    pub thinking: bool,
    pub locked: bool,
    pub input: InputKind,
    pub options: Vec<ChoiceOption>,
    pub messages: Vec<MessageView>,
}

/// Everything the presentation renders, in one serializable value.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub project: String,
    pub title: String,
    pub phase: Phase,
    pub stage: Option<ExtractStage>,
    pub sections: Vec<SectionView>,
    pub threads: Vec<ThreadView>,
    pub highlights: Vec<ActiveHighlight>,
    pub scroll_locked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::{HighlightKind, Locator};
    use crate::conversation::Step;
    use crate::core::ManualClock;
    use crate::document::ProfileField;
    use tempfile::TempDir;

    fn settle(app: &mut App<ManualClock>) {
        while let Some(at) = app.next_deadline() {
            if app.conversation().main().is_locked() || app.conversation().active().is_locked() {
                app.clock().set(at.max(app.now()));
                app.tick();
            } else {
                break;
            }
        }
    }

    fn app() -> App<ManualClock> {
        let mut app = App::new(Config::default(), None, ManualClock::new(0));
        settle(&mut app);
        app
    }

    fn step(app: &App<ManualClock>) -> Step {
        app.conversation().main().prompt().unwrap().step.clone()
    }

    #[test]
    fn test_opening_then_profile() {
        let mut app = app();
        assert_eq!(step(&app), Step::Opening);

        app.submit(Conversation::MAIN, Answer::Choice("standard".into())).unwrap();
        settle(&mut app);
        assert_eq!(step(&app), Step::Profile(ProfileField::BusinessName));

        app.submit(Conversation::MAIN, Answer::Text("Acme".into())).unwrap();
        settle(&mut app);
        assert_eq!(app.project().profile.business_name, "Acme");
        assert_eq!(step(&app), Step::Profile(ProfileField::CoreService));

        let highlight = app.highlighter().active(HighlightKind::Cell).unwrap();
        assert_eq!(highlight.locator, Locator::profile(ProfileField::BusinessName));
    }

    #[test]
    fn test_refused_answer_keeps_prompt() {
        let mut app = app();
        app.submit(Conversation::MAIN, Answer::Choice("standard".into())).unwrap();
        settle(&mut app);

        let err = app.submit(Conversation::MAIN, Answer::Text("   ".into())).unwrap_err();
        assert_eq!(err, SubmitError::Blank);
        let main = app.conversation().main();
        assert_eq!(main.messages().last().unwrap().kind, MessageKind::Error);
        assert_eq!(step(&app), Step::Profile(ProfileField::BusinessName));
    }

    #[test]
    fn test_resume_failure_is_a_single_notice() {
        let dir = TempDir::new().unwrap();
        let store = ProjectStore::new(dir.path());
        let saved = Project::default();
        let path = store.save(&saved).unwrap();

        let mut app = App::new(Config::default(), Some(store), ManualClock::new(0));
        settle(&mut app);
        let before = app.project().clone();

        // Corrupted after it was offered
        std::fs::write(&path, "{ not json").unwrap();
        app.submit(Conversation::MAIN, Answer::Resume(saved.id.clone())).unwrap();
        assert_eq!(app.project(), &before);
        let errors = app
            .conversation()
            .main()
            .messages()
            .iter()
            .filter(|m| m.kind == MessageKind::Error)
            .count();
        assert_eq!(errors, 1);
        assert_eq!(step(&app), Step::Opening);
    }

    #[test]
    fn test_resume_lands_on_pending_step() {
        let dir = TempDir::new().unwrap();
        let store = ProjectStore::new(dir.path());
        let mut saved = Project::default();
        saved.profile.business_name = "Acme".into();
        store.save(&saved).unwrap();

        let mut app = App::new(Config::default(), Some(ProjectStore::new(dir.path())), ManualClock::new(0));
        settle(&mut app);
        app.submit(Conversation::MAIN, Answer::Resume(saved.id.clone())).unwrap();
        settle(&mut app);

        assert_eq!(app.project().id, saved.id);
        assert_eq!(step(&app), Step::Profile(ProfileField::CoreService));
    }

    #[test]
    fn test_view_reports_sections() {
        let app = app();
        let view = app.view();
        assert_eq!(view.phase, Phase::Define);
        assert_eq!(view.sections.len(), 6);
        assert_eq!(view.sections[0].state, SectionState::Active);
        assert_eq!(view.sections[1].state, SectionState::Hidden);
        assert!(!view.sections[0].ready);
        assert_eq!(view.threads[0].input, InputKind::SingleSelectWithResume);
    }
}
