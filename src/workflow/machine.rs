//! The phase state machine.
//!
//! Phases advance only on an explicit continue once the current phase's
//! predicate holds. Earlier sections stay mounted for reference; the
//! optimize section can be previewed before integrate is finished, in which
//! case it is shown but inert.

use serde::Serialize;
use thiserror::Error;

use crate::document::{integrate_ready, is_ready, ExtractStage, Phase, Project};

/// Result type for phase transitions.
pub type PhaseResult<T> = Result<T, PhaseError>;

/// A rejected phase transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    /// The current phase's exit criteria are not met.
    #[error("The {0} phase is not complete yet")]
    NotReady(Phase),

    /// Already in the final phase.
    #[error("Already in the final phase")]
    AlreadyFinal,

    /// Preview is only offered from integrate into optimize.
    #[error("Cannot preview optimize from the {0} phase")]
    PreviewNotAllowed(Phase),
}

/// How a phase's document section is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionState {
    /// Not reached yet; not mounted.
    Hidden,
    /// The phase being worked on.
    Active,
    /// An earlier phase, kept visible and editable.
    Reference,
    /// Shown for preview with inputs disabled.
    Inert,
}

impl SectionState {
    pub fn is_mounted(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    pub fn accepts_input(self) -> bool {
        matches!(self, Self::Active | Self::Reference)
    }
}

/// Outcome of a continue action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next extract sub-stage.
    Stage(ExtractStage),
    /// Moved to the next phase.
    Phase(Phase),
}

/// Tracks the transient extract sub-stage; the phase itself lives on the
/// project so it survives save and resume.
#[derive(Debug, Clone, Default)]
pub struct PhaseMachine {
    extract_stage: Option<ExtractStage>,
}

impl PhaseMachine {
    /// A machine positioned for the project's current phase.
    pub fn for_project(project: &Project) -> Self {
        let mut machine = Self::default();
        machine.sync(project);
        machine
    }

    /// Re-align transient state after the project was replaced wholesale.
    pub fn sync(&mut self, project: &Project) {
        self.extract_stage = (project.phase == Phase::Extract).then_some(ExtractStage::Brainstorm);
    }

    pub fn extract_stage(&self) -> Option<ExtractStage> {
        self.extract_stage
    }

    /// Whether a continue right now would succeed.
    pub fn can_continue(&self, project: &Project) -> bool {
        match self.extract_stage {
            Some(stage) if stage.next().is_some() => true,
            _ => project.phase.next().is_some() && is_ready(project, project.phase),
        }
    }

    /// Handle an explicit continue.
    ///
    /// Inside extract, continue first walks the sub-stages (which have no
    /// predicates of their own); leaving extract needs its predicate like any
    /// other phase.
    pub fn continue_phase(&mut self, project: &mut Project) -> PhaseResult<Advance> {
        if let Some(next) = self.extract_stage.and_then(ExtractStage::next) {
            self.extract_stage = Some(next);
            tracing::debug!(stage = ?next, "Advanced extract stage");
            return Ok(Advance::Stage(next));
        }

        let current = project.phase;
        let next = current.next().ok_or(PhaseError::AlreadyFinal)?;
        if !is_ready(project, current) {
            return Err(PhaseError::NotReady(current));
        }
        self.enter(project, next);
        Ok(Advance::Phase(next))
    }

    /// Step from integrate into optimize without integrate being complete.
    /// The optimize section is then inert until integrate is satisfied.
    pub fn preview_optimize(&mut self, project: &mut Project) -> PhaseResult<()> {
        if project.phase != Phase::Integrate {
            return Err(PhaseError::PreviewNotAllowed(project.phase));
        }
        self.enter(project, Phase::Optimize);
        Ok(())
    }

    fn enter(&mut self, project: &mut Project, phase: Phase) {
        tracing::info!(from = %project.phase, to = %phase, "Entering phase");
        project.phase = phase;
        project.touch();
        self.sync(project);
    }

    /// Presentation state of `phase`'s section for the project as it is now.
    pub fn section(project: &Project, phase: Phase) -> SectionState {
        let current = project.phase;
        if phase > current {
            SectionState::Hidden
        } else if phase == Phase::Optimize && !integrate_ready(project) {
            SectionState::Inert
        } else if phase == current {
            SectionState::Active
        } else {
            SectionState::Reference
        }
    }

    /// Section states for every phase, in order.
    pub fn sections(project: &Project) -> [(Phase, SectionState); 6] {
        Phase::ALL.map(|phase| (phase, Self::section(project, phase)))
    }
}
