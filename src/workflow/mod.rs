//! Phase progression.
//!
//! - `PhaseMachine` - explicit continue, extract sub-stages, optimize preview
//! - `SectionState` - which document sections are mounted and interactive

mod machine;

pub use crate::document::{ExtractStage, Phase};
pub use machine::{Advance, PhaseError, PhaseMachine, PhaseResult, SectionState};
