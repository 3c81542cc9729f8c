//! Phase exit criteria.
//!
//! Each predicate is a pure function of the project. They are cheap enough
//! to evaluate on every frame and hold no state.

use serde::Serialize;

use super::phase::Phase;
use super::project::Project;

fn filled(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Business is named and every flow bucket of its track holds an item.
/// Core service and target client are optional.
pub fn define_ready(project: &Project) -> bool {
    filled(&project.profile.business_name)
        && project.flow.buckets().iter().all(|(_, items)| items.iter().any(|i| filled(i)))
}

/// Every department is staffed and owns at least one responsibility.
pub fn assign_ready(project: &Project) -> bool {
    !project.departments.is_empty()
        && project.departments.iter().all(|d| d.is_staffed() && !d.responsibilities.is_empty())
}

/// Every registry row has a definition of done. An empty registry has
/// nothing extracted yet and does not count.
pub fn extract_ready(project: &Project) -> bool {
    !project.extraction_registry.is_empty()
        && project.extraction_registry.iter().all(|row| row.has_standard())
}

/// At least one library record has real content.
pub fn organize_ready(project: &Project) -> bool {
    project.system_library.iter().any(|r| r.has_content())
}

/// Every department with responsibilities has finished all adoption steps.
pub fn integrate_ready(project: &Project) -> bool {
    let mut active = project.integrate_departments().peekable();
    active.peek().is_some() && active.all(|(_, d)| project.integrate_plan.is_complete_for(&d.name))
}

/// KPIs are tracked and every problem is resolved.
pub fn optimize_ready(project: &Project) -> bool {
    !project.optimize_data.kpis.is_empty()
        && project.optimize_data.problems.iter().all(|p| p.is_resolved())
}

/// Dispatch to the predicate of `phase`.
pub fn is_ready(project: &Project, phase: Phase) -> bool {
    match phase {
        Phase::Define => define_ready(project),
        Phase::Assign => assign_ready(project),
        Phase::Extract => extract_ready(project),
        Phase::Organize => organize_ready(project),
        Phase::Integrate => integrate_ready(project),
        Phase::Optimize => optimize_ready(project),
    }
}

/// Predicate results for every phase, e.g. for "ready" badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseReadiness([bool; 6]);

impl PhaseReadiness {
    pub fn evaluate(project: &Project) -> Self {
        Self(Phase::ALL.map(|phase| is_ready(project, phase)))
    }

    pub fn get(&self, phase: Phase) -> bool {
        self.0[phase.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Phase, bool)> + '_ {
        Phase::ALL.into_iter().zip(self.0)
    }
}
