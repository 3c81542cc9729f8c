//! Resolving locators to anchors in the current view.

use serde::Serialize;

use crate::commit::Locator;
use crate::document::{Phase, Project};
use crate::workflow::PhaseMachine;

/// A concrete, currently rendered element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub id: String,
    pub section: Phase,
}

/// Maps a structural locator to an anchor, if one is rendered right now.
pub trait AnchorResolver {
    fn resolve(&self, locator: &Locator) -> Option<Anchor>;
}

impl<F> AnchorResolver for F
where
    F: Fn(&Locator) -> Option<Anchor>,
{
    fn resolve(&self, locator: &Locator) -> Option<Anchor> {
        self(locator)
    }
}

/// Resolves against the document sections mounted for the project's phase.
#[derive(Debug, Clone, Copy)]
pub struct SectionAnchors<'a> {
    project: &'a Project,
}

impl<'a> SectionAnchors<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }
}

impl AnchorResolver for SectionAnchors<'_> {
    fn resolve(&self, locator: &Locator) -> Option<Anchor> {
        let section = locator.section();
        if !PhaseMachine::section(self.project, section).is_mounted() {
            return None;
        }

        let p = self.project;
        let rendered = match locator {
            Locator::Profile { .. }
            | Locator::Flow
            | Locator::Departments
            | Locator::Kpis
            | Locator::Problems => true,
            Locator::FlowBucket { bucket } => p.flow.bucket(*bucket).is_some(),
            Locator::DepartmentField { department, .. } => *department < p.departments.len(),
            Locator::IntegrateRow { department } => {
                p.integrate_departments().any(|(d, _)| d == *department)
            }
            Locator::SubActivities { department, responsibility } => p
                .departments
                .get(*department)
                .is_some_and(|d| *responsibility < d.responsibilities.len()),
            Locator::RegistryRow { row } | Locator::RegistryCell { row, .. } => {
                *row < p.extraction_registry.len()
            }
            Locator::LibraryCard { id } => p.record(id).is_some(),
            Locator::ProblemRow { problem } => *problem < p.optimize_data.problems.len(),
        };

        rendered.then(|| Anchor { id: locator.to_string(), section })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DepartmentField, DocPath, FlowBucket, PatchValue, Track};

    #[test]
    fn test_unmounted_sections_do_not_resolve() {
        let project = Project::new(Track::Standard);
        let anchors = SectionAnchors::new(&project);
        assert!(anchors.resolve(&Locator::Departments).is_none());
        assert!(anchors.resolve(&Locator::Kpis).is_none());

        let anchor = anchors.resolve(&Locator::Flow).unwrap();
        assert_eq!(anchor.id, "flow");
        assert_eq!(anchor.section, Phase::Define);
    }

    #[test]
    fn test_missing_rows_do_not_resolve() {
        let mut project = Project::new(Track::Standard);
        project.phase = Phase::Extract;
        let anchors = SectionAnchors::new(&project);
        assert!(anchors.resolve(&Locator::RegistryRow { row: 0 }).is_none());
        assert!(anchors.resolve(&Locator::DepartmentField { department: 0, field: "head" }).is_none());
    }

    #[test]
    fn test_integrate_rows_follow_departments_with_duties() {
        let mut project = Project::new(Track::Standard);
        project
            .apply_patch(&DocPath::Departments, PatchValue::List(vec!["Sales".into(), "Ops".into()]))
            .unwrap();
        let duties = DocPath::Department {
            department: "Sales".into(),
            field: DepartmentField::Responsibilities,
        };
        project.apply_patch(&duties, PatchValue::List(vec!["Outbound calls".into()])).unwrap();
        project.phase = Phase::Integrate;

        let anchors = SectionAnchors::new(&project);
        let sales = anchors.resolve(&Locator::IntegrateRow { department: 0 }).unwrap();
        assert_eq!(sales.id, "integrate-0");
        assert!(anchors.resolve(&Locator::IntegrateRow { department: 1 }).is_none());
    }

    #[test]
    fn test_other_track_bucket_does_not_resolve() {
        let project = Project::new(Track::Growth);
        let anchors = SectionAnchors::new(&project);
        assert!(anchors.resolve(&Locator::FlowBucket { bucket: FlowBucket::Attention }).is_none());
        assert!(anchors.resolve(&Locator::FlowBucket { bucket: FlowBucket::People }).is_some());
    }
}
