//! Applying commit intents to the project.

use super::action::Action;
use super::trigger::{HighlightKind, HighlightTrigger, Locator};
use crate::core::Millis;
use crate::document::{
    DocPath, PatchValue, Project, RecordField, RegistryField, ValidationError, ValidationResult,
};
use crate::workflow::{PhaseMachine, SectionState};

/// Apply one answer and describe what changed.
///
/// The target section must be mounted and interactive. Exactly one trigger is
/// produced per commit; collection-wide answers are addressed as a whole.
/// On error the project is left as it was.
pub fn commit(
    project: &mut Project,
    action: &Action,
    value: PatchValue,
    now: Millis,
) -> ValidationResult<HighlightTrigger> {
    let section = action.section();
    match PhaseMachine::section(project, section) {
        SectionState::Hidden => return Err(ValidationError::SectionHidden(section.as_str())),
        SectionState::Inert => return Err(ValidationError::SectionInert(section.as_str())),
        SectionState::Active | SectionState::Reference => {}
    }

    let (kind, locator) = match action.target() {
        Some(path) => {
            project.apply_patch(&path, value)?;
            locate(project, action)?
        }
        None => document_row(project, action, value)?,
    };
    project.touch();

    tracing::debug!(?action, %locator, ?kind, "Committed answer");
    Ok(HighlightTrigger::new(kind, locator, now))
}

fn department_index(project: &Project, name: &str) -> ValidationResult<usize> {
    project
        .department_index(name)
        .ok_or_else(|| ValidationError::UnknownDepartment(name.to_string()))
}

fn locate(project: &Project, action: &Action) -> ValidationResult<(HighlightKind, Locator)> {
    let located = match action {
        Action::ChooseTrack => (HighlightKind::Card, Locator::Flow),
        Action::SetProfile(field) => (HighlightKind::Cell, Locator::profile(*field)),
        Action::SetFlowBucket(bucket) => {
            (HighlightKind::Row, Locator::FlowBucket { bucket: *bucket })
        }
        Action::SetDepartments => (HighlightKind::Card, Locator::Departments),
        Action::SetDepartmentField { department, field } => (
            HighlightKind::Cell,
            Locator::department_field(department_index(project, department)?, *field),
        ),
        Action::SetSubActivities { department, responsibility } => {
            let index = department_index(project, department)?;
            let responsibility = project.departments[index]
                .responsibilities
                .iter()
                .position(|r| r == responsibility)
                .unwrap_or_default();
            (HighlightKind::Row, Locator::SubActivities { department: index, responsibility })
        }
        Action::SetRegistryField { row, field: RegistryField::Method } => {
            (HighlightKind::Row, Locator::RegistryRow { row: *row })
        }
        Action::SetRegistryField { row, field } => {
            (HighlightKind::Cell, Locator::registry_cell(*row, *field))
        }
        Action::SetRecordField { id, .. } => {
            (HighlightKind::Card, Locator::LibraryCard { id: id.clone() })
        }
        Action::SetAdoption(department) | Action::SetAdoptionStep { department, .. } => (
            HighlightKind::Row,
            Locator::IntegrateRow { department: department_index(project, department)? },
        ),
        Action::SetKpis => (HighlightKind::Card, Locator::Kpis),
        Action::SetProblems => (HighlightKind::Card, Locator::Problems),
        Action::SetProblemAction { problem, .. } => {
            (HighlightKind::Row, Locator::ProblemRow { problem: *problem })
        }
        Action::DocumentRow(row) => {
            let id = project.record_for_row(*row).map(|r| r.id.clone()).unwrap_or_default();
            (HighlightKind::Card, Locator::LibraryCard { id })
        }
    };
    Ok(located)
}

fn document_row(
    project: &mut Project,
    action: &Action,
    value: PatchValue,
) -> ValidationResult<(HighlightKind, Locator)> {
    let Action::DocumentRow(row) = action else {
        return Err(ValidationError::WrongValueType {
            path: format!("{action:?}"),
            expected: "a document path",
        });
    };
    let PatchValue::List(steps) = value else {
        return Err(ValidationError::WrongValueType {
            path: format!("extractionRegistry[{row}]"),
            expected: "a list",
        });
    };
    if steps.iter().all(|s| s.trim().is_empty()) {
        return Err(ValidationError::Empty("step"));
    }

    let id = match project.record_for_row(*row) {
        Some(record) => record.id.clone(),
        None => project.create_record_for_row(*row)?,
    };
    project.apply_patch(
        &DocPath::Record { id: id.clone(), field: RecordField::Steps },
        PatchValue::List(steps),
    )?;
    Ok((HighlightKind::Card, Locator::LibraryCard { id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DepartmentField, FlowBucket, Phase, ProfileField};

    fn text(s: &str) -> PatchValue {
        PatchValue::Text(s.into())
    }

    fn list(items: &[&str]) -> PatchValue {
        PatchValue::List(items.iter().map(|s| s.to_string()).collect())
    }

    fn assign_project() -> Project {
        let mut p = Project::default();
        p.phase = Phase::Assign;
        commit(&mut p, &Action::SetDepartments, list(&["Sales", "Ops"]), 0).unwrap();
        p
    }

    #[test]
    fn test_single_trigger_for_whole_collection() {
        let mut p = Project::default();
        p.phase = Phase::Assign;
        let trigger = commit(&mut p, &Action::SetDepartments, list(&["Sales", "Ops"]), 42).unwrap();
        assert_eq!(trigger.kind, HighlightKind::Card);
        assert_eq!(trigger.locator, Locator::Departments);
        assert_eq!(trigger.timestamp, 42);
    }

    #[test]
    fn test_department_field_locator_uses_index() {
        let mut p = assign_project();
        let action =
            Action::SetDepartmentField { department: "Ops".into(), field: DepartmentField::Head };
        let trigger = commit(&mut p, &action, text("Ana"), 1).unwrap();
        assert_eq!(trigger.locator, Locator::department_field(1, DepartmentField::Head));
        assert_eq!(trigger.kind, HighlightKind::Cell);
    }

    #[test]
    fn test_rejected_commit_leaves_project() {
        let mut p = assign_project();
        let before = p.clone();
        let action = Action::SetDepartmentField {
            department: "Marketing".into(),
            field: DepartmentField::Head,
        };
        assert!(commit(&mut p, &action, text("Ana"), 1).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn test_future_sections_are_closed() {
        let mut p = Project::default();
        let err = commit(&mut p, &Action::SetKpis, list(&["Revenue"]), 0).unwrap_err();
        assert_eq!(err, ValidationError::SectionHidden("optimize"));
    }

    #[test]
    fn test_inert_optimize_rejects_edits() {
        let mut p = Project::default();
        p.phase = Phase::Optimize;
        let err = commit(&mut p, &Action::SetKpis, list(&["Revenue"]), 0).unwrap_err();
        assert_eq!(err, ValidationError::SectionInert("optimize"));
        assert!(p.optimize_data.kpis.is_empty());
    }

    #[test]
    fn test_earlier_sections_stay_editable() {
        let mut p = assign_project();
        let trigger = commit(
            &mut p,
            &Action::SetProfile(ProfileField::BusinessName),
            text("Acme"),
            5,
        )
        .unwrap();
        assert_eq!(trigger.locator, Locator::profile(ProfileField::BusinessName));

        let trigger =
            commit(&mut p, &Action::SetFlowBucket(FlowBucket::Sales), list(&["Quotes"]), 6).unwrap();
        assert_eq!(trigger.kind, HighlightKind::Row);
    }

    #[test]
    fn test_document_row_creates_then_reuses_record() {
        let mut p = assign_project();
        let sales = p.department_mut("Sales").unwrap();
        sales.set_responsibilities(vec!["Calls".into()]).unwrap();
        sales.set_sub_activities("Calls", vec!["Dial".into()]).unwrap();
        p.sync_registry();
        p.phase = Phase::Organize;

        let first = commit(&mut p, &Action::DocumentRow(0), list(&["Open CRM"]), 0).unwrap();
        let second =
            commit(&mut p, &Action::DocumentRow(0), list(&["Open CRM", "Dial"]), 1).unwrap();

        assert_eq!(first.locator, second.locator);
        assert_eq!(p.system_library.len(), 1);
        assert_eq!(p.system_library[0].steps, vec!["Open CRM", "Dial"]);
        assert_eq!(p.system_library[0].sub_activity, "Dial");

        assert_eq!(
            commit(&mut p, &Action::DocumentRow(0), list(&[" "]), 2).unwrap_err(),
            ValidationError::Empty("step")
        );
    }

    #[test]
    fn test_commit_touches_activity() {
        let mut p = assign_project();
        let before = p.activity_timestamp;
        std::thread::sleep(std::time::Duration::from_millis(2));
        commit(&mut p, &Action::SetDepartments, list(&["Sales"]), 0).unwrap();
        assert!(p.activity_timestamp > before);
    }
}
