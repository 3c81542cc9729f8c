//! Commit actions and their document targets.

use crate::document::{
    AdoptionStep, DepartmentField, DocPath, FlowBucket, Phase, ProfileField, RecordField,
    RegistryField,
};

/// What an answer changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    ChooseTrack,
    SetProfile(ProfileField),
    SetFlowBucket(FlowBucket),
    SetDepartments,
    SetDepartmentField { department: String, field: DepartmentField },
    SetSubActivities { department: String, responsibility: String },
    SetRegistryField { row: usize, field: RegistryField },
    /// Write the steps of the record documenting a registry row, creating
    /// the record if the row has none yet.
    DocumentRow(usize),
    SetRecordField { id: String, field: RecordField },
    SetAdoption(String),
    SetAdoptionStep { department: String, step: AdoptionStep },
    SetKpis,
    SetProblems,
    SetProblemAction { problem: usize, action: usize },
}

impl Action {
    /// The single path this action patches. `DocumentRow` resolves its
    /// record at commit time and has no fixed path.
    pub fn target(&self) -> Option<DocPath> {
        let path = match self {
            Self::ChooseTrack => DocPath::Track,
            Self::SetProfile(field) => DocPath::Profile(*field),
            Self::SetFlowBucket(bucket) => DocPath::Flow(*bucket),
            Self::SetDepartments => DocPath::Departments,
            Self::SetDepartmentField { department, field } => {
                DocPath::Department { department: department.clone(), field: *field }
            }
            Self::SetSubActivities { department, responsibility } => DocPath::SubActivities {
                department: department.clone(),
                responsibility: responsibility.clone(),
            },
            Self::SetRegistryField { row, field } => DocPath::Registry { row: *row, field: *field },
            Self::DocumentRow(_) => return None,
            Self::SetRecordField { id, field } => DocPath::Record { id: id.clone(), field: *field },
            Self::SetAdoption(department) => DocPath::Adoption { department: department.clone() },
            Self::SetAdoptionStep { department, step } => {
                DocPath::AdoptionStep { department: department.clone(), step: *step }
            }
            Self::SetKpis => DocPath::Kpis,
            Self::SetProblems => DocPath::Problems,
            Self::SetProblemAction { problem, action } => {
                DocPath::ProblemAction { problem: *problem, action: *action }
            }
        };
        Some(path)
    }

    /// The phase whose section this action edits.
    pub fn section(&self) -> Phase {
        match self {
            Self::ChooseTrack | Self::SetProfile(_) | Self::SetFlowBucket(_) => Phase::Define,
            Self::SetDepartments | Self::SetDepartmentField { .. } => Phase::Assign,
            Self::SetSubActivities { .. } | Self::SetRegistryField { .. } => Phase::Extract,
            Self::DocumentRow(_) | Self::SetRecordField { .. } => Phase::Organize,
            Self::SetAdoption(_) | Self::SetAdoptionStep { .. } => Phase::Integrate,
            Self::SetKpis | Self::SetProblems | Self::SetProblemAction { .. } => Phase::Optimize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets() {
        assert_eq!(Action::SetKpis.target(), Some(DocPath::Kpis));
        assert_eq!(
            Action::SetRegistryField { row: 2, field: RegistryField::Standard }
                .target()
                .map(|p| p.to_string()),
            Some("extractionRegistry[2].standard".to_string())
        );
        assert_eq!(Action::DocumentRow(0).target(), None);
    }

    #[test]
    fn test_sections() {
        assert_eq!(Action::ChooseTrack.section(), Phase::Define);
        assert_eq!(Action::SetAdoption("Sales".into()).section(), Phase::Integrate);
        assert_eq!(Action::SetProblems.section(), Phase::Optimize);
    }
}
