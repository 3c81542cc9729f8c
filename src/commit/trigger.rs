//! Highlight triggers.

use std::fmt;

use serde::Serialize;

use crate::core::Millis;
use crate::document::{DepartmentField, FlowBucket, Phase, ProfileField, RegistryField};

/// Visual shape of the changed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightKind {
    Row,
    Cell,
    Card,
}

impl HighlightKind {
    pub const ALL: [Self; 3] = [Self::Row, Self::Cell, Self::Card];
}

/// Structural address of a changed element.
///
/// Locators name positions in the document, never rendering handles; the
/// presentation resolves them to anchors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "at", rename_all = "kebab-case")]
pub enum Locator {
    Profile { field: &'static str },
    /// The whole flow section, e.g. after a track switch
    Flow,
    FlowBucket { bucket: FlowBucket },
    /// The whole department collection
    Departments,
    DepartmentField { department: usize, field: &'static str },
    SubActivities { department: usize, responsibility: usize },
    RegistryRow { row: usize },
    RegistryCell { row: usize, field: &'static str },
    LibraryCard { id: String },
    IntegrateRow { department: usize },
    Kpis,
    Problems,
    ProblemRow { problem: usize },
}

impl Locator {
    pub fn profile(field: ProfileField) -> Self {
        Self::Profile { field: field.as_str() }
    }

    pub fn department_field(department: usize, field: DepartmentField) -> Self {
        Self::DepartmentField { department, field: field.as_str() }
    }

    pub fn registry_cell(row: usize, field: RegistryField) -> Self {
        Self::RegistryCell { row, field: field.as_str() }
    }

    /// The phase whose section renders this location.
    pub fn section(&self) -> Phase {
        match self {
            Self::Profile { .. } | Self::Flow | Self::FlowBucket { .. } => Phase::Define,
            Self::Departments | Self::DepartmentField { .. } => Phase::Assign,
            Self::SubActivities { .. } | Self::RegistryRow { .. } | Self::RegistryCell { .. } => {
                Phase::Extract
            }
            Self::LibraryCard { .. } => Phase::Organize,
            Self::IntegrateRow { .. } => Phase::Integrate,
            Self::Kpis | Self::Problems | Self::ProblemRow { .. } => Phase::Optimize,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile { field } => write!(f, "profile-{field}"),
            Self::Flow => write!(f, "flow"),
            Self::FlowBucket { bucket } => write!(f, "flow-{bucket}"),
            Self::Departments => write!(f, "departments"),
            Self::DepartmentField { department, field } => {
                write!(f, "department-{department}-{field}")
            }
            Self::SubActivities { department, responsibility } => {
                write!(f, "sub-activities-{department}-{responsibility}")
            }
            Self::RegistryRow { row } => write!(f, "registry-{row}"),
            Self::RegistryCell { row, field } => write!(f, "registry-{row}-{field}"),
            Self::LibraryCard { id } => write!(f, "library-{id}"),
            Self::IntegrateRow { department } => write!(f, "integrate-{department}"),
            Self::Kpis => write!(f, "kpis"),
            Self::Problems => write!(f, "problems"),
            Self::ProblemRow { problem } => write!(f, "problem-{problem}"),
        }
    }
}

/// What just changed, emitted once per commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightTrigger {
    pub kind: HighlightKind,
    pub locator: Locator,
    pub timestamp: Millis,
}

impl HighlightTrigger {
    pub fn new(kind: HighlightKind, locator: Locator, timestamp: Millis) -> Self {
        Self { kind, locator, timestamp }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_sections() {
        assert_eq!(Locator::RegistryRow { row: 3 }.section(), Phase::Extract);
        assert_eq!(Locator::Departments.section(), Phase::Assign);
        assert_eq!(Locator::Kpis.section(), Phase::Optimize);
    }

    #[test]
    fn test_locator_anchor_names() {
        assert_eq!(Locator::registry_cell(2, RegistryField::Standard).to_string(), "registry-2-standard");
        assert_eq!(
            Locator::department_field(0, DepartmentField::Head).to_string(),
            "department-0-head"
        );
    }
}
