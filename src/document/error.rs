//! Document model error types.

use thiserror::Error;

/// Result type for document mutations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A mutation that is structurally invalid or carries an out-of-range value.
///
/// These are always recoverable: the conversation re-prompts with the same
/// input modality and the document is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Referenced department does not exist.
    #[error("Unknown department: {0}")]
    UnknownDepartment(String),

    /// Referenced responsibility does not belong to the department.
    #[error("Department '{department}' has no responsibility '{responsibility}'")]
    UnknownResponsibility { department: String, responsibility: String },

    /// Registry row index is out of range.
    #[error("Extraction registry has no row {0}")]
    UnknownRegistryRow(usize),

    /// Library record id not found.
    #[error("Unknown system record: {0}")]
    UnknownRecord(String),

    /// KPI or problem index out of range.
    #[error("No {kind} at index {index}")]
    UnknownItem { kind: &'static str, index: usize },

    /// A required text value was blank.
    #[error("{0} must not be blank")]
    Blank(&'static str),

    /// An empty selection or list where at least one item is required.
    #[error("At least one {0} is required")]
    Empty(&'static str),

    /// Duplicate name in a collection that must be unique.
    #[error("Duplicate {kind}: {name}")]
    Duplicate { kind: &'static str, name: String },

    /// Value has the wrong shape for the target path.
    #[error("{path} expects {expected}")]
    WrongValueType { path: String, expected: &'static str },

    /// Value outside an enumerated set.
    #[error("Invalid {field}: {value}")]
    InvalidChoice { field: &'static str, value: String },

    /// Flow bucket does not exist on the project's track.
    #[error("Flow bucket '{bucket}' is not part of the {track} track")]
    TrackMismatch { bucket: String, track: String },

    /// The targeted section is shown for reference only.
    #[error("The {0} section is read-only until the previous phase is complete")]
    SectionInert(&'static str),

    /// The targeted section belongs to a phase not reached yet.
    #[error("The {0} section is not available yet")]
    SectionHidden(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = ValidationError::UnknownResponsibility {
            department: "Sales".into(),
            responsibility: "Cold calls".into(),
        };
        assert_eq!(err.to_string(), "Department 'Sales' has no responsibility 'Cold calls'");

        let err = ValidationError::Duplicate { kind: "department", name: "Ops".into() };
        assert!(err.to_string().contains("Ops"));
    }
}
