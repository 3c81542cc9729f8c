//! The system library: one documented system per captured sub-activity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::registry::CaptureMethod;

/// Lifecycle status of a documented system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SystemStatus {
    #[default]
    Draft,
    InReview,
    Active,
    Archived,
}

impl SystemStatus {
    pub const ALL: [Self; 4] = [Self::Draft, Self::InReview, Self::Active, Self::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InReview => "in-review",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '_'], "-");
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| format!("unknown status: {s}"))
    }
}

/// A documented system in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub department: String,
    #[serde(default)]
    pub responsibility: String,
    #[serde(default)]
    pub sub_activity: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub method: Option<CaptureMethod>,
    #[serde(default)]
    pub standard: String,
    #[serde(default)]
    pub status: SystemStatus,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub trigger: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl SystemRecord {
    /// An empty record inside a department.
    pub fn new(department: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: String::new(),
            department: department.into(),
            responsibility: String::new(),
            sub_activity: String::new(),
            owner: String::new(),
            method: None,
            standard: String::new(),
            status: SystemStatus::Draft,
            overview: String::new(),
            goal: String::new(),
            trigger: String::new(),
            inputs: Vec::new(),
            steps: Vec::new(),
            tools: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Whether the record documents anything beyond its identity.
    pub fn has_content(&self) -> bool {
        self.steps.iter().any(|s| !s.trim().is_empty())
            || !self.overview.trim().is_empty()
            || !self.goal.trim().is_empty()
    }

    /// Whether this record documents the given registry coordinates.
    pub fn documents(&self, department: &str, responsibility: &str, sub_activity: &str) -> bool {
        self.department == department
            && self.responsibility == responsibility
            && self.sub_activity == sub_activity
    }
}

/// Editable fields of a [`SystemRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Title,
    Responsibility,
    SubActivity,
    Owner,
    Method,
    Standard,
    Status,
    Overview,
    Goal,
    Trigger,
    Inputs,
    Steps,
    Tools,
    Resources,
}

impl RecordField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Responsibility => "responsibility",
            Self::SubActivity => "subActivity",
            Self::Owner => "owner",
            Self::Method => "method",
            Self::Standard => "standard",
            Self::Status => "status",
            Self::Overview => "overview",
            Self::Goal => "goal",
            Self::Trigger => "trigger",
            Self::Inputs => "inputs",
            Self::Steps => "steps",
            Self::Tools => "tools",
            Self::Resources => "resources",
        }
    }

    /// List-valued fields; the rest take text.
    pub fn is_list(self) -> bool {
        matches!(self, Self::Inputs | Self::Steps | Self::Tools | Self::Resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_empty() {
        let record = SystemRecord::new("Sales");
        assert_eq!(record.department, "Sales");
        assert_eq!(record.status, SystemStatus::Draft);
        assert!(!record.has_content());
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_content_detection() {
        let mut record = SystemRecord::new("Sales");
        record.steps = vec!["   ".into()];
        assert!(!record.has_content());
        record.goal = "Close within a week".into();
        assert!(record.has_content());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("In review".parse::<SystemStatus>().unwrap(), SystemStatus::InReview);
        assert!("done".parse::<SystemStatus>().is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(SystemRecord::new("A").id, SystemRecord::new("A").id);
    }
}
