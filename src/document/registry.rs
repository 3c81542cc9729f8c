//! The extraction registry.
//!
//! The registry is the flattened worklist of every sub-activity that still
//! needs documenting. It is never authored directly: [`derive_registry`] is
//! the only place rows are created or removed.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::department::Department;

/// How a sub-activity will be captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMethod {
    ScreenRecording,
    Camera,
    AudioNote,
    RolePlay,
    Text,
    Other,
}

impl CaptureMethod {
    pub const ALL: [Self; 6] = [
        Self::ScreenRecording,
        Self::Camera,
        Self::AudioNote,
        Self::RolePlay,
        Self::Text,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScreenRecording => "screen-recording",
            Self::Camera => "camera",
            Self::AudioNote => "audio-note",
            Self::RolePlay => "role-play",
            Self::Text => "text",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for CaptureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '_'], "-");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| format!("unknown capture method: {s}"))
    }
}

/// One row of the extraction registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub department: String,
    pub responsibility: String,
    pub sub_activity: String,

    /// Who will capture it; defaults to the department's worker
    #[serde(default)]
    pub worker: String,

    /// Chosen capture method
    #[serde(default)]
    pub method: Option<CaptureMethod>,

    /// Definition of done
    #[serde(default)]
    pub standard: String,
}

impl RegistryEntry {
    fn key(&self) -> (&str, &str, &str) {
        (&self.department, &self.responsibility, &self.sub_activity)
    }

    pub fn has_standard(&self) -> bool {
        !self.standard.trim().is_empty()
    }
}

/// Recompute the registry from the departments.
///
/// Produces exactly one row per (department, responsibility, sub-activity)
/// in department, responsibility and sub-activity order. Authored columns
/// (worker, method, standard) of rows that still exist in `previous` are
/// carried over; a blank worker falls back to the department's worker.
pub fn derive_registry(departments: &[Department], previous: &[RegistryEntry]) -> Vec<RegistryEntry> {
    let carried: HashMap<(&str, &str, &str), &RegistryEntry> =
        previous.iter().map(|e| (e.key(), e)).collect();

    let mut rows = Vec::new();
    for dept in departments {
        let dept_worker = dept.worker.clone().unwrap_or_default();
        for responsibility in &dept.responsibilities {
            for sub in dept.sub_activities_for(responsibility) {
                let row = match carried.get(&(dept.name.as_str(), responsibility.as_str(), sub.as_str())) {
                    Some(old) => {
                        let mut row = (*old).clone();
                        if row.worker.trim().is_empty() {
                            row.worker.clone_from(&dept_worker);
                        }
                        row
                    }
                    None => RegistryEntry {
                        department: dept.name.clone(),
                        responsibility: responsibility.clone(),
                        sub_activity: sub.clone(),
                        worker: dept_worker.clone(),
                        method: None,
                        standard: String::new(),
                    },
                };
                rows.push(row);
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departments() -> Vec<Department> {
        let mut sales = Department::new("Sales");
        sales.worker = Some("Ben".into());
        sales.set_responsibilities(vec!["Calls".into(), "Quotes".into()]).unwrap();
        sales.set_sub_activities("Calls", vec!["Dial".into(), "Log".into()]).unwrap();
        sales.set_sub_activities("Quotes", vec!["Price".into()]).unwrap();

        let mut ops = Department::new("Ops");
        ops.set_responsibilities(vec!["Ship".into()]).unwrap();
        vec![sales, ops]
    }

    #[test]
    fn test_one_row_per_sub_activity() {
        let rows = derive_registry(&departments(), &[]);
        let keys: Vec<_> = rows.iter().map(|r| r.sub_activity.as_str()).collect();
        assert_eq!(keys, vec!["Dial", "Log", "Price"]);
        assert!(rows.iter().all(|r| r.worker == "Ben"));
    }

    #[test]
    fn test_authored_columns_survive_rederivation() {
        let depts = departments();
        let mut rows = derive_registry(&depts, &[]);
        rows[1].standard = "Call logged in CRM".into();
        rows[1].method = Some(CaptureMethod::ScreenRecording);

        let mut depts = depts;
        depts[0].set_sub_activities("Calls", vec!["Prep".into(), "Dial".into(), "Log".into()]).unwrap();
        let rows = derive_registry(&depts, &rows);

        assert_eq!(rows.len(), 4);
        let log = rows.iter().find(|r| r.sub_activity == "Log").unwrap();
        assert_eq!(log.standard, "Call logged in CRM");
        assert_eq!(log.method, Some(CaptureMethod::ScreenRecording));
        let prep = rows.iter().find(|r| r.sub_activity == "Prep").unwrap();
        assert!(!prep.has_standard());
    }

    #[test]
    fn test_removed_sub_activity_drops_row() {
        let mut depts = departments();
        let before = derive_registry(&depts, &[]);
        depts[0].set_sub_activities("Calls", vec!["Dial".into()]).unwrap();
        let after = derive_registry(&depts, &before);
        assert_eq!(after.len(), before.len() - 1);
    }

    #[test]
    fn test_capture_method_parsing() {
        assert_eq!("Screen recording".parse::<CaptureMethod>().unwrap(), CaptureMethod::ScreenRecording);
        assert_eq!("role_play".parse::<CaptureMethod>().unwrap(), CaptureMethod::RolePlay);
        assert!("telepathy".parse::<CaptureMethod>().is_err());
    }
}
