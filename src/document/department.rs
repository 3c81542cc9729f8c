//! Departments, their responsibilities and sub-activities.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::error::{ValidationError, ValidationResult};

/// A department of the business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// Unique within the project
    pub name: String,

    /// Person accountable for the department
    #[serde(default)]
    pub head: Option<String>,

    /// Person doing the work day to day
    #[serde(default)]
    pub worker: Option<String>,

    /// Ordered, unique duties
    #[serde(default)]
    pub responsibilities: Vec<String>,

    /// Responsibility -> ordered sub-activities
    #[serde(default)]
    pub sub_activities: BTreeMap<String, Vec<String>>,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            head: None,
            worker: None,
            responsibilities: Vec::new(),
            sub_activities: BTreeMap::new(),
        }
    }

    pub fn has_responsibility(&self, responsibility: &str) -> bool {
        self.responsibilities.iter().any(|r| r == responsibility)
    }

    /// Sub-activities of a responsibility. A responsibility that has not been
    /// broken down yet has an empty list.
    pub fn sub_activities_for(&self, responsibility: &str) -> &[String] {
        self.sub_activities.get(responsibility).map_or(&[], Vec::as_slice)
    }

    /// Replace the responsibility list, dropping sub-activities of any
    /// responsibility that is no longer present.
    pub fn set_responsibilities(&mut self, items: Vec<String>) -> ValidationResult<()> {
        let items = clean_unique(items, "responsibility")?;
        self.sub_activities.retain(|key, _| items.contains(key));
        self.responsibilities = items;
        Ok(())
    }

    /// Append a responsibility.
    pub fn add_responsibility(&mut self, item: &str) -> ValidationResult<()> {
        let item = item.trim();
        if item.is_empty() {
            return Err(ValidationError::Blank("responsibility"));
        }
        if self.has_responsibility(item) {
            return Err(ValidationError::Duplicate {
                kind: "responsibility",
                name: item.to_string(),
            });
        }
        self.responsibilities.push(item.to_string());
        Ok(())
    }

    /// Replace the sub-activities of an existing responsibility.
    pub fn set_sub_activities(
        &mut self,
        responsibility: &str,
        items: Vec<String>,
    ) -> ValidationResult<()> {
        if !self.has_responsibility(responsibility) {
            return Err(ValidationError::UnknownResponsibility {
                department: self.name.clone(),
                responsibility: responsibility.to_string(),
            });
        }
        let items = clean_unique(items, "sub-activity")?;
        if items.is_empty() {
            self.sub_activities.remove(responsibility);
        } else {
            self.sub_activities.insert(responsibility.to_string(), items);
        }
        Ok(())
    }

    pub fn is_staffed(&self) -> bool {
        is_filled(self.head.as_deref()) && is_filled(self.worker.as_deref())
    }

    /// Check the department's own invariants.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Blank("department name"));
        }
        let mut seen = HashSet::new();
        for r in &self.responsibilities {
            if !seen.insert(r.as_str()) {
                return Err(ValidationError::Duplicate {
                    kind: "responsibility",
                    name: r.clone(),
                });
            }
        }
        for (key, items) in &self.sub_activities {
            if !self.has_responsibility(key) {
                return Err(ValidationError::UnknownResponsibility {
                    department: self.name.clone(),
                    responsibility: key.clone(),
                });
            }
            let mut seen = HashSet::new();
            for item in items {
                if !seen.insert(item.as_str()) {
                    return Err(ValidationError::Duplicate {
                        kind: "sub-activity",
                        name: item.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Trim entries, drop blanks and reject duplicates.
pub(crate) fn clean_unique(items: Vec<String>, kind: &'static str) -> ValidationResult<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if out.iter().any(|existing| existing == item) {
            return Err(ValidationError::Duplicate { kind, name: item.to_string() });
        }
        out.push(item.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> Department {
        let mut dept = Department::new("Sales");
        dept.set_responsibilities(vec!["Outbound calls".into()]).unwrap();
        dept
    }

    #[test]
    fn test_missing_sub_activities_are_empty() {
        let dept = sales();
        assert!(dept.sub_activities_for("Outbound calls").is_empty());
        assert!(dept.sub_activities_for("Never heard of it").is_empty());
    }

    #[test]
    fn test_sub_activities_require_responsibility() {
        let mut dept = sales();
        let err = dept.set_sub_activities("Inbound calls", vec!["Answer".into()]).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownResponsibility { .. }));
        assert!(dept.sub_activities.is_empty());
    }

    #[test]
    fn test_removing_responsibility_prunes_sub_activities() {
        let mut dept = sales();
        dept.add_responsibility("Follow-ups").unwrap();
        dept.set_sub_activities("Outbound calls", vec!["Dial".into(), "Log".into()]).unwrap();
        dept.set_sub_activities("Follow-ups", vec!["Email".into()]).unwrap();

        dept.set_responsibilities(vec!["Follow-ups".into()]).unwrap();

        assert_eq!(dept.sub_activities.len(), 1);
        assert_eq!(dept.sub_activities_for("Follow-ups"), ["Email".to_string()]);
        dept.validate().unwrap();
    }

    #[test]
    fn test_blank_entries_are_dropped_and_duplicates_rejected() {
        let mut dept = Department::new("Ops");
        dept.set_responsibilities(vec!["  Ship ".into(), String::new(), "Pack".into()]).unwrap();
        assert_eq!(dept.responsibilities, vec!["Ship", "Pack"]);

        let err = dept.set_responsibilities(vec!["Ship".into(), "Ship".into()]).unwrap_err();
        assert!(matches!(err, ValidationError::Duplicate { .. }));
        // Failed update leaves the previous list intact
        assert_eq!(dept.responsibilities, vec!["Ship", "Pack"]);
    }

    #[test]
    fn test_validate_catches_orphan_keys() {
        let mut dept = sales();
        dept.sub_activities.insert("Ghost".into(), vec!["Boo".into()]);
        assert!(dept.validate().is_err());
    }

    #[test]
    fn test_staffing() {
        let mut dept = sales();
        assert!(!dept.is_staffed());
        dept.head = Some("Ana".into());
        dept.worker = Some("  ".into());
        assert!(!dept.is_staffed());
        dept.worker = Some("Ben".into());
        assert!(dept.is_staffed());
    }
}
