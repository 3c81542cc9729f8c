//! The project: single source of truth for the whole workflow.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::department::{clean_unique, Department};
use super::error::{ValidationError, ValidationResult};
use super::library::SystemRecord;
use super::phase::Phase;
use super::plans::{IntegratePlan, Kpi, OptimizeData, Problem};
use super::registry::{derive_registry, RegistryEntry};

/// Methodology variant; decides which flow buckets exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    #[default]
    Standard,
    Growth,
}

impl Track {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Growth => "growth",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Track {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "growth" => Ok(Self::Growth),
            other => Err(format!("unknown track: {other}")),
        }
    }
}

/// A named bucket of the business flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowBucket {
    Attention,
    Enquiry,
    Sales,
    Delivery,
    Money,
    Loyalty,
    Finance,
    People,
    Management,
    Operations,
}

impl FlowBucket {
    pub const STANDARD: [Self; 6] =
        [Self::Attention, Self::Enquiry, Self::Sales, Self::Delivery, Self::Money, Self::Loyalty];

    pub const GROWTH: [Self; 4] = [Self::Finance, Self::People, Self::Management, Self::Operations];

    /// Buckets of a track, in flow order.
    pub fn for_track(track: Track) -> &'static [Self] {
        match track {
            Track::Standard => &Self::STANDARD,
            Track::Growth => &Self::GROWTH,
        }
    }

    pub fn track(self) -> Track {
        if Self::GROWTH.contains(&self) {
            Track::Growth
        } else {
            Track::Standard
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attention => "attention",
            Self::Enquiry => "enquiry",
            Self::Sales => "sales",
            Self::Delivery => "delivery",
            Self::Money => "money",
            Self::Loyalty => "loyalty",
            Self::Finance => "finance",
            Self::People => "people",
            Self::Management => "management",
            Self::Operations => "operations",
        }
    }
}

impl fmt::Display for FlowBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard track flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardFlow {
    pub attention: Vec<String>,
    pub enquiry: Vec<String>,
    pub sales: Vec<String>,
    pub delivery: Vec<String>,
    pub money: Vec<String>,
    pub loyalty: Vec<String>,
}

/// Growth track flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthFlow {
    pub finance: Vec<String>,
    pub people: Vec<String>,
    pub management: Vec<String>,
    pub operations: Vec<String>,
}

/// The business flow; only the active track's buckets exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "track", rename_all = "lowercase")]
pub enum Flow {
    Standard(StandardFlow),
    Growth(GrowthFlow),
}

impl Flow {
    pub fn new(track: Track) -> Self {
        match track {
            Track::Standard => Self::Standard(StandardFlow::default()),
            Track::Growth => Self::Growth(GrowthFlow::default()),
        }
    }

    pub fn track(&self) -> Track {
        match self {
            Self::Standard(_) => Track::Standard,
            Self::Growth(_) => Track::Growth,
        }
    }

    /// Items of a bucket, or `None` if the bucket belongs to the other track.
    pub fn bucket(&self, bucket: FlowBucket) -> Option<&[String]> {
        let items = match self {
            Self::Standard(f) => match bucket {
                FlowBucket::Attention => &f.attention,
                FlowBucket::Enquiry => &f.enquiry,
                FlowBucket::Sales => &f.sales,
                FlowBucket::Delivery => &f.delivery,
                FlowBucket::Money => &f.money,
                FlowBucket::Loyalty => &f.loyalty,
                _ => return None,
            },
            Self::Growth(f) => match bucket {
                FlowBucket::Finance => &f.finance,
                FlowBucket::People => &f.people,
                FlowBucket::Management => &f.management,
                FlowBucket::Operations => &f.operations,
                _ => return None,
            },
        };
        Some(items)
    }

    pub fn bucket_mut(&mut self, bucket: FlowBucket) -> Option<&mut Vec<String>> {
        match self {
            Self::Standard(f) => match bucket {
                FlowBucket::Attention => Some(&mut f.attention),
                FlowBucket::Enquiry => Some(&mut f.enquiry),
                FlowBucket::Sales => Some(&mut f.sales),
                FlowBucket::Delivery => Some(&mut f.delivery),
                FlowBucket::Money => Some(&mut f.money),
                FlowBucket::Loyalty => Some(&mut f.loyalty),
                _ => None,
            },
            Self::Growth(f) => match bucket {
                FlowBucket::Finance => Some(&mut f.finance),
                FlowBucket::People => Some(&mut f.people),
                FlowBucket::Management => Some(&mut f.management),
                FlowBucket::Operations => Some(&mut f.operations),
                _ => None,
            },
        }
    }

    /// Every bucket of the active track with its items, in flow order.
    pub fn buckets(&self) -> Vec<(FlowBucket, &[String])> {
        FlowBucket::for_track(self.track())
            .iter()
            .filter_map(|b| self.bucket(*b).map(|items| (*b, items)))
            .collect()
    }
}

impl Default for Flow {
    fn default() -> Self {
        Self::new(Track::default())
    }
}

/// Who the business is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub business_name: String,
    pub core_service: String,
    pub target_client: String,
}

/// The root, serializable project state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub flow: Flow,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub extraction_registry: Vec<RegistryEntry>,
    #[serde(default)]
    pub system_library: Vec<SystemRecord>,
    #[serde(default)]
    pub integrate_plan: IntegratePlan,
    #[serde(default)]
    pub optimize_data: OptimizeData,
    #[serde(default)]
    pub phase: Phase,
    pub activity_timestamp: DateTime<Utc>,
}

impl Project {
    /// An empty project on the given track, in the define phase.
    pub fn new(track: Track) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            profile: Profile::default(),
            flow: Flow::new(track),
            departments: Vec::new(),
            extraction_registry: Vec::new(),
            system_library: Vec::new(),
            integrate_plan: IntegratePlan::default(),
            optimize_data: OptimizeData::default(),
            phase: Phase::Define,
            activity_timestamp: Utc::now(),
        }
    }

    pub fn track(&self) -> Track {
        self.flow.track()
    }

    /// Human title, falling back to the id.
    pub fn title(&self) -> &str {
        let name = self.profile.business_name.trim();
        if name.is_empty() {
            &self.id
        } else {
            name
        }
    }

    /// Switch methodology. The two flows are mutually exclusive, so switching
    /// discards the previous track's buckets.
    pub fn set_track(&mut self, track: Track) {
        if self.track() != track {
            self.flow = Flow::new(track);
        }
    }

    pub fn touch(&mut self) {
        self.activity_timestamp = Utc::now();
    }

    // --- Departments ---

    pub fn department(&self, name: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.name == name)
    }

    pub fn department_index(&self, name: &str) -> Option<usize> {
        self.departments.iter().position(|d| d.name == name)
    }

    pub fn department_mut(&mut self, name: &str) -> ValidationResult<&mut Department> {
        self.departments
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| ValidationError::UnknownDepartment(name.to_string()))
    }

    /// Replace the department list by name. Departments that remain keep
    /// their people and responsibilities; dropped ones take their plan rows
    /// with them.
    pub fn set_departments(&mut self, names: Vec<String>) -> ValidationResult<()> {
        let names = clean_unique(names, "department")?;
        if names.is_empty() {
            return Err(ValidationError::Empty("department"));
        }

        let mut previous = std::mem::take(&mut self.departments);
        self.departments = names
            .iter()
            .map(|name| match previous.iter().position(|d| &d.name == name) {
                Some(i) => previous.swap_remove(i),
                None => Department::new(name.clone()),
            })
            .collect();

        for dropped in &previous {
            self.integrate_plan.remove_department(&dropped.name);
        }
        self.sync_registry();
        Ok(())
    }

    pub fn add_department(&mut self, name: &str) -> ValidationResult<usize> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Blank("department name"));
        }
        if self.department(name).is_some() {
            return Err(ValidationError::Duplicate { kind: "department", name: name.to_string() });
        }
        self.departments.push(Department::new(name));
        Ok(self.departments.len() - 1)
    }

    pub fn remove_department(&mut self, name: &str) -> ValidationResult<()> {
        let index = self
            .department_index(name)
            .ok_or_else(|| ValidationError::UnknownDepartment(name.to_string()))?;
        self.departments.remove(index);
        self.integrate_plan.remove_department(name);
        self.sync_registry();
        Ok(())
    }

    /// Assign the department worker. Registry rows that were following the
    /// previous worker follow the new one.
    pub fn set_department_worker(&mut self, name: &str, worker: &str) -> ValidationResult<()> {
        let worker = worker.trim();
        if worker.is_empty() {
            return Err(ValidationError::Blank("worker"));
        }
        let dept = self.department_mut(name)?;
        let previous = dept.worker.replace(worker.to_string()).unwrap_or_default();

        for row in self.extraction_registry.iter_mut().filter(|r| r.department == name) {
            if row.worker == previous || row.worker.trim().is_empty() {
                row.worker = worker.to_string();
            }
        }
        Ok(())
    }

    /// Departments taking part in integration, with their index: those that
    /// own at least one responsibility.
    pub fn integrate_departments(&self) -> impl Iterator<Item = (usize, &Department)> {
        self.departments.iter().enumerate().filter(|(_, d)| !d.responsibilities.is_empty())
    }

    /// Re-derive the extraction registry from the departments.
    pub fn sync_registry(&mut self) {
        self.extraction_registry = derive_registry(&self.departments, &self.extraction_registry);
    }

    // --- Library ---

    pub fn record(&self, id: &str) -> Option<&SystemRecord> {
        self.system_library.iter().find(|r| r.id == id)
    }

    pub fn record_mut(&mut self, id: &str) -> ValidationResult<&mut SystemRecord> {
        self.system_library
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ValidationError::UnknownRecord(id.to_string()))
    }

    /// Create an empty record inside a department and return its id.
    pub fn create_record(&mut self, department: &str) -> ValidationResult<String> {
        if self.department(department).is_none() {
            return Err(ValidationError::UnknownDepartment(department.to_string()));
        }
        let record = SystemRecord::new(department);
        let id = record.id.clone();
        self.system_library.push(record);
        Ok(id)
    }

    /// Create a record for a registry row, pre-filled from the row.
    pub fn create_record_for_row(&mut self, row: usize) -> ValidationResult<String> {
        let entry = self
            .extraction_registry
            .get(row)
            .cloned()
            .ok_or(ValidationError::UnknownRegistryRow(row))?;
        let id = self.create_record(&entry.department)?;
        let record = self.record_mut(&id)?;
        record.title.clone_from(&entry.sub_activity);
        record.responsibility = entry.responsibility;
        record.sub_activity = entry.sub_activity;
        record.owner = entry.worker;
        record.method = entry.method;
        record.standard = entry.standard;
        Ok(id)
    }

    /// The record documenting a registry row, if one exists.
    pub fn record_for_row(&self, row: usize) -> Option<&SystemRecord> {
        let entry = self.extraction_registry.get(row)?;
        self.system_library
            .iter()
            .find(|r| r.documents(&entry.department, &entry.responsibility, &entry.sub_activity))
    }

    /// Delete a record. Nothing else references records, so nothing cascades.
    pub fn delete_record(&mut self, id: &str) -> ValidationResult<SystemRecord> {
        let index = self
            .system_library
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ValidationError::UnknownRecord(id.to_string()))?;
        Ok(self.system_library.remove(index))
    }

    // --- Optimize ---

    pub fn add_kpi(&mut self, kpi: Kpi) -> ValidationResult<usize> {
        if kpi.name.trim().is_empty() {
            return Err(ValidationError::Blank("KPI name"));
        }
        self.optimize_data.kpis.push(kpi);
        Ok(self.optimize_data.kpis.len() - 1)
    }

    pub fn remove_kpi(&mut self, index: usize) -> ValidationResult<Kpi> {
        if index >= self.optimize_data.kpis.len() {
            return Err(ValidationError::UnknownItem { kind: "KPI", index });
        }
        Ok(self.optimize_data.kpis.remove(index))
    }

    pub fn add_problem(&mut self, problem: Problem) -> ValidationResult<usize> {
        if problem.description.trim().is_empty() {
            return Err(ValidationError::Blank("problem description"));
        }
        self.optimize_data.problems.push(problem.normalized());
        Ok(self.optimize_data.problems.len() - 1)
    }

    pub fn problem_mut(&mut self, index: usize) -> ValidationResult<&mut Problem> {
        self.optimize_data
            .problems
            .get_mut(index)
            .ok_or(ValidationError::UnknownItem { kind: "problem", index })
    }

    // --- Invariants ---

    /// Check every cross-entity invariant. Used before accepting a loaded
    /// project so a corrupt one is rejected whole.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::Blank("project id"));
        }

        let mut names = HashSet::new();
        for dept in &self.departments {
            dept.validate()?;
            if !names.insert(dept.name.as_str()) {
                return Err(ValidationError::Duplicate {
                    kind: "department",
                    name: dept.name.clone(),
                });
            }
        }

        let derived = derive_registry(&self.departments, &self.extraction_registry);
        if derived.len() != self.extraction_registry.len()
            || derived.iter().zip(&self.extraction_registry).any(|(a, b)| {
                a.department != b.department
                    || a.responsibility != b.responsibility
                    || a.sub_activity != b.sub_activity
            })
        {
            return Err(ValidationError::WrongValueType {
                path: "extractionRegistry".to_string(),
                expected: "one row per department sub-activity",
            });
        }

        let mut ids = HashSet::new();
        for record in &self.system_library {
            if !ids.insert(record.id.as_str()) {
                return Err(ValidationError::Duplicate { kind: "system record", name: record.id.clone() });
            }
        }

        for name in self.integrate_plan.departments() {
            if self.department(name).is_none() {
                return Err(ValidationError::UnknownDepartment(name.to_string()));
            }
        }

        Ok(())
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(Track::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_buckets_follow_track() {
        let mut project = Project::new(Track::Standard);
        assert_eq!(project.flow.buckets().len(), 6);
        assert!(project.flow.bucket(FlowBucket::Finance).is_none());

        project.flow.bucket_mut(FlowBucket::Attention).unwrap().push("Flyers".into());
        project.set_track(Track::Growth);

        assert_eq!(project.track(), Track::Growth);
        assert_eq!(project.flow.buckets().len(), 4);
        assert!(project.flow.bucket(FlowBucket::Attention).is_none());
    }

    #[test]
    fn test_flow_serializes_with_track_tag() {
        let mut flow = Flow::new(Track::Growth);
        flow.bucket_mut(FlowBucket::People).unwrap().push("Hiring".into());
        let json = serde_json::to_value(&flow).unwrap();
        assert_eq!(json["track"], "growth");
        assert_eq!(json["people"][0], "Hiring");
    }

    #[test]
    fn test_set_departments_preserves_existing() {
        let mut project = Project::default();
        project.set_departments(vec!["Sales".into(), "Ops".into()]).unwrap();
        project.department_mut("Sales").unwrap().head = Some("Ana".into());

        project.set_departments(vec!["Ops".into(), "Sales".into(), "Finance".into()]).unwrap();

        let names: Vec<_> = project.departments.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Ops", "Sales", "Finance"]);
        assert_eq!(project.department("Sales").unwrap().head.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_set_departments_rejects_empty() {
        let mut project = Project::default();
        let err = project.set_departments(vec!["  ".into()]).unwrap_err();
        assert_eq!(err, ValidationError::Empty("department"));
    }

    #[test]
    fn test_removing_department_drops_plan_and_rows() {
        let mut project = Project::default();
        project.set_departments(vec!["Sales".into()]).unwrap();
        let sales = project.department_mut("Sales").unwrap();
        sales.set_responsibilities(vec!["Calls".into()]).unwrap();
        sales.set_sub_activities("Calls", vec!["Dial".into()]).unwrap();
        project.sync_registry();
        project.integrate_plan.set("Sales", crate::document::AdoptionStep::Share, true);

        project.remove_department("Sales").unwrap();
        assert!(project.extraction_registry.is_empty());
        assert_eq!(project.integrate_plan.departments().count(), 0);
        project.validate().unwrap();
    }

    #[test]
    fn test_worker_change_follows_registry_rows() {
        let mut project = Project::default();
        project.set_departments(vec!["Sales".into()]).unwrap();
        project.set_department_worker("Sales", "Ben").unwrap();
        let sales = project.department_mut("Sales").unwrap();
        sales.set_responsibilities(vec!["Calls".into()]).unwrap();
        sales.set_sub_activities("Calls", vec!["Dial".into(), "Log".into()]).unwrap();
        project.sync_registry();
        project.extraction_registry[1].worker = "Cara".into();

        project.set_department_worker("Sales", "Dan").unwrap();

        assert_eq!(project.extraction_registry[0].worker, "Dan");
        assert_eq!(project.extraction_registry[1].worker, "Cara");
    }

    #[test]
    fn test_records_have_no_cascade() {
        let mut project = Project::default();
        project.set_departments(vec!["Sales".into()]).unwrap();
        let id = project.create_record("Sales").unwrap();
        assert!(project.create_record("Nope").is_err());

        project.delete_record(&id).unwrap();
        assert!(project.system_library.is_empty());
        assert_eq!(project.departments.len(), 1);
        assert!(project.delete_record(&id).is_err());
    }

    #[test]
    fn test_validate_rejects_hand_edited_registry() {
        let mut project = Project::default();
        project.set_departments(vec!["Sales".into()]).unwrap();
        project.extraction_registry.push(RegistryEntry {
            department: "Sales".into(),
            responsibility: "Ghost".into(),
            sub_activity: "Boo".into(),
            worker: String::new(),
            method: None,
            standard: String::new(),
        });
        assert!(project.validate().is_err());
    }

    #[test]
    fn test_problem_without_actions_is_stored_as_loaded() {
        let mut project = Project::default();
        let mut problem = Problem::new("Late invoices");
        problem.actions.clear();
        let index = project.add_problem(problem).unwrap();

        let stored = &project.optimize_data.problems[index];
        assert_eq!(stored.actions.len(), 1);
        assert!(!stored.is_resolved());

        let json = serde_json::to_string(&project).unwrap();
        let loaded: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, project);
    }

    #[test]
    fn test_title_falls_back_to_id() {
        let mut project = Project::default();
        assert_eq!(project.title(), project.id);
        project.profile.business_name = "Acme".into();
        assert_eq!(project.title(), "Acme");
    }
}
