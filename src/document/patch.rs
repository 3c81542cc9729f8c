//! Structural patches against the project.
//!
//! A [`DocPath`] addresses one field (or one whole collection) of the
//! project; [`Project::apply_patch`] validates the value against the path and
//! applies it atomically. A rejected patch leaves the project untouched.

use std::fmt;
use std::str::FromStr;

use super::error::{ValidationError, ValidationResult};
use super::library::{RecordField, SystemStatus};
use super::plans::{AdoptionStep, Kpi, Problem};
use super::project::{FlowBucket, Project, Track};
use super::registry::CaptureMethod;

/// Business profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    BusinessName,
    CoreService,
    TargetClient,
}

impl ProfileField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BusinessName => "businessName",
            Self::CoreService => "coreService",
            Self::TargetClient => "targetClient",
        }
    }
}

/// Department fields editable by patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepartmentField {
    Head,
    Worker,
    Responsibilities,
}

impl DepartmentField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Worker => "worker",
            Self::Responsibilities => "responsibilities",
        }
    }
}

/// Authored registry columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryField {
    Worker,
    Method,
    Standard,
}

impl RegistryField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Method => "method",
            Self::Standard => "standard",
        }
    }
}

/// A structural address inside the project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocPath {
    Track,
    Profile(ProfileField),
    Flow(FlowBucket),
    /// The whole department list, by name
    Departments,
    Department { department: String, field: DepartmentField },
    SubActivities { department: String, responsibility: String },
    Registry { row: usize, field: RegistryField },
    Record { id: String, field: RecordField },
    /// Which adoption steps are done for a department
    Adoption { department: String },
    AdoptionStep { department: String, step: AdoptionStep },
    /// The KPI list, by name
    Kpis,
    /// The problem list, by description
    Problems,
    ProblemAction { problem: usize, action: usize },
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Track => write!(f, "track"),
            Self::Profile(field) => write!(f, "profile.{}", field.as_str()),
            Self::Flow(bucket) => write!(f, "flow.{bucket}"),
            Self::Departments => write!(f, "departments"),
            Self::Department { department, field } => {
                write!(f, "departments[{department}].{}", field.as_str())
            }
            Self::SubActivities { department, responsibility } => {
                write!(f, "departments[{department}].subActivities[{responsibility}]")
            }
            Self::Registry { row, field } => {
                write!(f, "extractionRegistry[{row}].{}", field.as_str())
            }
            Self::Record { id, field } => write!(f, "systemLibrary[{id}].{}", field.as_str()),
            Self::Adoption { department } => write!(f, "integratePlan[{department}]"),
            Self::AdoptionStep { department, step } => {
                write!(f, "integratePlan[{department}].{step}")
            }
            Self::Kpis => write!(f, "optimizeData.kpis"),
            Self::Problems => write!(f, "optimizeData.problems"),
            Self::ProblemAction { problem, action } => {
                write!(f, "optimizeData.problems[{problem}].actions[{action}]")
            }
        }
    }
}

/// A value carried by a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl PatchValue {
    fn into_text(self, path: &DocPath) -> ValidationResult<String> {
        match self {
            Self::Text(text) => Ok(text),
            _ => Err(wrong_type(path, "text")),
        }
    }

    fn into_list(self, path: &DocPath) -> ValidationResult<Vec<String>> {
        match self {
            Self::List(items) => Ok(items),
            _ => Err(wrong_type(path, "a list")),
        }
    }

    fn into_flag(self, path: &DocPath) -> ValidationResult<bool> {
        match self {
            Self::Flag(flag) => Ok(flag),
            _ => Err(wrong_type(path, "a flag")),
        }
    }
}

fn wrong_type(path: &DocPath, expected: &'static str) -> ValidationError {
    ValidationError::WrongValueType { path: path.to_string(), expected }
}

fn required(text: String, field: &'static str) -> ValidationResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Blank(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn parse_choice<T: FromStr>(text: &str, field: &'static str) -> ValidationResult<T> {
    text.parse().map_err(|_| ValidationError::InvalidChoice { field, value: text.to_string() })
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

impl Project {
    /// Apply one validated mutation.
    ///
    /// Department-shaped changes re-derive the extraction registry before
    /// returning, so the registry is always consistent after a patch.
    pub fn apply_patch(&mut self, path: &DocPath, value: PatchValue) -> ValidationResult<()> {
        match path {
            DocPath::Track => {
                let track: Track = parse_choice(&value.into_text(path)?, "track")?;
                self.set_track(track);
            }
            DocPath::Profile(field) => {
                let text = required(value.into_text(path)?, field.as_str())?;
                let slot = match field {
                    ProfileField::BusinessName => &mut self.profile.business_name,
                    ProfileField::CoreService => &mut self.profile.core_service,
                    ProfileField::TargetClient => &mut self.profile.target_client,
                };
                *slot = text;
            }
            DocPath::Flow(bucket) => {
                let items = clean_list(value.into_list(path)?);
                let track = self.track();
                let slot = self.flow.bucket_mut(*bucket).ok_or_else(|| {
                    ValidationError::TrackMismatch {
                        bucket: bucket.to_string(),
                        track: track.to_string(),
                    }
                })?;
                *slot = items;
            }
            DocPath::Departments => {
                self.set_departments(value.into_list(path)?)?;
            }
            DocPath::Department { department, field } => match field {
                DepartmentField::Head => {
                    let head = required(value.into_text(path)?, "head")?;
                    self.department_mut(department)?.head = Some(head);
                }
                DepartmentField::Worker => {
                    let worker = value.into_text(path)?;
                    self.set_department_worker(department, &worker)?;
                }
                DepartmentField::Responsibilities => {
                    let items = value.into_list(path)?;
                    self.department_mut(department)?.set_responsibilities(items)?;
                    self.sync_registry();
                }
            },
            DocPath::SubActivities { department, responsibility } => {
                let items = value.into_list(path)?;
                self.department_mut(department)?.set_sub_activities(responsibility, items)?;
                self.sync_registry();
            }
            DocPath::Registry { row, field } => {
                let text = value.into_text(path)?;
                let entry = self
                    .extraction_registry
                    .get_mut(*row)
                    .ok_or(ValidationError::UnknownRegistryRow(*row))?;
                match field {
                    RegistryField::Worker => entry.worker = required(text, "worker")?,
                    RegistryField::Method => {
                        entry.method = Some(parse_choice::<CaptureMethod>(&text, "capture method")?);
                    }
                    RegistryField::Standard => entry.standard = text.trim().to_string(),
                }
            }
            DocPath::Record { id, field } => self.patch_record(path, id, *field, value)?,
            DocPath::Adoption { department } => {
                let steps = value
                    .into_list(path)?
                    .iter()
                    .map(|s| parse_choice::<AdoptionStep>(s, "adoption step"))
                    .collect::<ValidationResult<Vec<_>>>()?;
                self.require_active_department(department)?;
                self.integrate_plan.set_completed(department, &steps);
            }
            DocPath::AdoptionStep { department, step } => {
                let done = value.into_flag(path)?;
                self.require_active_department(department)?;
                self.integrate_plan.set(department, *step, done);
            }
            DocPath::Kpis => {
                let names = clean_list(value.into_list(path)?);
                let mut previous = std::mem::take(&mut self.optimize_data.kpis);
                self.optimize_data.kpis = names
                    .into_iter()
                    .map(|name| match previous.iter().position(|k| k.name == name) {
                        Some(i) => previous.remove(i),
                        None => Kpi::new(name),
                    })
                    .collect();
            }
            DocPath::Problems => {
                let descriptions = clean_list(value.into_list(path)?);
                let mut previous = std::mem::take(&mut self.optimize_data.problems);
                self.optimize_data.problems = descriptions
                    .into_iter()
                    .map(|text| match previous.iter().position(|p| p.description == text) {
                        Some(i) => previous.remove(i),
                        None => Problem::new(text),
                    })
                    .collect();
            }
            DocPath::ProblemAction { problem, action } => {
                let done = value.into_flag(path)?;
                let index = *action;
                if !self.problem_mut(*problem)?.set_action_done(index, done) {
                    return Err(ValidationError::UnknownItem { kind: "action", index });
                }
            }
        }
        Ok(())
    }

    fn require_active_department(&self, department: &str) -> ValidationResult<()> {
        match self.department(department) {
            Some(d) if !d.responsibilities.is_empty() => Ok(()),
            Some(_) => Err(ValidationError::Empty("responsibility")),
            None => Err(ValidationError::UnknownDepartment(department.to_string())),
        }
    }

    fn patch_record(
        &mut self,
        path: &DocPath,
        id: &str,
        field: RecordField,
        value: PatchValue,
    ) -> ValidationResult<()> {
        if field.is_list() {
            let items = clean_list(value.into_list(path)?);
            let record = self.record_mut(id)?;
            let slot = match field {
                RecordField::Inputs => &mut record.inputs,
                RecordField::Steps => &mut record.steps,
                RecordField::Tools => &mut record.tools,
                _ => &mut record.resources,
            };
            *slot = items;
            return Ok(());
        }

        let text = value.into_text(path)?;
        let method = match field {
            RecordField::Method => Some(parse_choice::<CaptureMethod>(&text, "capture method")?),
            _ => None,
        };
        let status = match field {
            RecordField::Status => Some(parse_choice::<SystemStatus>(&text, "status")?),
            _ => None,
        };
        let record = self.record_mut(id)?;
        let text = text.trim().to_string();
        match field {
            RecordField::Title => record.title = text,
            RecordField::Responsibility => record.responsibility = text,
            RecordField::SubActivity => record.sub_activity = text,
            RecordField::Owner => record.owner = text,
            RecordField::Method => record.method = method,
            RecordField::Standard => record.standard = text,
            RecordField::Status => {
                if let Some(status) = status {
                    record.status = status;
                }
            }
            RecordField::Overview => record.overview = text,
            RecordField::Goal => record.goal = text,
            RecordField::Trigger => record.trigger = text,
            RecordField::Inputs | RecordField::Steps | RecordField::Tools | RecordField::Resources => {}
        }
        Ok(())
    }
}
