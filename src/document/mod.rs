//! The document model.
//!
//! [`Project`] is the canonical, serializable state every other component
//! reads. It carries invariants and derived predicates but no workflow logic.
//!
//! ## Layout
//!
//! - `project` - the root, flow buckets, track
//! - `department` - departments, responsibilities, sub-activities
//! - `registry` - the derived extraction registry
//! - `library` - documented systems
//! - `plans` - integrate checklist and optimize data
//! - `patch` - validated structural mutations
//! - `predicates` - per-phase exit criteria

mod department;
mod error;
mod library;
mod patch;
mod phase;
mod plans;
mod predicates;
mod project;
mod registry;

pub use department::Department;
pub use error::{ValidationError, ValidationResult};
pub use library::{RecordField, SystemRecord, SystemStatus};
pub use patch::{DepartmentField, DocPath, PatchValue, ProfileField, RegistryField};
pub use phase::{ExtractStage, Phase};
pub use plans::{
    AdoptionStep, Impact, IntegratePlan, Kpi, KpiFrequency, OptimizeData, Problem, ProblemAction,
    ProblemStatus, Trend,
};
pub use predicates::{
    assign_ready, define_ready, extract_ready, integrate_ready, is_ready, optimize_ready,
    organize_ready, PhaseReadiness,
};
pub use project::{Flow, FlowBucket, GrowthFlow, Profile, Project, StandardFlow, Track};
pub use registry::{derive_registry, CaptureMethod, RegistryEntry};
