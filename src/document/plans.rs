//! Integrate checklist and optimize data.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed adoption checklist every department walks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdoptionStep {
    Share,
    Walkthrough,
    Shadow,
    Practice,
    Review,
    Refine,
    SignOff,
    Embed,
}

impl AdoptionStep {
    pub const ALL: [Self; 8] = [
        Self::Share,
        Self::Walkthrough,
        Self::Shadow,
        Self::Practice,
        Self::Review,
        Self::Refine,
        Self::SignOff,
        Self::Embed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Share => "share",
            Self::Walkthrough => "walkthrough",
            Self::Shadow => "shadow",
            Self::Practice => "practice",
            Self::Review => "review",
            Self::Refine => "refine",
            Self::SignOff => "sign-off",
            Self::Embed => "embed",
        }
    }
}

impl fmt::Display for AdoptionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdoptionStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '_'], "-");
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| format!("unknown adoption step: {s}"))
    }
}

/// Department name -> adoption step -> done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegratePlan(pub BTreeMap<String, BTreeMap<AdoptionStep, bool>>);

impl IntegratePlan {
    pub fn is_done(&self, department: &str, step: AdoptionStep) -> bool {
        self.0.get(department).and_then(|steps| steps.get(&step)).copied().unwrap_or(false)
    }

    pub fn set(&mut self, department: &str, step: AdoptionStep, done: bool) {
        self.0.entry(department.to_string()).or_default().insert(step, done);
    }

    /// Mark exactly the given steps as done; every other step becomes not done.
    pub fn set_completed(&mut self, department: &str, done: &[AdoptionStep]) {
        let steps = self.0.entry(department.to_string()).or_default();
        for step in AdoptionStep::ALL {
            steps.insert(step, done.contains(&step));
        }
    }

    /// Steps already done for a department, in checklist order.
    pub fn completed(&self, department: &str) -> Vec<AdoptionStep> {
        AdoptionStep::ALL.into_iter().filter(|s| self.is_done(department, *s)).collect()
    }

    pub fn is_complete_for(&self, department: &str) -> bool {
        AdoptionStep::ALL.iter().all(|s| self.is_done(department, *s))
    }

    pub fn remove_department(&mut self, department: &str) {
        self.0.remove(department);
    }

    pub fn departments(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Measurement cadence of a KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiFrequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
    Quarterly,
}

/// Direction a KPI is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Flat,
}

/// A tracked key performance indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub name: String,
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub frequency: KpiFrequency,
    #[serde(default)]
    pub trend: Trend,
}

impl Kpi {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current: None,
            target: None,
            unit: String::new(),
            frequency: KpiFrequency::default(),
            trend: Trend::default(),
        }
    }
}

/// Impact of a problem on the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    #[default]
    Medium,
    High,
}

/// Progress of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
}

/// One corrective step of a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemAction {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// A problem found while optimizing.
///
/// Problems always carry an action list. A problem saved with only a flat
/// `resolved` flag is loaded as a single action mirroring its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProblemRepr")]
pub struct Problem {
    pub id: String,
    pub department: String,
    pub responsibility: String,
    pub sub_activity: String,
    pub description: String,
    pub impact: Impact,
    pub owner: String,
    pub status: ProblemStatus,
    pub actions: Vec<ProblemAction>,
}

/// Wire shape accepted on load; both the action-list and legacy flag forms.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProblemRepr {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    department: String,
    #[serde(default)]
    responsibility: String,
    #[serde(default)]
    sub_activity: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    impact: Impact,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    status: Option<ProblemStatus>,
    #[serde(default)]
    resolved: Option<bool>,
    #[serde(default)]
    actions: Vec<ProblemAction>,
}

impl From<ProblemRepr> for Problem {
    fn from(repr: ProblemRepr) -> Self {
        let mut actions = repr.actions;
        if actions.is_empty() {
            actions.push(ProblemAction {
                text: repr.description.clone(),
                done: repr.resolved.unwrap_or(false),
            });
        }
        let mut problem = Self {
            id: repr.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            department: repr.department,
            responsibility: repr.responsibility,
            sub_activity: repr.sub_activity,
            description: repr.description,
            impact: repr.impact,
            owner: repr.owner,
            status: repr.status.unwrap_or_default(),
            actions,
        };
        problem.reconcile_status();
        problem
    }
}

impl Problem {
    /// A new open problem with its single synthetic action.
    pub fn new(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            department: String::new(),
            responsibility: String::new(),
            sub_activity: String::new(),
            actions: vec![ProblemAction { text: description.clone(), done: false }],
            description,
            impact: Impact::default(),
            owner: String::new(),
            status: ProblemStatus::Open,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.actions.iter().all(|a| a.done)
    }

    /// Append an action; a problem that was resolved reopens.
    pub fn add_action(&mut self, text: impl Into<String>) {
        self.actions.push(ProblemAction { text: text.into(), done: false });
        self.reconcile_status();
    }

    /// Mark an action done or not. Returns false if the index is out of range.
    pub fn set_action_done(&mut self, index: usize, done: bool) -> bool {
        match self.actions.get_mut(index) {
            Some(action) => {
                action.done = done;
                self.reconcile_status();
                true
            }
            None => false,
        }
    }

    /// The stored form: at least one action and a status that agrees with
    /// the actions.
    pub(crate) fn normalized(mut self) -> Self {
        if self.actions.is_empty() {
            self.actions.push(ProblemAction { text: self.description.clone(), done: false });
        }
        self.reconcile_status();
        self
    }

    /// Keep `status` consistent with the action list.
    fn reconcile_status(&mut self) {
        let done = self.actions.iter().filter(|a| a.done).count();
        self.status = if done == self.actions.len() {
            ProblemStatus::Resolved
        } else if done > 0 {
            ProblemStatus::InProgress
        } else if self.status == ProblemStatus::Resolved {
            ProblemStatus::Open
        } else {
            self.status
        };
    }
}

/// KPIs and problems tracked in the optimize phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeData {
    #[serde(default)]
    pub kpis: Vec<Kpi>,
    #[serde(default)]
    pub problems: Vec<Problem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_completion() {
        let mut plan = IntegratePlan::default();
        assert!(!plan.is_complete_for("Sales"));

        plan.set_completed("Sales", &AdoptionStep::ALL[..7]);
        assert!(!plan.is_complete_for("Sales"));
        assert_eq!(plan.completed("Sales").len(), 7);

        plan.set("Sales", AdoptionStep::Embed, true);
        assert!(plan.is_complete_for("Sales"));
    }

    #[test]
    fn test_integrate_plan_json_uses_step_ids() {
        let mut plan = IntegratePlan::default();
        plan.set("Ops", AdoptionStep::SignOff, true);
        let json = serde_json::to_string(&plan).unwrap();
        assert_eq!(json, r#"{"Ops":{"sign-off":true}}"#);

        let back: IntegratePlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_legacy_resolved_flag_becomes_action() {
        let json = r#"{"id":"p1","description":"Late invoices","resolved":true}"#;
        let problem: Problem = serde_json::from_str(json).unwrap();

        assert_eq!(problem.actions.len(), 1);
        assert_eq!(problem.actions[0].text, "Late invoices");
        assert!(problem.is_resolved());
        assert_eq!(problem.status, ProblemStatus::Resolved);
    }

    #[test]
    fn test_actions_win_over_legacy_flag() {
        let json = r#"{
            "id": "p2",
            "description": "Churn",
            "resolved": true,
            "actions": [{"text": "Call lapsed clients", "done": false}]
        }"#;
        let problem: Problem = serde_json::from_str(json).unwrap();
        assert!(!problem.is_resolved());
        assert_eq!(problem.status, ProblemStatus::Open);
    }

    #[test]
    fn test_action_progress_drives_status() {
        let mut problem = Problem::new("Slow onboarding");
        problem.add_action("Write checklist");
        assert_eq!(problem.status, ProblemStatus::Open);

        assert!(problem.set_action_done(0, true));
        assert_eq!(problem.status, ProblemStatus::InProgress);

        assert!(problem.set_action_done(1, true));
        assert_eq!(problem.status, ProblemStatus::Resolved);

        problem.add_action("Follow up");
        assert_eq!(problem.status, ProblemStatus::InProgress);
        assert!(!problem.set_action_done(9, true));
    }
}
