//! The document pane: every mounted section rendered as anchored lines.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use super::Theme;
use crate::app::App;
use crate::conversation::{flow_item_label, phase_name};
use crate::core::{Clock, Dictionary, Translator};
use crate::document::{AdoptionStep, Phase, Project};
use crate::workflow::{PhaseMachine, SectionState};

const HEAD: Dictionary = Dictionary::new("Head", "Responsable");
const WORKER: Dictionary = Dictionary::new("Worker", "Ejecutor");
const RESPONSIBILITIES: Dictionary = Dictionary::new("Responsibilities", "Responsabilidades");
const METHOD: Dictionary = Dictionary::new("Method", "Método");
const STANDARD: Dictionary = Dictionary::new("Standard", "Estándar");
const STEPS: Dictionary = Dictionary::new("Steps", "Pasos");
const KPIS: Dictionary = Dictionary::new("KPIs", "KPIs");
const PROBLEMS: Dictionary = Dictionary::new("Problems", "Problemas");
const READY: Dictionary = Dictionary::new("ready", "listo");
const PREVIEW: Dictionary = Dictionary::new("preview", "vista previa");
const EMPTY: Dictionary = Dictionary::new("(nothing yet)", "(nada aún)");

/// A rendered line and the anchors it belongs to.
#[derive(Debug, Clone)]
pub struct DocLine {
    pub anchors: Vec<String>,
    pub line: Line<'static>,
}

struct Builder<'t> {
    lines: Vec<DocLine>,
    /// Anchors of the enclosing card, inherited by every line pushed
    card: Vec<String>,
    body: Style,
    theme: &'t Theme,
}

impl Builder<'_> {
    fn push(&mut self, anchor: Option<String>, line: Line<'static>) {
        let mut anchors = self.card.clone();
        anchors.extend(anchor);
        self.lines.push(DocLine { anchors, line });
    }

    fn text(&mut self, anchor: Option<String>, indent: usize, text: String) {
        let line = Line::from(Span::styled(format!("{}{text}", "  ".repeat(indent)), self.body));
        self.push(anchor, line);
    }

    fn field(&mut self, anchor: String, indent: usize, label: &str, value: &str) {
        let line = Line::from(vec![
            Span::styled(format!("{}{label}: ", "  ".repeat(indent)), Style::default().fg(self.theme.text_muted)),
            Span::styled(value.to_string(), self.body),
        ]);
        self.push(Some(anchor), line);
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

/// Render every mounted section of the project.
pub fn document_lines<C: Clock>(app: &App<C>, theme: &Theme) -> Vec<DocLine> {
    let project = app.project();
    let t = *app.conversation().translator();
    let readiness = app.readiness();
    let mut b = Builder { lines: Vec::new(), card: Vec::new(), body: Style::default(), theme };

    for (phase, state) in PhaseMachine::sections(project) {
        if !state.is_mounted() {
            continue;
        }
        b.body = match state {
            SectionState::Active => Style::default().fg(theme.text),
            _ => Style::default().fg(theme.text_dim),
        };

        let mut heading = vec![Span::styled(
            t.translate(&phase_name(phase)).to_uppercase(),
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        )];
        if readiness.get(phase) {
            heading.push(Span::styled(format!("  ✓ {}", t.translate(&READY)), Style::default().fg(theme.ready)));
        }
        if state == SectionState::Inert {
            heading.push(Span::styled(format!("  ({})", t.translate(&PREVIEW)), Style::default().fg(theme.text_muted)));
        }
        b.card.clear();
        b.push(None, Line::from(heading));

        match phase {
            Phase::Define => define(&mut b, project, &t),
            Phase::Assign => assign(&mut b, project, &t),
            Phase::Extract => extract(&mut b, project, &t),
            Phase::Organize => organize(&mut b, project, &t),
            Phase::Integrate => integrate(&mut b, project),
            Phase::Optimize => optimize(&mut b, project, &t),
        }
        b.card.clear();
        b.push(None, Line::default());
    }
    b.lines
}

fn define(b: &mut Builder<'_>, project: &Project, t: &Translator) {
    let profile = &project.profile;
    b.field("profile-businessName".into(), 1, "Business", or_dash(&profile.business_name));
    b.field("profile-coreService".into(), 1, "Service", or_dash(&profile.core_service));
    b.field("profile-targetClient".into(), 1, "Client", or_dash(&profile.target_client));

    b.card = vec!["flow".into()];
    b.text(None, 1, format!("Flow ({})", project.track().as_str()));
    for (bucket, items) in project.flow.buckets() {
        let anchor = format!("flow-{bucket}");
        let labels: Vec<&str> = items.iter().map(|i| flow_item_label(t, bucket, i)).collect();
        b.field(anchor, 2, bucket.as_str(), &labels.join(", "));
    }
}

fn assign(b: &mut Builder<'_>, project: &Project, t: &Translator) {
    b.card = vec!["departments".into()];
    if project.departments.is_empty() {
        b.text(None, 1, t.translate(&EMPTY).to_string());
    }
    for (i, dept) in project.departments.iter().enumerate() {
        b.text(None, 1, dept.name.clone());
        b.field(format!("department-{i}-head"), 2, t.translate(&HEAD), or_dash(dept.head.as_deref().unwrap_or("")));
        b.field(
            format!("department-{i}-worker"),
            2,
            t.translate(&WORKER),
            or_dash(dept.worker.as_deref().unwrap_or("")),
        );
        b.field(
            format!("department-{i}-responsibilities"),
            2,
            t.translate(&RESPONSIBILITIES),
            &dept.responsibilities.join(", "),
        );
    }
}

fn extract(b: &mut Builder<'_>, project: &Project, t: &Translator) {
    for (d, dept) in project.departments.iter().enumerate() {
        for (r, responsibility) in dept.responsibilities.iter().enumerate() {
            let subs = dept.sub_activities_for(responsibility).join(", ");
            b.field(format!("sub-activities-{d}-{r}"), 1, &format!("{} / {responsibility}", dept.name), &subs);
        }
    }
    for (row, entry) in project.extraction_registry.iter().enumerate() {
        b.card = vec![format!("registry-{row}")];
        b.text(None, 1, format!("{}. {} ({})", row + 1, entry.sub_activity, entry.department));
        b.field(format!("registry-{row}-worker"), 2, t.translate(&WORKER), or_dash(&entry.worker));
        b.field(
            format!("registry-{row}-method"),
            2,
            t.translate(&METHOD),
            entry.method.map_or("-", |m| m.as_str()),
        );
        b.field(format!("registry-{row}-standard"), 2, t.translate(&STANDARD), or_dash(&entry.standard));
    }
}

fn organize(b: &mut Builder<'_>, project: &Project, t: &Translator) {
    if project.system_library.is_empty() {
        b.text(None, 1, t.translate(&EMPTY).to_string());
    }
    for record in &project.system_library {
        b.card = vec![format!("library-{}", record.id)];
        let title = if record.title.trim().is_empty() { &record.sub_activity } else { &record.title };
        b.text(None, 1, format!("{title} [{}] ({})", record.status, record.department));
        b.text(None, 2, format!("{}:", t.translate(&STEPS)));
        for (i, step) in record.steps.iter().enumerate() {
            b.text(None, 3, format!("{}. {step}", i + 1));
        }
    }
}

fn integrate(b: &mut Builder<'_>, project: &Project) {
    for (d, dept) in project.integrate_departments() {
        let marks: String = AdoptionStep::ALL
            .iter()
            .map(|step| if project.integrate_plan.is_done(&dept.name, *step) { '●' } else { '○' })
            .collect();
        b.field(format!("integrate-{d}"), 1, &dept.name, &marks);
    }
}

fn optimize(b: &mut Builder<'_>, project: &Project, t: &Translator) {
    let data = &project.optimize_data;
    b.card = vec!["kpis".into()];
    let kpis: Vec<&str> = data.kpis.iter().map(|k| k.name.as_str()).collect();
    b.field("kpis".into(), 1, t.translate(&KPIS), &kpis.join(", "));

    b.card = vec!["problems".into()];
    b.text(None, 1, format!("{}:", t.translate(&PROBLEMS)));
    for (i, problem) in data.problems.iter().enumerate() {
        let mark = if problem.is_resolved() { '✓' } else { '•' };
        b.text(Some(format!("problem-{i}")), 2, format!("{mark} {}", problem.description));
        for action in &problem.actions {
            let check = if action.done { "[x]" } else { "[ ]" };
            b.text(Some(format!("problem-{i}")), 3, format!("{check} {}", action.text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::Locator;
    use crate::core::{Config, ManualClock};
    use crate::core::ProjectStore;
    use crate::document::{DepartmentField, DocPath, PatchValue, ProfileField, Track};
    use tempfile::TempDir;

    #[test]
    fn test_anchor_names_match_locators() {
        let app = App::new(Config::default(), None, ManualClock::new(0));
        let lines = document_lines(&app, &Theme::default());
        let anchor = Locator::profile(ProfileField::CoreService).to_string();
        assert!(lines.iter().any(|l| l.anchors.contains(&anchor)));
        assert!(lines.iter().any(|l| l.anchors.iter().any(|a| a == "flow-attention")));
        // Later sections are not mounted yet
        assert!(!lines.iter().any(|l| l.anchors.iter().any(|a| a == "departments")));
    }

    #[test]
    fn test_integrate_lists_departments_with_duties() {
        let mut project = Project::new(Track::Standard);
        project
            .apply_patch(&DocPath::Departments, PatchValue::List(vec!["Sales".into(), "Ops".into()]))
            .unwrap();
        let duties = DocPath::Department {
            department: "Sales".into(),
            field: DepartmentField::Responsibilities,
        };
        project.apply_patch(&duties, PatchValue::List(vec!["Outbound calls".into()])).unwrap();
        project.phase = Phase::Integrate;

        let dir = TempDir::new().unwrap();
        let store = ProjectStore::new(dir.path());
        store.save(&project).unwrap();
        let mut app = App::new(Config::default(), Some(store), ManualClock::new(0));
        app.resume(&project.id).unwrap();

        let lines = document_lines(&app, &Theme::default());
        let has = |anchor: &str| lines.iter().any(|l| l.anchors.iter().any(|a| a == anchor));
        assert!(has("integrate-0"), "Sales has duties but no sub-activities");
        assert!(!has("integrate-1"));
    }
}
