//! The prompt catalogue.
//!
//! The next question is always derived from the project: the first pending
//! step of the current phase (or extract sub-stage). Resuming a saved project
//! therefore lands on the right question without any stored queue.

use std::collections::HashSet;

use super::error::{SubmitError, SubmitResult};
use super::input::{ChoiceOption, DynamicList, FreeText, InputSurface, MultiSelect, Resolved, SingleSelect};
use crate::commit::Action;
use crate::core::{Dictionary, ProjectSummary, Translator};
use crate::document::{
    is_ready, AdoptionStep, CaptureMethod, DepartmentField, ExtractStage, FlowBucket, PatchValue,
    Phase, ProfileField, Project, RegistryField, Track,
};
use crate::workflow::{PhaseMachine, SectionState};

/// Option value that advances the phase.
pub const CONTINUE: &str = "continue";

/// Option value that stays in the phase.
pub const KEEP_GOING: &str = "keep-going";

/// One question of the guided workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Start a project or resume a recent one
    Opening,
    Profile(ProfileField),
    FlowBucket(FlowBucket),
    Departments,
    DepartmentField { department: String, field: DepartmentField },
    SubActivities { department: String, responsibility: String },
    CaptureMethod(usize),
    Standard(usize),
    DocumentRow(usize),
    Adoption(String),
    Kpis,
    Problems,
    ProblemAction(usize),
    /// Offer to advance once the phase is satisfied
    Continue,
    /// Nothing left to ask
    Idle,
}

/// What the host must do with an accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Commit { action: Action, value: PatchValue },
    Continue,
    /// Stay in the phase; stop offering to continue until it changes.
    KeepGoing,
    Resume(String),
    /// An optional question answered with nothing.
    Skip(Step),
}

impl Step {
    /// Turn a resolved answer into an intent.
    pub fn intent(&self, resolved: Resolved) -> SubmitResult<Intent> {
        let value = match resolved {
            Resolved::Resume(id) => return Ok(Intent::Resume(id)),
            Resolved::Value(value) => value,
        };
        let commit = |action: Action, value: PatchValue| -> SubmitResult<Intent> {
            Ok(Intent::Commit { action, value })
        };

        match self {
            Self::Opening => commit(Action::ChooseTrack, value),
            Self::Profile(field) => commit(Action::SetProfile(*field), value),
            Self::FlowBucket(bucket) => commit(Action::SetFlowBucket(*bucket), value),
            Self::Departments => commit(Action::SetDepartments, value),
            Self::DepartmentField { department, field } => commit(
                Action::SetDepartmentField { department: department.clone(), field: *field },
                value,
            ),
            Self::SubActivities { department, responsibility } => commit(
                Action::SetSubActivities {
                    department: department.clone(),
                    responsibility: responsibility.clone(),
                },
                value,
            ),
            Self::CaptureMethod(row) => {
                commit(Action::SetRegistryField { row: *row, field: RegistryField::Method }, value)
            }
            Self::Standard(row) => {
                commit(Action::SetRegistryField { row: *row, field: RegistryField::Standard }, value)
            }
            Self::DocumentRow(row) => commit(Action::DocumentRow(*row), value),
            Self::Adoption(department) => commit(Action::SetAdoption(department.clone()), value),
            Self::Kpis => commit(Action::SetKpis, value),
            Self::Problems => match value {
                PatchValue::List(items) if items.is_empty() => Ok(Intent::Skip(Self::Problems)),
                value => commit(Action::SetProblems, value),
            },
            Self::ProblemAction(problem) => match value {
                PatchValue::Text(choice) => {
                    let action = choice.parse().map_err(|_| SubmitError::UnknownOption(choice))?;
                    commit(
                        Action::SetProblemAction { problem: *problem, action },
                        PatchValue::Flag(true),
                    )
                }
                other => Err(SubmitError::UnknownOption(format!("{other:?}"))),
            },
            Self::Continue => match value {
                PatchValue::Text(choice) if choice == CONTINUE => Ok(Intent::Continue),
                PatchValue::Text(choice) if choice == KEEP_GOING => Ok(Intent::KeepGoing),
                other => Err(SubmitError::UnknownOption(format!("{other:?}"))),
            },
            Self::Idle => Err(SubmitError::NoActivePrompt),
        }
    }
}

/// A question with its input surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub step: Step,
    pub text: String,
    pub surface: InputSurface,
    /// Shown for preview only; every option is disabled.
    pub inert: bool,
}

/// Everything prompt selection reads.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub project: &'a Project,
    pub stage: Option<ExtractStage>,
    /// Whether the opening question was answered this session
    pub opened: bool,
    /// The user chose to keep working in the current phase
    pub keep_going: bool,
    pub skipped: &'a HashSet<Step>,
    pub resumable: &'a [ProjectSummary],
    pub translator: &'a Translator,
}

// --- Text catalogue ---

const OPENING: Dictionary = Dictionary::new(
    "Let's map how your business runs. Which map do you want to build? You can also pick up a recent project.",
    "Vamos a mapear cómo funciona tu negocio. ¿Qué mapa quieres construir? También puedes retomar un proyecto reciente.",
);
const TRACK_STANDARD: Dictionary =
    Dictionary::new("Standard: from first attention to loyal clients", "Estándar: de la primera atención a clientes fieles");
const TRACK_GROWTH: Dictionary =
    Dictionary::new("Growth: finance, people, management, operations", "Crecimiento: finanzas, personas, dirección, operaciones");

const BUSINESS_NAME: Dictionary =
    Dictionary::new("What is the name of your business?", "¿Cómo se llama tu negocio?");
const CORE_SERVICE: Dictionary = Dictionary::new(
    "What is the core product or service {name} offers?",
    "¿Cuál es el producto o servicio principal que ofrece {name}?",
);
const TARGET_CLIENT: Dictionary =
    Dictionary::new("Who is your ideal client?", "¿Quién es tu cliente ideal?");
const FLOW_BUCKET: Dictionary = Dictionary::new(
    "Flow: {bucket}. Pick what applies, or choose other to add your own.",
    "Flujo: {bucket}. Elige lo que aplique, o elige otro para añadir lo tuyo.",
);
const OTHER_LABEL: Dictionary = Dictionary::new("Other…", "Otro…");

const DEPARTMENTS: Dictionary = Dictionary::new(
    "Which departments does the business have?",
    "¿Qué departamentos tiene el negocio?",
);
const HEAD: Dictionary =
    Dictionary::new("Who leads {department}?", "¿Quién dirige {department}?");
const WORKER: Dictionary = Dictionary::new(
    "Who does the day-to-day work in {department}?",
    "¿Quién hace el trabajo diario en {department}?",
);
const RESPONSIBILITIES: Dictionary = Dictionary::new(
    "List the responsibilities of {department}, one per line.",
    "Enumera las responsabilidades de {department}, una por línea.",
);

const SUB_ACTIVITIES: Dictionary = Dictionary::new(
    "Break \"{responsibility}\" ({department}) into the steps someone actually does.",
    "Divide \"{responsibility}\" ({department}) en los pasos que alguien realmente hace.",
);
const CAPTURE_METHOD: Dictionary = Dictionary::new(
    "How will \"{activity}\" be captured?",
    "¿Cómo se capturará \"{activity}\"?",
);
const STANDARD: Dictionary = Dictionary::new(
    "What does \"done\" look like for \"{activity}\"?",
    "¿Cómo se ve \"terminado\" para \"{activity}\"?",
);

const DOCUMENT_ROW: Dictionary = Dictionary::new(
    "Write down the steps of \"{activity}\" so anyone in {department} can follow them.",
    "Escribe los pasos de \"{activity}\" para que cualquiera en {department} pueda seguirlos.",
);
const ADOPTION: Dictionary = Dictionary::new(
    "Which adoption steps has {department} completed?",
    "¿Qué pasos de adopción ha completado {department}?",
);

const KPIS: Dictionary = Dictionary::new(
    "Which numbers will you track?",
    "¿Qué indicadores vas a seguir?",
);
const PROBLEMS: Dictionary = Dictionary::new(
    "Any recurring problems? List them, or submit an empty list if there are none.",
    "¿Algún problema recurrente? Enuméralos, o envía la lista vacía si no hay ninguno.",
);
const PROBLEM_ACTION: Dictionary = Dictionary::new(
    "Which action on \"{problem}\" is done?",
    "¿Qué acción sobre \"{problem}\" está hecha?",
);
const PREVIEW: Dictionary = Dictionary::new(
    " (Preview: finish integrate to unlock.)",
    " (Vista previa: termina la integración para desbloquear.)",
);

const PHASE_DONE: Dictionary = Dictionary::new(
    "{phase} is complete. Continue to {next}?",
    "{phase} está completo. ¿Continuar a {next}?",
);
const STAGE_DONE: Dictionary = Dictionary::new(
    "Nothing left here. Move on to {next}?",
    "No queda nada aquí. ¿Pasar a {next}?",
);
const CONTINUE_LABEL: Dictionary = Dictionary::new("Continue", "Continuar");
const KEEP_GOING_LABEL: Dictionary = Dictionary::new("Keep going", "Seguir aquí");
const IDLE: Dictionary = Dictionary::new(
    "Nothing to ask right now. Edit the document directly, or continue when ready.",
    "Nada que preguntar ahora. Edita el documento directamente, o continúa cuando estés listo.",
);

/// Localized phase name.
pub fn phase_name(phase: Phase) -> Dictionary {
    match phase {
        Phase::Define => Dictionary::new("Define", "Definir"),
        Phase::Assign => Dictionary::new("Assign", "Asignar"),
        Phase::Extract => Dictionary::new("Extract", "Extraer"),
        Phase::Organize => Dictionary::new("Organize", "Organizar"),
        Phase::Integrate => Dictionary::new("Integrate", "Integrar"),
        Phase::Optimize => Dictionary::new("Optimize", "Optimizar"),
    }
}

pub fn stage_name(stage: ExtractStage) -> Dictionary {
    match stage {
        ExtractStage::Brainstorm => Dictionary::new("brainstorming", "lluvia de ideas"),
        ExtractStage::RawCapture => Dictionary::new("raw capture", "captura"),
        ExtractStage::Standards => Dictionary::new("standards", "estándares"),
    }
}

fn bucket_name(bucket: FlowBucket) -> Dictionary {
    match bucket {
        FlowBucket::Attention => Dictionary::new("attention", "atención"),
        FlowBucket::Enquiry => Dictionary::new("enquiry", "consulta"),
        FlowBucket::Sales => Dictionary::new("sales", "ventas"),
        FlowBucket::Delivery => Dictionary::new("delivery", "entrega"),
        FlowBucket::Money => Dictionary::new("money", "cobro"),
        FlowBucket::Loyalty => Dictionary::new("loyalty", "fidelidad"),
        FlowBucket::Finance => Dictionary::new("finance", "finanzas"),
        FlowBucket::People => Dictionary::new("people", "personas"),
        FlowBucket::Management => Dictionary::new("management", "dirección"),
        FlowBucket::Operations => Dictionary::new("operations", "operaciones"),
    }
}

fn bucket_suggestions(bucket: FlowBucket) -> &'static [Dictionary] {
    const ATTENTION: &[Dictionary] = &[
        Dictionary::new("Social media", "Redes sociales"),
        Dictionary::new("Referrals", "Recomendaciones"),
        Dictionary::new("Paid ads", "Anuncios pagados"),
    ];
    const ENQUIRY: &[Dictionary] = &[
        Dictionary::new("Phone calls", "Llamadas"),
        Dictionary::new("Website form", "Formulario web"),
        Dictionary::new("Walk-ins", "Visitas"),
    ];
    const SALES: &[Dictionary] = &[
        Dictionary::new("Quotes", "Presupuestos"),
        Dictionary::new("Consultations", "Consultas"),
        Dictionary::new("Online checkout", "Pago en línea"),
    ];
    const DELIVERY: &[Dictionary] = &[
        Dictionary::new("In person", "En persona"),
        Dictionary::new("Shipping", "Envío"),
        Dictionary::new("Online session", "Sesión en línea"),
    ];
    const MONEY: &[Dictionary] = &[
        Dictionary::new("Invoices", "Facturas"),
        Dictionary::new("Card payments", "Pagos con tarjeta"),
        Dictionary::new("Subscriptions", "Suscripciones"),
    ];
    const LOYALTY: &[Dictionary] = &[
        Dictionary::new("Follow-up calls", "Llamadas de seguimiento"),
        Dictionary::new("Newsletter", "Boletín"),
        Dictionary::new("Rewards", "Recompensas"),
    ];
    const FINANCE: &[Dictionary] = &[
        Dictionary::new("Budgeting", "Presupuestos"),
        Dictionary::new("Cash flow", "Flujo de caja"),
        Dictionary::new("Bookkeeping", "Contabilidad"),
    ];
    const PEOPLE: &[Dictionary] = &[
        Dictionary::new("Hiring", "Contratación"),
        Dictionary::new("Onboarding", "Incorporación"),
        Dictionary::new("Training", "Formación"),
    ];
    const MANAGEMENT: &[Dictionary] = &[
        Dictionary::new("Weekly meeting", "Reunión semanal"),
        Dictionary::new("Goal setting", "Fijar objetivos"),
        Dictionary::new("Reporting", "Informes"),
    ];
    const OPERATIONS: &[Dictionary] = &[
        Dictionary::new("Inventory", "Inventario"),
        Dictionary::new("Suppliers", "Proveedores"),
        Dictionary::new("Scheduling", "Agenda"),
    ];
    match bucket {
        FlowBucket::Attention => ATTENTION,
        FlowBucket::Enquiry => ENQUIRY,
        FlowBucket::Sales => SALES,
        FlowBucket::Delivery => DELIVERY,
        FlowBucket::Money => MONEY,
        FlowBucket::Loyalty => LOYALTY,
        FlowBucket::Finance => FINANCE,
        FlowBucket::People => PEOPLE,
        FlowBucket::Management => MANAGEMENT,
        FlowBucket::Operations => OPERATIONS,
    }
}

const DEPARTMENT_SUGGESTIONS: &[Dictionary] = &[
    Dictionary::new("Sales", "Ventas"),
    Dictionary::new("Marketing", "Marketing"),
    Dictionary::new("Operations", "Operaciones"),
    Dictionary::new("Finance", "Finanzas"),
    Dictionary::new("Customer service", "Atención al cliente"),
];

const KPI_SUGGESTIONS: &[Dictionary] = &[
    Dictionary::new("Revenue", "Ingresos"),
    Dictionary::new("New leads", "Nuevos contactos"),
    Dictionary::new("Conversion rate", "Tasa de conversión"),
    Dictionary::new("Client satisfaction", "Satisfacción del cliente"),
];

fn method_label(method: CaptureMethod) -> Dictionary {
    match method {
        CaptureMethod::ScreenRecording => Dictionary::new("Screen recording", "Grabación de pantalla"),
        CaptureMethod::Camera => Dictionary::new("Camera", "Cámara"),
        CaptureMethod::AudioNote => Dictionary::new("Audio note", "Nota de audio"),
        CaptureMethod::RolePlay => Dictionary::new("Role play", "Juego de roles"),
        CaptureMethod::Text => Dictionary::new("Written", "Escrito"),
        CaptureMethod::Other => Dictionary::new("Other", "Otro"),
    }
}

fn adoption_label(step: AdoptionStep) -> Dictionary {
    match step {
        AdoptionStep::Share => Dictionary::new("Share the system", "Compartir el sistema"),
        AdoptionStep::Walkthrough => Dictionary::new("Walk through it", "Recorrerlo juntos"),
        AdoptionStep::Shadow => Dictionary::new("Shadow the worker", "Acompañar al trabajador"),
        AdoptionStep::Practice => Dictionary::new("Practice run", "Ensayo"),
        AdoptionStep::Review => Dictionary::new("Review results", "Revisar resultados"),
        AdoptionStep::Refine => Dictionary::new("Refine the steps", "Refinar los pasos"),
        AdoptionStep::SignOff => Dictionary::new("Sign off", "Aprobar"),
        AdoptionStep::Embed => Dictionary::new("Embed in routine", "Integrar en la rutina"),
    }
}

// --- Selection ---

fn blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// The first unanswered step of the current phase, if any.
pub fn pending_step(ctx: &PromptContext<'_>) -> Option<Step> {
    let project = ctx.project;
    match project.phase {
        Phase::Define => {
            let profile = &project.profile;
            [
                (ProfileField::BusinessName, &profile.business_name),
                (ProfileField::CoreService, &profile.core_service),
                (ProfileField::TargetClient, &profile.target_client),
            ]
            .into_iter()
            .find(|(_, value)| blank(value))
            .map(|(field, _)| Step::Profile(field))
            .or_else(|| {
                project
                    .flow
                    .buckets()
                    .into_iter()
                    .find(|(_, items)| items.iter().all(|i| blank(i)))
                    .map(|(bucket, _)| Step::FlowBucket(bucket))
            })
        }
        Phase::Assign => {
            if project.departments.is_empty() {
                return Some(Step::Departments);
            }
            project.departments.iter().find_map(|d| {
                let field = if d.head.is_none() {
                    DepartmentField::Head
                } else if d.worker.is_none() {
                    DepartmentField::Worker
                } else if d.responsibilities.is_empty() {
                    DepartmentField::Responsibilities
                } else {
                    return None;
                };
                Some(Step::DepartmentField { department: d.name.clone(), field })
            })
        }
        Phase::Extract => match ctx.stage.unwrap_or(ExtractStage::Brainstorm) {
            ExtractStage::Brainstorm => project.departments.iter().find_map(|d| {
                d.responsibilities
                    .iter()
                    .find(|r| d.sub_activities_for(r).is_empty())
                    .map(|r| Step::SubActivities {
                        department: d.name.clone(),
                        responsibility: r.clone(),
                    })
            }),
            ExtractStage::RawCapture => project
                .extraction_registry
                .iter()
                .position(|row| row.method.is_none())
                .map(Step::CaptureMethod),
            ExtractStage::Standards => project
                .extraction_registry
                .iter()
                .position(|row| !row.has_standard())
                .map(Step::Standard),
        },
        Phase::Organize => (0..project.extraction_registry.len())
            .find(|row| project.record_for_row(*row).is_none())
            .map(Step::DocumentRow),
        Phase::Integrate => project
            .integrate_departments()
            .find(|(_, d)| !project.integrate_plan.is_complete_for(&d.name))
            .map(|(_, d)| Step::Adoption(d.name.clone())),
        Phase::Optimize => {
            let data = &project.optimize_data;
            if data.kpis.is_empty() {
                Some(Step::Kpis)
            } else if data.problems.is_empty() && !ctx.skipped.contains(&Step::Problems) {
                Some(Step::Problems)
            } else {
                data.problems.iter().position(|p| !p.is_resolved()).map(Step::ProblemAction)
            }
        }
    }
}

/// Whether a continue would be accepted right now.
fn can_advance(ctx: &PromptContext<'_>) -> bool {
    let in_sub_stage = ctx.project.phase == Phase::Extract
        && ctx.stage.unwrap_or(ExtractStage::Brainstorm).next().is_some();
    in_sub_stage
        || (ctx.project.phase.next().is_some() && is_ready(ctx.project, ctx.project.phase))
}

/// Select and build the next prompt.
pub fn next_prompt(ctx: &PromptContext<'_>) -> Prompt {
    if !ctx.opened {
        return build(ctx, Step::Opening);
    }

    let pending = pending_step(ctx);
    let in_sub_stage = ctx.project.phase == Phase::Extract
        && ctx.stage.unwrap_or(ExtractStage::Brainstorm).next().is_some();
    let step = match (pending, can_advance(ctx)) {
        (None, true) => Step::Continue,
        (Some(_), true) if !ctx.keep_going && !in_sub_stage => Step::Continue,
        (Some(step), _) => step,
        (None, false) => Step::Idle,
    };
    build(ctx, step)
}

fn options(t: &Translator, items: &[Dictionary]) -> Vec<ChoiceOption> {
    items
        .iter()
        .map(|d| {
            let label = t.translate(d);
            ChoiceOption::new(label, label)
        })
        .collect()
}

/// Flow suggestions commit their English text so the document reads the
/// same whatever the locale; only the label is translated.
fn flow_options(t: &Translator, bucket: FlowBucket) -> Vec<ChoiceOption> {
    bucket_suggestions(bucket).iter().map(|d| ChoiceOption::new(d.en, t.translate(d))).collect()
}

/// Display text for a stored flow item: the translated label for a
/// suggestion, the item itself otherwise.
pub fn flow_item_label<'a>(t: &Translator, bucket: FlowBucket, item: &'a str) -> &'a str {
    bucket_suggestions(bucket).iter().find(|d| d.en == item).map_or(item, |d| t.translate(d))
}

/// Build the prompt for a step.
pub fn build(ctx: &PromptContext<'_>, step: Step) -> Prompt {
    let t = ctx.translator;
    let project = ctx.project;
    let row_activity = |row: usize| {
        project
            .extraction_registry
            .get(row)
            .map(|r| (r.sub_activity.clone(), r.department.clone()))
            .unwrap_or_default()
    };

    let (text, surface) = match &step {
        Step::Opening => {
            let options = vec![
                ChoiceOption::new(Track::Standard.as_str(), t.translate(&TRACK_STANDARD)),
                ChoiceOption::new(Track::Growth.as_str(), t.translate(&TRACK_GROWTH)),
            ];
            (
                t.translate(&OPENING).to_string(),
                InputSurface::SingleSelect(SingleSelect::new(options, ctx.resumable.to_vec())),
            )
        }
        Step::Profile(field) => {
            let text = match field {
                ProfileField::BusinessName => t.translate(&BUSINESS_NAME).to_string(),
                ProfileField::CoreService => {
                    t.translate_with(&CORE_SERVICE, &[("name", project.title())])
                }
                ProfileField::TargetClient => t.translate(&TARGET_CLIENT).to_string(),
            };
            (text, InputSurface::FreeText(FreeText::new()))
        }
        Step::FlowBucket(bucket) => {
            let mut opts = flow_options(t, *bucket);
            opts.push(ChoiceOption::new(super::input::OTHER, t.translate(&OTHER_LABEL)));
            let existing = project.flow.bucket(*bucket).unwrap_or_default();
            (
                t.translate_with(&FLOW_BUCKET, &[("bucket", t.translate(&bucket_name(*bucket)))]),
                InputSurface::MultiSelect(MultiSelect::new(opts, true).with_selected(existing)),
            )
        }
        Step::Departments => {
            let mut opts = options(t, DEPARTMENT_SUGGESTIONS);
            opts.push(ChoiceOption::new(super::input::OTHER, t.translate(&OTHER_LABEL)));
            let existing: Vec<String> = project.departments.iter().map(|d| d.name.clone()).collect();
            (
                t.translate(&DEPARTMENTS).to_string(),
                InputSurface::MultiSelect(MultiSelect::new(opts, true).with_selected(&existing)),
            )
        }
        Step::DepartmentField { department, field } => {
            let args = [("department", department.as_str())];
            match field {
                DepartmentField::Head => {
                    (t.translate_with(&HEAD, &args), InputSurface::FreeText(FreeText::new()))
                }
                DepartmentField::Worker => {
                    (t.translate_with(&WORKER, &args), InputSurface::FreeText(FreeText::new()))
                }
                DepartmentField::Responsibilities => (
                    t.translate_with(&RESPONSIBILITIES, &args),
                    InputSurface::List(DynamicList::new(false)),
                ),
            }
        }
        Step::SubActivities { department, responsibility } => {
            let existing = project
                .department(department)
                .map(|d| d.sub_activities_for(responsibility).to_vec())
                .unwrap_or_default();
            (
                t.translate_with(
                    &SUB_ACTIVITIES,
                    &[("department", department.as_str()), ("responsibility", responsibility.as_str())],
                ),
                InputSurface::List(DynamicList::seeded(&existing)),
            )
        }
        Step::CaptureMethod(row) => {
            let (activity, _) = row_activity(*row);
            let options = CaptureMethod::ALL
                .iter()
                .map(|m| ChoiceOption::new(m.as_str(), t.translate(&method_label(*m))))
                .collect();
            (
                t.translate_with(&CAPTURE_METHOD, &[("activity", activity.as_str())]),
                InputSurface::OptionButtons { options },
            )
        }
        Step::Standard(row) => {
            let (activity, _) = row_activity(*row);
            (
                t.translate_with(&STANDARD, &[("activity", activity.as_str())]),
                InputSurface::FreeText(FreeText::new()),
            )
        }
        Step::DocumentRow(row) => {
            let (activity, department) = row_activity(*row);
            let existing = project.record_for_row(*row).map(|r| r.steps.clone()).unwrap_or_default();
            (
                t.translate_with(
                    &DOCUMENT_ROW,
                    &[("activity", activity.as_str()), ("department", department.as_str())],
                ),
                InputSurface::List(DynamicList::seeded(&existing)),
            )
        }
        Step::Adoption(department) => {
            let options = AdoptionStep::ALL
                .iter()
                .map(|s| ChoiceOption::new(s.as_str(), t.translate(&adoption_label(*s))))
                .collect();
            let done: Vec<String> = project
                .integrate_plan
                .completed(department)
                .iter()
                .map(|s| s.as_str().to_string())
                .collect();
            (
                t.translate_with(&ADOPTION, &[("department", department.as_str())]),
                InputSurface::MultiSelect(MultiSelect::new(options, false).with_selected(&done)),
            )
        }
        Step::Kpis => {
            let mut opts = options(t, KPI_SUGGESTIONS);
            opts.push(ChoiceOption::new(super::input::OTHER, t.translate(&OTHER_LABEL)));
            (t.translate(&KPIS).to_string(), InputSurface::MultiSelect(MultiSelect::new(opts, true)))
        }
        Step::Problems => (
            t.translate(&PROBLEMS).to_string(),
            InputSurface::List(DynamicList::new(false).optional()),
        ),
        Step::ProblemAction(index) => {
            let problem = project.optimize_data.problems.get(*index);
            let description = problem.map(|p| p.description.as_str()).unwrap_or_default();
            let options = problem
                .map(|p| {
                    p.actions
                        .iter()
                        .enumerate()
                        .filter(|(_, a)| !a.done)
                        .map(|(i, a)| ChoiceOption::new(i.to_string(), a.text.clone()))
                        .collect()
                })
                .unwrap_or_default();
            (
                t.translate_with(&PROBLEM_ACTION, &[("problem", description)]),
                InputSurface::OptionButtons { options },
            )
        }
        Step::Continue => {
            let text = match ctx.stage.and_then(ExtractStage::next) {
                Some(next) if project.phase == Phase::Extract => {
                    t.translate_with(&STAGE_DONE, &[("next", t.translate(&stage_name(next)))])
                }
                _ => {
                    let next = project.phase.next().unwrap_or(project.phase);
                    t.translate_with(
                        &PHASE_DONE,
                        &[
                            ("phase", t.translate(&phase_name(project.phase))),
                            ("next", t.translate(&phase_name(next))),
                        ],
                    )
                }
            };
            let options = vec![
                ChoiceOption::new(CONTINUE, t.translate(&CONTINUE_LABEL)),
                ChoiceOption::new(KEEP_GOING, t.translate(&KEEP_GOING_LABEL)),
            ];
            (text, InputSurface::OptionButtons { options })
        }
        Step::Idle => (t.translate(&IDLE).to_string(), InputSurface::None),
    };

    let mut prompt = Prompt { step, text, surface, inert: false };
    if project.phase == Phase::Optimize
        && PhaseMachine::section(project, Phase::Optimize) == SectionState::Inert
    {
        prompt.surface.disable_all();
        prompt.text.push_str(t.translate(&PREVIEW));
        prompt.inert = true;
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Answer, InputKind};
    use crate::core::Locale;

    struct Fixture {
        skipped: HashSet<Step>,
        translator: Translator,
    }

    impl Fixture {
        fn new() -> Self {
            Self { skipped: HashSet::new(), translator: Translator::new(Locale::En) }
        }

        fn ctx<'a>(&'a self, project: &'a Project) -> PromptContext<'a> {
            PromptContext {
                project,
                stage: PhaseMachine::for_project(project).extract_stage(),
                opened: true,
                keep_going: false,
                skipped: &self.skipped,
                resumable: &[],
                translator: &self.translator,
            }
        }
    }

    #[test]
    fn test_opening_comes_first() {
        let fx = Fixture::new();
        let project = Project::default();
        let mut ctx = fx.ctx(&project);
        ctx.opened = false;
        let prompt = next_prompt(&ctx);
        assert_eq!(prompt.step, Step::Opening);
        assert_eq!(prompt.surface.kind(), InputKind::SingleSelectWithResume);
    }

    #[test]
    fn test_define_walks_profile_then_buckets() {
        let fx = Fixture::new();
        let mut project = Project::default();
        assert_eq!(next_prompt(&fx.ctx(&project)).step, Step::Profile(ProfileField::BusinessName));

        project.profile.business_name = "Acme".into();
        project.profile.core_service = "Bakery".into();
        project.profile.target_client = "Local families".into();
        let prompt = next_prompt(&fx.ctx(&project));
        assert_eq!(prompt.step, Step::FlowBucket(FlowBucket::Attention));
        assert_eq!(prompt.surface.kind(), InputKind::MultiSelectWithOther);
    }

    #[test]
    fn test_continue_offered_when_ready() {
        let fx = Fixture::new();
        let mut project = Project::default();
        project.profile.business_name = "Acme".into();
        for bucket in FlowBucket::STANDARD {
            project.flow.bucket_mut(bucket).unwrap().push("x".into());
        }
        // Core service is still blank, but the phase is satisfied
        let prompt = next_prompt(&fx.ctx(&project));
        assert_eq!(prompt.step, Step::Continue);

        let mut ctx = fx.ctx(&project);
        ctx.keep_going = true;
        assert_eq!(next_prompt(&ctx).step, Step::Profile(ProfileField::CoreService));
    }

    #[test]
    fn test_assign_asks_per_department() {
        let fx = Fixture::new();
        let mut project = Project::default();
        project.phase = Phase::Assign;
        assert_eq!(next_prompt(&fx.ctx(&project)).step, Step::Departments);

        project.set_departments(vec!["Sales".into()]).unwrap();
        project.department_mut("Sales").unwrap().head = Some("Ana".into());
        let prompt = next_prompt(&fx.ctx(&project));
        assert_eq!(
            prompt.step,
            Step::DepartmentField { department: "Sales".into(), field: DepartmentField::Worker }
        );
        assert!(prompt.text.contains("Sales"));
    }

    #[test]
    fn test_sub_activity_prompt_seeds_steps() {
        let fx = Fixture::new();
        let mut project = Project::default();
        project.set_departments(vec!["Sales".into()]).unwrap();
        project
            .department_mut("Sales")
            .unwrap()
            .set_responsibilities(vec!["Calls".into()])
            .unwrap();
        project.phase = Phase::Extract;

        let prompt = next_prompt(&fx.ctx(&project));
        assert_eq!(
            prompt.step,
            Step::SubActivities { department: "Sales".into(), responsibility: "Calls".into() }
        );
        assert_eq!(prompt.surface.kind(), InputKind::DynamicSteps);
    }

    #[test]
    fn test_optimize_preview_disables_options() {
        let fx = Fixture::new();
        let mut project = Project::default();
        project.phase = Phase::Optimize;
        let prompt = next_prompt(&fx.ctx(&project));
        assert_eq!(prompt.step, Step::Kpis);
        assert!(prompt.inert);
        assert!(prompt.surface.options().iter().all(|o| !o.enabled));
        assert!(prompt.text.contains("Preview"));

        project.optimize_data.kpis.push(crate::document::Kpi::new("Revenue"));
        assert_eq!(next_prompt(&fx.ctx(&project)).step, Step::Problems);
    }

    #[test]
    fn test_problem_list_can_be_skipped() {
        let step = Step::Problems;
        let intent = step.intent(Resolved::Value(PatchValue::List(Vec::new()))).unwrap();
        assert_eq!(intent, Intent::Skip(Step::Problems));
    }

    #[test]
    fn test_continue_answers() {
        assert_eq!(
            Step::Continue.intent(Resolved::Value(PatchValue::Text(CONTINUE.into()))),
            Ok(Intent::Continue)
        );
        assert_eq!(
            Step::Continue.intent(Resolved::Value(PatchValue::Text(KEEP_GOING.into()))),
            Ok(Intent::KeepGoing)
        );
    }

    #[test]
    fn test_problem_action_maps_choice_to_index() {
        let intent = Step::ProblemAction(2)
            .intent(Resolved::Value(PatchValue::Text("1".into())))
            .unwrap();
        assert_eq!(
            intent,
            Intent::Commit {
                action: Action::SetProblemAction { problem: 2, action: 1 },
                value: PatchValue::Flag(true),
            }
        );
    }

    #[test]
    fn test_flow_options_commit_the_same_value_in_every_locale() {
        let mut project = Project::default();
        project.profile.business_name = "Acme".into();
        let step = Step::FlowBucket(FlowBucket::Attention);

        let en = Fixture::new();
        let mut es = Fixture::new();
        es.translator = Translator::new(Locale::Es);
        let english = build(&en.ctx(&project), step.clone()).surface;
        let spanish = build(&es.ctx(&project), step).surface;

        let values = |s: &InputSurface| s.options().iter().map(|o| o.value.clone()).collect::<Vec<_>>();
        assert_eq!(values(&english), values(&spanish));
        assert_eq!(spanish.options()[0].value, "Social media");
        assert_eq!(spanish.options()[0].label, "Redes sociales");

        assert_eq!(flow_item_label(&es.translator, FlowBucket::Attention, "Social media"), "Redes sociales");
        assert_eq!(flow_item_label(&es.translator, FlowBucket::Attention, "Flyers"), "Flyers");
    }

    #[test]
    fn test_spanish_prompts() {
        let mut fx = Fixture::new();
        fx.translator = Translator::new(Locale::Es);
        let project = Project::default();
        let prompt = next_prompt(&fx.ctx(&project));
        assert_eq!(prompt.text, "¿Cómo se llama tu negocio?");

        let surface = prompt.surface;
        assert!(surface.resolve(Answer::Text("Acme".into())).is_ok());
    }
}
