//! Snapshot: the read-only render of a session
//!
//! A snapshot is regenerated from the session on every call and never stored.
//! Step text comes from the template catalog, resolved against a context that
//! grows as earlier steps are completed (definition words, indicator words,
//! identified outer/inner/source words).

use serde::Serialize;

use crate::assembly::{AssemblyPhase, AssemblyPlan, AssemblyProgress};
use crate::clue::{ClueDefinition, InputMode, OperationKind, StepKind, StepSpec, TransformSpec};
use crate::error::TutorError;
use crate::letters;
use crate::template::notation;
use crate::template::{resolve, Discriminant, TemplateContext, TemplateRegistry, TemplateText};

use super::Session;

/// Everything a presentation layer needs to draw the current state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub clue_id: String,
    pub words: Vec<String>,
    pub enumeration: String,
    /// Formatted answer, present only once locked
    pub answer: Option<String>,
    pub steps: Vec<StepSummary>,
    pub active: Option<ActiveStep>,
    pub highlights: Vec<Highlight>,
    pub complete: bool,
    pub answer_locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

/// One row of the step sidebar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    pub position: usize,
    pub kind: StepKind,
    pub title: String,
    pub status: StepStatus,
    pub completion: Option<String>,
}

/// Full detail of the step the learner is working on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveStep {
    pub position: usize,
    pub kind: StepKind,
    pub input_mode: InputMode,
    pub intro: Option<String>,
    pub prompt: String,
    pub hint: String,
    pub hint_visible: bool,
    pub expanded: bool,
    pub options: Vec<String>,
    pub selected: Vec<usize>,
    pub typed: String,
    pub assembly: Option<AssemblyView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyView {
    pub phase: AssemblyPhase,
    pub fragments: Vec<FragmentView>,
    /// Assembled letters with `_` for unknown positions
    pub partial: String,
    /// Fully assembled letters, once every mapped position is known
    pub assembled: Option<String>,
    pub breakdown: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentStatus {
    Pending,
    Solved,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentView {
    pub position: usize,
    pub role: String,
    pub operation: OperationKind,
    pub prompt: String,
    pub status: FragmentStatus,
    pub result: Option<String>,
    pub hint: String,
    pub hint_visible: bool,
    pub letter_count: usize,
    /// Answer positions this fragment fills; empty for consumed fragments
    pub answer_positions: Vec<usize>,
}

/// Clue words to highlight, tagged by what they turned out to be
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub role: String,
    pub indices: Vec<usize>,
}

/// Render `session` with `templates`.
///
/// Any template failure here is an invariant violation: validated clues and a
/// checked catalog always resolve.
pub fn render(templates: &TemplateRegistry, session: &Session) -> Result<Snapshot, TutorError> {
    let clue = &session.clue;
    if session.position > clue.steps.len() {
        return Err(TutorError::invariant(
            &clue.id,
            Some(session.position),
            None,
            format!("position past the last of {} steps", clue.steps.len()),
        ));
    }

    let mut acc = base_context(clue);
    let mut steps = Vec::with_capacity(clue.steps.len());
    let mut active = None;
    let mut highlights = Vec::new();

    for (position, step) in clue.steps.iter().enumerate() {
        let ctx = step_context(&acc, clue, step, templates);
        let kind = step.kind();
        let template = templates.step(kind);
        let disc = discriminant(step);
        let text = |field: &str, body: &TemplateText| {
            resolve_text(clue, position, None, &format!("steps.{}.{}", kind, field), body, disc, &ctx)
        };

        let completed = session.completed.contains(&position);
        let status = if completed {
            StepStatus::Completed
        } else if position == session.position {
            StepStatus::Active
        } else {
            StepStatus::Pending
        };

        steps.push(StepSummary {
            position,
            kind,
            title: text("title", &template.title)?,
            status,
            completion: if completed {
                Some(text("completion", &template.completion)?)
            } else {
                None
            },
        });

        if status == StepStatus::Active {
            let assembly = match step {
                StepSpec::Assembly { transforms, .. } => Some(assembly_view(
                    templates,
                    clue,
                    position,
                    transforms,
                    &session.assembly,
                    &ctx,
                )?),
                _ => None,
            };
            active = Some(ActiveStep {
                position,
                kind,
                input_mode: step.input_mode(),
                intro: template
                    .intro
                    .as_ref()
                    .map(|intro| text("intro", intro))
                    .transpose()?,
                prompt: text("prompt", &template.prompt)?,
                hint: text("hint", &template.hint)?,
                hint_visible: session.ui.hint_visible,
                expanded: session.ui.expanded,
                options: match step {
                    StepSpec::WordplayChoice { options, .. } => options.clone(),
                    _ => Vec::new(),
                },
                selected: session.ui.selected.iter().copied().collect(),
                typed: session.ui.typed.clone(),
                assembly,
            });
        }

        if completed {
            if let Some(indices) = step.indices() {
                highlights.push(Highlight {
                    role: kind.as_str().to_string(),
                    indices: indices.to_vec(),
                });
            }
            accumulate(&mut acc, clue, step);
        }
        if let StepSpec::Assembly { transforms, .. } = step {
            highlights.extend(fragment_highlights(transforms, &session.assembly));
        }
    }

    let answer = match (&session.final_answer, clue.parsed_enumeration()) {
        (Some(letters), Ok(enumeration)) => Some(enumeration.format(letters)),
        (Some(letters), Err(_)) => Some(letters.clone()),
        (None, _) => None,
    };

    Ok(Snapshot {
        clue_id: clue.id.clone(),
        words: clue.words.clone(),
        enumeration: clue.enumeration.clone(),
        answer,
        steps,
        active,
        highlights,
        complete: session.is_complete(),
        answer_locked: session.final_answer.is_some(),
    })
}

fn assembly_view(
    templates: &TemplateRegistry,
    clue: &ClueDefinition,
    step: usize,
    transforms: &[TransformSpec],
    progress: &AssemblyProgress,
    ctx: &TemplateContext,
) -> Result<AssemblyView, TutorError> {
    let plan = AssemblyPlan::new(transforms, &clue.answer);
    let mut fragments = Vec::with_capacity(transforms.len());

    for (i, transform) in transforms.iter().enumerate() {
        let template = templates.fragment(transform.operation);
        let mut fctx = ctx.nested();
        fctx.set("role", transform.role.as_str())
            .set("operation", transform.operation.as_str())
            .set("letter_count", transform.letter_count().to_string())
            .set("source_words", clue.words_at(&transform.indices));
        let solved = progress.solved.get(&i);
        if let Some(result) = solved {
            fctx.set("result", result.as_str());
        }

        let (field, body) = if transform.is_dependent() && plan.inputs_ready(progress, i) {
            let mut inputs = Vec::new();
            for p in plan.graph().consumed_by(i) {
                let letters = progress.solved.get(p).ok_or_else(|| {
                    TutorError::invariant(
                        &clue.id,
                        Some(step),
                        Some(i),
                        format!("consumed fragment {} has no stored result", p),
                    )
                })?;
                inputs.push(letters.as_str());
            }
            fctx.set("predecessors", inputs.join(&templates.notation.separator));
            ("with_inputs", template.with_inputs.as_deref().unwrap_or(&template.prompt))
        } else {
            ("prompt", template.prompt.as_str())
        };
        let field = format!("fragments.{}.{}", transform.operation, field);
        let prompt = resolve(body, &fctx).map_err(|e| {
            TutorError::invariant(&clue.id, Some(step), Some(i), format!("{}: {}", field, e))
        })?;

        fragments.push(FragmentView {
            position: i,
            role: transform.role.clone(),
            operation: transform.operation,
            prompt,
            status: if solved.is_some() {
                FragmentStatus::Solved
            } else {
                FragmentStatus::Pending
            },
            result: solved.cloned(),
            hint: transform.hint.clone(),
            hint_visible: progress.hinted == Some(i),
            letter_count: transform.letter_count(),
            answer_positions: plan.positions().get(i).map(<[usize]>::to_vec).unwrap_or_default(),
        });
    }

    Ok(AssemblyView {
        phase: progress.phase,
        fragments,
        partial: plan.partial(progress),
        assembled: plan.positions().assembled(&progress.solved),
        breakdown: (progress.phase == AssemblyPhase::Complete)
            .then(|| breakdown_text(clue, &plan, templates)),
    })
}

fn breakdown_text(clue: &ClueDefinition, plan: &AssemblyPlan<'_>, templates: &TemplateRegistry) -> String {
    if plan.transforms().is_empty() {
        return format!("'{}'{}{}", clue.text(), templates.notation.arrow, plan.answer());
    }
    notation::breakdown(clue, plan, &templates.notation)
}

fn fragment_highlights(transforms: &[TransformSpec], progress: &AssemblyProgress) -> Vec<Highlight> {
    transforms
        .iter()
        .enumerate()
        .filter(|(i, t)| progress.is_solved(*i) && !t.indices.is_empty())
        .map(|(_, t)| Highlight {
            role: t.role.clone(),
            indices: t.indices.clone(),
        })
        .collect()
}

// ── Context ───────────────────────────────────────────────────────

/// Values every step can use. Words gathered from earlier steps start empty.
fn base_context(clue: &ClueDefinition) -> TemplateContext {
    let answer = clue.clean_answer();
    let formatted = clue
        .parsed_enumeration()
        .map(|e| e.format(&answer))
        .unwrap_or_else(|_| answer.clone());
    let mut ctx = TemplateContext::new();
    ctx.set("clue", clue.text())
        .set("enumeration", clue.enumeration.as_str())
        .set("letter_count", letters::count(&clue.answer).to_string())
        .set("word_count", clue.words.len().to_string())
        .set("answer", formatted);
    for key in [
        "definition_words",
        "indicator_words",
        "indicator_kind",
        "outer_words",
        "inner_words",
        "source_words",
    ] {
        ctx.set(key, "");
    }
    ctx
}

fn step_context(
    acc: &TemplateContext,
    clue: &ClueDefinition,
    step: &StepSpec,
    templates: &TemplateRegistry,
) -> TemplateContext {
    let mut ctx = acc.nested();
    ctx.set("words", step.indices().map(|i| clue.words_at(i)).unwrap_or_default());
    match step {
        StepSpec::Indicator {
            indicator_kind: Some(kind),
            ..
        } => {
            ctx.set("indicator_kind", kind.as_str());
        }
        StepSpec::MultiDefinition {
            definition_part: Some(part),
            ..
        } => {
            ctx.set("definition_part", part.as_str());
        }
        StepSpec::WordplayChoice { options, expected } => {
            ctx.set("options", options.join(", "))
                .set("expected", expected.as_str());
        }
        StepSpec::Assembly { transforms, .. } => {
            let plan = AssemblyPlan::new(transforms, &clue.answer);
            ctx.set("fragment_count", transforms.len().to_string())
                .set("breakdown", breakdown_text(clue, &plan, templates));
        }
        _ => {}
    }
    ctx
}

/// Fold a completed step's words into the running context
fn accumulate(acc: &mut TemplateContext, clue: &ClueDefinition, step: &StepSpec) {
    let words = || step.indices().map(|i| clue.words_at(i)).unwrap_or_default();
    match step {
        StepSpec::Definition { .. } => {
            acc.set("definition_words", words());
        }
        StepSpec::MultiDefinition { .. } => {
            let joined = match acc.get("definition_words") {
                Some(existing) if !existing.is_empty() => format!("{} / {}", existing, words()),
                _ => words(),
            };
            acc.set("definition_words", joined);
        }
        StepSpec::Indicator { indicator_kind, .. } => {
            acc.set("indicator_words", words());
            if let Some(kind) = indicator_kind {
                acc.set("indicator_kind", kind.as_str());
            }
        }
        StepSpec::OuterFragment { .. } => {
            acc.set("outer_words", words());
        }
        StepSpec::InnerFragment { .. } => {
            acc.set("inner_words", words());
        }
        StepSpec::SourceFragment { .. } => {
            acc.set("source_words", words());
        }
        StepSpec::WordplayChoice { .. } | StepSpec::AbbreviationScan { .. } | StepSpec::Assembly { .. } => {}
    }
}

fn discriminant(step: &StepSpec) -> Option<Discriminant> {
    match step {
        StepSpec::Indicator { indicator_kind, .. } => indicator_kind.map(Discriminant::Indicator),
        StepSpec::MultiDefinition { definition_part, .. } => definition_part.map(Discriminant::Part),
        _ => None,
    }
}

fn resolve_text(
    clue: &ClueDefinition,
    step: usize,
    fragment: Option<usize>,
    field: &str,
    text: &TemplateText,
    discriminant: Option<Discriminant>,
    ctx: &TemplateContext,
) -> Result<String, TutorError> {
    text.select(field, discriminant)
        .and_then(|body| resolve(body, ctx))
        .map_err(|e| TutorError::invariant(&clue.id, Some(step), fragment, format!("{}: {}", field, e)))
}
