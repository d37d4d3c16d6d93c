//! Annotation validator: proves an authored clue is usable before any session starts.
//!
//! Structural checks catch missing fields and out-of-range indices; semantic
//! checks re-derive every transform's result from its inputs using the same
//! dependency primitive the assembly engine uses; cross-cutting checks compare
//! the terminal letters with the answer and enumeration and make sure every
//! dependent operation has an indicator. Findings are errors (the clue cannot
//! be used) or warnings (style and conventions).

mod abbreviations;
pub mod semantic;

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::assembly::{classify, AssemblyPlan, DependencyGraph, Layout};
use crate::clue::{ClueDefinition, OperationKind, StepSpec, TransformSpec};
use crate::letters;

pub use abbreviations::{AbbreviationError, AbbreviationTable};

/// Whether a finding blocks use of the clue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Category of finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    Structure,
    Semantic,
    Length,
    Indicator,
    Convention,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::Structure => write!(f, "structure"),
            FindingCategory::Semantic => write!(f, "semantic"),
            FindingCategory::Length => write!(f, "length"),
            FindingCategory::Indicator => write!(f, "indicator"),
            FindingCategory::Convention => write!(f, "convention"),
        }
    }
}

/// One validator finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: FindingCategory,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// Everything the validator found for one clue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub clue: String,
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn new(clue: &str) -> Self {
        Self {
            clue: clue.to_string(),
            findings: Vec::new(),
        }
    }

    fn error(&mut self, category: FindingCategory, message: impl Into<String>) {
        self.findings.push(Finding {
            severity: Severity::Error,
            category,
            message: message.into(),
        });
    }

    fn warn(&mut self, category: FindingCategory, message: impl Into<String>) {
        self.findings.push(Finding {
            severity: Severity::Warning,
            category,
            message: message.into(),
        });
    }

    /// Error messages, formatted with their category
    pub fn errors(&self) -> Vec<String> {
        self.messages(Severity::Error)
    }

    /// Warning messages, formatted with their category
    pub fn warnings(&self) -> Vec<String> {
        self.messages(Severity::Warning)
    }

    fn messages(&self, severity: Severity) -> Vec<String> {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .map(ToString::to_string)
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Run every check on a clue definition.
pub fn validate(clue: &ClueDefinition, abbreviations: &AbbreviationTable) -> ValidationReport {
    let mut report = ValidationReport::new(&clue.id);
    check_clue_fields(clue, &mut report);
    for (position, step) in clue.steps.iter().enumerate() {
        check_step(clue, position, step, &mut report);
    }

    // Semantic and cross-cutting checks need sound structure to mean anything.
    if report.has_errors() {
        return report;
    }

    if let Some(position) = clue.assembly_position() {
        if let StepSpec::Assembly { transforms, .. } = &clue.steps[position] {
            let graph = DependencyGraph::build(transforms);
            for (i, transform) in transforms.iter().enumerate() {
                check_transform_semantics(clue, &graph, transforms, i, transform, abbreviations, &mut report);
            }
            if !transforms.is_empty() {
                check_terminal_letters(clue, &graph, transforms, &mut report);
                if !report.has_errors() {
                    check_position_coverage(clue, transforms, &mut report);
                }
            }
            check_indicators(clue, position, transforms, &mut report);
        }
    }
    check_definition_placement(clue, &mut report);
    report
}

// ── Structure ─────────────────────────────────────────────────────

fn check_clue_fields(clue: &ClueDefinition, report: &mut ValidationReport) {
    use FindingCategory::{Length, Structure};

    if clue.words.is_empty() {
        report.error(Structure, "clue has no words");
    }
    let answer = clue.clean_answer();
    if answer.is_empty() {
        report.error(Structure, "answer has no letters");
    }
    match clue.parsed_enumeration() {
        Ok(enumeration) => {
            let len = answer.chars().count();
            if !answer.is_empty() && enumeration.total() != len {
                report.error(
                    Length,
                    format!(
                        "answer {} has {} letters but enumeration '{}' requires {}",
                        answer,
                        len,
                        clue.enumeration,
                        enumeration.total()
                    ),
                );
            }
        }
        Err(e) => report.error(Structure, e.to_string()),
    }

    if clue.steps.is_empty() {
        report.error(Structure, "clue has no steps");
        return;
    }
    let assemblies: Vec<usize> = clue
        .steps
        .iter()
        .enumerate()
        .filter(|(_, s)| matches!(s, StepSpec::Assembly { .. }))
        .map(|(i, _)| i)
        .collect();
    match assemblies.as_slice() {
        [] => report.error(Structure, "clue has no assembly step"),
        [only] => {
            if *only != clue.steps.len() - 1 {
                report.warn(
                    FindingCategory::Convention,
                    format!("assembly is step {} but not the last step", only),
                );
            }
        }
        many => report.error(
            Structure,
            format!("clue has {} assembly steps; expected one", many.len()),
        ),
    }
}

fn check_indices(clue: &ClueDefinition, what: &str, indices: &[usize], report: &mut ValidationReport) {
    for &i in indices {
        if i >= clue.words.len() {
            report.error(
                FindingCategory::Structure,
                format!(
                    "{} references word {} but the clue has {} words",
                    what,
                    i,
                    clue.words.len()
                ),
            );
        }
    }
}

fn check_step(clue: &ClueDefinition, position: usize, step: &StepSpec, report: &mut ValidationReport) {
    use FindingCategory::Structure;
    let what = format!("step {} ({})", position, step.kind());

    if let Some(indices) = step.indices() {
        if indices.is_empty() {
            report.error(Structure, format!("{} selects no words", what));
        }
        check_indices(clue, &what, indices, report);
    }

    match step {
        StepSpec::Indicator { indicator_kind: None, .. } => {
            report.error(Structure, format!("{} is missing indicator_kind", what));
        }
        StepSpec::MultiDefinition { definition_part: None, .. } => {
            report.error(Structure, format!("{} is missing definition_part", what));
        }
        StepSpec::WordplayChoice { options, expected } => {
            if options.is_empty() {
                report.error(Structure, format!("{} has no options", what));
            } else if !options.iter().any(|o| o.eq_ignore_ascii_case(expected)) {
                report.error(
                    Structure,
                    format!("{} expects '{}' which is not one of its options", what, expected),
                );
            }
        }
        StepSpec::Assembly { transforms, result } => {
            if !letters::matches(result, &clue.answer) {
                report.error(
                    Structure,
                    format!("{} result '{}' does not match the answer", what, result),
                );
            }
            if transforms.is_empty() && !clue.no_wordplay {
                report.error(Structure, format!("{} has no transforms", what));
            }
            for (i, transform) in transforms.iter().enumerate() {
                check_transform_fields(clue, position, i, transform, report);
            }
        }
        _ => {}
    }
}

fn check_transform_fields(
    clue: &ClueDefinition,
    step: usize,
    i: usize,
    transform: &TransformSpec,
    report: &mut ValidationReport,
) {
    use FindingCategory::Structure;
    let what = format!("step {} transform {} ({})", step, i, transform.operation);

    if transform.role.trim().is_empty() {
        report.error(Structure, format!("{} has no role", what));
    }
    if transform.letters().is_empty() {
        report.error(Structure, format!("{} has no result letters", what));
    }
    if transform.hint.trim().is_empty() {
        report.warn(FindingCategory::Convention, format!("{} has no hint", what));
    }
    check_indices(clue, &what, &transform.indices, report);

    if transform.is_dependent() {
        if i == 0 {
            report.error(
                Structure,
                format!("{} is dependent but has no earlier fragment to act on", what),
            );
        }
    } else if transform.indices.is_empty() {
        report.error(Structure, format!("{} has no source words", what));
    }
}

// ── Semantics ─────────────────────────────────────────────────────

fn check_transform_semantics(
    clue: &ClueDefinition,
    graph: &DependencyGraph,
    transforms: &[TransformSpec],
    i: usize,
    transform: &TransformSpec,
    abbreviations: &AbbreviationTable,
    report: &mut ValidationReport,
) {
    use FindingCategory::Semantic;
    let result = transform.letters();
    let what = format!("transform {} ({})", i, transform.operation);
    let source_text = clue.words_at(&transform.indices);
    let inputs: Vec<String> = graph
        .consumed_by(i)
        .iter()
        .map(|&p| transforms[p].letters())
        .collect();
    let joined = inputs.concat();

    let ok = match transform.operation {
        OperationKind::Synonym | OperationKind::Homophone => true,
        OperationKind::Literal => letters::clean(&source_text) == result,
        OperationKind::Reversal => semantic::reversal(&joined, &result),
        OperationKind::Deletion => semantic::deletion(&joined, &result),
        OperationKind::Anagram => semantic::anagram(&joined, &result),
        OperationKind::Container => semantic::container(&inputs, &result),
        OperationKind::Substitution => semantic::substitution(&joined, &result),
        OperationKind::LetterSelection => {
            let words: Vec<String> = transform
                .indices
                .iter()
                .filter_map(|&w| clue.words.get(w))
                .map(|w| letters::clean(w))
                .collect();
            semantic::letter_selection(&words, &result).is_some()
        }
        OperationKind::Abbreviation => {
            let known = abbreviations.accepts(&source_text, &result)
                || transform
                    .indices
                    .iter()
                    .filter_map(|&w| clue.words.get(w))
                    .any(|w| abbreviations.accepts(w, &result));
            if !known {
                report.warn(
                    FindingCategory::Convention,
                    format!(
                        "{}: '{}' → {} is not in the abbreviation table",
                        what, source_text, result
                    ),
                );
            }
            true
        }
    };

    if !ok {
        let from = if transform.is_dependent() {
            format!("inputs {}", inputs.join("+"))
        } else {
            format!("words '{}'", source_text)
        };
        report.error(
            Semantic,
            format!("{}: {} cannot be derived from {}", what, result, from),
        );
    }
}

// ── Cross-cutting ─────────────────────────────────────────────────

fn check_terminal_letters(
    clue: &ClueDefinition,
    graph: &DependencyGraph,
    transforms: &[TransformSpec],
    report: &mut ValidationReport,
) {
    let terminal_letters: String = graph
        .terminals()
        .iter()
        .map(|&t| transforms[t].letters())
        .collect();
    let supplied = terminal_letters.chars().count();

    if let Ok(enumeration) = clue.parsed_enumeration() {
        if supplied != enumeration.total() {
            report.error(
                FindingCategory::Length,
                format!(
                    "length mismatch: terminal fragments supply {} letters but enumeration '{}' requires {}",
                    supplied,
                    clue.enumeration,
                    enumeration.total()
                ),
            );
        }
    }
    if letters::sorted(&terminal_letters) != letters::sorted(&clue.answer) {
        report.error(
            FindingCategory::Length,
            format!(
                "terminal fragments spell {} which is not an arrangement of {}",
                terminal_letters,
                clue.clean_answer()
            ),
        );
    }
}

fn check_position_coverage(clue: &ClueDefinition, transforms: &[TransformSpec], report: &mut ValidationReport) {
    let plan = AssemblyPlan::new(transforms, &clue.answer);
    let mut progress = plan.start();
    plan.solve_all(&mut progress);
    if plan.positions().assembled(&progress.solved).as_deref() != Some(plan.answer()) {
        report.warn(
            FindingCategory::Convention,
            "fragments do not map onto the answer positions; learners will confirm the answer manually",
        );
    }
}

fn check_indicators(
    clue: &ClueDefinition,
    assembly: usize,
    transforms: &[TransformSpec],
    report: &mut ValidationReport,
) {
    let indicators: Vec<_> = clue.steps[..assembly]
        .iter()
        .filter_map(|s| match s {
            StepSpec::Indicator { indicator_kind, .. } => *indicator_kind,
            _ => None,
        })
        .collect();

    let needed: BTreeSet<OperationKind> = transforms
        .iter()
        .map(|t| t.operation)
        .filter(OperationKind::is_dependent)
        .collect();
    for op in needed {
        if !indicators.iter().any(|k| k.licenses(op)) {
            report.error(
                FindingCategory::Indicator,
                format!("{} transform has no earlier compatible indicator step", op),
            );
        }
    }

    // A role-based container layout uses a container or insertion indicator
    // without any container transform.
    let container_layout = classify(transforms, &DependencyGraph::build(transforms)) == Layout::Container;
    for kind in &indicators {
        let layout_uses = container_layout && kind.licenses(OperationKind::Container);
        if !layout_uses && !transforms.iter().any(|t| kind.licenses(t.operation)) {
            report.warn(
                FindingCategory::Convention,
                format!("{} indicator is not used by any transform", kind),
            );
        }
    }
}

fn check_definition_placement(clue: &ClueDefinition, report: &mut ValidationReport) {
    let last = clue.words.len().saturating_sub(1);
    for step in &clue.steps {
        if let StepSpec::Definition { indices } = step {
            if !indices.is_empty() && !indices.contains(&0) && !indices.contains(&last) {
                report.warn(
                    FindingCategory::Convention,
                    format!(
                        "definition '{}' is not at either end of the clue",
                        clue.words_at(indices)
                    ),
                );
            }
        }
    }
}
