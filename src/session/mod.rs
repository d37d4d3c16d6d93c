//! Step sequencer: the top-level state machine over a clue's steps
//!
//! A [`Session`] is plain data that the caller owns and carries between
//! calls. [`Tutor`] holds the passed-in catalogs and applies one learner
//! action at a time. Every operation works on a copy of the session and only
//! writes it back once the new snapshot has rendered, so a failed call leaves
//! the session exactly as it was.

mod snapshot;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::assembly::{AssemblyPhase, AssemblyPlan, AssemblyProgress, FragmentOutcome};
use crate::clue::{ClueDefinition, StepSpec};
use crate::config::TutorConfig;
use crate::error::TutorError;
use crate::letters;
use crate::validate::{self, ValidationReport};

pub use snapshot::{
    render, ActiveStep, AssemblyView, FragmentStatus, FragmentView, Highlight, Snapshot, StepStatus,
    StepSummary,
};

/// Transient, non-validated UI state; reset whenever a step is completed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub selected: BTreeSet<usize>,
    pub typed: String,
    pub hint_visible: bool,
    pub expanded: bool,
}

/// One attempt at one clue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub clue: ClueDefinition,
    /// Index of the active step; equals the step count once every step is done
    pub position: usize,
    pub completed: BTreeSet<usize>,
    pub ui: UiState,
    pub assembly: AssemblyProgress,
    /// Cleaned answer letters once locked
    pub final_answer: Option<String>,
}

impl Session {
    fn new(clue: ClueDefinition) -> Self {
        Self {
            clue,
            position: 0,
            completed: BTreeSet::new(),
            ui: UiState::default(),
            assembly: AssemblyProgress::default(),
            final_answer: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.position >= self.clue.steps.len()
    }

    pub fn current_step(&self) -> Option<&StepSpec> {
        self.clue.steps.get(self.position)
    }

    fn assembly_plan(&self) -> Option<AssemblyPlan<'_>> {
        match self.current_step()? {
            StepSpec::Assembly { transforms, .. } => Some(AssemblyPlan::new(transforms, &self.clue.answer)),
            _ => None,
        }
    }

    /// Mark the active step complete and move to the next one
    fn advance(&mut self) {
        self.completed.insert(self.position);
        self.position += 1;
        self.ui = UiState::default();
        tracing::debug!(clue = %self.clue.id, position = self.position, "step advanced");
        self.enter_step();
    }

    /// Set up sub-state for the step just reached.
    ///
    /// A clue without wordplay completes its assembly step on arrival; the
    /// learner then confirms the answer with a final-answer check.
    fn enter_step(&mut self) {
        let progress = {
            let Some(plan) = self.assembly_plan() else {
                return;
            };
            let mut progress = plan.start();
            if self.clue.no_wordplay {
                plan.solve_all(&mut progress);
            }
            progress
        };
        self.assembly = progress;
        if self.clue.no_wordplay {
            tracing::debug!(clue = %self.clue.id, position = self.position, "no wordplay; assembly auto-completed");
            self.advance();
        }
    }

    fn lock_answer(&mut self) {
        let answer = self.clue.clean_answer();
        tracing::info!(clue = %self.clue.id, answer = %answer, "answer locked");
        self.final_answer = Some(answer);
    }
}

/// A learner's answer to the active step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Submission {
    /// Word indices for selection steps
    Indices(Vec<usize>),
    /// Option text for multiple-choice steps
    Choice(String),
    /// Typed letters
    Text(String),
}

/// Non-validating state changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum UiAction {
    ToggleHint,
    ToggleFragmentHint(usize),
    ToggleWord(usize),
    SetTypedAnswer(String),
    ToggleExpanded,
}

/// Result of a validating operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub accepted: bool,
    pub snapshot: Snapshot,
}

/// The tutoring engine
#[derive(Debug, Clone, Default)]
pub struct Tutor {
    config: TutorConfig,
}

impl Tutor {
    pub fn new(config: TutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Run the annotation validator with this tutor's abbreviation table
    pub fn validate(&self, clue: &ClueDefinition) -> ValidationReport {
        validate::validate(clue, &self.config.abbreviations)
    }

    /// Validate `clue` and open a fresh session at its first step.
    pub fn start(&self, clue: ClueDefinition) -> Result<(Session, Snapshot), TutorError> {
        let report = self.validate(&clue);
        for warning in report.warnings() {
            tracing::warn!(clue = %clue.id, "{}", warning);
        }
        let blocked = report.has_errors() || (self.config.strict_warnings && !report.is_clean());
        if blocked {
            return Err(TutorError::Data {
                clue: clue.id.clone(),
                report,
            });
        }

        let mut session = Session::new(clue);
        session.enter_step();
        let snapshot = self.snapshot(&session)?;
        tracing::info!(clue = %session.clue.id, steps = session.clue.steps.len(), "session started");
        Ok((session, snapshot))
    }

    /// Render the session without changing it
    pub fn snapshot(&self, session: &Session) -> Result<Snapshot, TutorError> {
        render(&self.config.templates, session)
    }

    /// Check `submission` against the active step and advance on success.
    ///
    /// For an assembly step, typed text is the combined answer and is only
    /// accepted in the check phase; fragments go through
    /// [`submit_fragment`](Self::submit_fragment).
    pub fn submit(&self, session: &mut Session, submission: Submission) -> Result<Outcome, TutorError> {
        self.commit(session, |next| {
            if next.assembly_plan().is_some() {
                return match &submission {
                    Submission::Text(value) => confirm_assembly(next, value),
                    _ => false,
                };
            }
            let Some(step) = next.current_step() else {
                return false;
            };
            let accepted = match (step, &submission) {
                (StepSpec::WordplayChoice { expected, .. }, Submission::Choice(value) | Submission::Text(value)) => {
                    value.trim().eq_ignore_ascii_case(expected.trim())
                }
                (step, Submission::Indices(chosen)) => step.indices().is_some_and(|expected| {
                    let expected: BTreeSet<usize> = expected.iter().copied().collect();
                    let chosen: BTreeSet<usize> = chosen.iter().copied().collect();
                    expected == chosen
                }),
                _ => false,
            };
            if accepted {
                next.advance();
            } else {
                tracing::debug!(clue = %next.clue.id, position = next.position, "submission rejected");
            }
            accepted
        })
    }

    /// Check one assembly fragment
    pub fn submit_fragment(&self, session: &mut Session, position: usize, value: &str) -> Result<Outcome, TutorError> {
        self.commit(session, |next| {
            apply_fragment(next, position, value).is_some_and(|o| o.accepted())
        })
    }

    /// Fold in several fragment entries at once.
    ///
    /// Entries shorter than their fragment's result are still being typed and
    /// are skipped. Accepted when at least one entry was.
    pub fn submit_fragments(
        &self,
        session: &mut Session,
        entries: &BTreeMap<usize, String>,
    ) -> Result<Outcome, TutorError> {
        self.commit(session, |next| {
            let mut any = false;
            for (&position, value) in entries {
                let complete_entry = match next.assembly_plan() {
                    Some(plan) => plan
                        .transforms()
                        .get(position)
                        .is_some_and(|t| letters::count(value) >= t.letter_count()),
                    None => false,
                };
                if !complete_entry {
                    continue;
                }
                any |= apply_fragment(next, position, value).is_some_and(|o| o.accepted());
            }
            any
        })
    }

    /// Compare a full answer with the clue's answer and lock it on success.
    ///
    /// In an assembly's check phase this also completes the assembly step.
    pub fn check_final_answer(&self, session: &mut Session, text: &str) -> Result<Outcome, TutorError> {
        self.commit(session, |next| {
            if next.assembly_plan().is_some() && next.assembly.phase == AssemblyPhase::Check {
                return confirm_assembly(next, text);
            }
            if !letters::matches(text, &next.clue.answer) {
                return false;
            }
            if next.final_answer.is_none() {
                next.lock_answer();
            }
            true
        })
    }

    /// Apply a UI action; never validated, never advances
    pub fn update_ui(&self, session: &mut Session, action: UiAction) -> Result<Snapshot, TutorError> {
        let mut next = session.clone();
        match action {
            UiAction::ToggleHint => next.ui.hint_visible = !next.ui.hint_visible,
            UiAction::ToggleExpanded => next.ui.expanded = !next.ui.expanded,
            UiAction::SetTypedAnswer(text) => next.ui.typed = text,
            UiAction::ToggleWord(index) => {
                if index < next.clue.words.len() && !next.ui.selected.remove(&index) {
                    next.ui.selected.insert(index);
                }
            }
            UiAction::ToggleFragmentHint(fragment) => {
                let known = next
                    .assembly_plan()
                    .is_some_and(|plan| fragment < plan.transforms().len());
                if known {
                    next.assembly.hinted = match next.assembly.hinted {
                        Some(current) if current == fragment => None,
                        _ => Some(fragment),
                    };
                }
            }
        }
        let snapshot = self.snapshot(&next)?;
        *session = next;
        Ok(snapshot)
    }

    /// Give up: complete every remaining step and lock the answer
    pub fn reveal(&self, session: &mut Session) -> Result<Snapshot, TutorError> {
        let mut next = session.clone();
        while !next.is_complete() {
            let solved = next.assembly_plan().map(|plan| {
                let mut progress = next.assembly.clone();
                plan.solve_all(&mut progress);
                progress
            });
            if let Some(progress) = solved {
                next.assembly = progress;
            }
            next.completed.insert(next.position);
            next.position += 1;
        }
        next.ui = UiState::default();
        if next.final_answer.is_none() {
            next.lock_answer();
        }
        let snapshot = self.snapshot(&next)?;
        tracing::info!(clue = %next.clue.id, "answer revealed");
        *session = next;
        Ok(snapshot)
    }

    /// Clone, mutate, render, then commit
    fn commit(&self, session: &mut Session, apply: impl FnOnce(&mut Session) -> bool) -> Result<Outcome, TutorError> {
        let mut next = session.clone();
        let accepted = apply(&mut next);
        if !accepted {
            return Ok(Outcome {
                accepted,
                snapshot: self.snapshot(session)?,
            });
        }
        let snapshot = self.snapshot(&next)?;
        *session = next;
        Ok(Outcome { accepted, snapshot })
    }
}

/// Submit one fragment of the active assembly step and finish the step if it completed
fn apply_fragment(session: &mut Session, position: usize, value: &str) -> Option<FragmentOutcome> {
    let (mut progress, outcome) = {
        let plan = session.assembly_plan()?;
        let mut progress = session.assembly.clone();
        let outcome = plan.submit(&mut progress, position, value)?;
        (progress, outcome)
    };
    if let FragmentOutcome::Accepted { .. } | FragmentOutcome::Completed { .. } = outcome {
        if progress.hinted == Some(position) {
            progress.hinted = None;
        }
    }
    session.assembly = progress;
    if let FragmentOutcome::Completed { .. } = outcome {
        finish_assembly(session);
    }
    Some(outcome)
}

/// Check-phase confirmation of the combined answer
fn confirm_assembly(session: &mut Session, value: &str) -> bool {
    let confirmed = session.assembly_plan().and_then(|plan| {
        let mut progress = session.assembly.clone();
        plan.confirm(&mut progress, value).then_some(progress)
    });
    let Some(progress) = confirmed else {
        return false;
    };
    session.assembly = progress;
    finish_assembly(session);
    true
}

fn finish_assembly(session: &mut Session) {
    if session.final_answer.is_none() {
        session.lock_answer();
    }
    session.advance();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clue::{IndicatorKind, OperationKind, TransformSpec};

    fn transform(role: &str, operation: OperationKind, indices: &[usize], result: &str) -> TransformSpec {
        TransformSpec {
            role: role.to_string(),
            operation,
            indices: indices.to_vec(),
            result: result.to_string(),
            hint: format!("{} hint", role),
        }
    }

    fn visit() -> ClueDefinition {
        ClueDefinition {
            id: "visit".to_string(),
            words: ["Come", "by", "five", "do", "you", "mean"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            answer: "VISIT".to_string(),
            enumeration: "5".to_string(),
            category: "charade".to_string(),
            no_wordplay: false,
            steps: vec![
                StepSpec::Definition { indices: vec![0, 1] },
                StepSpec::WordplayChoice {
                    options: vec!["Charade".to_string(), "Anagram".to_string()],
                    expected: "Charade".to_string(),
                },
                StepSpec::Assembly {
                    transforms: vec![
                        transform("first part", OperationKind::Abbreviation, &[2], "V"),
                        transform("second part", OperationKind::Synonym, &[3, 4, 5], "ISIT"),
                    ],
                    result: "VISIT".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_start_renders_first_step() {
        let tutor = Tutor::default();
        let (session, snapshot) = tutor.start(visit()).unwrap();
        assert_eq!(session.position, 0);
        let active = snapshot.active.unwrap();
        assert_eq!(active.position, 0);
        assert!(active.prompt.contains("Come by five do you mean"));
        assert_eq!(snapshot.steps[1].status, StepStatus::Pending);
        assert!(!snapshot.answer_locked);
    }

    #[test]
    fn test_selection_is_set_equality() {
        let tutor = Tutor::default();
        let (mut session, _) = tutor.start(visit()).unwrap();
        let outcome = tutor.submit(&mut session, Submission::Indices(vec![0])).unwrap();
        assert!(!outcome.accepted);
        assert_eq!(session.position, 0);
        let outcome = tutor.submit(&mut session, Submission::Indices(vec![1, 0])).unwrap();
        assert!(outcome.accepted);
        assert_eq!(session.position, 1);
        assert_eq!(outcome.snapshot.steps[0].completion.as_deref(), Some("Definition: \"Come by\""));
    }

    #[test]
    fn test_choice_is_case_insensitive() {
        let tutor = Tutor::default();
        let (mut session, _) = tutor.start(visit()).unwrap();
        tutor.submit(&mut session, Submission::Indices(vec![0, 1])).unwrap();
        let outcome = tutor.submit(&mut session, Submission::Choice("charade".to_string())).unwrap();
        assert!(outcome.accepted);
        let assembly = outcome.snapshot.active.unwrap().assembly.unwrap();
        assert_eq!(assembly.fragments.len(), 2);
        assert_eq!(assembly.partial, "_____");
    }

    #[test]
    fn test_fragments_complete_assembly_and_lock_answer() {
        let tutor = Tutor::default();
        let (mut session, _) = tutor.start(visit()).unwrap();
        tutor.submit(&mut session, Submission::Indices(vec![0, 1])).unwrap();
        tutor.submit(&mut session, Submission::Choice("Charade".to_string())).unwrap();

        let outcome = tutor.submit_fragment(&mut session, 1, "is it").unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.snapshot.active.unwrap().assembly.unwrap().partial, "_ISIT");

        let outcome = tutor.submit_fragment(&mut session, 0, "v").unwrap();
        assert!(outcome.accepted);
        assert!(outcome.snapshot.complete);
        assert!(outcome.snapshot.answer_locked);
        assert_eq!(outcome.snapshot.answer.as_deref(), Some("VISIT"));
        assert_eq!(
            outcome.snapshot.steps[2].completion.as_deref(),
            Some("VISIT: 'five' → V + 'do you mean' → ISIT")
        );
    }

    #[test]
    fn test_rejected_submission_leaves_session_unchanged() {
        let tutor = Tutor::default();
        let (mut session, _) = tutor.start(visit()).unwrap();
        tutor.update_ui(&mut session, UiAction::ToggleWord(3)).unwrap();
        let before = session.clone();
        let outcome = tutor.submit(&mut session, Submission::Text("VISIT".to_string())).unwrap();
        assert!(!outcome.accepted);
        assert_eq!(session, before);
        assert_eq!(outcome.snapshot.active.unwrap().selected, vec![3]);
    }

    #[test]
    fn test_ui_resets_after_advance() {
        let tutor = Tutor::default();
        let (mut session, _) = tutor.start(visit()).unwrap();
        tutor.update_ui(&mut session, UiAction::ToggleHint).unwrap();
        tutor.update_ui(&mut session, UiAction::ToggleWord(0)).unwrap();
        assert!(session.ui.hint_visible);
        tutor.submit(&mut session, Submission::Indices(vec![0, 1])).unwrap();
        assert_eq!(session.ui, UiState::default());
    }

    #[test]
    fn test_reveal_completes_everything() {
        let tutor = Tutor::default();
        let (mut session, _) = tutor.start(visit()).unwrap();
        let snapshot = tutor.reveal(&mut session).unwrap();
        assert!(snapshot.complete);
        assert!(snapshot.answer_locked);
        assert!(snapshot.active.is_none());
        assert!(snapshot.steps.iter().all(|s| s.status == StepStatus::Completed));
        assert_eq!(session.assembly.phase, AssemblyPhase::Complete);
    }

    #[test]
    fn test_invalid_clue_cannot_start() {
        let mut clue = visit();
        clue.steps.insert(
            1,
            StepSpec::Indicator {
                indices: vec![3],
                indicator_kind: None,
            },
        );
        let err = Tutor::default().start(clue).unwrap_err();
        assert!(err.is_data_error());
    }

    #[test]
    fn test_strict_warnings_block_start() {
        let mut clue = visit();
        clue.steps.insert(
            1,
            StepSpec::Indicator {
                indices: vec![3],
                indicator_kind: Some(IndicatorKind::Anagram),
            },
        );
        assert!(Tutor::default().start(clue.clone()).is_ok());
        let strict = Tutor::new(TutorConfig::new().with_strict_warnings(true));
        assert!(strict.start(clue).unwrap_err().is_data_error());
    }

    #[test]
    fn test_fragment_hint_toggle() {
        let tutor = Tutor::default();
        let (mut session, _) = tutor.start(visit()).unwrap();
        // Not on the assembly step yet: ignored.
        tutor.update_ui(&mut session, UiAction::ToggleFragmentHint(0)).unwrap();
        assert_eq!(session.assembly.hinted, None);

        tutor.submit(&mut session, Submission::Indices(vec![0, 1])).unwrap();
        tutor.submit(&mut session, Submission::Choice("Charade".to_string())).unwrap();
        let snapshot = tutor.update_ui(&mut session, UiAction::ToggleFragmentHint(1)).unwrap();
        let fragments = snapshot.active.unwrap().assembly.unwrap().fragments;
        assert!(fragments[1].hint_visible);
        assert!(!fragments[0].hint_visible);
        tutor.update_ui(&mut session, UiAction::ToggleFragmentHint(1)).unwrap();
        assert_eq!(session.assembly.hinted, None);
    }
}
