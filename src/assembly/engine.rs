//! The fragments → check → complete sub-machine of one assembly step

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clue::TransformSpec;
use crate::letters;

use super::graph::DependencyGraph;
use super::positions::PositionMap;

/// Phase of an assembly step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyPhase {
    /// At least one fragment is unsolved
    #[default]
    Fragments,
    /// Every fragment solved; awaiting the combined answer
    Check,
    Complete,
}

/// Mutable progress through one assembly step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyProgress {
    pub phase: AssemblyPhase,
    /// Transform position -> validated result letters
    pub solved: BTreeMap<usize, String>,
    /// Fragment whose hint is currently shown
    pub hinted: Option<usize>,
}

impl AssemblyProgress {
    pub fn is_solved(&self, position: usize) -> bool {
        self.solved.contains_key(&position)
    }
}

/// Result of submitting one fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// Value did not match; progress untouched
    Rejected,
    /// Fragment was already solved with this value; nothing changed
    AlreadySolved,
    /// Fragment stored; `filled` lists predecessors filled in by the cascade
    Accepted { filled: Vec<usize> },
    /// Every fragment solved and the assembled letters equal the answer
    Completed { filled: Vec<usize> },
}

impl FragmentOutcome {
    pub fn accepted(&self) -> bool {
        !matches!(self, FragmentOutcome::Rejected)
    }
}

/// Derived, read-only view of an assembly step: its graph and position map
#[derive(Debug, Clone)]
pub struct AssemblyPlan<'a> {
    transforms: &'a [TransformSpec],
    answer: String,
    graph: DependencyGraph,
    positions: PositionMap,
}

impl<'a> AssemblyPlan<'a> {
    pub fn new(transforms: &'a [TransformSpec], answer: &str) -> Self {
        let graph = DependencyGraph::build(transforms);
        let positions = PositionMap::build(transforms, &graph, answer);
        Self {
            transforms,
            answer: letters::clean(answer),
            graph,
            positions,
        }
    }

    pub fn transforms(&self) -> &'a [TransformSpec] {
        self.transforms
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Fresh progress; an assembly with no fragments goes straight to confirmation.
    pub fn start(&self) -> AssemblyProgress {
        AssemblyProgress {
            phase: if self.transforms.is_empty() {
                AssemblyPhase::Check
            } else {
                AssemblyPhase::Fragments
            },
            ..AssemblyProgress::default()
        }
    }

    /// Whether every input of a dependent fragment already has a result
    pub fn inputs_ready(&self, progress: &AssemblyProgress, position: usize) -> bool {
        let inputs = self.graph.consumed_by(position);
        !inputs.is_empty() && inputs.iter().all(|i| progress.is_solved(*i))
    }

    /// Validate `value` for the fragment at `position` and fold it in.
    ///
    /// Returns `None` when `position` names no fragment.
    pub fn submit(
        &self,
        progress: &mut AssemblyProgress,
        position: usize,
        value: &str,
    ) -> Option<FragmentOutcome> {
        let transform = self.transforms.get(position)?;
        if progress.phase != AssemblyPhase::Fragments {
            return Some(if progress.solved.get(&position).is_some_and(|r| letters::matches(value, r)) {
                FragmentOutcome::AlreadySolved
            } else {
                FragmentOutcome::Rejected
            });
        }
        if !letters::matches(value, &transform.result) {
            tracing::debug!(fragment = position, "fragment answer rejected");
            return Some(FragmentOutcome::Rejected);
        }
        if progress.is_solved(position) {
            return Some(FragmentOutcome::AlreadySolved);
        }

        progress.solved.insert(position, transform.letters());
        let filled = if transform.is_dependent() {
            self.cascade(progress, position)
        } else {
            Vec::new()
        };
        tracing::debug!(fragment = position, ?filled, "fragment solved");

        if progress.solved.len() == self.transforms.len() {
            if self.positions.assembled(&progress.solved).as_deref() == Some(self.answer.as_str()) {
                progress.phase = AssemblyPhase::Complete;
                tracing::debug!("assembled letters match the answer; skipping check");
                return Some(FragmentOutcome::Completed { filled });
            }
            progress.phase = AssemblyPhase::Check;
        }
        Some(FragmentOutcome::Accepted { filled })
    }

    /// Fill every transitive input of `position` with its declared result
    fn cascade(&self, progress: &mut AssemblyProgress, position: usize) -> Vec<usize> {
        let mut filled = Vec::new();
        for ancestor in self.graph.ancestors(position) {
            if !progress.is_solved(ancestor) {
                progress.solved.insert(ancestor, self.transforms[ancestor].letters());
                if progress.hinted == Some(ancestor) {
                    progress.hinted = None;
                }
                filled.push(ancestor);
            }
        }
        filled
    }

    /// Check-phase confirmation of the combined answer
    pub fn confirm(&self, progress: &mut AssemblyProgress, value: &str) -> bool {
        if progress.phase != AssemblyPhase::Check || !letters::matches(value, &self.answer) {
            return false;
        }
        progress.phase = AssemblyPhase::Complete;
        true
    }

    /// Solve everything at once (the reveal path)
    pub fn solve_all(&self, progress: &mut AssemblyProgress) {
        for (i, transform) in self.transforms.iter().enumerate() {
            progress.solved.insert(i, transform.letters());
        }
        progress.phase = AssemblyPhase::Complete;
        progress.hinted = None;
    }

    /// Partially assembled letters, `_` where unknown
    pub fn partial(&self, progress: &AssemblyProgress) -> String {
        self.positions.render_partial(&progress.solved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clue::OperationKind;
    use pretty_assertions::assert_eq;

    fn t(role: &str, operation: OperationKind, result: &str) -> TransformSpec {
        TransformSpec {
            role: role.to_string(),
            operation,
            indices: vec![0],
            result: result.to_string(),
            hint: String::new(),
        }
    }

    #[test]
    fn test_charade_auto_completes() {
        let transforms = vec![
            t("first", OperationKind::Synonym, "V"),
            t("second", OperationKind::Synonym, "ISIT"),
        ];
        let plan = AssemblyPlan::new(&transforms, "VISIT");
        let mut progress = plan.start();
        assert_eq!(plan.submit(&mut progress, 1, "is it"), Some(FragmentOutcome::Accepted { filled: vec![] }));
        assert_eq!(plan.partial(&progress), "_ISIT");
        assert_eq!(plan.submit(&mut progress, 0, "v"), Some(FragmentOutcome::Completed { filled: vec![] }));
        assert_eq!(progress.phase, AssemblyPhase::Complete);
    }

    #[test]
    fn test_chain_cascade_fills_predecessors() {
        let transforms = vec![
            t("source", OperationKind::Synonym, "KEEN"),
            t("shortened", OperationKind::Deletion, "KEE"),
            t("reversed", OperationKind::Reversal, "EEK"),
        ];
        let plan = AssemblyPlan::new(&transforms, "EEK");
        let mut progress = plan.start();
        let outcome = plan.submit(&mut progress, 2, "EEK");
        assert_eq!(outcome, Some(FragmentOutcome::Completed { filled: vec![1, 0] }));
        assert_eq!(progress.solved.get(&0).map(String::as_str), Some("KEEN"));
        assert_eq!(progress.solved.get(&1).map(String::as_str), Some("KEE"));
    }

    #[test]
    fn test_cascade_clears_hint_of_filled_fragment() {
        let transforms = vec![
            t("source", OperationKind::Synonym, "KEEN"),
            t("shortened", OperationKind::Deletion, "KEE"),
            t("reversed", OperationKind::Reversal, "EEK"),
        ];
        let plan = AssemblyPlan::new(&transforms, "EEK");
        let mut progress = plan.start();
        progress.hinted = Some(0);
        plan.submit(&mut progress, 2, "EEK");
        assert_eq!(progress.hinted, None);
    }

    #[test]
    fn test_rejected_leaves_progress_untouched() {
        let transforms = vec![t("only", OperationKind::Synonym, "CAT")];
        let plan = AssemblyPlan::new(&transforms, "CAT");
        let mut progress = plan.start();
        let before = progress.clone();
        assert_eq!(plan.submit(&mut progress, 0, "DOG"), Some(FragmentOutcome::Rejected));
        assert_eq!(progress, before);
        assert_eq!(plan.submit(&mut progress, 5, "CAT"), None);
    }

    #[test]
    fn test_resubmit_is_idempotent() {
        let transforms = vec![
            t("first", OperationKind::Synonym, "V"),
            t("second", OperationKind::Synonym, "ISIT"),
        ];
        let plan = AssemblyPlan::new(&transforms, "VISIT");
        let mut progress = plan.start();
        plan.submit(&mut progress, 0, "V");
        let before = progress.clone();
        assert_eq!(plan.submit(&mut progress, 0, "V"), Some(FragmentOutcome::AlreadySolved));
        assert_eq!(progress, before);
    }

    #[test]
    fn test_check_phase_when_coverage_ambiguous() {
        // Roles say container but no inside offset reproduces the answer.
        let transforms = vec![
            t("outer", OperationKind::Synonym, "AB"),
            t("inner", OperationKind::Synonym, "C"),
        ];
        let plan = AssemblyPlan::new(&transforms, "CAB");
        let mut progress = plan.start();
        plan.submit(&mut progress, 0, "AB");
        assert_eq!(plan.submit(&mut progress, 1, "C"), Some(FragmentOutcome::Accepted { filled: vec![] }));
        assert_eq!(progress.phase, AssemblyPhase::Check);
        assert!(!plan.confirm(&mut progress, "ABC"));
        assert!(plan.confirm(&mut progress, "cab"));
        assert_eq!(progress.phase, AssemblyPhase::Complete);
    }

    #[test]
    fn test_empty_assembly_starts_in_check() {
        let plan = AssemblyPlan::new(&[], "ENIGMA");
        let mut progress = plan.start();
        assert_eq!(progress.phase, AssemblyPhase::Check);
        assert!(plan.confirm(&mut progress, "Enigma"));
    }
}
