//! Dependency graph between the transforms of one assembly step
//!
//! Which earlier fragments a dependent transform consumes is not authored
//! explicitly; it is reconstructed from letter counts. Walking backward from
//! the transform, earlier results are accumulated until their letter total
//! reaches the transform's own length (plus one for a deletion, which removes
//! exactly one letter). The visited positions, in ascending order, are the
//! consumed set.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::clue::{OperationKind, TransformSpec};

/// Consumed-predecessor lists for every dependent transform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    consumed: BTreeMap<usize, Vec<usize>>,
    terminals: Vec<usize>,
}

impl DependencyGraph {
    pub fn build(transforms: &[TransformSpec]) -> Self {
        let mut consumed = BTreeMap::new();
        for (i, transform) in transforms.iter().enumerate() {
            if i == 0 || !transform.is_dependent() {
                continue;
            }
            consumed.insert(i, consumed_predecessors(transforms, i));
        }

        let used: BTreeSet<usize> = consumed.values().flatten().copied().collect();
        let terminals = (0..transforms.len())
            .filter(|i| !used.contains(i))
            .collect();

        Self {
            consumed,
            terminals,
        }
    }

    /// Positions consumed by the transform at `position` (empty for independent ones)
    pub fn consumed_by(&self, position: usize) -> &[usize] {
        self.consumed
            .get(&position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Positions whose letters land directly in the answer, ascending
    pub fn terminals(&self) -> &[usize] {
        &self.terminals
    }

    pub fn is_terminal(&self, position: usize) -> bool {
        self.terminals.binary_search(&position).is_ok()
    }

    /// The dependent transform that consumes `position`, if any
    pub fn consumer_of(&self, position: usize) -> Option<usize> {
        self.consumed
            .iter()
            .find(|(_, inputs)| inputs.contains(&position))
            .map(|(&consumer, _)| consumer)
    }

    /// Every position transitively feeding `position`, each visited once.
    ///
    /// Returned in discovery order: direct inputs first, then their inputs.
    pub fn ancestors(&self, position: usize) -> Vec<usize> {
        let mut queue: VecDeque<usize> = self.consumed_by(position).iter().copied().collect();
        let mut visited = BTreeSet::new();
        let mut order = Vec::new();
        while let Some(next) = queue.pop_front() {
            if !visited.insert(next) {
                continue;
            }
            order.push(next);
            queue.extend(self.consumed_by(next).iter().copied());
        }
        order
    }

    /// Iterate over (dependent position, consumed positions)
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.consumed.iter().map(|(&k, v)| (k, v.as_slice()))
    }
}

/// Backward-accumulate-until-threshold search for the inputs of `position`.
pub fn consumed_predecessors(transforms: &[TransformSpec], position: usize) -> Vec<usize> {
    let Some(transform) = transforms.get(position) else {
        return Vec::new();
    };
    let mut target = transform.letter_count();
    if transform.operation == OperationKind::Deletion {
        target += 1;
    }

    let mut visited = Vec::new();
    let mut total = 0;
    for j in (0..position).rev() {
        visited.push(j);
        total += transforms[j].letter_count();
        if total >= target {
            break;
        }
    }
    visited.reverse();
    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(operation: OperationKind, result: &str) -> TransformSpec {
        TransformSpec {
            role: String::new(),
            operation,
            indices: vec![],
            result: result.to_string(),
            hint: String::new(),
        }
    }

    #[test]
    fn test_independent_only_all_terminal() {
        let transforms = vec![t(OperationKind::Synonym, "V"), t(OperationKind::Synonym, "ISIT")];
        let graph = DependencyGraph::build(&transforms);
        assert_eq!(graph.terminals(), &[0, 1]);
        assert!(graph.consumed_by(1).is_empty());
    }

    #[test]
    fn test_chained_dependents() {
        let transforms = vec![
            t(OperationKind::Synonym, "KEEN"),
            t(OperationKind::Deletion, "KEE"),
            t(OperationKind::Reversal, "EEK"),
        ];
        let graph = DependencyGraph::build(&transforms);
        assert_eq!(graph.consumed_by(1), &[0]);
        assert_eq!(graph.consumed_by(2), &[1]);
        assert_eq!(graph.terminals(), &[2]);
        assert_eq!(graph.ancestors(2), vec![1, 0]);
        assert_eq!(graph.consumer_of(0), Some(1));
    }

    #[test]
    fn test_container_consumes_until_threshold() {
        let transforms = vec![
            t(OperationKind::Synonym, "DIPS"),
            t(OperationKind::Abbreviation, "R"),
            t(OperationKind::Container, "DRIPS"),
        ];
        assert_eq!(consumed_predecessors(&transforms, 2), vec![0, 1]);
    }

    #[test]
    fn test_backward_walk_stops_at_first_threshold() {
        // Two adjacent three-letter inputs: a three-letter anagram takes only the nearer.
        let transforms = vec![
            t(OperationKind::Literal, "TEA"),
            t(OperationKind::Literal, "CAT"),
            t(OperationKind::Anagram, "ACT"),
        ];
        let graph = DependencyGraph::build(&transforms);
        assert_eq!(graph.consumed_by(2), &[1]);
        assert_eq!(graph.terminals(), &[0, 2]);
    }

    #[test]
    fn test_short_predecessors_consumes_everything_available() {
        let transforms = vec![t(OperationKind::Literal, "AB"), t(OperationKind::Anagram, "BACK")];
        assert_eq!(consumed_predecessors(&transforms, 1), vec![0]);
    }
}
