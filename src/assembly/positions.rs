//! Where each terminal fragment's letters land in the final answer

use std::collections::BTreeMap;

use serde::Serialize;

use crate::clue::{OperationKind, TransformSpec};
use crate::letters;

use super::graph::DependencyGraph;

/// How terminal fragments combine into the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Fragments concatenated end to end
    Charade,
    /// Inner fragments inserted inside one outer fragment
    Container,
}

/// Classify by the roles of terminal fragments: one "outer" plus at least one
/// "inner" is a container. Consumed fragments never take part.
pub fn classify(transforms: &[TransformSpec], graph: &DependencyGraph) -> Layout {
    let terminals = || graph.terminals().iter().map(|&t| &transforms[t]);
    let outer = terminals().filter(|t| t.has_role("outer")).count();
    let inner = terminals().filter(|t| t.has_role("inner")).count();
    if outer == 1 && inner >= 1 {
        Layout::Container
    } else {
        Layout::Charade
    }
}

/// A resolved insertion: `inners` go inside `outer` after `offset` outer letters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSplit {
    pub outer: usize,
    pub inners: Vec<usize>,
    pub offset: usize,
    /// Answer position where the combined block begins
    pub start: usize,
}

/// Answer positions occupied by each terminal transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionMap {
    positions: BTreeMap<usize, Vec<usize>>,
    layout: Layout,
    split: Option<ContainerSplit>,
    answer_len: usize,
}

impl PositionMap {
    pub fn build(transforms: &[TransformSpec], graph: &DependencyGraph, answer: &str) -> Self {
        let answer = letters::clean(answer);
        let answer_len = answer.chars().count();
        let layout = classify(transforms, graph);
        let terminals = graph.terminals();

        if let [only] = terminals {
            if transforms[*only].letters() == answer {
                let mut positions = BTreeMap::new();
                positions.insert(*only, (0..answer_len).collect());
                return Self {
                    positions,
                    layout,
                    split: None,
                    answer_len,
                };
            }
        }

        if layout == Layout::Container {
            if let Some((positions, split)) = container_positions(transforms, terminals, &answer) {
                return Self {
                    positions,
                    layout,
                    split: Some(split),
                    answer_len,
                };
            }
            tracing::debug!("no insertion offset reproduces the container; using sequential positions");
        }

        Self {
            positions: charade_positions(transforms, terminals),
            layout,
            split: None,
            answer_len,
        }
    }

    pub fn get(&self, position: usize) -> Option<&[usize]> {
        self.positions.get(&position).map(Vec::as_slice)
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn split(&self) -> Option<&ContainerSplit> {
        self.split.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.positions.iter().map(|(&k, v)| (k, v.as_slice()))
    }

    /// Total number of mapped answer positions
    pub fn covered(&self) -> usize {
        self.positions.values().map(Vec::len).sum()
    }

    /// Place every solved terminal's letters; unknown cells stay `None`.
    pub fn assemble(&self, solved: &BTreeMap<usize, String>) -> Vec<Option<char>> {
        let mut cells = vec![None; self.answer_len];
        for (position, targets) in &self.positions {
            let Some(result) = solved.get(position) else {
                continue;
            };
            for (letter, &target) in letters::clean(result).chars().zip(targets) {
                if let Some(cell) = cells.get_mut(target) {
                    *cell = Some(letter);
                }
            }
        }
        cells
    }

    /// Partially assembled answer with `_` for unknown letters
    pub fn render_partial(&self, solved: &BTreeMap<usize, String>) -> String {
        self.assemble(solved)
            .into_iter()
            .map(|c| c.unwrap_or('_'))
            .collect()
    }

    /// The assembled answer, if every position is filled
    pub fn assembled(&self, solved: &BTreeMap<usize, String>) -> Option<String> {
        self.assemble(solved).into_iter().collect()
    }

    #[cfg(test)]
    pub(crate) fn to_map(&self) -> BTreeMap<usize, Vec<usize>> {
        self.positions.clone()
    }
}

/// Terminals occupy consecutive ranges in ascending transform order.
fn charade_positions(transforms: &[TransformSpec], terminals: &[usize]) -> BTreeMap<usize, Vec<usize>> {
    let mut cursor = 0;
    let mut positions = BTreeMap::new();
    for &t in terminals {
        let len = transforms[t].letter_count();
        positions.insert(t, (cursor..cursor + len).collect());
        cursor += len;
    }
    positions
}

/// Find the offset `k` (strictly inside `outer`) where `outer[..k] + inner + outer[k..] == target`.
pub fn insertion_offset(outer: &str, inner: &str, target: &str) -> Option<usize> {
    let outer: Vec<char> = outer.chars().collect();
    if outer.len() < 2 || outer.len() + inner.chars().count() != target.chars().count() {
        return None;
    }
    (1..outer.len()).find(|&k| {
        let mut spliced: String = outer[..k].iter().collect();
        spliced.push_str(inner);
        spliced.extend(&outer[k..]);
        spliced == target
    })
}

fn container_positions(
    transforms: &[TransformSpec],
    terminals: &[usize],
    answer: &str,
) -> Option<(BTreeMap<usize, Vec<usize>>, ContainerSplit)> {
    let outer = terminals.iter().copied().find(|&t| transforms[t].has_role("outer"))?;
    let inners: Vec<usize> = terminals
        .iter()
        .copied()
        .filter(|&t| transforms[t].has_role("inner"))
        .collect();
    if inners.is_empty() {
        return None;
    }

    let outer_letters = transforms[outer].letters();
    let inner_letters: String = inners.iter().map(|&i| transforms[i].letters()).collect();
    let block_len = outer_letters.chars().count() + inner_letters.chars().count();
    let in_block = |t: usize| t == outer || inners.contains(&t);

    // Block starts after every terminal that precedes its first member.
    let start: usize = terminals
        .iter()
        .take_while(|&&t| !in_block(t))
        .map(|&t| transforms[t].letter_count())
        .sum();

    let explicit = transforms
        .iter()
        .find(|t| t.operation == OperationKind::Container && t.letter_count() == block_len)
        .map(TransformSpec::letters);
    let target = match explicit {
        Some(target) => target,
        None => answer.chars().skip(start).take(block_len).collect(),
    };

    let offset = insertion_offset(&outer_letters, &inner_letters, &target)?;

    let mut positions = BTreeMap::new();
    let inner_len = inner_letters.chars().count();
    let outer_range: Vec<usize> = (start..start + offset)
        .chain(start + offset + inner_len..start + block_len)
        .collect();
    positions.insert(outer, outer_range);

    let mut cursor = start + offset;
    for &i in &inners {
        let len = transforms[i].letter_count();
        positions.insert(i, (cursor..cursor + len).collect());
        cursor += len;
    }

    let mut cursor = 0;
    let mut placed_block = false;
    for &t in terminals {
        if in_block(t) {
            if !placed_block {
                cursor += block_len;
                placed_block = true;
            }
            continue;
        }
        let len = transforms[t].letter_count();
        positions.insert(t, (cursor..cursor + len).collect());
        cursor += len;
    }

    Some((
        positions,
        ContainerSplit {
            outer,
            inners,
            offset,
            start,
        },
    ))
}
