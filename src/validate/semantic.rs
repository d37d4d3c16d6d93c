//! Per-operation checks that an authored transform is self-consistent

use crate::assembly::insertion_offset;
use crate::letters;

/// `result` is exactly the reverse of `input`
pub fn reversal(input: &str, result: &str) -> bool {
    letters::reversed(input) == result
}

/// `result` keeps `input`'s order but is strictly shorter
pub fn deletion(input: &str, result: &str) -> bool {
    result.len() < input.len() && letters::is_subsequence(result, input)
}

/// Same letters, any order
pub fn anagram(input: &str, result: &str) -> bool {
    letters::sorted(input) == letters::sorted(result)
}

/// Same length, exactly one position differs
pub fn substitution(input: &str, result: &str) -> bool {
    letters::hamming(input, result) == Some(1)
}

/// `result` is one input with the others inserted at a single inside offset.
///
/// Every input is tried as the outer piece, and every ordering of the rest as
/// the inner string.
pub fn container(inputs: &[String], result: &str) -> bool {
    if inputs.len() < 2 {
        return false;
    }
    (0..inputs.len()).any(|outer| {
        let rest: Vec<usize> = (0..inputs.len()).filter(|&i| i != outer).collect();
        permutations(&rest).any(|order| {
            let inner: String = order.iter().map(|&i| inputs[i].as_str()).collect();
            insertion_offset(&inputs[outer], &inner, result).is_some()
        })
    })
}

/// How a letter selection was made, if it matches any known pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    FirstLetters,
    LastLetters,
    Alternate,
    Hidden,
}

/// Check `result` against first, last, alternating or hidden letters of `words`.
pub fn letter_selection(words: &[String], result: &str) -> Option<Selection> {
    let firsts: String = words.iter().filter_map(|w| w.chars().next()).collect();
    if firsts == result {
        return Some(Selection::FirstLetters);
    }
    let lasts: String = words.iter().filter_map(|w| w.chars().last()).collect();
    if lasts == result {
        return Some(Selection::LastLetters);
    }
    let joined: String = words.concat();
    let odds: String = joined.chars().step_by(2).collect();
    let evens: String = joined.chars().skip(1).step_by(2).collect();
    if odds == result || evens == result {
        return Some(Selection::Alternate);
    }
    if !result.is_empty() && joined.contains(result) {
        return Some(Selection::Hidden);
    }
    None
}

/// All orderings of `items`, generated one at a time (Heap's algorithm)
fn permutations(items: &[usize]) -> Permutations {
    Permutations {
        items: items.to_vec(),
        counters: vec![0; items.len()],
        index: 1,
        started: false,
    }
}

struct Permutations {
    items: Vec<usize>,
    counters: Vec<usize>,
    index: usize,
    started: bool,
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some(self.items.clone());
        }
        while self.index < self.items.len() {
            let i = self.index;
            if self.counters[i] < i {
                let j = if i % 2 == 0 { 0 } else { self.counters[i] };
                self.items.swap(j, i);
                self.counters[i] += 1;
                self.index = 1;
                return Some(self.items.clone());
            }
            self.counters[i] = 0;
            self.index += 1;
        }
        None
    }
}
