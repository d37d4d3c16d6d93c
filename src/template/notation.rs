//! Breakdown notation shown once an assembly is complete
//!
//! Charade: `'five' → V + 'do you' → ISIT`. A dependent fragment collapses
//! its inputs into one bracketed group: `['eager' → KEEN] → KEE`.
//! Container: `D(R)IPS`, with any other terminal pieces around it.

use crate::assembly::{insertion_offset, AssemblyPlan};
use crate::clue::{ClueDefinition, OperationKind};

use super::registry::NotationStyle;

/// Render the whole breakdown for a completed assembly
pub fn breakdown(clue: &ClueDefinition, plan: &AssemblyPlan<'_>, style: &NotationStyle) -> String {
    let terminals = plan.graph().terminals();
    let mut pieces = Vec::with_capacity(terminals.len());

    match plan.positions().split() {
        Some(split) => {
            let mut block_done = false;
            for &t in terminals {
                let in_block = t == split.outer || split.inners.contains(&t);
                if !in_block {
                    pieces.push(fragment(clue, plan, style, t));
                } else if !block_done {
                    let outer = plan.transforms()[split.outer].letters();
                    let inner: String = split
                        .inners
                        .iter()
                        .map(|&i| plan.transforms()[i].letters())
                        .collect();
                    pieces.push(bracket(&outer, &inner, split.offset));
                    block_done = true;
                }
            }
        }
        None => {
            for &t in terminals {
                pieces.push(fragment(clue, plan, style, t));
            }
        }
    }

    pieces.join(&style.separator)
}

/// `prefix(inner)suffix`
pub fn bracket(outer: &str, inner: &str, offset: usize) -> String {
    let prefix: String = outer.chars().take(offset).collect();
    let suffix: String = outer.chars().skip(offset).collect();
    format!("{}({}){}", prefix, inner, suffix)
}

/// One fragment, with its inputs folded in if it is dependent
fn fragment(clue: &ClueDefinition, plan: &AssemblyPlan<'_>, style: &NotationStyle, position: usize) -> String {
    let transform = &plan.transforms()[position];
    let inputs = plan.graph().consumed_by(position);

    if inputs.is_empty() {
        let words = clue.words_at(&transform.indices);
        let source = if words.is_empty() {
            transform.role.clone()
        } else {
            format!("'{}'", words)
        };
        return format!("{}{}{}", source, style.arrow, transform.letters());
    }

    let group = inputs
        .iter()
        .map(|&i| fragment(clue, plan, style, i))
        .collect::<Vec<_>>()
        .join(&style.separator);

    let result = match transform.operation {
        OperationKind::Container => container_result(plan, inputs, &transform.letters()),
        _ => transform.letters(),
    };
    format!("[{}]{}{}", group, style.arrow, result)
}

/// Bracket notation for an explicit container transform, trying each input as the outer.
fn container_result(plan: &AssemblyPlan<'_>, inputs: &[usize], result: &str) -> String {
    for &outer in inputs {
        let outer_letters = plan.transforms()[outer].letters();
        let inner: String = inputs
            .iter()
            .filter(|&&i| i != outer)
            .map(|&i| plan.transforms()[i].letters())
            .collect();
        if let Some(offset) = insertion_offset(&outer_letters, &inner, result) {
            return bracket(&outer_letters, &inner, offset);
        }
    }
    result.to_string()
}
