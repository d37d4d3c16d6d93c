//! Enumeration parsing: "5", "5,3", "5-6", "(3,2,4)"

use chumsky::prelude::*;
use thiserror::Error;

use crate::error::Span;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid enumeration '{input}' at {span:?}: {message}")]
pub struct EnumerationError {
    pub input: String,
    pub span: Span,
    pub message: String,
}

/// Separator between two letter groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Break {
    /// Word break, written ','
    Word,
    /// Hyphen, written '-'
    Hyphen,
}

/// Per-word letter-group lengths of an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    pub groups: Vec<usize>,
    /// `breaks[i]` separates `groups[i]` and `groups[i + 1]`
    pub breaks: Vec<Break>,
}

impl Enumeration {
    pub fn parse(input: &str) -> Result<Self, EnumerationError> {
        enumeration_parser()
            .parse(input)
            .into_result()
            .map_err(|errs| {
                let first = errs.into_iter().next();
                EnumerationError {
                    input: input.to_string(),
                    span: first
                        .as_ref()
                        .map(|e| e.span().into_range())
                        .unwrap_or(0..input.len()),
                    message: first
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "empty enumeration".to_string()),
                }
            })
    }

    /// Total number of letters the answer must have
    pub fn total(&self) -> usize {
        self.groups.iter().sum()
    }

    /// Re-insert word breaks into cleaned answer letters.
    ///
    /// Letters beyond the enumeration's total are appended unchanged.
    pub fn format(&self, letters: &str) -> String {
        let chars: Vec<char> = letters.chars().collect();
        let mut out = String::with_capacity(chars.len() + self.breaks.len());
        let mut cursor = 0;
        for (i, len) in self.groups.iter().enumerate() {
            let end = (cursor + len).min(chars.len());
            out.extend(&chars[cursor..end]);
            cursor = end;
            if let Some(b) = self.breaks.get(i) {
                if cursor < chars.len() {
                    out.push(match b {
                        Break::Word => ' ',
                        Break::Hyphen => '-',
                    });
                }
            }
        }
        out.extend(&chars[cursor..]);
        out
    }
}

fn enumeration_parser<'a>() -> impl Parser<'a, &'a str, Enumeration, extra::Err<Rich<'a, char>>> {
    let length = text::int(10)
        .try_map(|digits: &str, span| {
            digits
                .parse::<usize>()
                .map_err(|e| Rich::custom(span, e.to_string()))
        })
        .try_map(|n, span| {
            if n == 0 {
                Err(Rich::custom(span, "letter group of length zero"))
            } else {
                Ok(n)
            }
        })
        .padded();

    let separator = choice((just(',').to(Break::Word), just('-').to(Break::Hyphen))).padded();

    let groups = length
        .then(separator.then(length).repeated().collect::<Vec<_>>())
        .map(|(first, rest)| {
            let mut groups = vec![first];
            let mut breaks = Vec::with_capacity(rest.len());
            for (b, len) in rest {
                breaks.push(b);
                groups.push(len);
            }
            Enumeration { groups, breaks }
        });

    choice((
        groups
            .clone()
            .delimited_by(just('(').padded(), just(')').padded()),
        groups,
    ))
    .then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word() {
        let e = Enumeration::parse("5").unwrap();
        assert_eq!(e.groups, vec![5]);
        assert_eq!(e.total(), 5);
    }

    #[test]
    fn test_multi_word_and_hyphen() {
        let e = Enumeration::parse("5,3").unwrap();
        assert_eq!(e.total(), 8);
        let e = Enumeration::parse("(5-6)").unwrap();
        assert_eq!(e.groups, vec![5, 6]);
        assert_eq!(e.breaks, vec![Break::Hyphen]);
    }

    #[test]
    fn test_whitespace_tolerated() {
        let e = Enumeration::parse(" 3, 2 ,4 ").unwrap();
        assert_eq!(e.groups, vec![3, 2, 4]);
    }

    #[test]
    fn test_invalid() {
        assert!(Enumeration::parse("").is_err());
        assert!(Enumeration::parse("5,").is_err());
        assert!(Enumeration::parse("five").is_err());
        assert!(Enumeration::parse("0").is_err());
    }

    #[test]
    fn test_format() {
        let e = Enumeration::parse("5,3").unwrap();
        assert_eq!(e.format("ABCDEFGH"), "ABCDE FGH");
        let e = Enumeration::parse("3-4").unwrap();
        assert_eq!(e.format("SET"), "SET");
        assert_eq!(e.format("SETTING"), "SET-TING");
    }
}
