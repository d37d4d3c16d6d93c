//! Lexer for template bodies using logos
//!
//! `{name}` is a placeholder; `{{` and `}}` are literal braces.

use logos::Logos;

use crate::error::Span;

use super::TemplateError;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    #[token("{{")]
    OpenEscape,
    #[token("}}")]
    CloseEscape,

    #[regex(r"\{[a-z_][a-z0-9_]*\}", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    Placeholder(String),

    #[regex(r"[^{}]+", |lex| lex.slice().to_string())]
    Text(String),

    #[token("{")]
    StrayOpen,
    #[token("}")]
    StrayClose,
}

/// A parsed piece of template text
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Placeholder { name: String, span: Span },
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

/// Split a template body into literal and placeholder segments
pub fn segments(template: &str) -> Result<Vec<Segment>, TemplateError> {
    fn push_literal(out: &mut Vec<Segment>, text: &str) {
        match out.last_mut() {
            Some(Segment::Literal(prev)) => prev.push_str(text),
            _ => out.push(Segment::Literal(text.to_string())),
        }
    }

    let mut out: Vec<Segment> = Vec::new();

    for (token, span) in lex(template) {
        match token {
            Token::OpenEscape => push_literal(&mut out, "{"),
            Token::CloseEscape => push_literal(&mut out, "}"),
            Token::Text(text) => push_literal(&mut out, &text),
            Token::Placeholder(name) => out.push(Segment::Placeholder { name, span }),
            Token::StrayOpen | Token::StrayClose => {
                return Err(TemplateError::UnbalancedBrace {
                    template: template.to_string(),
                    span,
                })
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_and_text() {
        let tokens: Vec<_> = lex("Pick {words} now").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Text("Pick ".to_string()),
                Token::Placeholder("words".to_string()),
                Token::Text(" now".to_string()),
            ]
        );
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let segs = segments("{{words}} stays").unwrap();
        assert_eq!(segs, vec![Segment::Literal("{words} stays".to_string())]);
    }

    #[test]
    fn test_stray_brace_is_error() {
        let err = segments("Pick {Words}").unwrap_err();
        assert!(matches!(err, TemplateError::UnbalancedBrace { span, .. } if span == (5..6)));
    }

    #[test]
    fn test_placeholder_span() {
        let segs = segments("a {b}").unwrap();
        assert_eq!(
            segs[1],
            Segment::Placeholder {
                name: "b".to_string(),
                span: 2..5
            }
        );
    }
}
