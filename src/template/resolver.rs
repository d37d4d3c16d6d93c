//! Template resolution - substitutes context values into template bodies

use std::collections::BTreeMap;

use super::lexer::{segments, Segment};
use super::registry::TemplateError;

/// Named values available to a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// A child context that sees every value of `self` plus its own
    pub fn nested(&self) -> Self {
        self.clone()
    }
}

/// Resolve every placeholder in `template` against `ctx`.
///
/// A placeholder with no value is an error, never an empty substitution.
pub fn resolve(template: &str, ctx: &TemplateContext) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    for segment in segments(template)? {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Placeholder { name, span } => match ctx.get(&name) {
                Some(value) => out.push_str(value),
                None => {
                    return Err(TemplateError::UnknownPlaceholder {
                        name,
                        template: template.to_string(),
                        span,
                    })
                }
            },
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_substitutes_values() {
        let ctx = TemplateContext::new()
            .with("clue", "Come by five")
            .with("enumeration", "5");
        assert_eq!(
            resolve("In \"{clue}\" ({enumeration})", &ctx).unwrap(),
            "In \"Come by five\" (5)"
        );
    }

    #[test]
    fn test_unknown_placeholder_is_error() {
        let ctx = TemplateContext::new();
        let err = resolve("Reverse {predecessors}.", &ctx).unwrap_err();
        match err {
            TemplateError::UnknownPlaceholder { name, span, .. } => {
                assert_eq!(name, "predecessors");
                assert_eq!(span, 8..22);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let ctx = TemplateContext::new().with("words", "");
        assert_eq!(resolve("[{words}]", &ctx).unwrap(), "[]");
    }

    #[test]
    fn test_nested_context_overrides() {
        let base = TemplateContext::new().with("source_words", "clue level");
        let mut child = base.nested();
        child.set("source_words", "fragment level");
        assert_eq!(resolve("{source_words}", &child).unwrap(), "fragment level");
        assert_eq!(resolve("{source_words}", &base).unwrap(), "clue level");
    }
}
