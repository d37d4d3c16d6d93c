//! Error types for the tutoring engine

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::clue::ClueLoadError;
use crate::template::TemplateError;
use crate::validate::ValidationReport;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors surfaced by tutor operations.
///
/// A wrong learner answer is not an error; it comes back as a rejected outcome.
#[derive(Debug, Error)]
pub enum TutorError {
    /// The clue failed annotation validation and cannot be used
    #[error("clue '{clue}' failed validation: {}", .report.errors().join("; "))]
    Data {
        clue: String,
        report: ValidationReport,
    },

    /// Internal inconsistency; never expected for validated clues
    #[error("invariant violated in clue '{clue}' (step {step:?}, fragment {fragment:?}): {message}")]
    Invariant {
        clue: String,
        step: Option<usize>,
        fragment: Option<usize>,
        message: String,
    },

    /// A template could not be resolved
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// The clue could not be loaded
    #[error("clue load error: {0}")]
    Clue(#[from] ClueLoadError),
}

impl TutorError {
    /// Create an invariant violation and log it with enough context to reproduce
    pub fn invariant(
        clue: impl Into<String>,
        step: Option<usize>,
        fragment: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        let clue = clue.into();
        let message = message.into();
        tracing::error!(
            clue = %clue,
            step = ?step,
            fragment = ?fragment,
            "invariant violation: {}",
            message
        );
        Self::Invariant {
            clue,
            step,
            fragment,
            message,
        }
    }

    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::Data { .. })
    }
}

impl TemplateError {
    /// Format the error with template source context using ariadne
    pub fn format(&self, filename: &str) -> String {
        let mut buf = Vec::new();
        let (source, span) = match self.source_span() {
            Some(found) => found,
            None => return self.to_string(),
        };
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span.clone()))
                    .with_message(self.to_string())
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}
