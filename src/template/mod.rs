//! Template system for learner-facing text
//!
//! Step and fragment text lives in a TOML catalog (see `assets/templates.toml`)
//! and is resolved against a context built from the current step, earlier
//! completed steps and, for assembly text, the dependency and position data.
//!
//! # Example
//!
//! ```text
//! [steps.indicator.prompt]
//! anagram = "Which word tells you to rearrange letters?"
//!
//! [fragments.reversal]
//! prompt = "Reverse the letters the indicator points at ({role})."
//! with_inputs = "Reverse {predecessors}."
//! ```

pub mod lexer;
pub mod notation;
mod registry;
mod resolver;

pub use registry::{
    Discriminant, FragmentTemplate, NotationStyle, StepTemplate, TemplateError, TemplateRegistry,
    TemplateText,
};
pub use resolver::{resolve, TemplateContext};
