//! Prompt composition: templates, findings formatting and clarification context.

pub mod clarification;
pub mod findings;
pub mod renderer;
pub mod scenario;
pub mod template;

pub use clarification::{all_clarifications_context, context_augmentation};
pub use findings::format_findings;
pub use renderer::PromptRenderer;
pub use scenario::{disagreeing_variables, extract_variable, filter_statements};
pub use template::{PromptTemplate, TemplateName, TemplateSet, render};
