//! Prompt template override loading.

mod loader;

pub use loader::{TemplateLoadError, load_template_overrides};
