//! Policy definition loading.

mod loader;

pub use loader::{PolicyLoadError, load_policy_definition};
