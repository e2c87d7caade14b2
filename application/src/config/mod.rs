//! Application-level configuration.
//!
//! - [`RewriteParams`] — rewrite loop control (iteration budget, clarification timeout)

pub mod rewrite_params;

pub use rewrite_params::RewriteParams;
