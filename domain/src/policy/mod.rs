//! Policy definitions, rule lookup and finding enrichment.

pub mod context;
pub mod definition;
pub mod enrichment;

pub use context::format_policy_context;
pub use definition::{PolicyDefinition, PolicyRule, PolicyVariable, RuleIndex, RuleLookup};
pub use enrichment::enrich_findings;
