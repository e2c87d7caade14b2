//! Validation findings: kinds, per-kind details and priority ordering.

pub mod details;
pub mod entities;
pub mod kind;
pub mod ordering;

pub use details::{
    AmbiguityDetails, ContradictionDetails, LogicWarning, RuleContent, RuleReference,
    SatisfiableDetails, Scenario, Statement, Translation, TranslationDetails, TranslationOption,
    ValidDetails,
};
pub use entities::{Finding, ValidationReport};
pub use kind::ValidationKind;
pub use ordering::{select_next, sort_findings};
