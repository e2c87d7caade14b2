//! Domain layer for policy-rewriter
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Findings
//!
//! A validation pass checks a candidate answer against a formal policy and
//! returns [`Finding`]s. Each finding has a [`ValidationKind`]; findings are
//! addressed one at a time in priority order (ambiguity first).
//!
//! ## Threads
//!
//! A [`Thread`] is one user prompt and the log of every [`Iteration`] spent
//! answering it: the initial answer, each rewrite, and each pause for user
//! clarification.
//!
//! ## Decisions
//!
//! Every rewrite reply is parsed into a [`Decision`]: rewrite the answer,
//! ask the user questions, or declare the request impossible.

pub mod core;
pub mod decision;
pub mod finding;
pub mod policy;
pub mod prompt;
pub mod thread;

// Re-export commonly used types
pub use crate::core::error::DomainError;
pub use decision::{Decision, MAX_QUESTIONS, detect_questions, parse_decision};
pub use finding::{
    AmbiguityDetails, ContradictionDetails, Finding, LogicWarning, RuleContent, RuleReference,
    SatisfiableDetails, Scenario, Statement, Translation, TranslationDetails, TranslationOption,
    ValidDetails, ValidationKind, ValidationReport, select_next,
    sort_findings,
};
pub use policy::{
    PolicyDefinition, PolicyRule, PolicyVariable, RuleIndex, RuleLookup, enrich_findings,
    format_policy_context,
};
pub use prompt::{
    PromptRenderer, PromptTemplate, TemplateName, TemplateSet, context_augmentation,
    format_findings,
};
pub use thread::{
    ArFeedback, Clarification, Iteration, IterationKind, LlmDecision, ProcessingState,
    QuestionAnswerExchange, Thread, ThreadId, ThreadSnapshot, ThreadStatus,
};
