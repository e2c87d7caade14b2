//! Scripted collaborators shared by the use case tests.

use crate::ports::audit_sink::AuditSink;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::thread_repository::{RepositoryError, ThreadRepository};
use crate::ports::validation_gateway::{ValidationError, ValidationGateway};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rewriter_domain::{
    AmbiguityDetails, ContradictionDetails, Finding, RuleReference, SatisfiableDetails, Thread,
    ThreadId, ThreadStatus, TranslationDetails, ValidationReport,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Generation gateway that replays scripted replies and records prompts.
pub(crate) struct ScriptedGateway {
    pub(crate) replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub(crate) fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: GatewayError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(error)])),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("DECISION: REWRITE\nANSWER: scripted rewrite".to_string()))
    }
}

/// Validation gateway that replays scripted reports, then repeats a fallback.
pub(crate) struct ScriptedValidator {
    reports: Mutex<VecDeque<Result<ValidationReport, ValidationError>>>,
    fallback: ValidationReport,
    calls: Mutex<usize>,
}

impl ScriptedValidator {
    pub(crate) fn new(reports: Vec<ValidationReport>) -> Self {
        Self::with_fallback(reports, ValidationReport::from_findings(vec![]))
    }

    pub(crate) fn with_fallback(reports: Vec<ValidationReport>, fallback: ValidationReport) -> Self {
        Self {
            reports: Mutex::new(reports.into_iter().map(Ok).collect()),
            fallback,
            calls: Mutex::new(0),
        }
    }

    pub(crate) fn failing(error: ValidationError) -> Self {
        let validator = Self::new(vec![]);
        validator.reports.lock().unwrap().push_back(Err(error));
        validator
    }

    pub(crate) fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ValidationGateway for ScriptedValidator {
    async fn validate(
        &self,
        _prompt: &str,
        _answer: &str,
    ) -> Result<ValidationReport, ValidationError> {
        *self.calls.lock().unwrap() += 1;
        self.reports
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[derive(Default)]
pub(crate) struct TestRepository {
    threads: Mutex<HashMap<ThreadId, Thread>>,
    failing_saves: AtomicUsize,
}

impl TestRepository {
    /// Make the next `count` calls to `save` fail with a storage error.
    pub(crate) fn fail_next_saves(&self, count: usize) {
        self.failing_saves.store(count, Ordering::SeqCst);
    }
}

impl ThreadRepository for TestRepository {
    fn insert(&self, thread: &Thread) -> Result<(), RepositoryError> {
        self.threads
            .lock()
            .unwrap()
            .insert(thread.id.clone(), thread.clone());
        Ok(())
    }

    fn get(&self, id: &ThreadId) -> Result<Option<Thread>, RepositoryError> {
        Ok(self.threads.lock().unwrap().get(id).cloned())
    }

    fn save(&self, thread: &Thread) -> Result<(), RepositoryError> {
        let failing = self
            .failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(RepositoryError::Storage("disk full".to_string()));
        }
        self.insert(thread)
    }

    fn transition(
        &self,
        id: &ThreadId,
        expected: ThreadStatus,
        next: ThreadStatus,
    ) -> Result<Thread, RepositoryError> {
        let mut threads = self.threads.lock().unwrap();
        let thread = threads
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        if thread.status != expected {
            return Err(RepositoryError::StatusConflict {
                id: id.clone(),
                expected,
                actual: thread.status,
            });
        }
        thread.set_status(next);
        Ok(thread.clone())
    }

    fn stale_awaiting(&self, cutoff: DateTime<Utc>) -> Result<Vec<ThreadId>, RepositoryError> {
        Ok(self
            .threads
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.awaiting_input_since.is_some_and(|since| since <= cutoff))
            .map(|t| t.id.clone())
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct RecordingAudit {
    events: Mutex<Vec<String>>,
}

impl RecordingAudit {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingAudit {
    fn record_accepted(&self, _thread: &Thread, findings: &[Finding]) {
        self.events
            .lock()
            .unwrap()
            .push(format!("accepted:{}", findings.len()));
    }

    fn record_budget_exhausted(
        &self,
        _thread: &Thread,
        iteration_summaries: &[String],
        last_finding: Option<&Finding>,
    ) {
        self.events.lock().unwrap().push(format!(
            "budget:{}:{}",
            iteration_summaries.len(),
            last_finding.map(|f| f.kind().as_str()).unwrap_or("none")
        ));
    }
}

// ==================== Fixtures ====================

pub(crate) fn invalid(rule: &str) -> Finding {
    Finding::Invalid(ContradictionDetails {
        contradicting_rules: vec![RuleReference::new(rule)],
        ..Default::default()
    })
}

pub(crate) fn ambiguous() -> Finding {
    Finding::TranslationAmbiguous(AmbiguityDetails::default())
}

pub(crate) fn satisfiable() -> Finding {
    Finding::Satisfiable(SatisfiableDetails::default())
}

pub(crate) fn not_covered() -> Finding {
    Finding::NoTranslations(TranslationDetails::default())
}

pub(crate) fn report(findings: Vec<Finding>) -> ValidationReport {
    ValidationReport::from_findings(findings)
}

pub(crate) fn valid() -> ValidationReport {
    report(vec![])
}
