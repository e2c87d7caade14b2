//! Process Thread use case
//!
//! Drives one thread through the validate-and-rewrite state machine:
//!
//! | State           | Action                                              | Next                                   |
//! |-----------------|-----------------------------------------------------|----------------------------------------|
//! | Init            | load the iteration budget                           | GenerateInitial                        |
//! | GenerateInitial | render the initial prompt, generate                 | Validate                               |
//! | Validate        | validate + enrich, record iteration 0               | CheckQuestions                         |
//! | CheckQuestions  | pause if the answer itself asks questions           | AwaitingInput / HandleResult           |
//! | HandleResult    | branch on the overall validation kind               | Completed / Error / RewritingLoop      |
//! | RewritingLoop   | one rewrite attempt for the top-priority finding    | RewritingLoop / AwaitingInput / ...    |
//!
//! The thread record is saved after every step. `AwaitingInput` ends the
//! worker; the resume path (see `resume.rs`) is a fresh invocation that
//! picks up from the persisted record.

mod resume;
mod types;

pub use types::{NOT_COVERED_WARNING, ProcessThreadError, TOO_COMPLEX_MESSAGE, budget_warning};

use crate::config::RewriteParams;
use crate::ports::audit_sink::{AuditSink, NoAuditSink};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoThreadProgress, ThreadProgressNotifier};
use crate::ports::thread_repository::ThreadRepository;
use crate::ports::validation_gateway::ValidationGateway;
use crate::use_cases::shared::ScopedTimer;
use rewriter_domain::{
    ArFeedback, Clarification, Decision, IterationKind, LlmDecision, ProcessingState,
    PromptRenderer, QuestionAnswerExchange, RuleIndex, RuleLookup, Thread, ThreadId,
    ThreadSnapshot, ThreadStatus, ValidationKind, ValidationReport, detect_questions,
    enrich_findings, parse_decision, select_next,
};
use std::collections::HashSet;
use std::slice;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Use case for processing a thread
pub struct ProcessThreadUseCase<G: LlmGateway + 'static, V: ValidationGateway + 'static> {
    pub(super) generator: Arc<G>,
    pub(super) validator: Arc<V>,
    pub(super) repository: Arc<dyn ThreadRepository>,
    pub(super) renderer: Arc<PromptRenderer>,
    pub(super) rules: Arc<dyn RuleLookup>,
    pub(super) audit: Arc<dyn AuditSink>,
    pub(super) progress: Arc<dyn ThreadProgressNotifier>,
    pub(super) params: RewriteParams,
}

impl<G, V> Clone for ProcessThreadUseCase<G, V>
where
    G: LlmGateway + 'static,
    V: ValidationGateway + 'static,
{
    fn clone(&self) -> Self {
        Self {
            generator: self.generator.clone(),
            validator: self.validator.clone(),
            repository: self.repository.clone(),
            renderer: self.renderer.clone(),
            rules: self.rules.clone(),
            audit: self.audit.clone(),
            progress: self.progress.clone(),
            params: self.params.clone(),
        }
    }
}

impl<G, V> ProcessThreadUseCase<G, V>
where
    G: LlmGateway + 'static,
    V: ValidationGateway + 'static,
{
    pub fn new(generator: Arc<G>, validator: Arc<V>, repository: Arc<dyn ThreadRepository>) -> Self {
        Self {
            generator,
            validator,
            repository,
            renderer: Arc::new(PromptRenderer::default()),
            rules: Arc::new(RuleIndex::new()),
            audit: Arc::new(NoAuditSink),
            progress: Arc::new(NoThreadProgress),
            params: RewriteParams::default(),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_renderer(mut self, renderer: PromptRenderer) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn with_rules(mut self, rules: Arc<dyn RuleLookup>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ThreadProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_params(mut self, params: RewriteParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &RewriteParams {
        &self.params
    }

    // ==================== Entry Points ====================

    /// Create and store a new thread for `prompt`.
    pub fn create_thread(&self, prompt: &str) -> Result<Thread, ProcessThreadError> {
        let thread = Thread::new(
            prompt,
            self.generator.model_id(),
            self.params.max_iterations,
        )?;
        self.repository.insert(&thread)?;
        info!(thread_id = %thread.id, model = %thread.model_id, "Thread created");
        Ok(thread)
    }

    pub fn snapshot(&self, id: &ThreadId) -> Result<ThreadSnapshot, ProcessThreadError> {
        self.load(id).map(|thread| ThreadSnapshot::from(&thread))
    }

    /// Run a freshly created thread until it pauses or terminates.
    pub async fn run(&self, id: &ThreadId) -> Result<ThreadSnapshot, ProcessThreadError> {
        let thread = self.load(id)?;
        if thread.status != ThreadStatus::Processing || !thread.iterations.is_empty() {
            return Err(ProcessThreadError::InvalidThreadState {
                id: id.clone(),
                expected: ThreadStatus::Processing,
                actual: thread.status,
            });
        }
        self.drive(thread, ProcessingState::Init).await
    }

    // ==================== State Loop ====================

    pub(super) fn load(&self, id: &ThreadId) -> Result<Thread, ProcessThreadError> {
        self.repository
            .get(id)?
            .ok_or_else(|| ProcessThreadError::ThreadNotFound(id.clone()))
    }

    /// Step `thread` from `state` until a stop state, saving after each step.
    pub(super) async fn drive(
        &self,
        mut thread: Thread,
        mut state: ProcessingState,
    ) -> Result<ThreadSnapshot, ProcessThreadError> {
        loop {
            self.progress.on_state_change(&thread.id, state);
            if state.is_stop() {
                break;
            }
            let outcome = self.step(&mut thread, state).await;
            state = match self.settle(&mut thread, outcome) {
                Ok(next) => next,
                Err(e) => {
                    self.abandon(&mut thread, &e);
                    return Err(e);
                }
            };
            self.persist(&mut thread)?;
        }

        if thread.status.is_terminal() {
            self.progress.on_terminal(&thread.id, thread.status);
        }
        Ok(ThreadSnapshot::from(&thread))
    }

    /// Save `thread`, abandoning it when the save fails.
    pub(super) fn persist(&self, thread: &mut Thread) -> Result<(), ProcessThreadError> {
        let Err(e) = self.repository.save(thread) else {
            return Ok(());
        };
        let e = ProcessThreadError::from(e);
        self.abandon(thread, &e);
        Err(e)
    }

    /// Best-effort move to `error` after a failure that aborts processing,
    /// so the stored thread is not left in `processing`. If this save fails
    /// too, the stored thread keeps its last saved state.
    pub(super) fn abandon(&self, thread: &mut Thread, cause: &ProcessThreadError) {
        error!(thread_id = %thread.id, error = %cause, "Abandoning thread");
        thread.fail(format!(
            "An error occurred while processing your request: {}",
            cause
        ));
        if let Err(e) = self.repository.save(thread) {
            error!(thread_id = %thread.id, error = %e, "Failed to record thread failure");
        }
    }

    /// Turn collaborator failures into a terminal `error` thread.
    pub(super) fn settle(
        &self,
        thread: &mut Thread,
        outcome: Result<ProcessingState, ProcessThreadError>,
    ) -> Result<ProcessingState, ProcessThreadError> {
        match outcome {
            Ok(next) => Ok(next),
            Err(e) if e.is_collaborator_failure() => {
                error!(thread_id = %thread.id, error = %e, "Thread processing failed");
                thread.fail(format!(
                    "An error occurred while processing your request: {}",
                    e
                ));
                Ok(ProcessingState::Error)
            }
            Err(e) => Err(e),
        }
    }

    async fn step(
        &self,
        thread: &mut Thread,
        state: ProcessingState,
    ) -> Result<ProcessingState, ProcessThreadError> {
        match state {
            ProcessingState::Init => {
                thread.max_iterations = self.params.max_iterations;
                info!(
                    thread_id = %thread.id,
                    max_iterations = thread.max_iterations,
                    "Processing thread"
                );
                Ok(ProcessingState::GenerateInitial)
            }
            ProcessingState::GenerateInitial => {
                let prompt = self.renderer.initial(&thread.user_prompt);
                thread.current_answer = self.generate(&thread.id, &prompt).await?;
                Ok(ProcessingState::Validate)
            }
            ProcessingState::Validate => self.validate_initial(thread).await,
            ProcessingState::CheckQuestions => Ok(self.check_questions(thread)),
            ProcessingState::HandleResult => Ok(self.handle_result(thread)),
            ProcessingState::RewritingLoop => self.rewrite_step(thread).await,
            ProcessingState::AwaitingInput | ProcessingState::Completed | ProcessingState::Error => {
                Ok(state)
            }
        }
    }

    async fn validate_initial(
        &self,
        thread: &mut Thread,
    ) -> Result<ProcessingState, ProcessThreadError> {
        let report = self
            .validate(&thread.id, &thread.user_prompt, &thread.current_answer)
            .await?;

        if thread.iterations.is_empty() {
            let answer = thread.current_answer.clone();
            let prompt = self.renderer.initial(&thread.user_prompt);
            thread.push_iteration(
                "",
                answer,
                prompt,
                IterationKind::ArFeedback(ArFeedback {
                    findings: report.findings.clone(),
                    validation_output: report.output,
                    processed_finding_index: None,
                    llm_decision: LlmDecision::Initial,
                }),
            );
        }

        thread.replace_findings(report.output, report.findings);
        Ok(ProcessingState::CheckQuestions)
    }

    /// Pause right away when the answer already asks the user something.
    fn check_questions(&self, thread: &mut Thread) -> ProcessingState {
        let allows = thread
            .current_output
            .is_some_and(|output| output.allows_questions());
        if !allows {
            return ProcessingState::HandleResult;
        }

        let questions = detect_questions(&thread.current_answer);
        if questions.is_empty() {
            return ProcessingState::HandleResult;
        }
        self.pause(thread, questions, String::new(), None);
        ProcessingState::AwaitingInput
    }

    fn handle_result(&self, thread: &mut Thread) -> ProcessingState {
        match thread.current_output {
            Some(ValidationKind::TooComplex) => self.too_complex(thread),
            Some(ValidationKind::Valid) => self.accept(thread),
            _ if current_report(thread).is_entirely_uncovered() => {
                info!(thread_id = %thread.id, "Answer is not covered by the policy");
                self.accept(thread)
            }
            output => {
                info!(
                    thread_id = %thread.id,
                    output = ?output,
                    findings = thread.current_findings.len(),
                    "Answer requires rewriting"
                );
                ProcessingState::RewritingLoop
            }
        }
    }

    /// One pass of the rewriting loop.
    async fn rewrite_step(&self, thread: &mut Thread) -> Result<ProcessingState, ProcessThreadError> {
        if thread.budget_exhausted() {
            return Ok(self.exhaust_budget(thread));
        }

        let skip: HashSet<usize> = thread
            .processed_findings
            .iter()
            .copied()
            .chain(
                thread
                    .current_findings
                    .iter()
                    .enumerate()
                    .filter(|(_, finding)| !finding.kind().is_actionable())
                    .map(|(index, _)| index),
            )
            .collect();
        let Some((index, finding)) = select_next(&thread.current_findings, &skip) else {
            info!(thread_id = %thread.id, "No actionable findings remain");
            return Ok(self.accept(thread));
        };
        let finding = finding.clone();

        thread.iteration_counter += 1;
        thread.processed_findings.insert(index);
        info!(
            thread_id = %thread.id,
            iteration = thread.iteration_counter,
            max_iterations = thread.max_iterations,
            finding = %finding.kind(),
            "Rewriting answer"
        );
        self.progress.on_rewrite(
            &thread.id,
            thread.iteration_counter,
            thread.max_iterations,
            finding.kind(),
        );

        let prompt = self.renderer.rewrite(
            slice::from_ref(&finding),
            &thread.user_prompt,
            &thread.current_answer,
            &thread.all_clarifications,
        );
        let reply = self.generate(&thread.id, &prompt).await?;

        match parse_decision(&reply) {
            Decision::Impossible { explanation } => {
                info!(thread_id = %thread.id, "Model judged the request impossible");
                let original = std::mem::replace(&mut thread.current_answer, explanation.clone());
                thread.push_iteration(
                    original,
                    explanation,
                    prompt,
                    IterationKind::ArFeedback(ArFeedback {
                        findings: vec![finding],
                        validation_output: ValidationKind::Impossible,
                        processed_finding_index: Some(index),
                        llm_decision: LlmDecision::Impossible,
                    }),
                );
                Ok(self.finish(thread, None))
            }
            Decision::AskQuestions { questions } if !questions.is_empty() => {
                self.pause(thread, questions, prompt, Some(index));
                Ok(ProcessingState::AwaitingInput)
            }
            Decision::AskQuestions { .. } => {
                warn!(thread_id = %thread.id, "ASK_QUESTIONS without questions, treating reply as rewrite");
                self.apply_rewrite(thread, reply.trim().to_string(), prompt, index)
                    .await
            }
            Decision::Rewrite { answer } => self.apply_rewrite(thread, answer, prompt, index).await,
        }
    }

    /// Re-validate a rewritten answer and log it as an iteration.
    async fn apply_rewrite(
        &self,
        thread: &mut Thread,
        answer: String,
        prompt: String,
        index: usize,
    ) -> Result<ProcessingState, ProcessThreadError> {
        let report = self
            .validate(&thread.id, &thread.user_prompt, &answer)
            .await?;

        let original = std::mem::replace(&mut thread.current_answer, answer.clone());
        thread.push_iteration(
            original,
            answer,
            prompt,
            IterationKind::ArFeedback(ArFeedback {
                findings: report.findings.clone(),
                validation_output: report.output,
                processed_finding_index: Some(index),
                llm_decision: LlmDecision::Rewrite,
            }),
        );
        let summary = format!(
            "Iteration {}: {} (REWRITE) - {} finding(s)",
            thread.iteration_counter,
            report.output,
            report.findings.len()
        );
        thread.iteration_summaries.push(summary);
        thread.replace_findings(report.output, report.findings);

        Ok(self.after_revalidation(thread))
    }

    /// Shared tail of a rewrite and a resume.
    pub(super) fn after_revalidation(&self, thread: &mut Thread) -> ProcessingState {
        match thread.current_output {
            Some(ValidationKind::Valid) => self.accept(thread),
            Some(ValidationKind::TooComplex) => self.too_complex(thread),
            _ => ProcessingState::RewritingLoop,
        }
    }

    // ==================== Outcomes ====================

    fn pause(
        &self,
        thread: &mut Thread,
        questions: Vec<String>,
        prompt: String,
        processed_finding_index: Option<usize>,
    ) {
        info!(
            thread_id = %thread.id,
            questions = questions.len(),
            "Pausing for user clarification"
        );
        let original = thread.current_answer.clone();
        thread.push_iteration(
            original,
            "",
            prompt,
            IterationKind::UserClarification(Clarification {
                qa_exchange: QuestionAnswerExchange::pending(questions.clone()),
                context_augmentation: None,
                processed_finding_index,
                llm_decision: LlmDecision::AskQuestions,
                validation_output: None,
                findings: Vec::new(),
            }),
        );
        thread.set_status(ThreadStatus::AwaitingUserInput);
        self.progress.on_paused(&thread.id, &questions);
    }

    /// Accept the current answer, with the scope warning when part of a
    /// valid answer is not covered by the policy.
    fn accept(&self, thread: &mut Thread) -> ProcessingState {
        let warning = current_report(thread)
            .has_uncovered_parts()
            .then(|| NOT_COVERED_WARNING.to_string());
        self.finish(thread, warning)
    }

    fn finish(&self, thread: &mut Thread, warning: Option<String>) -> ProcessingState {
        let response = thread.current_answer.clone();
        thread.complete(response, warning);
        self.audit.record_accepted(thread, &thread.current_findings);
        info!(thread_id = %thread.id, iterations = thread.iterations.len(), "Thread completed");
        ProcessingState::Completed
    }

    fn exhaust_budget(&self, thread: &mut Thread) -> ProcessingState {
        warn!(
            thread_id = %thread.id,
            max_iterations = thread.max_iterations,
            "Iteration budget exhausted"
        );
        let response = thread.current_answer.clone();
        thread.complete(response, Some(budget_warning(thread.max_iterations)));
        self.audit.record_budget_exhausted(
            thread,
            &thread.iteration_summaries,
            thread.current_findings.last(),
        );
        ProcessingState::Completed
    }

    fn too_complex(&self, thread: &mut Thread) -> ProcessingState {
        error!(thread_id = %thread.id, "Validator reported TOO_COMPLEX");
        thread.fail(TOO_COMPLEX_MESSAGE);
        ProcessingState::Error
    }

    // ==================== Collaborator Calls ====================

    pub(super) async fn generate(
        &self,
        id: &ThreadId,
        prompt: &str,
    ) -> Result<String, ProcessThreadError> {
        let _timer = ScopedTimer::start(id, "generate");
        Ok(self.generator.generate(prompt).await?)
    }

    /// Validate `answer` and enrich the findings with rule content.
    pub(super) async fn validate(
        &self,
        id: &ThreadId,
        prompt: &str,
        answer: &str,
    ) -> Result<ValidationReport, ProcessThreadError> {
        let report = {
            let _timer = ScopedTimer::start(id, "validate");
            self.validator.validate(prompt, answer).await?
        };
        let findings = enrich_findings(report.findings, self.rules.as_ref());
        info!(
            thread_id = %id,
            output = %report.output,
            findings = findings.len(),
            "Validation finished"
        );
        self.progress.on_validated(id, report.output, findings.len());
        Ok(ValidationReport {
            output: report.output,
            findings,
        })
    }
}

fn current_report(thread: &Thread) -> ValidationReport {
    ValidationReport {
        output: thread.current_output.unwrap_or(ValidationKind::Valid),
        findings: thread.current_findings.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::ports::validation_gateway::ValidationError;
    use crate::use_cases::testing::{
        RecordingAudit, ScriptedGateway, ScriptedValidator, TestRepository, ambiguous, invalid,
        not_covered, report, satisfiable, valid,
    };
    use rewriter_domain::{
        Finding, PolicyDefinition, PolicyRule, TranslationDetails, ValidDetails,
    };

    // ==================== Fixtures ====================

    struct Harness {
        use_case: ProcessThreadUseCase<ScriptedGateway, ScriptedValidator>,
        gateway: Arc<ScriptedGateway>,
        validator: Arc<ScriptedValidator>,
        repository: Arc<TestRepository>,
        audit: Arc<RecordingAudit>,
    }

    fn harness(gateway: ScriptedGateway, validator: ScriptedValidator) -> Harness {
        let gateway = Arc::new(gateway);
        let validator = Arc::new(validator);
        let repository = Arc::new(TestRepository::default());
        let audit = Arc::new(RecordingAudit::default());
        let use_case = ProcessThreadUseCase::new(
            gateway.clone(),
            validator.clone(),
            repository.clone() as Arc<dyn ThreadRepository>,
        )
        .with_audit(audit.clone());
        Harness {
            use_case,
            gateway,
            validator,
            repository,
            audit,
        }
    }

    impl Harness {
        async fn ask(&self, prompt: &str) -> ThreadSnapshot {
            let thread = self.use_case.create_thread(prompt).unwrap();
            self.use_case.run(&thread.id).await.unwrap()
        }

        fn stored(&self, id: &ThreadId) -> Thread {
            self.repository.get(id).unwrap().unwrap()
        }
    }

    // ==================== Initial Pass Tests ====================

    #[tokio::test]
    async fn test_valid_initial_answer_completes() {
        let h = harness(
            ScriptedGateway::new(vec!["Contractors need a badge."]),
            ScriptedValidator::new(vec![valid()]),
        );

        let snapshot = h.ask("Do contractors need a badge?").await;

        assert_eq!(snapshot.status, ThreadStatus::Completed);
        assert_eq!(snapshot.iterations.len(), 1);
        assert_eq!(snapshot.iterations[0].llm_decision(), LlmDecision::Initial);
        assert_eq!(
            snapshot.final_response.as_deref(),
            Some("Contractors need a badge.")
        );
        assert!(snapshot.warning_message.is_none());
        assert_eq!(h.audit.events(), vec!["accepted:0"]);
    }

    #[tokio::test]
    async fn test_state_is_persisted() {
        let h = harness(
            ScriptedGateway::new(vec!["answer"]),
            ScriptedValidator::new(vec![valid()]),
        );
        let snapshot = h.ask("prompt").await;

        let stored = h.stored(&snapshot.thread_id);
        assert_eq!(stored.status, ThreadStatus::Completed);
        assert!(stored.completed_at.is_some());
        assert_eq!(stored.iterations.len(), 1);
    }

    #[tokio::test]
    async fn test_valid_with_uncovered_parts_warns() {
        let h = harness(
            ScriptedGateway::new(vec!["answer"]),
            ScriptedValidator::new(vec![report(vec![
                Finding::Valid(ValidDetails::default()),
                not_covered(),
            ])]),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Completed);
        assert_eq!(snapshot.warning_message.as_deref(), Some(NOT_COVERED_WARNING));
        assert_eq!(h.audit.events(), vec!["accepted:2"]);
    }

    #[tokio::test]
    async fn test_entirely_uncovered_completes_without_warning() {
        let h = harness(
            ScriptedGateway::new(vec!["answer"]),
            ScriptedValidator::new(vec![report(vec![not_covered(), not_covered()])]),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Completed);
        assert!(snapshot.warning_message.is_none());
        assert_eq!(snapshot.iteration_counter, 0);
        assert_eq!(h.gateway.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_too_complex_is_fatal() {
        let h = harness(
            ScriptedGateway::new(vec!["answer"]),
            ScriptedValidator::new(vec![report(vec![Finding::TooComplex(
                TranslationDetails::default(),
            )])]),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Error);
        assert_eq!(snapshot.final_response.as_deref(), Some(TOO_COMPLEX_MESSAGE));
        assert!(h.audit.events().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_ends_in_error() {
        let h = harness(
            ScriptedGateway::failing(GatewayError::Timeout),
            ScriptedValidator::new(vec![]),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Error);
        assert!(
            snapshot
                .final_response
                .unwrap()
                .starts_with("An error occurred while processing your request:")
        );
        assert_eq!(h.validator.calls(), 0);
        assert!(h.audit.events().is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_ends_in_error() {
        let h = harness(
            ScriptedGateway::new(vec!["answer"]),
            ScriptedValidator::failing(ValidationError::Malformed("missing output".into())),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Error);
        assert!(snapshot.final_response.unwrap().contains("missing output"));
        assert!(snapshot.iterations.is_empty());
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let h = harness(ScriptedGateway::new(vec![]), ScriptedValidator::new(vec![]));
        let err = h.use_case.create_thread("  ").unwrap_err();
        assert!(matches!(err, ProcessThreadError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_run_unknown_thread() {
        let h = harness(ScriptedGateway::new(vec![]), ScriptedValidator::new(vec![]));
        let err = h.use_case.run(&ThreadId::new("missing")).await.unwrap_err();
        assert!(matches!(err, ProcessThreadError::ThreadNotFound(_)));
    }

    // ==================== Rewriting Loop Tests ====================

    #[tokio::test]
    async fn test_rewrite_until_valid() {
        let h = harness(
            ScriptedGateway::new(vec![
                "first answer",
                "DECISION: REWRITE\nANSWER: fixed answer",
            ]),
            ScriptedValidator::new(vec![report(vec![invalid("R1")]), valid()]),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Completed);
        assert_eq!(snapshot.final_response.as_deref(), Some("fixed answer"));
        assert_eq!(snapshot.iteration_counter, 1);
        assert_eq!(snapshot.iterations.len(), 2);

        let rewrite = &snapshot.iterations[1];
        assert_eq!(rewrite.number, 1);
        assert_eq!(rewrite.original_answer, "first answer");
        assert_eq!(rewrite.rewritten_answer, "fixed answer");
        assert_eq!(rewrite.llm_decision(), LlmDecision::Rewrite);
        assert_eq!(rewrite.validation_output(), Some(ValidationKind::Valid));

        let stored = h.stored(&snapshot.thread_id);
        assert_eq!(
            stored.iteration_summaries,
            vec!["Iteration 1: VALID (REWRITE) - 0 finding(s)"]
        );
    }

    #[tokio::test]
    async fn test_ambiguous_finding_is_addressed_first() {
        let h = harness(
            ScriptedGateway::new(vec![
                "first answer",
                "DECISION: REWRITE\nANSWER: disambiguated",
                "DECISION: REWRITE\nANSWER: compliant",
            ]),
            ScriptedValidator::new(vec![
                report(vec![invalid("INVALID-RULE"), ambiguous()]),
                report(vec![invalid("INVALID-RULE")]),
                valid(),
            ]),
        );

        let snapshot = h.ask("prompt").await;
        assert_eq!(snapshot.status, ThreadStatus::Completed);

        let prompts = h.gateway.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[1].contains("Finding 1: TRANSLATION_AMBIGUOUS"));
        assert!(!prompts[1].contains("INVALID-RULE"));
        assert!(prompts[2].contains("INVALID-RULE"));

        let first = match &snapshot.iterations[1].kind {
            IterationKind::ArFeedback(data) => data.processed_finding_index,
            _ => panic!("expected AR feedback"),
        };
        assert_eq!(first, Some(0));
    }

    #[tokio::test]
    async fn test_untranslated_findings_are_never_rewritten() {
        let h = harness(
            ScriptedGateway::new(vec!["first", "DECISION: REWRITE\nANSWER: second"]),
            ScriptedValidator::new(vec![
                report(vec![invalid("R1")]),
                report(vec![Finding::NoTranslations(TranslationDetails::default())]),
            ]),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Completed);
        assert_eq!(snapshot.final_response.as_deref(), Some("second"));
        assert_eq!(snapshot.iteration_counter, 1);
        assert_eq!(h.gateway.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_rewrite_prompt_carries_enriched_rule() {
        let definition = PolicyDefinition {
            version: "1.0".to_string(),
            rules: vec![PolicyRule {
                id: "R1".to_string(),
                expression: "(=> contractor badge)".to_string(),
                alternate_expression: "Contractors must carry a badge".to_string(),
                description: String::new(),
            }],
            variables: vec![],
        };
        let h = harness(
            ScriptedGateway::new(vec!["first", "DECISION: REWRITE\nANSWER: second"]),
            ScriptedValidator::new(vec![report(vec![invalid("R1")]), valid()]),
        );
        let use_case = h
            .use_case
            .clone()
            .with_rules(Arc::new(RuleIndex::from_definition(&definition)));

        let thread = use_case.create_thread("prompt").unwrap();
        use_case.run(&thread.id).await.unwrap();

        let prompts = h.gateway.prompts();
        assert!(prompts[1].contains("Contractors must carry a badge"));
    }

    #[tokio::test]
    async fn test_budget_exhaustion_warns_after_max_rewrites() {
        let h = harness(
            ScriptedGateway::new(vec!["first"]),
            ScriptedValidator::with_fallback(vec![], report(vec![invalid("R1")])),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Completed);
        assert_eq!(snapshot.iteration_counter, 5);
        assert_eq!(snapshot.iterations.len(), 6);
        let warning = snapshot.warning_message.unwrap();
        assert!(warning.contains("maximum iteration limit (5)"));
        // initial + 5 rewrites
        assert_eq!(h.gateway.prompts().len(), 6);
        assert_eq!(h.audit.events(), vec!["budget:5:INVALID"]);
    }

    #[tokio::test]
    async fn test_budget_respects_params() {
        let h = harness(
            ScriptedGateway::new(vec!["first"]),
            ScriptedValidator::with_fallback(vec![], report(vec![invalid("R1")])),
        );
        let use_case = h
            .use_case
            .clone()
            .with_params(RewriteParams::default().with_max_iterations(2));

        let thread = use_case.create_thread("prompt").unwrap();
        let snapshot = use_case.run(&thread.id).await.unwrap();

        assert_eq!(snapshot.max_iterations, 2);
        assert_eq!(snapshot.iteration_counter, 2);
        assert_eq!(snapshot.iterations.len(), 3);
    }

    #[tokio::test]
    async fn test_zero_budget_never_rewrites() {
        let h = harness(
            ScriptedGateway::new(vec!["first"]),
            ScriptedValidator::new(vec![report(vec![invalid("R1")])]),
        );
        let use_case = h
            .use_case
            .clone()
            .with_params(RewriteParams::default().with_max_iterations(0));

        let thread = use_case.create_thread("prompt").unwrap();
        let snapshot = use_case.run(&thread.id).await.unwrap();

        assert_eq!(snapshot.status, ThreadStatus::Completed);
        assert!(snapshot.warning_message.is_some());
        assert_eq!(h.gateway.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_impossible_decision_returns_explanation() {
        let h = harness(
            ScriptedGateway::new(vec![
                "first",
                "DECISION: IMPOSSIBLE\nThe premises contradict each other.",
            ]),
            ScriptedValidator::new(vec![report(vec![invalid("R1")])]),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Completed);
        assert_eq!(
            snapshot.final_response.as_deref(),
            Some("The premises contradict each other.")
        );
        let last = snapshot.iterations.last().unwrap();
        assert_eq!(last.llm_decision(), LlmDecision::Impossible);
        assert_eq!(last.validation_output(), Some(ValidationKind::Impossible));
        // no re-validation after an IMPOSSIBLE decision
        assert_eq!(h.validator.calls(), 1);
        assert_eq!(h.audit.events().len(), 1);
    }

    #[tokio::test]
    async fn test_too_complex_after_rewrite_is_fatal() {
        let h = harness(
            ScriptedGateway::new(vec!["first", "DECISION: REWRITE\nANSWER: second"]),
            ScriptedValidator::new(vec![
                report(vec![invalid("R1")]),
                report(vec![Finding::TooComplex(TranslationDetails::default())]),
            ]),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Error);
        assert_eq!(snapshot.final_response.as_deref(), Some(TOO_COMPLEX_MESSAGE));
        assert_eq!(snapshot.iterations.len(), 2);
    }

    #[tokio::test]
    async fn test_ask_questions_without_questions_is_a_rewrite() {
        let h = harness(
            ScriptedGateway::new(vec!["first", "DECISION: ASK_QUESTIONS\nnothing to ask"]),
            ScriptedValidator::new(vec![report(vec![invalid("R1")]), valid()]),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Completed);
        assert_eq!(snapshot.iterations[1].llm_decision(), LlmDecision::Rewrite);
        assert_eq!(h.validator.calls(), 2);
    }

    // ==================== Clarification Tests ====================

    const TWO_QUESTIONS: &str = "I need more detail.\nQUESTION: Is the contractor on site?\nQUESTION: Is the visit longer than a day?";

    #[tokio::test]
    async fn test_initial_answer_with_questions_pauses() {
        let h = harness(
            ScriptedGateway::new(vec![TWO_QUESTIONS]),
            ScriptedValidator::new(vec![report(vec![satisfiable()])]),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::AwaitingUserInput);
        assert_eq!(snapshot.iterations.len(), 2);
        assert_eq!(snapshot.pending_questions.as_ref().unwrap().len(), 2);
        match &snapshot.iterations[1].kind {
            IterationKind::UserClarification(data) => {
                assert!(data.qa_exchange.answers.is_none());
                assert!(!data.qa_exchange.skipped);
            }
            _ => panic!("expected a clarification iteration"),
        }
        assert_eq!(snapshot.iteration_counter, 0);
        assert!(h.stored(&snapshot.thread_id).awaiting_input_since.is_some());
    }

    #[tokio::test]
    async fn test_questions_ignored_when_kind_disallows_them() {
        let h = harness(
            ScriptedGateway::new(vec![TWO_QUESTIONS, "DECISION: REWRITE\nANSWER: fixed"]),
            ScriptedValidator::new(vec![report(vec![invalid("R1")]), valid()]),
        );

        let snapshot = h.ask("prompt").await;

        assert_eq!(snapshot.status, ThreadStatus::Completed);
        assert!(!snapshot.iterations.iter().any(|it| it.is_clarification()));
    }

    #[tokio::test]
    async fn test_rewrite_asking_questions_pauses_then_resumes() {
        let h = harness(
            ScriptedGateway::new(vec![
                "first",
                "DECISION: ASK_QUESTIONS\nQUESTION: Which site?",
                "clarified answer",
            ]),
            ScriptedValidator::new(vec![report(vec![ambiguous()]), valid()]),
        );

        let paused = h.ask("prompt").await;
        assert_eq!(paused.status, ThreadStatus::AwaitingUserInput);
        assert_eq!(paused.iteration_counter, 1);

        let done = h
            .use_case
            .resume(&paused.thread_id, vec!["Site B".to_string()], false)
            .await
            .unwrap();

        assert_eq!(done.status, ThreadStatus::Completed);
        assert_eq!(done.final_response.as_deref(), Some("clarified answer"));
        assert_eq!(done.iterations.len(), 2);

        let prompts = h.gateway.prompts();
        assert!(prompts[2].contains("Q: Which site?"));
        assert!(prompts[2].contains("A: Site B"));

        let stored = h.stored(&done.thread_id);
        assert_eq!(stored.all_clarifications.len(), 1);
        match &stored.iterations[1].kind {
            IterationKind::UserClarification(data) => {
                assert_eq!(
                    data.qa_exchange.answers.as_deref(),
                    Some(&["Site B".to_string()][..])
                );
                assert_eq!(data.validation_output, Some(ValidationKind::Valid));
                assert!(data.context_augmentation.is_some());
            }
            _ => panic!("expected a clarification iteration"),
        }
        assert_eq!(stored.iterations[1].rewritten_answer, "clarified answer");
    }

    #[tokio::test]
    async fn test_skip_resume_uses_skip_prompt() {
        let h = harness(
            ScriptedGateway::new(vec![TWO_QUESTIONS, "best effort answer"]),
            ScriptedValidator::new(vec![report(vec![satisfiable()]), valid()]),
        );
        let paused = h.ask("prompt").await;

        let done = h
            .use_case
            .resume(&paused.thread_id, vec![], true)
            .await
            .unwrap();

        assert_eq!(done.status, ThreadStatus::Completed);
        let stored = h.stored(&done.thread_id);
        assert!(stored.all_clarifications.is_empty());
        match &stored.iterations[1].kind {
            IterationKind::UserClarification(data) => {
                assert!(data.qa_exchange.skipped);
                assert!(data.context_augmentation.is_none());
            }
            _ => panic!("expected a clarification iteration"),
        }
        assert!(!h.gateway.prompts()[1].contains("Q: Is the contractor on site?"));
    }

    #[tokio::test]
    async fn test_blank_answers_resume_like_a_skip() {
        let h = harness(
            ScriptedGateway::new(vec![TWO_QUESTIONS, "best effort answer"]),
            ScriptedValidator::new(vec![report(vec![satisfiable()]), valid()]),
        );
        let paused = h.ask("prompt").await;

        let done = h
            .use_case
            .resume(&paused.thread_id, vec!["  ".into(), String::new()], false)
            .await
            .unwrap();

        assert_eq!(done.status, ThreadStatus::Completed);
        let stored = h.stored(&done.thread_id);
        let expected = h
            .use_case
            .renderer
            .clarification_skipped("prompt", &stored.iterations[1].original_answer);
        assert_eq!(h.gateway.prompts()[1], expected);
        match &stored.iterations[1].kind {
            IterationKind::UserClarification(data) => {
                assert!(!data.qa_exchange.skipped);
                assert!(data.context_augmentation.is_none());
            }
            _ => panic!("expected a clarification iteration"),
        }
    }

    #[tokio::test]
    async fn test_resume_continues_rewriting_with_remaining_budget() {
        let h = harness(
            ScriptedGateway::new(vec![TWO_QUESTIONS, "still wrong"]),
            ScriptedValidator::with_fallback(
                vec![report(vec![satisfiable()])],
                report(vec![invalid("R1")]),
            ),
        );
        let use_case = h
            .use_case
            .clone()
            .with_params(RewriteParams::default().with_max_iterations(2));
        let thread = use_case.create_thread("prompt").unwrap();
        let paused = use_case.run(&thread.id).await.unwrap();

        let done = use_case
            .resume(&paused.thread_id, vec!["yes".into(), "no".into()], false)
            .await
            .unwrap();

        assert_eq!(done.status, ThreadStatus::Completed);
        assert_eq!(done.iteration_counter, 2);
        assert!(done.warning_message.is_some());
        // initial + clarification + 2 rewrites
        assert_eq!(done.iterations.len(), 4);
    }

    #[tokio::test]
    async fn test_answer_count_mismatch_leaves_thread_paused() {
        let h = harness(
            ScriptedGateway::new(vec![TWO_QUESTIONS]),
            ScriptedValidator::new(vec![report(vec![satisfiable()])]),
        );
        let paused = h.ask("prompt").await;
        let before = h.stored(&paused.thread_id);

        let err = h
            .use_case
            .resume(&paused.thread_id, vec!["only one".to_string()], false)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessThreadError::AnswerCountMismatch {
                expected: 2,
                actual: 1
            }
        ));
        assert_eq!(h.stored(&paused.thread_id), before);
        assert_eq!(h.gateway.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_double_submission_is_rejected() {
        let h = harness(
            ScriptedGateway::new(vec![TWO_QUESTIONS, "answer"]),
            ScriptedValidator::new(vec![report(vec![satisfiable()]), valid()]),
        );
        let paused = h.ask("prompt").await;

        let claimed = h
            .use_case
            .begin_resume(&paused.thread_id, &[], true)
            .unwrap();
        assert_eq!(claimed.status, ThreadStatus::Processing);

        let second = h.use_case.begin_resume(&paused.thread_id, &[], true);
        assert!(matches!(
            second,
            Err(ProcessThreadError::InvalidThreadState {
                actual: ThreadStatus::Processing,
                ..
            })
        ));

        let done = h
            .use_case
            .continue_resume(claimed, vec![], true)
            .await
            .unwrap();
        assert_eq!(done.status, ThreadStatus::Completed);

        let after = h.stored(&paused.thread_id);
        let third = h.use_case.resume(&paused.thread_id, vec![], true).await;
        assert!(matches!(
            third,
            Err(ProcessThreadError::InvalidThreadState {
                actual: ThreadStatus::Completed,
                ..
            })
        ));
        assert_eq!(h.stored(&paused.thread_id), after);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_thread_in_error() {
        let h = harness(
            ScriptedGateway::new(vec!["answer"]),
            ScriptedValidator::new(vec![valid()]),
        );
        let thread = h.use_case.create_thread("prompt").unwrap();
        h.repository.fail_next_saves(1);

        let result = h.use_case.run(&thread.id).await;

        assert!(matches!(result, Err(ProcessThreadError::Repository(_))));
        assert_eq!(h.stored(&thread.id).status, ThreadStatus::Error);
    }

    #[tokio::test]
    async fn test_failed_save_after_resume_leaves_thread_in_error() {
        let h = harness(
            ScriptedGateway::new(vec![TWO_QUESTIONS, "clarified answer"]),
            ScriptedValidator::new(vec![report(vec![satisfiable()]), valid()]),
        );
        let paused = h.ask("prompt").await;
        h.repository.fail_next_saves(1);

        let result = h
            .use_case
            .resume(&paused.thread_id, vec!["yes".into(), "no".into()], false)
            .await;

        assert!(result.is_err());
        let stored = h.stored(&paused.thread_id);
        assert_eq!(stored.status, ThreadStatus::Error);
        assert!(stored.pending_questions().is_none());
    }

    #[tokio::test]
    async fn test_resume_unknown_thread() {
        let h = harness(ScriptedGateway::new(vec![]), ScriptedValidator::new(vec![]));
        let err = h
            .use_case
            .resume(&ThreadId::new("missing"), vec![], true)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessThreadError::ThreadNotFound(_)));
    }

    #[tokio::test]
    async fn test_resume_generation_failure_ends_in_error() {
        let h = harness(
            ScriptedGateway::new(vec![TWO_QUESTIONS]),
            ScriptedValidator::new(vec![report(vec![satisfiable()])]),
        );
        let paused = h.ask("prompt").await;
        h.gateway
            .replies
            .lock()
            .unwrap()
            .push_back(Err(GatewayError::ConnectionError("reset".into())));

        let snapshot = h
            .use_case
            .resume(&paused.thread_id, vec![], true)
            .await
            .unwrap();

        assert_eq!(snapshot.status, ThreadStatus::Error);
        assert!(snapshot.final_response.unwrap().contains("reset"));
    }
}
