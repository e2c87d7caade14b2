//! CLI entrypoint for policy-rewriter
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

#![cfg_attr(not(feature = "bedrock"), allow(dead_code, unused_imports))]

mod logging;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rewriter_application::{
    AwaitingInputSweeper, LlmGateway, ProcessThreadUseCase, RewriteParams, RewriteService,
    ThreadProgressNotifier, ThreadRepository, ValidationGateway,
};
use rewriter_domain::{
    PromptRenderer, RuleIndex, TemplateSet, ThreadId, ThreadSnapshot, ThreadStatus,
    format_policy_context,
};
use rewriter_infrastructure::{
    ConfigIssue, ConfigLoader, FileConfig, FileOutputFormat, FileStorageConfig,
    InMemoryThreadRepository, JsonFileThreadRepository, JsonlAuditSink, StorageBackend,
    load_policy_definition, load_template_overrides,
};
use rewriter_presentation::{
    AnswerArgs, AskArgs, ClarificationReply, Cli, Command, ConsoleFormatter,
    InteractiveClarification, OutputFormat, ProgressReporter, SimpleProgress,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Commands that need the generation and validation services.
enum RewriteCommand {
    Ask(AskArgs),
    Answer(AnswerArgs),
    Sweep { watch: bool },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(cli.verbose, cli.log_dir.as_deref());

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };

    if !config.output.color {
        colored::control::set_override(false);
    }

    let format = cli.format.unwrap_or(match config.output.format {
        FileOutputFormat::Text => OutputFormat::Text,
        FileOutputFormat::Json => OutputFormat::Json,
    });

    let Some(command) = cli.command else {
        bail!("No command given. Run `policy-rewriter --help` for usage.");
    };

    info!("Starting policy-rewriter");

    let repository = open_repository(&config.storage)?;

    let command = match command {
        Command::Show { thread_id } => {
            return show_thread(repository.as_ref(), &thread_id, format, cli.quiet);
        }
        Command::Ask(args) => RewriteCommand::Ask(args),
        Command::Answer(args) => RewriteCommand::Answer(args),
        Command::Sweep { watch } => RewriteCommand::Sweep { watch },
    };

    check_config(&config.validate())?;

    let opts = RunOptions {
        format,
        quiet: cli.quiet,
    };
    run_rewrite_command(command, &config, repository, opts).await
}

#[derive(Clone, Copy)]
struct RunOptions {
    format: OutputFormat,
    quiet: bool,
}

fn open_repository(storage: &FileStorageConfig) -> Result<Arc<dyn ThreadRepository>> {
    match storage.backend {
        StorageBackend::File => {
            let dir = storage.resolved_threads_dir();
            let repository = JsonFileThreadRepository::open(&dir)
                .with_context(|| format!("Failed to open thread storage {}", dir.display()))?;
            Ok(Arc::new(repository))
        }
        StorageBackend::Memory => Ok(Arc::new(InMemoryThreadRepository::new())),
    }
}

/// Log every issue; fail if any of them is an error.
fn check_config(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        if issue.is_error() {
            error!("{}", issue);
        } else {
            warn!("{}", issue);
        }
    }
    let errors = issues.iter().filter(|issue| issue.is_error()).count();
    if errors > 0 {
        bail!(
            "Invalid configuration ({} error(s)); run with --show-config to see which files are loaded",
            errors
        );
    }
    Ok(())
}

fn show_thread(
    repository: &dyn ThreadRepository,
    thread_id: &str,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let id = ThreadId::from(thread_id);
    let thread = repository
        .get(&id)
        .context("Failed to read thread")?
        .with_context(|| format!("Thread {} not found", id))?;
    print_snapshot(&ThreadSnapshot::from(&thread), format, quiet);
    Ok(())
}

#[cfg(feature = "bedrock")]
async fn run_rewrite_command(
    command: RewriteCommand,
    config: &FileConfig,
    repository: Arc<dyn ThreadRepository>,
    opts: RunOptions,
) -> Result<()> {
    use rewriter_infrastructure::providers::bedrock::load_client;
    use rewriter_infrastructure::{BedrockGenerationGateway, BedrockGuardrailValidator};

    let client = load_client(&config.bedrock).await;
    let generator = Arc::new(BedrockGenerationGateway::new(
        client.clone(),
        &config.model,
        &config.bedrock,
    ));
    let validator = Arc::new(
        BedrockGuardrailValidator::new(client, &config.guardrail)
            .context("Guardrail is not configured")?,
    );

    let progress: Option<Arc<dyn ThreadProgressNotifier>> = match &command {
        _ if opts.quiet => None,
        RewriteCommand::Sweep { watch: true } => Some(Arc::new(SimpleProgress)),
        _ => Some(Arc::new(ProgressReporter::new())),
    };

    let service = build_service(generator, validator, repository, config, progress)?;
    dispatch(&service, command, &config.rewrite.to_params(), opts).await
}

#[cfg(not(feature = "bedrock"))]
async fn run_rewrite_command(
    _command: RewriteCommand,
    _config: &FileConfig,
    _repository: Arc<dyn ThreadRepository>,
    _opts: RunOptions,
) -> Result<()> {
    bail!("policy-rewriter was built without the `bedrock` feature; only `show` is available")
}

/// Assemble the rewrite service from configuration.
fn build_service<G, V>(
    generator: Arc<G>,
    validator: Arc<V>,
    repository: Arc<dyn ThreadRepository>,
    config: &FileConfig,
    progress: Option<Arc<dyn ThreadProgressNotifier>>,
) -> Result<RewriteService<G, V>>
where
    G: LlmGateway + 'static,
    V: ValidationGateway + 'static,
{
    let templates = match &config.templates.dir {
        Some(dir) => {
            let templates = load_template_overrides(dir)
                .with_context(|| format!("Failed to load prompt templates from {}", dir.display()))?;
            info!(overrides = templates.override_count(), "Loaded prompt templates");
            templates
        }
        None => TemplateSet::new(),
    };
    let mut renderer = PromptRenderer::new(templates);

    let mut use_case = ProcessThreadUseCase::new(generator, validator, repository)
        .with_params(config.rewrite.to_params());

    if let Some(path) = &config.policy.definition_path {
        let definition = load_policy_definition(path)?;
        let index = RuleIndex::from_definition(&definition);
        info!(rules = index.len(), path = %path.display(), "Loaded policy definition");
        renderer = renderer.with_policy_context(format_policy_context(&definition));
        use_case = use_case.with_rules(Arc::new(index));
    }
    use_case = use_case.with_renderer(renderer);

    if config.audit.enabled
        && let Some(sink) = JsonlAuditSink::new(config.audit.resolved_path())
    {
        info!(path = %sink.path().display(), "Audit logging enabled");
        use_case = use_case.with_audit(Arc::new(sink));
    }

    if let Some(progress) = progress {
        use_case = use_case.with_progress(progress);
    }

    Ok(RewriteService::new(use_case))
}

async fn dispatch<G, V>(
    service: &RewriteService<G, V>,
    command: RewriteCommand,
    params: &RewriteParams,
    opts: RunOptions,
) -> Result<()>
where
    G: LlmGateway + 'static,
    V: ValidationGateway + 'static,
{
    match command {
        RewriteCommand::Ask(args) if args.detach => {
            let id = service.submit(&args.prompt)?;
            println!("{}", id);
            // The worker runs on this process's runtime; let it reach a stop.
            service.shutdown().await;
        }
        RewriteCommand::Ask(args) => {
            let mut snapshot = service.run(&args.prompt).await?;
            if args.interactive {
                snapshot = clarify_interactively(service, snapshot).await?;
            }
            print_snapshot(&snapshot, opts.format, opts.quiet);
        }
        RewriteCommand::Answer(args) => {
            let id = ThreadId::from(args.thread_id);
            let snapshot = service.answer(&id, args.answers, args.skip).await?;
            print_snapshot(&snapshot, opts.format, opts.quiet);
        }
        RewriteCommand::Sweep { watch: false } => {
            let resumed = service.skip_stale(params.awaiting_input_timeout)?;
            service.shutdown().await;
            for id in &resumed {
                println!("{}", id);
            }
            info!(resumed = resumed.len(), "Sweep finished");
        }
        RewriteCommand::Sweep { watch: true } => {
            let token = CancellationToken::new();
            let sweeper = AwaitingInputSweeper::new(service.clone(), params, token.clone()).spawn();

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            info!("Shutting down");
            token.cancel();
            sweeper.await.context("Sweeper task failed")?;
            service.shutdown().await;
        }
    }
    Ok(())
}

/// Answer clarification rounds on the terminal until the thread stops
/// asking.
async fn clarify_interactively<G, V>(
    service: &RewriteService<G, V>,
    mut snapshot: ThreadSnapshot,
) -> Result<ThreadSnapshot>
where
    G: LlmGateway + 'static,
    V: ValidationGateway + 'static,
{
    while snapshot.status == ThreadStatus::AwaitingUserInput {
        let Some(questions) = snapshot.pending_questions.clone() else {
            break;
        };
        let reply = InteractiveClarification::stdio()
            .ask(&questions)
            .context("Failed to read answers")?;
        let (answers, skipped) = match reply {
            ClarificationReply::Answers(answers) => (answers, false),
            ClarificationReply::Skip => (Vec::new(), true),
        };
        snapshot = service.answer(&snapshot.thread_id, answers, skipped).await?;
    }
    Ok(snapshot)
}

fn print_snapshot(snapshot: &ThreadSnapshot, format: OutputFormat, quiet: bool) {
    let output = match format {
        OutputFormat::Json => ConsoleFormatter::format_json(snapshot),
        OutputFormat::Text if quiet => ConsoleFormatter::format_response_only(snapshot),
        OutputFormat::Text => ConsoleFormatter::format(snapshot),
    };
    println!("{}", output);
}
