//! CLI entrypoint for llm-relay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use futures::StreamExt;
use relay_application::{
    ContinuationParams, ContinuationProgress, ExclusionStore, GenerateUseCase, GenerationOutcome,
    MergeEvent, NoProgress, NoSessionLogger, ProviderSelector, SessionLogger,
};
use relay_domain::{Message, Model, ProviderId};
use relay_infrastructure::{
    ConfigLoader, FileConfig, JsonFileExclusionStore, JsonlSessionLogger, MemoryExclusionStore,
    StaticProviderCatalog,
};
use relay_presentation::{
    Cli, Command, ConsoleFormatter, ExclusionCommand, GenerateArgs, OutputFormat,
    ProgressReporter, SimpleProgress,
};
use std::io::{IsTerminal, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting llm-relay");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_ref()) {
            println!("{}", line);
        }
        println!();
        println!("{}", toml::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    let Some(command) = cli.command.as_ref() else {
        bail!("No command given. Run `llm-relay --help` for usage.");
    };

    // === Dependency Injection ===
    let exclusions = exclusion_store(&config);

    match command {
        Command::Exclusions { action } => run_exclusions(exclusions.as_ref(), action),
        Command::Providers { model } => {
            let catalog = Arc::new(StaticProviderCatalog::from_config(&config)?);
            let selector = ProviderSelector::new(catalog, exclusions);
            let model = model.as_deref().map(Model::from_name).unwrap_or_default();
            let snapshot = selector.exclusion_snapshot()?;
            print!(
                "{}",
                ConsoleFormatter::format_rankings(&model, &selector.ranked(Some(&model), &snapshot))
            );
            Ok(())
        }
        Command::Generate(args) => {
            let catalog = Arc::new(StaticProviderCatalog::from_config(&config)?);
            if catalog.is_empty() {
                bail!("No providers configured. Add a [[providers]] table to your config file.");
            }
            let selector = Arc::new(ProviderSelector::new(catalog, exclusions));
            let params = continuation_params(&cli, &config);
            let use_case = GenerateUseCase::with_logger(selector, params, session_logger(&config));
            run_generate(&use_case, args).await
        }
    }
}

/// Initialize tracing: `-v` count picks the level, `RUST_LOG` overrides it.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .init();
            Ok(None)
        }
    }
}

/// File config with command-line overrides applied.
fn continuation_params(cli: &Cli, config: &FileConfig) -> ContinuationParams {
    let mut params = config.continuation.to_params();
    if cli.disable_auto_continue {
        params = params.with_auto_continue(false);
    }
    if let Some(model) = &cli.completion_model {
        params = params.with_completion_model(Model::from_name(model));
    }
    if let Some(attempts) = cli.continuation_attempts {
        params = params.with_continuation_attempts(attempts);
    }
    if let Some(policy) = cli.detection_policy {
        params = params.with_policy(policy);
    }
    debug!("Continuation parameters: {:?}", params);
    params
}

fn exclusion_store(config: &FileConfig) -> Arc<dyn ExclusionStore> {
    match config.exclusions.resolve_path() {
        Some(path) => {
            debug!("Exclusion list: {}", path.display());
            Arc::new(JsonFileExclusionStore::open(path))
        }
        None => {
            warn!("No config directory available; exclusions will not persist");
            Arc::new(MemoryExclusionStore::new())
        }
    }
}

fn session_logger(config: &FileConfig) -> Arc<dyn SessionLogger> {
    config
        .logging
        .session_log
        .as_ref()
        .and_then(JsonlSessionLogger::open)
        .map(|logger| Arc::new(logger) as Arc<dyn SessionLogger>)
        .unwrap_or_else(|| Arc::new(NoSessionLogger))
}

fn run_exclusions(store: &dyn ExclusionStore, action: &ExclusionCommand) -> Result<()> {
    match action {
        ExclusionCommand::Add { ids } => {
            for id in parse_ids(ids)? {
                if !store.add(&id)? {
                    eprintln!("{} is already excluded", id);
                }
            }
        }
        ExclusionCommand::Remove { ids } => {
            for id in parse_ids(ids)? {
                if !store.remove(&id)? {
                    eprintln!("{} was not excluded", id);
                }
            }
        }
        ExclusionCommand::Clear => store.clear()?,
        ExclusionCommand::List => {}
    }
    print!("{}", ConsoleFormatter::format_exclusions(&store.list()?));
    Ok(())
}

fn parse_ids(ids: &[String]) -> Result<Vec<ProviderId>> {
    ids.iter()
        .map(|id| ProviderId::new(id.as_str()).map_err(anyhow::Error::from))
        .collect()
}

async fn run_generate(use_case: &GenerateUseCase, args: &GenerateArgs) -> Result<()> {
    let prompt = match &args.prompt {
        Some(prompt) => prompt.clone(),
        None => read_stdin_prompt()?,
    };

    let mut messages = Vec::new();
    if let Some(system) = &args.system {
        messages.push(Message::system(system.as_str()));
    }
    messages.push(Message::user(prompt));

    let model = args.model.as_deref().map(Model::from_name).unwrap_or_default();
    let mut request = use_case
        .params()
        .request(model, messages)
        .with_stream(args.stream);
    if let Some(provider) = &args.provider {
        request = request.with_provider(ProviderId::new(provider.as_str())?);
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping generation");
            ctrl_c.cancel();
        }
    });

    let outcome = if args.stream {
        let progress: Arc<dyn ContinuationProgress> = if args.quiet {
            Arc::new(NoProgress)
        } else {
            Arc::new(SimpleProgress)
        };
        stream_to_stdout(use_case, request, &cancel, progress, args.output).await?
    } else {
        let outcome = if args.quiet || !std::io::stderr().is_terminal() {
            use_case.execute(request, &cancel).await?
        } else {
            let progress = ProgressReporter::new();
            use_case
                .execute_with_progress(request, &cancel, &progress)
                .await?
        };
        match args.output {
            OutputFormat::Text => print!("{}", ConsoleFormatter::format_text(&outcome)),
            OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&outcome)),
        }
        outcome
    };

    if !args.quiet && args.output == OutputFormat::Text {
        eprintln!("{}", ConsoleFormatter::format_summary(&outcome));
    }
    if let Some(notice) = ConsoleFormatter::incomplete_notice(&outcome) {
        eprintln!("{}", notice);
    }
    Ok(())
}

/// Print chunks as they arrive; JSON output prints only the final outcome.
async fn stream_to_stdout(
    use_case: &GenerateUseCase,
    request: relay_domain::GenerationRequest,
    cancel: &CancellationToken,
    progress: Arc<dyn ContinuationProgress>,
    output: OutputFormat,
) -> Result<GenerationOutcome> {
    let mut stream = use_case.stream(request, cancel, progress)?;
    let mut stdout = std::io::stdout();

    while let Some(event) = stream.next().await {
        match event {
            MergeEvent::Chunk(text) => {
                if output == OutputFormat::Text {
                    stdout.write_all(text.as_bytes())?;
                    stdout.flush()?;
                }
            }
            MergeEvent::Finished(outcome) => {
                match output {
                    OutputFormat::Text => {
                        if !outcome.text.ends_with('\n') {
                            writeln!(stdout)?;
                        }
                    }
                    OutputFormat::Json => {
                        writeln!(stdout, "{}", ConsoleFormatter::format_json(&outcome))?
                    }
                }
                return Ok(outcome);
            }
            MergeEvent::Failed(e) => return Err(e.into()),
        }
    }
    bail!("Generation stream ended without a result")
}

fn read_stdin_prompt() -> Result<String> {
    if std::io::stdin().is_terminal() {
        bail!("No prompt given. Pass it as an argument or pipe it on stdin.");
    }
    let mut prompt = String::new();
    std::io::stdin()
        .read_to_string(&mut prompt)
        .context("Failed to read prompt from stdin")?;
    let prompt = prompt.trim().to_string();
    if prompt.is_empty() {
        bail!("The prompt read from stdin is empty");
    }
    Ok(prompt)
}
