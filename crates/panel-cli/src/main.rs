//! `panel` command line: run the generation pipeline, inspect traces

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use panel_core::{
    FileTraceStore, JsonFileLibrary, LibraryProvider, Orchestrator, PipelineConfig, RunContext,
    TraceId,
};
use panel_llm::HttpModelConfig;
use std::path::PathBuf;

const API_KEY_ENV: &str = "PANEL_MODEL_API_KEY";

fn cli() -> Command {
    Command::new("panel")
        .version(panel_core::VERSION)
        .about("Monitoring dashboard generation: requirements to reviewed layouts")
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("run")
                .about("Run the pipeline and the closed layout loop on a document")
                .arg(
                    Arg::new("document")
                        .long("document")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Requirement document (plain text)"),
                )
                .arg(
                    Arg::new("library")
                        .long("library")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Component library (JSON array)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Pipeline configuration (TOML)"),
                )
                .arg(
                    Arg::new("trace-dir")
                        .long("trace-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory for trace files"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the result JSON here instead of stdout"),
                )
                .arg(
                    Arg::new("model-url")
                        .long("model-url")
                        .help("Chat-completions endpoint base URL"),
                )
                .arg(
                    Arg::new("model-name")
                        .long("model-name")
                        .requires("model-url")
                        .help("Model name sent to the endpoint"),
                ),
        )
        .subcommand(
            Command::new("trace")
                .about("Print a stored trace")
                .arg(
                    Arg::new("trace-dir")
                        .long("trace-dir")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_parser(value_parser!(TraceId))
                        .help("Trace id (ULID)"),
                ),
        )
        .subcommand(Command::new("config").about("Print the default configuration as TOML"))
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

fn load_config(args: &ArgMatches) -> Result<PipelineConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = args.get_one::<PathBuf>("trace-dir") {
        config = config.with_trace_dir(dir);
    }
    if let Some(url) = args.get_one::<String>("model-url") {
        let mut model = HttpModelConfig {
            base_url: url.clone(),
            ..config.model.clone().unwrap_or_default()
        };
        if let Some(name) = args.get_one::<String>("model-name") {
            model.model = name.clone();
        }
        config = config.with_model(model);
    }
    if let (Some(model), Ok(key)) = (config.model.as_mut(), std::env::var(API_KEY_ENV)) {
        model.api_key = Some(key);
    }
    Ok(config)
}

async fn cmd_run(args: &ArgMatches) -> Result<()> {
    let document_path = args
        .get_one::<PathBuf>("document")
        .context("--document is required")?;
    let library_path = args
        .get_one::<PathBuf>("library")
        .context("--library is required")?;

    let document = tokio::fs::read_to_string(document_path)
        .await
        .with_context(|| format!("reading document {}", document_path.display()))?;
    let library = JsonFileLibrary::new(library_path)
        .library()
        .with_context(|| format!("reading library {}", library_path.display()))?;

    let orchestrator = Orchestrator::from_config(load_config(args)?)?;
    let mut ctx = RunContext::new().with_library(library);
    let (run, layouts) = orchestrator.run_end_to_end(&mut ctx, &document).await?;

    for warning in run.warnings.iter().chain(&layouts.warnings) {
        tracing::warn!("{warning}");
    }
    for page in &layouts.pages {
        tracing::info!(
            page_id = %page.page_id,
            issues = page.review.summary.total,
            changes = page.repair.changes.len(),
            regions = page.plan().regions.len(),
            "page laid out"
        );
    }

    let output = serde_json::to_string_pretty(&serde_json::json!({
        "pipeline": run,
        "layouts": layouts,
    }))?;
    match args.get_one::<PathBuf>("out") {
        Some(path) => {
            tokio::fs::write(path, output)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "result written");
        }
        None => println!("{output}"),
    }
    Ok(())
}

async fn cmd_trace(args: &ArgMatches) -> Result<()> {
    let dir = args
        .get_one::<PathBuf>("trace-dir")
        .context("--trace-dir is required")?;
    let id = *args.get_one::<TraceId>("id").context("--id is required")?;
    match FileTraceStore::new(dir).load_raw(id).await? {
        Some(trace) => {
            println!("{}", serde_json::to_string_pretty(&trace)?);
            Ok(())
        }
        None => anyhow::bail!("trace {id} not found in {}", dir.display()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json"));

    match matches.subcommand() {
        Some(("run", args)) => cmd_run(args).await,
        Some(("trace", args)) => cmd_trace(args).await,
        Some(("config", _)) => {
            print!("{}", PipelineConfig::default().to_toml_string()?);
            Ok(())
        }
        _ => Ok(()),
    }
}
