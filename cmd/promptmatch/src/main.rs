//! promptmatch-api - HTTP service resolving document-processing requests to prompt ids.

mod logging;
mod server;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use promptmatch::config::mask_secret;
use promptmatch::{Config, PromptService};
use serde_json::{Value, json};
use tracing::info;

/// Default listen address.
const DEFAULT_ADDR: &str = ":5000";

/// Prompt matching API.
///
/// Matches a (situation, level, file type) request to one of the configured
/// prompt templates and returns its id.
#[derive(Parser, Debug)]
#[command(name = "promptmatch-api")]
#[command(about = "Prompt matching API server")]
#[command(version)]
struct Cli {
    /// Config file overriding vocabularies and the criteria table (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Configuration profile: development, production or testing
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve(ServeArgs),
    /// Print the vocabularies and criteria table
    List,
    /// Diagnose a request and show how the API would answer it
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Listen address (e.g. :5000 or 127.0.0.1:8080)
    #[arg(long)]
    addr: Option<String>,

    /// Log level or filter directive, overrides LOG_LEVEL
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Request JSON; read from stdin when neither this nor --file is given
    request: Option<String>,

    /// Read the request JSON from a file
    #[arg(short = 'f', long = "file", conflicts_with = "request")]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = Config::from_env(cli.profile.as_deref(), cli.config.as_deref())
        .context("load configuration")?;

    match cli.command {
        None => serve(cfg, ServeArgs::default()).await,
        Some(Command::Serve(args)) => serve(cfg, args).await,
        Some(Command::List) => {
            list(&cfg);
            Ok(())
        }
        Some(Command::Check(args)) => check(cfg, args),
    }
}

async fn serve(mut cfg: Config, args: ServeArgs) -> Result<()> {
    if let Some(level) = args.log_level {
        cfg.log_level = level;
    }

    let _guard = logging::init(&cfg.log_level, cfg.log_file.as_deref())?;
    info!(
        profile = %cfg.profile,
        debug = cfg.profile.debug(),
        prompts = cfg.table.len(),
        secret_key = %mask_secret(&cfg.secret_key),
        "configuration loaded"
    );
    cfg.log_warnings();

    let addr = args.addr.as_deref().unwrap_or(DEFAULT_ADDR);
    server::start_server(addr, PromptService::new(Arc::new(cfg))).await
}

fn list(cfg: &Config) {
    println!("=== {} {} ({}) ===", cfg.api.title, cfg.api.version, cfg.profile);
    println!("situations: {}", cfg.vocabulary.situations.join(", "));
    println!("levels:     {}", cfg.vocabulary.levels.join(", "));
    println!("file_types: {}", cfg.vocabulary.file_types.join(", "));
    println!();

    let unreachable = cfg.unreachable_prompts();
    println!("=== Criteria ({}) ===", cfg.table.len());
    for c in cfg.table.entries() {
        let mark = if unreachable.iter().any(|u| u.id == c.id) {
            "  (unreachable)"
        } else {
            ""
        };
        println!(
            "  - {}: {} / {} / {}{}",
            c.id, c.situation, c.level, c.file_type, mark
        );
    }
}

fn check(cfg: Config, args: CheckArgs) -> Result<()> {
    let raw = match (args.request, args.file) {
        (Some(req), _) => req,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let svc = PromptService::new(Arc::new(cfg));

    let request: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            println!("invalid JSON: {}", e);
            println!("outcome: 400 {}", json!({ "error": "Invalid JSON format" }));
            return Ok(());
        }
    };

    let report = svc.inspect(&request);
    println!("{}", serde_json::to_string_pretty(&report)?);

    let outcome = match svc.process(&request) {
        Ok(id) => format!("200 {}", json!({ "matched_prompt": id, "status": "success" })),
        Err(e) => format!("400 {}", json!({ "error": e.message() })),
    };
    println!("outcome: {}", outcome);
    Ok(())
}
