use crate::api::HttpClient;
use crate::model::{ClientConfig, Language};
use crate::orchestrator::{ExecutionController, FilePersistenceClient, RunStatus};
use crate::session::Session;
use crate::text_summary::{build_listing_summary, build_run_summary, TextSummary};
use crate::theme::{ThemeMode, ThemeStore};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

/// Drain a summary through the writer and wait for it to finish.
async fn emit(summary: TextSummary) {
    let (tx, handle) = spawn_output_writer();
    for line in summary.stdout {
        let _ = tx.send(OutputLine::Stdout(line));
    }
    for line in summary.stderr {
        let _ = tx.send(OutputLine::Stderr(line));
    }
    drop(tx);
    let _ = handle.await;
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "playground-cli",
    version,
    about = "Terminal client for a remote code-execution playground"
)]
pub struct Cli {
    /// Root URL of the playground API
    #[arg(
        long,
        env = "PLAYGROUND_API_BASE_URL",
        default_value = "http://0.0.0.0:5000/api"
    )]
    pub base_url: String,

    /// Language sent with every execute request
    #[arg(long, value_enum, default_value = "python")]
    pub language: Language,

    /// Upper bound for one execute request
    #[arg(long, default_value = "30s")]
    pub request_timeout: humantime::Duration,

    /// Upper bound for list/save/load/delete/health requests
    #[arg(long, default_value = "10s")]
    pub file_timeout: humantime::Duration,

    /// Where the light/dark preference is persisted
    #[arg(long)]
    pub theme_file: Option<PathBuf>,

    /// Load this remote file into the editor on launch
    #[arg(long, conflicts_with_all = ["exec", "list"])]
    pub open: Option<String>,

    /// Run a local file once and exit (no TUI); `-` reads from stdin
    #[arg(long, value_name = "PATH", conflicts_with = "list")]
    pub exec: Option<PathBuf>,

    /// File whose contents are passed to the program as stdin (with --exec)
    #[arg(long, value_name = "PATH", requires = "exec")]
    pub stdin_file: Option<PathBuf>,

    /// Print the run result as JSON (with --exec)
    #[arg(long, requires = "exec")]
    pub json: bool,

    /// Print the saved files and exit (no TUI)
    #[arg(long)]
    pub list: bool,
}

pub async fn run(args: Cli) -> Result<ExitCode> {
    if let Some(path) = args.exec.as_deref() {
        return run_exec(&args, path).await;
    }
    if args.list {
        return run_list(&args).await;
    }

    #[cfg(feature = "tui")]
    {
        crate::tui::run(args).await?;
        Ok(ExitCode::SUCCESS)
    }
    #[cfg(not(feature = "tui"))]
    {
        Err(anyhow::anyhow!(
            "built without TUI support; use --exec <PATH> or --list"
        ))
    }
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        base_url: args.base_url.clone(),
        language: args.language,
        request_timeout: Duration::from(args.request_timeout),
        file_timeout: Duration::from(args.file_timeout),
        user_agent: format!("playground-cli/{}", env!("CARGO_PKG_VERSION")),
        theme_path: args
            .theme_file
            .clone()
            .unwrap_or_else(ThemeStore::default_path),
    }
}

async fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin()))
            .await
            .context("stdin reader task failed")?
            .context("failed to read code from stdin");
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

async fn run_exec(args: &Cli, path: &Path) -> Result<ExitCode> {
    let cfg = build_config(args);
    let client = Arc::new(HttpClient::new(&cfg)?);

    let code = read_source(path).await?;
    let input = match args.stdin_file.as_deref() {
        Some(p) => tokio::fs::read_to_string(p)
            .await
            .with_context(|| format!("failed to read {}", p.display()))?,
        None => String::new(),
    };

    let mut session = Session::new(cfg.language, ThemeMode::default());
    session.code.set_text(code);
    session.input.set_text(input);
    session.current_filename = Some(path.display().to_string());

    let mut controller = ExecutionController::new(client);
    let status = controller.run(&mut session).await;
    tracing::info!("one-shot run of {} ended: {status:?}", path.display());

    if args.json {
        let value = match session.result.as_ref() {
            Some(result) => serde_json::to_value(result)?,
            None => serde_json::json!({
                "status": "transport_error",
                "message": session.banner.clone().unwrap_or_default(),
            }),
        };
        let mut summary = TextSummary::default();
        summary.stdout.push(serde_json::to_string_pretty(&value)?);
        emit(summary).await;
    } else {
        emit(build_run_summary(&session)).await;
    }

    Ok(if status == RunStatus::Succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_list(args: &Cli) -> Result<ExitCode> {
    let cfg = build_config(args);
    let files = FilePersistenceClient::new(Arc::new(HttpClient::new(&cfg)?));
    match files.list().await {
        Ok(entries) => {
            emit(build_listing_summary(&entries)).await;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let mut summary = TextSummary::default();
            summary.stderr.push(e.to_string());
            emit(summary).await;
            Ok(ExitCode::FAILURE)
        }
    }
}
