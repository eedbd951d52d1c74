//! authdemo - log in to the demo API and call its protected endpoints.
//!
//! Run with a command (`authdemo login alice`, `authdemo admin`) to execute
//! it once, or with no arguments for an interactive prompt. The session
//! survives restarts until `logout`.
//!
//! The prompt runs one command at a time and waits for its request to
//! settle before reading the next line. `all` is the command that puts
//! several independent requests in flight at once.

mod app;
mod commands;
mod render;

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, EnvFilter};

use authdemo_core::Config;

use app::{App, AppState};
use commands::Command;

// ============================================================================
// Constants
// ============================================================================

/// Log file name prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "authdemo";

const PROMPT: &str = "authdemo> ";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a daily file under the cache directory so they do not mix
/// with the prompt. Falls back to stderr when the file cannot be created.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = log_dir.and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix("log")
            .build(dir.join("logs"))
            .ok()
    });

    let (writer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(io::stderr), None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let log_dir = Config::default().cache_dir().ok();
    let _guard = init_tracing(log_dir.as_deref());
    info!("authdemo starting");

    let mut app = App::new()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return run_once(&mut app, &args.join(" ")).await;
    }

    render::banner(&app.config.server_url);
    render::panel(&app.session);
    let result = run_prompt(&mut app).await;

    if let Err(ref e) = result {
        error!(error = %e, "Prompt loop failed");
    }
    info!("authdemo shutting down");
    result
}

async fn run_once(app: &mut App, line: &str) -> Result<()> {
    let command: Command = line.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    app.execute(command).await
}

async fn run_prompt(app: &mut App) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            // EOF
            println!();
            return Ok(());
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if let Err(e) = app.execute(command).await {
                    error!(error = %e, "Command failed");
                    eprintln!("Error: {}", e);
                }
            }
            Err(e) => eprintln!("{}", e),
        }

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
