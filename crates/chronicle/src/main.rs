//! Chronicle - Changelog generator for conventional commits

mod cli;
mod exit_codes;
mod pipeline;

use std::path::PathBuf;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::output::output_error;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    let log_guard = init_tracing(verbose);

    let code = match cli.execute() {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => output_error(&err, verbose),
    };

    // process::exit skips destructors
    drop(log_guard);
    std::process::exit(code);
}

/// Install the stderr layer and, when a log directory is available, a
/// debug-level JSON file layer rolled daily.
///
/// `RUST_LOG` overrides the stderr level, which otherwise shows engine
/// warnings only with `--verbose`.
fn init_tracing(verbose: bool) -> Option<WorkerGuard> {
    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "warn" } else { "error" }));

    let (file_layer, guard) = match log_directory() {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "chronicle.log"));
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(stderr_filter),
        )
        .with(file_layer)
        .init();

    guard
}

/// `~/.chronicle/logs`, created on demand
fn log_directory() -> Option<PathBuf> {
    let dir = dirs::home_dir()?.join(".chronicle").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
