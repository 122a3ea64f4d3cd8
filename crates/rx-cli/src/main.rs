//! CLI entry point for rxwatch.
//!
//! Watches a directory tree and, whenever a file in it is written, prints
//! every match of a configured regex found in that file.
//!
//! # Usage
//!
//! ```bash
//! # Discover config.yaml in the current directory, then in $HOME
//! rxwatch
//!
//! # Use an explicit configuration file
//! rxwatch --config ./watch.yaml
//!
//! # Override the file values from the environment
//! FOLDERTOWATCH=./inbox REGEXPATTERN='\w+\d+' rxwatch -v
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::ffi::OsString;
use std::io::{self, Write};

use camino::Utf8PathBuf;
use clap::Parser;
use color_eyre::config::{HookBuilder, Theme};
use rx_core::{Config, WatchSettings};
use rx_watcher::{EventLoop, TreeWatcher, WatchError, shutdown};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Watch a directory tree and print regex matches from written files.
///
/// Settings come from `config.yaml` (keys `folderToWatch`, `regexPattern`,
/// `followNewDirs`), looked up in the current directory and then the home
/// directory.
#[derive(Debug, Parser)]
#[command(name = "rxwatch", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (skips discovery).
    #[arg(short, long, env = "RXWATCH_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored log and error report output.
    #[arg(long)]
    no_color: bool,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Returns whether colored output is allowed.
///
/// Disabled by `--no-color` or by `NO_COLOR` being set to anything.
fn ansi_enabled(no_color: bool, no_color_env: Option<OsString>) -> bool {
    !no_color && no_color_env.is_none()
}

/// Installs the color-eyre report hooks, with a blank theme when colors are
/// disabled.
fn install_error_hooks(use_ansi: bool) -> color_eyre::Result<()> {
    let hooks = HookBuilder::default();
    let hooks = if use_ansi {
        hooks
    } else {
        hooks.theme(Theme::new())
    };
    hooks.install()
}

/// Initializes the tracing subscriber for logging.
///
/// Respects `RUST_LOG` if set. Otherwise uses `debug` with `--verbose` and
/// `info` by default, with `notify` held at `warn`. Logs go to stderr so
/// stdout carries only match output.
fn init_tracing(verbose: bool, use_ansi: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},mio=warn,notify=warn"))
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_ansi(use_ansi),
        )
        .with(filter)
        .init();
}

// =============================================================================
// COMMAND IMPLEMENTATION
// =============================================================================

/// Validates `config` and opens the watch with `start`.
///
/// The pattern is compiled before `start` runs, so an invalid pattern never
/// reaches registration.
fn prepare<T, F>(config: &Config, start: F) -> color_eyre::Result<(WatchSettings, T)>
where
    F: FnOnce(&WatchSettings) -> Result<T, WatchError>,
{
    let settings = config.resolve()?;
    let watch = start(&settings)?;
    Ok((settings, watch))
}

/// Loads settings, registers the tree and runs the event loop.
///
/// Every error returned here happens before the first event is handled.
async fn run(cli: &Cli) -> color_eyre::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let (settings, (mut tree, mut notifications)) =
        prepare(&config, |settings| TreeWatcher::start(&settings.watch_root))?;

    {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "Watching folder: {}", config.folder_to_watch)?;
    }

    info!(
        pattern = %settings.pattern,
        follow_new_dirs = settings.follow_new_dirs,
        "Watcher started"
    );

    let event_loop = tokio::spawn(async move {
        let mut event_loop = EventLoop::new(&settings, io::stdout());
        event_loop.run(&mut notifications, &mut tree).await;
        event_loop.stats()
    });

    // Never fired; the process runs until it is killed
    let (_trigger, signal) = shutdown::channel();

    tokio::select! {
        cause = signal.wait() => {
            info!(?cause, "Shutdown signal resolved");
        }
        result = event_loop => {
            let stats = result?;
            info!(writes = stats.writes, faults = stats.faults, "Event loop finished");
        }
    }

    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Argument errors are reported by clap itself
    let cli = Cli::parse();
    let use_ansi = ansi_enabled(cli.no_color, std::env::var_os("NO_COLOR"));

    install_error_hooks(use_ansi)?;
    init_tracing(cli.verbose, use_ansi);

    run(&cli).await
}
