//! The single consumer of the notification channel.
//!
//! [`EventLoop`] takes notifications one at a time and, for every write,
//! prints a short block to its output sink:
//!
//! ```text
//! File <path> has been modified.
//! File content:
//! <match 1>
//! <match 2>
//! ...
//! ```
//!
//! If the file can't be read, only the first line is printed and the failure
//! goes to the log. Every other operation is ignored. Backend faults are
//! logged. Neither ends the loop. It ends only when the channel closes.
//!
//! Events are handled strictly in arrival order and one at a time, so the
//! blocks of two events never interleave.

use std::fmt::Display;
use std::io::Write;

use camino::Utf8Path;
use rx_core::WatchSettings;

use crate::events::{ChangeEvent, Notification, NotificationError, Operation};
use crate::extract::{PatternExtractor, read_text};
use crate::registrar::DirRegistry;
use crate::watcher::{Notifications, TreeWatcher};

/// Counters kept while the loop runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Write events handled.
    pub writes: usize,
    /// Write events whose file could not be read.
    pub read_failures: usize,
    /// Match lines printed.
    pub matches: usize,
    /// Backend faults logged.
    pub faults: usize,
    /// Non-write events skipped.
    pub ignored: usize,
    /// Directories added to the watch set after startup.
    pub dirs_followed: usize,
}

/// Consumes notifications and prints pattern matches from written files.
///
/// # Examples
///
/// ```
/// use regex::Regex;
/// use rx_core::WatchSettings;
/// use rx_watcher::{ChangeEvent, EventLoop, Notification, Operation, TreeWatcher};
/// # use camino::{Utf8Path, Utf8PathBuf};
/// # use rx_watcher::{DirRegistry, WatchError};
/// # struct NoopRegistry;
/// # impl DirRegistry for NoopRegistry {
/// #     fn watch_dir(&mut self, _dir: &Utf8Path) -> Result<(), WatchError> { Ok(()) }
/// # }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tmp = tempfile::tempdir()?;
/// let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 temp dir");
/// let file = root.join("a.txt");
/// std::fs::write(&file, "abc123 xyz789")?;
///
/// let settings = WatchSettings::new(&root, Regex::new(r"\w+\d+")?);
/// let mut tree = TreeWatcher::with_registry(&root, NoopRegistry)?;
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
/// tx.send(Notification::from(ChangeEvent::new(&file, Operation::Write)))?;
/// drop(tx);
///
/// let mut event_loop = EventLoop::new(&settings, Vec::new());
/// event_loop.run(&mut rx, &mut tree).await;
///
/// let output = String::from_utf8(event_loop.into_sink())?;
/// assert!(output.ends_with("File content:\nabc123\nxyz789\n"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EventLoop<W> {
    extractor: PatternExtractor,
    follow_new_dirs: bool,
    sink: W,
    stats: LoopStats,
}

impl<W: Write> EventLoop<W> {
    /// Creates a loop that prints to `sink` using `settings`.
    pub fn new(settings: &WatchSettings, sink: W) -> Self {
        Self {
            extractor: PatternExtractor::new(settings.pattern.clone()),
            follow_new_dirs: settings.follow_new_dirs,
            sink,
            stats: LoopStats::default(),
        }
    }

    /// Runs until the notification channel closes.
    ///
    /// `tree` is the handle new directories are registered with when
    /// following is enabled. It is otherwise only kept alive.
    pub async fn run<R: DirRegistry>(
        &mut self,
        notifications: &mut Notifications,
        tree: &mut TreeWatcher<R>,
    ) {
        while let Some(notification) = notifications.recv().await {
            self.dispatch(notification, tree).await;
        }

        tracing::info!(
            writes = self.stats.writes,
            read_failures = self.stats.read_failures,
            faults = self.stats.faults,
            "Notification channel closed"
        );
    }

    /// Handles a single notification.
    pub async fn dispatch<R: DirRegistry>(
        &mut self,
        notification: Notification,
        tree: &mut TreeWatcher<R>,
    ) {
        match notification {
            Notification::Change(event) => self.handle_change(event, tree).await,
            Notification::Fault(error) => self.handle_fault(&error),
        }
    }

    /// Returns the counters so far.
    #[must_use]
    pub const fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Consumes the loop and returns its output sink.
    pub fn into_sink(self) -> W {
        self.sink
    }

    async fn handle_change<R: DirRegistry>(
        &mut self,
        event: ChangeEvent,
        tree: &mut TreeWatcher<R>,
    ) {
        match event.operation {
            Operation::Write => self.handle_write(&event.path).await,
            Operation::Create if self.follow_new_dirs => self.follow_directory(&event.path, tree),
            Operation::Create
            | Operation::Remove
            | Operation::Rename
            | Operation::Chmod
            | Operation::Other => self.stats.ignored += 1,
        }
    }

    async fn handle_write(&mut self, path: &Utf8Path) {
        self.stats.writes += 1;
        self.emit(format_args!("File {path} has been modified."));

        let content = match read_text(path).await {
            Ok(content) => content,
            Err(err) => {
                self.stats.read_failures += 1;
                if err.is_recoverable() {
                    tracing::warn!(path = %path, error = %err, "Error reading file");
                } else {
                    tracing::error!(path = %path, error = %err, "Error reading file");
                }
                return;
            }
        };

        self.emit("File content:");
        for found in self.extractor.matches(&content) {
            self.stats.matches += 1;
            self.emit(found);
        }
    }

    fn handle_fault(&mut self, error: &NotificationError) {
        self.stats.faults += 1;
        tracing::error!(error = %error, paths = ?error.paths(), "Notification error");
    }

    fn follow_directory<R: DirRegistry>(&mut self, path: &Utf8Path, tree: &mut TreeWatcher<R>) {
        if !path.is_dir() {
            self.stats.ignored += 1;
            return;
        }

        match tree.watch_subtree(path) {
            Ok(added) => {
                self.stats.dirs_followed += added;
                tracing::debug!(path = %path, added, "Watching new directory");
            }
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "Failed to watch new directory");
            }
        }
    }

    fn emit(&mut self, line: impl Display) {
        if let Err(err) = writeln!(self.sink, "{line}") {
            tracing::warn!(error = %err, "Failed to write output line");
        }
    }
}
