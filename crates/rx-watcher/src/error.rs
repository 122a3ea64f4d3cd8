//! Error types for the rx-watcher crate.
//!
//! This module provides the [`WatchError`] type for errors raised while
//! building the watch set and while handling individual change events.

use camino::Utf8PathBuf;

/// Errors that can occur during watch registration and event handling.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): Fatal - the OS handle could not be created or a directory could not be registered
/// - **Path not found** ([`WatchError::PathNotFound`]): Fatal - the watch root must exist
/// - **Not a directory** ([`WatchError::NotADirectory`]): Fatal - the watch root must be a directory
/// - **Walk errors** ([`WatchError::Walk`]): Fatal - partial watch sets are not accepted
/// - **Non-UTF-8 path** ([`WatchError::NonUtf8Path`]): Fatal - a directory in the tree can't be registered
/// - **Read errors** ([`WatchError::Read`]): Recoverable - logged, the loop moves on
/// - **I/O errors** ([`WatchError::Io`]): Fatal - propagate immediately
///
/// # Examples
///
/// ```
/// use rx_watcher::WatchError;
///
/// let err = WatchError::path_not_found("/srv/missing");
/// assert!(err.is_fatal());
/// assert_eq!(err.to_string(), "path does not exist: /srv/missing");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to create the notify watcher or register a directory with it.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The specified path does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The watch root exists but is not a directory.
    #[error("path is not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    /// Directory traversal failed while building the watch set.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// A modified file could not be read.
    #[error("failed to read file {path}: {source}")]
    Read {
        /// The path of the file that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Creates a new [`WatchError::NotADirectory`] error.
    #[inline]
    pub fn not_a_directory(path: impl Into<Utf8PathBuf>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Creates a new [`WatchError::NonUtf8Path`] error.
    #[inline]
    pub fn non_utf8_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self::NonUtf8Path(path.into())
    }

    /// Creates a new [`WatchError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error is recoverable (watching can continue).
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    /// Returns `true` if this error is fatal (startup should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::PathNotFound(path) | Self::NotADirectory(path) | Self::Read { path, .. } => {
                Some(path)
            }
            Self::Notify(_) | Self::Walk(_) | Self::NonUtf8Path(_) | Self::Io(_) => None,
        }
    }
}
