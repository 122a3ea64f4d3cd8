//! Validated runtime settings.

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;

/// Settings the watcher runs with, produced by [`Config::resolve`].
///
/// Immutable for the lifetime of the process. The event loop receives these
/// at construction instead of reading any global state.
///
/// [`Config::resolve`]: crate::Config::resolve
#[derive(Debug, Clone)]
pub struct WatchSettings {
    /// Root directory to watch, as configured (not canonicalized).
    pub watch_root: Utf8PathBuf,

    /// Compiled extraction pattern.
    pub pattern: Regex,

    /// Whether directories created after startup are registered.
    pub follow_new_dirs: bool,
}

impl WatchSettings {
    /// Creates settings directly from a root and a compiled pattern.
    ///
    /// Directory following is off.
    #[must_use]
    pub fn new(watch_root: impl Into<Utf8PathBuf>, pattern: Regex) -> Self {
        Self {
            watch_root: watch_root.into(),
            pattern,
            follow_new_dirs: false,
        }
    }

    /// Enables or disables registration of directories created after startup.
    #[must_use]
    pub const fn with_follow_new_dirs(mut self, follow: bool) -> Self {
        self.follow_new_dirs = follow;
        self
    }

    /// Returns the watch root.
    #[inline]
    #[must_use]
    pub fn watch_root(&self) -> &Utf8Path {
        &self.watch_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_to_static_watch_set() {
        let settings = WatchSettings::new("/data", Regex::new("x").expect("valid regex"));
        assert_eq!(settings.watch_root().as_str(), "/data");
        assert!(!settings.follow_new_dirs);
    }

    #[test]
    fn test_with_follow_new_dirs() {
        let settings = WatchSettings::new("/data", Regex::new("x").expect("valid regex"))
            .with_follow_new_dirs(true);
        assert!(settings.follow_new_dirs);
    }
}
