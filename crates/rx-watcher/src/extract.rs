//! Reading modified files and pulling matches out of them.

use camino::Utf8Path;
use regex::Regex;

use crate::error::WatchError;

/// Reads the whole file at `path` as text.
///
/// Bytes that are not valid UTF-8 are replaced with `U+FFFD`, so only I/O
/// failures are reported.
///
/// # Errors
///
/// Returns [`WatchError::Read`] if the file cannot be read (removed before
/// the read, permission denied, and so on).
pub async fn read_text(path: &Utf8Path) -> Result<String, WatchError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| WatchError::read(path, source))?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

/// Applies the configured pattern to file content.
///
/// # Examples
///
/// ```
/// use regex::Regex;
/// use rx_watcher::PatternExtractor;
///
/// let extractor = PatternExtractor::new(Regex::new(r"\w+\d+").unwrap());
/// assert_eq!(extractor.matches("abc123 and xyz789"), vec!["abc123", "xyz789"]);
/// ```
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    pattern: Regex,
}

impl PatternExtractor {
    /// Creates an extractor for `pattern`.
    #[must_use]
    pub const fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Returns the pattern.
    #[inline]
    #[must_use]
    pub const fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Returns every non-overlapping match in `content`, left to right.
    ///
    /// Matching is leftmost-first with the pattern's own flags. There is no
    /// cap on the number of matches.
    #[must_use]
    pub fn matches<'a>(&self, content: &'a str) -> Vec<&'a str> {
        self.pattern
            .find_iter(content)
            .map(|m| m.as_str())
            .collect()
    }
}
