//! Error types for the rx-core crate.
//!
//! This module provides the [`ConfigError`] type for everything that can go
//! wrong while locating, parsing, and validating the configuration. All of
//! these are startup errors: the binary reports them once and exits.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use rx_core::ConfigError;
///
/// let error = ConfigError::MissingOption("regexPattern");
/// assert!(error.to_string().contains("regexPattern"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any search directory.
    #[error("no configuration file found (searched: {})", display_paths(.searched))]
    NotFound {
        /// The candidate files that were checked, in search order.
        searched: Vec<Utf8PathBuf>,
    },

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`Config`](crate::Config).
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Inline YAML could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required option is absent or empty.
    #[error("missing required configuration option '{0}'")]
    MissingOption(&'static str),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// The configured regular expression does not compile.
    #[error("error compiling regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl ConfigError {
    /// Creates a new [`ConfigError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ConfigError::Parse`] error.
    #[inline]
    pub fn parse(path: impl Into<Utf8PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Returns the configuration file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => Some(path),
            Self::NotFound { .. }
            | Self::Yaml(_)
            | Self::MissingOption(_)
            | Self::InvalidOption { .. }
            | Self::InvalidPattern(_) => None,
        }
    }
}

fn display_paths(paths: &[Utf8PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_not_found_lists_searched_paths() {
        let error = ConfigError::NotFound {
            searched: vec![
                Utf8PathBuf::from("./config.yaml"),
                Utf8PathBuf::from("/home/op/config.yaml"),
            ],
        };
        let msg = error.to_string();
        assert!(msg.contains("./config.yaml, /home/op/config.yaml"));
        assert!(error.path().is_none());
    }

    #[test]
    fn test_io_error_carries_path() {
        let error = ConfigError::io(
            "/etc/rx/config.yaml",
            io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        );
        assert_eq!(error.path().map(|p| p.as_str()), Some("/etc/rx/config.yaml"));
        assert!(error.to_string().contains("access denied"));
    }

    #[test]
    fn test_missing_option_display() {
        let error = ConfigError::MissingOption("folderToWatch");
        assert_eq!(
            error.to_string(),
            "missing required configuration option 'folderToWatch'"
        );
    }

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::InvalidOption {
            option: "followNewDirs".to_owned(),
            reason: "expected a boolean".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("followNewDirs"));
        assert!(msg.contains("expected a boolean"));
    }

    #[test]
    fn test_invalid_pattern_from_regex_error() {
        let regex_error = regex::Regex::new("(unclosed").unwrap_err();
        let error = ConfigError::from(regex_error);
        assert!(matches!(error, ConfigError::InvalidPattern(_)));
        assert!(error.to_string().starts_with("error compiling regex pattern"));
    }
}
