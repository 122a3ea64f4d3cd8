//! On-disk configuration for rxwatch.
//!
//! The configuration lives in a YAML file named `config.yaml` (or
//! `config.yml`), looked up first in the current directory and then in the
//! user's home directory:
//!
//! ```yaml
//! folderToWatch: /var/spool/inbox
//! regexPattern: '\w+\d+'
//! followNewDirs: false
//! ```
//!
//! Each key can be overridden from the environment by its upper-cased name
//! (`FOLDERTOWATCH`, `REGEXPATTERN`, `FOLLOWNEWDIRS`). Empty variables are
//! treated as unset.

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::settings::WatchSettings;

/// File names accepted as configuration, in lookup order within a directory.
pub const CONFIG_FILE_NAMES: &[&str] = &["config.yaml", "config.yml"];

const ENV_FOLDER_TO_WATCH: &str = "FOLDERTOWATCH";
const ENV_REGEX_PATTERN: &str = "REGEXPATTERN";
const ENV_FOLLOW_NEW_DIRS: &str = "FOLLOWNEWDIRS";

/// Raw configuration as read from `config.yaml`.
///
/// Fields are unvalidated. Call [`Config::resolve`] to check them and compile
/// the pattern.
///
/// # Examples
///
/// ```
/// use rx_core::Config;
///
/// let config = Config::from_yaml_str("folderToWatch: ./logs\n")?;
/// assert_eq!(config.folder_to_watch.as_str(), "./logs");
/// assert!(config.regex_pattern.is_empty());
/// assert!(!config.follow_new_dirs);
/// # Ok::<(), rx_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Root directory to watch.
    pub folder_to_watch: Utf8PathBuf,

    /// Regular expression applied to the content of modified files.
    pub regex_pattern: String,

    /// Whether directories created after startup are added to the watch set.
    pub follow_new_dirs: bool,
}

impl Config {
    /// Loads the configuration from `explicit`, or discovers it in the
    /// default search directories, then applies environment overrides.
    pub fn load(explicit: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_owned(),
            None => Self::discover(&default_search_dirs())?,
        };

        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Returns the first configuration file found in `dirs`.
    ///
    /// Directories are searched in order; within a directory the names in
    /// [`CONFIG_FILE_NAMES`] are tried in order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] listing every candidate checked.
    pub fn discover(dirs: &[Utf8PathBuf]) -> Result<Utf8PathBuf, ConfigError> {
        let mut searched = Vec::with_capacity(dirs.len() * CONFIG_FILE_NAMES.len());

        for dir in dirs {
            for name in CONFIG_FILE_NAMES {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    return Ok(candidate);
                }
                searched.push(candidate);
            }
        }

        Err(ConfigError::NotFound { searched })
    }

    /// Reads and parses a configuration file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::io(path, source))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::parse(path, source))
    }

    /// Parses configuration from an in-memory YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Applies environment overrides using `lookup` to read variables.
    ///
    /// The lookup is injected so callers can supply something other than the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if `FOLLOWNEWDIRS` is not a
    /// recognised boolean.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(folder) = get(ENV_FOLDER_TO_WATCH) {
            self.folder_to_watch = Utf8PathBuf::from(folder);
        }
        if let Some(pattern) = get(ENV_REGEX_PATTERN) {
            self.regex_pattern = pattern;
        }
        if let Some(raw) = get(ENV_FOLLOW_NEW_DIRS) {
            self.follow_new_dirs = parse_bool(&raw).ok_or_else(|| ConfigError::InvalidOption {
                option: "followNewDirs".to_owned(),
                reason: format!("expected true, false, 1 or 0, got '{raw}'"),
            })?;
        }

        Ok(())
    }

    /// Validates the configuration and compiles the pattern.
    ///
    /// This does not touch the filesystem; the watch root is checked when it
    /// is registered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingOption`] for an empty folder or pattern
    /// and [`ConfigError::InvalidPattern`] if the pattern does not compile.
    pub fn resolve(&self) -> Result<WatchSettings, ConfigError> {
        if self.folder_to_watch.as_str().is_empty() {
            return Err(ConfigError::MissingOption("folderToWatch"));
        }
        if self.regex_pattern.is_empty() {
            return Err(ConfigError::MissingOption("regexPattern"));
        }

        let pattern = Regex::new(&self.regex_pattern)?;

        Ok(WatchSettings {
            watch_root: self.folder_to_watch.clone(),
            pattern,
            follow_new_dirs: self.follow_new_dirs,
        })
    }
}

/// Returns the directories searched for a configuration file: the current
/// directory, then the home directory when it is valid UTF-8.
pub fn default_search_dirs() -> Vec<Utf8PathBuf> {
    let mut search = vec![Utf8PathBuf::from(".")];
    if let Some(home) = dirs::home_dir().and_then(|p| Utf8PathBuf::from_path_buf(p).ok()) {
        search.push(home);
    }
    search
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
