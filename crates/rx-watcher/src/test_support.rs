//! Registry doubles shared by the unit tests.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use crate::error::WatchError;
use crate::registrar::DirRegistry;

/// Records every directory it is asked to watch.
#[derive(Debug, Default)]
pub(crate) struct RecordingRegistry {
    pub(crate) dirs: Vec<Utf8PathBuf>,
}

impl DirRegistry for RecordingRegistry {
    fn watch_dir(&mut self, dir: &Utf8Path) -> Result<(), WatchError> {
        self.dirs.push(dir.to_owned());
        Ok(())
    }
}

/// Accepts registrations until it sees one specific directory.
#[derive(Debug)]
pub(crate) struct FailingRegistry {
    fail_on: Utf8PathBuf,
    pub(crate) dirs: Vec<Utf8PathBuf>,
}

impl FailingRegistry {
    pub(crate) fn on(fail_on: impl Into<Utf8PathBuf>) -> Self {
        Self {
            fail_on: fail_on.into(),
            dirs: Vec::new(),
        }
    }
}

impl DirRegistry for FailingRegistry {
    fn watch_dir(&mut self, dir: &Utf8Path) -> Result<(), WatchError> {
        if dir == self.fail_on.as_path() {
            return Err(notify::Error::generic("registration refused")
                .add_path(dir.as_std_path().to_path_buf())
                .into());
        }
        self.dirs.push(dir.to_owned());
        Ok(())
    }
}

pub(crate) fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("Invalid path")
}
