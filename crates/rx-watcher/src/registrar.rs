//! Registration of a directory tree with the notification backend.
//!
//! [`register_tree`] walks a root directory and registers every directory it
//! finds through a [`DirRegistry`]. Files are covered by the registration of
//! their parent directory.
//!
//! The walk uses the `ignore` crate with all of its filters switched off:
//! hidden directories and directories matched by `.gitignore` are watched
//! like any other. Symbolic links are not followed.
//!
//! Registration is all-or-nothing. The first traversal or registration
//! failure aborts the whole operation.

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use notify::{RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

use crate::error::WatchError;

/// Something directories can be registered with.
///
/// Implemented for [`notify::RecommendedWatcher`]. Tests substitute their own
/// implementation to observe or fail registrations.
///
/// # Examples
///
/// ```
/// use camino::{Utf8Path, Utf8PathBuf};
/// use rx_watcher::{DirRegistry, WatchError};
///
/// #[derive(Default)]
/// struct Recorder(Vec<Utf8PathBuf>);
///
/// impl DirRegistry for Recorder {
///     fn watch_dir(&mut self, dir: &Utf8Path) -> Result<(), WatchError> {
///         self.0.push(dir.to_owned());
///         Ok(())
///     }
/// }
/// ```
pub trait DirRegistry {
    /// Registers a single directory, non-recursively.
    fn watch_dir(&mut self, dir: &Utf8Path) -> Result<(), WatchError>;
}

impl DirRegistry for notify::RecommendedWatcher {
    fn watch_dir(&mut self, dir: &Utf8Path) -> Result<(), WatchError> {
        self.watch(dir.as_std_path(), RecursiveMode::NonRecursive)?;
        Ok(())
    }
}

impl<R: DirRegistry + ?Sized> DirRegistry for &mut R {
    fn watch_dir(&mut self, dir: &Utf8Path) -> Result<(), WatchError> {
        (**self).watch_dir(dir)
    }
}

impl<R: DirRegistry + ?Sized> DirRegistry for Box<R> {
    fn watch_dir(&mut self, dir: &Utf8Path) -> Result<(), WatchError> {
        (**self).watch_dir(dir)
    }
}

/// The set of directories currently registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSet {
    dirs: FxHashSet<Utf8PathBuf>,
}

impl WatchSet {
    /// Creates an empty watch set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered directories.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// Returns `true` if no directory is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Returns `true` if `dir` is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, dir: &Utf8Path) -> bool {
        self.dirs.contains(dir)
    }

    /// Adds a directory. Returns `true` if it was not already present.
    pub fn insert(&mut self, dir: Utf8PathBuf) -> bool {
        self.dirs.insert(dir)
    }

    /// Merges `other` into this set, returning how many directories were new.
    pub fn merge(&mut self, other: Self) -> usize {
        other
            .dirs
            .into_iter()
            .filter(|dir| self.dirs.insert(dir.clone()))
            .count()
    }

    /// Returns the registered directories sorted, for stable display.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Utf8PathBuf> {
        let mut dirs: Vec<_> = self.dirs.iter().collect();
        dirs.sort();
        dirs
    }
}

/// Checks that `root` exists and is a directory.
///
/// # Errors
///
/// Returns [`WatchError::PathNotFound`] if `root` does not exist,
/// [`WatchError::NotADirectory`] if it is something else, and
/// [`WatchError::Io`] if its metadata cannot be read.
pub fn validate_root(root: &Utf8Path) -> Result<(), WatchError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(WatchError::not_a_directory(root)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(WatchError::path_not_found(root))
        }
        Err(err) => Err(WatchError::Io(err)),
    }
}

/// Walks `root` and registers every directory under it, `root` included.
///
/// # Errors
///
/// Fails on the first invalid root, traversal error, non-UTF-8 path, or
/// registration failure. Directories registered before the failure stay
/// registered with the backend; the caller is expected to give up on the
/// handle.
///
/// # Examples
///
/// ```
/// # use camino::{Utf8Path, Utf8PathBuf};
/// # use rx_watcher::{DirRegistry, WatchError, register_tree};
/// # #[derive(Default)]
/// # struct Recorder(Vec<Utf8PathBuf>);
/// # impl DirRegistry for Recorder {
/// #     fn watch_dir(&mut self, dir: &Utf8Path) -> Result<(), WatchError> {
/// #         self.0.push(dir.to_owned());
/// #         Ok(())
/// #     }
/// # }
/// let tmp = tempfile::tempdir()?;
/// std::fs::create_dir(tmp.path().join("nested"))?;
/// let root = Utf8Path::from_path(tmp.path()).expect("utf-8 temp dir");
///
/// let mut recorder = Recorder::default();
/// let set = register_tree(&mut recorder, root)?;
///
/// assert_eq!(set.len(), 2);
/// assert!(set.contains(&root.join("nested")));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn register_tree<R: DirRegistry + ?Sized>(
    registry: &mut R,
    root: &Utf8Path,
) -> Result<WatchSet, WatchError> {
    validate_root(root)?;

    let mut set = WatchSet::new();

    for result in build_walker(root) {
        let entry = result?;

        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }

        let path = entry.path();
        let dir = Utf8Path::from_path(path).ok_or_else(|| WatchError::non_utf8_path(path))?;

        registry.watch_dir(dir)?;
        tracing::trace!(dir = %dir, "Registered directory");
        set.insert(dir.to_owned());
    }

    Ok(set)
}

fn build_walker(root: &Utf8Path) -> ignore::Walk {
    WalkBuilder::new(root)
        // Watch everything, including hidden and gitignored directories
        .standard_filters(false)
        .follow_links(false)
        .threads(1)
        .build()
}
