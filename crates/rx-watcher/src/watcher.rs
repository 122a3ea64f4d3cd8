//! The notification handle for a watched tree.
//!
//! This module provides [`TreeWatcher`], which owns the OS-level watcher and
//! the [`WatchSet`] registered with it, and bridges the watcher's callback to
//! a tokio channel.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              notify backend thread (inotify etc.)        │
//! │  ┌───────────────────┐    ┌───────────────────────────┐  │
//! │  │ RecommendedWatcher │ -> │ callback                  │  │
//! │  │ (one watch per dir)│    │ Notification::from_notify │  │
//! │  └───────────────────┘    └─────────────┬─────────────┘  │
//! └─────────────────────────────────────────│────────────────┘
//!                                           │ UnboundedSender::send
//!                                           ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                    tokio runtime                         │
//! │   Notifications (UnboundedReceiver)  ->  EventLoop       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The channel is unbounded so the backend thread never waits on the
//! consumer.
//!
//! # Usage
//!
//! ```no_run
//! use camino::Utf8Path;
//! use rx_watcher::TreeWatcher;
//!
//! # async fn example() -> Result<(), rx_watcher::WatchError> {
//! let (tree, mut notifications) = TreeWatcher::start(Utf8Path::new("./inbox"))?;
//! println!("watching {} directories", tree.watch_set().len());
//!
//! while let Some(notification) = notifications.recv().await {
//!     println!("{notification:?}");
//! }
//! # Ok(())
//! # }
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use crate::error::WatchError;
use crate::events::Notification;
use crate::registrar::{DirRegistry, WatchSet, register_tree, validate_root};

/// Receiving side of the merged notification channel.
pub type Notifications = mpsc::UnboundedReceiver<Notification>;

/// A registered directory tree and the handle it is registered with.
///
/// The handle stays open for as long as the `TreeWatcher` lives. Dropping it
/// closes the handle, which closes the notification channel.
pub struct TreeWatcher<R = RecommendedWatcher> {
    /// The root as configured.
    root: Utf8PathBuf,

    /// The OS handle, or a stand-in in tests.
    registry: R,

    /// Every directory registered so far.
    watch_set: WatchSet,
}

impl<R> std::fmt::Debug for TreeWatcher<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWatcher")
            .field("root", &self.root)
            .field("watched_dirs", &self.watch_set.len())
            .finish_non_exhaustive()
    }
}

impl TreeWatcher<RecommendedWatcher> {
    /// Opens the OS notification handle and registers every directory under
    /// `root`.
    ///
    /// The root is validated before the handle is created.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] or [`WatchError::NotADirectory`]
    /// for a bad root, [`WatchError::Notify`] if the handle cannot be created
    /// or a directory cannot be registered, and [`WatchError::Walk`] if the
    /// traversal fails.
    pub fn start(root: &Utf8Path) -> Result<(Self, Notifications), WatchError> {
        validate_root(root)?;

        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            for notification in Notification::from_notify(res) {
                if tx.send(notification).is_err() {
                    tracing::debug!("Notification channel closed, dropping event");
                    break;
                }
            }
        })?;

        let tree = Self::with_registry(root, watcher)?;
        Ok((tree, rx))
    }
}

impl<R: DirRegistry> TreeWatcher<R> {
    /// Registers every directory under `root` with `registry`.
    ///
    /// # Errors
    ///
    /// See [`register_tree`].
    pub fn with_registry(root: &Utf8Path, mut registry: R) -> Result<Self, WatchError> {
        let watch_set = register_tree(&mut registry, root)?;

        tracing::info!(
            path = %root,
            directories = watch_set.len(),
            "Watch set registered"
        );
        tracing::debug!(dirs = ?watch_set.sorted(), "Watched directories");

        Ok(Self {
            root: root.to_owned(),
            registry,
            watch_set,
        })
    }

    /// Registers a subtree created after startup.
    ///
    /// Returns the number of directories that were not already watched.
    ///
    /// # Errors
    ///
    /// See [`register_tree`]. On failure the watch set is left unchanged.
    pub fn watch_subtree(&mut self, dir: &Utf8Path) -> Result<usize, WatchError> {
        let added = register_tree(&mut self.registry, dir)?;
        Ok(self.watch_set.merge(added))
    }

    /// Returns the root as configured.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns every directory registered so far.
    #[must_use]
    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Operation;
    use crate::test_support::{FailingRegistry, RecordingRegistry, utf8_root};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_temp_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp directory")
    }

    #[test]
    fn test_with_registry_builds_watch_set() {
        let dir = create_temp_dir();
        fs::create_dir(dir.path().join("sub")).expect("mkdir");
        let root = utf8_root(&dir);

        let tree = TreeWatcher::with_registry(&root, RecordingRegistry::default())
            .expect("Registration should succeed");

        assert_eq!(tree.root(), root.as_path());
        assert_eq!(tree.watch_set().len(), 2);
        assert_eq!(tree.registry().dirs.len(), 2);
    }

    #[test]
    fn test_watch_subtree_adds_new_directories() {
        let dir = create_temp_dir();
        let root = utf8_root(&dir);
        let mut tree = TreeWatcher::with_registry(&root, RecordingRegistry::default())
            .expect("Registration should succeed");

        fs::create_dir_all(dir.path().join("late/deeper")).expect("mkdir");
        let added = tree
            .watch_subtree(&root.join("late"))
            .expect("Subtree registration should succeed");

        assert_eq!(added, 2);
        assert!(tree.watch_set().contains(&root.join("late/deeper")));
        assert_eq!(tree.watch_set().len(), 3);
    }

    #[test]
    fn test_watch_subtree_failure_leaves_set_unchanged() {
        let dir = create_temp_dir();
        fs::create_dir(dir.path().join("late")).expect("mkdir");
        let root = utf8_root(&dir);

        let registry = FailingRegistry::on(root.join("late"));
        let mut tree = TreeWatcher {
            root: root.clone(),
            registry,
            watch_set: WatchSet::new(),
        };

        let result = tree.watch_subtree(&root.join("late"));
        assert!(result.is_err());
        assert!(tree.watch_set().is_empty());
    }

    #[test]
    fn test_start_root_not_found() {
        let result = TreeWatcher::start(Utf8Path::new("/nonexistent/path/that/does/not/exist"));
        match result {
            Err(WatchError::PathNotFound(_)) => {}
            other => panic!("Expected PathNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_start_registers_real_watcher() {
        let dir = create_temp_dir();
        fs::create_dir(dir.path().join("sub")).expect("mkdir");
        let root = utf8_root(&dir);

        let (tree, _notifications) = TreeWatcher::start(&root).expect("Watcher should start");

        assert_eq!(tree.watch_set().len(), 2);
        assert!(tree.watch_set().contains(&root.join("sub")));
    }

    #[tokio::test]
    async fn test_start_receives_write_events() {
        let dir = create_temp_dir();
        let root = utf8_root(&dir);
        let (_tree, mut notifications) = TreeWatcher::start(&root).expect("Watcher should start");

        let file_path = root.join("test.txt");
        fs::write(&file_path, "hello").expect("Failed to write file");

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        let mut operations = Vec::new();
        while let Ok(Some(notification)) =
            tokio::time::timeout_at(deadline, notifications.recv()).await
        {
            if let Some(change) = notification.as_change().filter(|c| c.path == file_path) {
                operations.push(change.operation);
                if change.is_write() {
                    break;
                }
            }
        }

        assert!(
            operations.contains(&Operation::Write),
            "no write event within the window, saw: {operations:?}"
        );
        assert!(
            operations
                .iter()
                .all(|op| matches!(op, Operation::Create | Operation::Write | Operation::Other)),
            "unexpected operations for a fresh write: {operations:?}"
        );
    }

    #[tokio::test]
    async fn test_dropping_tree_closes_channel() {
        let dir = create_temp_dir();
        let root = utf8_root(&dir);
        let (tree, mut notifications) = TreeWatcher::start(&root).expect("Watcher should start");

        drop(tree);

        let closed = tokio::time::timeout(Duration::from_secs(2), async {
            while notifications.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok(), "channel should close once the handle is dropped");
    }
}
