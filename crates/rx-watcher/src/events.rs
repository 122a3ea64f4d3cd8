//! Notification types delivered to the event loop.
//!
//! The notify backend reports two kinds of values: filesystem events and
//! faults inside the backend itself. Both travel on one channel as a tagged
//! [`Notification`] so the consumer has a single source to wait on.
//!
//! # Event Flow
//!
//! ```text
//! OS notification (inotify / FSEvents / ReadDirectoryChangesW)
//!        │
//!        ▼
//!   notify callback ── Notification::from_notify
//!        │
//!        ▼
//!   mpsc::UnboundedSender<Notification>
//!        │
//!        ▼
//!   EventLoop
//! ```

use camino::Utf8PathBuf;
use notify::EventKind;
use notify::event::ModifyKind;
use smallvec::SmallVec;

/// The kind of filesystem operation a [`ChangeEvent`] reports.
///
/// Only [`Operation::Write`] triggers content extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// File content changed.
    Write,
    /// A file or directory was created.
    Create,
    /// A file or directory was removed.
    Remove,
    /// A file or directory was renamed or moved.
    Rename,
    /// Permissions, ownership, or timestamps changed.
    Chmod,
    /// Anything else the backend reports (access, unknown).
    Other,
}

impl Operation {
    /// Maps a notify [`EventKind`] onto an operation.
    ///
    /// Data modifications, and modifications the backend can't classify,
    /// count as writes.
    ///
    /// # Examples
    ///
    /// ```
    /// use notify::EventKind;
    /// use notify::event::{DataChange, ModifyKind, RenameMode};
    /// use rx_watcher::Operation;
    ///
    /// let write = EventKind::Modify(ModifyKind::Data(DataChange::Content));
    /// assert_eq!(Operation::from_kind(&write), Operation::Write);
    ///
    /// let rename = EventKind::Modify(ModifyKind::Name(RenameMode::Both));
    /// assert_eq!(Operation::from_kind(&rename), Operation::Rename);
    /// ```
    #[must_use]
    pub const fn from_kind(kind: &EventKind) -> Self {
        match kind {
            EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => Self::Write,
            EventKind::Modify(ModifyKind::Name(_)) => Self::Rename,
            EventKind::Modify(ModifyKind::Metadata(_)) => Self::Chmod,
            EventKind::Create(_) => Self::Create,
            EventKind::Remove(_) => Self::Remove,
            EventKind::Modify(ModifyKind::Other)
            | EventKind::Access(_)
            | EventKind::Any
            | EventKind::Other => Self::Other,
        }
    }

    /// Returns `true` for [`Operation::Write`].
    #[inline]
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }

    /// Returns a short lowercase label for logging.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Create => "create",
            Self::Remove => "remove",
            Self::Rename => "rename",
            Self::Chmod => "chmod",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single filesystem operation on a single path.
///
/// # Examples
///
/// ```
/// use rx_watcher::{ChangeEvent, Operation};
///
/// let event = ChangeEvent::new("inbox/report.txt", Operation::Write);
/// assert!(event.is_write());
/// assert_eq!(event.path.as_str(), "inbox/report.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The affected path, as reported by the backend.
    pub path: Utf8PathBuf,

    /// What happened to it.
    pub operation: Operation,
}

impl ChangeEvent {
    /// Creates a new change event.
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, operation: Operation) -> Self {
        Self {
            path: path.into(),
            operation,
        }
    }

    /// Returns `true` if this event reports a content write.
    #[inline]
    #[must_use]
    pub const fn is_write(&self) -> bool {
        self.operation.is_write()
    }
}

/// A fault reported by the notification backend.
///
/// Examples are an overflowed kernel event queue or a watch handle that was
/// closed underneath us. Faults are logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationError {
    message: String,
    paths: Vec<Utf8PathBuf>,
}

impl NotificationError {
    /// Creates a fault with a description and no paths.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            paths: Vec::new(),
        }
    }

    /// Returns the human-readable description.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the paths the backend associated with the fault.
    ///
    /// Paths that are not valid UTF-8 are dropped.
    #[inline]
    #[must_use]
    pub fn paths(&self) -> &[Utf8PathBuf] {
        &self.paths
    }
}

impl std::fmt::Display for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for NotificationError {}

impl From<notify::Error> for NotificationError {
    fn from(error: notify::Error) -> Self {
        let message = error.to_string();
        let paths = error
            .paths
            .into_iter()
            .filter_map(|p| Utf8PathBuf::from_path_buf(p).ok())
            .collect();
        Self { message, paths }
    }
}

/// A value on the merged notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A filesystem change on one path.
    Change(ChangeEvent),

    /// A fault inside the notification backend.
    Fault(NotificationError),
}

impl Notification {
    /// Converts one backend callback value into notifications.
    ///
    /// An event naming several paths (a rename carrying both sides, for
    /// instance) yields one [`Notification::Change`] per path, in the order
    /// the backend listed them. Non-UTF-8 paths are logged and skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use notify::{Event, EventKind};
    /// use notify::event::CreateKind;
    /// use rx_watcher::{Notification, Operation};
    ///
    /// let event = Event::new(EventKind::Create(CreateKind::File))
    ///     .add_path("inbox/a.txt".into());
    /// let notifications = Notification::from_notify(Ok(event));
    ///
    /// assert_eq!(notifications.len(), 1);
    /// assert!(matches!(
    ///     &notifications[0],
    ///     Notification::Change(change) if change.operation == Operation::Create
    /// ));
    /// ```
    pub fn from_notify(result: notify::Result<notify::Event>) -> SmallVec<[Self; 2]> {
        match result {
            Ok(event) => {
                let operation = Operation::from_kind(&event.kind);
                event
                    .paths
                    .into_iter()
                    .filter_map(|path| match Utf8PathBuf::from_path_buf(path) {
                        Ok(path) => Some(Self::Change(ChangeEvent::new(path, operation))),
                        Err(invalid_path) => {
                            tracing::warn!(
                                path = %invalid_path.display(),
                                "Skipping non-UTF-8 path in file event"
                            );
                            None
                        }
                    })
                    .collect()
            }
            Err(error) => smallvec::smallvec![Self::Fault(error.into())],
        }
    }

    /// Returns the change event, if this is one.
    #[must_use]
    pub const fn as_change(&self) -> Option<&ChangeEvent> {
        match self {
            Self::Change(event) => Some(event),
            Self::Fault(_) => None,
        }
    }
}

impl From<ChangeEvent> for Notification {
    fn from(event: ChangeEvent) -> Self {
        Self::Change(event)
    }
}

impl From<NotificationError> for Notification {
    fn from(error: NotificationError) -> Self {
        Self::Fault(error)
    }
}
