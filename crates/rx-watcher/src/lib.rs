//! Directory tree watching with regex extraction from written files.
//!
//! This crate registers every directory under a root with the OS
//! notification facility, merges change events and backend faults into one
//! tokio channel, and runs a single consumer that prints pattern matches
//! from each file that is written.
//!
//! # Overview
//!
//! - [`register_tree`] walks the root and registers each directory
//!   individually (no recursive watch mode)
//! - [`TreeWatcher`] owns the OS handle and the [`WatchSet`]
//! - [`Notification`] is what travels on the channel: a [`ChangeEvent`] or a
//!   [`NotificationError`]
//! - [`EventLoop`] reads, extracts and prints, one event at a time
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   watch_dir   ┌──────────────────┐
//! │ register_tree│ ────────────► │ RecommendedWatcher│
//! └──────────────┘               └────────┬─────────┘
//!                                         │ callback (backend thread)
//!                                         ▼
//!                           mpsc::UnboundedSender<Notification>
//!                                         │
//!                                         ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ EventLoop (tokio task)                                        │
//! │   Write  -> read_text -> PatternExtractor::matches -> sink    │
//! │   Fault  -> tracing::error!                                   │
//! │   other  -> ignored                                           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Crate Dependencies
//!
//! ```text
//! rx-cli ──► rx-watcher ──► rx-core
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use rx_core::Config;
//! use rx_watcher::{EventLoop, TreeWatcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Config::load(None)?.resolve()?;
//!     let (mut tree, mut notifications) = TreeWatcher::start(&settings.watch_root)?;
//!
//!     let mut event_loop = EventLoop::new(&settings, std::io::stdout());
//!     event_loop.run(&mut notifications, &mut tree).await;
//!     Ok(())
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod event_loop;
pub mod events;
pub mod extract;
pub mod registrar;
pub mod shutdown;
pub mod watcher;

#[cfg(test)]
mod test_support;

pub use error::WatchError;
pub use event_loop::{EventLoop, LoopStats};
pub use events::{ChangeEvent, Notification, NotificationError, Operation};
pub use extract::{PatternExtractor, read_text};
pub use registrar::{DirRegistry, WatchSet, register_tree, validate_root};
pub use watcher::{Notifications, TreeWatcher};
