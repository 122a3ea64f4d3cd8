//! Run-until-told-otherwise signal for the binary.
//!
//! The watcher has no graceful shutdown path yet. The binary holds a
//! [`ShutdownTrigger`] it never fires and waits on the paired
//! [`ShutdownSignal`], so the process runs until it is killed. Wiring the
//! trigger to SIGINT/SIGTERM is the missing piece.

use tokio::sync::oneshot;

/// Why a [`ShutdownSignal`] resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// [`ShutdownTrigger::fire`] was called.
    Requested,
    /// The trigger was dropped without firing.
    Abandoned,
}

/// Sending half of a shutdown channel.
#[derive(Debug)]
pub struct ShutdownTrigger(oneshot::Sender<()>);

impl ShutdownTrigger {
    /// Fires the signal.
    pub fn fire(self) {
        // Nobody waiting is fine
        let _ = self.0.send(());
    }
}

/// Receiving half of a shutdown channel.
#[derive(Debug)]
pub struct ShutdownSignal(oneshot::Receiver<()>);

impl ShutdownSignal {
    /// Waits until the trigger fires or is dropped.
    pub async fn wait(self) -> ShutdownCause {
        match self.0.await {
            Ok(()) => ShutdownCause::Requested,
            Err(_) => ShutdownCause::Abandoned,
        }
    }
}

/// Creates a connected trigger/signal pair.
///
/// # Examples
///
/// ```
/// use rx_watcher::shutdown::{self, ShutdownCause};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (trigger, signal) = shutdown::channel();
/// trigger.fire();
/// assert_eq!(signal.wait().await, ShutdownCause::Requested);
/// # }
/// ```
#[must_use]
pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = oneshot::channel();
    (ShutdownTrigger(tx), ShutdownSignal(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fire_resolves_signal() {
        let (trigger, signal) = channel();
        trigger.fire();
        assert_eq!(signal.wait().await, ShutdownCause::Requested);
    }

    #[tokio::test]
    async fn test_dropped_trigger_resolves_signal() {
        let (trigger, signal) = channel();
        drop(trigger);
        assert_eq!(signal.wait().await, ShutdownCause::Abandoned);
    }

    #[tokio::test]
    async fn test_held_trigger_keeps_waiting() {
        let (_trigger, signal) = channel();
        let result = tokio::time::timeout(Duration::from_millis(50), signal.wait()).await;
        assert!(result.is_err(), "signal must not resolve while the trigger is held");
    }
}
