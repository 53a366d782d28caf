//! Deferred, cancelable removal timers for Holdfast.
//!
//! The registry keeps disconnected players around for a recovery
//! window instead of evicting them immediately. [`CleanupScheduler`]
//! is the timer table behind that window: one pending timer per key,
//! armed on disconnect, canceled on reconnect. When a timer expires
//! its key is delivered on the expiry channel so the *owner* performs
//! the removal; the scheduler never mutates anyone's state itself.
//!
//! # Integration
//!
//! The scheduler is designed to feed a command loop:
//!
//! ```ignore
//! let (mut scheduler, mut expired_rx) = CleanupScheduler::new(window);
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* arm/cancel in handlers */ }
//!         Some(token) = expired_rx.recv() => { /* evict the player */ }
//!     }
//! }
//! ```
//!
//! Because expiries arrive on a channel the owner polls, expiry
//! handling is serialized with every other state change. A reconnect
//! and an expiry for the same key can never interleave mid-mutation;
//! whichever the owner processes first wins, and the owner is expected
//! to re-check liveness before acting on an expiry.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// A table of at-most-one pending removal timer per key.
///
/// Keys are generic; the registry uses session tokens. Timers run as
/// spawned tasks sleeping on the Tokio clock, so tests can drive them
/// with paused time.
pub struct CleanupScheduler<K> {
    window: Duration,
    pending: HashMap<K, JoinHandle<()>>,
    expired_tx: mpsc::UnboundedSender<K>,
}

impl<K> CleanupScheduler<K>
where
    K: Eq + Hash + Clone + Send + fmt::Debug + 'static,
{
    /// Creates a scheduler with the given recovery window, plus the
    /// receiver on which expired keys are delivered.
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<K>) {
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();
        (
            Self {
                window,
                pending: HashMap::new(),
                expired_tx,
            },
            expired_rx,
        )
    }

    /// Arms a removal timer for `key`, due after the recovery window.
    ///
    /// If a timer is already pending for this key it is replaced and
    /// the window starts over. At most one timer per key ever exists.
    pub fn arm(&mut self, key: K) {
        if let Some(old) = self.pending.remove(&key) {
            old.abort();
            trace!(?key, "replacing pending cleanup timer");
        }

        let window = self.window;
        let tx = self.expired_tx.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Receiver gone means the owner is shutting down.
            let _ = tx.send(task_key);
        });

        debug!(?key, window_secs = window.as_secs(), "cleanup timer armed");
        self.pending.insert(key, handle);
    }

    /// Cancels the pending timer for `key`, if any.
    ///
    /// Returns `true` if a timer was actually canceled. Canceling a
    /// key with no pending timer is a no-op; callers on the reconnect
    /// path do not need to know whether a timer existed.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.pending.remove(key) {
            Some(handle) => {
                handle.abort();
                debug!(?key, "cleanup timer canceled");
                true
            }
            None => false,
        }
    }

    /// Marks a delivered expiry as consumed, dropping the bookkeeping
    /// entry for `key`. Call this when an expired key arrives on the
    /// channel; the task itself has already finished.
    pub fn acknowledge(&mut self, key: &K) {
        self.pending.remove(key);
    }

    /// Whether a timer is currently pending for `key`.
    ///
    /// An expired-but-unacknowledged key still counts as pending here;
    /// only the expiry channel says whether it actually fired.
    pub fn is_armed(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The configured recovery window.
    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Aborts all in-flight timer tasks so none outlive their owner.
impl<K> Drop for CleanupScheduler<K> {
    fn drop(&mut self) {
        for handle in self.pending.values() {
            handle.abort();
        }
    }
}
