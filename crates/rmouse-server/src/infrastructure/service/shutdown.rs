//! Cooperative shutdown signalling for listener loops.
//!
//! Every long-lived loop (discovery, accept, per-session read) receives a
//! clone of a [`ShutdownToken`] and checks it at each bounded wait point
//! (socket read timeout, accept poll).  Because every wait is bounded, a
//! triggered token is observed within one poll interval, which is what lets
//! `stop()` give a hard upper bound on teardown latency.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A cloneable cancellation signal.
///
/// Triggering is one-way: once fired, the token stays fired for all clones.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    fired: Arc<AtomicBool>,
}

impl ShutdownToken {
    /// Creates an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals every holder of a clone to stop.
    pub fn trigger(&self) {
        self.fired.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`trigger`](Self::trigger) has been called.
    pub fn is_triggered(&self) -> bool {
        self.fired.load(Ordering::Relaxed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
