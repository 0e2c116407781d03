//! Cooperative shutdown signal
//!
//! The run loop polls a single flag between iterations. Anything that wants
//! the bridge to stop (a Ctrl-C handler, a test, a service manager hook)
//! holds a clone and calls [`ShutdownSignal::trigger`]. Triggering is
//! one-way; a triggered signal never reports running again.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

/// Cloneable run-flag shared between the driver and signal sources
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    running: Arc<AtomicBool>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Create a signal in the running state
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Ask every holder to stop
    pub fn trigger(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// True until `trigger` has been called on any clone
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_is_seen_by_clones() {
        let signal = ShutdownSignal::new();
        let remote = signal.clone();
        assert!(signal.is_running());

        remote.trigger();
        assert!(!signal.is_running());

        // Idempotent
        remote.trigger();
        assert!(!signal.is_running());
    }
}
