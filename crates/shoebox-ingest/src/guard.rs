//! Cancellation and deadlines.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use shoebox_core::ScanError;

/// Shared flag a caller sets to stop a running scan.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag before the next scan.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Checked between files: cancellation or an expired deadline ends the
/// scan with [`ScanError::Interrupted`].
#[derive(Debug, Clone)]
pub struct ScanGuard {
    flag: CancellationFlag,
    deadline: Option<Instant>,
}

impl ScanGuard {
    pub fn new(flag: CancellationFlag, timeout: Option<Duration>) -> Self {
        Self {
            flag,
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// A guard that never trips.
    pub fn unlimited() -> Self {
        Self::new(CancellationFlag::new(), None)
    }

    pub fn check(&self) -> Result<(), ScanError> {
        if self.flag.is_cancelled() {
            return Err(ScanError::Interrupted);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ScanError::Interrupted),
            _ => Ok(()),
        }
    }
}
