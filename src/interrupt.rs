//! Ctrl+C / SIGTERM handling
//!
//! The handler only raises a flag. The driver polls it between commits, so an
//! interrupted run still restores the working tree before the process exits.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "stop requested" flag
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing flag, e.g. one a test flips directly
    pub fn from_shared(flag: Arc<AtomicBool>) -> Self {
        Self(flag)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Install a process-wide handler for SIGINT (and SIGTERM on Unix) that sets this flag.
    ///
    /// Can only succeed once per process.
    pub fn install_handler(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || {
            if flag.is_set() {
                eprintln!("\nStill stopping, the working tree is being restored...");
                return;
            }
            eprintln!("\nInterrupt received, stopping after the current step...");
            flag.set();
        })
    }
}
