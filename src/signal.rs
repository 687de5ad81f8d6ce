use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Records that an interrupt arrived so the interactive loop can redraw its
/// prompt at the next safe point.
///
/// The handler itself only sets the flag; all other work happens in the loop.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// Route SIGINT to a new flag instead of terminating the process.
    ///
    /// Can only succeed once per process.
    pub fn install() -> Result<Self, ctrlc::Error> {
        let flag = Self::default();
        let handler = flag.clone();
        ctrlc::set_handler(move || handler.raise())?;
        log::debug!("SIGINT handler installed");
        Ok(flag)
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns whether an interrupt arrived since the last call, clearing the flag.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}
