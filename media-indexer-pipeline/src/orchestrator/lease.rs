//! Run-exclusion guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Proof that the holder is the only run in flight.
///
/// Dropping the lease frees the slot, including when the run fails or
/// panics.
#[derive(Debug)]
pub struct RunLease {
    flag: Arc<AtomicBool>,
}

impl RunLease {
    /// Take the slot if it is free.
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for RunLease {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
