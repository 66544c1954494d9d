//! Single-slot in-flight guard for the monitoring loop.
//!
//! At most one tick's analysis may be outstanding; a tick that fires while
//! the slot is held is dropped, not queued. The permit releases on drop, so
//! the slot frees on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct InFlightSlot {
    busy: Arc<AtomicBool>,
}

impl InFlightSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot, or returns `None` when work is already in flight.
    pub fn try_acquire(&self) -> Option<SlotPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SlotPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

pub struct SlotPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for SlotPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_permit_is_held() {
        let slot = InFlightSlot::new();
        let permit = slot.try_acquire().expect("first acquire");
        assert!(slot.is_busy());
        assert!(slot.try_acquire().is_none());
        drop(permit);
        assert!(!slot.is_busy());
        assert!(slot.try_acquire().is_some());
    }

    #[test]
    fn permit_releases_even_when_work_panics() {
        let slot = InFlightSlot::new();
        let cloned = slot.clone();
        let result = std::panic::catch_unwind(move || {
            let _permit = cloned.try_acquire().unwrap();
            panic!("analysis blew up");
        });
        assert!(result.is_err());
        assert!(!slot.is_busy());
    }
}
