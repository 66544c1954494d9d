//! Process-wide observable session state.
//!
//! Each field is an independent watch channel: exactly one component writes
//! it (single-writer-per-field discipline) and any number of consumers
//! subscribe. Created once at startup and lives for the process lifetime.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use tokio::sync::watch;

/// The cadences the monitoring scheduler accepts, in seconds.
pub const ALLOWED_MONITORING_INTERVALS: [u32; 7] = [5, 10, 15, 20, 25, 30, 60];

pub const DEFAULT_MONITORING_INTERVAL_SECS: u32 = 10;

/// One observable field. `set` replaces the value and wakes subscribers
/// even when the new value equals the old one, preserving the
/// every-write-is-an-event contract.
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> Observable<T> {
    fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

/// Shared session state. Writers: the monitoring scheduler
/// (`current_distraction`), the focus controller (`capture_surface_open`)
/// and the composition root (settings and session bounds).
pub struct SharedState {
    pub capture_surface_open: Observable<bool>,
    pub monitoring_enabled: Observable<bool>,
    pub monitoring_interval_secs: Observable<u32>,
    pub background_research_enabled: Observable<bool>,
    pub current_distraction: Observable<Option<String>>,
    pub session_start: Observable<Option<DateTime<Utc>>>,
    pub session_end: Observable<Option<DateTime<Utc>>>,
}

impl SharedState {
    pub fn new(
        monitoring_enabled: bool,
        monitoring_interval_secs: u32,
        background_research_enabled: bool,
    ) -> Self {
        let interval = if is_allowed_interval(monitoring_interval_secs) {
            monitoring_interval_secs
        } else {
            DEFAULT_MONITORING_INTERVAL_SECS
        };

        Self {
            capture_surface_open: Observable::new(false),
            monitoring_enabled: Observable::new(monitoring_enabled),
            monitoring_interval_secs: Observable::new(interval),
            background_research_enabled: Observable::new(background_research_enabled),
            current_distraction: Observable::new(None),
            session_start: Observable::new(None),
            session_end: Observable::new(None),
        }
    }

    /// Enables or disables monitoring. Disabling also clears the current
    /// distraction: the banner must never outlive the feature that put it
    /// there.
    pub fn set_monitoring_enabled(&self, enabled: bool) {
        self.monitoring_enabled.set(enabled);
        if !enabled {
            self.current_distraction.set(None);
        }
    }

    pub fn set_monitoring_interval(&self, secs: u32) -> Result<()> {
        if !is_allowed_interval(secs) {
            bail!(
                "monitoring interval {secs}s is not one of {:?}",
                ALLOWED_MONITORING_INTERVALS
            );
        }
        self.monitoring_interval_secs.set(secs);
        Ok(())
    }
}

pub fn is_allowed_interval(secs: u32) -> bool {
    ALLOWED_MONITORING_INTERVALS.contains(&secs)
}
