//! Periodic screen monitoring.
//!
//! The scheduler drives a repeating context check: capture the screen,
//! downsample it, ask the vision classifier whether the user is distracted
//! and publish the verdict. Ticks never overlap; a tick that fires while
//! analysis is still running is dropped. Failures are logged and leave the
//! published state untouched until the next tick.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::slot::{InFlightSlot, SlotPermit};
use crate::capture::{prepare_for_upload, ScreenSource};
use crate::inference::{InferenceClient, InferenceError, ScreenContext, ScreenStatus};
use crate::state::SharedState;

/// Vision-classification capability consumed by the scheduler. Implemented
/// by [`InferenceClient`]; tests inject fakes.
#[async_trait]
pub trait ScreenAnalyzer: Send + Sync {
    async fn analyze_screen(&self, jpeg_bytes: &[u8]) -> Result<ScreenContext, InferenceError>;
}

#[async_trait]
impl ScreenAnalyzer for InferenceClient {
    async fn analyze_screen(&self, jpeg_bytes: &[u8]) -> Result<ScreenContext, InferenceError> {
        InferenceClient::analyze_screen(self, jpeg_bytes).await
    }
}

pub struct MonitoringScheduler {
    state: Arc<SharedState>,
    source: Arc<dyn ScreenSource>,
    analyzer: Arc<dyn ScreenAnalyzer>,
    slot: InFlightSlot,
    loop_task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl MonitoringScheduler {
    pub fn new(
        state: Arc<SharedState>,
        source: Arc<dyn ScreenSource>,
        analyzer: Arc<dyn ScreenAnalyzer>,
    ) -> Self {
        Self {
            state,
            source,
            analyzer,
            slot: InFlightSlot::new(),
            loop_task: Mutex::new(None),
        }
    }

    /// Arms the repeating timer at `interval_secs`, atomically replacing any
    /// loop that is already running. Two timers are never live at once.
    pub async fn start(&self, interval_secs: u32) {
        let mut guard = self.loop_task.lock().await;
        if let Some((token, handle)) = guard.take() {
            token.cancel();
            handle.abort();
        }

        info!("Monitoring loop armed at {interval_secs}s cadence");
        let token = CancellationToken::new();
        let handle = tokio::spawn(monitor_loop(
            self.state.clone(),
            self.source.clone(),
            self.analyzer.clone(),
            self.slot.clone(),
            u64::from(interval_secs),
            token.clone(),
        ));
        *guard = Some((token, handle));
    }

    pub async fn stop(&self) {
        let mut guard = self.loop_task.lock().await;
        if let Some((token, handle)) = guard.take() {
            token.cancel();
            handle.abort();
            info!("Monitoring loop stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.loop_task.lock().await.is_some()
    }
}

async fn monitor_loop(
    state: Arc<SharedState>,
    source: Arc<dyn ScreenSource>,
    analyzer: Arc<dyn ScreenAnalyzer>,
    slot: InFlightSlot,
    interval_secs: u64,
    cancel_token: CancellationToken,
) {
    // First check happens one full interval after arming, not immediately;
    // enabling monitoring or changing the cadence must not trigger an
    // instant capture.
    let period = Duration::from_secs(interval_secs);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                dispatch_tick(&slot, state.clone(), source.clone(), analyzer.clone());
            }
            _ = cancel_token.cancelled() => {
                debug!("monitoring loop shutting down");
                break;
            }
        }
    }
}

/// Claims the in-flight slot and spawns one context check. Returns `false`
/// when the previous check is still running and the tick was dropped.
pub(crate) fn dispatch_tick(
    slot: &InFlightSlot,
    state: Arc<SharedState>,
    source: Arc<dyn ScreenSource>,
    analyzer: Arc<dyn ScreenAnalyzer>,
) -> bool {
    let Some(permit) = slot.try_acquire() else {
        debug!("monitoring tick dropped; previous analysis still in flight");
        return false;
    };

    tokio::spawn(run_guarded(permit, state, source, analyzer));
    true
}

async fn run_guarded(
    permit: SlotPermit,
    state: Arc<SharedState>,
    source: Arc<dyn ScreenSource>,
    analyzer: Arc<dyn ScreenAnalyzer>,
) {
    // Permit held for the full check; released on drop regardless of outcome.
    let _permit = permit;
    if let Err(err) = check_context(&state, source.as_ref(), analyzer.as_ref()).await {
        warn!("context check failed, keeping previous state: {err:#}");
    }
}

/// One tick: capture, downsample, classify, publish. Strictly ordered; any
/// failure leaves `current_distraction` unchanged.
async fn check_context(
    state: &SharedState,
    source: &dyn ScreenSource,
    analyzer: &dyn ScreenAnalyzer,
) -> Result<()> {
    if !state.monitoring_enabled.get() {
        return Ok(());
    }

    let frame = source.capture().await.context("screen capture failed")?;
    let jpeg = prepare_for_upload(&frame).context("screenshot downsampling failed")?;

    let context = analyzer
        .analyze_screen(&jpeg)
        .await
        .context("vision classification failed")?;

    // The user may have switched monitoring off while the classifier was
    // busy; `set_monitoring_enabled(false)` already cleared the distraction
    // and a stale verdict must not repollute it.
    if !state.monitoring_enabled.get() {
        debug!("discarding screen verdict, monitoring disabled mid-check");
        return Ok(());
    }

    debug!(
        "screen context: {:?} app={} summary={}",
        context.status, context.app, context.summary
    );

    match context.status {
        ScreenStatus::Distracted => {
            state
                .current_distraction
                .set(Some(format!("{}: {}", context.app, context.summary)));
        }
        ScreenStatus::Work => {
            state.current_distraction.set(None);
        }
    }

    Ok(())
}
