//! Application wiring.
//!
//! `FlowBuddy` builds and owns every subsystem: shared state restored from
//! the settings store, the SQLite collaborator, the inference client, the
//! monitoring scheduler, the thought pipeline and the focus controller.
//! The GUI shell talks to it through the methods here plus the focus event
//! sender; nothing else mutates settings or session bounds.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::capture::ScreenSource;
use crate::db::Database;
use crate::focus::{FocusController, FocusEvent, Foreground, Surface};
use crate::inference::{InferenceClient, InferenceConfig};
use crate::monitoring::MonitoringScheduler;
use crate::settings::SettingsStore;
use crate::state::SharedState;
use crate::thoughts::ThoughtPipeline;

const DB_FILE: &str = "flowbuddy.sqlite3";
const SETTINGS_FILE: &str = "settings.json";
const FOCUS_CHANNEL_CAPACITY: usize = 32;

pub struct FlowBuddyConfig {
    pub data_dir: PathBuf,
    pub inference: InferenceConfig,
}

/// Platform services the library cannot provide itself. The shell passes
/// real screen-capture and window-server bindings; tests pass fakes.
pub struct PlatformServices {
    pub screen: Arc<dyn ScreenSource>,
    pub foreground: Arc<dyn Foreground>,
    pub surface: Arc<dyn Surface>,
}

pub struct FlowBuddy {
    settings: SettingsStore,
    state: Arc<SharedState>,
    db: Database,
    scheduler: MonitoringScheduler,
    pipeline: ThoughtPipeline,
    focus_events: mpsc::Sender<FocusEvent>,
    focus_task: JoinHandle<()>,
}

impl FlowBuddy {
    /// Wires the application together and restores persisted preferences.
    /// Must run inside a tokio runtime; the focus controller (and, when
    /// monitoring was left enabled, the scheduler loop) start immediately.
    pub async fn launch(config: FlowBuddyConfig, platform: PlatformServices) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("failed to create data directory {}", config.data_dir.display())
        })?;

        let settings = SettingsStore::new(config.data_dir.join(SETTINGS_FILE))?;
        let monitoring = settings.monitoring();
        let state = Arc::new(SharedState::new(
            monitoring.enabled,
            monitoring.interval_secs,
            monitoring.background_research_enabled,
        ));

        let db = Database::new(config.data_dir.join(DB_FILE))?;
        let client = Arc::new(InferenceClient::new(config.inference));

        let scheduler = MonitoringScheduler::new(state.clone(), platform.screen, client.clone());
        let pipeline = ThoughtPipeline::new(db.clone(), client, state.clone());

        let (focus_tx, focus_rx) = mpsc::channel(FOCUS_CHANNEL_CAPACITY);
        let controller = FocusController::new(
            platform.foreground,
            platform.surface,
            state.clone(),
            pipeline.clone(),
        );
        let focus_task = tokio::spawn(controller.run(focus_rx));

        if monitoring.enabled {
            scheduler.start(state.monitoring_interval_secs.get()).await;
        }

        info!("flowbuddy launched, monitoring enabled: {}", monitoring.enabled);
        Ok(Self {
            settings,
            state,
            db,
            scheduler,
            pipeline,
            focus_events: focus_tx,
            focus_task,
        })
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn thoughts(&self) -> &ThoughtPipeline {
        &self.pipeline
    }

    /// Sender for the focus controller's inbound channel. The hotkey
    /// listener and the surface callbacks each hold a clone.
    pub fn focus_events(&self) -> mpsc::Sender<FocusEvent> {
        self.focus_events.clone()
    }

    pub async fn set_monitoring_enabled(&self, enabled: bool) -> Result<()> {
        self.state.set_monitoring_enabled(enabled);

        let mut monitoring = self.settings.monitoring();
        monitoring.enabled = enabled;
        self.settings.update_monitoring(monitoring)?;

        if enabled {
            self.scheduler
                .start(self.state.monitoring_interval_secs.get())
                .await;
        } else {
            self.scheduler.stop().await;
        }
        Ok(())
    }

    /// Changes the monitoring cadence. Rejects values outside the allowed
    /// set; restarts the running loop when monitoring is enabled.
    pub async fn set_monitoring_interval(&self, secs: u32) -> Result<()> {
        self.state.set_monitoring_interval(secs)?;

        let mut monitoring = self.settings.monitoring();
        monitoring.interval_secs = secs;
        self.settings.update_monitoring(monitoring)?;

        if self.state.monitoring_enabled.get() {
            self.scheduler.start(secs).await;
        }
        Ok(())
    }

    pub fn set_background_research_enabled(&self, enabled: bool) -> Result<()> {
        self.state.background_research_enabled.set(enabled);

        let mut monitoring = self.settings.monitoring();
        monitoring.background_research_enabled = enabled;
        self.settings.update_monitoring(monitoring)
    }

    pub fn start_session(&self) {
        self.state.session_start.set(Some(Utc::now()));
        self.state.session_end.set(None);
        info!("focus session started");
    }

    pub fn stop_session(&self) {
        self.state.session_end.set(Some(Utc::now()));
        info!("focus session stopped");
    }

    /// Ends the session for good: clears both bounds and wipes every
    /// captured thought. Research tasks still in flight find their rows
    /// gone and drop their results.
    pub async fn finish_session(&self) -> Result<()> {
        self.state.session_start.set(None);
        self.state.session_end.set(None);
        let removed = self.db.delete_all_thoughts().await?;
        info!("focus session finished, {removed} thoughts cleared");
        Ok(())
    }

    pub async fn shutdown(self) {
        self.scheduler.stop().await;
        drop(self.focus_events);
        let _ = self.focus_task.await;
        info!("flowbuddy shut down");
    }
}
