//! Capture-surface focus transfer.
//!
//! A 3-phase state machine decides when the capture surface is shown and
//! who gets keyboard focus back afterwards. All triggers arrive on one
//! event channel and are handled serially, so the four independent close
//! paths (submit, escape, outside click, host deactivation) cannot race.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc;

use super::os::{Foreground, ForegroundApp, Surface};
use crate::db::models::ThoughtCategory;
use crate::state::SharedState;
use crate::thoughts::ThoughtPipeline;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusEvent {
    /// Hotkey or status-bar tap: open when closed, close when open.
    Toggle,
    Submit {
        text: String,
        category: ThoughtCategory,
    },
    EscapePressed,
    /// The surface lost key status (the user clicked outside it).
    SurfaceResignedKey,
    /// The whole host process resigned active status.
    HostResignedActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPhase {
    Closed,
    Open,
    Closing,
}

pub struct FocusController {
    phase: FocusPhase,
    /// Set exactly once per Open transition, consumed exactly once on close.
    last_focused: Option<ForegroundApp>,
    foreground: Arc<dyn Foreground>,
    surface: Arc<dyn Surface>,
    state: Arc<SharedState>,
    pipeline: ThoughtPipeline,
}

impl FocusController {
    pub fn new(
        foreground: Arc<dyn Foreground>,
        surface: Arc<dyn Surface>,
        state: Arc<SharedState>,
        pipeline: ThoughtPipeline,
    ) -> Self {
        Self {
            phase: FocusPhase::Closed,
            last_focused: None,
            foreground,
            surface,
            state,
            pipeline,
        }
    }

    /// Consumes events until the channel closes. The controller owns its
    /// single inbound channel; senders live with the hotkey listener and
    /// the surface callbacks.
    pub async fn run(mut self, mut events: mpsc::Receiver<FocusEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        debug!("focus controller channel closed, exiting");
    }

    pub(crate) fn handle(&mut self, event: FocusEvent) {
        match event {
            FocusEvent::Toggle => {
                if self.phase == FocusPhase::Closed {
                    self.open();
                } else {
                    self.close("toggle");
                }
            }
            FocusEvent::Submit { text, category } => {
                if self.phase != FocusPhase::Open {
                    return;
                }
                // An empty submit is not a capture; the surface stays open.
                if text.trim().is_empty() {
                    return;
                }
                self.pipeline.submit(text, category);
                self.close("submit");
            }
            FocusEvent::EscapePressed => self.close("escape"),
            FocusEvent::SurfaceResignedKey => self.close("outside click"),
            FocusEvent::HostResignedActive => self.close("host deactivated"),
        }
    }

    pub(crate) fn phase(&self) -> FocusPhase {
        self.phase
    }

    fn open(&mut self) {
        if self.phase != FocusPhase::Closed {
            return;
        }

        self.surface.present_centered_at_pointer();
        // Record who held focus before we steal it; this is the only place
        // `last_focused` is written.
        self.last_focused = self.foreground.current_foreground();
        self.surface.focus_input();

        self.phase = FocusPhase::Open;
        self.state.capture_surface_open.set(true);
        debug!("capture surface opened, previous app: {:?}", self.last_focused);
    }

    /// Terminal cleanup shared by every close trigger.
    fn close(&mut self, trigger: &str) {
        if self.phase != FocusPhase::Open {
            return;
        }
        self.phase = FocusPhase::Closing;

        self.surface.order_out();

        // Consume the recorded app unconditionally so a stale handle can
        // never leak into the next session.
        let previous = self.last_focused.take();

        if self.foreground.host_is_active() {
            // Hiding our own window does not make the OS restore focus; we
            // must hand it back explicitly.
            if let Some(app) = previous {
                if !self.foreground.activate(&app) {
                    warn!("OS refused to reactivate {app:?}, skipping focus handback");
                }
            }
        }
        // When the host is no longer active the user already clicked into
        // another app; reactivating would steal focus back.

        self.phase = FocusPhase::Closed;
        self.state.capture_surface_open.set(false);
        debug!("capture surface closed ({trigger})");
    }
}
