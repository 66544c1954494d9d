//! Core of a desktop focus assistant: ambient screen monitoring, thought
//! capture with remote classification, optional background research and
//! keyboard-focus handover around a transient capture surface. The GUI
//! shell links against this crate and supplies the platform services
//! (screen capture, window server bindings).

pub mod app;
pub mod capture;
pub mod db;
pub mod focus;
pub mod inference;
pub mod monitoring;
pub mod settings;
pub mod state;
pub mod thoughts;

pub use app::{FlowBuddy, FlowBuddyConfig, PlatformServices};
pub use capture::ScreenSource;
pub use db::models::{CapturedThought, ResearchReport, ThoughtCategory};
pub use db::Database;
pub use focus::{FocusEvent, Foreground, ForegroundApp, Surface};
pub use inference::{InferenceClient, InferenceConfig};
pub use state::SharedState;

/// Initializes logging from `RUST_LOG`, defaulting to `info`. The shell
/// calls this once before [`FlowBuddy::launch`].
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
