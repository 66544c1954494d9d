pub mod scheduler;
pub mod slot;

pub use scheduler::{MonitoringScheduler, ScreenAnalyzer};
pub use slot::InFlightSlot;
