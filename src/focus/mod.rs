pub mod controller;
pub mod os;

pub use controller::{FocusController, FocusEvent, FocusPhase};
pub use os::{Foreground, ForegroundApp, Surface};
