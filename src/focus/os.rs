//! OS capability seams for focus handling.
//!
//! The platform shell implements these against the real window server
//! (NSWorkspace/NSPanel on macOS); the controller logic only ever sees the
//! traits, so the state machine is testable without a windowing system.

/// Opaque handle to an external application as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundApp(pub String);

/// Focus bookkeeping for the host process and its neighbours.
pub trait Foreground: Send + Sync {
    /// The currently active external application, if the OS reports one.
    fn current_foreground(&self) -> Option<ForegroundApp>;

    /// Asks the OS to activate `app`. Best effort; `false` when refused.
    fn activate(&self, app: &ForegroundApp) -> bool;

    /// Whether the host process is the OS-active application right now.
    fn host_is_active(&self) -> bool;
}

/// Window operations on the transient capture surface.
pub trait Surface: Send + Sync {
    /// Moves the surface to the screen containing the pointer (centered,
    /// vertically offset) and orders it front.
    fn present_centered_at_pointer(&self);

    /// Hides the surface without destroying it.
    fn order_out(&self);

    /// Requests key status for the surface and forces the host process to
    /// the foreground so the user can type.
    fn focus_input(&self);
}
