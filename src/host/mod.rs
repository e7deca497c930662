//! Host boundary - what the core consumes from the UI framework.
//!
//! The core never schedules renders or owns a component tree. It consumes
//! exactly two host facilities:
//!
//! - lifecycle phase registration: the host invokes a registered callback
//!   whenever the surrounding component crosses a phase,
//! - a forced re-render hook, reachable only while a render context exists.
//!
//! Constructing a node against a host that is not inside a live component
//! context is a caller precondition violation; the core does not trap it.

use std::rc::Rc;

pub mod manual;

pub use manual::ManualHost;

// =============================================================================
// Phases
// =============================================================================

/// Host lifecycle phases, in the order the host fires them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    BeforeMount,
    Mounted,
    BeforeUpdate,
    Updated,
    BeforeUnmount,
    Unmounted,
    ErrorCaptured,
    RenderTracked,
    RenderTriggered,
}

impl Phase {
    pub const ALL: [Phase; 9] = [
        Phase::BeforeMount,
        Phase::Mounted,
        Phase::BeforeUpdate,
        Phase::Updated,
        Phase::BeforeUnmount,
        Phase::Unmounted,
        Phase::ErrorCaptured,
        Phase::RenderTracked,
        Phase::RenderTriggered,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::BeforeMount => "before_mount",
            Phase::Mounted => "mounted",
            Phase::BeforeUpdate => "before_update",
            Phase::Updated => "updated",
            Phase::BeforeUnmount => "before_unmount",
            Phase::Unmounted => "unmounted",
            Phase::ErrorCaptured => "error_captured",
            Phase::RenderTracked => "render_tracked",
            Phase::RenderTriggered => "render_triggered",
        }
    }
}

/// Payload delivered with a phase transition. Only `ErrorCaptured` carries
/// data today.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PhasePayload {
    #[default]
    None,
    Error(String),
}

/// Callback registered with the host for one phase.
pub type PhaseCallback = Box<dyn Fn(&PhasePayload)>;

// =============================================================================
// Host trait
// =============================================================================

/// The host UI framework, seen from a node.
pub trait Host {
    /// Register `callback` to run on every transition of `phase` for the
    /// component the node lives in. Registrations cannot be revoked; the
    /// node's channels go quiet instead when it is torn down.
    fn on_phase(&self, phase: Phase, callback: PhaseCallback);

    /// Ask the host to force a re-render of the current render context.
    ///
    /// Returns `false` when no render context exists yet (a node that runs
    /// before first paint); callers retry on a later emission rather than
    /// treating this as an error.
    fn request_render(&self) -> bool;
}

/// Shared host handle, the form every node API takes.
pub type HostHandle = Rc<dyn Host>;
