//! Manual host driver - headless host for tests and embedders.
//!
//! A real UI framework fires phases from its own render loop. `ManualHost`
//! lets an embedder (or a test) be that loop: fire phases by hand, toggle
//! render-context availability, and observe every render request the core
//! issues.
//!
//! # Example
//!
//! ```ignore
//! use polynode::host::{Host, ManualHost, Phase};
//!
//! let host = ManualHost::new();
//! // ... compose nodes against the host ...
//! host.fire(Phase::Mounted);
//! host.fire(Phase::Unmounted);
//! assert_eq!(host.render_requests(), 0);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::{Host, Phase, PhaseCallback, PhasePayload};

type SharedCallback = Rc<dyn Fn(&PhasePayload)>;

/// Headless [`Host`] driven explicitly by the embedder.
pub struct ManualHost {
    callbacks: RefCell<HashMap<Phase, Vec<SharedCallback>>>,
    render_context: Cell<bool>,
    render_requests: Cell<usize>,
    missed_requests: Cell<usize>,
}

impl ManualHost {
    /// New host with a render context available (the common mounted case).
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            callbacks: RefCell::new(HashMap::new()),
            render_context: Cell::new(true),
            render_requests: Cell::new(0),
            missed_requests: Cell::new(0),
        })
    }

    /// Toggle render-context availability. With the context off,
    /// `request_render` reports failure and the request counts as missed.
    pub fn set_render_context(&self, available: bool) {
        self.render_context.set(available);
    }

    /// Fire one phase with no payload.
    pub fn fire(&self, phase: Phase) {
        self.dispatch(phase, &PhasePayload::None);
    }

    /// Fire the error-captured phase with an error payload.
    pub fn fire_error(&self, message: impl Into<String>) {
        self.dispatch(Phase::ErrorCaptured, &PhasePayload::Error(message.into()));
    }

    /// Render requests that reached a live render context.
    pub fn render_requests(&self) -> usize {
        self.render_requests.get()
    }

    /// Render requests issued while no render context existed.
    pub fn missed_requests(&self) -> usize {
        self.missed_requests.get()
    }

    /// Number of callbacks registered for `phase`.
    pub fn callback_count(&self, phase: Phase) -> usize {
        self.callbacks
            .borrow()
            .get(&phase)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn dispatch(&self, phase: Phase, payload: &PhasePayload) {
        // Snapshot so a callback may register further callbacks (a node
        // composing a child node mid-phase) without re-borrowing.
        let snapshot: Vec<SharedCallback> = self
            .callbacks
            .borrow()
            .get(&phase)
            .cloned()
            .unwrap_or_default();
        for callback in snapshot {
            callback(payload);
        }
    }
}

impl Host for ManualHost {
    fn on_phase(&self, phase: Phase, callback: PhaseCallback) {
        self.callbacks
            .borrow_mut()
            .entry(phase)
            .or_default()
            .push(Rc::from(callback));
    }

    fn request_render(&self) -> bool {
        if self.render_context.get() {
            self.render_requests.set(self.render_requests.get() + 1);
            true
        } else {
            self.missed_requests.set(self.missed_requests.get() + 1);
            false
        }
    }
}
