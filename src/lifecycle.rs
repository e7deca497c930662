//! Lifecycle Signal Hub - host phase transitions as subscribable channels.
//!
//! Every node carries one [`LifecycleHub`]. Attaching the hub registers one
//! callback per host phase, exactly once, so subscribers on any channel see
//! every later transition without talking to the host's registration API
//! themselves.
//!
//! Two channels are special:
//!
//! - `over` is an alias of `unmounted` (the same channel, not a copy) and is
//!   the universal teardown signal: every subscription a node or its
//!   descendants set up should be scoped to it.
//! - `render` is not fed by the host at all; the node and its collaborators
//!   fire it to request a host re-render (bridged in [`crate::bridge`]).
//!
//! # Example
//!
//! ```ignore
//! let hub = LifecycleHub::attach(&host);
//! hub.mounted.subscribe_until(&hub.over, |_| {
//!     // runs on every mount transition until teardown
//! });
//! ```

use crate::channel::Channel;
use crate::host::{Host, HostHandle, Phase, PhasePayload};

/// One cancellable signal channel per host lifecycle phase, plus the derived
/// teardown channel and the render-request channel.
pub struct LifecycleHub {
    pub before_mount: Channel<()>,
    pub mounted: Channel<()>,
    pub before_update: Channel<()>,
    pub updated: Channel<()>,
    pub before_unmount: Channel<()>,
    pub unmounted: Channel<()>,
    /// Carries the host's error payload text.
    pub error_captured: Channel<String>,
    pub render_tracked: Channel<()>,
    pub render_triggered: Channel<()>,
    /// Teardown signal; alias of `unmounted`.
    pub over: Channel<()>,
    /// Render-request trigger; never fed by the host.
    pub render: Channel<()>,
}

impl LifecycleHub {
    /// Build the hub and register its phase callbacks with `host`.
    ///
    /// Registration happens here and nowhere else; a hub is live from the
    /// moment it exists. Attaching outside a valid host context is a caller
    /// precondition violation (see [`crate::host`]), not something the hub
    /// detects.
    pub fn attach(host: &HostHandle) -> Self {
        let unmounted = Channel::new();
        let hub = Self {
            before_mount: Channel::new(),
            mounted: Channel::new(),
            before_update: Channel::new(),
            updated: Channel::new(),
            before_unmount: Channel::new(),
            over: unmounted.clone(),
            unmounted,
            error_captured: Channel::new(),
            render_tracked: Channel::new(),
            render_triggered: Channel::new(),
            render: Channel::new(),
        };

        for phase in Phase::ALL {
            match phase {
                Phase::ErrorCaptured => {
                    let channel = hub.error_captured.clone();
                    host.on_phase(
                        phase,
                        Box::new(move |payload| {
                            let text = match payload {
                                PhasePayload::Error(text) => text.clone(),
                                PhasePayload::None => String::new(),
                            };
                            channel.emit(text);
                        }),
                    );
                }
                _ => {
                    let channel = hub.plain_channel(phase).clone();
                    host.on_phase(phase, Box::new(move |_| channel.fire()));
                }
            }
        }

        hub
    }

    fn plain_channel(&self, phase: Phase) -> &Channel<()> {
        match phase {
            Phase::BeforeMount => &self.before_mount,
            Phase::Mounted => &self.mounted,
            Phase::BeforeUpdate => &self.before_update,
            Phase::Updated => &self.updated,
            Phase::BeforeUnmount => &self.before_unmount,
            Phase::Unmounted => &self.unmounted,
            Phase::RenderTracked => &self.render_tracked,
            Phase::RenderTriggered => &self.render_triggered,
            Phase::ErrorCaptured => unreachable!("error_captured carries a payload"),
        }
    }
}
