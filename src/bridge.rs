//! Reactive-Render Bridge - declared channels in, render requests out.
//!
//! For each qualifying declared reactive channel the bridge runs one effect:
//! the effect's first run only establishes the dependency, every later run
//! (an emission) asks the host for a forced re-render. The node's `render`
//! channel is always bridged, emission for emission. Nothing is deduplicated
//! here; coalescing is the host scheduler's business.
//!
//! `request_render` may report failure while no render context exists yet;
//! the bridge just lets the next emission retry, which is the deferral the
//! host contract asks for.
//!
//! All bridge subscriptions are released exactly once, synchronously, on the
//! first `over` emission - inside the host's unmount callback, so no render
//! request can be issued for an unmounted node. Emissions after teardown are
//! inert.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::effect;

use crate::host::{Host, HostHandle};
use crate::node::NodeCore;

pub(crate) fn attach(
    core: &NodeCore,
    host: &HostHandle,
    reactive_channels: &[&'static str],
    print_diagnostics: bool,
) {
    let releases: Rc<RefCell<Vec<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(Vec::new()));
    let identity = core.identity();
    let token = core.token();

    // the conventional render-request channel, always bridged
    {
        let host = host.clone();
        let subscription = core.render().subscribe(move |_| {
            let delivered = host.request_render();
            if print_diagnostics {
                tracing::debug!(
                    identity = %identity,
                    token = %token.short(),
                    channel = "render",
                    delivered,
                    "render requested"
                );
            }
        });
        releases
            .borrow_mut()
            .push(Box::new(move || subscription.unsubscribe()));
    }

    // declared reactive channels
    for name in reactive_channels {
        let Some(track) = core.tracker(name) else {
            if print_diagnostics {
                tracing::warn!(
                    identity = %identity,
                    channel = *name,
                    "declared reactive channel does not qualify; skipping"
                );
            }
            continue;
        };

        let host = host.clone();
        let name = *name;
        let mut first = true;
        let stop = effect(move || {
            track();
            if first {
                // dependency-tracking run, not an emission
                first = false;
                return;
            }
            let delivered = host.request_render();
            if print_diagnostics {
                tracing::debug!(
                    identity = %identity,
                    token = %token.short(),
                    channel = name,
                    delivered,
                    "render requested"
                );
            }
        });
        releases.borrow_mut().push(Box::new(stop));
    }

    // first over emission releases everything; later ones find the list empty
    let releases_on_over = releases.clone();
    core.over().subscribe(move |_| {
        for release in releases_on_over.borrow_mut().drain(..) {
            release();
        }
    });
}
