//! Signal channels - ordered, synchronous event delivery with cancellation.
//!
//! A [`Channel`] is the event-shaped counterpart to a reactive value signal:
//! it holds no value, it just delivers each emission to every live subscriber
//! in subscription order. Channels back the lifecycle hub (one per host
//! phase) and the per-node render-request trigger.
//!
//! Cloning a channel clones the handle, not the channel: all clones share one
//! subscriber registry. That is what makes `over` a true alias of
//! `unmounted`.
//!
//! # API
//!
//! - `subscribe(f)` - register a handler, returns a [`Subscription`]
//! - `subscribe_until(over, f)` - handler auto-released when `over` fires
//! - `emit(payload)` / `fire()` - synchronous, ordered delivery
//!
//! # Example
//!
//! ```ignore
//! use polynode::channel::Channel;
//!
//! let over: Channel<()> = Channel::new();
//! let render: Channel<()> = Channel::new();
//!
//! render.subscribe_until(&over, |_| {
//!     // runs on every render.fire() until over fires
//! });
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

// =============================================================================
// Channel
// =============================================================================

type Handler<P> = Rc<dyn Fn(&P)>;

struct ChannelInner<P> {
    subscribers: RefCell<Vec<(usize, Handler<P>)>>,
    next_id: Cell<usize>,
}

/// Single-point signal channel: fires, carries an optional payload, never
/// completes on its own.
pub struct Channel<P = ()> {
    inner: Rc<ChannelInner<P>>,
}

impl<P> Clone for Channel<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: 'static> Default for Channel<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static> Channel<P> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ChannelInner {
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// True when both handles point at the same underlying channel.
    pub fn same_channel(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Register a handler. Delivery order matches subscription order.
    pub fn subscribe(&self, handler: impl Fn(&P) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(handler)));

        let inner = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = Weak::upgrade(&inner) {
                inner
                    .subscribers
                    .borrow_mut()
                    .retain(|(sub_id, _)| *sub_id != id);
            }
        })
    }

    /// Register a handler that is released when `over` fires. This is the
    /// teardown-scoped form every node-owned subscription should use.
    pub fn subscribe_until(&self, over: &Channel<()>, handler: impl Fn(&P) + 'static) {
        let subscription = self.subscribe(handler);
        over.subscribe(move |_| subscription.unsubscribe());
    }

    /// Deliver `payload` to every live subscriber, synchronously, in
    /// subscription order.
    ///
    /// Handlers may subscribe or unsubscribe (including themselves) during
    /// delivery; a handler removed mid-emission is not invoked, a handler
    /// added mid-emission sees only later emissions.
    pub fn emit(&self, payload: P) {
        let snapshot: Vec<(usize, Handler<P>)> = self.inner.subscribers.borrow().clone();
        for (id, handler) in snapshot {
            let live = self
                .inner
                .subscribers
                .borrow()
                .iter()
                .any(|(sub_id, _)| *sub_id == id);
            if live {
                handler(&payload);
            }
        }
    }
}

impl Channel<()> {
    /// Payload-free emission.
    pub fn fire(&self) {
        self.emit(());
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Handle for releasing one channel subscription.
///
/// Releasing is idempotent: the second and later `unsubscribe` calls are
/// no-ops. Dropping the handle without calling `unsubscribe` leaves the
/// subscription live (use [`Channel::subscribe_until`] for automatic
/// teardown).
pub struct Subscription {
    release: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Cell::new(Some(Box::new(release))),
        }
    }

    /// Release the subscription. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// False once `unsubscribe` has run.
    pub fn is_active(&self) -> bool {
        // Cell<Option<..>> has no borrow-free peek; take and put back.
        let release = self.release.take();
        let active = release.is_some();
        self.release.set(release);
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_delivery_in_subscription_order() {
        let channel: Channel<u32> = Channel::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let seen = seen.clone();
            channel.subscribe(move |value| {
                seen.borrow_mut().push(format!("{tag}{value}"));
            });
        }

        channel.emit(1);
        channel.emit(2);
        assert_eq!(*seen.borrow(), ["a1", "b1", "c1", "a2", "b2", "c2"]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let channel: Channel<()> = Channel::new();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let subscription = channel.subscribe(move |_| {
            count_clone.set(count_clone.get() + 1);
        });

        channel.emit(());
        subscription.unsubscribe();
        subscription.unsubscribe();
        channel.emit(());

        assert_eq!(count.get(), 1);
        assert!(!subscription.is_active());
    }

    #[test]
    fn test_subscribe_until_releases_on_over() {
        let over: Channel<()> = Channel::new();
        let channel: Channel<()> = Channel::new();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        channel.subscribe_until(&over, move |_| {
            count_clone.set(count_clone.get() + 1);
        });

        channel.fire();
        over.fire();
        channel.fire();
        // over firing again must not panic or double-release
        over.fire();

        assert_eq!(count.get(), 1);
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_handler_can_unsubscribe_peer_mid_emission() {
        let channel: Channel<()> = Channel::new();
        let count = Rc::new(Cell::new(0));

        let count_b = count.clone();
        let subscription_b = Rc::new(RefCell::new(None::<Subscription>));

        let subscription_b_ref = subscription_b.clone();
        channel.subscribe(move |_| {
            // first handler removes the second before it ever runs
            if let Some(sub) = subscription_b_ref.borrow().as_ref() {
                sub.unsubscribe();
            }
        });
        *subscription_b.borrow_mut() = Some(channel.subscribe(move |_| {
            count_b.set(count_b.get() + 1);
        }));

        channel.fire();
        assert_eq!(count.get(), 0, "removed handler must not run");
    }

    #[test]
    fn test_clone_shares_subscribers() {
        let channel: Channel<()> = Channel::new();
        let alias = channel.clone();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        alias.subscribe(move |_| {
            count_clone.set(count_clone.get() + 1);
        });
        channel.fire();

        assert!(channel.same_channel(&alias));
        assert_eq!(count.get(), 1);
    }
}
