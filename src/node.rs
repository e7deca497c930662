//! Node core and typed handles.
//!
//! A node is a plain logic value (`T`) plus a [`NodeCore`]: token, class
//! identity, lifecycle hub, children edges, the reactive-channel table and
//! the dependency-binding cache. [`Node<T>`] is the shared handle consumers
//! hold; [`AnyNode`] is the type-erased form the scope stores.
//!
//! [`BuildCx`] is the view a build closure gets while its node is under
//! construction: hub channels, dependency resolution, channel exposure, and
//! teardown-scoped effects.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;

use spark_signals::{effect, Signal};

use crate::channel::Channel;
use crate::compose::ComposeError;
use crate::host::HostHandle;
use crate::lifecycle::LifecycleHub;
use crate::resolver::{self, Binding};
use crate::scope::{ClassId, Scope};
use crate::token::{self, Token};

// =============================================================================
// Node core
// =============================================================================

type Tracker = Rc<dyn Fn()>;

/// Per-node runtime state shared by every handle to the node.
pub struct NodeCore {
    token: Token,
    identity: ClassId,
    hub: LifecycleHub,
    children: RefCell<Vec<AnyNode>>,
    channels: RefCell<Vec<(&'static str, Tracker)>>,
    resolved: RefCell<HashMap<&'static str, Option<AnyNode>>>,
    initialized: Cell<bool>,
}

impl NodeCore {
    pub(crate) fn new(identity: ClassId, hub: LifecycleHub) -> Self {
        Self {
            token: token::issue(),
            identity,
            hub,
            children: RefCell::new(Vec::new()),
            channels: RefCell::new(Vec::new()),
            resolved: RefCell::new(HashMap::new()),
            initialized: Cell::new(false),
        }
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn identity(&self) -> ClassId {
        self.identity
    }

    pub fn hub(&self) -> &LifecycleHub {
        &self.hub
    }

    /// Teardown channel (alias of `unmounted`).
    pub fn over(&self) -> Channel<()> {
        self.hub.over.clone()
    }

    /// Render-request channel.
    pub fn render(&self) -> Channel<()> {
        self.hub.render.clone()
    }

    /// Children registered under this node, in registration order.
    pub fn children(&self) -> Vec<AnyNode> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// True once construction finished and the binding cache is locked.
    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    pub(crate) fn mark_initialized(&self) {
        self.initialized.set(true);
    }

    /// Only the node itself appends here, when a descendant registers.
    pub(crate) fn adopt(&self, child: AnyNode) {
        self.children.borrow_mut().push(child);
    }

    pub(crate) fn expose_tracker(&self, name: &'static str, tracker: Tracker) {
        let mut channels = self.channels.borrow_mut();
        // re-exposing a name replaces the earlier entry
        channels.retain(|(existing, _)| *existing != name);
        channels.push((name, tracker));
    }

    pub(crate) fn tracker(&self, name: &str) -> Option<Tracker> {
        self.channels
            .borrow()
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, tracker)| tracker.clone())
    }

    pub(crate) fn cached(&self, property: &str) -> Option<Option<AnyNode>> {
        self.resolved.borrow().get(property).cloned()
    }

    pub(crate) fn cache(&self, property: &'static str, value: Option<AnyNode>) {
        self.resolved.borrow_mut().insert(property, value);
    }
}

// =============================================================================
// Type-erased and typed handles
// =============================================================================

/// Object-safe view of a node, independent of its logic type.
pub trait NodeObject {
    fn core(&self) -> &NodeCore;
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

/// Shared, type-erased node handle (what the scope stores).
pub type AnyNode = Rc<dyn NodeObject>;

pub(crate) struct NodeInner<T> {
    core: NodeCore,
    logic: T,
}

impl<T: 'static> NodeObject for NodeInner<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Shared handle to a composed node. Clones share the node. Derefs to the
/// logic value.
pub struct Node<T: 'static> {
    inner: Rc<NodeInner<T>>,
}

impl<T: 'static> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Node<T> {
    pub(crate) fn new(core: NodeCore, logic: T) -> Self {
        Self {
            inner: Rc::new(NodeInner { core, logic }),
        }
    }

    pub fn core(&self) -> &NodeCore {
        &self.inner.core
    }

    pub fn token(&self) -> Token {
        self.inner.core.token()
    }

    pub fn identity(&self) -> ClassId {
        self.inner.core.identity()
    }

    /// Cached dependency lookup by binding property name. On an initialized
    /// node this never re-queries the scope; it returns what construction
    /// resolved (possibly nothing), every time.
    pub fn dependency<U: 'static>(&self, property: &str) -> Option<Node<U>> {
        self.core()
            .cached(property)
            .flatten()
            .and_then(|object| Node::<U>::from_object(&object))
    }

    pub(crate) fn as_object(&self) -> AnyNode {
        self.inner.clone()
    }

    pub(crate) fn from_object(object: &AnyNode) -> Option<Node<T>> {
        object
            .clone()
            .into_any()
            .downcast::<NodeInner<T>>()
            .ok()
            .map(|inner| Node { inner })
    }
}

impl<T: 'static> Deref for Node<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.logic
    }
}

// =============================================================================
// Build context
// =============================================================================

/// View of the node under construction, handed to the build closure.
pub struct BuildCx<'a> {
    pub(crate) scope: &'a Rc<Scope>,
    pub(crate) host: &'a HostHandle,
    pub(crate) core: &'a NodeCore,
    pub(crate) bindings: &'a [Binding],
}

impl BuildCx<'_> {
    /// The scope this node is being constructed in (for composing children).
    pub fn scope(&self) -> &Rc<Scope> {
        self.scope
    }

    pub fn host(&self) -> &HostHandle {
        self.host
    }

    pub fn token(&self) -> Token {
        self.core.token()
    }

    pub fn identity(&self) -> ClassId {
        self.core.identity()
    }

    pub fn hub(&self) -> &LifecycleHub {
        self.core.hub()
    }

    /// Teardown channel of the node under construction.
    pub fn over(&self) -> Channel<()> {
        self.core.over()
    }

    /// Render-request channel of the node under construction.
    pub fn render(&self) -> Channel<()> {
        self.core.render()
    }

    /// Expose a reactive channel under `name` so a declared channel list can
    /// bridge it. Only latest-value signals qualify, which this signature
    /// enforces; exposing the same name twice keeps the later channel.
    pub fn expose<V>(&self, name: &'static str, channel: &Signal<V>)
    where
        V: Clone + PartialEq + 'static,
    {
        let channel = channel.clone();
        self.core.expose_tracker(
            name,
            Rc::new(move || {
                let _ = channel.get();
            }),
        );
    }

    /// Resolve a declared dependency binding by property name.
    ///
    /// First read performs the scope lookup and caches the outcome
    /// (including absence); absence is a normal result, never an error here.
    /// An undeclared property resolves to `None`.
    pub fn dependency<U: 'static>(&self, property: &str) -> Option<Node<U>> {
        resolver::resolve_property(self.core, self.scope, self.bindings, property)
            .and_then(|object| Node::<U>::from_object(&object))
    }

    /// Resolve a mandatory dependency, failing construction with a
    /// descriptive error when the ancestor is absent.
    pub fn require<U: 'static>(
        &self,
        property: &str,
        required: ClassId,
    ) -> Result<Node<U>, ComposeError> {
        self.dependency(property).ok_or(ComposeError::MissingDependency {
            required,
            requirer: self.identity(),
        })
    }

    /// Run `body` as a reactive effect released when this node's `over`
    /// channel fires. The conventional way for node logic to subscribe to
    /// signals without outliving the node.
    pub fn scoped_effect(&self, body: impl FnMut() + 'static) {
        let stop = effect(body);
        let release: Cell<Option<Box<dyn FnOnce()>>> = Cell::new(Some(Box::new(stop)));
        self.over().subscribe(move |_| {
            if let Some(stop) = release.take() {
                stop();
            }
        });
    }
}
