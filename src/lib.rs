//! # polynode
//!
//! Composable reactive logic nodes for UI hosts.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! UI-bound logic is written as plain values and upgraded by [`compose`]
//! into *nodes*: identified, scope-registered, lifecycle-aware objects that
//! resolve nearest-ancestor dependencies by class identity and bridge their
//! reactive state into host render requests.
//!
//! Construction flows one way:
//!
//! ```text
//! compose -> token -> lifecycle hub -> build -> bindings lock -> bridge -> scope registration
//! ```
//!
//! and then runs bidirectionally: node signals emit -> bridge requests a
//! host render; host fires phases -> hub channels emit -> node subscribers
//! react. The `over` channel (alias of `unmounted`) cancels everything a
//! node set up.
//!
//! The host framework itself stays external: the core consumes only phase
//! registration and a forced-re-render hook (see [`host::Host`]), and ships
//! [`host::ManualHost`] for headless driving and tests.
//!
//! ## Modules
//!
//! - [`token`] - process-unique node identity
//! - [`channel`] - ordered synchronous signal channels with cancellation
//! - [`lifecycle`] - host phases as subscribable channels
//! - [`host`] - the host boundary and the manual driver
//! - [`scope`] - explicit construction context, ancestor lookup, tree dump
//! - [`resolver`] - declarative nearest-ancestor dependency bindings
//! - [`node`] - node core, typed handles, build context
//! - [`compose`] - the composition wrapper entry point

pub mod channel;
pub mod compose;
pub mod host;
pub mod lifecycle;
pub mod node;
pub mod resolver;
pub mod scope;
pub mod token;

mod bridge;

// Re-export commonly used items
pub use channel::{Channel, Subscription};
pub use compose::{compose, ComposeError, ComposeOptions};
pub use host::{Host, HostHandle, ManualHost, Phase, PhaseCallback, PhasePayload};
pub use lifecycle::LifecycleHub;
pub use node::{AnyNode, BuildCx, Node, NodeCore, NodeObject};
pub use resolver::Binding;
pub use scope::{ClassId, Scope};
pub use token::{issue, Token};
