//! Composition Wrapper - the entry point that upgrades plain logic into a
//! live node.
//!
//! `compose` runs one construction, in this order:
//!
//! 1. issue a token and attach the lifecycle hub (phase callbacks registered
//!    with the host before anything can subscribe),
//! 2. run the caller's build closure (it may resolve dependencies, expose
//!    reactive channels, subscribe to hub channels, compose children),
//! 3. force-evaluate every declared dependency binding so the cache is
//!    complete,
//! 4. attach the reactive-render bridge,
//! 5. register the node in the scope (children edge, token key, class
//!    identity stack, slot overwrite),
//! 6. mark the node initialized, locking the binding cache.
//!
//! `compose` is reentrant-safe: instances share no mutable state beyond the
//! scope they are registered into, so one logic type can be composed many
//! times, under many scopes and hosts, within one host render pass.
//!
//! # Example
//!
//! ```ignore
//! use polynode::{compose, ClassId, ComposeOptions, ManualHost, Scope};
//! use spark_signals::signal;
//!
//! struct Counter { value: spark_signals::Signal<i64> }
//!
//! let scope = Scope::new();
//! let host: polynode::HostHandle = ManualHost::new();
//!
//! let counter = compose(
//!     &scope,
//!     &host,
//!     ClassId("Counter"),
//!     ComposeOptions::default().reactive("value"),
//!     |cx| {
//!         let value = signal(0_i64);
//!         cx.expose("value", &value);
//!         Ok(Counter { value })
//!     },
//! )?;
//!
//! counter.value.set(1); // -> one render request
//! ```

use std::rc::Rc;

use thiserror::Error;

use crate::bridge;
use crate::host::HostHandle;
use crate::lifecycle::LifecycleHub;
use crate::node::{BuildCx, Node, NodeCore};
use crate::resolver::{self, Binding};
use crate::scope::{ClassId, Scope};

// =============================================================================
// Options
// =============================================================================

/// Per-class composition configuration. Everything defaults off: no
/// diagnostics, no declared reactive channels beyond the conventional
/// render-request channel, no bindings.
#[derive(Clone, Debug, Default)]
pub struct ComposeOptions {
    /// Log every bridged emission and every unqualified declared channel.
    pub print_diagnostics: bool,
    /// Reactive channel names to bridge, in declaration order.
    pub reactive_channels: Vec<&'static str>,
    /// Declarative dependency binding table.
    pub bindings: Vec<Binding>,
}

impl ComposeOptions {
    pub fn reactive(mut self, name: &'static str) -> Self {
        self.reactive_channels.push(name);
        self
    }

    pub fn binding(mut self, property: &'static str, target: ClassId) -> Self {
        self.bindings.push(Binding::new(property, target));
        self
    }

    pub fn diagnostics(mut self, print: bool) -> Self {
        self.print_diagnostics = print;
        self
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Construction failures surfaced synchronously by `compose`. The core only
/// produces these on the consumer's behalf when asked to
/// ([`BuildCx::require`]); resolution absence by itself is not an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// A mandatory ancestor dependency was absent during construction.
    #[error("{requirer} requires an active {required} ancestor")]
    MissingDependency { required: ClassId, requirer: ClassId },

    /// Consumer build logic failed for its own reasons.
    #[error("{identity}: {message}")]
    Build { identity: ClassId, message: String },
}

// =============================================================================
// Entry point
// =============================================================================

/// Compose one node: run `build` under `scope` against `host`, wiring
/// identity, lifecycle, dependency resolution and render bridging around it.
///
/// On error the construction is abandoned: nothing registers in the scope,
/// and the partially-built node is dropped. The host keeps the phase
/// callbacks the hub registered; they fire into channels nobody holds, which
/// is harmless.
pub fn compose<T: 'static>(
    scope: &Rc<Scope>,
    host: &HostHandle,
    identity: ClassId,
    options: ComposeOptions,
    build: impl FnOnce(&BuildCx<'_>) -> Result<T, ComposeError>,
) -> Result<Node<T>, ComposeError> {
    let core = NodeCore::new(identity, LifecycleHub::attach(host));

    let logic = {
        let cx = BuildCx {
            scope,
            host,
            core: &core,
            bindings: &options.bindings,
        };
        build(&cx)?
    };

    resolver::lock(&core, scope, &options.bindings);
    bridge::attach(&core, host, &options.reactive_channels, options.print_diagnostics);

    let node = Node::new(core, logic);
    scope.register(node.as_object());
    node.core().mark_initialized();

    if options.print_diagnostics {
        tracing::debug!(
            identity = %identity,
            token = %node.token().short(),
            "node composed"
        );
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::host::{HostHandle, ManualHost, Phase};

    const FORM: ClassId = ClassId("Form");
    const FORM_ITEM: ClassId = ClassId("FormItem");

    #[test]
    fn test_nodes_get_distinct_tokens_and_shared_identity() {
        let scope = Scope::new();
        let host: HostHandle = ManualHost::new();

        let a = compose(&scope, &host, FORM, ComposeOptions::default(), |_| Ok(()))
            .unwrap();
        let b = compose(&scope, &host, FORM, ComposeOptions::default(), |_| Ok(()))
            .unwrap();

        assert_ne!(a.token(), b.token());
        assert_eq!(a.identity(), b.identity());
        assert!(a.core().is_initialized());
    }

    #[test]
    fn test_missing_mandatory_dependency_fails_fast() {
        let scope = Scope::new();
        let host: HostHandle = ManualHost::new();

        let result = compose(
            &scope,
            &host,
            FORM_ITEM,
            ComposeOptions::default().binding("form", FORM),
            |cx| {
                let _form = cx.require::<()>("form", FORM)?;
                Ok(())
            },
        );

        let err = result.err().expect("construction must fail");
        assert_eq!(
            err,
            ComposeError::MissingDependency {
                required: FORM,
                requirer: FORM_ITEM,
            }
        );
        assert!(err.to_string().contains("Form"));
        // nothing registered
        assert_eq!(scope.node_count(), 0);
    }

    #[test]
    fn test_build_error_passthrough() {
        let scope = Scope::new();
        let host: HostHandle = ManualHost::new();

        let result: Result<Node<()>, _> = compose(
            &scope,
            &host,
            FORM,
            ComposeOptions::default(),
            |cx| {
                Err(ComposeError::Build {
                    identity: cx.identity(),
                    message: "bad rules".to_string(),
                })
            },
        );

        assert_eq!(result.err().unwrap().to_string(), "Form: bad rules");
    }

    #[test]
    fn test_build_closure_sees_hub_before_registration() {
        let scope = Scope::new();
        let host = ManualHost::new();
        let host_handle: HostHandle = host.clone();

        let mounted = Rc::new(Cell::new(false));
        let mounted_clone = mounted.clone();

        let _node = compose(
            &scope,
            &host_handle,
            FORM,
            ComposeOptions::default(),
            move |cx| {
                cx.hub().mounted.subscribe_until(&cx.over(), move |_| {
                    mounted_clone.set(true);
                });
                Ok(())
            },
        )
        .unwrap();

        host.fire(Phase::Mounted);
        assert!(mounted.get());
    }

    #[test]
    fn test_dependency_resolves_during_and_after_build() {
        let scope = Scope::new();
        let host: HostHandle = ManualHost::new();

        let form = compose(&scope, &host, FORM, ComposeOptions::default(), |_| {
            Ok("the form".to_string())
        })
        .unwrap();

        let seen_in_build = Rc::new(Cell::new(false));
        let seen_clone = seen_in_build.clone();
        let form_token = form.token();

        let item = compose(
            &scope,
            &host,
            FORM_ITEM,
            ComposeOptions::default().binding("form", FORM),
            move |cx| {
                let resolved = cx.dependency::<String>("form").expect("form is active");
                assert_eq!(resolved.token(), form_token);
                seen_clone.set(true);
                Ok(())
            },
        )
        .unwrap();

        assert!(seen_in_build.get());
        let resolved = item.dependency::<String>("form").expect("cached");
        assert_eq!(resolved.token(), form.token());
        assert_eq!(*resolved, "the form");
    }
}
