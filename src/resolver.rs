//! Dependency Resolver - declarative nearest-ancestor bindings.
//!
//! A [`Binding`] pairs a property name with a target class identity. The
//! resolver looks the target up in the scope at most once per node, caches
//! the outcome on the node (absence included), and locks the cache when the
//! node finishes construction. Later changes to the ancestor chain never
//! re-resolve a locked binding.
//!
//! The resolver itself never raises: absence is a normal outcome, and a node
//! that cannot live without an ancestor enforces that itself (see
//! [`crate::node::BuildCx::require`]).

use crate::node::{AnyNode, NodeCore};
use crate::scope::{ClassId, Scope};

/// Declared dependency: resolve `property` to the nearest ancestor of
/// `target`. Several bindings on one node may share a target under
/// different property names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    pub property: &'static str,
    pub target: ClassId,
}

impl Binding {
    pub const fn new(property: &'static str, target: ClassId) -> Self {
        Self { property, target }
    }
}

/// Resolve one binding by property name against `scope`, going through the
/// node's cache. Post-initialization the cache is authoritative and the
/// scope is never consulted.
pub(crate) fn resolve_property(
    core: &NodeCore,
    scope: &Scope,
    bindings: &[Binding],
    property: &str,
) -> Option<AnyNode> {
    if let Some(cached) = core.cached(property) {
        return cached;
    }
    if core.is_initialized() {
        // locked with nothing cached: the property was never declared
        return None;
    }
    let binding = bindings.iter().find(|b| b.property == property)?;
    let found = scope.resolve(binding.target);
    core.cache(binding.property, found.clone());
    found
}

/// Force-evaluate every declared binding so the cache is complete before the
/// node is marked initialized.
pub(crate) fn lock(core: &NodeCore, scope: &Scope, bindings: &[Binding]) {
    for binding in bindings {
        let _ = resolve_property(core, scope, bindings, binding.property);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{compose, ComposeOptions};
    use crate::host::{HostHandle, ManualHost};
    use crate::node::Node;

    const ANCHOR: ClassId = ClassId("Anchor");
    const LEAF: ClassId = ClassId("Leaf");

    fn anchor(scope: &std::rc::Rc<Scope>, host: &HostHandle) -> Node<u32> {
        compose(scope, host, ANCHOR, ComposeOptions::default(), |_| Ok(7))
            .expect("anchor composes")
    }

    #[test]
    fn test_absent_ancestor_resolves_to_none() {
        let scope = Scope::new();
        let host: HostHandle = ManualHost::new();

        let leaf = compose(
            &scope,
            &host,
            LEAF,
            ComposeOptions::default().binding("anchor", ANCHOR),
            |cx| {
                assert!(cx.dependency::<u32>("anchor").is_none());
                Ok(())
            },
        )
        .unwrap();

        assert!(leaf.dependency::<u32>("anchor").is_none());
    }

    #[test]
    fn test_cache_locks_at_initialization() {
        let scope = Scope::new();
        let host: HostHandle = ManualHost::new();

        // leaf first: binding resolves (and caches) absence
        let leaf = compose(
            &scope,
            &host,
            LEAF,
            ComposeOptions::default().binding("anchor", ANCHOR),
            |_| Ok(()),
        )
        .unwrap();

        // an anchor appearing later must not change the locked outcome
        let _late = anchor(&scope, &host);
        assert!(leaf.dependency::<u32>("anchor").is_none());
    }

    #[test]
    fn test_resolution_is_reference_stable() {
        let scope = Scope::new();
        let host: HostHandle = ManualHost::new();

        let first = anchor(&scope, &host);
        let leaf = compose(
            &scope,
            &host,
            LEAF,
            ComposeOptions::default().binding("anchor", ANCHOR),
            |_| Ok(()),
        )
        .unwrap();

        // shadow the anchor with a newer instance after the leaf locked
        let _shadow = anchor(&scope, &host);

        let a = leaf.dependency::<u32>("anchor").expect("resolved");
        let b = leaf.dependency::<u32>("anchor").expect("resolved");
        assert_eq!(a.token(), b.token());
        assert_eq!(a.token(), first.token());
    }

    #[test]
    fn test_two_properties_same_target() {
        let scope = Scope::new();
        let host: HostHandle = ManualHost::new();

        let only = anchor(&scope, &host);
        let leaf = compose(
            &scope,
            &host,
            LEAF,
            ComposeOptions::default()
                .binding("anchor", ANCHOR)
                .binding("anchor_copy", ANCHOR),
            |_| Ok(()),
        )
        .unwrap();

        let a = leaf.dependency::<u32>("anchor").expect("resolved");
        let b = leaf.dependency::<u32>("anchor_copy").expect("resolved");
        assert_eq!(a.token(), only.token());
        assert_eq!(b.token(), only.token());
    }

    #[test]
    fn test_undeclared_property_is_none() {
        let scope = Scope::new();
        let host: HostHandle = ManualHost::new();

        let _only = anchor(&scope, &host);
        let leaf = compose(&scope, &host, LEAF, ComposeOptions::default(), |_| Ok(()))
            .unwrap();

        assert!(leaf.dependency::<u32>("anchor").is_none());
    }

    #[test]
    fn test_wrong_type_downcast_is_none() {
        let scope = Scope::new();
        let host: HostHandle = ManualHost::new();

        let _only = anchor(&scope, &host);
        let leaf = compose(
            &scope,
            &host,
            LEAF,
            ComposeOptions::default().binding("anchor", ANCHOR),
            |_| Ok(()),
        )
        .unwrap();

        // anchor logic is u32, not String
        assert!(leaf.dependency::<String>("anchor").is_none());
    }
}
