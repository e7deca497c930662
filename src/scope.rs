//! Scope Tree - explicit resolution context for ancestor lookup.
//!
//! A [`Scope`] is the construction context nodes register into. It is an
//! ordinary object passed to [`crate::compose`], never a free-floating
//! global: two scopes share nothing, and everything ambient about
//! construction lives here.
//!
//! State per scope:
//!
//! - the **slot**: the most recently fully-constructed node. Not a stack.
//!   Each completed construction overwrites it, which is exactly the
//!   "nearest active ancestor" under strictly nested, synchronous,
//!   depth-first construction. Constructing sibling subtrees out of nesting
//!   order (batched or deferred construction) violates that precondition and
//!   leaves the resolution order undefined.
//! - per-class-identity registration stacks: the most recently registered
//!   instance of an identity is the one descendants resolve ("nearest
//!   ancestor wins"; two same-class ancestors cannot both be visible from
//!   below).
//! - token-keyed registration and parent→children edges, kept for
//!   introspection ([`Scope::format_tree`]).
//!
//! Registration never fails and is never revoked; a torn-down node simply
//! stops reacting.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::node::AnyNode;
use crate::token::Token;

// =============================================================================
// Class identity
// =============================================================================

/// Stable key shared by all nodes composed under one logic type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClassId(pub &'static str);

impl ClassId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// =============================================================================
// Scope
// =============================================================================

/// Explicit construction/resolution context. See module docs.
pub struct Scope {
    slot: RefCell<Option<AnyNode>>,
    by_identity: RefCell<HashMap<ClassId, Vec<AnyNode>>>,
    by_token: RefCell<HashMap<Token, AnyNode>>,
    roots: RefCell<Vec<AnyNode>>,
}

impl Scope {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            slot: RefCell::new(None),
            by_identity: RefCell::new(HashMap::new()),
            by_token: RefCell::new(HashMap::new()),
            roots: RefCell::new(Vec::new()),
        })
    }

    /// Register a fully-constructed node. Called by `compose` after the
    /// build closure returns; consumers never call this.
    ///
    /// Order matters: the child is linked to the slot holder *before* the
    /// slot is overwritten, so the node constructed next sees this node as
    /// its nearest active ancestor.
    pub(crate) fn register(&self, node: AnyNode) {
        let parent = self.slot.borrow().clone();
        match parent {
            Some(parent) => parent.core().adopt(node.clone()),
            None => self.roots.borrow_mut().push(node.clone()),
        }

        self.by_token
            .borrow_mut()
            .insert(node.core().token(), node.clone());
        self.by_identity
            .borrow_mut()
            .entry(node.core().identity())
            .or_default()
            .push(node.clone());

        *self.slot.borrow_mut() = Some(node);
    }

    /// Nearest registered node of `identity`, or `None`. Never an error:
    /// absence is a normal outcome.
    pub fn resolve(&self, identity: ClassId) -> Option<AnyNode> {
        self.by_identity
            .borrow()
            .get(&identity)
            .and_then(|stack| stack.last().cloned())
    }

    /// Node registered under `token`, if any.
    pub fn by_token(&self, token: Token) -> Option<AnyNode> {
        self.by_token.borrow().get(&token).cloned()
    }

    /// The current slot holder (debugging aid).
    pub fn current(&self) -> Option<AnyNode> {
        self.slot.borrow().clone()
    }

    /// Number of nodes registered so far.
    pub fn node_count(&self) -> usize {
        self.by_token.borrow().len()
    }

    /// Render the ancestor/descendant record as an indented tree of
    /// `identity (token-prefix)` lines.
    pub fn format_tree(&self) -> String {
        fn walk(node: &AnyNode, depth: usize, out: &mut String) {
            use std::fmt::Write;
            let core = node.core();
            let _ = writeln!(
                out,
                "{}{} ({})",
                "  ".repeat(depth),
                core.identity(),
                core.token().short()
            );
            for child in core.children() {
                walk(&child, depth + 1, out);
            }
        }

        let mut out = String::new();
        for root in self.roots.borrow().iter() {
            walk(root, 0, &mut out);
        }
        out
    }
}
