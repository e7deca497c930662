//! Token Issuer - Process-unique node identity.
//!
//! Every composed node gets exactly one [`Token`], assigned at construction
//! and never changed. Tokens are uuid-v4 backed, so uniqueness holds across
//! scopes and hosts without any shared counter state.

use std::fmt;

use uuid::Uuid;

/// Opaque, process-unique identifier for a node instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Token(Uuid);

impl Token {
    /// Short hex prefix for log lines and tree dumps.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issue a fresh token. Each call yields a new value.
pub fn issue() -> Token {
    Token(Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let a = issue();
        let b = issue();
        let c = issue();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_short_is_stable_prefix() {
        let t = issue();
        assert_eq!(t.short().len(), 8);
        assert_eq!(t.short(), t.short());
    }
}
