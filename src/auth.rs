//! # Identity Contract
//!
//! Service boundaries resolve an opaque bearer token to a user id through
//! this trait. Token issuance and real verification live in the identity
//! collaborator; the core carries only the contract and a fixed-mapping
//! verifier for tests and local wiring.

use std::collections::HashMap;

use async_trait::async_trait;

/// Resolves opaque tokens to user ids at a service boundary.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// `Some(user_id)` for a valid token, `None` for anything else,
    /// including expired tokens.
    async fn verify(&self, token: &str) -> Option<i64>;
}

/// Verifier backed by a fixed token-to-user mapping.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, i64>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: i64) -> Self {
        self.tokens.insert(token.into(), user_id);
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Option<i64> {
        self.tokens.get(token).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_tokens_resolve() {
        let verifier = StaticTokenVerifier::new()
            .with_token("alpha", 7)
            .with_token("beta", 11);

        assert_eq!(verifier.verify("alpha").await, Some(7));
        assert_eq!(verifier.verify("beta").await, Some(11));
    }

    #[tokio::test]
    async fn test_unknown_tokens_are_rejected() {
        let verifier = StaticTokenVerifier::new().with_token("alpha", 7);

        assert_eq!(verifier.verify("forged").await, None);
        assert_eq!(verifier.verify("").await, None);
        assert_eq!(StaticTokenVerifier::new().verify("alpha").await, None);
    }
}
