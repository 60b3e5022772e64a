//! Caller identity.
//!
//! Credential issuance lives outside this service; all it needs is a way to
//! turn a bearer token into a [`Principal`]. That seam is the
//! [`IdentityResolver`] trait.
//!
//! [`BearerTokenResolver`] is the built-in resolver:
//! - `user:<email>` tokens are treated as a user with that email.
//! - any other token is treated as opaque and mapped to a stable account id
//!   derived from its hash.
//!
//! Tokens are never stored or logged; only the derived account id is.

use async_trait::async_trait;
use evreg_id::AccountId;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: AccountId,
    pub email: Option<String>,
}

/// Who is making a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Principal {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Principal::Authenticated(identity) => Some(identity),
            Principal::Anonymous => None,
        }
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.identity().map(|identity| identity.account_id)
    }
}

/// Why a bearer token was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("bearer token cannot be empty")]
    EmptyToken,

    #[error("user token must be in the form 'user:<email>'")]
    MalformedUserToken,
}

/// Resolves a bearer token to the principal it stands for.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Principal, IdentityError>;
}

/// Resolver for development and tests; see the module docs for token forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerTokenResolver;

impl BearerTokenResolver {
    fn account_for(subject: &str) -> AccountId {
        let digest = Sha256::digest(subject.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        AccountId::from_bytes(bytes)
    }
}

#[async_trait]
impl IdentityResolver for BearerTokenResolver {
    async fn resolve(&self, token: &str) -> Result<Principal, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::EmptyToken);
        }

        if let Some(email) = token.strip_prefix("user:") {
            let email = email.trim();
            if email.is_empty() || email.len() > 320 || !email.contains('@') {
                return Err(IdentityError::MalformedUserToken);
            }
            return Ok(Principal::Authenticated(Identity {
                account_id: Self::account_for(email),
                email: Some(email.to_string()),
            }));
        }

        Ok(Principal::Authenticated(Identity {
            account_id: Self::account_for(token),
            email: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_token_resolves_to_stable_account() {
        let resolver = BearerTokenResolver;
        let first = resolver.resolve("user:admin@example.com").await.unwrap();
        let second = resolver.resolve(" user:admin@example.com ").await.unwrap();
        assert_eq!(first, second);

        let identity = first.identity().unwrap();
        assert_eq!(identity.email.as_deref(), Some("admin@example.com"));
    }

    #[tokio::test]
    async fn test_distinct_users_get_distinct_accounts() {
        let resolver = BearerTokenResolver;
        let a = resolver.resolve("user:a@example.com").await.unwrap();
        let b = resolver.resolve("user:b@example.com").await.unwrap();
        assert_ne!(a.account_id(), b.account_id());
    }

    #[tokio::test]
    async fn test_malformed_tokens_are_rejected() {
        let resolver = BearerTokenResolver;
        assert_eq!(
            resolver.resolve("   ").await.unwrap_err(),
            IdentityError::EmptyToken
        );
        assert_eq!(
            resolver.resolve("user:not-an-email").await.unwrap_err(),
            IdentityError::MalformedUserToken
        );
    }

    #[tokio::test]
    async fn test_opaque_token_is_authenticated_without_email() {
        let principal = BearerTokenResolver.resolve("abc123").await.unwrap();
        assert!(principal.is_authenticated());
        assert_eq!(principal.identity().unwrap().email, None);
    }

    #[test]
    fn test_anonymous_has_no_account() {
        assert!(!Principal::Anonymous.is_authenticated());
        assert_eq!(Principal::default().account_id(), None);
    }
}
