//! Priority-ordered credential resolution.

use std::sync::Arc;

use async_trait::async_trait;

use crate::credentials::{Credential, CredentialKind, CredentialStore};
use crate::error::{CredentialStoreError, IdentityError};

/// Source of the longer-lived federated session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current session token, or `None` when signed out of the provider.
    async fn session_token(&self) -> Result<Option<String>, IdentityError>;
}

/// Identity provider holding a fixed token, e.g. one read from config.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    token: Option<String>,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn session_token(&self) -> Result<Option<String>, IdentityError> {
        Ok(self.token.clone())
    }
}

/// Chooses the single credential for a request.
///
/// Order: elevated admin, admin pending two-factor, primary user, then the
/// federated session. The first non-blank value wins; nothing is merged.
#[derive(Clone)]
pub struct TokenResolver {
    store: Arc<dyn CredentialStore>,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl TokenResolver {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            identity: None,
        }
    }

    #[must_use]
    pub fn with_identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Returns the highest-priority credential available, or `None`.
    ///
    /// A failing federated lookup is logged and treated as "no credential";
    /// it never surfaces as a request failure.
    pub async fn resolve(&self) -> Option<Credential> {
        for kind in CredentialKind::STORED {
            if let Some(value) = self.store.get(kind).filter(|v| !v.trim().is_empty()) {
                return Some(Credential { kind, value });
            }
        }

        let identity = self.identity.as_ref()?;
        match identity.session_token().await {
            Ok(Some(value)) if !value.trim().is_empty() => Some(Credential {
                kind: CredentialKind::Federated,
                value,
            }),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "federated session lookup failed; continuing without credential");
                None
            }
        }
    }

    pub async fn has_credential(&self) -> bool {
        self.resolve().await.is_some()
    }

    /// Stores a credential obtained by the sign-in or elevation flow.
    ///
    /// # Errors
    ///
    /// Propagates the store's error; federated credentials are rejected.
    pub fn sign_in(&self, kind: CredentialKind, value: &str) -> Result<(), CredentialStoreError> {
        self.store.set(kind, value)
    }

    /// Drops every stored credential (sign-out and 401 recovery).
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub fn clear_all(&self) -> Result<(), CredentialStoreError> {
        self.store.clear(&CredentialKind::STORED)
    }

    /// Leaves an elevated context without signing the user out.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub fn clear_elevated(&self) -> Result<(), CredentialStoreError> {
        self.store.clear(&CredentialKind::ELEVATED)
    }
}
