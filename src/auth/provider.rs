//! Authentication provider trait and implementations
//!
//! This module defines the authentication provider trait and the chained
//! credential used by blob transfers. The chain mirrors the login order of
//! the tool: an optional ambient credential first, then the device-code
//! flow as the interactive fallback.

use async_trait::async_trait;
use azure_core::auth::{AccessToken, TokenCredential};
use azure_core::error::{Error, ErrorKind};
use azure_identity::{DefaultAzureCredential, TokenCredentialOptions};
use std::sync::Arc;

use crate::auth::device_code::DeviceCodeCredential;
use crate::config::CredentialMode;
use crate::error::{BlobfetchError, Result};

/// Trait for Azure authentication providers
#[async_trait]
pub trait AzureAuthProvider: Send + Sync {
    /// Get an access token for the specified scopes
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken>;

    /// Sign out and clear cached credentials
    async fn sign_out(&self) -> Result<()>;

    /// Get the underlying token credential for Azure SDK usage
    fn get_token_credential(&self) -> Arc<dyn TokenCredential>;
}

/// A credential that tries each of its sources in order.
///
/// The first source to produce a token wins. If every source fails, the
/// error carries each source's failure so the user can see why the whole
/// chain gave up.
#[derive(Debug)]
pub struct ChainedTokenCredential {
    sources: Vec<Arc<dyn TokenCredential>>,
}

impl ChainedTokenCredential {
    pub fn new(sources: Vec<Arc<dyn TokenCredential>>) -> Self {
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl TokenCredential for ChainedTokenCredential {
    async fn get_token(&self, scopes: &[&str]) -> azure_core::Result<AccessToken> {
        let mut failures = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.get_token(scopes).await {
                Ok(token) => return Ok(token),
                Err(e) => {
                    tracing::debug!("credential source failed, trying next: {e}");
                    failures.push(e.to_string());
                }
            }
        }
        Err(Error::message(
            ErrorKind::Credential,
            format!(
                "no credential in the chain produced a token: {}",
                failures.join("; ")
            ),
        ))
    }

    async fn clear_cache(&self) -> azure_core::Result<()> {
        for source in &self.sources {
            source.clear_cache().await?;
        }
        Ok(())
    }
}

/// Authentication provider backed by a [`ChainedTokenCredential`].
pub struct ChainedCredentialProvider {
    credential: Arc<ChainedTokenCredential>,
}

impl ChainedCredentialProvider {
    /// Build the credential chain for the given mode.
    ///
    /// `DeviceCode` yields a single-link chain; `Auto` prepends
    /// `DefaultAzureCredential` so that environment, managed-identity, or
    /// CLI credentials are attempted before prompting the user.
    pub fn new(mode: CredentialMode, tenant_id: &str, client_id: &str) -> Result<Self> {
        let mut sources: Vec<Arc<dyn TokenCredential>> = Vec::new();

        if mode == CredentialMode::Auto {
            let ambient = DefaultAzureCredential::create(TokenCredentialOptions::default())
                .map_err(|e| {
                    BlobfetchError::authentication(format!(
                        "Failed to create DefaultAzureCredential: {e}"
                    ))
                })?;
            sources.push(Arc::new(ambient));
        }

        sources.push(Arc::new(DeviceCodeCredential::new(tenant_id, client_id)));

        Ok(Self {
            credential: Arc::new(ChainedTokenCredential::new(sources)),
        })
    }
}

#[async_trait]
impl AzureAuthProvider for ChainedCredentialProvider {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        self.credential
            .get_token(scopes)
            .await
            .map_err(|e| BlobfetchError::authentication(format!("Failed to get token: {e}")))
    }

    async fn sign_out(&self) -> Result<()> {
        self.credential
            .clear_cache()
            .await
            .map_err(|e| BlobfetchError::authentication(format!("Failed to clear credentials: {e}")))
    }

    fn get_token_credential(&self) -> Arc<dyn TokenCredential> {
        self.credential.clone()
    }
}
