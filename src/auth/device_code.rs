//! Device-code credential for interactive console logins
//!
//! Wraps `azure_identity::device_code_flow` in a `TokenCredential`
//! implementation so it can participate in a credential chain and be handed
//! to Azure SDK clients. The user prompt is printed once per flow with the
//! verification URL rewritten to the aka.ms shortlink.

use async_trait::async_trait;
use azure_core::auth::{AccessToken, TokenCredential};
use azure_core::error::{Error, ErrorKind};
use azure_core::HttpClient;
use azure_identity::device_code_flow;
use futures::StreamExt;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::debug;

/// Tokens within this window of expiry are treated as expired and re-acquired.
const REFRESH_WINDOW: time::Duration = time::Duration::seconds(300);

/// A `TokenCredential` backed by the OAuth device-code flow.
///
/// The first `get_token` call runs the full flow: the verification prompt is
/// printed to stdout and the token endpoint is polled until the user
/// completes the browser login. The resulting token is cached and reused
/// until it nears expiry.
pub struct DeviceCodeCredential {
    http_client: Arc<dyn HttpClient>,
    tenant_id: String,
    client_id: String,
    cache: Mutex<Option<AccessToken>>,
}

impl DeviceCodeCredential {
    pub fn new<S: Into<String>>(tenant_id: S, client_id: S) -> Self {
        Self {
            http_client: azure_core::new_http_client(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            cache: Mutex::new(None),
        }
    }

    async fn authenticate(&self, scopes: &[&str]) -> azure_core::Result<AccessToken> {
        let phase_one = device_code_flow::start(
            self.http_client.clone(),
            self.tenant_id.as_str(),
            &self.client_id,
            scopes,
        )
        .await?;

        println!("{}", rewrite_prompt(phase_one.message()));

        let mut stream = Box::pin(phase_one.stream());
        while let Some(response) = stream.next().await {
            match response {
                Ok(authorization) => {
                    let expires_on =
                        OffsetDateTime::now_utc() + time::Duration::seconds(authorization.expires_in as i64);
                    debug!("device code flow completed, token expires at {expires_on}");
                    return Ok(AccessToken::new(
                        authorization.access_token().secret().to_string(),
                        expires_on,
                    ));
                }
                Err(e) if is_pending(&e) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(Error::message(
            ErrorKind::Credential,
            "device code flow ended without an authorization",
        ))
    }
}

#[async_trait]
impl TokenCredential for DeviceCodeCredential {
    async fn get_token(&self, scopes: &[&str]) -> azure_core::Result<AccessToken> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref() {
            if token.expires_on - REFRESH_WINDOW > OffsetDateTime::now_utc() {
                return Ok(token.clone());
            }
            debug!("cached device code token is near expiry, re-authenticating");
        }

        let token = self.authenticate(scopes).await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    async fn clear_cache(&self) -> azure_core::Result<()> {
        *self.cache.lock().await = None;
        Ok(())
    }
}

impl std::fmt::Debug for DeviceCodeCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCodeCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Replace the canonical verification URL with the aka.ms shortlink, which
/// is easier to type on the device performing the browser login.
fn rewrite_prompt(message: &str) -> String {
    message.replacen(
        "https://microsoft.com/devicelogin",
        "https://aka.ms/devicelogin",
        1,
    )
}

/// The token endpoint reports "authorization_pending" until the user
/// finishes the browser login; that is a signal to keep polling.
fn is_pending(error: &Error) -> bool {
    let message = error.to_string();
    message.contains("authorization_pending") || message.contains("slow_down")
}
