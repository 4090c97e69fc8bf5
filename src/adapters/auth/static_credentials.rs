//! Credential provider holding a fixed user and token.
//!
//! Used by the binary (credentials come from configuration) and by tests.
//! A host application with a real login flow implements
//! [`CredentialProvider`] itself.
//!
//! # Example
//!
//! ```ignore
//! let provider = StaticCredentialProvider::new(
//!     Credentials::for_user(UserId::new("42")?).with_token("jwt"),
//! );
//! let session = NotificationSession::start(settings, history, transport, provider.credentials().await).await;
//! ```

use std::sync::RwLock;

use async_trait::async_trait;

use crate::config::CredentialsConfig;
use crate::ports::{CredentialProvider, Credentials};

/// [`CredentialProvider`] returning whatever it was last given.
#[derive(Debug, Default)]
pub struct StaticCredentialProvider {
    current: RwLock<Credentials>,
}

impl StaticCredentialProvider {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            current: RwLock::new(credentials),
        }
    }

    pub fn from_config(config: &CredentialsConfig) -> Self {
        Self::new(config.to_credentials())
    }

    /// Replaces the credentials handed to the next session.
    pub fn set(&self, credentials: Credentials) {
        if let Ok(mut current) = self.current.write() {
            *current = credentials;
        }
    }

    /// Forgets the user and token.
    pub fn sign_out(&self) {
        self.set(Credentials::default());
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn credentials(&self) -> Credentials {
        self.current
            .read()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}
