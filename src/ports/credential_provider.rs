//! Credential provider port.
//!
//! Credentials are injected into a session when it starts instead of being
//! looked up from ambient storage, so every collaborator that needs the
//! bearer token or the user id receives it explicitly.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};

use crate::domain::foundation::UserId;

/// What the token provider knows about the current user.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Stable user identifier. `None` means nobody is signed in.
    pub user_id: Option<UserId>,
    /// Bearer token for authenticated requests.
    pub token: Option<Secret<String>>,
}

impl Credentials {
    pub fn new(user_id: Option<UserId>, token: Option<Secret<String>>) -> Self {
        Self { user_id, token }
    }

    /// Credentials for a user without a bearer token.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Secret::new(token.into()));
        self
    }

    /// Returns the bearer token if one is present and non-empty.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token
            .as_ref()
            .map(|t| t.expose_secret().as_str())
            .filter(|t| !t.is_empty())
    }
}

/// Supplies credentials at session start.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credentials(&self) -> Credentials;
}
