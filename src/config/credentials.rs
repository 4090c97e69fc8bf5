//! Static credentials for the binary

use secrecy::Secret;
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::UserId;
use crate::ports::Credentials;

/// Signed-in user for a standalone run
///
/// Both fields are optional: without a user no live channel is opened, and
/// without a token the history load reports "unauthorized".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    pub user_id: Option<String>,

    pub token: Option<Secret<String>>,
}

impl CredentialsConfig {
    pub fn to_credentials(&self) -> Credentials {
        Credentials::new(
            UserId::from_optional(self.user_id.as_deref()),
            self.token.clone(),
        )
    }

    /// Validate credentials configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.user_id {
            Some(id) if id.trim().is_empty() => Err(ValidationError::BlankUserId),
            _ => Ok(()),
        }
    }
}
