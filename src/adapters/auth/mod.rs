//! Authentication adapters.
//!
//! Implementations of the `CredentialProvider` port:
//!
//! - `static_credentials` - fixed credentials from configuration or tests

mod static_credentials;

pub use static_credentials::StaticCredentialProvider;
