//! Credential lookup and verification for login.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult};
use domain::{PasswordEncoder, Principal, DUMMY_PASSWORD_HASH};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Source of login credentials, keyed by username (the student's email).
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Load the principal for `username`, failing with UsernameNotFound
    async fn load_credentials_by_username(&self, username: &str) -> AppResult<Principal>;
}

/// Checks a username/password pair against a `CredentialsProvider`.
pub struct CredentialsAuthenticator {
    provider: Arc<dyn CredentialsProvider>,
    encoder: Arc<dyn PasswordEncoder>,
}

impl CredentialsAuthenticator {
    pub fn new(provider: Arc<dyn CredentialsProvider>, encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self { provider, encoder }
    }

    /// Authenticate a login attempt.
    ///
    /// Unknown usernames and wrong passwords both yield `InvalidCredentials`.
    /// An unknown username is still checked against a dummy hash so both
    /// paths take comparable time.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Principal> {
        let principal = match self.provider.load_credentials_by_username(username).await {
            Ok(principal) => principal,
            Err(AppError::UsernameNotFound(_)) => {
                let _ = self.encoder.matches(password, DUMMY_PASSWORD_HASH);
                tracing::warn!("Login attempt for unknown user");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !self.encoder.matches(password, &principal.password) {
            tracing::warn!("Login attempt with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        tracing::debug!(role = %principal.role, "Authenticated");
        Ok(principal)
    }
}
