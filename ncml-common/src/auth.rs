//! Session capability
//!
//! Identity is owned by an external provider. Components that need the
//! signed-in user receive a [`SessionProvider`] explicitly instead of
//! reading ambient global state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

/// Signed-in user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl UserProfile {
    /// Name to show in prompts and logs
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Identity provider errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not signed in")]
    NotSignedIn,

    /// Action must be performed with the external identity provider
    #[error("{0} is handled by the external identity provider")]
    Delegated(&'static str),

    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Capability set of the identity/session provider
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Currently signed-in user, if any
    fn current_user(&self) -> Option<UserProfile>;

    /// True while the provider is still resolving the session
    fn is_loading(&self) -> bool;

    /// Message of the most recent failed action
    fn last_error(&self) -> Option<String>;

    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<UserProfile, AuthError>;

    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError>;

    /// Sign in through a federated provider (e.g. "google")
    async fn login_with_federated_provider(&self, provider: &str)
        -> Result<UserProfile, AuthError>;

    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;

    async fn logout(&self) -> Result<(), AuthError>;
}

/// Fixed-identity session for command-line use
///
/// The user comes from configuration; credential flows belong to the
/// external provider and are reported as [`AuthError::Delegated`].
pub struct LocalSession {
    user: RwLock<Option<UserProfile>>,
    last_error: RwLock<Option<String>>,
}

impl LocalSession {
    pub fn signed_in(user: UserProfile) -> Self {
        Self {
            user: RwLock::new(Some(user)),
            last_error: RwLock::new(None),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: RwLock::new(None),
            last_error: RwLock::new(None),
        }
    }

    /// Build a signed-in session from an email and optional display name
    pub fn for_email(email: &str, display_name: Option<String>) -> Self {
        Self::signed_in(UserProfile {
            uid: format!("local:{}", email),
            email: email.to_string(),
            display_name,
            email_verified: true,
        })
    }

    fn record(&self, err: AuthError) -> AuthError {
        if let Ok(mut last) = self.last_error.write() {
            *last = Some(err.to_string());
        }
        err
    }
}

#[async_trait]
impl SessionProvider for LocalSession {
    fn current_user(&self) -> Option<UserProfile> {
        self.user.read().ok().and_then(|u| u.clone())
    }

    fn is_loading(&self) -> bool {
        false
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.read().ok().and_then(|e| e.clone())
    }

    async fn register(
        &self,
        _email: &str,
        _password: &str,
        _display_name: Option<&str>,
    ) -> Result<UserProfile, AuthError> {
        Err(self.record(AuthError::Delegated("Registration")))
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<UserProfile, AuthError> {
        Err(self.record(AuthError::Delegated("Sign-in")))
    }

    async fn login_with_federated_provider(
        &self,
        _provider: &str,
    ) -> Result<UserProfile, AuthError> {
        Err(self.record(AuthError::Delegated("Federated sign-in")))
    }

    async fn reset_password(&self, _email: &str) -> Result<(), AuthError> {
        Err(self.record(AuthError::Delegated("Password reset")))
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let mut user = self
            .user
            .write()
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        if user.take().is_none() {
            return Err(self.record(AuthError::NotSignedIn));
        }
        Ok(())
    }
}
