//! The auth operations the session provider depends on.

use crate::error::AuthResult;
use crate::listeners::{AuthStateCallback, Subscription};
use crate::types::{Session, SignUpOutcome};
use async_trait::async_trait;

/// An auth service client.
///
/// Implementations emit auth-state changes to subscribed callbacks after
/// every operation that changes the stored session.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Session>;

    /// Register an account. `redirect_to` is embedded in the verification email.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> AuthResult<SignUpOutcome>;

    async fn sign_out(&self) -> AuthResult<()>;

    async fn resend_signup_confirmation(&self, email: &str) -> AuthResult<()>;

    /// The current session, refreshed if it had expired.
    async fn get_session(&self) -> AuthResult<Option<Session>>;

    fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription;
}
