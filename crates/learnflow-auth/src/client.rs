//! REST client for the hosted auth service (GoTrue API).
//!
//! The client owns session persistence: successful sign-in, refresh and
//! sign-out update the [`SessionStore`] and then notify listeners.

use crate::backend::AuthBackend;
use crate::error::{AuthError, AuthResult};
use crate::listeners::{AuthListeners, AuthStateCallback, Subscription};
use crate::storage::{FileSessionStore, SessionStore};
use crate::types::{AuthChangeEvent, Session, SignUpOutcome, User};
use async_trait::async_trait;
use chrono::Utc;
use learnflow_config::{Config, Paths};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, info, warn};

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Turn a non-success response into a provider error.
///
/// The service reports errors in several shapes depending on endpoint and
/// version: `{msg, error_code}`, `{error, error_description}` or `{message}`.
async fn error_from_response(response: reqwest::Response, operation: &str) -> AuthError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: Option<Value> = serde_json::from_str(&body).ok();

    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let message = field("msg")
        .or_else(|| field("error_description"))
        .or_else(|| field("message"))
        .or_else(|| field("error"))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    let code = field("error_code")
        .or_else(|| field("code"))
        .or_else(|| field("error").filter(|e| *e != message));

    warn!(
        operation,
        status = %status,
        code = code.as_deref().unwrap_or("-"),
        body_summary = %summarize_response_body(&body),
        "Auth request rejected"
    );

    AuthError::provider(status.as_u16(), code, message)
}

/// Auth service client with session persistence and state listeners.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    http_client: reqwest::Client,
    auth_url: String,
    anon_key: String,
    store: Arc<dyn SessionStore>,
    listeners: AuthListeners,
}

impl SupabaseAuthClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `supabase_url` - The project URL (e.g., `https://xyz.supabase.co`)
    /// * `anon_key` - The project's public anon key
    /// * `store` - Where the current session is persisted
    pub fn new(
        supabase_url: &str,
        anon_key: impl Into<String>,
        store: Arc<dyn SessionStore>,
    ) -> AuthResult<Self> {
        let base = url::Url::parse(supabase_url)?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("learnflow/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            auth_url: format!("{}/auth/v1", base.as_str().trim_end_matches('/')),
            anon_key: anon_key.into(),
            store,
            listeners: AuthListeners::new(),
        })
    }

    /// Client for the configured project, persisting to `paths.session_file()`.
    pub fn from_config(config: &Config, paths: &Paths) -> AuthResult<Self> {
        let store = Arc::new(FileSessionStore::new(paths.session_file()));
        Self::new(&config.supabase_url()?.to_string(), &config.supabase_anon_key, store)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.auth_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .post(self.endpoint(path))
            .header("apikey", &self.anon_key)
            .header("Accept", "application/json")
    }

    /// Authenticate with email and password.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Session> {
        debug!(email = %email, "Attempting email/password login");

        let response = self
            .post("token")
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "sign_in").await);
        }

        let session: Session = response.json().await?;
        let session = session.with_computed_expiry(Utc::now());
        self.store.save(&session)?;

        info!(user_id = %session.user.id, "Login successful");
        self.listeners.emit(AuthChangeEvent::SignedIn, Some(&session));

        Ok(session)
    }

    /// Register a new account.
    ///
    /// When the project auto-confirms accounts the response carries a
    /// session, which is persisted and announced like a sign-in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> AuthResult<SignUpOutcome> {
        debug!(email = %email, redirect_to = ?redirect_to, "Registering account");

        let mut request = self.post("signup");
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }

        let response = request
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "sign_up").await);
        }

        let body: Value = response.json().await?;
        let outcome = parse_sign_up_body(body)?;

        if let Some(session) = &outcome.session {
            self.store.save(session)?;
            info!(user_id = %session.user.id, "Signup signed the user in");
            self.listeners.emit(AuthChangeEvent::SignedIn, Some(session));
        } else {
            info!(
                user_id = outcome.user.as_ref().map(|u| u.id.as_str()).unwrap_or("-"),
                "Signup awaiting email confirmation"
            );
        }

        Ok(outcome)
    }

    /// End the current session.
    ///
    /// Local state is cleared and listeners notified even when the
    /// service call fails; the failure is still returned.
    pub async fn sign_out(&self) -> AuthResult<()> {
        let remote = match self.store.load()? {
            Some(session) => self.revoke(&session.access_token).await,
            None => Ok(()),
        };

        self.store.clear()?;
        info!("Logged out");
        self.listeners.emit(AuthChangeEvent::SignedOut, None);

        remote
    }

    async fn revoke(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .post("logout")
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        // An already-invalid token means there is nothing left to revoke.
        if status.is_success() || status.as_u16() == 401 || status.as_u16() == 404 {
            return Ok(());
        }
        Err(error_from_response(response, "sign_out").await)
    }

    /// Ask the service to send the signup confirmation email again.
    pub async fn resend_signup_confirmation(&self, email: &str) -> AuthResult<()> {
        debug!(email = %email, "Resending signup confirmation");

        let response = self
            .post("resend")
            .json(&serde_json::json!({
                "type": "signup",
                "email": email,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "resend").await);
        }

        info!(email = %email, "Confirmation email resent");
        Ok(())
    }

    /// The persisted session, refreshed first if it has expired.
    ///
    /// A refresh token the service rejects ends the session; transient
    /// failures leave it in place and return the error.
    pub async fn get_session(&self) -> AuthResult<Option<Session>> {
        let Some(session) = self.store.load()? else {
            return Ok(None);
        };

        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }

        debug!(user_id = %session.user.id, "Session expired, refreshing");

        match self.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                self.store.save(&refreshed)?;
                info!(user_id = %refreshed.user.id, "Session refreshed");
                self.listeners
                    .emit(AuthChangeEvent::TokenRefreshed, Some(&refreshed));
                Ok(Some(refreshed))
            }
            Err(e) if e.is_transient() => Err(e),
            Err(e) => {
                warn!(error = %e, "Refresh rejected, clearing session");
                self.store.clear()?;
                self.listeners.emit(AuthChangeEvent::SignedOut, None);
                Ok(None)
            }
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> AuthResult<Session> {
        let response = self
            .post("token")
            .query(&[("grant_type", "refresh_token")])
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "refresh").await);
        }

        let session: Session = response.json().await?;
        Ok(session.with_computed_expiry(Utc::now()))
    }

    /// Fetch the signed-in user from the service.
    ///
    /// This confirms the session hasn't been revoked server-side.
    pub async fn get_user(&self) -> AuthResult<User> {
        let session = self.get_session().await?.ok_or(AuthError::NotLoggedIn)?;

        let response = self
            .http_client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "get_user").await);
        }

        let user: User = response.json().await?;
        debug!(user_id = %user.id, "Session verified with server");
        Ok(user)
    }

    /// Register a callback for auth state changes.
    pub fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription {
        self.listeners.subscribe(callback)
    }
}

/// Signup responds with a session when the account is confirmed
/// immediately, otherwise with the bare user (possibly wrapped in `user`).
fn parse_sign_up_body(body: Value) -> AuthResult<SignUpOutcome> {
    if body.get("access_token").is_some() {
        let session: Session = serde_json::from_value(body)?;
        let session = session.with_computed_expiry(Utc::now());
        return Ok(SignUpOutcome {
            user: Some(session.user.clone()),
            session: Some(session),
        });
    }

    let user_value = match body.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => body,
    };
    let user = if user_value.get("id").is_some() {
        Some(serde_json::from_value::<User>(user_value)?)
    } else {
        None
    };

    Ok(SignUpOutcome {
        user,
        session: None,
    })
}

#[async_trait]
impl AuthBackend for SupabaseAuthClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Session> {
        SupabaseAuthClient::sign_in_with_password(self, email, password).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> AuthResult<SignUpOutcome> {
        SupabaseAuthClient::sign_up(self, email, password, Some(redirect_to)).await
    }

    async fn sign_out(&self) -> AuthResult<()> {
        SupabaseAuthClient::sign_out(self).await
    }

    async fn resend_signup_confirmation(&self, email: &str) -> AuthResult<()> {
        SupabaseAuthClient::resend_signup_confirmation(self, email).await
    }

    async fn get_session(&self) -> AuthResult<Option<Session>> {
        SupabaseAuthClient::get_session(self).await
    }

    fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription {
        SupabaseAuthClient::on_auth_state_change(self, callback)
    }
}
