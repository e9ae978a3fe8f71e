//! Scripted auth backend and recording notifier for tests.

use crate::backend::AuthBackend;
use crate::error::{AuthError, AuthResult};
use crate::listeners::{AuthListeners, AuthStateCallback, Subscription};
use crate::notify::{Notification, Notifier};
use crate::types::{AuthChangeEvent, Session, SignUpOutcome, User};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A confirmed session for `email`, valid for an hour.
pub fn sample_session(email: &str) -> Session {
    Session {
        access_token: format!("access-{email}"),
        refresh_token: format!("refresh-{email}"),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        expires_at: Some(Utc::now().timestamp() + 3600),
        user: sample_user(email),
    }
}

pub fn sample_user(email: &str) -> User {
    User {
        id: format!("user-{email}"),
        email: Some(email.to_string()),
        email_confirmed_at: None,
        created_at: None,
    }
}

/// How a scripted call should end.
#[derive(Debug, Clone)]
pub enum Scripted {
    Succeed,
    Fail { status: u16, message: String },
}

impl Scripted {
    pub fn fail(status: u16, message: &str) -> Self {
        Scripted::Fail {
            status,
            message: message.to_string(),
        }
    }

    fn result(&self) -> AuthResult<()> {
        match self {
            Scripted::Succeed => Ok(()),
            Scripted::Fail { status, message } => {
                Err(AuthError::provider(*status, None, message.clone()))
            }
        }
    }
}

/// How a scripted sign-up should end.
#[derive(Debug, Clone)]
pub enum ScriptedSignUp {
    /// Account created, confirmation email pending.
    AwaitConfirmation,
    /// Account created and signed in.
    Immediate,
    Fail { status: u16, message: String },
}

/// Backend whose outcomes are set by the test and whose calls are counted.
pub struct FakeBackend {
    listeners: AuthListeners,
    sign_in: Mutex<Scripted>,
    sign_up: Mutex<ScriptedSignUp>,
    sign_out: Mutex<Scripted>,
    resend: Mutex<Scripted>,
    initial_session: Mutex<Option<Session>>,
    fail_get_session: Mutex<bool>,
    event_during_get_session: Mutex<Option<(AuthChangeEvent, Option<Session>)>>,
    last_redirect: Mutex<Option<String>>,
    sign_in_calls: AtomicUsize,
    sign_up_calls: AtomicUsize,
    resend_calls: AtomicUsize,
    unsubscribes: Arc<AtomicUsize>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            listeners: AuthListeners::new(),
            sign_in: Mutex::new(Scripted::Succeed),
            sign_up: Mutex::new(ScriptedSignUp::AwaitConfirmation),
            sign_out: Mutex::new(Scripted::Succeed),
            resend: Mutex::new(Scripted::Succeed),
            initial_session: Mutex::new(None),
            fail_get_session: Mutex::new(false),
            event_during_get_session: Mutex::new(None),
            last_redirect: Mutex::new(None),
            sign_in_calls: AtomicUsize::new(0),
            sign_up_calls: AtomicUsize::new(0),
            resend_calls: AtomicUsize::new(0),
            unsubscribes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, session: Session) -> Self {
        *self.initial_session.lock() = Some(session);
        self
    }

    pub fn script_sign_in(&self, outcome: Scripted) {
        *self.sign_in.lock() = outcome;
    }

    pub fn script_sign_up(&self, outcome: ScriptedSignUp) {
        *self.sign_up.lock() = outcome;
    }

    pub fn script_sign_out(&self, outcome: Scripted) {
        *self.sign_out.lock() = outcome;
    }

    pub fn script_resend(&self, outcome: Scripted) {
        *self.resend.lock() = outcome;
    }

    pub fn fail_get_session(&self) {
        *self.fail_get_session.lock() = true;
    }

    /// Deliver `event` to listeners while the next `get_session` is in flight.
    pub fn emit_during_get_session(&self, event: AuthChangeEvent, session: Option<Session>) {
        *self.event_during_get_session.lock() = Some((event, session));
    }

    /// Emit an auth event as if it came from the service.
    pub fn emit(&self, event: AuthChangeEvent, session: Option<&Session>) {
        self.listeners.emit(event, session);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn last_redirect(&self) -> Option<String> {
        self.last_redirect.lock().clone()
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }

    pub fn resend_calls(&self) -> usize {
        self.resend_calls.load(Ordering::SeqCst)
    }

    pub fn unsubscribes(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn sign_in_with_password(&self, email: &str, _password: &str) -> AuthResult<Session> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.sign_in.lock().clone();
        outcome.result()?;

        let session = sample_session(email);
        *self.initial_session.lock() = Some(session.clone());
        self.listeners.emit(AuthChangeEvent::SignedIn, Some(&session));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        redirect_to: &str,
    ) -> AuthResult<SignUpOutcome> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_redirect.lock() = Some(redirect_to.to_string());

        let outcome = self.sign_up.lock().clone();
        match outcome {
            ScriptedSignUp::AwaitConfirmation => Ok(SignUpOutcome {
                user: Some(sample_user(email)),
                session: None,
            }),
            ScriptedSignUp::Immediate => {
                let session = sample_session(email);
                self.listeners.emit(AuthChangeEvent::SignedIn, Some(&session));
                Ok(SignUpOutcome {
                    user: Some(session.user.clone()),
                    session: Some(session),
                })
            }
            ScriptedSignUp::Fail { status, message } => {
                Err(AuthError::provider(status, None, message))
            }
        }
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let outcome = self.sign_out.lock().clone();
        *self.initial_session.lock() = None;
        self.listeners.emit(AuthChangeEvent::SignedOut, None);
        outcome.result()
    }

    async fn resend_signup_confirmation(&self, _email: &str) -> AuthResult<()> {
        self.resend_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.resend.lock().clone();
        outcome.result()
    }

    async fn get_session(&self) -> AuthResult<Option<Session>> {
        let lookup = self.initial_session.lock().clone();
        let pending = self.event_during_get_session.lock().take();
        if let Some((event, session)) = pending {
            self.listeners.emit(event, session.as_ref());
        }

        if *self.fail_get_session.lock() {
            return Err(AuthError::provider(503, None, "Service unavailable"));
        }
        Ok(lookup)
    }

    fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription {
        let inner = self.listeners.subscribe(callback);
        let unsubscribes = self.unsubscribes.clone();
        Subscription::new(move || {
            unsubscribes.fetch_add(1, Ordering::SeqCst);
            inner.unsubscribe();
        })
    }
}

/// Notifier that keeps everything it is given.
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.notifications.lock().len()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications.lock().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}
