//! Session provider: the single source of auth state for the app.
//!
//! `SessionProvider` mirrors the backend's session into a watchable
//! [`AuthSnapshot`] and turns every auth operation's outcome into exactly
//! one user-facing [`Notification`].

use crate::backend::AuthBackend;
use crate::error::AuthResult;
use crate::listeners::Subscription;
use crate::notify::{Notification, Notifier};
use crate::redirect::RedirectPolicy;
use crate::types::{AuthChangeEvent, Session, SignUpOutcome, User};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

const VERIFICATION_NOTICE_DURATION: Duration = Duration::from_secs(9);

/// Current auth state as seen by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub session: Option<Session>,
    pub user: Option<User>,
    /// True from mount until the initial session lookup or the first auth
    /// event, whichever lands first.
    pub loading: bool,
}

impl AuthSnapshot {
    fn loading() -> Self {
        Self {
            session: None,
            user: None,
            loading: true,
        }
    }

    fn settled(session: Option<Session>) -> Self {
        let user = session.as_ref().map(|s| s.user.clone());
        Self {
            session,
            user,
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Owns the auth-state subscription and exposes auth operations.
pub struct SessionProvider {
    backend: Arc<dyn AuthBackend>,
    notifier: Arc<dyn Notifier>,
    redirect: RedirectPolicy,
    state: Arc<watch::Sender<AuthSnapshot>>,
    subscription: Mutex<Option<Subscription>>,
}

impl SessionProvider {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        notifier: Arc<dyn Notifier>,
        redirect: RedirectPolicy,
    ) -> Self {
        let (state, _) = watch::channel(AuthSnapshot::loading());
        Self {
            backend,
            notifier,
            redirect,
            state: Arc::new(state),
            subscription: Mutex::new(None),
        }
    }

    /// Receiver that observes every state change.
    pub fn watch(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Start tracking auth state.
    ///
    /// The listener is registered before the initial session lookup so no
    /// change that lands during the lookup is missed. Mounting twice is a
    /// no-op.
    pub async fn mount(&self) {
        {
            let mut slot = self.subscription.lock();
            if slot.is_some() {
                debug!("Session provider already mounted");
                return;
            }

            // A remount starts over from loading.
            self.state.send_if_modified(|current| {
                let was_settled = !current.loading;
                current.loading = true;
                was_settled
            });

            let state = Arc::clone(&self.state);
            let subscription = self.backend.on_auth_state_change(Arc::new(
                move |event: AuthChangeEvent, session: Option<&Session>| {
                    info!(
                        event = %event,
                        email = session.and_then(|s| s.user.email.as_deref()).unwrap_or("-"),
                        "Auth state changed"
                    );
                    state.send_replace(AuthSnapshot::settled(session.cloned()));
                },
            ));
            *slot = Some(subscription);
        }

        let initial = match self.backend.get_session().await {
            Ok(session) => {
                info!(
                    email = session
                        .as_ref()
                        .and_then(|s| s.user.email.as_deref())
                        .unwrap_or("-"),
                    "Initial session check"
                );
                session
            }
            Err(e) => {
                warn!(error = %e, "Initial session check failed");
                None
            }
        };

        // An auth event delivered during the lookup is newer than its result.
        let applied = self.state.send_if_modified(|current| {
            if !current.loading {
                return false;
            }
            *current = AuthSnapshot::settled(initial);
            true
        });
        if !applied {
            debug!("Auth state changed during initial session check; keeping the event");
        }
    }

    /// Stop tracking auth state. Returns whether a subscription was released.
    pub fn unmount(&self) -> bool {
        let subscription = self.subscription.lock().take();
        match subscription {
            Some(subscription) => {
                subscription.unsubscribe();
                debug!("Session provider unmounted");
                true
            }
            None => false,
        }
    }

    /// Sign in, notifying the outcome.
    ///
    /// An unconfirmed email triggers one resend of the confirmation mail.
    /// The original error is returned on every failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        match self.backend.sign_in_with_password(email, password).await {
            Ok(session) => {
                self.notifier
                    .notify(Notification::new("Login successful", "Welcome back!"));
                Ok(session)
            }
            Err(err) => {
                error!(error = %err, "Sign in error");

                let notification = if err.is_email_not_confirmed() {
                    match self.backend.resend_signup_confirmation(email).await {
                        Ok(()) => Notification::new(
                            "Email not confirmed",
                            "We've sent a new confirmation email. Please check your inbox.",
                        ),
                        Err(resend_err) => {
                            warn!(error = %resend_err, "Resending confirmation email failed");
                            Notification::destructive(
                                "Error signing in",
                                "Email not confirmed. We tried to resend confirmation email but failed.",
                            )
                        }
                    }
                } else {
                    Notification::destructive("Error signing in", err.to_string())
                };

                self.notifier.notify(notification);
                Err(err)
            }
        }
    }

    /// Register an account, notifying the outcome.
    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        let redirect_to = self.redirect.email_redirect_url();
        debug!(redirect_to = %redirect_to, "Verification redirect chosen");

        match self.backend.sign_up(email, password, redirect_to).await {
            Ok(outcome) => {
                let notification = if outcome.requires_confirmation() {
                    Notification::success(
                        "Verification Email Sent",
                        format!(
                            "A confirmation link has been sent to {email}. Please check your inbox (and spam folder) to complete your signup."
                        ),
                    )
                    .with_duration(VERIFICATION_NOTICE_DURATION)
                } else {
                    Notification::success("Signup successful", "You are now logged in!")
                };
                self.notifier.notify(notification);
                Ok(outcome)
            }
            Err(err) => {
                error!(error = %err, "Sign up error");
                self.notifier
                    .notify(Notification::destructive("Error signing up", err.to_string()));
                Err(err)
            }
        }
    }

    /// Sign out, notifying the outcome. Errors are reported, not returned.
    pub async fn sign_out(&self) {
        match self.backend.sign_out().await {
            Ok(()) => self.notifier.notify(Notification::new(
                "Signed out",
                "You have been successfully signed out.",
            )),
            Err(err) => {
                error!(error = %err, "Sign out error");
                self.notifier
                    .notify(Notification::destructive("Error signing out", err.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationVariant;
    use crate::testing::{sample_session, FakeBackend, RecordingNotifier, Scripted, ScriptedSignUp};

    const LOCAL: &str = "http://localhost:8080";
    const PROD: &str = "https://b-gilt-nine.vercel.app";

    fn provider_with(
        backend: FakeBackend,
        origin: &str,
    ) -> (SessionProvider, Arc<FakeBackend>, Arc<RecordingNotifier>) {
        let backend = Arc::new(backend);
        let notifier = Arc::new(RecordingNotifier::new());
        let provider = SessionProvider::new(
            backend.clone(),
            notifier.clone(),
            RedirectPolicy::new(origin, PROD),
        );
        (provider, backend, notifier)
    }

    fn provider() -> (SessionProvider, Arc<FakeBackend>, Arc<RecordingNotifier>) {
        provider_with(FakeBackend::new(), LOCAL)
    }

    #[tokio::test]
    async fn test_starts_loading_until_mounted() {
        let (provider, _backend, _notifier) = provider();
        assert!(provider.snapshot().loading);

        provider.mount().await;

        let snapshot = provider.snapshot();
        assert!(!snapshot.loading);
        assert!(!snapshot.is_authenticated());
    }

    #[tokio::test]
    async fn test_mount_picks_up_existing_session() {
        let (provider, _backend, _notifier) =
            provider_with(FakeBackend::new().with_session(sample_session("a@b.co")), LOCAL);

        provider.mount().await;

        let snapshot = provider.snapshot();
        assert_eq!(
            snapshot.user.and_then(|u| u.email).as_deref(),
            Some("a@b.co")
        );
        assert!(snapshot.session.is_some());
    }

    #[tokio::test]
    async fn test_mount_settles_when_lookup_fails() {
        let (provider, backend, _notifier) = provider();
        backend.fail_get_session();

        provider.mount().await;

        assert!(!provider.snapshot().loading);
        assert!(provider.snapshot().session.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_during_lookup_is_not_overwritten() {
        let (provider, backend, _notifier) = provider();
        backend.emit_during_get_session(
            AuthChangeEvent::SignedIn,
            Some(sample_session("early@example.com")),
        );

        provider.mount().await;

        let snapshot = provider.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(
            snapshot.user.and_then(|u| u.email).as_deref(),
            Some("early@example.com")
        );
    }

    #[tokio::test]
    async fn test_sign_out_during_lookup_beats_stale_session() {
        let (provider, backend, _notifier) =
            provider_with(FakeBackend::new().with_session(sample_session("a@b.co")), LOCAL);
        backend.emit_during_get_session(AuthChangeEvent::SignedOut, None);

        provider.mount().await;

        assert!(!provider.snapshot().is_authenticated());
        assert!(!provider.snapshot().loading);
    }

    #[tokio::test]
    async fn test_remount_reads_session_again() {
        let (provider, backend, _notifier) = provider();
        provider.mount().await;
        provider.unmount();

        // Signed in elsewhere while unmounted; no listener sees it.
        backend
            .sign_in_with_password("again@example.com", "pw")
            .await
            .unwrap();
        assert!(!provider.snapshot().is_authenticated());

        provider.mount().await;
        assert_eq!(
            provider.snapshot().user.and_then(|u| u.email).as_deref(),
            Some("again@example.com")
        );
    }

    #[tokio::test]
    async fn test_mount_twice_registers_one_listener() {
        let (provider, backend, _notifier) = provider();
        provider.mount().await;
        provider.mount().await;
        assert_eq!(backend.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_state_follows_auth_events() {
        let (provider, backend, _notifier) = provider();
        provider.mount().await;
        let mut rx = provider.watch();

        let session = sample_session("events@example.com");
        backend.emit(AuthChangeEvent::SignedIn, Some(&session));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());

        backend.emit(AuthChangeEvent::SignedOut, None);
        assert!(!rx.borrow_and_update().is_authenticated());
    }

    #[tokio::test]
    async fn test_unmount_unsubscribes_exactly_once() {
        let (provider, backend, _notifier) = provider();
        provider.mount().await;

        assert!(provider.unmount());
        assert!(!provider.unmount());
        drop(provider);

        assert_eq!(backend.unsubscribes(), 1);
        assert_eq!(backend.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_drop_while_mounted_unsubscribes_once() {
        let (provider, backend, _notifier) = provider();
        provider.mount().await;
        drop(provider);
        assert_eq!(backend.unsubscribes(), 1);
    }

    #[tokio::test]
    async fn test_unmounted_provider_ignores_events() {
        let (provider, backend, _notifier) = provider();
        provider.mount().await;
        provider.unmount();

        backend.emit(AuthChangeEvent::SignedIn, Some(&sample_session("a@b.co")));

        assert!(!provider.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_in_success_notifies_once() {
        let (provider, backend, notifier) = provider();
        provider.mount().await;

        let session = provider.sign_in("a@b.co", "hunter22").await.unwrap();

        assert_eq!(session.user.email.as_deref(), Some("a@b.co"));
        assert_eq!(notifier.count(), 1);
        let n = notifier.last().unwrap();
        assert_eq!(n.title, "Login successful");
        assert_eq!(n.description, "Welcome back!");
        assert_eq!(backend.resend_calls(), 0);
        assert!(provider.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_in_failure_notifies_once_and_returns_error() {
        let (provider, backend, notifier) = provider();
        backend.script_sign_in(Scripted::fail(400, "Invalid login credentials"));

        let err = provider.sign_in("a@b.co", "wrong").await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid login credentials");
        assert_eq!(notifier.count(), 1);
        let n = notifier.last().unwrap();
        assert_eq!(n.title, "Error signing in");
        assert_eq!(n.description, "Invalid login credentials");
        assert_eq!(n.variant, NotificationVariant::Destructive);
        assert_eq!(backend.resend_calls(), 0);
    }

    #[tokio::test]
    async fn test_unconfirmed_email_resends_once() {
        let (provider, backend, notifier) = provider();
        backend.script_sign_in(Scripted::fail(400, "Email not confirmed"));

        let err = provider.sign_in("a@b.co", "hunter22").await.unwrap_err();

        assert!(err.is_email_not_confirmed());
        assert_eq!(backend.resend_calls(), 1);
        assert_eq!(notifier.count(), 1);
        let n = notifier.last().unwrap();
        assert_eq!(n.title, "Email not confirmed");
        assert_eq!(
            n.description,
            "We've sent a new confirmation email. Please check your inbox."
        );
    }

    #[tokio::test]
    async fn test_unconfirmed_email_resend_failure() {
        let (provider, backend, notifier) = provider();
        backend.script_sign_in(Scripted::fail(400, "Email not confirmed"));
        backend.script_resend(Scripted::fail(429, "Too many requests"));

        let err = provider.sign_in("a@b.co", "hunter22").await.unwrap_err();

        // The sign-in error is returned, not the resend error.
        assert!(err.is_email_not_confirmed());
        assert_eq!(backend.resend_calls(), 1);
        assert_eq!(notifier.count(), 1);
        let n = notifier.last().unwrap();
        assert_eq!(n.title, "Error signing in");
        assert_eq!(
            n.description,
            "Email not confirmed. We tried to resend confirmation email but failed."
        );
        assert_eq!(n.variant, NotificationVariant::Destructive);
    }

    #[tokio::test]
    async fn test_sign_up_pending_confirmation() {
        let (provider, backend, notifier) = provider();

        let outcome = provider.sign_up("new@example.com", "longenough").await.unwrap();

        assert!(outcome.requires_confirmation());
        assert_eq!(backend.last_redirect().as_deref(), Some(LOCAL));
        assert_eq!(notifier.count(), 1);
        let n = notifier.last().unwrap();
        assert_eq!(n.title, "Verification Email Sent");
        assert_eq!(
            n.description,
            "A confirmation link has been sent to new@example.com. Please check your inbox (and spam folder) to complete your signup."
        );
        assert_eq!(n.duration, Some(Duration::from_secs(9)));
    }

    #[tokio::test]
    async fn test_sign_up_outside_localhost_redirects_to_production() {
        let (provider, backend, _notifier) =
            provider_with(FakeBackend::new(), "https://staging.learnflow.dev");

        provider.sign_up("new@example.com", "longenough").await.unwrap();

        assert_eq!(backend.last_redirect().as_deref(), Some(PROD));
    }

    #[tokio::test]
    async fn test_sign_up_with_immediate_session() {
        let (provider, backend, notifier) = provider();
        backend.script_sign_up(ScriptedSignUp::Immediate);
        provider.mount().await;

        let outcome = provider.sign_up("new@example.com", "longenough").await.unwrap();

        assert!(!outcome.requires_confirmation());
        assert_eq!(notifier.last().unwrap().title, "Signup successful");
        assert_eq!(notifier.last().unwrap().description, "You are now logged in!");
        assert!(provider.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_up_failure() {
        let (provider, backend, notifier) = provider();
        backend.script_sign_up(ScriptedSignUp::Fail {
            status: 422,
            message: "User already registered".to_string(),
        });

        let err = provider.sign_up("taken@example.com", "longenough").await.unwrap_err();

        assert_eq!(err.to_string(), "User already registered");
        assert_eq!(notifier.count(), 1);
        assert_eq!(notifier.last().unwrap().title, "Error signing up");
        assert_eq!(notifier.last().unwrap().description, "User already registered");
    }

    #[tokio::test]
    async fn test_sign_out_success() {
        let (provider, _backend, notifier) =
            provider_with(FakeBackend::new().with_session(sample_session("a@b.co")), LOCAL);
        provider.mount().await;
        assert!(provider.snapshot().is_authenticated());

        provider.sign_out().await;

        assert!(!provider.snapshot().is_authenticated());
        assert_eq!(notifier.count(), 1);
        assert_eq!(notifier.last().unwrap().title, "Signed out");
    }

    #[tokio::test]
    async fn test_sign_out_failure_is_swallowed() {
        let (provider, backend, notifier) = provider();
        backend.script_sign_out(Scripted::fail(500, "Internal error"));

        provider.sign_out().await;

        let n = notifier.last().unwrap();
        assert_eq!(n.title, "Error signing out");
        assert_eq!(n.description, "Internal error");
    }
}
