//! HTTP-level tests for the auth client against a mock auth service.

use chrono::Utc;
use learnflow_auth::{
    AuthChangeEvent, AuthError, MemorySessionStore, Notification, Notifier, RedirectPolicy,
    Session, SessionProvider, SessionStore, Subscription, SupabaseAuthClient, User,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANON_KEY: &str = "anon-key";

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self::default()
    }

    fn count(&self) -> usize {
        self.seen.lock().len()
    }

    fn last(&self) -> Option<Notification> {
        self.seen.lock().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}

fn sample_session(email: &str) -> Session {
    Session {
        access_token: format!("access-{email}"),
        refresh_token: format!("refresh-{email}"),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        expires_at: Some(Utc::now().timestamp() + 3600),
        user: User {
            id: format!("user-{email}"),
            email: Some(email.to_string()),
            email_confirmed_at: None,
            created_at: None,
        },
    }
}

fn session_body(email: &str) -> serde_json::Value {
    json!({
        "access_token": "fresh-access",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": Utc::now().timestamp() + 3600,
        "refresh_token": "fresh-refresh",
        "user": { "id": "u-1", "email": email, "aud": "authenticated" }
    })
}

fn client_with_store(server: &MockServer, store: Arc<MemorySessionStore>) -> SupabaseAuthClient {
    SupabaseAuthClient::new(&server.uri(), ANON_KEY, store).unwrap()
}

type EventLog = Arc<Mutex<Vec<AuthChangeEvent>>>;

fn record_events(client: &SupabaseAuthClient) -> (EventLog, Subscription) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let sub = client.on_auth_state_change(Arc::new(
        move |event: AuthChangeEvent, _session: Option<&Session>| {
            sink.lock().push(event);
        },
    ));
    (events, sub)
}

#[tokio::test]
async fn sign_in_persists_session_and_emits_signed_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", ANON_KEY))
        .and(body_json(json!({ "email": "a@b.co", "password": "hunter22" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("a@b.co")))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let client = client_with_store(&server, store.clone());
    let (events, _sub) = record_events(&client);

    let session = client.sign_in_with_password("a@b.co", "hunter22").await.unwrap();

    assert_eq!(session.access_token, "fresh-access");
    assert_eq!(store.load().unwrap(), Some(session));
    assert_eq!(*events.lock(), vec![AuthChangeEvent::SignedIn]);
}

#[tokio::test]
async fn sign_in_error_uses_service_message_and_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 400,
            "error_code": "email_not_confirmed",
            "msg": "Email not confirmed"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let client = client_with_store(&server, store.clone());

    let err = client.sign_in_with_password("a@b.co", "hunter22").await.unwrap_err();

    match &err {
        AuthError::Provider {
            status,
            code,
            message,
        } => {
            assert_eq!(*status, 400);
            assert_eq!(code.as_deref(), Some("email_not_confirmed"));
            assert_eq!(message, "Email not confirmed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_email_not_confirmed());
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn sign_in_error_legacy_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let client = client_with_store(&server, Arc::new(MemorySessionStore::new()));
    let err = client.sign_in_with_password("a@b.co", "nope").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid login credentials");
    assert!(matches!(err, AuthError::Provider { code: Some(ref c), .. } if c == "invalid_grant"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn sign_up_sends_redirect_and_reports_pending_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(query_param("redirect_to", "http://localhost:8080"))
        .and(body_json(json!({ "email": "new@example.com", "password": "longenough" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-new",
            "email": "new@example.com",
            "confirmation_sent_at": "2024-05-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let client = client_with_store(&server, store.clone());

    let outcome = client
        .sign_up("new@example.com", "longenough", Some("http://localhost:8080"))
        .await
        .unwrap();

    assert!(outcome.requires_confirmation());
    assert_eq!(outcome.user.unwrap().id, "u-new");
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn sign_out_clears_local_session_even_when_service_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer access-a@b.co"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "msg": "boom" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(sample_session("a@b.co")));
    let client = client_with_store(&server, store.clone());
    let (events, _sub) = record_events(&client);

    let err = client.sign_out().await.unwrap_err();

    assert!(err.is_transient());
    assert!(store.load().unwrap().is_none());
    assert_eq!(*events.lock(), vec![AuthChangeEvent::SignedOut]);
}

#[tokio::test]
async fn sign_out_treats_revoked_token_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(sample_session("a@b.co")));
    let client = client_with_store(&server, store.clone());

    client.sign_out().await.unwrap();
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn get_session_refreshes_expired_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({ "refresh_token": "refresh-a@b.co" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("a@b.co")))
        .expect(1)
        .mount(&server)
        .await;

    let mut expired = sample_session("a@b.co");
    expired.expires_at = Some(Utc::now().timestamp() - 60);
    let store = Arc::new(MemorySessionStore::with_session(expired));
    let client = client_with_store(&server, store.clone());
    let (events, _sub) = record_events(&client);

    let session = client.get_session().await.unwrap().unwrap();

    assert_eq!(session.access_token, "fresh-access");
    assert_eq!(store.load().unwrap().unwrap().refresh_token, "fresh-refresh");
    assert_eq!(*events.lock(), vec![AuthChangeEvent::TokenRefreshed]);
}

#[tokio::test]
async fn get_session_drops_session_when_refresh_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_code": "refresh_token_not_found",
            "msg": "Invalid Refresh Token: Refresh Token Not Found"
        })))
        .mount(&server)
        .await;

    let mut expired = sample_session("a@b.co");
    expired.expires_at = Some(Utc::now().timestamp() - 60);
    let store = Arc::new(MemorySessionStore::with_session(expired));
    let client = client_with_store(&server, store.clone());

    assert!(client.get_session().await.unwrap().is_none());
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn get_user_verifies_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer access-a@b.co"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-a@b.co",
            "email": "a@b.co"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(sample_session("a@b.co")));
    let client = client_with_store(&server, store);

    let user = client.get_user().await.unwrap();
    assert_eq!(user.email.as_deref(), Some("a@b.co"));
}

#[tokio::test]
async fn get_user_without_session_is_not_logged_in() {
    let server = MockServer::start().await;
    let client = client_with_store(&server, Arc::new(MemorySessionStore::new()));

    assert!(matches!(client.get_user().await, Err(AuthError::NotLoggedIn)));
}

#[tokio::test]
async fn provider_resends_confirmation_once_for_unconfirmed_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_code": "email_not_confirmed",
            "msg": "Email not confirmed"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/resend"))
        .and(body_json(json!({ "type": "signup", "email": "a@b.co" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = Arc::new(client_with_store(&server, Arc::new(MemorySessionStore::new())));
    let notifier = Arc::new(RecordingNotifier::new());
    let provider = SessionProvider::new(
        client,
        notifier.clone(),
        RedirectPolicy::new("http://localhost:8080", "https://b-gilt-nine.vercel.app"),
    );
    provider.mount().await;

    let err = provider.sign_in("a@b.co", "hunter22").await.unwrap_err();

    assert!(err.is_email_not_confirmed());
    assert_eq!(notifier.count(), 1);
    assert_eq!(notifier.last().unwrap().title, "Email not confirmed");
    assert!(!provider.snapshot().is_authenticated());
}

#[tokio::test]
async fn provider_state_follows_client_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("a@b.co")))
        .mount(&server)
        .await;

    let client = Arc::new(client_with_store(&server, Arc::new(MemorySessionStore::new())));
    let provider = SessionProvider::new(
        client,
        Arc::new(RecordingNotifier::new()),
        RedirectPolicy::new("http://localhost:8080", "https://b-gilt-nine.vercel.app"),
    );
    provider.mount().await;
    let mut rx = provider.watch();

    provider.sign_in("a@b.co", "hunter22").await.unwrap();

    rx.changed().await.unwrap();
    let snapshot = rx.borrow().clone();
    assert_eq!(snapshot.user.unwrap().email.as_deref(), Some("a@b.co"));
}
