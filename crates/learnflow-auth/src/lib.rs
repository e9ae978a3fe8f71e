//! Authentication session layer for LearnFlow.
//!
//! This crate provides:
//! - A REST client for the hosted Supabase-compatible auth service
//! - Auth-state listeners with exactly-once unsubscribe
//! - Session persistence owned by the client
//! - `SessionProvider`, which mirrors the session into watchable state and
//!   turns provider outcomes into user-facing notifications

mod backend;
mod client;
mod error;
mod listeners;
mod notify;
mod provider;
mod redirect;
mod storage;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use backend::AuthBackend;
pub use client::SupabaseAuthClient;
pub use error::{AuthError, AuthResult, EMAIL_NOT_CONFIRMED};
pub use listeners::{AuthListeners, AuthStateCallback, Subscription};
pub use notify::{Notification, NotificationVariant, Notifier};
pub use provider::{AuthSnapshot, SessionProvider};
pub use redirect::RedirectPolicy;
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore};
pub use types::{AuthChangeEvent, Session, SignUpOutcome, User};
