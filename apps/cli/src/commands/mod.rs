//! CLI command implementations.

mod auth;
mod config;
mod prompt;

pub use auth::{interactive, login, logout, signup, status};
pub use config::show as config_show;

use crate::notifier::TerminalNotifier;
use crate::output::OutputFormat;
use anyhow::Result;
use learnflow_auth::{RedirectPolicy, SessionProvider, SupabaseAuthClient};
use learnflow_config::{Config, Paths};
use std::sync::Arc;

/// Everything a command needs, resolved once at startup.
pub struct Context {
    pub paths: Paths,
    pub config: Config,
    pub format: OutputFormat,
    client: Arc<SupabaseAuthClient>,
}

impl Context {
    pub fn new(paths: Paths, config: Config, format: OutputFormat) -> Result<Self> {
        let client = Arc::new(SupabaseAuthClient::from_config(&config, &paths)?);
        Ok(Self {
            paths,
            config,
            format,
            client,
        })
    }

    pub fn client(&self) -> &SupabaseAuthClient {
        &self.client
    }

    /// A provider over the shared client that prints notifications.
    pub fn provider(&self) -> SessionProvider {
        SessionProvider::new(
            self.client.clone(),
            Arc::new(TerminalNotifier::new(self.format)),
            RedirectPolicy::from_config(&self.config),
        )
    }
}
