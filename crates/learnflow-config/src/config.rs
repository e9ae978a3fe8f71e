//! Configuration management for the client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default auth service URL (can be overridden at compile time via SUPABASE_URL env var).
pub const DEFAULT_SUPABASE_URL: &str = match option_env!("SUPABASE_URL") {
    Some(url) => url,
    None => "http://localhost:54321",
};

/// Default anon key (can be overridden at compile time via SUPABASE_ANON_KEY env var).
pub const DEFAULT_SUPABASE_ANON_KEY: &str = match option_env!("SUPABASE_ANON_KEY") {
    Some(key) => key,
    None => "public-anon-key",
};

/// Origin the app is served from during local development.
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:8080";

/// Where email verification links land outside local development.
pub const DEFAULT_PRODUCTION_REDIRECT_URL: &str = "https://b-gilt-nine.vercel.app";

/// Placeholder shipped instead of a real OpenAI key.
const OPENAI_PLACEHOLDER_KEY: &str = "sk-example-key-replace-with-your-own";

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Hosted auth service project URL.
    #[serde(default = "default_supabase_url")]
    pub supabase_url: String,
    /// Public anon key for the auth service.
    #[serde(default = "default_supabase_anon_key")]
    pub supabase_anon_key: String,
    /// Origin the app is currently served from.
    #[serde(default = "default_app_origin")]
    pub app_origin: String,
    /// Redirect target for verification emails outside local development.
    #[serde(default = "default_production_redirect_url")]
    pub production_redirect_url: String,
    /// Generative-AI and video backends.
    #[serde(default)]
    pub ai: AiBackends,
    /// Minimum password lengths enforced by the auth forms.
    #[serde(default)]
    pub password_policy: PasswordPolicy,
}

/// API keys and endpoints for the content backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiBackends {
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub video_summary_api_key: Option<String>,
    pub video_summary_api_url: Option<String>,
}

impl Default for AiBackends {
    fn default() -> Self {
        Self {
            openai_api_key: Some(OPENAI_PLACEHOLDER_KEY.to_string()),
            openai_api_url: OPENAI_API_URL.to_string(),
            gemini_api_key: None,
            gemini_api_url: GEMINI_API_URL.to_string(),
            video_summary_api_key: None,
            video_summary_api_url: None,
        }
    }
}

/// Minimum password lengths per form mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Login only requires a non-empty password.
    pub login_min_length: usize,
    /// Signup enforces a real minimum.
    pub signup_min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            login_min_length: 1,
            signup_min_length: 8,
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_supabase_url() -> String {
    DEFAULT_SUPABASE_URL.to_string()
}

fn default_supabase_anon_key() -> String {
    DEFAULT_SUPABASE_ANON_KEY.to_string()
}

fn default_app_origin() -> String {
    DEFAULT_APP_ORIGIN.to_string()
}

fn default_production_redirect_url() -> String {
    DEFAULT_PRODUCTION_REDIRECT_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            supabase_url: default_supabase_url(),
            supabase_anon_key: default_supabase_anon_key(),
            app_origin: default_app_origin(),
            production_redirect_url: default_production_redirect_url(),
            ai: AiBackends::default(),
            password_policy: PasswordPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from the config file (if any), then apply
    /// environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| CoreError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Apply `LEARNFLOW_*` overrides using the given variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).and_then(non_empty);

        if let Some(v) = get("LEARNFLOW_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = get("LEARNFLOW_SUPABASE_URL") {
            self.supabase_url = v;
        }
        if let Some(v) = get("LEARNFLOW_SUPABASE_ANON_KEY") {
            self.supabase_anon_key = v;
        }
        if let Some(v) = get("LEARNFLOW_APP_ORIGIN") {
            self.app_origin = v;
        }
        if let Some(v) = get("LEARNFLOW_PRODUCTION_REDIRECT_URL") {
            self.production_redirect_url = v;
        }
        if let Some(v) = get("LEARNFLOW_OPENAI_API_KEY") {
            self.ai.openai_api_key = Some(v);
        }
        if let Some(v) = get("LEARNFLOW_GEMINI_API_KEY") {
            self.ai.gemini_api_key = Some(v);
        }
        if let Some(v) = get("LEARNFLOW_VIDEO_SUMMARY_API_KEY") {
            self.ai.video_summary_api_key = Some(v);
        }
        if let Some(v) = get("LEARNFLOW_VIDEO_SUMMARY_API_URL") {
            self.ai.video_summary_api_url = Some(v);
        }
    }

    /// Reject configurations the auth flow cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        self.supabase_url()?;
        Url::parse(&self.app_origin)?;
        Url::parse(&self.production_redirect_url)?;
        if self.password_policy.signup_min_length < self.password_policy.login_min_length {
            return Err(CoreError::Config(
                "signup_min_length must not be below login_min_length".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the auth service URL as a parsed URL.
    pub fn supabase_url(&self) -> CoreResult<Url> {
        Url::parse(&self.supabase_url).map_err(CoreError::from)
    }
}

/// "Present" / "Missing" label for an optional secret, for display.
pub fn key_status(key: &Option<String>) -> &'static str {
    match key {
        Some(k) if !k.trim().is_empty() => "Present",
        _ => "Missing",
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
