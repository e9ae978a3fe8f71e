//! Where verification emails send the user back to.

use learnflow_config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPolicy {
    app_origin: String,
    production_url: String,
}

impl RedirectPolicy {
    pub fn new(app_origin: impl Into<String>, production_url: impl Into<String>) -> Self {
        Self {
            app_origin: app_origin.into(),
            production_url: production_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.app_origin, &config.production_redirect_url)
    }

    /// Local development origins are used as-is; everything else goes to
    /// the production deployment.
    pub fn email_redirect_url(&self) -> &str {
        if self.app_origin.contains("localhost") {
            &self.app_origin
        } else {
            &self.production_url
        }
    }
}
