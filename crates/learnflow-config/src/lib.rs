//! Configuration, paths, and logging bootstrap for LearnFlow.

mod config;
pub mod constants;
mod error;
mod logging;
mod paths;

pub use config::{
    key_status, AiBackends, Config, PasswordPolicy, DEFAULT_APP_ORIGIN,
    DEFAULT_PRODUCTION_REDIRECT_URL, DEFAULT_SUPABASE_ANON_KEY, DEFAULT_SUPABASE_URL,
};
pub use constants::{AI_MODELS, DEFAULT_QUIZ_PARAMS, SUPPORTED_LANGUAGES};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
