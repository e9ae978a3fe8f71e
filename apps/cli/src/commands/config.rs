//! Show the resolved configuration. API keys are reported as
//! Present/Missing, never printed.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use learnflow_auth::RedirectPolicy;
use learnflow_config::{key_status, AI_MODELS, DEFAULT_QUIZ_PARAMS, SUPPORTED_LANGUAGES};
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct ConfigReport<'a> {
    config_file: String,
    session_file: String,
    log_file: String,
    log_level: &'a str,
    supabase_url: &'a str,
    app_origin: &'a str,
    email_redirect_url: String,
    login_min_password: usize,
    signup_min_password: usize,
    openai_api_key: &'static str,
    gemini_api_key: &'static str,
    video_summary_api_key: &'static str,
    video_summary_api_url: Option<&'a str>,
    quiz_model: &'static str,
    chat_model: &'static str,
    quiz_questions: u32,
    languages: Vec<&'static str>,
}

fn report(ctx: &Context) -> ConfigReport<'_> {
    let config = &ctx.config;
    ConfigReport {
        config_file: ctx.paths.config_file().display().to_string(),
        session_file: ctx.paths.session_file().display().to_string(),
        log_file: ctx.paths.log_file().display().to_string(),
        log_level: &config.log_level,
        supabase_url: &config.supabase_url,
        app_origin: &config.app_origin,
        email_redirect_url: RedirectPolicy::from_config(config)
            .email_redirect_url()
            .to_string(),
        login_min_password: config.password_policy.login_min_length,
        signup_min_password: config.password_policy.signup_min_length,
        openai_api_key: key_status(&config.ai.openai_api_key),
        gemini_api_key: key_status(&config.ai.gemini_api_key),
        video_summary_api_key: key_status(&config.ai.video_summary_api_key),
        video_summary_api_url: config.ai.video_summary_api_url.as_deref(),
        quiz_model: AI_MODELS.quiz_generator,
        chat_model: AI_MODELS.tutor_chat,
        quiz_questions: DEFAULT_QUIZ_PARAMS.num_questions,
        languages: SUPPORTED_LANGUAGES.iter().map(|l| l.name).collect(),
    }
}

/// Print the configuration summary.
pub fn show(ctx: &Context) -> Result<()> {
    let report = report(ctx);
    debug!(
        openai = report.openai_api_key,
        gemini = report.gemini_api_key,
        video_summary = report.video_summary_api_key,
        "API key status"
    );

    match ctx.format {
        OutputFormat::Json => output::print_json(&report)?,
        OutputFormat::Text => {
            output::print_heading("Paths");
            output::print_row("Config", &report.config_file);
            output::print_row("Session", &report.session_file);
            output::print_row("Log", &report.log_file);

            output::print_heading("Auth");
            output::print_row("Service URL", report.supabase_url);
            output::print_row("App origin", report.app_origin);
            output::print_row("Email redirect", &report.email_redirect_url);
            output::print_row(
                "Min password",
                &format!(
                    "login {}, signup {}",
                    report.login_min_password, report.signup_min_password
                ),
            );
            output::print_row("Log level", report.log_level);

            output::print_heading("Content backends");
            output::print_row("OpenAI key", report.openai_api_key);
            output::print_row("Gemini key", report.gemini_api_key);
            output::print_row("Video summary key", report.video_summary_api_key);
            output::print_row(
                "Video summary URL",
                report.video_summary_api_url.unwrap_or("not set"),
            );
            output::print_row("Quiz model", report.quiz_model);
            output::print_row("Chat model", report.chat_model);
            output::print_row("Quiz questions", &report.quiz_questions.to_string());
            output::print_row("Languages", &report.languages.join(", "));
        }
    }

    Ok(())
}
