//! Authentication commands.

use super::prompt::{Answer, Prompt, Terminal};
use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use learnflow_auth::{AuthSnapshot, SessionProvider};
use learnflow_forms::{AuthForm, Field, FormError, FormMode, SubmitOutcome};
use tracing::{debug, info};

fn signed_in_as(snapshot: &AuthSnapshot) -> Option<&str> {
    let user = snapshot.user.as_ref()?;
    Some(user.email.as_deref().unwrap_or(user.id.as_str()))
}

fn print_form_header(form: &AuthForm, format: &OutputFormat) {
    if *format == OutputFormat::Text {
        let mode = form.mode();
        output::print_heading(mode.heading());
        println!("{}", mode.subheading());
        println!(
            "({}: type 's' at the email prompt, 'q' to quit)",
            mode.toggle_prompt()
        );
        println!();
    }
}

/// Fill every visible field.
///
/// Stops early with the answer when the user toggles or quits.
fn fill_form(
    form: &mut AuthForm,
    prompt: &mut impl Prompt,
    preset_email: Option<&str>,
    interactive: bool,
) -> Result<Option<Answer>> {
    for &field in form.fields() {
        if let (Field::Email, Some(email)) = (field, preset_email) {
            form.set_field(field, email)?;
            continue;
        }

        match prompt.ask(field, interactive && field == Field::Email)? {
            Answer::Value(value) => form.set_field(field, value)?,
            other => return Ok(Some(other)),
        }
    }
    Ok(None)
}

/// How the interactive form was left.
#[derive(Debug, PartialEq, Eq)]
enum FormExit {
    SignedIn(String),
    Quit,
}

/// Prompt, submit and repeat until the provider reports a signed-in user
/// or the user quits.
async fn run_form(
    provider: &SessionProvider,
    form: &mut AuthForm,
    prompt: &mut impl Prompt,
    format: &OutputFormat,
) -> Result<FormExit> {
    let mut state = provider.watch();

    loop {
        print_form_header(form, format);

        match fill_form(form, prompt, None, true)? {
            Some(Answer::Toggle) => {
                form.toggle_mode()?;
                continue;
            }
            Some(Answer::Quit) => {
                debug!("Interactive auth closed by user");
                return Ok(FormExit::Quit);
            }
            Some(Answer::Value(_)) | None => {}
        }

        if *format == OutputFormat::Text {
            println!("{}...", form.mode().submit_label());
        }
        match form.submit(provider).await {
            Ok(outcome) => debug!(outcome = ?outcome, "Auth form settled"),
            Err(FormError::Invalid(errors)) => {
                output::print_field_errors(&errors, format);
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        // Leaving the form is driven by auth state, not by the submit result.
        if let Some(who) = signed_in_as(&state.borrow_and_update()).map(str::to_string) {
            return Ok(FormExit::SignedIn(who));
        }
    }
}

/// Interactive sign-in / sign-up loop.
pub async fn interactive(ctx: &Context) -> Result<()> {
    let provider = ctx.provider();
    provider.mount().await;

    if let Some(who) = signed_in_as(&provider.snapshot()) {
        output::print_success(&format!("Already signed in as {}", who), &ctx.format);
        provider.unmount();
        return Ok(());
    }

    let mut form = AuthForm::new(ctx.config.password_policy);
    let exit = run_form(&provider, &mut form, &mut Terminal, &ctx.format).await;
    provider.unmount();

    if let FormExit::SignedIn(who) = exit? {
        info!("Interactive sign-in complete");
        output::print_success(&format!("Signed in as {}", who), &ctx.format);
    }
    Ok(())
}

async fn submit_once(ctx: &Context, mode: FormMode, email: Option<&str>) -> Result<()> {
    let provider = ctx.provider();
    provider.mount().await;

    if mode == FormMode::Login {
        if let Some(who) = signed_in_as(&provider.snapshot()) {
            output::print_success(&format!("Already logged in as {}", who), &ctx.format);
            return Ok(());
        }
    }

    let form = AuthForm::with_mode(ctx.config.password_policy, mode);
    submit_form(&provider, form, &mut Terminal, email, &ctx.format).await
}

/// Fill and submit `form` once. A rejected submission is an error.
async fn submit_form(
    provider: &SessionProvider,
    mut form: AuthForm,
    prompt: &mut impl Prompt,
    email: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let mode = form.mode();
    if fill_form(&mut form, prompt, email, false)?.is_some() {
        bail!("Input closed before the form was complete");
    }

    let outcome = match form.submit(provider).await {
        Ok(outcome) => outcome,
        Err(FormError::Invalid(errors)) => {
            output::print_field_errors(&errors, format);
            bail!("Invalid {} form", mode);
        }
        Err(e) => return Err(e.into()),
    };

    finish(provider, outcome, format)
}

fn finish(
    provider: &SessionProvider,
    outcome: SubmitOutcome,
    format: &OutputFormat,
) -> Result<()> {
    match outcome {
        SubmitOutcome::SignedIn => {
            if let Some(who) = signed_in_as(&provider.snapshot()) {
                output::print_success(&format!("Logged in as {}", who), format);
            }
            Ok(())
        }
        SubmitOutcome::AwaitingConfirmation => Ok(()),
        // The provider has already printed why.
        SubmitOutcome::Rejected => bail!("Authentication failed"),
    }
}

/// Login with email and password.
pub async fn login(ctx: &Context, email: Option<&str>) -> Result<()> {
    submit_once(ctx, FormMode::Login, email).await
}

/// Create an account.
pub async fn signup(ctx: &Context, email: Option<&str>) -> Result<()> {
    submit_once(ctx, FormMode::Signup, email).await
}

/// Logout and clear session.
pub async fn logout(ctx: &Context) -> Result<()> {
    let provider = ctx.provider();
    provider.mount().await;
    provider.sign_out().await;
    Ok(())
}

/// Check authentication status.
pub async fn status(ctx: &Context, verify: bool) -> Result<()> {
    let session = ctx.client().get_session().await?;

    let verified = match (&session, verify) {
        (Some(_), true) => Some(ctx.client().get_user().await.map_err(|e| e.to_string())),
        _ => None,
    };

    match ctx.format {
        OutputFormat::Text => match &session {
            Some(session) => {
                output::print_row("Auth", "logged in");
                output::print_row("User ID", &session.user.id);
                output::print_row("Email", session.user.email.as_deref().unwrap_or("unknown"));
                output::print_row(
                    "Expires",
                    session.expires_at_rfc3339().as_deref().unwrap_or("unknown"),
                );
                match &verified {
                    Some(Ok(_)) => output::print_row("Verified", "yes"),
                    Some(Err(e)) => output::print_row("Verified", &format!("no ({})", e)),
                    None => {}
                }
            }
            None => output::print_row("Auth", "not logged in"),
        },
        OutputFormat::Json => {
            let json = serde_json::json!({
                "logged_in": session.is_some(),
                "user_id": session.as_ref().map(|s| s.user.id.as_str()),
                "email": session.as_ref().and_then(|s| s.user.email.as_deref()),
                "expires_at": session.as_ref().and_then(|s| s.expires_at_rfc3339()),
                "verified": verified.as_ref().map(|v| v.is_ok()),
            });
            output::print_json(&json)?;
        }
    }

    Ok(())
}
