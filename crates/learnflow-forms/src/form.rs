//! The auth form: values, per-field errors and the submission lifecycle.

use crate::error::FormError;
use crate::mode::{is_submitting, FormInput, FormMachine, FormMode};
use crate::validation::{validate, Credentials, Field, FormValues, ValidationErrors};
use learnflow_auth::SessionProvider;
use learnflow_config::PasswordPolicy;
use tracing::{debug, info};

const LOGIN_FIELDS: &[Field] = &[Field::Email, Field::Password];
const SIGNUP_FIELDS: &[Field] = &[Field::Email, Field::Password, Field::ConfirmPassword];

/// Validated input handed out by [`AuthForm::begin_submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub mode: FormMode,
    pub credentials: Credentials,
}

/// How a submission ended.
///
/// Provider failures are not errors here: the provider has already told
/// the user what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    SignedIn,
    AwaitingConfirmation,
    Rejected,
}

pub struct AuthForm {
    machine: FormMachine,
    values: FormValues,
    errors: ValidationErrors,
    policy: PasswordPolicy,
}

impl AuthForm {
    /// A login form.
    pub fn new(policy: PasswordPolicy) -> Self {
        Self {
            machine: FormMachine::new(),
            values: FormValues::default(),
            errors: ValidationErrors::default(),
            policy,
        }
    }

    /// A form opened directly in `mode`.
    pub fn with_mode(policy: PasswordPolicy, mode: FormMode) -> Self {
        let mut form = Self::new(policy);
        if mode == FormMode::Signup {
            let toggled = form.machine.consume(&FormInput::Toggle);
            debug_assert!(toggled.is_ok(), "idle form machine rejected Toggle");
        }
        form
    }

    pub fn mode(&self) -> FormMode {
        FormMode::from(self.machine.state())
    }

    pub fn is_submitting(&self) -> bool {
        is_submitting(self.machine.state())
    }

    /// Fields shown in the current mode, in display order.
    pub fn fields(&self) -> &'static [Field] {
        match self.mode() {
            FormMode::Login => LOGIN_FIELDS,
            FormMode::Signup => SIGNUP_FIELDS,
        }
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(field)
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<(), FormError> {
        if self.is_submitting() {
            return Err(FormError::Busy);
        }
        if !self.fields().contains(&field) {
            return Err(FormError::FieldNotInMode {
                field,
                mode: self.mode(),
            });
        }
        self.values.set(field, value.into());
        Ok(())
    }

    /// Switch between login and signup. All values and errors are cleared.
    pub fn toggle_mode(&mut self) -> Result<FormMode, FormError> {
        self.machine
            .consume(&FormInput::Toggle)
            .map_err(|_| FormError::Busy)?;
        self.values = FormValues::default();
        self.errors = ValidationErrors::default();

        let mode = self.mode();
        debug!(mode = %mode, "Auth form mode toggled");
        Ok(mode)
    }

    /// Validate the current values, recording per-field errors.
    pub fn validate(&mut self) -> Result<Credentials, ValidationErrors> {
        let result = validate(self.mode(), &self.values, self.policy);
        self.errors = match &result {
            Ok(_) => ValidationErrors::default(),
            Err(errors) => errors.clone(),
        };
        result
    }

    /// Validate and enter the submitting state.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, FormError> {
        if self.is_submitting() {
            return Err(FormError::Busy);
        }

        let credentials = self.validate().map_err(FormError::Invalid)?;
        let mode = self.mode();
        self.machine
            .consume(&FormInput::Submit)
            .map_err(|_| FormError::Busy)?;

        Ok(PendingSubmission { mode, credentials })
    }

    /// Leave the submitting state.
    pub fn complete_submit(&mut self) -> Result<(), FormError> {
        self.machine
            .consume(&FormInput::Settle)
            .map_err(|_| FormError::NotSubmitting)?;
        Ok(())
    }

    /// Validate and send the form through `provider`.
    ///
    /// Returns `FormError::Invalid` without contacting the provider when
    /// validation fails.
    pub async fn submit(&mut self, provider: &SessionProvider) -> Result<SubmitOutcome, FormError> {
        let PendingSubmission { mode, credentials } = self.begin_submit()?;
        info!(mode = %mode, email = %credentials.email, "Submitting auth form");

        let outcome = match mode {
            FormMode::Login => provider
                .sign_in(&credentials.email, credentials.password())
                .await
                .map(|_| SubmitOutcome::SignedIn),
            FormMode::Signup => provider
                .sign_up(&credentials.email, credentials.password())
                .await
                .map(|outcome| {
                    if outcome.requires_confirmation() {
                        SubmitOutcome::AwaitingConfirmation
                    } else {
                        SubmitOutcome::SignedIn
                    }
                }),
        };

        self.complete_submit()?;

        Ok(outcome.unwrap_or_else(|err| {
            debug!(error = %err, "Auth form submission rejected");
            SubmitOutcome::Rejected
        }))
    }
}
