//! Field-level validation for the auth forms.

use crate::mode::FormMode;
use learnflow_config::PasswordPolicy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub(crate) const INVALID_EMAIL: &str = "Please enter a valid email address.";
pub(crate) const PASSWORD_REQUIRED: &str = "Password is required.";
pub(crate) const PASSWORDS_DONT_MATCH: &str = "Passwords don't match.";

/// An input on the auth form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Email => "Email",
            Field::Password => "Password",
            Field::ConfirmPassword => "Confirm Password",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::Email => "you@example.com",
            Field::Password | Field::ConfirmPassword => "••••••••",
        }
    }

    /// Secret fields are read without echo and never logged.
    pub fn is_secret(&self) -> bool {
        !matches!(self, Field::Email)
    }
}

/// Raw form input.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl FormValues {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Email => self.email = value,
            Field::Password => self.password = value,
            Field::ConfirmPassword => self.confirm_password = value,
        }
    }
}

impl fmt::Debug for FormValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormValues")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}

/// Validated credentials ready for submission.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    password: String,
}

impl Credentials {
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.label(), message)?;
            first = false;
        }
        Ok(())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

fn password_length_message(mode: FormMode, min: usize) -> String {
    match mode {
        FormMode::Login if min <= 1 => PASSWORD_REQUIRED.to_string(),
        _ => format!("Password must be at least {min} characters."),
    }
}

/// Check `values` against the rules for `mode`.
///
/// In signup mode a confirmation mismatch is reported whenever the two
/// passwords differ, alongside any other field errors.
pub fn validate(
    mode: FormMode,
    values: &FormValues,
    policy: PasswordPolicy,
) -> Result<Credentials, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let email = values.email.trim();
    if !is_valid_email(email) {
        errors.insert(Field::Email, INVALID_EMAIL);
    }

    let min = match mode {
        FormMode::Login => policy.login_min_length,
        FormMode::Signup => policy.signup_min_length,
    };
    if values.password.chars().count() < min {
        errors.insert(Field::Password, password_length_message(mode, min));
    }

    if mode == FormMode::Signup && values.password != values.confirm_password {
        errors.insert(Field::ConfirmPassword, PASSWORDS_DONT_MATCH);
    }

    if errors.is_empty() {
        Ok(Credentials {
            email: email.to_string(),
            password: values.password.clone(),
        })
    } else {
        Err(errors)
    }
}
