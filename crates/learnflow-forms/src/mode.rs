//! View-mode state machine using rust-fsm.
//!
//! ```text
//!            Toggle
//!   Login ◄──────────► Signup
//!     │  ▲               │  ▲
//!     │  │ Settle        │  │ Settle
//!     ▼  │               ▼  │
//! SubmittingLogin   SubmittingSignup
//! ```
//!
//! Toggling and submitting are impossible while a submission is in flight.

use rust_fsm::*;
use serde::Serialize;

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub form_machine(Login)

    Login => {
        Toggle => Signup,
        Submit => SubmittingLogin
    },
    Signup => {
        Toggle => Login,
        Submit => SubmittingSignup
    },
    SubmittingLogin => {
        Settle => Login
    },
    SubmittingSignup => {
        Settle => Signup
    }
}

pub use form_machine::Input as FormInput;
pub use form_machine::State as FormState;
pub use form_machine::StateMachine as FormMachine;

/// Which form is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    Login,
    Signup,
}

impl FormMode {
    pub fn heading(&self) -> &'static str {
        match self {
            FormMode::Login => "Welcome Back!",
            FormMode::Signup => "Create Your Account",
        }
    }

    pub fn subheading(&self) -> &'static str {
        match self {
            FormMode::Login => "Sign in to access your dashboard.",
            FormMode::Signup => "It's quick and easy to get started.",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            FormMode::Login => "Sign In",
            FormMode::Signup => "Create Account",
        }
    }

    pub fn toggle_prompt(&self) -> &'static str {
        match self {
            FormMode::Login => "Don't have an account? Sign up",
            FormMode::Signup => "Already have an account? Sign in",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormMode::Login => "login",
            FormMode::Signup => "signup",
        }
    }
}

impl std::fmt::Display for FormMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&FormState> for FormMode {
    fn from(state: &FormState) -> Self {
        match state {
            FormState::Login | FormState::SubmittingLogin => FormMode::Login,
            FormState::Signup | FormState::SubmittingSignup => FormMode::Signup,
        }
    }
}

pub(crate) fn is_submitting(state: &FormState) -> bool {
    matches!(state, FormState::SubmittingLogin | FormState::SubmittingSignup)
}
