//! Login / signup form model.
//!
//! The form holds transient credentials, validates them per mode and hands
//! them to the [`learnflow_auth::SessionProvider`]. Rendering is left to
//! the caller; the CLI drives it from a terminal prompt.

mod error;
mod form;
mod mode;
mod validation;

pub use error::FormError;
pub use form::{AuthForm, PendingSubmission, SubmitOutcome};
pub use mode::{FormInput, FormMachine, FormMode, FormState};
pub use validation::{
    is_valid_email, validate, Credentials, Field, FormValues, ValidationErrors,
};
