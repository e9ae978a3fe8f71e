//! Form error types.

use crate::mode::FormMode;
use crate::validation::{Field, ValidationErrors};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Input failed validation; nothing was sent.
    #[error("{0}")]
    Invalid(ValidationErrors),

    /// A submission is already in flight.
    #[error("A submission is already in progress")]
    Busy,

    /// Settle was requested with nothing in flight.
    #[error("No submission in progress")]
    NotSubmitting,

    #[error("{} is not part of the {mode} form", .field.label())]
    FieldNotInMode { field: Field, mode: FormMode },
}
