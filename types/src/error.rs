//! Validation errors for parameters and identities.

use thiserror::Error;

/// A governance parameter or identity failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("parameter {0} must be strictly positive")]
    Zero(&'static str),

    #[error("parameter {name} must be within [1, 100], got {value}")]
    PercentageOutOfRange { name: &'static str, value: u32 },

    #[error("invalid account address: {0}")]
    InvalidAddress(String),

    #[error("the null account is not allowed here")]
    NullAccount,
}
