use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body carried by every non-2xx response from the storefront API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("Password must contain at least one digit")]
    PasswordMissingDigit,
    #[error("Password must contain at least one uppercase letter")]
    PasswordMissingUppercase,
    #[error("Password must contain at least one lowercase letter")]
    PasswordMissingLowercase,
}

impl From<ValidationError> for ErrorBody {
    fn from(value: ValidationError) -> Self {
        Self::new(value.to_string())
    }
}
