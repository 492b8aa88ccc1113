use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoanError {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("unsupported loan type `{0}`, expected `linear` or `annuity`")]
    UnsupportedLoanType(String),
}

impl LoanError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        LoanError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

pub type LoanResult<T> = Result<T, LoanError>;
