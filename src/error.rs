use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

/// Form field a validation error is addressed to.
///
/// Names match the gateway's error payload so notices can be attached to the
/// offending input without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    AmountUsd,
    Ccv,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::AmountUsd => "amountUsd",
            Field::Ccv => "ccv",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors are `Clone + PartialEq` because terminal workflow outcomes carry
/// them; transport errors are flattened to strings at the adapter boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaymentError {
    #[error("{field}: {reason}")]
    Validation { field: Field, reason: String },
    #[error("payment gateway error: {reason}")]
    Gateway { reason: String },
    #[error("payment outcome unknown: {reason}")]
    UnknownOutcome { reason: String },
    #[error("payment workflow is no longer running")]
    WorkflowClosed,
}

impl PaymentError {
    pub fn validation(field: Field, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn gateway(reason: impl Into<String>) -> Self {
        Self::Gateway {
            reason: reason.into(),
        }
    }

    pub fn unknown_outcome(reason: impl Into<String>) -> Self {
        Self::UnknownOutcome {
            reason: reason.into(),
        }
    }
}
