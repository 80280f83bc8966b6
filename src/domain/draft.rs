use crate::domain::payment::{Amount, PaymentMethod, VENDOR_MINIMUM_USD};
use crate::error::{Field, PaymentError};
use rust_decimal::Decimal;

/// Form state for a payment being entered. Mutated on every keystroke and
/// discarded (or partially reset) once a workflow run terminates.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDraft {
    amount_usd: String,
    ccv: String,
    method: PaymentMethod,
}

impl Default for PaymentDraft {
    fn default() -> Self {
        Self::new(PaymentMethod::DirectCard)
    }
}

impl PaymentDraft {
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            amount_usd: String::new(),
            ccv: String::new(),
            method,
        }
    }

    pub fn set_amount(&mut self, amount_usd: impl Into<String>) {
        self.amount_usd = amount_usd.into();
    }

    pub fn set_ccv(&mut self, ccv: impl Into<String>) {
        self.ccv = ccv.into();
    }

    pub fn set_method(&mut self, method: PaymentMethod) {
        self.method = method;
    }

    pub fn amount_usd(&self) -> &str {
        &self.amount_usd
    }

    pub fn ccv(&self) -> &str {
        &self.ccv
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    /// Called after a successful charge; the entered amount is kept on
    /// failure so the user can retry from a fresh run.
    pub fn clear_amount(&mut self) {
        self.amount_usd.clear();
    }

    /// Validates the draft for submission, collecting one error per
    /// offending field. The CCV is only required for direct card payments,
    /// and a card draft without one cannot exist past this point.
    pub fn validate(&self) -> std::result::Result<ValidatedDraft, Vec<PaymentError>> {
        let mut errors = Vec::new();

        let amount = match Amount::parse(&self.amount_usd) {
            Ok(amount) => Some(amount),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        if self.method == PaymentMethod::DirectCard && self.ccv.trim().is_empty() {
            errors.push(PaymentError::validation(Field::Ccv, "card verification code is required"));
        }

        match amount {
            Some(amount) if errors.is_empty() => Ok(match self.method {
                PaymentMethod::DirectCard => ValidatedDraft::Card {
                    amount,
                    ccv: self.ccv.trim().to_string(),
                },
                PaymentMethod::VendorRedirect => ValidatedDraft::Vendor { amount },
            }),
            _ => Err(errors),
        }
    }

    /// Inline hint for the vendor minimum, recomputed per keystroke.
    ///
    /// Submission does not enforce the minimum; the vendor side is
    /// authoritative and its rejection reason is surfaced verbatim.
    pub fn vendor_minimum_hint(&self) -> Option<String> {
        if self.method != PaymentMethod::VendorRedirect || self.amount_usd.trim().is_empty() {
            return None;
        }
        match self.amount_usd.trim().parse::<Decimal>() {
            Err(_) => Some("enter a numeric amount".to_string()),
            Ok(value) if value < VENDOR_MINIMUM_USD => {
                Some(format!("PayPal payments must be at least ${VENDOR_MINIMUM_USD}"))
            }
            Ok(_) => None,
        }
    }
}

/// A draft that passed submission validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedDraft {
    Card { amount: Amount, ccv: String },
    Vendor { amount: Amount },
}

impl ValidatedDraft {
    pub fn amount(&self) -> Amount {
        match self {
            ValidatedDraft::Card { amount, .. } | ValidatedDraft::Vendor { amount } => *amount,
        }
    }

    pub fn method(&self) -> PaymentMethod {
        match self {
            ValidatedDraft::Card { .. } => PaymentMethod::DirectCard,
            ValidatedDraft::Vendor { .. } => PaymentMethod::VendorRedirect,
        }
    }
}
