use crate::error::{Field, PaymentError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize, Serializer};

/// Minimum amount the vendor checkout accepts. Enforced by the vendor side;
/// the client only surfaces it as an inline hint.
pub const VENDOR_MINIMUM_USD: Decimal = dec!(5.00);

/// A positive USD amount, normalized to two decimal places.
///
/// Normalization uses round-half-even to match the gateway's rounding, and
/// happens at construction so every transmitted amount has exactly two
/// decimals (`"10.00"`, never `"10"` or `"10.005"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        let mut normalized =
            value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        normalized.rescale(2);
        if normalized <= Decimal::ZERO {
            return Err(PaymentError::validation(
                Field::AmountUsd,
                "amount must be positive",
            ));
        }
        Ok(Self(normalized))
    }

    /// Parses user input. Blank and non-numeric input are rejected with
    /// field-addressable errors rather than guessed at.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PaymentError::validation(
                Field::AmountUsd,
                "amount is required",
            ));
        }
        let value = trimmed.parse::<Decimal>().map_err(|_| {
            PaymentError::validation(Field::AmountUsd, "amount must be a number")
        })?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    DirectCard,
    VendorRedirect,
}

impl PaymentMethod {
    /// Label shown in the confirmation dialog and notices.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::DirectCard => "credit card",
            PaymentMethod::VendorRedirect => "PayPal",
        }
    }
}

/// Opaque token issued by the gateway when a payment is staged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub String);

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payer identifier delivered by the vendor widget's authorization callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayerId(pub String);

impl std::fmt::Display for PayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A staged payment awaiting vendor authorization. Lives for a single
/// workflow run; it is consumed on execution or cancellation and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPayment {
    pub payment_id: PaymentId,
}

impl StagedPayment {
    /// Pairs the staged payment with the payer delivered by the
    /// authorization callback. Execution requires the pair, so a charge
    /// without authorization cannot be expressed.
    pub fn authorized(self, payer_id: PayerId) -> AuthorizedPayment {
        AuthorizedPayment {
            payment_id: self.payment_id,
            payer_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedPayment {
    pub payment_id: PaymentId,
    pub payer_id: PayerId,
}
