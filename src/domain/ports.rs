use crate::domain::payment::{Amount, AuthorizedPayment, PayerId, StagedPayment};
use crate::error::Result;
use async_trait::async_trait;

/// Remote payment gateway. Staging reserves a payment before the user
/// authorizes it on the vendor's site; execute confirms it; a direct card
/// charge skips both.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn stage_payment(&self, request: StageRequest) -> Result<StagedPayment>;
    async fn execute_payment(&self, payment: &AuthorizedPayment) -> Result<()>;
    async fn make_payment(&self, amount: &Amount, ccv: &str) -> Result<()>;
}

pub type PaymentGatewayBox = Box<dyn PaymentGateway>;

#[derive(Debug, Clone, PartialEq)]
pub struct StageRequest {
    pub cancel_url: String,
    pub redirect_url: String,
    pub amount_usd: Amount,
}

/// Where the browser returns after the vendor flow. Resolved once at startup
/// and injected, never read from a global.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnUrls {
    pub cancel_url: String,
    pub redirect_url: String,
}

/// The vendor checkout widget, reduced to the one capability the workflow
/// needs: run the redirect round-trip for a staged payment and report how it
/// ended. Implementations resolve with `Authorized` exactly once per
/// successful redirect, or `Cancelled` when the user abandons the flow.
#[async_trait]
pub trait CheckoutWidget: Send + Sync {
    async fn request_authorization(&self, staged: &StagedPayment) -> Result<AuthorizationOutcome>;
}

pub type CheckoutWidgetBox = Box<dyn CheckoutWidget>;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthorizationOutcome {
    Authorized(PayerId),
    Cancelled,
}
