use crate::domain::payment::{
    Amount, AuthorizedPayment, PayerId, PaymentId, StagedPayment, VENDOR_MINIMUM_USD,
};
use crate::domain::ports::{AuthorizationOutcome, CheckoutWidget, PaymentGateway, StageRequest};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Literal rejection the sandbox returns for amounts under the vendor
/// minimum, mirroring the vendor's own gate.
pub const VENDOR_MINIMUM_REASON: &str = "Amount must be at least 5.00 USD.";

#[derive(Default)]
struct SandboxState {
    next_payment: u32,
    staged: HashSet<String>,
    stage_calls: u32,
    execute_calls: u32,
    charge_calls: u32,
    last_charge: Option<(String, String)>,
    next_stage_error: Option<PaymentError>,
    next_execute_error: Option<PaymentError>,
    next_charge_error: Option<PaymentError>,
}

/// An in-process gateway for tests and offline runs.
///
/// Counts every call and supports scripting the next rejection, so callers
/// can assert on the at-most-one-call guarantees without a network.
#[derive(Default, Clone)]
pub struct SandboxGateway {
    state: Arc<RwLock<SandboxState>>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a structured rejection for the next stage call.
    pub async fn reject_next_stage(&self, reason: &str) {
        self.state.write().await.next_stage_error = Some(PaymentError::gateway(reason));
    }

    pub async fn reject_next_execute(&self, reason: &str) {
        self.state.write().await.next_execute_error = Some(PaymentError::gateway(reason));
    }

    pub async fn reject_next_charge(&self, reason: &str) {
        self.state.write().await.next_charge_error = Some(PaymentError::gateway(reason));
    }

    /// Scripts a transport failure after the next execute was sent, leaving
    /// the outcome indeterminate.
    pub async fn interrupt_next_execute(&self, reason: &str) {
        self.state.write().await.next_execute_error = Some(PaymentError::unknown_outcome(reason));
    }

    pub async fn interrupt_next_charge(&self, reason: &str) {
        self.state.write().await.next_charge_error = Some(PaymentError::unknown_outcome(reason));
    }

    pub async fn stage_calls(&self) -> u32 {
        self.state.read().await.stage_calls
    }

    pub async fn execute_calls(&self) -> u32 {
        self.state.read().await.execute_calls
    }

    pub async fn charge_calls(&self) -> u32 {
        self.state.read().await.charge_calls
    }

    /// Amount and CCV of the most recent direct charge, as transmitted.
    pub async fn last_charge(&self) -> Option<(String, String)> {
        self.state.read().await.last_charge.clone()
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn stage_payment(&self, request: StageRequest) -> Result<StagedPayment> {
        let mut state = self.state.write().await;
        state.stage_calls += 1;
        if let Some(error) = state.next_stage_error.take() {
            return Err(error);
        }
        if request.amount_usd.value() < VENDOR_MINIMUM_USD {
            return Err(PaymentError::gateway(VENDOR_MINIMUM_REASON));
        }
        state.next_payment += 1;
        let payment_id = format!("PAY-SANDBOX-{}", state.next_payment);
        state.staged.insert(payment_id.clone());
        Ok(StagedPayment {
            payment_id: PaymentId(payment_id),
        })
    }

    async fn execute_payment(&self, payment: &AuthorizedPayment) -> Result<()> {
        let mut state = self.state.write().await;
        state.execute_calls += 1;
        if let Some(error) = state.next_execute_error.take() {
            return Err(error);
        }
        // A payment can only be executed once.
        if !state.staged.remove(&payment.payment_id.0) {
            return Err(PaymentError::gateway("Unknown payment id."));
        }
        Ok(())
    }

    async fn make_payment(&self, amount: &Amount, ccv: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.charge_calls += 1;
        if let Some(error) = state.next_charge_error.take() {
            return Err(error);
        }
        state.last_charge = Some((amount.to_string(), ccv.to_string()));
        Ok(())
    }
}

/// A checkout widget that skips the browser round-trip: authorizes
/// immediately, or reports an abandoned redirect when built with
/// [`SandboxWidget::abandoning`].
#[derive(Default, Clone)]
pub struct SandboxWidget {
    abandon: bool,
}

impl SandboxWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abandoning() -> Self {
        Self { abandon: true }
    }
}

#[async_trait]
impl CheckoutWidget for SandboxWidget {
    async fn request_authorization(&self, staged: &StagedPayment) -> Result<AuthorizationOutcome> {
        if self.abandon {
            return Ok(AuthorizationOutcome::Cancelled);
        }
        Ok(AuthorizationOutcome::Authorized(PayerId(format!(
            "PAYER-{}",
            staged.payment_id
        ))))
    }
}
