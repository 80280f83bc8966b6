use async_trait::async_trait;
use payflow::domain::payment::{Amount, AuthorizedPayment, PaymentId, StagedPayment};
use payflow::domain::ports::{PaymentGateway, ReturnUrls, StageRequest};
use payflow::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Semaphore;

/// Gateway whose calls park on a gate until the test releases them, so
/// assertions can run while a stage or execute is in flight.
#[derive(Clone)]
pub struct GatedGateway {
    gate: Arc<Semaphore>,
    stage_calls: Arc<AtomicU32>,
    execute_calls: Arc<AtomicU32>,
    charge_calls: Arc<AtomicU32>,
}

impl GatedGateway {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            stage_calls: Arc::new(AtomicU32::new(0)),
            execute_calls: Arc::new(AtomicU32::new(0)),
            charge_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Lets the next `n` parked calls complete.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn stage_calls(&self) -> u32 {
        self.stage_calls.load(Ordering::SeqCst)
    }

    pub fn execute_calls(&self) -> u32 {
        self.execute_calls.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn charge_calls(&self) -> u32 {
        self.charge_calls.load(Ordering::SeqCst)
    }

    async fn pass_gate(&self) {
        self.gate.acquire().await.expect("gate closed").forget();
    }
}

#[async_trait]
impl PaymentGateway for GatedGateway {
    async fn stage_payment(&self, _request: StageRequest) -> Result<StagedPayment> {
        self.stage_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        Ok(StagedPayment {
            payment_id: PaymentId("PAY-GATED-1".into()),
        })
    }

    async fn execute_payment(&self, _payment: &AuthorizedPayment) -> Result<()> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        Ok(())
    }

    async fn make_payment(&self, _amount: &Amount, _ccv: &str) -> Result<()> {
        self.charge_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        Ok(())
    }
}

pub fn urls() -> ReturnUrls {
    ReturnUrls {
        cancel_url: "https://console.test/billing/cancel".into(),
        redirect_url: "https://console.test/billing/return".into(),
    }
}
