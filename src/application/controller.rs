use crate::domain::draft::PaymentDraft;
use crate::domain::payment::PayerId;
use crate::domain::ports::{PaymentGatewayBox, ReturnUrls, StageRequest};
use crate::domain::workflow::{Effect, Step, WorkflowEvent, WorkflowState};
use crate::error::PaymentError;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Drives one payment workflow: feeds events through the pure reducer and
/// performs the effects it requests against the gateway port.
///
/// Each `Stage`/`Charge`/`Execute` effect is awaited to completion before the
/// next event is reduced, so the workflow suspends at exactly two points and
/// never has more than one gateway call in flight.
pub struct PaymentWorkflow {
    state: WorkflowState,
    gateway: PaymentGatewayBox,
    urls: ReturnUrls,
    states: watch::Sender<WorkflowState>,
}

impl PaymentWorkflow {
    pub fn new(gateway: PaymentGatewayBox, urls: ReturnUrls) -> Self {
        let (states, _) = watch::channel(WorkflowState::Idle);
        Self {
            state: WorkflowState::Idle,
            gateway,
            urls,
            states,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Snapshots of every transition. Published before effects run, so
    /// observers see `Executing` while the charge is still in flight.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.states.subscribe()
    }

    pub async fn submit(&mut self, draft: PaymentDraft) -> &WorkflowState {
        self.dispatch(WorkflowEvent::SubmitRequested(draft)).await
    }

    /// Authorization callback from the vendor widget.
    pub async fn authorize(&mut self, payer_id: PayerId) -> &WorkflowState {
        self.dispatch(WorkflowEvent::AuthorizationGranted(payer_id))
            .await
    }

    pub async fn confirm(&mut self) -> &WorkflowState {
        self.dispatch(WorkflowEvent::Confirmed).await
    }

    pub async fn decline(&mut self) -> &WorkflowState {
        self.dispatch(WorkflowEvent::Declined).await
    }

    /// User- or widget-initiated cancellation. A no-op while a charge is in
    /// flight or after the workflow terminated.
    pub async fn cancel(&mut self) -> &WorkflowState {
        self.dispatch(WorkflowEvent::CancellationRequested).await
    }

    /// Returns a terminated workflow to `Idle` for a fresh run.
    pub fn reset(&mut self) -> &WorkflowState {
        if self.state.outcome().is_some() {
            self.state = WorkflowState::Idle;
            self.states.send_replace(self.state.clone());
        } else {
            debug!(state = self.state.name(), "reset ignored, workflow still running");
        }
        &self.state
    }

    async fn dispatch(&mut self, event: WorkflowEvent) -> &WorkflowState {
        let mut event = Some(event);
        while let Some(ev) = event.take() {
            let from = self.state.name();
            let Step { state, effect } = std::mem::take(&mut self.state).apply(ev);
            self.state = state;
            if self.state.name() == from && effect.is_none() {
                debug!(state = from, "event ignored");
            } else {
                debug!(from, to = self.state.name(), "workflow transition");
            }
            self.states.send_replace(self.state.clone());
            if let Some(effect) = effect {
                event = Some(self.perform(effect).await);
            }
        }
        &self.state
    }

    async fn perform(&mut self, effect: Effect) -> WorkflowEvent {
        match effect {
            Effect::Validate(draft) => match draft.validate() {
                Ok(validated) => WorkflowEvent::DraftAccepted(validated),
                Err(errors) => WorkflowEvent::DraftRejected(errors),
            },
            Effect::Stage { amount } => {
                info!(%amount, "staging payment");
                let request = StageRequest {
                    cancel_url: self.urls.cancel_url.clone(),
                    redirect_url: self.urls.redirect_url.clone(),
                    amount_usd: amount,
                };
                match self.gateway.stage_payment(request).await {
                    Ok(staged) => {
                        info!(payment = %staged.payment_id, "payment staged");
                        WorkflowEvent::StageAccepted(staged)
                    }
                    Err(e) => {
                        warn!(error = %e, "stage rejected");
                        WorkflowEvent::StageRejected {
                            reason: reason_of(e),
                        }
                    }
                }
            }
            Effect::Charge { amount, ccv } => {
                info!(%amount, "charging card");
                match self.gateway.make_payment(&amount, &ccv).await {
                    Ok(()) => WorkflowEvent::ChargeSucceeded,
                    Err(PaymentError::UnknownOutcome { reason }) => {
                        warn!(%reason, "charge outcome indeterminate");
                        WorkflowEvent::ChargeOutcomeUnknown { reason }
                    }
                    Err(e) => {
                        warn!(error = %e, "charge rejected");
                        WorkflowEvent::ChargeRejected {
                            reason: reason_of(e),
                        }
                    }
                }
            }
            Effect::Execute { payment, amount } => {
                info!(%amount, payment = %payment.payment_id, "executing payment");
                match self.gateway.execute_payment(&payment).await {
                    Ok(()) => WorkflowEvent::ChargeSucceeded,
                    Err(PaymentError::UnknownOutcome { reason }) => {
                        warn!(%reason, "execute outcome indeterminate");
                        WorkflowEvent::ChargeOutcomeUnknown { reason }
                    }
                    Err(e) => {
                        warn!(error = %e, "execute rejected");
                        WorkflowEvent::ChargeRejected {
                            reason: reason_of(e),
                        }
                    }
                }
            }
        }
    }
}

/// The gateway's reason travels verbatim into the terminal outcome.
fn reason_of(error: PaymentError) -> String {
    match error {
        PaymentError::Gateway { reason }
        | PaymentError::UnknownOutcome { reason }
        | PaymentError::Validation { reason, .. } => reason,
        other => other.to_string(),
    }
}
