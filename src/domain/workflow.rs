use crate::domain::draft::{PaymentDraft, ValidatedDraft};
use crate::domain::payment::{Amount, AuthorizedPayment, PayerId, PaymentMethod, StagedPayment};
use crate::error::PaymentError;

/// The workflow as a value. One instance exists per checkout session; every
/// transition goes through [`WorkflowState::apply`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Validating {
        draft: PaymentDraft,
    },
    Staging {
        amount: Amount,
    },
    AwaitingAuthorization {
        staged: StagedPayment,
        amount: Amount,
    },
    ConfirmPending {
        authorized: AuthorizedPayment,
        amount: Amount,
    },
    Executing {
        amount: Amount,
        method: PaymentMethod,
    },
    Done(WorkflowOutcome),
}

/// Terminal result of one workflow run.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    Success { message: String },
    Cancelled { message: String },
    Failed { errors: Vec<PaymentError> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    SubmitRequested(PaymentDraft),
    DraftAccepted(ValidatedDraft),
    DraftRejected(Vec<PaymentError>),
    StageAccepted(StagedPayment),
    StageRejected { reason: String },
    AuthorizationGranted(PayerId),
    Confirmed,
    Declined,
    CancellationRequested,
    ChargeSucceeded,
    ChargeRejected { reason: String },
    ChargeOutcomeUnknown { reason: String },
}

/// Side effect requested by a transition. `Stage`, `Charge` and `Execute`
/// each correspond to exactly one gateway call; the reducer never emits one
/// of them twice for the same run, which is the double-charge guard.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Validate(PaymentDraft),
    Stage { amount: Amount },
    Charge { amount: Amount, ccv: String },
    Execute { payment: AuthorizedPayment, amount: Amount },
}

#[derive(Debug)]
pub struct Step {
    pub state: WorkflowState,
    pub effect: Option<Effect>,
}

impl Step {
    fn next(state: WorkflowState, effect: Effect) -> Self {
        Self {
            state,
            effect: Some(effect),
        }
    }

    fn stay(state: WorkflowState) -> Self {
        Self {
            state,
            effect: None,
        }
    }

    fn done(outcome: WorkflowOutcome) -> Self {
        Self::stay(WorkflowState::Done(outcome))
    }
}

const CANCELLED_MESSAGE: &str = "Payment cancelled. No charge was made.";

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Validating { .. } => "validating",
            WorkflowState::Staging { .. } => "staging",
            WorkflowState::AwaitingAuthorization { .. } => "awaiting_authorization",
            WorkflowState::ConfirmPending { .. } => "confirm_pending",
            WorkflowState::Executing { .. } => "executing",
            WorkflowState::Done(_) => "done",
        }
    }

    pub fn is_executing(&self) -> bool {
        matches!(self, WorkflowState::Executing { .. })
    }

    pub fn outcome(&self) -> Option<&WorkflowOutcome> {
        match self {
            WorkflowState::Done(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Pure reducer. Events that do not match the current state leave it
    /// unchanged and emit no effect, so a re-entrant submit while a stage or
    /// charge is in flight cannot produce a second network call, and a
    /// confirm before authorization cannot execute.
    pub fn apply(self, event: WorkflowEvent) -> Step {
        use WorkflowEvent as E;
        use WorkflowState as S;

        match (self, event) {
            (S::Idle, E::SubmitRequested(draft)) => Step::next(
                S::Validating {
                    draft: draft.clone(),
                },
                Effect::Validate(draft),
            ),
            (S::Validating { .. }, E::DraftAccepted(validated)) => match validated {
                ValidatedDraft::Card { amount, ccv } => Step::next(
                    S::Executing {
                        amount,
                        method: PaymentMethod::DirectCard,
                    },
                    Effect::Charge { amount, ccv },
                ),
                ValidatedDraft::Vendor { amount } => {
                    Step::next(S::Staging { amount }, Effect::Stage { amount })
                }
            },
            (S::Validating { .. }, E::DraftRejected(errors)) => {
                Step::done(WorkflowOutcome::Failed { errors })
            }
            (S::Staging { amount }, E::StageAccepted(staged)) => {
                Step::stay(S::AwaitingAuthorization { staged, amount })
            }
            (S::Staging { .. }, E::StageRejected { reason }) => Step::done(WorkflowOutcome::Failed {
                errors: vec![PaymentError::gateway(reason)],
            }),
            // Authorization alone never executes; the confirmation gate is
            // always interposed.
            (S::AwaitingAuthorization { staged, amount }, E::AuthorizationGranted(payer_id)) => {
                Step::stay(S::ConfirmPending {
                    authorized: staged.authorized(payer_id),
                    amount,
                })
            }
            (S::ConfirmPending { authorized, amount }, E::Confirmed) => Step::next(
                S::Executing {
                    amount,
                    method: PaymentMethod::VendorRedirect,
                },
                Effect::Execute {
                    payment: authorized,
                    amount,
                },
            ),
            (S::ConfirmPending { .. }, E::Declined) => Step::done(WorkflowOutcome::Cancelled {
                message: CANCELLED_MESSAGE.to_string(),
            }),
            (S::Executing { amount, .. }, E::ChargeSucceeded) => {
                Step::done(WorkflowOutcome::Success {
                    message: format!("Payment of ${amount} completed."),
                })
            }
            // Execution failures never return to the confirmation gate; a
            // retry starts over from idle.
            (S::Executing { .. }, E::ChargeRejected { reason }) => {
                Step::done(WorkflowOutcome::Failed {
                    errors: vec![PaymentError::gateway(reason)],
                })
            }
            (S::Executing { .. }, E::ChargeOutcomeUnknown { reason }) => {
                Step::done(WorkflowOutcome::Failed {
                    errors: vec![PaymentError::unknown_outcome(reason)],
                })
            }
            // An in-flight charge cannot be recalled; a terminal state stays
            // terminal. All earlier states cancel without a charge, whether
            // the request came from the user or the widget's abandoned
            // redirect.
            (state @ (S::Executing { .. } | S::Done(_)), E::CancellationRequested) => {
                Step::stay(state)
            }
            (_, E::CancellationRequested) => Step::done(WorkflowOutcome::Cancelled {
                message: CANCELLED_MESSAGE.to_string(),
            }),
            (state, _) => Step::stay(state),
        }
    }
}
