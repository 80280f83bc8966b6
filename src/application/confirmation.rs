use crate::domain::payment::{Amount, PaymentMethod};
use crate::domain::workflow::WorkflowState;

/// What the confirmation dialog shows. Derived from the workflow state, so
/// the dialog is open exactly while the workflow sits in `ConfirmPending`
/// and holds no state of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationPrompt {
    pub amount: Amount,
    pub method_label: &'static str,
}

impl ConfirmationPrompt {
    pub fn for_state(state: &WorkflowState) -> Option<Self> {
        match state {
            WorkflowState::ConfirmPending { amount, .. } => Some(Self {
                amount: *amount,
                method_label: PaymentMethod::VendorRedirect.label(),
            }),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        format!("Pay ${} via {}?", self.amount, self.method_label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Declined,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{PayerId, PaymentId, StagedPayment};

    #[test]
    fn test_prompt_open_only_while_confirm_pending() {
        let staged = StagedPayment {
            payment_id: PaymentId("PAY-1".into()),
        };
        let amount = Amount::parse("10.00").unwrap();
        let state = WorkflowState::ConfirmPending {
            authorized: staged.authorized(PayerId("PAYER-1".into())),
            amount,
        };

        let prompt = ConfirmationPrompt::for_state(&state).unwrap();
        assert_eq!(prompt.message(), "Pay $10.00 via PayPal?");

        assert_eq!(ConfirmationPrompt::for_state(&WorkflowState::Idle), None);
        assert_eq!(
            ConfirmationPrompt::for_state(&WorkflowState::Staging { amount }),
            None
        );
    }
}
