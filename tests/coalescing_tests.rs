mod common;

use common::{GatedGateway, urls};
use payflow::application::session::{self, WorkflowHandle};
use payflow::domain::draft::PaymentDraft;
use payflow::domain::payment::{PayerId, PaymentMethod};
use payflow::domain::workflow::{WorkflowOutcome, WorkflowState};

fn vendor_draft(amount: &str) -> PaymentDraft {
    let mut draft = PaymentDraft::new(PaymentMethod::VendorRedirect);
    draft.set_amount(amount);
    draft
}

fn submit_in_background(
    handle: &WorkflowHandle,
    draft: PaymentDraft,
) -> tokio::task::JoinHandle<WorkflowState> {
    let handle = handle.clone();
    tokio::spawn(async move { handle.submit(draft).await.unwrap() })
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    while !condition() {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_duplicate_submit_while_staging_sends_one_request() {
    let gateway = GatedGateway::new();
    let handle = session::spawn(Box::new(gateway.clone()), urls());

    let first = submit_in_background(&handle, vendor_draft("10.00"));
    wait_until(|| gateway.stage_calls() == 1).await;
    assert!(matches!(
        handle.current_state(),
        WorkflowState::Staging { .. }
    ));

    // Queued behind the in-flight stage; judged against the post-call state.
    let second = submit_in_background(&handle, vendor_draft("20.00"));
    gateway.release(1);

    let first = first.await.unwrap();
    let second = second.await.unwrap();
    assert!(matches!(first, WorkflowState::AwaitingAuthorization { .. }));
    assert!(matches!(second, WorkflowState::AwaitingAuthorization { .. }));
    assert_eq!(gateway.stage_calls(), 1, "duplicate submit must coalesce");
}

#[tokio::test]
async fn test_duplicate_confirm_while_executing_sends_one_execute() {
    let gateway = GatedGateway::new();
    let handle = session::spawn(Box::new(gateway.clone()), urls());

    gateway.release(1);
    handle.submit(vendor_draft("10.00")).await.unwrap();
    handle.authorize(PayerId("PAYER-1".into())).await.unwrap();

    let first = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.confirm().await.unwrap() })
    };
    wait_until(|| gateway.execute_calls() == 1).await;
    assert!(handle.current_state().is_executing());

    let second = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.confirm().await.unwrap() })
    };
    gateway.release(1);

    let first = first.await.unwrap();
    let second = second.await.unwrap();
    assert!(matches!(
        first.outcome(),
        Some(WorkflowOutcome::Success { .. })
    ));
    assert!(second.outcome().is_some());
    assert_eq!(gateway.execute_calls(), 1, "duplicate confirm must coalesce");
}
