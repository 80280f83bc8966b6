use crate::application::controller::PaymentWorkflow;
use crate::domain::draft::PaymentDraft;
use crate::domain::payment::PayerId;
use crate::domain::ports::{PaymentGatewayBox, ReturnUrls};
use crate::domain::workflow::WorkflowState;
use crate::error::{PaymentError, Result};
use tokio::sync::{mpsc, oneshot, watch};

enum Command {
    Submit(PaymentDraft, oneshot::Sender<WorkflowState>),
    Authorize(PayerId, oneshot::Sender<WorkflowState>),
    Confirm(oneshot::Sender<WorkflowState>),
    Decline(oneshot::Sender<WorkflowState>),
    Cancel(oneshot::Sender<WorkflowState>),
    Reset(oneshot::Sender<WorkflowState>),
}

/// Spawns a workflow onto its own task, fed by a command channel.
///
/// Commands are processed strictly one at a time; anything sent while a
/// stage or charge is in flight queues behind it and is then judged against
/// the post-call state, so a queued duplicate submit drains as a no-op
/// instead of a second network call.
pub fn spawn(gateway: PaymentGatewayBox, urls: ReturnUrls) -> WorkflowHandle {
    let mut workflow = PaymentWorkflow::new(gateway, urls);
    let states = workflow.subscribe();
    let (commands, mut inbox) = mpsc::channel::<Command>(16);

    tokio::spawn(async move {
        while let Some(command) = inbox.recv().await {
            match command {
                Command::Submit(draft, reply) => {
                    let state = workflow.submit(draft).await.clone();
                    let _ = reply.send(state);
                }
                Command::Authorize(payer_id, reply) => {
                    let state = workflow.authorize(payer_id).await.clone();
                    let _ = reply.send(state);
                }
                Command::Confirm(reply) => {
                    let state = workflow.confirm().await.clone();
                    let _ = reply.send(state);
                }
                Command::Decline(reply) => {
                    let state = workflow.decline().await.clone();
                    let _ = reply.send(state);
                }
                Command::Cancel(reply) => {
                    let state = workflow.cancel().await.clone();
                    let _ = reply.send(state);
                }
                Command::Reset(reply) => {
                    let _ = reply.send(workflow.reset().clone());
                }
            }
        }
    });

    WorkflowHandle { commands, states }
}

/// Clonable handle onto a spawned workflow.
#[derive(Clone)]
pub struct WorkflowHandle {
    commands: mpsc::Sender<Command>,
    states: watch::Receiver<WorkflowState>,
}

impl WorkflowHandle {
    /// Latest published state, including mid-call `Staging`/`Executing`.
    pub fn current_state(&self) -> WorkflowState {
        self.states.borrow().clone()
    }

    pub async fn submit(&self, draft: PaymentDraft) -> Result<WorkflowState> {
        self.request(|reply| Command::Submit(draft, reply)).await
    }

    pub async fn authorize(&self, payer_id: PayerId) -> Result<WorkflowState> {
        self.request(|reply| Command::Authorize(payer_id, reply))
            .await
    }

    pub async fn confirm(&self) -> Result<WorkflowState> {
        self.request(Command::Confirm).await
    }

    pub async fn decline(&self) -> Result<WorkflowState> {
        self.request(Command::Decline).await
    }

    /// Cancels if no charge has been sent. Once the published state is
    /// `Executing` the request is already on the wire, so this fails with
    /// `UnknownOutcome` instead of pretending the payment was stopped.
    pub async fn cancel(&self) -> Result<WorkflowState> {
        if self.current_state().is_executing() {
            return Err(PaymentError::unknown_outcome(
                "a charge is already in flight; check your billing history before retrying",
            ));
        }
        self.request(Command::Cancel).await
    }

    pub async fn reset(&self) -> Result<WorkflowState> {
        self.request(Command::Reset).await
    }

    /// The narrow capability pair handed to the vendor widget glue.
    pub fn hooks(&self) -> AuthorizationHooks {
        AuthorizationHooks {
            handle: self.clone(),
        }
    }

    async fn request(
        &self,
        make: impl FnOnce(oneshot::Sender<WorkflowState>) -> Command,
    ) -> Result<WorkflowState> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| PaymentError::WorkflowClosed)?;
        response.await.map_err(|_| PaymentError::WorkflowClosed)
    }
}

/// What the checkout SDK integration is allowed to do: deliver an
/// authorization or report a cancellation. Nothing else of the workflow is
/// reachable from the widget.
pub struct AuthorizationHooks {
    handle: WorkflowHandle,
}

impl AuthorizationHooks {
    pub async fn authorize(&self, payer_id: PayerId) -> Result<WorkflowState> {
        self.handle.authorize(payer_id).await
    }

    pub async fn cancel(&self) -> Result<WorkflowState> {
        self.handle.cancel().await
    }
}
