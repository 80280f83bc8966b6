use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use payflow::application::confirmation::{ConfirmationPrompt, Decision};
use payflow::application::session;
use payflow::domain::draft::PaymentDraft;
use payflow::domain::payment::PaymentMethod;
use payflow::domain::ports::{
    AuthorizationOutcome, CheckoutWidgetBox, PaymentGatewayBox, ReturnUrls,
};
use payflow::domain::workflow::{WorkflowOutcome, WorkflowState};
use payflow::infrastructure::http::{GatewaySettings, HttpPaymentGateway};
use payflow::infrastructure::sandbox::{SandboxGateway, SandboxWidget};
use payflow::interfaces::console::ConsoleDialog;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Amount in USD
    #[arg(long)]
    amount: String,

    /// Payment method
    #[arg(long, value_enum, default_value = "card")]
    method: MethodArg,

    /// Card verification code (card payments only)
    #[arg(long, default_value = "")]
    ccv: String,

    /// Gateway base URL. Omit to run against the in-process sandbox.
    #[arg(long)]
    gateway_url: Option<String>,

    /// Where the vendor sends the browser on cancellation
    #[arg(long, default_value = "https://console.example.com/billing/cancel")]
    cancel_url: String,

    /// Where the vendor sends the browser after authorization
    #[arg(long, default_value = "https://console.example.com/billing/return")]
    redirect_url: String,

    /// Answer the confirmation prompt with yes
    #[arg(long)]
    assume_yes: bool,

    /// Abandon the vendor redirect instead of authorizing (sandbox widget)
    #[arg(long)]
    abandon_checkout: bool,
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum MethodArg {
    Card,
    Paypal,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let method = match cli.method {
        MethodArg::Card => PaymentMethod::DirectCard,
        MethodArg::Paypal => PaymentMethod::VendorRedirect,
    };
    let mut draft = PaymentDraft::new(method);
    draft.set_amount(&cli.amount);
    draft.set_ccv(&cli.ccv);
    if let Some(hint) = draft.vendor_minimum_hint() {
        eprintln!("note: {hint}");
    }

    let gateway: PaymentGatewayBox = match &cli.gateway_url {
        Some(url) => {
            Box::new(HttpPaymentGateway::new(GatewaySettings::new(url.clone())).into_diagnostic()?)
        }
        None => Box::new(SandboxGateway::new()),
    };
    // The vendor widget is resolved once here and injected.
    let widget: CheckoutWidgetBox = if cli.abandon_checkout {
        Box::new(SandboxWidget::abandoning())
    } else {
        Box::new(SandboxWidget::new())
    };

    let handle = session::spawn(
        gateway,
        ReturnUrls {
            cancel_url: cli.cancel_url,
            redirect_url: cli.redirect_url,
        },
    );

    let mut state = handle.submit(draft.clone()).await.into_diagnostic()?;

    let staged = match &state {
        WorkflowState::AwaitingAuthorization { staged, .. } => Some(staged.clone()),
        _ => None,
    };
    if let Some(staged) = staged {
        let hooks = handle.hooks();
        state = match widget
            .request_authorization(&staged)
            .await
            .into_diagnostic()?
        {
            AuthorizationOutcome::Authorized(payer_id) => {
                hooks.authorize(payer_id).await.into_diagnostic()?
            }
            AuthorizationOutcome::Cancelled => hooks.cancel().await.into_diagnostic()?,
        };
    }

    if let Some(prompt) = ConfirmationPrompt::for_state(&state) {
        let dialog = ConsoleDialog::new(cli.assume_yes);
        state = match dialog.decide(&prompt).into_diagnostic()? {
            Decision::Confirmed => handle.confirm().await.into_diagnostic()?,
            Decision::Declined => handle.decline().await.into_diagnostic()?,
        };
    }

    match state.outcome() {
        Some(WorkflowOutcome::Success { message }) => {
            draft.clear_amount();
            println!("{message}");
            Ok(())
        }
        Some(WorkflowOutcome::Cancelled { message }) => {
            println!("{message}");
            Ok(())
        }
        Some(WorkflowOutcome::Failed { errors }) => {
            for error in errors {
                eprintln!("error: {error}");
            }
            Err(miette!("payment failed"))
        }
        None => Err(miette!(
            "workflow suspended unexpectedly in state {}",
            state.name()
        )),
    }
}
