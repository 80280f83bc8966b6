use crate::domain::payment::{Amount, AuthorizedPayment, PayerId, PaymentId, StagedPayment};
use crate::domain::ports::{PaymentGateway, StageRequest};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const GENERIC_REASON: &str = "The payment gateway rejected the request.";

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl GatewaySettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: 15_000,
        }
    }
}

/// JSON/HTTP adapter for the remote payment gateway.
///
/// Transport failures on the two charge-bearing calls (`execute`, `charge`)
/// map to `UnknownOutcome`: the request may have been processed even though
/// no response arrived. A failed stage never charges, so it maps to a plain
/// gateway error.
pub struct HttpPaymentGateway {
    http: reqwest::Client,
    settings: GatewaySettings,
}

impl HttpPaymentGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self> {
        let timeout = Duration::from_millis(if settings.timeout_ms > 0 {
            settings.timeout_ms
        } else {
            15_000
        });
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentError::gateway(format!("failed to build http client: {e}")))?;
        Ok(Self { http, settings })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.settings.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StageBody<'a> {
    cancel_url: &'a str,
    redirect_url: &'a str,
    amount_usd: Amount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StageReply {
    payment_id: PaymentId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteBody<'a> {
    payment_id: &'a PaymentId,
    payer_id: &'a PayerId,
}

#[derive(Serialize)]
struct ChargeBody<'a> {
    usd: Amount,
    ccv: &'a str,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<GatewayFault>,
}

#[derive(Deserialize)]
struct GatewayFault {
    #[serde(default)]
    #[allow(dead_code)]
    field: Option<String>,
    reason: String,
}

/// Extracts the gateway's literal `reason` strings, falling back to a
/// generic message when the body carries nothing structured.
fn rejection_reason(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed
            .errors
            .iter()
            .map(|fault| fault.reason.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ => GENERIC_REASON.to_string(),
    }
}

async fn settle(response: reqwest::Response) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(%status, "gateway rejected request");
    Err(PaymentError::gateway(rejection_reason(&body)))
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn stage_payment(&self, request: StageRequest) -> Result<StagedPayment> {
        let body = StageBody {
            cancel_url: &request.cancel_url,
            redirect_url: &request.redirect_url,
            amount_usd: request.amount_usd,
        };
        let response = self
            .http
            .post(self.endpoint("payments/stage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::gateway(format!("gateway unreachable: {e}")))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::gateway(rejection_reason(&body)));
        }
        let reply: StageReply = response
            .json()
            .await
            .map_err(|_| PaymentError::gateway(GENERIC_REASON))?;
        Ok(StagedPayment {
            payment_id: reply.payment_id,
        })
    }

    async fn execute_payment(&self, payment: &AuthorizedPayment) -> Result<()> {
        let body = ExecuteBody {
            payment_id: &payment.payment_id,
            payer_id: &payment.payer_id,
        };
        let response = self
            .http
            .post(self.endpoint("payments/execute"))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                PaymentError::unknown_outcome(format!(
                    "no response from the gateway after the charge was sent: {e}"
                ))
            })?;
        settle(response).await
    }

    async fn make_payment(&self, amount: &Amount, ccv: &str) -> Result<()> {
        let body = ChargeBody { usd: *amount, ccv };
        let response = self
            .http
            .post(self.endpoint("payments/charge"))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                PaymentError::unknown_outcome(format!(
                    "no response from the gateway after the charge was sent: {e}"
                ))
            })?;
        settle(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stage_body_wire_shape() {
        let body = StageBody {
            cancel_url: "https://console.test/cancel",
            redirect_url: "https://console.test/return",
            amount_usd: Amount::parse("3").unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "cancelUrl": "https://console.test/cancel",
                "redirectUrl": "https://console.test/return",
                "amountUsd": "3.00",
            })
        );
    }

    #[test]
    fn test_charge_body_wire_shape() {
        let body = ChargeBody {
            usd: Amount::parse("10.00").unwrap(),
            ccv: "123",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"usd": "10.00", "ccv": "123"})
        );
    }

    #[test]
    fn test_execute_body_wire_shape() {
        let body = ExecuteBody {
            payment_id: &PaymentId("PAY-1".into()),
            payer_id: &PayerId("PAYER-9".into()),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"paymentId": "PAY-1", "payerId": "PAYER-9"})
        );
    }

    #[test]
    fn test_stage_reply_parses() {
        let reply: StageReply = serde_json::from_str(r#"{"paymentId": "PAY-4XL"}"#).unwrap();
        assert_eq!(reply.payment_id, PaymentId("PAY-4XL".into()));
    }

    #[test]
    fn test_rejection_reason_is_literal() {
        let body = r#"{"errors": [{"reason": "Amount must be at least 5.00 USD."}]}"#;
        assert_eq!(rejection_reason(body), "Amount must be at least 5.00 USD.");
    }

    #[test]
    fn test_rejection_reasons_joined() {
        let body = r#"{"errors": [
            {"field": "amountUsd", "reason": "Too small"},
            {"reason": "Account on hold"}
        ]}"#;
        assert_eq!(rejection_reason(body), "Too small; Account on hold");
    }

    #[test]
    fn test_unstructured_rejection_falls_back_to_generic() {
        assert_eq!(rejection_reason("<html>502</html>"), GENERIC_REASON);
        assert_eq!(rejection_reason(""), GENERIC_REASON);
        assert_eq!(rejection_reason(r#"{"errors": []}"#), GENERIC_REASON);
    }
}
