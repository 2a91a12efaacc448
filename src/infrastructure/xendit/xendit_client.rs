use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::error;

use crate::domain::{
    repositories::payment_gateway::{GatewayError, XenditGateway},
    value_objects::invoices::{CreateInvoiceParams, XenditInvoice},
};

/// Minimal Xendit invoice client built on reqwest.
pub struct XenditClient {
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct XenditErrorEnvelope {
    error_code: Option<String>,
    message: Option<String>,
}

impl XenditClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { http })
    }

    /// Xendit API keys authenticate as HTTP Basic with the key as username
    /// and an empty password. Recomputed per request; credentials rotate with
    /// the active provider record.
    fn basic_auth_header(secret_key: &str) -> String {
        format!("Basic {}", BASE64.encode(format!("{secret_key}:")))
    }

    fn classify_status(status: u16, message: String) -> GatewayError {
        match status {
            401 => GatewayError::Auth,
            403 => GatewayError::Forbidden,
            404 => GatewayError::NotFound,
            429 => GatewayError::RateLimited,
            500..=599 => GatewayError::Upstream(status),
            _ => GatewayError::Api { status, message },
        }
    }

    async fn ensure_success(
        resp: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, GatewayError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (xendit_error_code, xendit_error_message) =
            match serde_json::from_str::<XenditErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.error_code, envelope.message),
                Err(_) => (None, None),
            };

        error!(
            status = %status,
            xendit_error_code = ?xendit_error_code,
            xendit_error_message = ?xendit_error_message,
            response_body = %body,
            context = %context,
            "xendit api request failed"
        );

        let message = xendit_error_message.unwrap_or(body);
        Err(Self::classify_status(status.as_u16(), message))
    }

    fn transport_error(err: reqwest::Error, context: &str) -> GatewayError {
        error!(error = %err, context = %context, "xendit request transport failure");
        GatewayError::Transport(err.to_string())
    }
}

#[async_trait]
impl XenditGateway for XenditClient {
    async fn create_invoice(
        &self,
        secret_key: &str,
        base_url: &str,
        params: CreateInvoiceParams,
    ) -> Result<XenditInvoice, GatewayError> {
        if params.amount <= 0 {
            return Err(GatewayError::InvalidArgument(
                "amount must be a positive number".to_string(),
            ));
        }

        // https://developers.xendit.co/api-reference/#create-invoice
        let url = format!("{}/v2/invoices", base_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, Self::basic_auth_header(secret_key))
            .json(&params)
            .send()
            .await
            .map_err(|err| Self::transport_error(err, "create invoice"))?;
        let resp = Self::ensure_success(resp, "create invoice").await?;

        let invoice: XenditInvoice = resp
            .json()
            .await
            .map_err(|err| Self::transport_error(err, "create invoice (decode)"))?;

        Ok(invoice)
    }

    async fn get_invoice(
        &self,
        secret_key: &str,
        base_url: &str,
        invoice_id: Option<String>,
        external_id: Option<String>,
    ) -> Result<XenditInvoice, GatewayError> {
        let base = base_url.trim_end_matches('/');

        match (invoice_id, external_id) {
            (Some(invoice_id), None) => {
                // https://developers.xendit.co/api-reference/#get-invoice
                let url = format!("{base}/v2/invoices/{invoice_id}");
                let resp = self
                    .http
                    .get(url)
                    .header(AUTHORIZATION, Self::basic_auth_header(secret_key))
                    .send()
                    .await
                    .map_err(|err| Self::transport_error(err, "get invoice"))?;
                let resp = Self::ensure_success(resp, "get invoice").await?;

                resp.json()
                    .await
                    .map_err(|err| Self::transport_error(err, "get invoice (decode)"))
            }
            (None, Some(external_id)) => {
                // The list endpoint is the only lookup keyed by external_id.
                let url = format!("{base}/v2/invoices");
                let resp = self
                    .http
                    .get(url)
                    .query(&[("external_id", external_id)])
                    .header(AUTHORIZATION, Self::basic_auth_header(secret_key))
                    .send()
                    .await
                    .map_err(|err| Self::transport_error(err, "get invoice by external_id"))?;
                let resp = Self::ensure_success(resp, "get invoice by external_id").await?;

                let invoices: Vec<XenditInvoice> = resp.json().await.map_err(|err| {
                    Self::transport_error(err, "get invoice by external_id (decode)")
                })?;

                invoices.into_iter().next().ok_or(GatewayError::NotFound)
            }
            _ => Err(GatewayError::InvalidArgument(
                "exactly one of invoice_id or external_id is required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_auth_failures() {
        assert!(matches!(
            XenditClient::classify_status(401, "bad key".into()),
            GatewayError::Auth
        ));
        assert!(matches!(
            XenditClient::classify_status(403, "no access".into()),
            GatewayError::Forbidden
        ));
    }

    #[test]
    fn classifies_rate_limit_and_upstream() {
        assert!(matches!(
            XenditClient::classify_status(429, "slow down".into()),
            GatewayError::RateLimited
        ));
        assert!(matches!(
            XenditClient::classify_status(503, "maintenance".into()),
            GatewayError::Upstream(503)
        ));
    }

    #[test]
    fn other_client_errors_keep_status_and_message() {
        match XenditClient::classify_status(422, "DUPLICATE_ERROR".into()) {
            GatewayError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "DUPLICATE_ERROR");
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn basic_auth_header_has_empty_password() {
        let header = XenditClient::basic_auth_header("xnd_development_abc");
        let encoded = header.strip_prefix("Basic ").unwrap();
        let decoded = BASE64.decode(encoded).unwrap();
        assert_eq!(decoded, b"xnd_development_abc:");
    }
}
