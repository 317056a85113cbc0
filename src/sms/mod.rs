//! SMS dispatch
//!
//! Sends text messages through an HTTP-invoked SMS function. Requests are
//! wrapped as `{ "body": "<json>" }` and the function answers with
//! `{ "statusCode": .., "body": "<json>" }`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

use crate::config::SmsConfig;
use crate::error::SmsError;

pub const INVOCATION_TYPE_HEADER: &str = "X-Amz-Invocation-Type";
pub const FUNCTION_ERROR_HEADER: &str = "X-Amz-Function-Error";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SmsReceipt {
    pub phone_number: String,
    pub message: String,
}

#[async_trait]
pub trait SmsDispatcher: Send + Sync {
    /// Sends and waits for the function's verdict.
    async fn send(&self, phone_number: &str, message: &str) -> Result<SmsReceipt, SmsError>;

    /// Queues the message and returns once the function accepted the invocation.
    async fn send_detached(&self, phone_number: &str, message: &str) -> Result<(), SmsError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvocationResult {
    status_code: u16,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FunctionErrorBody {
    error: Option<String>,
}

#[derive(Clone)]
pub struct HttpSmsGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSmsGateway {
    pub fn new(config: &SmsConfig) -> Result<Self, SmsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    async fn invoke(
        &self,
        invocation_type: &str,
        phone_number: &str,
        message: &str,
    ) -> Result<reqwest::Response, SmsError> {
        let payload = json!({
            "body": json!({ "phoneNumber": phone_number, "message": message }).to_string(),
        });

        let res = self
            .client
            .post(&self.endpoint)
            .header(INVOCATION_TYPE_HEADER, invocation_type)
            .json(&payload)
            .send()
            .await?;

        if res.headers().contains_key(FUNCTION_ERROR_HEADER) {
            let detail = res.text().await.unwrap_or_default();
            return Err(SmsError::FunctionError(detail));
        }
        if !res.status().is_success() {
            return Err(SmsError::Rejected(format!(
                "SMS function returned status {}",
                res.status()
            )));
        }
        Ok(res)
    }
}

#[async_trait]
impl SmsDispatcher for HttpSmsGateway {
    async fn send(&self, phone_number: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        let res = self.invoke("RequestResponse", phone_number, message).await.map_err(|e| {
            error!(error = %e, "SMS sending failed");
            e
        })?;

        let result: InvocationResult = res.json().await?;
        let body = result.body.unwrap_or_default();

        if result.status_code != 200 {
            let reason = serde_json::from_str::<FunctionErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| format!("SMS function returned status {}", result.status_code));
            error!(status = result.status_code, reason = %reason, "SMS rejected");
            return Err(SmsError::Rejected(reason));
        }

        let receipt: SmsReceipt = serde_json::from_str(&body)
            .map_err(|e| SmsError::MalformedResponse(e.to_string()))?;
        info!("SMS sent");
        Ok(receipt)
    }

    async fn send_detached(&self, phone_number: &str, message: &str) -> Result<(), SmsError> {
        self.invoke("Event", phone_number, message).await.map_err(|e| {
            error!(error = %e, "SMS dispatch failed");
            e
        })?;
        Ok(())
    }
}
