use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const USER_AGENT: &str = concat!("bid-broker/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment declined: {message}")]
    Declined { message: String },

    #[error("payment provider returned {status} for {endpoint}")]
    Provider {
        endpoint: String,
        status: StatusCode,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingRole {
    Vendor,
    Shopper,
}

// `card` is the opaque blob produced by the external card-capture widget;
// raw card numbers never pass through here.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenizeRequest<'a> {
    card: &'a Value,
    name: &'a str,
    address: &'a str,
}

#[derive(Deserialize)]
struct TokenizeResponse {
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest<'a> {
    payment_method_id: &'a str,
    name: &'a str,
    address: &'a str,
    role: BillingRole,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct PaymentClient {
    client: Client,
    base_url: String,
}

impl PaymentClient {
    pub fn new(base_url: &str) -> Result<Self, PaymentError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn tokenize(
        &self,
        card: &Value,
        name: &str,
        address: &str,
    ) -> Result<String, PaymentError> {
        let response = self
            .client
            .post(format!("{}/payment-methods", self.base_url))
            .json(&TokenizeRequest {
                card,
                name,
                address,
            })
            .send()
            .await?;

        let response = check_status("/payment-methods", response).await?;
        let token: TokenizeResponse = response.json().await?;
        Ok(token.id)
    }

    pub async fn process(
        &self,
        payment_method_id: &str,
        name: &str,
        address: &str,
        role: BillingRole,
    ) -> Result<(), PaymentError> {
        let response = self
            .client
            .post(format!("{}/payment", self.base_url))
            .json(&ProcessRequest {
                payment_method_id,
                name,
                address,
                role,
            })
            .send()
            .await?;

        check_status("/payment", response).await?;
        Ok(())
    }
}

// 4xx responses are provider rejections; their message is what the UI
// shows. Anything else non-2xx is a provider fault.
async fn check_status(endpoint: &str, response: Response) -> Result<Response, PaymentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.is_client_error() {
        let message = response
            .json::<ProviderErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("payment rejected with status {status}"));
        return Err(PaymentError::Declined { message });
    }

    Err(PaymentError::Provider {
        endpoint: endpoint.to_string(),
        status,
    })
}
