use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::bid::{Bid, NewBid};
use crate::models::job::Job;
use crate::models::pending::{NewPendingJob, PendingJob};
use crate::models::vendor::VendorPreferences;

const USER_AGENT: &str = concat!("bid-broker/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned {status} for {endpoint}")]
    Status {
        endpoint: String,
        status: StatusCode,
    },
}

#[derive(Clone)]
pub struct MarketStore {
    client: Client,
    base_url: String,
}

impl MarketStore {
    // Requests deliberately carry no timeout; the transport's defaults apply.
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_open_jobs(&self) -> Result<Vec<Job>, StoreError> {
        self.get_json("/jobs/all").await
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<(), StoreError> {
        self.delete_unit(&format!("/jobs/delete/{job_id}")).await
    }

    pub async fn submit_bid(&self, bid: &NewBid) -> Result<Bid, StoreError> {
        self.post_json("/vendor/submit-bid", bid).await
    }

    pub async fn fetch_vendor_bids(&self, vendor_id: &str) -> Result<Vec<Bid>, StoreError> {
        let envelope: BidsEnvelope = self.get_json(&format!("/bids/vendor/{vendor_id}")).await?;
        Ok(envelope.bids)
    }

    pub async fn fetch_shop_bids(&self, shop_id: &str) -> Result<Vec<Bid>, StoreError> {
        let envelope: BidsEnvelope = self.get_json(&format!("/bids/shop/{shop_id}")).await?;
        Ok(envelope.bids)
    }

    pub async fn add_vendor_pending(&self, pending: &NewPendingJob) -> Result<(), StoreError> {
        self.post_unit("/vendor-pending/add", pending).await
    }

    pub async fn add_shop_pending(&self, pending: &NewPendingJob) -> Result<(), StoreError> {
        self.post_unit("/shop-pending/add", pending).await
    }

    pub async fn delete_submitted_bid(&self, bid_id: &str) -> Result<(), StoreError> {
        self.delete_unit(&format!("/vendor-submitted-bids/{bid_id}"))
            .await
    }

    pub async fn fetch_vendor_pending(&self, vendor_id: &str) -> Result<Vec<PendingJob>, StoreError> {
        self.get_json(&format!("/vendor-pending/{vendor_id}")).await
    }

    pub async fn delete_vendor_pending(&self, pending_id: &str) -> Result<(), StoreError> {
        self.delete_unit(&format!("/vendor-pending/delete/{pending_id}"))
            .await
    }

    pub async fn add_vendor_completed(&self, completed: &NewPendingJob) -> Result<(), StoreError> {
        self.post_unit("/vendor-completed/add", completed).await
    }

    pub async fn fetch_preferences(&self, vendor_id: &str) -> Result<VendorPreferences, StoreError> {
        self.get_json(&format!("/vendors/preferences/{vendor_id}"))
            .await
    }

    pub async fn save_preferences(&self, preferences: &VendorPreferences) -> Result<(), StoreError> {
        self.post_unit("/vendors/preferences", preferences).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await?;

        Ok(check_status(path, response)?.json().await?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        Ok(check_status(path, response)?.json().await?)
    }

    async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), StoreError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        check_status(path, response)?;
        Ok(())
    }

    async fn delete_unit(&self, path: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(format!("{}{path}", self.base_url))
            .send()
            .await?;

        check_status(path, response)?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct BidsEnvelope {
    bids: Vec<Bid>,
}

fn check_status(path: &str, response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(StoreError::Status {
            endpoint: path.to_string(),
            status,
        })
    }
}
