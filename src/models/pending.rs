use serde::{Deserialize, Serialize};

use crate::models::job::JobCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingJob {
    pub id: String,
    pub job_id: String,
    pub category: JobCategory,
    pub description: String,
    // Older records use the all-lowercase key.
    #[serde(alias = "vendorid")]
    pub vendor_id: String,
    pub shop_id: String,
    pub payment: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPendingJob {
    pub job_id: String,
    pub category: JobCategory,
    pub description: String,
    pub vendor_id: String,
    pub shop_id: String,
    pub payment: f64,
}

impl NewPendingJob {
    pub fn from_accepted_bid(bid: &crate::models::bid::Bid) -> Self {
        Self {
            job_id: bid.id.clone(),
            category: bid.category,
            description: bid.description.clone(),
            vendor_id: bid.vendor_id.clone(),
            shop_id: bid.shop_id.clone(),
            payment: bid.payment,
        }
    }

    pub fn completed_from(pending: &PendingJob) -> Self {
        Self {
            job_id: pending.job_id.clone(),
            category: pending.category,
            description: pending.description.clone(),
            vendor_id: pending.vendor_id.clone(),
            shop_id: pending.shop_id.clone(),
            payment: pending.payment,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{NewPendingJob, PendingJob};
    use crate::models::bid::Bid;
    use crate::models::job::JobCategory;

    #[test]
    fn decodes_legacy_vendorid_key() {
        let pending: PendingJob = serde_json::from_value(json!({
            "id": "pending-3",
            "jobId": "job-7",
            "category": "Window Tinting",
            "description": "rear windows",
            "vendorid": "v1",
            "shopId": "shop-2",
            "payment": 120.0
        }))
        .unwrap();

        assert_eq!(pending.vendor_id, "v1");
        assert_eq!(pending.category, JobCategory::WindowTinting);
    }

    #[test]
    fn accepted_bid_keeps_bid_id_as_job_id() {
        let bid: Bid = serde_json::from_value(json!({
            "id": "job-7",
            "jobId": "job-7",
            "shopId": "shop-2",
            "shopName": "Karz",
            "category": "Bedliners",
            "description": "spray-in liner",
            "vendorId": "v1",
            "payment": 450.0,
            "deadline": "2026-09-01",
            "date": "2026-08-20T10:30:00Z"
        }))
        .unwrap();

        let pending = NewPendingJob::from_accepted_bid(&bid);
        assert_eq!(pending.job_id, "job-7");
        assert_eq!(pending.vendor_id, "v1");
        assert_eq!(pending.payment, 450.0);
    }
}
