use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::job::JobCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    pub job_id: String,
    pub shop_id: String,
    pub shop_name: String,
    pub category: JobCategory,
    pub description: String,
    pub vendor_id: String,
    pub payment: f64,
    pub deadline: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBid {
    pub job_id: String,
    pub shop_id: String,
    pub shop_name: String,
    pub category: JobCategory,
    pub description: String,
    pub date: DateTime<Utc>,
    pub vendor_id: String,
    pub payment: f64,
    pub deadline: String,
}

// Bids written before the store normalized timestamps carry
// `{seconds, nanoseconds}` instead of an RFC 3339 string.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Rfc3339(String),
        Epoch { seconds: i64, nanoseconds: u32 },
    }

    match Wire::deserialize(deserializer)? {
        Wire::Rfc3339(raw) => raw
            .parse::<DateTime<Utc>>()
            .map_err(|err| serde::de::Error::custom(format!("invalid bid date {raw:?}: {err}"))),
        Wire::Epoch {
            seconds,
            nanoseconds,
        } => DateTime::from_timestamp(seconds, nanoseconds)
            .ok_or_else(|| serde::de::Error::custom("bid date out of range")),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use serde_json::json;

    use super::Bid;
    use crate::models::job::JobCategory;

    fn wire_bid(date: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "job-7",
            "jobId": "job-7",
            "shopId": "shop-2",
            "shopName": "Karz",
            "category": "Bedliners",
            "description": "spray-in liner",
            "vendorId": "v1",
            "payment": 450.0,
            "deadline": "2026-09-01",
            "date": date
        })
    }

    #[test]
    fn decodes_rfc3339_timestamp() {
        let bid: Bid = serde_json::from_value(wire_bid(json!("2026-08-20T10:30:00Z"))).unwrap();

        assert_eq!(bid.category, JobCategory::Bedliners);
        assert_eq!(
            bid.date,
            "2026-08-20T10:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn decodes_legacy_epoch_timestamp() {
        let bid: Bid = serde_json::from_value(wire_bid(json!({
            "seconds": 1_755_600_000_i64,
            "nanoseconds": 0
        })))
        .unwrap();

        assert_eq!(bid.date.timestamp(), 1_755_600_000);
    }

    #[test]
    fn reencodes_as_rfc3339() {
        let bid: Bid = serde_json::from_value(wire_bid(json!({
            "seconds": 1_755_600_000_i64,
            "nanoseconds": 0
        })))
        .unwrap();

        let encoded = serde_json::to_value(&bid).unwrap();
        assert!(encoded["date"].is_string());
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let result = serde_json::from_value::<Bid>(wire_bid(json!("last tuesday")));
        assert!(result.is_err());
    }
}
