use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::job::JobCategory;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Text,
    Email,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPreferences {
    pub vendor_id: String,
    #[serde(default, deserialize_with = "deserialize_notif_pref")]
    pub notif_pref: Option<NotificationChannel>,
    pub job_type_pref: HashSet<JobCategory>,
    #[serde(deserialize_with = "deserialize_distance")]
    pub dist_pref: f64,
}

// Older preference documents carry the channel as a possibly-empty string.
fn deserialize_notif_pref<'de, D>(deserializer: D) -> Result<Option<NotificationChannel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some("text") => Ok(Some(NotificationChannel::Text)),
        Some("email") => Ok(Some(NotificationChannel::Email)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "unknown notification channel: {other}"
        ))),
    }
}

// The store holds the distance threshold either as a number or as its
// legacy string form ("50").
fn deserialize_distance<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(f64),
        Text(String),
    }

    match Wire::deserialize(deserializer)? {
        Wire::Number(value) => Ok(value),
        Wire::Text(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|err| serde::de::Error::custom(format!("invalid distPref {raw:?}: {err}"))),
    }
}
