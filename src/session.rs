use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::engine::matching::filter_jobs;
use crate::models::bid::Bid;
use crate::models::job::Job;
use crate::models::pending::PendingJob;
use crate::models::vendor::{GeoPosition, VendorPreferences};

pub struct VendorSession {
    pub vendor_id: String,
    pub preferences: Option<VendorPreferences>,
    pub position: Option<GeoPosition>,
    pub open_jobs: Vec<Job>,
    pub visible_jobs: Vec<Job>,
    pub submitted_bids: Vec<Bid>,
    pub pending_jobs: Vec<PendingJob>,
    pub opened_at: DateTime<Utc>,
    loaders: Vec<AbortHandle>,
}

impl VendorSession {
    pub fn new(vendor_id: String) -> Self {
        Self {
            vendor_id,
            preferences: None,
            position: None,
            open_jobs: Vec::new(),
            visible_jobs: Vec::new(),
            submitted_bids: Vec::new(),
            pending_jobs: Vec::new(),
            opened_at: Utc::now(),
            loaders: Vec::new(),
        }
    }

    // Filtering only runs once both preferences and position are known;
    // until then the full open list is shown.
    pub fn recompute_visible(&mut self) {
        match (&self.preferences, &self.position) {
            (Some(preferences), Some(position)) => {
                self.visible_jobs = filter_jobs(&self.open_jobs, preferences, position);
            }
            _ => {
                debug!(
                    vendor_id = %self.vendor_id,
                    "job filter skipped: preferences or position not loaded"
                );
                self.visible_jobs = self.open_jobs.clone();
            }
        }
    }

    pub fn track_loaders(&mut self, handles: Vec<AbortHandle>) {
        self.loaders.retain(|handle| !handle.is_finished());
        self.loaders.extend(handles);
    }
}

impl Drop for VendorSession {
    fn drop(&mut self) {
        for handle in self.loaders.drain(..) {
            handle.abort();
        }
    }
}

pub struct ShopSession {
    pub shop_id: String,
    pub incoming_bids: Vec<Bid>,
    pub opened_at: DateTime<Utc>,
    loaders: Vec<AbortHandle>,
}

impl ShopSession {
    pub fn new(shop_id: String) -> Self {
        Self {
            shop_id,
            incoming_bids: Vec::new(),
            opened_at: Utc::now(),
            loaders: Vec::new(),
        }
    }

    pub fn track_loaders(&mut self, handles: Vec<AbortHandle>) {
        self.loaders.retain(|handle| !handle.is_finished());
        self.loaders.extend(handles);
    }
}

impl Drop for ShopSession {
    fn drop(&mut self) {
        for handle in self.loaders.drain(..) {
            handle.abort();
        }
    }
}

#[derive(Debug)]
pub enum SessionUpdate {
    JobsLoaded {
        vendor_id: String,
        jobs: Vec<Job>,
    },
    BidsLoaded {
        vendor_id: String,
        bids: Vec<Bid>,
    },
    PendingLoaded {
        vendor_id: String,
        jobs: Vec<PendingJob>,
    },
    PreferencesLoaded {
        vendor_id: String,
        preferences: VendorPreferences,
    },
    PositionChanged {
        vendor_id: String,
        position: GeoPosition,
    },
    JobClaimed {
        vendor_id: String,
        job_id: String,
        bid: Bid,
    },
    PendingResolved {
        vendor_id: String,
        pending_id: String,
    },
    ShopBidsLoaded {
        shop_id: String,
        bids: Vec<Bid>,
    },
    BidAccepted {
        shop_id: String,
        bid_id: String,
        bids: Vec<Bid>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    FeedUpdated {
        vendor_id: String,
        visible: usize,
    },
    BidSubmitted {
        vendor_id: String,
        job_id: String,
        bid_id: String,
    },
    BidsRefreshed {
        shop_id: String,
        incoming: usize,
    },
    BidAccepted {
        shop_id: String,
        bid_id: String,
    },
    JobCompleted {
        vendor_id: String,
        pending_id: String,
    },
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::VendorSession;
    use crate::models::job::{Job, JobCategory};
    use crate::models::vendor::{GeoPosition, VendorPreferences};

    fn job(id: &str, category: JobCategory, latitude: f64, longitude: f64) -> Job {
        Job {
            id: id.to_string(),
            category,
            description: "test job".to_string(),
            shop_id: "shop-1".to_string(),
            shop_name: "Karz".to_string(),
            shop_address: "12 Main St".to_string(),
            latitude,
            longitude,
            bidding_deadline: "2026-09-01".to_string(),
            job_picture: None,
            make: None,
        }
    }

    fn preferences(categories: &[JobCategory], dist_pref: f64) -> VendorPreferences {
        VendorPreferences {
            vendor_id: "v1".to_string(),
            notif_pref: None,
            job_type_pref: categories.iter().copied().collect(),
            dist_pref,
        }
    }

    #[test]
    fn recompute_filters_once_inputs_are_known() {
        let mut session = VendorSession::new("v1".to_string());
        session.open_jobs = vec![
            job("near", JobCategory::Bedliners, 40.0, -75.0),
            job("far", JobCategory::Bedliners, 41.0, -75.0),
        ];
        session.preferences = Some(preferences(&[JobCategory::Bedliners], 10.0));
        session.position = Some(GeoPosition {
            latitude: 40.0,
            longitude: -75.0,
        });

        session.recompute_visible();

        let ids: Vec<&str> = session.visible_jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["near"]);
    }

    #[test]
    fn recompute_shows_everything_while_position_is_missing() {
        let mut session = VendorSession::new("v1".to_string());
        session.open_jobs = vec![
            job("a", JobCategory::Bedliners, 40.0, -75.0),
            job("b", JobCategory::WindowTinting, 41.0, -75.0),
        ];
        session.preferences = Some(preferences(&[JobCategory::Bedliners], 10.0));

        session.recompute_visible();

        assert_eq!(session.visible_jobs.len(), 2);
    }

    #[test]
    fn recompute_shows_everything_while_preferences_are_missing() {
        let mut session = VendorSession::new("v1".to_string());
        session.open_jobs = vec![job("a", JobCategory::Bedliners, 40.0, -75.0)];
        session.position = Some(GeoPosition {
            latitude: 0.0,
            longitude: 0.0,
        });

        session.recompute_visible();

        assert_eq!(session.visible_jobs.len(), 1);
    }

    #[tokio::test]
    async fn dropping_a_session_aborts_its_loaders() {
        let task = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        let handle = task.abort_handle();

        let mut session = VendorSession::new("v1".to_string());
        session.track_loaders(vec![handle]);
        drop(session);

        let err = task.await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
