use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::rest::require_identifier;
use crate::engine::feed::spawn_vendor_loaders;
use crate::engine::queue::push_update;
use crate::engine::{bidding, payment};
use crate::error::AppError;
use crate::format::{
    days_between, format_short_label, truncate_for_card, CardText, ShortLabel,
    DESCRIPTION_CARD_LIMIT, NAME_WRAP_LIMIT,
};
use crate::models::bid::Bid;
use crate::models::job::{Job, JobCategory};
use crate::models::vendor::{GeoPosition, NotificationChannel, VendorPreferences};
use crate::payments::BillingRole;
use crate::session::{SessionUpdate, VendorSession};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/vendors/:vendor_id/session",
            post(open_session).get(get_session).delete(close_session),
        )
        .route("/vendors/:vendor_id/refresh", post(refresh_session))
        .route("/vendors/:vendor_id/position", put(update_position))
        .route("/vendors/:vendor_id/preferences", put(save_preferences))
        .route("/vendors/:vendor_id/feed", get(job_feed))
        .route("/vendors/:vendor_id/bids", get(list_bids).post(submit_bid))
        .route("/vendors/:vendor_id/pending", get(list_pending))
        .route(
            "/vendors/:vendor_id/pending/:pending_id/payment",
            post(complete_payment),
        )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSessionSnapshot {
    vendor_id: String,
    open_jobs: usize,
    visible_jobs: usize,
    submitted_bids: usize,
    pending_jobs: usize,
    has_preferences: bool,
    has_position: bool,
    opened_at: DateTime<Utc>,
}

fn snapshot(session: &VendorSession) -> VendorSessionSnapshot {
    VendorSessionSnapshot {
        vendor_id: session.vendor_id.clone(),
        open_jobs: session.open_jobs.len(),
        visible_jobs: session.visible_jobs.len(),
        submitted_bids: session.submitted_bids.len(),
        pending_jobs: session.pending_jobs.len(),
        has_preferences: session.preferences.is_some(),
        has_position: session.position.is_some(),
        opened_at: session.opened_at,
    }
}

async fn open_session(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<String>,
) -> Result<Json<VendorSessionSnapshot>, AppError> {
    let vendor_id = require_identifier(&vendor_id, "vendor")?;

    let session = VendorSession::new(vendor_id.clone());
    let snap = snapshot(&session);

    // Reopening replaces the old session, which aborts its loaders.
    if state.vendors.insert(vendor_id.clone(), session).is_none() {
        state
            .metrics
            .open_sessions
            .with_label_values(&["vendor"])
            .inc();
    }

    let handles = spawn_vendor_loaders(&state, &vendor_id);
    if let Some(mut session) = state.vendors.get_mut(&vendor_id) {
        session.track_loaders(handles);
    }

    info!(vendor_id = %vendor_id, "vendor session opened");
    Ok(Json(snap))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<String>,
) -> Result<Json<VendorSessionSnapshot>, AppError> {
    let vendor_id = require_identifier(&vendor_id, "vendor")?;

    let session = state
        .vendors
        .get(&vendor_id)
        .ok_or_else(|| AppError::NotFound(format!("no open session for vendor {vendor_id}")))?;

    Ok(Json(snapshot(&session)))
}

async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<String>,
) -> Result<Json<VendorSessionSnapshot>, AppError> {
    let vendor_id = require_identifier(&vendor_id, "vendor")?;

    let (_, session) = state
        .vendors
        .remove(&vendor_id)
        .ok_or_else(|| AppError::NotFound(format!("no open session for vendor {vendor_id}")))?;

    state
        .metrics
        .open_sessions
        .with_label_values(&["vendor"])
        .dec();
    let _ = state.metrics.visible_jobs.remove_label_values(&[&vendor_id]);

    info!(vendor_id = %vendor_id, "vendor session closed");
    Ok(Json(snapshot(&session)))
}

async fn refresh_session(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<String>,
) -> Result<Json<VendorSessionSnapshot>, AppError> {
    let vendor_id = require_identifier(&vendor_id, "vendor")?;

    if !state.vendors.contains_key(&vendor_id) {
        return Err(AppError::NotFound(format!(
            "no open session for vendor {vendor_id}"
        )));
    }

    let handles = spawn_vendor_loaders(&state, &vendor_id);
    let mut session = state
        .vendors
        .get_mut(&vendor_id)
        .ok_or_else(|| AppError::NotFound(format!("no open session for vendor {vendor_id}")))?;
    session.track_loaders(handles);

    info!(vendor_id = %vendor_id, "vendor session refresh started");
    Ok(Json(snapshot(&session)))
}

async fn update_position(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<String>,
    Json(position): Json<GeoPosition>,
) -> Result<Json<GeoPosition>, AppError> {
    let vendor_id = require_identifier(&vendor_id, "vendor")?;

    if !position.latitude.is_finite() || !position.longitude.is_finite() {
        return Err(AppError::BadRequest(
            "position coordinates must be finite".to_string(),
        ));
    }

    if !state.vendors.contains_key(&vendor_id) {
        return Err(AppError::NotFound(format!(
            "no open session for vendor {vendor_id}"
        )));
    }

    push_update(
        &state,
        SessionUpdate::PositionChanged {
            vendor_id,
            position,
        },
    )
    .await?;

    Ok(Json(position))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRequest {
    #[serde(default)]
    pub notif_pref: Option<NotificationChannel>,
    pub job_type_pref: HashSet<JobCategory>,
    pub dist_pref: f64,
}

async fn save_preferences(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<String>,
    Json(payload): Json<PreferencesRequest>,
) -> Result<Json<VendorPreferences>, AppError> {
    let vendor_id = require_identifier(&vendor_id, "vendor")?;

    if !payload.dist_pref.is_finite() || payload.dist_pref < 0.0 {
        return Err(AppError::BadRequest(
            "distance preference must be a non-negative number".to_string(),
        ));
    }

    if !state.vendors.contains_key(&vendor_id) {
        return Err(AppError::NotFound(format!(
            "no open session for vendor {vendor_id}"
        )));
    }

    let preferences = VendorPreferences {
        vendor_id: vendor_id.clone(),
        notif_pref: payload.notif_pref,
        job_type_pref: payload.job_type_pref,
        dist_pref: payload.dist_pref,
    };

    state.store.save_preferences(&preferences).await?;
    push_update(
        &state,
        SessionUpdate::PreferencesLoaded {
            vendor_id,
            preferences: preferences.clone(),
        },
    )
    .await?;

    Ok(Json(preferences))
}

async fn job_feed(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<String>,
) -> Result<Json<Vec<Job>>, AppError> {
    let vendor_id = require_identifier(&vendor_id, "vendor")?;

    let session = state
        .vendors
        .get(&vendor_id)
        .ok_or_else(|| AppError::NotFound(format!("no open session for vendor {vendor_id}")))?;

    Ok(Json(session.visible_jobs.clone()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedBidView {
    #[serde(flatten)]
    bid: Bid,
    days_ago: i64,
}

async fn list_bids(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<String>,
) -> Result<Json<Vec<SubmittedBidView>>, AppError> {
    let vendor_id = require_identifier(&vendor_id, "vendor")?;

    let session = state
        .vendors
        .get(&vendor_id)
        .ok_or_else(|| AppError::NotFound(format!("no open session for vendor {vendor_id}")))?;

    let now = Utc::now();
    let bids = session
        .submitted_bids
        .iter()
        .map(|bid| SubmittedBidView {
            bid: bid.clone(),
            days_ago: days_between(bid.date, now),
        })
        .collect();

    Ok(Json(bids))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBidRequest {
    pub job_id: String,
    pub payment: f64,
    pub deadline: String,
}

async fn submit_bid(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<String>,
    Json(payload): Json<SubmitBidRequest>,
) -> Result<Json<Bid>, AppError> {
    let vendor_id = require_identifier(&vendor_id, "vendor")?;

    if !payload.payment.is_finite() || payload.payment < 0.0 {
        return Err(AppError::BadRequest(
            "payment offer must be a non-negative number".to_string(),
        ));
    }

    if payload.deadline.trim().is_empty() {
        return Err(AppError::BadRequest("deadline cannot be empty".to_string()));
    }

    let bid = bidding::submit_bid(
        &state,
        &vendor_id,
        &payload.job_id,
        payload.payment,
        payload.deadline,
    )
    .await?;

    Ok(Json(bid))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingJobView {
    id: String,
    job_id: String,
    category: ShortLabel,
    description: CardText,
    payment: f64,
    shop_id: String,
}

async fn list_pending(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<String>,
) -> Result<Json<Vec<PendingJobView>>, AppError> {
    let vendor_id = require_identifier(&vendor_id, "vendor")?;

    let session = state
        .vendors
        .get(&vendor_id)
        .ok_or_else(|| AppError::NotFound(format!("no open session for vendor {vendor_id}")))?;

    let pending = session
        .pending_jobs
        .iter()
        .map(|job| PendingJobView {
            id: job.id.clone(),
            job_id: job.job_id.clone(),
            category: format_short_label(job.category.as_str(), NAME_WRAP_LIMIT),
            description: truncate_for_card(&job.description, DESCRIPTION_CARD_LIMIT),
            payment: job.payment,
            shop_id: job.shop_id.clone(),
        })
        .collect();

    Ok(Json(pending))
}

#[derive(Deserialize)]
pub struct CompletePaymentRequest {
    pub name: String,
    pub address: String,
    pub role: BillingRole,
    pub card: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pending_id: String,
    status: &'static str,
}

async fn complete_payment(
    State(state): State<Arc<AppState>>,
    Path((vendor_id, pending_id)): Path<(String, String)>,
    Json(payload): Json<CompletePaymentRequest>,
) -> Result<Json<CompletionResponse>, AppError> {
    let vendor_id = require_identifier(&vendor_id, "vendor")?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "billing name cannot be empty".to_string(),
        ));
    }

    if payload.address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "billing address cannot be empty".to_string(),
        ));
    }

    let form = payment::BillingForm {
        name: payload.name,
        address: payload.address,
        role: payload.role,
        card: payload.card,
    };

    payment::complete_job(&state, &vendor_id, &pending_id, form).await?;

    Ok(Json(CompletionResponse {
        pending_id,
        status: "completed",
    }))
}
