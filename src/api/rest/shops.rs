use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::api::rest::require_identifier;
use crate::engine::bidding;
use crate::engine::feed::spawn_shop_loaders;
use crate::error::AppError;
use crate::format::{
    format_short_label, truncate_for_card, CardText, ShortLabel, DESCRIPTION_CARD_LIMIT,
    NAME_WRAP_LIMIT,
};
use crate::models::job::JobCategory;
use crate::session::ShopSession;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/shops/:shop_id/session",
            post(open_session).get(get_session).delete(close_session),
        )
        .route("/shops/:shop_id/bids", get(list_incoming))
        .route("/shops/:shop_id/bids/:bid_id/accept", post(accept_bid))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSessionSnapshot {
    shop_id: String,
    incoming_bids: usize,
    opened_at: DateTime<Utc>,
}

fn snapshot(session: &ShopSession) -> ShopSessionSnapshot {
    ShopSessionSnapshot {
        shop_id: session.shop_id.clone(),
        incoming_bids: session.incoming_bids.len(),
        opened_at: session.opened_at,
    }
}

async fn open_session(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<String>,
) -> Result<Json<ShopSessionSnapshot>, AppError> {
    let shop_id = require_identifier(&shop_id, "shop")?;

    let session = ShopSession::new(shop_id.clone());
    let snap = snapshot(&session);

    if state.shops.insert(shop_id.clone(), session).is_none() {
        state
            .metrics
            .open_sessions
            .with_label_values(&["shop"])
            .inc();
    }

    let handles = spawn_shop_loaders(&state, &shop_id);
    if let Some(mut session) = state.shops.get_mut(&shop_id) {
        session.track_loaders(handles);
    }

    info!(shop_id = %shop_id, "shop session opened");
    Ok(Json(snap))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<String>,
) -> Result<Json<ShopSessionSnapshot>, AppError> {
    let shop_id = require_identifier(&shop_id, "shop")?;

    let session = state
        .shops
        .get(&shop_id)
        .ok_or_else(|| AppError::NotFound(format!("no open session for shop {shop_id}")))?;

    Ok(Json(snapshot(&session)))
}

async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<String>,
) -> Result<Json<ShopSessionSnapshot>, AppError> {
    let shop_id = require_identifier(&shop_id, "shop")?;

    let (_, session) = state
        .shops
        .remove(&shop_id)
        .ok_or_else(|| AppError::NotFound(format!("no open session for shop {shop_id}")))?;

    state
        .metrics
        .open_sessions
        .with_label_values(&["shop"])
        .dec();

    info!(shop_id = %shop_id, "shop session closed");
    Ok(Json(snapshot(&session)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingBidView {
    id: String,
    job_id: String,
    vendor_id: String,
    category: JobCategory,
    shop_name: ShortLabel,
    description: CardText,
    payment: f64,
    deadline: String,
    date: DateTime<Utc>,
}

async fn list_incoming(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<String>,
) -> Result<Json<Vec<IncomingBidView>>, AppError> {
    let shop_id = require_identifier(&shop_id, "shop")?;

    let session = state
        .shops
        .get(&shop_id)
        .ok_or_else(|| AppError::NotFound(format!("no open session for shop {shop_id}")))?;

    let bids = session
        .incoming_bids
        .iter()
        .map(|bid| IncomingBidView {
            id: bid.id.clone(),
            job_id: bid.job_id.clone(),
            vendor_id: bid.vendor_id.clone(),
            category: bid.category,
            shop_name: format_short_label(&bid.shop_name, NAME_WRAP_LIMIT),
            description: truncate_for_card(&bid.description, DESCRIPTION_CARD_LIMIT),
            payment: bid.payment,
            deadline: bid.deadline.clone(),
            date: bid.date,
        })
        .collect();

    Ok(Json(bids))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptResponse {
    bid_id: String,
    status: &'static str,
}

async fn accept_bid(
    State(state): State<Arc<AppState>>,
    Path((shop_id, bid_id)): Path<(String, String)>,
) -> Result<Json<AcceptResponse>, AppError> {
    let shop_id = require_identifier(&shop_id, "shop")?;

    bidding::accept_bid(&state, &shop_id, &bid_id).await?;

    Ok(Json(AcceptResponse {
        bid_id,
        status: "accepted",
    }))
}
