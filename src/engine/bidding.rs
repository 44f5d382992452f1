use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::observe_workflow;
use crate::engine::queue::push_update;
use crate::error::AppError;
use crate::models::bid::{Bid, NewBid};
use crate::models::pending::NewPendingJob;
use crate::session::SessionUpdate;
use crate::state::AppState;

pub async fn submit_bid(
    state: &Arc<AppState>,
    vendor_id: &str,
    job_id: &str,
    payment: f64,
    deadline: String,
) -> Result<Bid, AppError> {
    let run_id = Uuid::new_v4();
    let started = Instant::now();

    match run_submission(state, vendor_id, job_id, payment, deadline, run_id).await {
        Ok(bid) => {
            observe_workflow(state, "submit_bid", "success", started);
            Ok(bid)
        }
        Err(err) => {
            observe_workflow(state, "submit_bid", "error", started);
            error!(
                error = %err,
                run_id = %run_id,
                vendor_id = %vendor_id,
                job_id = %job_id,
                "bid submission failed"
            );
            Err(err)
        }
    }
}

async fn run_submission(
    state: &Arc<AppState>,
    vendor_id: &str,
    job_id: &str,
    payment: f64,
    deadline: String,
    run_id: Uuid,
) -> Result<Bid, AppError> {
    let job = {
        let session = state.vendors.get(vendor_id).ok_or_else(|| {
            AppError::NotFound(format!("no open session for vendor {vendor_id}"))
        })?;

        session
            .open_jobs
            .iter()
            .find(|job| job.id == job_id)
            .cloned()
            .ok_or_else(|| {
                warn!(
                    run_id = %run_id,
                    vendor_id = %vendor_id,
                    job_id = %job_id,
                    "bid submission skipped: job not in open listing"
                );
                AppError::NotFound(format!("job {job_id} is not open for bidding"))
            })?
    };

    info!(
        run_id = %run_id,
        vendor_id = %vendor_id,
        job_id = %job_id,
        "bid submission started"
    );

    state.store.delete_job(&job.id).await?;

    let draft = NewBid {
        job_id: job.id.clone(),
        shop_id: job.shop_id.clone(),
        shop_name: job.shop_name.clone(),
        category: job.category,
        description: job.description.clone(),
        date: Utc::now(),
        vendor_id: vendor_id.to_string(),
        payment,
        deadline,
    };

    let bid = match state.store.submit_bid(&draft).await {
        Ok(bid) => bid,
        Err(err) => {
            // No compensating re-create of the deleted job; the open
            // listing converges on the next refresh.
            warn!(
                run_id = %run_id,
                job_id = %job_id,
                "bid create failed after job delete"
            );
            return Err(err.into());
        }
    };

    push_update(
        state,
        SessionUpdate::JobClaimed {
            vendor_id: vendor_id.to_string(),
            job_id: job.id.clone(),
            bid: bid.clone(),
        },
    )
    .await?;

    info!(run_id = %run_id, bid_id = %bid.id, "bid submitted");
    Ok(bid)
}

pub async fn accept_bid(
    state: &Arc<AppState>,
    shop_id: &str,
    bid_id: &str,
) -> Result<(), AppError> {
    let run_id = Uuid::new_v4();
    let started = Instant::now();

    match run_acceptance(state, shop_id, bid_id, run_id).await {
        Ok(()) => {
            observe_workflow(state, "accept_bid", "success", started);
            Ok(())
        }
        Err(err) => {
            observe_workflow(state, "accept_bid", "error", started);
            error!(
                error = %err,
                run_id = %run_id,
                shop_id = %shop_id,
                bid_id = %bid_id,
                "bid acceptance failed"
            );
            Err(err)
        }
    }
}

async fn run_acceptance(
    state: &Arc<AppState>,
    shop_id: &str,
    bid_id: &str,
    run_id: Uuid,
) -> Result<(), AppError> {
    let bid = {
        let session = state
            .shops
            .get(shop_id)
            .ok_or_else(|| AppError::NotFound(format!("no open session for shop {shop_id}")))?;

        session
            .incoming_bids
            .iter()
            .find(|bid| bid.id == bid_id)
            .cloned()
            .ok_or_else(|| {
                warn!(
                    run_id = %run_id,
                    shop_id = %shop_id,
                    bid_id = %bid_id,
                    "bid acceptance skipped: bid not in listing"
                );
                AppError::NotFound(format!("bid {bid_id} is not in the shop listing"))
            })?
    };

    info!(
        run_id = %run_id,
        shop_id = %shop_id,
        bid_id = %bid_id,
        "bid acceptance started"
    );

    // Steps run in order and are not rolled back on a later failure.
    let pending = NewPendingJob::from_accepted_bid(&bid);
    state.store.add_vendor_pending(&pending).await?;
    state.store.add_shop_pending(&pending).await?;
    state.store.delete_submitted_bid(&bid.id).await?;

    let bids = state.store.fetch_shop_bids(shop_id).await?;
    push_update(
        state,
        SessionUpdate::BidAccepted {
            shop_id: shop_id.to_string(),
            bid_id: bid.id.clone(),
            bids,
        },
    )
    .await?;

    info!(
        run_id = %run_id,
        bid_id = %bid.id,
        vendor_id = %bid.vendor_id,
        "bid accepted"
    );
    Ok(())
}
