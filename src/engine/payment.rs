use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::observe_workflow;
use crate::engine::queue::push_update;
use crate::error::AppError;
use crate::models::pending::NewPendingJob;
use crate::payments::BillingRole;
use crate::session::SessionUpdate;
use crate::state::AppState;

pub struct BillingForm {
    pub name: String,
    pub address: String,
    pub role: BillingRole,
    pub card: Value,
}

pub async fn complete_job(
    state: &Arc<AppState>,
    vendor_id: &str,
    pending_id: &str,
    form: BillingForm,
) -> Result<(), AppError> {
    let run_id = Uuid::new_v4();
    let started = Instant::now();

    match run_completion(state, vendor_id, pending_id, form, run_id).await {
        Ok(()) => {
            observe_workflow(state, "complete_job", "success", started);
            Ok(())
        }
        Err(err) => {
            observe_workflow(state, "complete_job", "error", started);
            error!(
                error = %err,
                run_id = %run_id,
                vendor_id = %vendor_id,
                pending_id = %pending_id,
                "payment completion failed"
            );
            Err(err)
        }
    }
}

async fn run_completion(
    state: &Arc<AppState>,
    vendor_id: &str,
    pending_id: &str,
    form: BillingForm,
    run_id: Uuid,
) -> Result<(), AppError> {
    let pending = {
        let session = state.vendors.get(vendor_id).ok_or_else(|| {
            AppError::NotFound(format!("no open session for vendor {vendor_id}"))
        })?;

        session
            .pending_jobs
            .iter()
            .find(|job| job.id == pending_id)
            .cloned()
            .ok_or_else(|| {
                warn!(
                    run_id = %run_id,
                    vendor_id = %vendor_id,
                    pending_id = %pending_id,
                    "payment completion skipped: job not in pending listing"
                );
                AppError::NotFound(format!("pending job {pending_id} not found"))
            })?
    };

    info!(
        run_id = %run_id,
        vendor_id = %vendor_id,
        pending_id = %pending_id,
        "payment completion started"
    );

    let payment_method_id = state
        .payments
        .tokenize(&form.card, &form.name, &form.address)
        .await?;
    state
        .payments
        .process(&payment_method_id, &form.name, &form.address, form.role)
        .await?;

    // The charge has settled; the record move is delete-then-create with
    // no rollback if the second call fails.
    state.store.delete_vendor_pending(&pending.id).await?;
    state
        .store
        .add_vendor_completed(&NewPendingJob::completed_from(&pending))
        .await?;

    push_update(
        state,
        SessionUpdate::PendingResolved {
            vendor_id: vendor_id.to_string(),
            pending_id: pending.id.clone(),
        },
    )
    .await?;

    info!(run_id = %run_id, pending_id = %pending.id, "job completed");
    Ok(())
}
