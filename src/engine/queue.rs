use crate::error::AppError;
use crate::session::SessionUpdate;
use crate::state::AppState;

pub async fn push_update(state: &AppState, update: SessionUpdate) -> Result<(), AppError> {
    state
        .update_tx
        .send(update)
        .await
        .map_err(|err| AppError::Internal(format!("update queue send failed: {err}")))?;

    state.metrics.updates_in_queue.inc();
    Ok(())
}
