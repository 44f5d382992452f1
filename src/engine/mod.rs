pub mod bidding;
pub mod feed;
pub mod matching;
pub mod payment;
pub mod queue;

use std::time::Instant;

use crate::state::AppState;

pub(crate) fn observe_workflow(state: &AppState, workflow: &str, outcome: &str, started: Instant) {
    state
        .metrics
        .workflow_duration_seconds
        .with_label_values(&[workflow, outcome])
        .observe(started.elapsed().as_secs_f64());
    state
        .metrics
        .workflow_runs_total
        .with_label_values(&[workflow, outcome])
        .inc();
}
