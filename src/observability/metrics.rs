use prometheus::{
    Encoder, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub workflow_runs_total: IntCounterVec,
    pub workflow_duration_seconds: HistogramVec,
    pub updates_in_queue: IntGauge,
    pub open_sessions: IntGaugeVec,
    pub visible_jobs: IntGaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let workflow_runs_total = IntCounterVec::new(
            Opts::new("workflow_runs_total", "Total workflow runs by outcome"),
            &["workflow", "outcome"],
        )
        .expect("valid workflow_runs_total metric");

        let workflow_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "workflow_duration_seconds",
                "Duration of workflow execution in seconds",
            ),
            &["workflow", "outcome"],
        )
        .expect("valid workflow_duration_seconds metric");

        let updates_in_queue =
            IntGauge::new("updates_in_queue", "Current number of queued session updates")
                .expect("valid updates_in_queue metric");

        let open_sessions = IntGaugeVec::new(
            Opts::new("open_sessions", "Currently open sessions by role"),
            &["role"],
        )
        .expect("valid open_sessions metric");

        let visible_jobs = IntGaugeVec::new(
            Opts::new("visible_jobs", "Jobs visible in a vendor's filtered feed"),
            &["vendor_id"],
        )
        .expect("valid visible_jobs metric");

        registry
            .register(Box::new(workflow_runs_total.clone()))
            .expect("register workflow_runs_total");
        registry
            .register(Box::new(workflow_duration_seconds.clone()))
            .expect("register workflow_duration_seconds");
        registry
            .register(Box::new(updates_in_queue.clone()))
            .expect("register updates_in_queue");
        registry
            .register(Box::new(open_sessions.clone()))
            .expect("register open_sessions");
        registry
            .register(Box::new(visible_jobs.clone()))
            .expect("register visible_jobs");

        Self {
            registry,
            workflow_runs_total,
            workflow_duration_seconds,
            updates_in_queue,
            open_sessions,
            visible_jobs,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
