use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

/// Text exposition of every registered metric.
pub async fn render_metrics() -> anyhow::Result<String> {
    let metrics = get_metrics().await;
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&metrics.registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Dispatcher metrics
    pub api_requests: IntCounterVec,
    pub api_request_duration: HistogramVec,
    pub dispatch_failures: IntCounterVec,

    // Token metrics
    pub token_acquisitions: IntCounterVec,
    pub token_refreshes: IntCounter,
    pub token_store_writes: IntCounter,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("tokenbroker".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Dispatcher
            api_requests: IntCounterVec::new(Opts::new("api_requests_total", "API requests by method and outcome"),&["method", "outcome"],).unwrap(),
            api_request_duration: HistogramVec::new(HistogramOpts::new("api_request_duration_seconds", "API request duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["method"],).unwrap(),
            dispatch_failures: IntCounterVec::new(Opts::new("dispatch_failures_total", "Failed calls by error kind"),&["kind"],).unwrap(),

            // Token
            token_acquisitions: IntCounterVec::new(Opts::new("token_acquisitions_total", "Tokens obtained by origin"),&["origin"],).unwrap(),
            token_refreshes: IntCounter::new("token_refreshes_total", "Refreshes triggered by a 401").unwrap(),
            token_store_writes: IntCounter::new("token_store_writes_total", "Durable token writes").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.api_requests.clone())).unwrap();
        reg.register(Box::new(metrics.api_request_duration.clone())).unwrap();
        reg.register(Box::new(metrics.dispatch_failures.clone())).unwrap();
        reg.register(Box::new(metrics.token_acquisitions.clone())).unwrap();
        reg.register(Box::new(metrics.token_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.token_store_writes.clone())).unwrap();

        metrics
    }
}
