use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_FAILURE: &str = "failure";

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token cache metrics
    pub token_cache_hits: IntCounter,
    pub token_cache_misses: IntCounter,

    // Credential refresher metrics
    pub credential_refresh: IntCounterVec,
    pub credential_refresh_duration: HistogramVec,

    // Authenticated request client metrics
    pub client_refresh: IntCounterVec,
    pub client_auth_retries: IntCounter,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("authfetch".into()), None).expect("valid registry prefix");

        let metrics: Arc<Metrics> = Arc::new(Self {
            token_cache_hits: IntCounter::new("token_cache_hits_total", "Access credentials served from cache").expect("metric"),
            token_cache_misses: IntCounter::new("token_cache_misses_total", "Access credential lookups that required a refresh").expect("metric"),

            credential_refresh: IntCounterVec::new(Opts::new("credential_refresh_total", "Token endpoint exchanges by outcome"), &["outcome"]).expect("metric"),
            credential_refresh_duration: HistogramVec::new(HistogramOpts::new("credential_refresh_duration_seconds", "Token endpoint exchange duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["outcome"]).expect("metric"),

            client_refresh: IntCounterVec::new(Opts::new("client_refresh_total", "Single-flight refresh calls issued by the request client"), &["outcome"]).expect("metric"),
            client_auth_retries: IntCounter::new("client_auth_retries_total", "Requests reissued after a successful refresh").expect("metric"),

            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").expect("metric"),
            up: IntGauge::new("up", "1 if service is healthy").expect("metric"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_cache_hits.clone())).expect("register");
        reg.register(Box::new(metrics.token_cache_misses.clone())).expect("register");
        reg.register(Box::new(metrics.credential_refresh.clone())).expect("register");
        reg.register(Box::new(metrics.credential_refresh_duration.clone())).expect("register");
        reg.register(Box::new(metrics.client_refresh.clone())).expect("register");
        reg.register(Box::new(metrics.client_auth_retries.clone())).expect("register");
        reg.register(Box::new(metrics.config_validation_errors.clone())).expect("register");
        reg.register(Box::new(metrics.up.clone())).expect("register");

        metrics
    }
}
