use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// - Order commands handled / rejected
// - Status transitions, split by forward/backward
// - Discount values that had to be clamped
// - Preparation manifests generated and how long aggregation took
//
// All metrics are registered with one Registry and scraped via /metrics.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub order_commands: IntCounterVec,
    pub order_commands_failed: IntCounterVec,
    pub status_transitions: IntCounterVec,
    pub discount_clamped: IntCounterVec,

    pub preparation_manifests: IntCounter,
    pub preparation_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let order_commands = IntCounterVec::new(
            Opts::new("order_commands_total", "Total order commands handled"),
            &["command"],
        )?;
        registry.register(Box::new(order_commands.clone()))?;

        let order_commands_failed = IntCounterVec::new(
            Opts::new("order_commands_failed_total", "Total order commands rejected"),
            &["command", "reason"],
        )?;
        registry.register(Box::new(order_commands_failed.clone()))?;

        let status_transitions = IntCounterVec::new(
            Opts::new("order_status_transitions_total", "Order status transitions"),
            &["from", "to", "direction"],
        )?;
        registry.register(Box::new(status_transitions.clone()))?;

        let discount_clamped = IntCounterVec::new(
            Opts::new("pricing_discount_clamped_total", "Discount values clamped during pricing"),
            &["discount_type"],
        )?;
        registry.register(Box::new(discount_clamped.clone()))?;

        let preparation_manifests = IntCounter::new(
            "preparation_manifests_total",
            "Total preparation manifests generated",
        )?;
        registry.register(Box::new(preparation_manifests.clone()))?;

        let preparation_duration = HistogramVec::new(
            HistogramOpts::new(
                "preparation_aggregation_duration_seconds",
                "Preparation aggregation duration",
            )
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
            &["filtered"],
        )?;
        registry.register(Box::new(preparation_duration.clone()))?;

        Ok(Self {
            registry,
            order_commands,
            order_commands_failed,
            status_transitions,
            discount_clamped,
            preparation_manifests,
            preparation_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_command(&self, command: &str, success: bool, reason: Option<&str>) {
        if success {
            self.order_commands.with_label_values(&[command]).inc();
        } else {
            self.order_commands_failed
                .with_label_values(&[command, reason.unwrap_or("unknown")])
                .inc();
        }
    }

    pub fn record_status_transition(&self, from: &str, to: &str, forward: bool) {
        let direction = if forward { "forward" } else { "backward" };
        self.status_transitions.with_label_values(&[from, to, direction]).inc();
    }

    pub fn record_discount_clamp(&self, discount_type: &str) {
        self.discount_clamped.with_label_values(&[discount_type]).inc();
    }

    pub fn record_manifest(&self, filtered: bool, duration_secs: f64) {
        self.preparation_manifests.inc();
        self.preparation_duration
            .with_label_values(&[if filtered { "true" } else { "false" }])
            .observe(duration_secs);
    }
}
