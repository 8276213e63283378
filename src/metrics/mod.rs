// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::{health_handler, metrics_handler};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order lifecycle (created, updated, deleted)
// - Rejected submissions by reason
// - Store operation latency and failures
// - Revenue report requests
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Order Lifecycle Metrics
    pub orders_created: IntCounter,
    pub orders_updated: IntCounter,
    pub orders_deleted: IntCounter,
    pub order_rejections: IntCounterVec,

    // Store Metrics
    pub store_operation_duration: HistogramVec,
    pub store_operation_failures: IntCounterVec,

    // Reporting Metrics
    pub revenue_queries: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Order Lifecycle Metrics
        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_updated = IntCounter::new("orders_updated_total", "Total orders updated")?;
        registry.register(Box::new(orders_updated.clone()))?;

        let orders_deleted = IntCounter::new("orders_deleted_total", "Total orders deleted")?;
        registry.register(Box::new(orders_deleted.clone()))?;

        let order_rejections = IntCounterVec::new(
            Opts::new("order_rejections_total", "Order submissions rejected by validation"),
            &["reason"],
        )?;
        registry.register(Box::new(order_rejections.clone()))?;

        // Store Metrics
        let store_operation_duration = HistogramVec::new(
            HistogramOpts::new("store_operation_duration_seconds", "Order store operation duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(store_operation_duration.clone()))?;

        let store_operation_failures = IntCounterVec::new(
            Opts::new("store_operation_failures_total", "Order store operations that failed"),
            &["operation"],
        )?;
        registry.register(Box::new(store_operation_failures.clone()))?;

        // Reporting Metrics
        let revenue_queries = IntCounter::new("revenue_queries_total", "Total revenue report requests")?;
        registry.register(Box::new(revenue_queries.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            orders_updated,
            orders_deleted,
            order_rejections,
            store_operation_duration,
            store_operation_failures,
            revenue_queries,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a rejected submission
    pub fn record_rejection(&self, reason: &str) {
        self.order_rejections.with_label_values(&[reason]).inc();
    }

    /// Helper to record a store round trip
    pub fn record_store_operation(&self, operation: &str, duration_secs: f64, success: bool) {
        self.store_operation_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
        if !success {
            self.store_operation_failures.with_label_values(&[operation]).inc();
        }
    }
}
