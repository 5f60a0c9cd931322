#[cfg(feature = "metrics")]
pub use registry::{FluentMetrics, METRICS};

#[cfg(feature = "metrics")]
mod registry {
    use crate::error::FluentError;
    use once_cell::sync::Lazy;
    use opentelemetry::metrics::{Counter, Histogram, MeterProvider};
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<FluentMetrics> = Lazy::new(FluentMetrics::init);

    pub struct FluentMetrics {
        registry: Registry,
        _provider: SdkMeterProvider,
        pub queries_total: Counter<u64>,
        pub query_errors_total: Counter<u64>,
        pub query_duration: Histogram<f64>,
        pub rows_materialized: Counter<u64>,
    }

    impl FluentMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let provider = match opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
            {
                Ok(exporter) => SdkMeterProvider::builder().with_reader(exporter).build(),
                Err(err) => {
                    log::warn!("prometheus exporter unavailable, metrics will not be exported: {err}");
                    SdkMeterProvider::builder().build()
                }
            };
            let meter = provider.meter("fluentguard");

            let queries_total = meter
                .u64_counter("fluentguard_queries_total")
                .with_description("Total statements executed")
                .build();

            let query_errors_total = meter
                .u64_counter("fluentguard_query_errors_total")
                .with_description("Statements that failed in the database layer")
                .build();

            let query_duration = meter
                .f64_histogram("fluentguard_query_duration_seconds")
                .with_description("Duration of statements")
                .build();

            let rows_materialized = meter
                .u64_counter("fluentguard_rows_materialized_total")
                .with_description("Rows turned into models or field records")
                .build();

            Self {
                registry,
                _provider: provider,
                queries_total,
                query_errors_total,
                query_duration,
                rows_materialized,
            }
        }

        pub fn record_query(&self, elapsed: Duration) {
            self.queries_total.add(1, &[]);
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_error(&self) {
            self.query_errors_total.add(1, &[]);
        }

        pub fn record_rows(&self, rows: usize) {
            self.rows_materialized.add(rows as u64, &[]);
        }

        /// Prometheus text exposition of everything recorded so far
        pub fn render(&self) -> Result<String, FluentError> {
            TextEncoder::new()
                .encode_to_string(&self.registry.gather())
                .map_err(|e| FluentError::Other(format!("failed to encode metrics: {e}")))
        }
    }

}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{debug_span, info_span, Span};

    pub fn execute_query_span(sql: &str) -> Span {
        debug_span!("fluentguard.query", db.statement = %sql)
    }

    pub fn begin_transaction_span(isolation: &str) -> Span {
        info_span!("fluentguard.transaction", isolation = %isolation)
    }

    pub fn commit_transaction_span() -> Span {
        info_span!("fluentguard.transaction.commit")
    }

    pub fn rollback_transaction_span() -> Span {
        info_span!("fluentguard.transaction.rollback")
    }

    pub fn connect_span() -> Span {
        info_span!("fluentguard.connect")
    }
}
