//! Vendor-agnostic metrics collection via a pluggable sink.
//!
//! Every `authorize*` call on [`AuthorizationService`](crate::AuthorizationService)
//! reports an [`EvaluationStats`] to the global sink. The default sink drops
//! everything, so there is no cost unless a sink is installed.
//!
//! ```ignore
//! use reelgate_core::metrics::{EvaluationStats, MetricsSink};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! struct Denials(AtomicU64);
//!
//! impl MetricsSink for Denials {
//!     fn on_evaluation(&self, stats: &EvaluationStats) {
//!         if !stats.succeeded {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//!
//! reelgate_core::metrics::set_sink(Arc::new(Denials(AtomicU64::new(0))));
//! ```

use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::warn;

/// Snapshot of one check, passed to [`MetricsSink::on_evaluation`].
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationStats {
    /// Wall-clock time for the whole check, including permission lookups.
    pub duration: Duration,
    pub succeeded: bool,
    /// Requirement or policy name, e.g. "Review" or "SearchPolicy".
    pub subject: String,
    /// Resource kind, or `None` for policy checks.
    pub resource_kind: Option<String>,
    /// Number of handlers invoked.
    pub handlers: usize,
}

/// Consumer of evaluation metrics. Called on the hot path; keep it cheap.
pub trait MetricsSink: Send + Sync {
    fn on_evaluation(&self, stats: &EvaluationStats);
}

struct NoOpSink;

impl MetricsSink for NoOpSink {
    fn on_evaluation(&self, _stats: &EvaluationStats) {}
}

static SINK: OnceLock<Arc<dyn MetricsSink>> = OnceLock::new();

fn sink() -> Arc<dyn MetricsSink> {
    SINK.get_or_init(|| Arc::new(NoOpSink)).clone()
}

/// Set the global metrics sink.
///
/// Call once at startup, before the first check. Later calls are ignored.
pub fn set_sink(sink: Arc<dyn MetricsSink>) {
    if SINK.set(sink).is_err() {
        warn!(event = "Metrics", "sink already initialized, ignoring set_sink");
    }
}

pub(crate) fn record_evaluation(
    succeeded: bool,
    duration: Duration,
    subject: String,
    resource_kind: Option<String>,
    handlers: usize,
) {
    sink().on_evaluation(&EvaluationStats {
        duration,
        succeeded,
        subject,
        resource_kind,
        handlers,
    });
}
