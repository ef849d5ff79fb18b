//! Observability: runtime counters and the sink abstraction.
//!
//! Engine code never touches `obs::metrics` directly; every event flows
//! through a `MetricsSink`.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{EventOps, EventReport, TypeCounters};
pub use sink::{ExecKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};
