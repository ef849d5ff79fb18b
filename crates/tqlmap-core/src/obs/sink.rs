//! Metrics sink boundary.
//!
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`.
//! This module is the only bridge between execution logic and the global
//! metrics state.

use crate::{db::driver::TransactionMode, obs::metrics};

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Load,
    Count,
    Aggregate,
    Insert,
    Update,
    Put,
    Delete,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
        type_name: &'static str,
    },
    ExecFinish {
        kind: ExecKind,
        type_name: &'static str,
        rows_touched: u64,
    },
    StatementIssued {
        type_name: &'static str,
        mode: TransactionMode,
    },
    Committed {
        type_name: &'static str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink writing into the process-wide counters.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExecStart { kind, type_name } => {
                metrics::with_state_mut(|m| {
                    let counter = match kind {
                        ExecKind::Load => &mut m.ops.load_calls,
                        ExecKind::Count => &mut m.ops.count_calls,
                        ExecKind::Aggregate => &mut m.ops.aggregate_calls,
                        ExecKind::Insert => &mut m.ops.insert_calls,
                        ExecKind::Update => &mut m.ops.update_calls,
                        ExecKind::Put => &mut m.ops.put_calls,
                        ExecKind::Delete => &mut m.ops.delete_calls,
                    };
                    *counter = counter.saturating_add(1);

                    let entry = m.types.entry(type_name.to_string()).or_default();
                    entry.calls = entry.calls.saturating_add(1);
                });
            }

            MetricsEvent::ExecFinish {
                kind,
                type_name,
                rows_touched,
            } => {
                metrics::with_state_mut(|m| {
                    let entry = m.types.entry(type_name.to_string()).or_default();
                    match kind {
                        ExecKind::Load => {
                            m.ops.rows_loaded = m.ops.rows_loaded.saturating_add(rows_touched);
                            entry.rows_loaded = entry.rows_loaded.saturating_add(rows_touched);
                        }
                        ExecKind::Insert | ExecKind::Update | ExecKind::Put | ExecKind::Delete => {
                            m.ops.rows_written = m.ops.rows_written.saturating_add(rows_touched);
                            entry.rows_written = entry.rows_written.saturating_add(rows_touched);
                        }
                        ExecKind::Count | ExecKind::Aggregate => {}
                    }
                });
            }

            MetricsEvent::StatementIssued { type_name, mode } => {
                metrics::with_state_mut(|m| {
                    match mode {
                        TransactionMode::Read => {
                            m.ops.read_statements = m.ops.read_statements.saturating_add(1);
                        }
                        TransactionMode::Write => {
                            m.ops.write_statements = m.ops.write_statements.saturating_add(1);
                        }
                    }
                    let entry = m.types.entry(type_name.to_string()).or_default();
                    entry.statements = entry.statements.saturating_add(1);
                });
            }

            MetricsEvent::Committed { type_name } => {
                metrics::with_state_mut(|m| {
                    m.ops.commits = m.ops.commits.saturating_add(1);
                    let entry = m.types.entry(type_name.to_string()).or_default();
                    entry.commits = entry.commits.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) static GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

/// NoopMetricsSink
/// Installed when a session disables metrics.

pub(crate) struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record(&self, _event: MetricsEvent) {}
}

pub(crate) static NOOP_METRICS_SINK: NoopMetricsSink = NoopMetricsSink;

/// Snapshot the current global metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all global metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Span
/// RAII guard that emits start/finish events for one operation.
/// Finish accounting happens even when the operation returns early.

pub(crate) struct Span {
    sink: &'static dyn MetricsSink,
    kind: ExecKind,
    type_name: &'static str,
    rows: u64,
}

impl Span {
    #[must_use]
    pub(crate) fn new(sink: &'static dyn MetricsSink, kind: ExecKind, type_name: &'static str) -> Self {
        sink.record(MetricsEvent::ExecStart { kind, type_name });

        Self {
            sink,
            kind,
            type_name,
            rows: 0,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        self.sink.record(MetricsEvent::ExecFinish {
            kind: self.kind,
            type_name: self.type_name,
            rows_touched: self.rows,
        });
    }
}
