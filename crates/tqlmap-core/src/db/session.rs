//! Module: db::session
//! Responsibility: session policy (debug, metrics, delete mode) and manager construction.
//! Does not own: query compilation or transaction lifecycle of individual operations.

use crate::{
    config::SessionConfig,
    db::{
        Manager,
        driver::{Driver, TransactionMode},
        query::FunctionQuery,
        response::RawRow,
        tx::{OwnedTx, TxContext, TxHandle},
    },
    error::InternalError,
    model::ModelRegistry,
    obs::sink::{GLOBAL_METRICS_SINK, MetricsEvent, MetricsSink, NOOP_METRICS_SINK},
    traits::Model,
};

///
/// DbSession
///
/// Session-scoped database handle: the driver, the registered descriptors,
/// and the policy every manager created from it follows.
///

pub struct DbSession {
    driver: Box<dyn Driver>,
    registry: ModelRegistry,
    config: SessionConfig,
    metrics: Option<&'static dyn MetricsSink>,
}

impl DbSession {
    #[must_use]
    pub fn new(driver: impl Driver + 'static, registry: ModelRegistry) -> Self {
        Self {
            driver: Box::new(driver),
            registry,
            config: SessionConfig::default(),
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.config.debug = true;
        self
    }

    /// Route this session's events to `sink` instead of the global counters.
    #[must_use]
    pub const fn metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Entry points
    // ---------------------------------------------------------------------

    /// Manager for `E` running each operation in its own transaction.
    ///
    /// # Panics
    /// When `E` was never registered with this session.
    #[must_use]
    pub fn manager<E: Model>(&self) -> Manager<'_, E> {
        self.assert_registered::<E>();
        Manager::new(self, None)
    }

    /// Manager for `E` bound to a caller-owned transaction. Operations never
    /// commit or close it.
    ///
    /// # Panics
    /// When `E` was never registered with this session.
    #[must_use]
    pub fn manager_in<'a, E: Model>(&'a self, tx: &'a TxContext) -> Manager<'a, E> {
        self.assert_registered::<E>();
        Manager::new(self, Some(tx))
    }

    /// Open a caller-owned transaction.
    pub fn begin(&self, mode: TransactionMode) -> Result<TxContext, InternalError> {
        let tx = self.driver.open(mode)?;
        self.debug_log(format!("opened caller-owned {} transaction", mode.as_str()));

        Ok(TxContext::new(tx, mode))
    }

    /// Call a schema function by name.
    #[must_use]
    pub fn function(&self, name: &str) -> FunctionQuery<'_> {
        FunctionQuery::new(self, None, name)
    }

    /// Call a schema function inside a caller-owned transaction.
    #[must_use]
    pub fn function_in<'a>(&'a self, tx: &'a TxContext, name: &str) -> FunctionQuery<'a> {
        FunctionQuery::new(self, Some(tx), name)
    }

    // ---------------------------------------------------------------------
    // Internal routing
    // ---------------------------------------------------------------------

    fn assert_registered<E: Model>(&self) {
        let name = E::MODEL.name;
        assert!(
            self.registry.contains(name),
            "type '{name}' is not registered with this session"
        );
    }

    pub(crate) fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub(crate) fn sink(&self) -> &'static dyn MetricsSink {
        match self.metrics {
            Some(sink) => sink,
            None if self.config.metrics => &GLOBAL_METRICS_SINK,
            None => &NOOP_METRICS_SINK,
        }
    }

    /// The bound transaction, or a freshly opened owned one.
    pub(crate) fn open_handle<'a>(
        &self,
        tx: Option<&'a TxContext>,
        mode: TransactionMode,
    ) -> Result<TxHandle<'a>, InternalError> {
        match tx {
            Some(ctx) => Ok(TxHandle::Bound(ctx)),
            None => Ok(TxHandle::Owned(OwnedTx::open(self.driver(), mode)?)),
        }
    }

    /// Issue one statement, logged and counted under `label`.
    pub(crate) fn issue(
        &self,
        tx: &mut TxHandle<'_>,
        label: &'static str,
        query: &str,
    ) -> Result<Vec<RawRow>, InternalError> {
        let mode = tx.mode();
        self.debug_log(format!(
            "{label} [{}{}]\n{query}",
            mode.as_str(),
            if tx.is_bound() { ", bound" } else { "" }
        ));
        self.sink().record(MetricsEvent::StatementIssued {
            type_name: label,
            mode,
        });

        Ok(tx.query(query)?)
    }

    pub(crate) fn debug_log(&self, s: impl AsRef<str>) {
        if self.config.debug {
            tracing::debug!(target: "tqlmap", "{}", s.as_ref());
        }
    }
}
