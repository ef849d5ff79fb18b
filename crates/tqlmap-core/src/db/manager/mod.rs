//! Module: db::manager
//! Responsibility: per-type read entry points and the shared execution helpers
//! (cancellation, transaction routing, logging, metrics, hydration).
//! Mutations live in `db::mutation`; the fluent builder in `db::query`.


use crate::{
    db::{
        DbSession,
        cancel::CancelToken,
        driver::TransactionMode,
        filter::Filter,
        query::{Query, QuerySpec},
        response::{RawRow, Row, normalize_row},
        strategy::ModelStrategy,
        tx::{TxContext, TxHandle},
    },
    error::InternalError,
    obs::sink::{ExecKind, MetricsEvent, Span},
    traits::Model,
    value::{Value, format},
};
use std::marker::PhantomData;

/// Instance variable every compiled query hangs its patterns off.
pub(crate) const VAR: &str = "e";

/// Type-label variable of polymorphic reads.
const TYPE_VAR: &str = "t";

///
/// Manager
///
/// Typed handle for one registered model type. Cheap to clone; every
/// operation either opens its own transaction or runs inside the caller's
/// `TxContext` when the manager was created with `DbSession::manager_in`.
///

pub struct Manager<'a, E: Model> {
    session: &'a DbSession,
    tx: Option<&'a TxContext>,
    cancel: Option<CancelToken>,
    strategy: ModelStrategy,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Model> Clone for Manager<'_, E> {
    fn clone(&self) -> Self {
        Self {
            session: self.session,
            tx: self.tx,
            cancel: self.cancel.clone(),
            strategy: self.strategy,
            _marker: PhantomData,
        }
    }
}

impl<'a, E: Model> Manager<'a, E> {
    pub(crate) const fn new(session: &'a DbSession, tx: Option<&'a TxContext>) -> Self {
        Self {
            session,
            tx,
            cancel: None,
            strategy: ModelStrategy::for_model(E::MODEL),
            _marker: PhantomData,
        }
    }

    /// Check `token` before the first statement of every operation.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub const fn strategy(&self) -> ModelStrategy {
        self.strategy
    }

    /// True when operations run inside a caller-owned transaction.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.tx.is_some()
    }

    /// Fluent query over this manager's type.
    #[must_use]
    pub fn query(&self) -> Query<'a, E> {
        Query::new(self.clone())
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn all(&self) -> Result<Vec<E>, InternalError> {
        self.annotate("all", || {
            let query = format!(
                "{}\n{}",
                self.strategy.build_match_all(E::MODEL, VAR),
                self.strategy.build_fetch_all(E::MODEL, VAR)
            );

            self.load(&query)
        })
    }

    /// Instances owning every given attribute value.
    pub fn get_by<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>) -> Result<Vec<E>, InternalError>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.annotate("get_by", || {
            let mut constraints = vec![format!("${VAR} isa {}", E::MODEL.name)];
            constraints.extend(
                pairs
                    .into_iter()
                    .map(|(attr, value)| format!("has {} {}", attr.as_ref(), format(&value.into()))),
            );
            let query = format!(
                "match\n{};\n{}",
                constraints.join(", "),
                self.strategy.build_fetch_all(E::MODEL, VAR)
            );

            self.load(&query)
        })
    }

    /// Instance with the given id, or `None`.
    pub fn get_by_id(&self, id: &str) -> Result<Option<E>, InternalError> {
        self.annotate("get_by_id", || {
            let query = format!(
                "{}\n{}",
                self.strategy.build_match_by_id(E::MODEL, id, VAR),
                self.strategy.build_fetch_all(E::MODEL, VAR)
            );

            Ok(self.load(&query)?.into_iter().next())
        })
    }

    /// Filtered read that also projects one nested level of every role player.
    pub fn get_with_roles(
        &self,
        filters: impl IntoIterator<Item = Filter>,
    ) -> Result<Vec<E>, InternalError> {
        self.annotate("get_with_roles", || {
            let mut spec = QuerySpec::new(E::MODEL);
            for filter in filters {
                spec.push_filter(filter);
            }

            let (role_matches, fetch) =
                self.strategy
                    .build_fetch_with_roles(E::MODEL, self.session.registry(), VAR);
            let mut lines = spec.match_lines(VAR);
            lines.extend(role_matches);

            self.load(&format!("match\n{}\n{fetch}", lines.join("\n")))
        })
    }

    /// Instance with the given id whose concrete type is `E` or any registered
    /// subtype, paired with its concrete type label.
    pub fn get_by_id_polymorphic(&self, id: &str) -> Result<Option<(E, String)>, InternalError> {
        self.annotate("get_by_id_polymorphic", || {
            let query = format!(
                "{}\n${VAR} iid {id};\n{}",
                self.strategy
                    .build_match_all_polymorphic(E::MODEL, VAR, TYPE_VAR),
                self.strategy.build_fetch_all_with_type(
                    E::MODEL,
                    self.session.registry(),
                    VAR,
                    TYPE_VAR
                )
            );

            Ok(self.load_labelled(&query)?.into_iter().next())
        })
    }

    /// Every instance of `E` and its registered subtypes, with type labels.
    pub fn all_polymorphic(&self) -> Result<Vec<(E, String)>, InternalError> {
        self.annotate("all_polymorphic", || {
            let query = format!(
                "{}\n{}",
                self.strategy
                    .build_match_all_polymorphic(E::MODEL, VAR, TYPE_VAR),
                self.strategy.build_fetch_all_with_type(
                    E::MODEL,
                    self.session.registry(),
                    VAR,
                    TYPE_VAR
                )
            );

            self.load_labelled(&query)
        })
    }

    // ---------------------------------------------------------------------
    // Execution helpers
    // ---------------------------------------------------------------------

    /// Run `f` and attach this operation's name and type to any error.
    pub(crate) fn annotate<T>(
        &self,
        op: &'static str,
        f: impl FnOnce() -> Result<T, InternalError>,
    ) -> Result<T, InternalError> {
        f().map_err(|err| err.with_op(op, E::MODEL.name))
    }

    pub(crate) const fn session(&self) -> &'a DbSession {
        self.session
    }

    pub(crate) fn preflight(&self) -> Result<(), InternalError> {
        match &self.cancel {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }

    pub(crate) fn span(&self, kind: ExecKind) -> Span {
        Span::new(self.session.sink(), kind, E::MODEL.name)
    }

    /// The bound transaction, or a freshly opened owned one.
    pub(crate) fn open(&self, mode: TransactionMode) -> Result<TxHandle<'a>, InternalError> {
        self.session.open_handle(self.tx, mode)
    }

    /// Issue one statement.
    pub(crate) fn run(&self, tx: &mut TxHandle<'_>, query: &str) -> Result<Vec<RawRow>, InternalError> {
        self.session.issue(tx, E::MODEL.name, query)
    }

    /// Commit an owned transaction; bound transactions are left alone.
    pub(crate) fn commit(&self, tx: TxHandle<'_>) -> Result<(), InternalError> {
        if tx.finish()? {
            self.session.sink().record(MetricsEvent::Committed {
                type_name: E::MODEL.name,
            });
            self.session.debug_log(format!("{} committed", E::MODEL.name));
        }

        Ok(())
    }

    /// Pre-flight check, then one statement in a read transaction.
    pub(crate) fn read(&self, query: &str) -> Result<Vec<RawRow>, InternalError> {
        self.preflight()?;
        let mut tx = self.open(TransactionMode::Read)?;

        self.run(&mut tx, query)
    }

    pub(crate) fn hydrate_rows(rows: Vec<RawRow>) -> Result<Vec<E>, InternalError> {
        rows.into_iter()
            .map(|raw| E::hydrate(&normalize_row(raw)))
            .collect()
    }

    /// Read and hydrate, recording a load span.
    pub(crate) fn load(&self, query: &str) -> Result<Vec<E>, InternalError> {
        let mut span = self.span(ExecKind::Load);
        let rows = Self::hydrate_rows(self.read(query)?)?;
        span.set_rows(rows.len() as u64);

        Ok(rows)
    }

    fn load_labelled(&self, query: &str) -> Result<Vec<(E, String)>, InternalError> {
        let mut span = self.span(ExecKind::Load);
        let rows = self
            .read(query)?
            .into_iter()
            .map(|raw| {
                let row: Row = normalize_row(raw);
                let label = row.type_label().map(str::to_string).ok_or_else(|| {
                    InternalError::response_invariant("polymorphic row carries no type label")
                })?;

                Ok((E::hydrate(&row)?, label))
            })
            .collect::<Result<Vec<_>, InternalError>>()?;
        span.set_rows(rows.len() as u64);

        Ok(rows)
    }
}
