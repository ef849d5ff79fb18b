//! Module: query::fluent
//! Responsibility: fluent query builder and execution routing.
//! Does not own: text compilation (see `QuerySpec`) or transaction lifecycle.

use crate::{
    db::{
        driver::TransactionMode,
        filter::Filter,
        manager::{Manager, VAR},
        mutation::{UpdateScript, UpdateSet},
        query::{AggregateFn, AggregateSpec, GroupByQuery, OrderDirection, QuerySpec, RowCount},
        response::normalize_row,
    },
    error::{ErrorOrigin, InternalError},
    obs::sink::ExecKind,
    traits::Model,
};
use std::collections::BTreeMap;

///
/// Query
///
/// Manager-bound query. Builders are pure; terminals compile the intent and
/// run it. Count, aggregate, delete, and bulk update ignore sort keys and
/// pagination.
///

pub struct Query<'a, E: Model> {
    manager: Manager<'a, E>,
    spec: QuerySpec,
}

impl<'a, E: Model> Query<'a, E> {
    pub(crate) const fn new(manager: Manager<'a, E>) -> Self {
        Self {
            manager,
            spec: QuerySpec::new(E::MODEL),
        }
    }

    #[must_use]
    pub const fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    // ------------------------------------------------------------------
    // Intent builders (pure)
    // ------------------------------------------------------------------

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.spec.push_filter(filter);
        self
    }

    /// Append several filters; they combine conjunctively with earlier ones.
    #[must_use]
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        for filter in filters {
            self.spec.push_filter(filter);
        }
        self
    }

    #[must_use]
    pub fn order_asc(mut self, attr: impl Into<String>) -> Self {
        self.spec.push_order(attr, OrderDirection::Asc);
        self
    }

    #[must_use]
    pub fn order_desc(mut self, attr: impl Into<String>) -> Self {
        self.spec.push_order(attr, OrderDirection::Desc);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.spec.set_limit(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.spec.set_offset(offset);
        self
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn execute(&self) -> Result<Vec<E>, InternalError> {
        self.manager.annotate("execute", || {
            self.spec.check_order()?;
            self.manager
                .load(&self.spec.read_query(self.manager.strategy(), VAR))
        })
    }

    pub fn all(&self) -> Result<Vec<E>, InternalError> {
        self.execute()
    }

    /// First match under the current sort keys, or `None`.
    pub fn first(&self) -> Result<Option<E>, InternalError> {
        self.manager.annotate("first", || {
            self.spec.check_order()?;
            let mut spec = self.spec.clone();
            spec.set_limit(1);

            Ok(self
                .manager
                .load(&spec.read_query(self.manager.strategy(), VAR))?
                .into_iter()
                .next())
        })
    }

    pub fn count(&self) -> Result<u64, InternalError> {
        self.manager.annotate("count", || {
            let _span = self.manager.span(ExecKind::Count);
            let rows = self.manager.read(&self.spec.count_query(VAR))?;

            let Some(raw) = rows.into_iter().next() else {
                return Ok(0);
            };
            let count = normalize_row(raw).int("count").ok_or_else(|| {
                InternalError::response_invariant("count reduce returned no 'count' value")
            })?;

            Ok(u64::try_from(count).unwrap_or(0))
        })
    }

    pub fn exists(&self) -> Result<bool, InternalError> {
        Ok(self.count()? > 0)
    }

    // ------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------

    pub fn sum(&self, attr: &str) -> Result<Option<f64>, InternalError> {
        self.aggregate_one(AggregateFn::Sum, attr)
    }

    pub fn avg(&self, attr: &str) -> Result<Option<f64>, InternalError> {
        self.aggregate_one(AggregateFn::Mean, attr)
    }

    pub fn min(&self, attr: &str) -> Result<Option<f64>, InternalError> {
        self.aggregate_one(AggregateFn::Min, attr)
    }

    pub fn max(&self, attr: &str) -> Result<Option<f64>, InternalError> {
        self.aggregate_one(AggregateFn::Max, attr)
    }

    pub fn median(&self, attr: &str) -> Result<Option<f64>, InternalError> {
        self.aggregate_one(AggregateFn::Median, attr)
    }

    pub fn std(&self, attr: &str) -> Result<Option<f64>, InternalError> {
        self.aggregate_one(AggregateFn::Std, attr)
    }

    pub fn variance(&self, attr: &str) -> Result<Option<f64>, InternalError> {
        self.aggregate_one(AggregateFn::Variance, attr)
    }

    // `None` when nothing matched or the reduce produced an empty value.
    fn aggregate_one(&self, func: AggregateFn, attr: &str) -> Result<Option<f64>, InternalError> {
        self.manager.annotate(func.name(), || {
            let spec = AggregateSpec::new(func, attr);
            self.spec.check_aggregate(&spec)?;

            let _span = self.manager.span(ExecKind::Aggregate);
            let query = self.spec.aggregate_query(&spec, VAR);
            let rows = self.manager.read(&query)?;

            Ok(rows
                .into_iter()
                .next()
                .and_then(|raw| normalize_row(raw).float("result")))
        })
    }

    /// Every spec in one round trip, keyed `{function}_{attribute}`.
    /// Specs whose slot comes back empty are omitted.
    pub fn aggregate(&self, specs: &[AggregateSpec]) -> Result<BTreeMap<String, f64>, InternalError> {
        self.manager.annotate("aggregate", || {
            for spec in specs {
                self.spec.check_aggregate(spec)?;
            }
            if specs.is_empty() {
                return Ok(BTreeMap::new());
            }

            let _span = self.manager.span(ExecKind::Aggregate);
            let rows = self
                .manager
                .read(&self.spec.multi_aggregate_query(specs, VAR))?;
            let Some(raw) = rows.into_iter().next() else {
                return Ok(BTreeMap::new());
            };

            let row = normalize_row(raw);
            Ok(specs
                .iter()
                .enumerate()
                .filter_map(|(i, spec)| row.float(&format!("result{i}")).map(|v| (spec.key(), v)))
                .collect())
        })
    }

    #[must_use]
    pub fn group_by(self, attr: impl Into<String>) -> GroupByQuery<'a, E> {
        GroupByQuery::new(self.manager, self.spec, attr.into())
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Delete every match. The statement reports no count.
    pub fn delete(&self) -> Result<RowCount, InternalError> {
        self.manager.annotate("query_delete", || {
            let _span = self.manager.span(ExecKind::Delete);
            self.manager.preflight()?;

            let mut tx = self.manager.open(TransactionMode::Write)?;
            self.manager.run(&mut tx, &self.spec.delete_query(VAR))?;
            self.manager.commit(tx)?;

            Ok(RowCount::Unknown)
        })
    }

    /// Fetch every match, apply `f` to each in memory, and write each back,
    /// all in one write transaction that commits once.
    ///
    /// Returns `None` when nothing matched, as distinct from updating zero rows.
    pub fn update_with(&self, mut f: impl FnMut(&mut E)) -> Result<Option<Vec<E>>, InternalError> {
        self.manager.annotate("update_with", || {
            self.spec.check_order()?;
            let mut span = self.manager.span(ExecKind::Update);
            self.manager.preflight()?;

            let mut tx = self.manager.open(TransactionMode::Write)?;
            let fetch = self.spec.read_query(self.manager.strategy(), VAR);
            let mut instances = Manager::<E>::hydrate_rows(self.manager.run(&mut tx, &fetch)?)?;
            if instances.is_empty() {
                return Ok(None);
            }

            for instance in &mut instances {
                f(instance);
            }

            for (i, instance) in instances.iter().enumerate() {
                let Some(id) = instance.id() else {
                    return Err(InternalError::validation(
                        ErrorOrigin::Mutation,
                        "hydrated instance carries no id",
                    )
                    .at_index(i));
                };

                let head = self.manager.strategy().build_match_by_id(E::MODEL, id, VAR);
                if let Some(script) = UpdateScript::for_instance(instance, VAR).render(&head) {
                    self.manager
                        .run(&mut tx, &script)
                        .map_err(|err| err.at_index(i))?;
                }
            }

            self.manager.commit(tx)?;
            span.set_rows(instances.len() as u64);

            Ok(Some(instances))
        })
    }

    /// Replace or clear attributes on every match in one statement.
    pub fn update(&self, set: &UpdateSet) -> Result<RowCount, InternalError> {
        self.manager.annotate("bulk_update", || {
            let Some(query) = self.spec.update_query(set, VAR) else {
                return Ok(RowCount::Known(0));
            };

            let _span = self.manager.span(ExecKind::Update);
            self.manager.preflight()?;

            let mut tx = self.manager.open(TransactionMode::Write)?;
            self.manager.run(&mut tx, &query)?;
            self.manager.commit(tx)?;

            Ok(RowCount::Unknown)
        })
    }
}
