use crate::{
    db::{
        filter::attr_var,
        manager::{Manager, VAR},
        query::QuerySpec,
        response::normalize_row,
    },
    error::InternalError,
    obs::sink::ExecKind,
    traits::Model,
};
use std::{collections::BTreeMap, fmt};

///
/// AggregateFn
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AggregateFn {
    Sum,
    Mean,
    Min,
    Max,
    Median,
    Std,
    Variance,
    Count,
}

impl AggregateFn {
    /// Reduce function name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Min => "min",
            Self::Max => "max",
            Self::Median => "median",
            Self::Std => "std",
            Self::Variance => "variance",
            Self::Count => "count",
        }
    }

    /// Parse a function name; `avg` is accepted for `mean`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let func = match name {
            "sum" => Self::Sum,
            "mean" | "avg" => Self::Mean,
            "min" => Self::Min,
            "max" => Self::Max,
            "median" => Self::Median,
            "std" => Self::Std,
            "variance" => Self::Variance,
            "count" => Self::Count,
            _ => return None,
        };

        Some(func)
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

///
/// AggregateSpec
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AggregateSpec {
    pub attr: String,
    pub func: AggregateFn,
}

impl AggregateSpec {
    #[must_use]
    pub fn new(func: AggregateFn, attr: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            func,
        }
    }

    #[must_use]
    pub fn sum(attr: impl Into<String>) -> Self {
        Self::new(AggregateFn::Sum, attr)
    }

    #[must_use]
    pub fn mean(attr: impl Into<String>) -> Self {
        Self::new(AggregateFn::Mean, attr)
    }

    #[must_use]
    pub fn min(attr: impl Into<String>) -> Self {
        Self::new(AggregateFn::Min, attr)
    }

    #[must_use]
    pub fn max(attr: impl Into<String>) -> Self {
        Self::new(AggregateFn::Max, attr)
    }

    #[must_use]
    pub fn count(attr: impl Into<String>) -> Self {
        Self::new(AggregateFn::Count, attr)
    }

    /// Result key, `{function}_{attribute}`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}_{}", self.func.name(), self.attr)
    }
}

///
/// GroupByQuery
///
/// Per-group aggregates over a filtered query. Returned by `Query::group_by`.
///

pub struct GroupByQuery<'a, E: Model> {
    manager: Manager<'a, E>,
    spec: QuerySpec,
    attr: String,
}

impl<'a, E: Model> GroupByQuery<'a, E> {
    pub(crate) const fn new(manager: Manager<'a, E>, spec: QuerySpec, attr: String) -> Self {
        Self {
            manager,
            spec,
            attr,
        }
    }

    /// Group value (rendered as text) to `{function}_{attribute}` results.
    /// Groups whose slots all come back empty are still listed; repeated
    /// specs share one key.
    pub fn aggregate(
        &self,
        specs: &[AggregateSpec],
    ) -> Result<BTreeMap<String, BTreeMap<String, f64>>, InternalError> {
        self.manager.annotate("group_by", || {
            self.spec.attribute(&self.attr)?;
            for spec in specs {
                self.spec.check_aggregate(spec)?;
            }
            if specs.is_empty() {
                return Ok(BTreeMap::new());
            }

            let mut span = self.manager.span(ExecKind::Aggregate);
            let query = self.spec.group_query(&self.attr, specs, VAR);
            let rows = self.manager.read(&query)?;
            span.set_rows(rows.len() as u64);

            let group_key = attr_var(VAR, &self.attr);
            let mut groups = BTreeMap::new();
            for raw in rows {
                let row = normalize_row(raw);
                let Some(group) = row.get(&group_key).filter(|c| !c.is_null()) else {
                    return Err(InternalError::response_invariant(format!(
                        "group row carries no value for '{}'",
                        self.attr
                    )));
                };

                let results = specs
                    .iter()
                    .enumerate()
                    .filter_map(|(i, spec)| row.float(&format!("result{i}")).map(|v| (spec.key(), v)))
                    .collect();
                groups.insert(group.render(), results);
            }

            Ok(groups)
        })
    }
}
