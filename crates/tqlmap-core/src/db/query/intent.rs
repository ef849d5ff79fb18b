use crate::{
    db::{
        filter::{Filter, attr_var},
        mutation::{UpdateScript, UpdateSet},
        query::{AggregateFn, AggregateSpec, OrderDirection, OrderSpec},
        strategy::ModelStrategy,
    },
    error::{ErrorOrigin, InternalError},
    model::{AttributeModel, TypeModel},
};

///
/// QuerySpec
///
/// Query intent for one type: conjunctive filters, ordered sort keys, and
/// optional pagination. Every `*_query` method compiles fresh text; the
/// filter compiler draws new scope numbers on each call.
///

#[derive(Clone, Debug)]
pub struct QuerySpec {
    model: &'static TypeModel,
    filters: Vec<Filter>,
    order: Vec<OrderSpec>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl QuerySpec {
    #[must_use]
    pub const fn new(model: &'static TypeModel) -> Self {
        Self {
            model,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    // ------------------------------------------------------------------
    // Intent
    // ------------------------------------------------------------------

    pub fn push_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn push_order(&mut self, attr: impl Into<String>, direction: OrderDirection) {
        self.order.push(OrderSpec {
            attr: attr.into(),
            direction,
        });
    }

    pub const fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    pub const fn set_offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    #[must_use]
    pub const fn model(&self) -> &'static TypeModel {
        self.model
    }

    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    #[must_use]
    pub fn order(&self) -> &[OrderSpec] {
        &self.order
    }

    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Descriptor of `attr`, or a validation fault when the type does not
    /// declare it.
    pub fn attribute(&self, attr: &str) -> Result<&'static AttributeModel, InternalError> {
        self.model.attribute(attr).ok_or_else(|| {
            InternalError::validation(
                ErrorOrigin::Query,
                format!("attribute '{attr}' is not declared on {}", self.model.name),
            )
        })
    }

    /// Every sort key names a declared attribute.
    pub fn check_order(&self) -> Result<(), InternalError> {
        for OrderSpec { attr, .. } in &self.order {
            self.attribute(attr)?;
        }

        Ok(())
    }

    /// Declared attribute, and numeric unless the function is `count`.
    pub fn check_aggregate(&self, spec: &AggregateSpec) -> Result<(), InternalError> {
        let attribute = self.attribute(&spec.attr)?;
        if spec.func != AggregateFn::Count && !attribute.kind.is_numeric() {
            return Err(InternalError::query_unsupported(format!(
                "{} over non-numeric attribute '{}'",
                spec.func.name(),
                spec.attr
            )));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    /// `$var isa T;` followed by every filter's fragments, in call order.
    #[must_use]
    pub fn match_lines(&self, var: &str) -> Vec<String> {
        let mut lines = vec![format!("${var} isa {};", self.model.name)];
        for filter in &self.filters {
            lines.extend(filter.compile(var));
        }

        lines
    }

    /// Match + sort + offset + limit + fetch.
    #[must_use]
    pub fn read_query(&self, strategy: ModelStrategy, var: &str) -> String {
        let mut lines = self.match_lines(var);

        let mut keys = Vec::with_capacity(self.order.len());
        for OrderSpec { attr, direction } in &self.order {
            let v = bind_attr(&mut lines, var, attr);
            keys.push(format!("${v} {}", direction.as_str()));
        }

        let mut parts = vec![format!("match\n{}", lines.join("\n"))];
        if !keys.is_empty() {
            parts.push(format!("sort {};", keys.join(", ")));
        }
        if let Some(offset) = self.offset {
            parts.push(format!("offset {offset};"));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("limit {limit};"));
        }
        parts.push(strategy.build_fetch_all(self.model, var));

        parts.join("\n")
    }

    /// Match + count reduce. Sort keys and pagination do not apply.
    #[must_use]
    pub fn count_query(&self, var: &str) -> String {
        format!(
            "match\n{}\nreduce $count = count(${var});",
            self.match_lines(var).join("\n")
        )
    }

    /// Match + delete of every matched instance.
    #[must_use]
    pub fn delete_query(&self, var: &str) -> String {
        format!("match\n{}\ndelete\n${var};", self.match_lines(var).join("\n"))
    }

    /// Single reduce slot `$result` over one aggregate.
    #[must_use]
    pub fn aggregate_query(&self, spec: &AggregateSpec, var: &str) -> String {
        let mut lines = self.match_lines(var);
        let v = bind_attr(&mut lines, var, &spec.attr);

        format!(
            "match\n{}\nreduce $result = {}(${v});",
            lines.join("\n"),
            spec.func.name()
        )
    }

    /// One reduce clause with slots `$result0..` in spec order.
    #[must_use]
    pub fn multi_aggregate_query(&self, specs: &[AggregateSpec], var: &str) -> String {
        let mut lines = self.match_lines(var);
        let mut slots = Vec::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            let v = bind_attr(&mut lines, var, &spec.attr);
            slots.push(format!("$result{i} = {}(${v})", spec.func.name()));
        }

        format!("match\n{}\nreduce {};", lines.join("\n"), slots.join(", "))
    }

    /// One reduce slot `$result{i}` per spec, grouped by the binding of
    /// `group_attr`. Slots are positional so repeated keys never clash.
    #[must_use]
    pub fn group_query(&self, group_attr: &str, specs: &[AggregateSpec], var: &str) -> String {
        let mut lines = self.match_lines(var);
        let group_var = bind_attr(&mut lines, var, group_attr);

        let slots = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let v = bind_attr(&mut lines, var, &spec.attr);
                format!("$result{i} = {}(${v})", spec.func.name())
            })
            .collect::<Vec<_>>();

        format!(
            "match\n{}\nreduce {} groupby ${group_var};",
            lines.join("\n"),
            slots.join(", ")
        )
    }

    /// Bulk replace across every matched instance, or `None` when `set` is empty.
    #[must_use]
    pub fn update_query(&self, set: &UpdateSet, var: &str) -> Option<String> {
        let script = UpdateScript::for_set(set, var);
        if script.is_empty() {
            return None;
        }

        script.render(&format!("match\n{}", self.match_lines(var).join("\n")))
    }
}

// Bind `attr` on `$var` unless a filter already did; returns the variable name.
fn bind_attr(lines: &mut Vec<String>, var: &str, attr: &str) -> String {
    let v = attr_var(var, attr);
    let binding = format!("${var} has {attr} ${v};");
    if !lines.contains(&binding) {
        lines.push(binding);
    }

    v
}
