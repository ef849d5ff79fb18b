//! Module: db::mutation
//! Responsibility: single and batched insert/update/put/delete, each compiled
//! to as few statements as possible and run in one transaction.
//! Does not own: query text for reads (see `db::query`).

mod script;


use crate::{
    db::{
        driver::TransactionMode,
        manager::{Manager, VAR},
        response::{extract_id, normalize_row},
        strategy::fetch_id_only,
        tx::TxHandle,
    },
    error::{ErrorOrigin, InternalError},
    obs::sink::ExecKind,
    traits::{Model, ModelValue},
};

// re-exports
pub use script::{UpdateScript, UpdateSet};

///
/// DeleteOptions
///
/// `strict` deletes verify the instance exists first and fail with a
/// not-found error when it does not. Non-strict deletes of a missing
/// instance succeed silently.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DeleteOptions {
    pub strict: bool,
}

impl DeleteOptions {
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict: true }
    }

    #[must_use]
    pub const fn lenient() -> Self {
        Self { strict: false }
    }
}

///
/// BatchItem
///
/// Element of a batch call. Plain instances are always present; `Option`
/// elements let callers pass sparse input, and an absent element fails the
/// whole batch during validation.
///

pub trait BatchItem<E> {
    fn instance(&self) -> Option<&E>;

    fn instance_mut(&mut self) -> Option<&mut E>;
}

impl<E: Model> BatchItem<E> for E {
    fn instance(&self) -> Option<&E> {
        Some(self)
    }

    fn instance_mut(&mut self) -> Option<&mut E> {
        Some(self)
    }
}

impl<E: Model> BatchItem<E> for Option<E> {
    fn instance(&self) -> Option<&E> {
        self.as_ref()
    }

    fn instance_mut(&mut self) -> Option<&mut E> {
        self.as_mut()
    }
}

impl<E: Model> Manager<'_, E> {
    // ---------------------------------------------------------------------
    // Single instance
    // ---------------------------------------------------------------------

    /// Insert `instance` and record its new id. The id is projected by the
    /// insert statement itself, so this is one round trip.
    pub fn insert(&self, instance: &mut E) -> Result<(), InternalError> {
        self.annotate("insert", || {
            let mut span = self.span(ExecKind::Insert);
            self.preflight()?;

            let mut tx = self.open(TransactionMode::Write)?;
            self.insert_in(&mut tx, instance, VAR)?;
            self.commit(tx)?;
            span.set_rows(1);

            Ok(())
        })
    }

    /// Rewrite every non-key attribute of `instance` in one statement.
    pub fn update(&self, instance: &E) -> Result<(), InternalError> {
        self.annotate("update", || {
            require_id(instance)?;
            let mut span = self.span(ExecKind::Update);
            self.preflight()?;

            let mut tx = self.open(TransactionMode::Write)?;
            self.update_in(&mut tx, instance)?;
            self.commit(tx)?;
            span.set_rows(1);

            Ok(())
        })
    }

    /// Insert `instance` unless an identical one exists. For types with key
    /// attributes the id is looked up by key in the same transaction.
    pub fn put(&self, instance: &mut E) -> Result<(), InternalError> {
        self.annotate("put", || {
            let mut span = self.span(ExecKind::Put);
            self.preflight()?;

            let mut tx = self.open(TransactionMode::Write)?;
            self.put_in(&mut tx, instance, VAR)?;
            self.commit(tx)?;
            span.set_rows(1);

            Ok(())
        })
    }

    /// Delete by id using the session's default delete mode.
    pub fn delete(&self, instance: &E) -> Result<(), InternalError> {
        self.delete_with(instance, self.default_delete_options())
    }

    pub fn delete_with(&self, instance: &E, options: DeleteOptions) -> Result<(), InternalError> {
        self.annotate("delete", || {
            let id = require_id(instance)?;
            let mut span = self.span(ExecKind::Delete);
            self.preflight()?;

            let mut tx = self.open(TransactionMode::Write)?;
            if options.strict {
                self.ensure_exists(&mut tx, id)?;
            }
            self.delete_in(&mut tx, id)?;
            self.commit(tx)?;
            span.set_rows(1);

            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Batches
    //
    // Every element is validated before the first statement; a failing
    // element is reported by index. All statements share one transaction.
    // ---------------------------------------------------------------------

    pub fn insert_many<I: BatchItem<E>>(&self, items: &mut [I]) -> Result<(), InternalError> {
        self.annotate("insert_many", || {
            validate_batch::<E, I>(items, false)?;
            if items.is_empty() {
                return Ok(());
            }

            let mut span = self.span(ExecKind::Insert);
            self.preflight()?;

            let mut tx = self.open(TransactionMode::Write)?;
            for (i, item) in items.iter_mut().enumerate() {
                let Some(instance) = item.instance_mut() else {
                    continue;
                };
                self.insert_in(&mut tx, instance, &format!("{VAR}{i}"))
                    .map_err(|err| err.at_index(i))?;
            }
            self.commit(tx)?;
            span.set_rows(items.len() as u64);

            Ok(())
        })
    }

    pub fn update_many<I: BatchItem<E>>(&self, items: &[I]) -> Result<(), InternalError> {
        self.annotate("update_many", || {
            validate_batch::<E, I>(items, true)?;
            if items.is_empty() {
                return Ok(());
            }

            let mut span = self.span(ExecKind::Update);
            self.preflight()?;

            let mut tx = self.open(TransactionMode::Write)?;
            for (i, instance) in items.iter().filter_map(|item| item.instance()).enumerate() {
                self.update_in(&mut tx, instance)
                    .map_err(|err| err.at_index(i))?;
            }
            self.commit(tx)?;
            span.set_rows(items.len() as u64);

            Ok(())
        })
    }

    pub fn put_many<I: BatchItem<E>>(&self, items: &mut [I]) -> Result<(), InternalError> {
        self.annotate("put_many", || {
            validate_batch::<E, I>(items, false)?;
            if items.is_empty() {
                return Ok(());
            }

            let mut span = self.span(ExecKind::Put);
            self.preflight()?;

            let mut tx = self.open(TransactionMode::Write)?;
            for (i, item) in items.iter_mut().enumerate() {
                let Some(instance) = item.instance_mut() else {
                    continue;
                };
                self.put_in(&mut tx, instance, &format!("{VAR}{i}"))
                    .map_err(|err| err.at_index(i))?;
            }
            self.commit(tx)?;
            span.set_rows(items.len() as u64);

            Ok(())
        })
    }

    /// Delete a batch using the session's default delete mode.
    pub fn delete_many<I: BatchItem<E>>(&self, items: &[I]) -> Result<(), InternalError> {
        self.delete_many_with(items, self.default_delete_options())
    }

    /// In strict mode every element is checked for existence before any
    /// delete statement is issued.
    pub fn delete_many_with<I: BatchItem<E>>(
        &self,
        items: &[I],
        options: DeleteOptions,
    ) -> Result<(), InternalError> {
        self.annotate("delete_many", || {
            validate_batch::<E, I>(items, true)?;
            if items.is_empty() {
                return Ok(());
            }

            let ids = items
                .iter()
                .filter_map(|item| item.instance())
                .filter_map(ModelValue::id)
                .collect::<Vec<_>>();

            let mut span = self.span(ExecKind::Delete);
            self.preflight()?;

            let mut tx = self.open(TransactionMode::Write)?;
            if options.strict {
                for (i, id) in ids.iter().enumerate() {
                    self.ensure_exists(&mut tx, id)
                        .map_err(|err| err.at_index(i))?;
                }
            }
            for (i, id) in ids.iter().enumerate() {
                self.delete_in(&mut tx, id).map_err(|err| err.at_index(i))?;
            }
            self.commit(tx)?;
            span.set_rows(ids.len() as u64);

            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn default_delete_options(&self) -> DeleteOptions {
        DeleteOptions {
            strict: self.session().config().strict_delete,
        }
    }

    fn insert_in(&self, tx: &mut TxHandle<'_>, instance: &mut E, var: &str) -> Result<(), InternalError> {
        let query = format!(
            "{}\n{}",
            self.strategy().build_insert(&*instance, var),
            fetch_id_only(var)
        );
        let rows = self.run(tx, &query)?;

        if let Some(id) = rows.first().and_then(extract_id) {
            instance.set_id(id);
        }

        Ok(())
    }

    fn update_in(&self, tx: &mut TxHandle<'_>, instance: &E) -> Result<(), InternalError> {
        let id = require_id(instance)?;
        let head = self.strategy().build_match_by_id(E::MODEL, id, VAR);

        // key-only types have nothing to rewrite
        if let Some(script) = UpdateScript::for_instance(instance, VAR).render(&head) {
            self.run(tx, &script)?;
        }

        Ok(())
    }

    fn put_in(&self, tx: &mut TxHandle<'_>, instance: &mut E, var: &str) -> Result<(), InternalError> {
        self.run(tx, &self.strategy().build_put(&*instance, var))?;

        if E::MODEL.has_keys() {
            let lookup = format!(
                "{}\n{}",
                self.strategy().build_match_by_key(&*instance, VAR),
                fetch_id_only(VAR)
            );
            let rows = self.run(tx, &lookup)?;

            if let [row] = rows.as_slice()
                && let Some(id) = extract_id(row)
            {
                instance.set_id(id);
            }
        }

        Ok(())
    }

    fn ensure_exists(&self, tx: &mut TxHandle<'_>, id: &str) -> Result<(), InternalError> {
        let query = format!(
            "{}\nreduce $count = count(${VAR});",
            self.strategy().build_match_by_id(E::MODEL, id, VAR)
        );
        let count = self
            .run(tx, &query)?
            .into_iter()
            .next()
            .and_then(|raw| normalize_row(raw).int("count"))
            .unwrap_or(0);

        if count == 0 {
            return Err(InternalError::not_found(format!(
                "no {} with id {id}",
                E::MODEL.name
            )));
        }

        Ok(())
    }

    fn delete_in(&self, tx: &mut TxHandle<'_>, id: &str) -> Result<(), InternalError> {
        let query = format!(
            "{}\ndelete\n${VAR};",
            self.strategy().build_match_by_id(E::MODEL, id, VAR)
        );
        self.run(tx, &query)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------

fn require_id<E: Model>(instance: &E) -> Result<&str, InternalError> {
    instance.id().filter(|id| !id.is_empty()).ok_or_else(|| {
        InternalError::validation(ErrorOrigin::Mutation, "instance has no id")
    })
}

fn validate_batch<E: Model, I: BatchItem<E>>(items: &[I], need_id: bool) -> Result<(), InternalError> {
    for (i, item) in items.iter().enumerate() {
        let Some(instance) = item.instance() else {
            return Err(
                InternalError::validation(ErrorOrigin::Mutation, "batch element is absent")
                    .at_index(i),
            );
        };
        if need_id {
            require_id(instance).map_err(|err| err.at_index(i))?;
        }
    }

    Ok(())
}
