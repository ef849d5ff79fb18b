use crate::{
    db::{
        DbSession,
        cancel::CancelToken,
        driver::TransactionMode,
        response::{Row, normalize_row},
        tx::TxContext,
    },
    error::InternalError,
    value::{Value, format},
};

/// Label function calls are logged and counted under.
const FUNCTION_LABEL: &str = "function";

///
/// FunctionQuery
///
/// Call of a schema-defined function. Arguments are either formatted
/// literals or raw expressions such as variable references.
///

pub struct FunctionQuery<'a> {
    session: &'a DbSession,
    tx: Option<&'a TxContext>,
    cancel: Option<CancelToken>,
    name: String,
    args: Vec<String>,
}

impl<'a> FunctionQuery<'a> {
    pub(crate) fn new(session: &'a DbSession, tx: Option<&'a TxContext>, name: &str) -> Self {
        Self {
            session,
            tx,
            cancel: None,
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(format(&value.into()));
        self
    }

    #[must_use]
    pub fn arg_raw(mut self, expr: impl Into<String>) -> Self {
        self.args.push(expr.into());
        self
    }

    /// Check `token` before the call is issued.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn build(&self) -> String {
        format!(
            "match\nlet $result = {}({});",
            self.name,
            self.args.join(", ")
        )
    }

    /// Run in a read transaction (or the bound one); each row carries the
    /// `result` binding.
    pub fn execute(&self) -> Result<Vec<Row>, InternalError> {
        self.call()
            .map_err(|err| err.with_op(FUNCTION_LABEL, self.name.clone()))
    }

    fn call(&self) -> Result<Vec<Row>, InternalError> {
        if let Some(token) = &self.cancel {
            token.check()?;
        }

        let mut tx = self.session.open_handle(self.tx, TransactionMode::Read)?;
        let rows = self.session.issue(&mut tx, FUNCTION_LABEL, &self.build())?;

        Ok(rows.into_iter().map(normalize_row).collect())
    }
}
