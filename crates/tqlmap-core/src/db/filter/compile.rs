use crate::{
    db::filter::{Conjunction, Filter},
    value::{Value, format},
};
use std::sync::atomic::{AtomicU64, Ordering};

/// An iid no instance can have; matching it makes a pattern unsatisfiable.
pub const CONTRADICTION_IID: &str = "0xFFFFFFFFFFFFFFFF";

// Monotonic for the life of the process, never reset.
static SCOPE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Reserve `count` consecutive scope numbers and return the first one.
fn reserve_scopes(count: usize) -> u64 {
    SCOPE_COUNTER.fetch_add(count as u64, Ordering::Relaxed) + 1
}

/// TypeQL variables cannot contain hyphens.
#[must_use]
pub fn sanitize_var(name: &str) -> String {
    name.replace('-', "_")
}

/// Attribute-binding variable name (without `$`) for `attr` owned by `var`.
#[must_use]
pub fn attr_var(var: &str, attr: &str) -> String {
    sanitize_var(&format!("{var}__{attr}"))
}

///
/// Scope
///
/// `var` is the instance variable patterns hang off; `base` prefixes the
/// attribute variables bound in this scope. They only differ inside OR
/// alternatives and NOT blocks.
///

struct Scope {
    var: String,
    base: String,
}

impl Scope {
    fn root(var: &str) -> Self {
        Self {
            var: var.to_string(),
            base: var.to_string(),
        }
    }

    fn branch(&self, suffix: &str, n: u64) -> Self {
        Self {
            var: self.var.clone(),
            base: format!("{}_{suffix}{n}", self.var),
        }
    }

    fn attr_var(&self, attr: &str) -> String {
        attr_var(&self.base, attr)
    }

    fn binding(&self, attr: &str, attr_var: &str) -> String {
        format!("${} has {attr} ${attr_var};", self.var)
    }

    fn contradiction(&self) -> String {
        format!("${} iid {CONTRADICTION_IID};", self.var)
    }

    // Player variable for a role; scoped branches get their own.
    fn player_var(&self, role: &str) -> String {
        if self.base == self.var {
            sanitize_var(role)
        } else {
            sanitize_var(&format!("{}_{role}", self.base))
        }
    }

    // Emit a leaf body, wrapped in a freshly scoped NOT block when negated.
    fn leaf(&self, negated: bool, out: &mut Vec<String>, body: impl FnOnce(&Self, &mut Vec<String>)) {
        if negated {
            let scope = self.branch("n", reserve_scopes(1));
            let mut inner = Vec::new();
            body(&scope, &mut inner);
            out.push(not_block(&inner));
        } else {
            body(self, out);
        }
    }
}

fn not_block(fragments: &[String]) -> String {
    format!("not {{ {} }};", fragments.join(" "))
}

impl Filter {
    /// Compile into ordered pattern fragments hanging off `$var`.
    #[must_use]
    pub fn compile(&self, var: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.compile_into(&Scope::root(var), &mut out);

        out
    }

    fn compile_into(&self, scope: &Scope, out: &mut Vec<String>) {
        match self {
            Self::Compare {
                attr,
                op,
                value,
                negated,
            } => scope.leaf(*negated, out, |s, out| {
                let v = s.attr_var(attr);
                out.push(s.binding(attr, &v));
                out.push(format!("${v} {} {};", op.symbol(), format(value)));
            }),

            Self::Text {
                attr,
                op,
                pattern,
                negated,
            } => scope.leaf(*negated, out, |s, out| {
                let v = s.attr_var(attr);
                out.push(s.binding(attr, &v));
                out.push(format!(
                    "${v} {} {};",
                    op.keyword(),
                    format(&Value::Text(pattern.clone()))
                ));
            }),

            Self::Range {
                attr,
                min,
                max,
                negated,
            } => scope.leaf(*negated, out, |s, out| {
                let v = s.attr_var(attr);
                out.push(s.binding(attr, &v));
                out.push(format!("${v} >= {};", format(min)));
                out.push(format!("${v} <= {};", format(max)));
            }),

            Self::In {
                attr,
                values,
                negated,
            } => {
                // x in {} is false; x not in {} is vacuously true
                if values.is_empty() {
                    if !negated {
                        out.push(scope.contradiction());
                    }
                    return;
                }
                scope.leaf(*negated, out, |s, out| {
                    let v = s.attr_var(attr);
                    out.push(s.binding(attr, &v));
                    // one block per value, a single value included
                    let alternatives = values
                        .iter()
                        .map(|value| format!("{{ ${v} == {}; }}", format(value)))
                        .collect::<Vec<_>>();
                    out.push(format!("{};", alternatives.join(" or ")));
                });
            }

            Self::Exists { attr, negated } => scope.leaf(*negated, out, |s, out| {
                let v = format!("{}__", s.attr_var(attr));
                out.push(s.binding(attr, &v));
            }),

            Self::Id(id) => out.push(format!("${} iid {id};", scope.var)),

            Self::And(Conjunction(children)) => {
                for child in children {
                    child.compile_into(scope, out);
                }
            }

            Self::Or(alternatives) => compile_or(alternatives, scope, out),

            Self::Not(child) => {
                let inner_scope = scope.branch("n", reserve_scopes(1));
                let mut inner = Vec::new();
                child.compile_into(&inner_scope, &mut inner);

                if inner.is_empty() {
                    // negating a vacuously true pattern
                    out.push(scope.contradiction());
                } else {
                    out.push(not_block(&inner));
                }
            }

            Self::RolePlayer { role, inner } => {
                let player = scope.player_var(role);
                out.push(format!("${} links ({role}: ${player});", scope.var));
                inner.compile_into(&Scope::root(&player), out);
            }
        }
    }
}

fn compile_or(alternatives: &[Filter], scope: &Scope, out: &mut Vec<String>) {
    match alternatives {
        [] => out.push(scope.contradiction()),
        [only] => only.compile_into(scope, out),
        _ => {
            let first = reserve_scopes(alternatives.len());
            let mut blocks = Vec::with_capacity(alternatives.len());

            for (n, alternative) in (first..).zip(alternatives) {
                let branch = scope.branch("o", n);
                let mut fragments = Vec::new();
                alternative.compile_into(&branch, &mut fragments);

                // one vacuously true alternative makes the whole OR true
                if fragments.is_empty() {
                    return;
                }
                blocks.push(format!("{{ {} }}", fragments.join(" ")));
            }

            out.push(format!("{};", blocks.join(" or ")));
        }
    }
}
