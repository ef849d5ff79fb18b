use crate::{db::strategy::has_constraints, traits::ModelValue};

/// `insert` / `put` of one entity: an `isa` statement followed by one `has`
/// statement per present value.
pub(super) fn write(instance: &dyn ModelValue, var: &str, keyword: &str) -> String {
    let model = instance.model();

    let mut statements = vec![format!("${var} isa {}", model.name)];
    statements.extend(
        has_constraints(instance, |_| true)
            .into_iter()
            .map(|has| format!("${var} {has}")),
    );

    format!("{keyword}\n{};", statements.join(";\n"))
}

pub(super) fn match_by_key(instance: &dyn ModelValue, var: &str) -> String {
    let mut parts = vec![format!("${var} isa {}", instance.model().name)];
    parts.extend(has_constraints(instance, |a| a.key));

    format!("match\n{};", parts.join(", "))
}
