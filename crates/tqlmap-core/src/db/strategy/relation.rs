use crate::{
    db::{
        filter::sanitize_var,
        strategy::{fetch_clause, fetch_items, has_constraints, id_item},
    },
    model::{ModelRegistry, TypeModel},
    traits::ModelValue,
};

// Role players are matched first: by id when known, otherwise by their key
// attributes, so writing a relation never creates a duplicate player.
fn player_match(player: &dyn ModelValue, player_var: &str) -> String {
    let model = player.model();

    if let Some(id) = player.id() {
        return format!("${player_var} isa {}, iid {id};", model.name);
    }

    let mut parts = vec![format!("${player_var} isa {}", model.name)];
    parts.extend(has_constraints(player, |a| a.key));

    format!("{};", parts.join(", "))
}

struct RoleBindings {
    matches: Vec<String>,
    links: Vec<String>,
}

fn role_bindings(instance: &dyn ModelValue) -> RoleBindings {
    let mut bindings = RoleBindings {
        matches: Vec::new(),
        links: Vec::new(),
    };

    for role in instance.model().roles {
        let Some(player) = instance.role_player(role.name) else {
            continue;
        };
        let player_var = sanitize_var(role.name);
        bindings.matches.push(player_match(player, &player_var));
        bindings.links.push(format!("{}: ${player_var}", role.name));
    }

    bindings
}

fn relation_head(model: &TypeModel, var: &str, links: &[String]) -> String {
    if links.is_empty() {
        format!("${var} isa {}", model.name)
    } else {
        format!("${var} isa {}, links ({})", model.name, links.join(", "))
    }
}

pub(super) fn write(instance: &dyn ModelValue, var: &str, keyword: &str) -> String {
    let RoleBindings { matches, links } = role_bindings(instance);

    let mut parts = vec![relation_head(instance.model(), var, &links)];
    parts.extend(has_constraints(instance, |_| true));
    let body = format!("{keyword}\n{};", parts.join(", "));

    if matches.is_empty() {
        body
    } else {
        format!("match\n{}\n{body}", matches.join("\n"))
    }
}

pub(super) fn match_by_key(instance: &dyn ModelValue, var: &str) -> String {
    let model = instance.model();

    if let Some(id) = instance.id() {
        return format!("match\n${var} isa {}, iid {id};", model.name);
    }

    let RoleBindings {
        mut matches,
        links,
    } = role_bindings(instance);

    let mut parts = vec![relation_head(model, var, &links)];
    parts.extend(has_constraints(instance, |a| a.key));
    matches.push(format!("{};", parts.join(", ")));

    format!("match\n{}", matches.join("\n"))
}

pub(super) fn fetch_with_roles(
    model: &TypeModel,
    registry: &ModelRegistry,
    var: &str,
) -> (Vec<String>, String) {
    let mut matches = Vec::with_capacity(model.roles.len());
    let mut items = fetch_items(model.attributes.iter(), var);

    for role in model.roles {
        let player_var = sanitize_var(role.name);
        matches.push(format!("${var} links ({}: ${player_var});", role.name));

        let nested = match registry.get(role.player) {
            Some(player) => fetch_items(player.attributes.iter(), &player_var),
            None => vec![id_item(&player_var)],
        };
        items.push(format!("\"{}\": {{ {} }}", role.name, nested.join(", ")));
    }

    (matches, fetch_clause(&items))
}
