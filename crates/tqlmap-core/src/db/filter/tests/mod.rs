
use super::*;
use std::{collections::BTreeSet, thread};

/// Replace every `_o{N}` / `_n{N}` scope suffix with `_o#` / `_n#`.
pub(super) fn strip_scopes(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let chars: Vec<char> = fragment.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        if c == '_'
            && matches!(chars.get(i + 1), Some('o' | 'n'))
            && chars.get(i + 2).is_some_and(char::is_ascii_digit)
        {
            out.push(chars[i + 1]);
            out.push('#');
            i += 2;
            while chars.get(i).is_some_and(char::is_ascii_digit) {
                i += 1;
            }
            continue;
        }
        i += 1;
    }

    out
}

// Extract the number following `marker` in `s`.
fn scope_after(s: &str, marker: &str) -> u64 {
    let start = s.find(marker).expect("marker present") + marker.len();
    s[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .expect("scope number")
}

// Every scope number (`_o{N}` / `_n{N}`) appearing in `fragment`.
fn scopes_in(fragment: &str) -> BTreeSet<u64> {
    let bytes = fragment.as_bytes();
    let mut scopes = BTreeSet::new();

    for i in 0..bytes.len().saturating_sub(2) {
        if bytes[i] == b'_' && matches!(bytes[i + 1], b'o' | b'n') {
            let digits = fragment[i + 2..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>();
            if let Ok(n) = digits.parse() {
                scopes.insert(n);
            }
        }
    }

    scopes
}

#[test]
fn equality_compiles_to_binding_then_constraint() {
    assert_eq!(
        Filter::eq("name", "Alice").compile("e"),
        vec!["$e has name $e__name;", "$e__name == \"Alice\";"]
    );
}

#[test]
fn ordering_operators_use_their_symbols() {
    assert_eq!(Filter::gt("age", 30).compile("e")[1], "$e__age > 30;");
    assert_eq!(Filter::gte("age", 30).compile("e")[1], "$e__age >= 30;");
    assert_eq!(Filter::lt("age", 30).compile("e")[1], "$e__age < 30;");
    assert_eq!(Filter::lte("age", 30).compile("e")[1], "$e__age <= 30;");
    assert_eq!(Filter::neq("age", 30).compile("e")[1], "$e__age != 30;");
}

#[test]
fn hyphenated_attributes_are_sanitized_in_variables_only() {
    assert_eq!(
        Filter::eq("birth-year", 1990).compile("e"),
        vec!["$e has birth-year $e__birth_year;", "$e__birth_year == 1990;"]
    );
}

#[test]
fn string_matching() {
    assert_eq!(
        Filter::contains("email", "@example").compile("e"),
        vec!["$e has email $e__email;", "$e__email contains \"@example\";"]
    );
    assert_eq!(
        Filter::starts_with("name", "Al").compile("e")[1],
        "$e__name like \"Al.*\";"
    );
    assert_eq!(
        attr("name").like("^A.*e$").compile("e")[1],
        "$e__name like \"^A.*e$\";"
    );
}

#[test]
fn range_is_inclusive_on_both_ends() {
    assert_eq!(
        Filter::range("age", 18, 65).compile("e"),
        vec!["$e has age $e__age;", "$e__age >= 18;", "$e__age <= 65;"]
    );
}

#[test]
fn membership_expands_to_alternatives() {
    assert_eq!(
        Filter::in_list("name", ["a", "b"]).compile("e"),
        vec![
            "$e has name $e__name;",
            "{ $e__name == \"a\"; } or { $e__name == \"b\"; };"
        ]
    );
    assert_eq!(
        Filter::in_list("name", ["a"]).compile("e"),
        vec!["$e has name $e__name;", "{ $e__name == \"a\"; };"]
    );
}

#[test]
fn single_value_non_membership_keeps_the_block_form() {
    let out = Filter::not_in("age", [7]).compile("e");

    assert_eq!(
        strip_scopes(&out[0]),
        "not { $e has age $e_n#__age; { $e_n#__age == 7; }; };"
    );
}

#[test]
fn empty_membership_edge_cases() {
    let none: [i64; 0] = [];

    assert_eq!(
        Filter::in_list("age", none).compile("e"),
        vec![format!("$e iid {CONTRADICTION_IID};")]
    );
    assert!(Filter::not_in("age", none).compile("e").is_empty());
}

#[test]
fn non_membership_wraps_in_scoped_not() {
    let out = Filter::not_in("age", [1, 2]).compile("e");

    assert_eq!(out.len(), 1);
    assert_eq!(
        strip_scopes(&out[0]),
        "not { $e has age $e_n#__age; { $e_n#__age == 1; } or { $e_n#__age == 2; }; };"
    );
}

#[test]
fn existence_uses_a_throwaway_variable() {
    assert_eq!(
        Filter::has_attr("age").compile("e"),
        vec!["$e has age $e__age__;"]
    );
    assert_eq!(
        strip_scopes(&Filter::not_has_attr("age").compile("e")[0]),
        "not { $e has age $e_n#__age__; };"
    );
}

#[test]
fn id_match_needs_no_binding() {
    assert_eq!(Filter::by_id("0x1f").compile("e"), vec!["$e iid 0x1f;"]);
}

#[test]
fn and_flattens_at_construction() {
    let a = || Filter::eq("name", "a");
    let b = || Filter::gt("age", 1);
    let c = || Filter::has_attr("email");

    let nested = Filter::and([a(), Filter::and([b(), c()])]);
    let flat = Filter::and([a(), b(), c()]);

    assert_eq!(nested, flat);
    let Filter::And(conj) = &nested else {
        panic!("expected and");
    };
    assert!(conj.filters().iter().all(|f| !matches!(f, Filter::And(_))));
    assert_eq!(nested.compile("e"), flat.compile("e"));
    assert_eq!((a() & b()) & c(), flat);
}

#[test]
fn or_scopes_each_alternative() {
    let out = Filter::or([Filter::eq("name", "Alice"), Filter::eq("name", "Bob")]).compile("e");

    assert_eq!(out.len(), 1);
    let n = scope_after(&out[0], "$e_o");
    assert_eq!(
        out[0],
        format!(
            "{{ $e has name $e_o{n}__name; $e_o{n}__name == \"Alice\"; }} or \
             {{ $e has name $e_o{m}__name; $e_o{m}__name == \"Bob\"; }};",
            m = n + 1
        )
    );
}

#[test]
fn bitor_chains_into_one_or() {
    let f = Filter::eq("a", 1) | Filter::eq("a", 2) | Filter::eq("a", 3);

    assert!(matches!(&f, Filter::Or(alts) if alts.len() == 3));
    assert_eq!(
        strip_scopes(&f.compile("e")[0]),
        "{ $e has a $e_o#__a; $e_o#__a == 1; } or \
         { $e has a $e_o#__a; $e_o#__a == 2; } or \
         { $e has a $e_o#__a; $e_o#__a == 3; };"
    );
}

#[test]
fn degenerate_ors() {
    assert_eq!(
        Filter::or([]).compile("e"),
        vec![format!("$e iid {CONTRADICTION_IID};")]
    );
    assert_eq!(
        Filter::or([Filter::eq("a", 1)]).compile("e"),
        Filter::eq("a", 1).compile("e")
    );

    let none: [i64; 0] = [];
    assert!(
        Filter::or([Filter::eq("a", 1), Filter::not_in("a", none)])
            .compile("e")
            .is_empty()
    );
}

#[test]
fn not_scopes_its_child() {
    let out = Filter::not(Filter::eq("status", "inactive")).compile("e");

    assert_eq!(out.len(), 1);
    let n = scope_after(&out[0], "$e_n");
    assert_eq!(
        out[0],
        format!("not {{ $e has status $e_n{n}__status; $e_n{n}__status == \"inactive\"; }};")
    );
    assert_eq!(!Filter::eq("status", "inactive"), Filter::not(Filter::eq("status", "inactive")));
}

#[test]
fn negated_leaf_is_a_not_block() {
    let out = Filter::eq("age", 3).negate().compile("e");

    assert_eq!(
        strip_scopes(&out[0]),
        "not { $e has age $e_n#__age; $e_n#__age == 3; };"
    );
    assert_eq!(Filter::eq("age", 3).negate().negate(), Filter::eq("age", 3));
}

#[test]
fn not_of_vacuous_pattern_is_a_contradiction() {
    let none: [i64; 0] = [];
    assert_eq!(
        Filter::not(Filter::not_in("a", none)).compile("e"),
        vec![format!("$e iid {CONTRADICTION_IID};")]
    );
}

#[test]
fn nested_scopes_use_the_innermost_suffix() {
    let f = Filter::not(Filter::or([Filter::eq("a", 1), Filter::eq("b", 2)]));
    let out = f.compile("e");

    assert_eq!(
        strip_scopes(&out[0]),
        "not { { $e has a $e_o#__a; $e_o#__a == 1; } or { $e has b $e_o#__b; $e_o#__b == 2; }; };"
    );
}

#[test]
fn role_player_rebinds_the_variable() {
    let f = Filter::role_player("employee", Filter::eq("name", "Alice"));

    assert_eq!(
        f.compile("r"),
        vec![
            "$r links (employee: $employee);",
            "$employee has name $employee__name;",
            "$employee__name == \"Alice\";"
        ]
    );
}

#[test]
fn role_players_in_alternatives_get_their_own_variables() {
    let f = Filter::or([
        Filter::role_player("employee", Filter::eq("name", "A")),
        Filter::role_player("employee", Filter::eq("name", "B")),
    ]);
    let out = strip_scopes(&f.compile("r")[0]);

    assert_eq!(
        out,
        "{ $r links (employee: $r_o#_employee); $r_o#_employee has name $r_o#_employee__name; \
         $r_o#_employee__name == \"A\"; } or \
         { $r links (employee: $r_o#_employee); $r_o#_employee has name $r_o#_employee__name; \
         $r_o#_employee__name == \"B\"; };"
    );
}

#[test]
fn concurrent_compiles_never_share_a_scope() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 250;

    let compiled = thread::scope(|s| {
        let workers = (0..THREADS)
            .map(|t| {
                s.spawn(move || {
                    (0..ROUNDS)
                        .map(|i| {
                            let filter = if (t + i) % 2 == 0 {
                                Filter::eq("a", 1) | Filter::eq("b", 2)
                            } else {
                                Filter::not(Filter::eq("a", 3))
                            };
                            scopes_in(&filter.compile("e").concat())
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        workers
            .into_iter()
            .flat_map(|w| w.join().expect("compile thread"))
            .collect::<Vec<_>>()
    });

    assert_eq!(compiled.len(), THREADS * ROUNDS);
    assert!(compiled.iter().all(|scopes| !scopes.is_empty()));

    let total = compiled.iter().map(BTreeSet::len).sum::<usize>();
    let distinct = compiled.iter().flatten().collect::<BTreeSet<_>>();
    assert_eq!(distinct.len(), total);
}

#[test]
fn scopes_in_reads_every_suffix() {
    assert_eq!(
        scopes_in("$e_o12__name $e_n3__x $e__name_other $e_o12__y"),
        BTreeSet::from([3, 12])
    );
}

#[test]
fn attribute_names_leaf_filters_only() {
    assert_eq!(Filter::eq("a", 1).attribute(), Some("a"));
    assert_eq!(Filter::has_attr("b").attribute(), Some("b"));
    assert_eq!(Filter::by_id("0x1").attribute(), None);
    assert_eq!(Filter::and([Filter::eq("a", 1)]).attribute(), None);
}

#[test]
fn strip_scopes_normalizes_only_scope_suffixes() {
    assert_eq!(strip_scopes("$e_o12__name $e_n3__x"), "$e_o#__name $e_n#__x");
    assert_eq!(strip_scopes("$e__name_other"), "$e__name_other");
}
