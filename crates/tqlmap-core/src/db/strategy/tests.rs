use super::*;
use crate::test_support::fixtures::{
    COMPANY, Company, EMPLOYMENT, Employment, PERSON, Person, registry,
};
use chrono::NaiveDate;

fn alice() -> Person {
    Person {
        age: Some(30),
        tags: vec!["a".into(), "b".into()],
        ..Person::new("Alice")
    }
}

fn employment() -> Employment {
    Employment {
        employee: Some(Person::new("Alice").with_id("0x1")),
        employer: Some(Company::new("Acme")),
        title: Some("Engineer".into()),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 15),
        ..Employment::default()
    }
}

#[test]
fn strategy_follows_model_kind() {
    assert_eq!(ModelStrategy::for_model(&PERSON), ModelStrategy::Entity);
    assert_eq!(ModelStrategy::for_model(&EMPLOYMENT), ModelStrategy::Relation);
}

#[test]
fn entity_insert_binds_present_values_and_omits_absent_ones() {
    let query = ModelStrategy::Entity.build_insert(&alice(), "e");

    assert_eq!(
        query,
        "insert\n$e isa person;\n$e has name \"Alice\";\n$e has age 30;\n\
         $e has tags \"a\";\n$e has tags \"b\";"
    );
    assert!(!query.contains("email"));
    assert!(!query.contains("null"));
}

#[test]
fn entity_put_uses_the_put_keyword() {
    let query = ModelStrategy::Entity.build_put(&Person::new("Bob"), "e3");

    assert_eq!(query, "put\n$e3 isa person;\n$e3 has name \"Bob\";");
}

#[test]
fn entity_match_by_key_uses_key_attributes_only() {
    assert_eq!(
        ModelStrategy::Entity.build_match_by_key(&alice(), "e"),
        "match\n$e isa person, has name \"Alice\";"
    );
}

#[test]
fn match_all_and_by_id() {
    assert_eq!(
        ModelStrategy::Entity.build_match_all(&PERSON, "e"),
        "match\n$e isa person;"
    );
    assert_eq!(
        ModelStrategy::Relation.build_match_by_id(&EMPLOYMENT, "0x9", "e"),
        "match\n$e isa employment, iid 0x9;"
    );
}

#[test]
fn fetch_all_projects_id_and_every_attribute() {
    assert_eq!(
        ModelStrategy::Entity.build_fetch_all(&PERSON, "e"),
        "fetch {\n  \"_iid\": iid($e),\n  \"name\": $e.name,\n  \"age\": $e.age,\n  \
         \"email\": $e.email,\n  \"tags\": [$e.tags]\n};"
    );
    assert_eq!(fetch_id_only("e0"), "fetch {\n  \"_iid\": iid($e0)\n};");
}

#[test]
fn relation_insert_matches_players_by_id_or_key() {
    let query = ModelStrategy::Relation.build_insert(&employment(), "e");

    assert_eq!(
        query,
        "match\n$employee isa person, iid 0x1;\n$employer isa company, has name \"Acme\";\n\
         insert\n$e isa employment, links (employee: $employee, employer: $employer), \
         has title \"Engineer\", has start-date 2024-01-15;"
    );
}

#[test]
fn relation_without_players_has_no_match_section() {
    let rel = Employment {
        title: Some("Intern".into()),
        ..Employment::default()
    };

    assert_eq!(
        ModelStrategy::Relation.build_put(&rel, "e"),
        "put\n$e isa employment, has title \"Intern\";"
    );
}

#[test]
fn relation_match_by_key() {
    let mut rel = employment();
    assert_eq!(
        ModelStrategy::Relation.build_match_by_key(&rel, "e"),
        "match\n$employee isa person, iid 0x1;\n$employer isa company, has name \"Acme\";\n\
         $e isa employment, links (employee: $employee, employer: $employer);"
    );

    rel.id = Some("0x77".into());
    assert_eq!(
        ModelStrategy::Relation.build_match_by_key(&rel, "e"),
        "match\n$e isa employment, iid 0x77;"
    );
}

#[test]
fn fetch_with_roles_nests_player_attributes() {
    let registry = registry();
    let (matches, fetch) = ModelStrategy::Relation.build_fetch_with_roles(&EMPLOYMENT, &registry, "e");

    assert_eq!(
        matches,
        vec![
            "$e links (employee: $employee);",
            "$e links (employer: $employer);"
        ]
    );
    assert_eq!(
        fetch,
        "fetch {\n  \"_iid\": iid($e),\n  \"title\": $e.title,\n  \"start-date\": $e.start-date,\n  \
         \"employee\": { \"_iid\": iid($employee), \"name\": $employee.name, \"age\": $employee.age, \
         \"email\": $employee.email, \"tags\": [$employee.tags] },\n  \
         \"employer\": { \"_iid\": iid($employer), \"name\": $employer.name }\n};"
    );

    let (matches, fetch) = ModelStrategy::Entity.build_fetch_with_roles(&COMPANY, &registry, "e");
    assert!(matches.is_empty());
    assert_eq!(fetch, ModelStrategy::Entity.build_fetch_all(&COMPANY, "e"));
}

#[test]
fn polymorphic_match_captures_the_type_label() {
    let registry = registry();

    assert_eq!(
        ModelStrategy::Entity.build_match_all_polymorphic(&PERSON, "e", "t"),
        "match\n$e isa! $t;\n$t sub person;"
    );
    assert_eq!(
        ModelStrategy::Entity.build_fetch_all_with_type(&PERSON, &registry, "e", "t"),
        "fetch {\n  \"_iid\": iid($e),\n  \"_type\": label($t),\n  \"name\": $e.name,\n  \
         \"age\": $e.age,\n  \"email\": $e.email,\n  \"tags\": [$e.tags],\n  \"school\": $e.school\n};"
    );
}
