//! Behavior guarantees of the builders, the merge primitive and the remover.

use quarry::{
    merge, ConditionRemover, Entity, Field, FromValue, Number, OrderBuilder, Predicate,
    Projectable, Query, QueryError, QueryHints, Removal, SearchBuilder, SearchPattern,
    SelectBuilder, Selector, Shape, Specification, Value, ValueKind, WhereBuilder,
};

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: String,
    age: i64,
    deleted: bool,
}

impl Shape for Person {
    const FIELDS: &'static [Field] = &[
        Field::new("name", ValueKind::String),
        Field::new("age", ValueKind::Number),
        Field::new("deleted", ValueKind::Bool),
    ];
}

impl Entity for Person {
    fn field_value(&self, field: &str) -> Value<'_> {
        match field {
            "name" => Value::String(&self.name),
            "age" => Value::Number(Number::I64(self.age)),
            "deleted" => Value::Bool(self.deleted),
            _ => Value::None,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct PersonView {
    name: String,
    age: i64,
}

impl Shape for PersonView {
    const FIELDS: &'static [Field] = &[
        Field::new("name", ValueKind::String),
        Field::new("age", ValueKind::Number),
    ];
}

impl Projectable for PersonView {
    fn set_field(&mut self, field: &str, value: Value<'_>) -> bool {
        match field {
            "name" => FromValue::from_value(&value).map(|v| self.name = v).is_some(),
            "age" => FromValue::from_value(&value).map(|v| self.age = v).is_some(),
            _ => false,
        }
    }
}

struct Company {
    name: String,
}

impl Shape for Company {
    const FIELDS: &'static [Field] = &[Field::new("name", ValueKind::String)];
}

impl Entity for Company {
    fn field_value(&self, field: &str) -> Value<'_> {
        match field {
            "name" => Value::String(&self.name),
            _ => Value::None,
        }
    }
}

fn person(name: &str, age: i64) -> Person {
    Person {
        name: name.to_string(),
        age,
        deleted: false,
    }
}

fn adult() -> Predicate<Person> {
    Predicate::new("a", |a| a.member("age").gte(18))
}

fn live() -> Predicate<Person> {
    Predicate::new("b", |b| b.member("deleted").equals(false))
}

fn named_bob() -> Predicate<Person> {
    Predicate::new("c", |c| c.member("name").equals("Bob"))
}

// ============================================================================
// P1: clear
// ============================================================================

#[test]
fn where_builder_clear_behaves_as_new() {
    let mut filter: WhereBuilder<Person> = WhereBuilder::new();
    filter.add(adult()).add(live()).add(named_bob());
    filter.clear();

    assert!(filter.build().unwrap().is_none());
    assert!(filter.is_empty());

    let condition = live();
    filter.add(condition.clone());
    let fresh = {
        let mut b = WhereBuilder::new();
        b.add(condition);
        b.build().unwrap()
    };
    assert_eq!(filter.build().unwrap(), fresh);

    // separately built conditions are equivalent, not equal
    filter.clear();
    filter.add(live());
    let rebuilt = filter.build().unwrap().unwrap();
    assert_ne!(rebuilt, live());
    assert!(rebuilt.is_equivalent(&live()));
}

// ============================================================================
// P2: merge associativity
// ============================================================================

#[test]
fn merge_is_associative_up_to_equivalence() {
    let left = merge(&merge(&adult(), &live()).unwrap(), &named_bob()).unwrap();
    let right = merge(&adult(), &merge(&live(), &named_bob()).unwrap()).unwrap();

    assert_ne!(left.body(), &right.body_for(left.param()));
    assert!(left.is_equivalent(&right));
    assert!(right.is_equivalent(&left));
}

#[test]
fn merged_predicate_evaluates_both_sides() {
    let both = merge(&adult(), &live()).unwrap();
    assert!(both.matches(&person("Ann", 30)));
    assert!(!both.matches(&person("Tim", 12)));
    assert!(!both.matches(&Person {
        deleted: true,
        ..person("Old", 90)
    }));
}

#[test]
fn merge_rejects_non_boolean() {
    let name: Predicate<Person> = Predicate::member("name");
    assert!(matches!(
        merge(&adult(), &name),
        Err(QueryError::InvalidArgument(_))
    ));
}

// ============================================================================
// P3/P4: condition removal
// ============================================================================

#[test]
fn removal_round_trip() {
    let both = merge(&adult(), &live()).unwrap();

    let without_adult = ConditionRemover::remove(&both, &adult()).unwrap().unwrap();
    assert!(without_adult.is_equivalent(&live()));

    let without_live = ConditionRemover::remove(&both, &live()).unwrap().unwrap();
    assert!(without_live.is_equivalent(&adult()));
}

#[test]
fn removing_the_whole_predicate_collapses() {
    for condition in [adult(), live(), named_bob()] {
        assert_eq!(ConditionRemover::remove(&condition, &condition).unwrap(), None);
    }
}

#[test]
fn removal_matches_independently_built_conditions() {
    let row_filter = merge(&adult(), &live()).unwrap();
    let soft_delete: Predicate<Person> = Predicate::new("p", |p| p.member("deleted").negate());

    let rest = ConditionRemover::remove(&row_filter, &soft_delete)
        .unwrap()
        .unwrap();
    assert!(rest.is_equivalent(&adult()));
}

// ============================================================================
// P5: search wildcards
// ============================================================================

#[test]
fn search_wildcard_classification() {
    let companies: Vec<Company> = (1..=3)
        .map(|i| Company {
            name: format!("Company {i}"),
        })
        .collect();

    assert_eq!(SearchPattern::parse("%2"), SearchPattern::EndsWith("2".into()));
    let mut search: SearchBuilder<Company> = SearchBuilder::new();
    search.add(Selector::member("name"), "%2");
    let ends_with_two = search.build().unwrap().unwrap();
    let hits: Vec<&str> = companies
        .iter()
        .filter(|c| ends_with_two.matches(c))
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(hits, vec!["Company 2"]);

    search.clear();
    search.add(Selector::member("name"), "a");
    let exactly_a = search.build().unwrap().unwrap();
    assert_eq!(companies.iter().filter(|c| exactly_a.matches(c)).count(), 0);
}

// ============================================================================
// P6: order
// ============================================================================

#[test]
fn order_builder_keeps_insertion_order() {
    let people = [
        person("Charlie", 20),
        person("Bob", 30),
        person("Alice", 25),
        person("Bob", 20),
    ];

    let mut order: OrderBuilder<Person> = OrderBuilder::new();
    order
        .asc(Selector::member("name"))
        .desc(Selector::member("age"));

    let mut sorted: Vec<&Person> = people.iter().collect();
    order.sort(&mut sorted);

    let got: Vec<(&str, i64)> = sorted.iter().map(|p| (p.name.as_str(), p.age)).collect();
    assert_eq!(
        got,
        vec![("Alice", 25), ("Bob", 30), ("Bob", 20), ("Charlie", 20)]
    );
}

// ============================================================================
// P7: select shape mismatch
// ============================================================================

#[test]
fn select_shape_mismatch_is_reported_at_build() {
    let mut select: SelectBuilder<Person, PersonView> = SelectBuilder::new();
    // accepted without complaint
    select.add_to(Selector::member("name"), "nickname");
    assert_eq!(select.len(), 1);

    assert!(matches!(
        select.build(),
        Err(QueryError::ShapeMismatch { member, .. }) if member == "nickname"
    ));
}

#[test]
fn select_projects_into_result_type() {
    let mut select: SelectBuilder<Person, PersonView> = SelectBuilder::new();
    select.add(Selector::member("name")).add(Selector::member("age"));
    let projection = select.build().unwrap();

    assert_eq!(
        projection.apply(&person("Dana", 41)).unwrap(),
        PersonView {
            name: "Dana".to_string(),
            age: 41
        }
    );
}

// ============================================================================
// P8: paging
// ============================================================================

#[test]
fn paging_bounds() {
    let query = Query::<Person>::new().set_page(2, 10).unwrap();
    assert_eq!(query.criteria().get_skip(), Some(10));
    assert_eq!(query.criteria().get_take(), Some(10));

    assert_eq!(
        Query::<Person>::new().set_page(0, 10).unwrap_err(),
        QueryError::InvalidPage {
            page: 0,
            page_size: 10
        }
    );
}

// ============================================================================
// P9: removal does not look under OR
// ============================================================================

#[test]
fn conjunct_under_or_is_not_found() {
    let tricky: Predicate<Person> = Predicate::new("p", |p| {
        p.member("age")
            .gte(18)
            .and(p.member("deleted").equals(false).or(p.member("name").equals("root")))
    });

    let outcome = ConditionRemover::try_remove(&tricky, &live()).unwrap();
    assert!(matches!(outcome, Removal::NotFound(ref p) if *p == tricky));
}

// ============================================================================
// P10: hints config
// ============================================================================

#[test]
fn hints_round_trip_through_json() {
    let hints = QueryHints {
        no_tracking: true,
        split_query: true,
        ..QueryHints::default()
    };
    let json = serde_json::to_string(&hints).unwrap();
    let back: QueryHints = serde_json::from_str(&json).unwrap();
    assert_eq!(back, hints);

    let sparse: QueryHints = serde_json::from_str(r#"{"ignore_auto_includes": true}"#).unwrap();
    assert!(sparse.ignore_auto_includes);
    assert!(!sparse.no_tracking);
    assert!(!sparse.ignore_query_filters);
    assert!(!sparse.split_query);

    let empty: QueryHints = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, QueryHints::default());
}
