//! Property-based tests for schema parsing, PATCH and pagination.

use proptest::prelude::*;
use scim_suite::patch::{PatchOperation, PatchRequest, apply_operations};
use scim_suite::resource::{Attributes, ListRequestParams, Value};
use scim_suite::schema::parse_schema_value;
use scim_suite::storage::{InMemoryStore, ResourceHandler};
use serde_json::json;

fn attribute_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_-]{0,12}"
}

fn simple_type() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "string", "boolean", "decimal", "integer", "dateTime", "binary", "reference",
    ])
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9 ]{0,16}".prop_map(Value::from),
    ]
}

fn email_list(len: usize) -> Value {
    Value::Array(
        (0..len)
            .map(|i| {
                Value::from(Attributes::from_iter([(
                    "value",
                    format!("{}@example.com", i),
                )]))
            })
            .collect(),
    )
}

proptest! {
    #[test]
    fn prop_schema_keeps_attribute_order(
        names in prop::collection::hash_set(attribute_name(), 1..12),
        types in prop::collection::vec(simple_type(), 12),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let attributes: Vec<serde_json::Value> = names
            .iter()
            .zip(types.iter().cycle())
            .map(|(name, ty)| json!({"name": name, "type": ty}))
            .collect();
        let document = json!({"id": "urn:example:generated", "attributes": attributes});

        let schema = parse_schema_value(&document).unwrap();
        let parsed: Vec<&str> = schema.attributes.iter().map(|a| a.name.as_str()).collect();
        prop_assert_eq!(parsed, names.iter().map(String::as_str).collect::<Vec<_>>());

        let reparsed = parse_schema_value(&serde_json::to_value(&schema).unwrap()).unwrap();
        prop_assert_eq!(reparsed, schema);
    }

    #[test]
    fn prop_add_with_path_is_idempotent(
        name in attribute_name(),
        value in scalar(),
        existing in prop::collection::vec((attribute_name(), scalar()), 0..6),
    ) {
        let attributes: Attributes = existing.into_iter().collect();
        let request = PatchRequest::new(vec![PatchOperation::add(&name, value.clone())]);

        let once = apply_operations(&attributes, &request).unwrap();
        let twice = apply_operations(&once, &request).unwrap();
        prop_assert_eq!(once.get_ignore_case(&name), Some(&value));
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn prop_pathless_add_appends_and_replace_overwrites(
        existing in 0usize..5,
        added in 0usize..5,
    ) {
        let attributes: Attributes = [("emails", email_list(existing))].into_iter().collect();
        let body: Attributes = [("emails", email_list(added))].into_iter().collect();

        let add = PatchRequest::new(vec![PatchOperation::add_all(body.clone())]);
        let appended = apply_operations(&attributes, &add).unwrap();
        prop_assert_eq!(
            appended.get("emails").and_then(Value::as_array).map(Vec::len),
            Some(existing + added)
        );

        let replace = PatchRequest::new(vec![PatchOperation::replace_all(body)]);
        let replaced = apply_operations(&appended, &replace).unwrap();
        prop_assert_eq!(
            replaced.get("emails").and_then(Value::as_array).map(Vec::len),
            Some(added)
        );
    }

    #[test]
    fn prop_pages_stay_within_bounds(
        n in 0usize..40,
        start in 1usize..45,
        count in 0usize..15,
    ) {
        let store = InMemoryStore::with_test_data(n);
        let params = ListRequestParams::new(start, count);
        let page = tokio_test::block_on(store.get_all(&params)).unwrap();

        prop_assert_eq!(page.total_results, n);
        let expected = if start <= n { count.min(n - (start - 1)) } else { 0 };
        prop_assert_eq!(page.resources.len(), expected);
        if let Some(first) = page.resources.first() {
            prop_assert_eq!(first.id.clone(), format!("{:04}", start));
        }
    }
}
