//! Property-based tests for the validation engine.

use crate::prelude::*;
use proptest::prelude::*;
use serde_json::{Map, Value as Json};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn validate(schema: &Schema, data: Json) -> Result<Json, SchemaError> {
    block_on(schema.validate_value(&data))
}

fn code(result: Result<Json, SchemaError>) -> String {
    match result {
        Ok(_) => "ok".to_string(),
        Err(err) => err
            .validation()
            .map(|e| e.code.clone())
            .unwrap_or_else(|| "fault".to_string()),
    }
}

fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

// One JSON sample per shape
fn any_json() -> impl Strategy<Value = Json> {
    prop_oneof![
        "[a-z]{0,8}".prop_map(Json::from),
        (-1000i64..1000).prop_map(Json::from),
        any::<bool>().prop_map(Json::from),
        Just(json!({"k": 1})),
        Just(json!([1, 2])),
    ]
}

fn any_kind() -> impl Strategy<Value = ValueKind> {
    prop_oneof![
        Just(ValueKind::String),
        Just(ValueKind::Number),
        Just(ValueKind::Integer),
        Just(ValueKind::Boolean),
        Just(ValueKind::Object),
        Just(ValueKind::Array),
        Just(ValueKind::Image),
    ]
}

// A value of `kind` whose constraints reject every sample from `any_json`
fn strict_value(kind: ValueKind, name: &str) -> Value {
    match kind {
        ValueKind::String => StringValue::new(name).min(1000).into(),
        ValueKind::Number => NumberValue::new(name).min(1e9).into(),
        ValueKind::Integer => IntegerValue::new(name).min(1_000_000).into(),
        ValueKind::Boolean => BooleanValue::new(name).check_fn(|_| false, "never").into(),
        ValueKind::Object => ObjectValue::new(name)
            .properties(Schema::new().with(StringValue::new("missing").required()))
            .into(),
        ValueKind::Array => ArrayValue::new(name).min(1000).into(),
        ValueKind::Image => ImageValue::new(name).into(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn missing_required_field_is_reported(name in field_name()) {
        let schema = Schema::new().with(StringValue::new(name.clone()).required());
        let err = validate(&schema, json!({})).unwrap_err();
        let expected = format!("\"{name}\" has not been provided");
        prop_assert!(err.to_string().contains(&expected));
    }

    #[test]
    fn absent_field_takes_its_default(name in field_name(), default in any::<i64>()) {
        let schema = Schema::new().with(IntegerValue::new(name.clone()).default_value(default));
        let out = validate(&schema, json!({})).unwrap();
        prop_assert_eq!(&out[name.as_str()], &json!(default));
    }

    #[test]
    fn type_mismatch_wins_over_constraints(kind in any_kind(), sample in any_json()) {
        prop_assume!(!kind.accepts(&sample));
        let schema = Schema::new().with(strict_value(kind, "field"));
        let err = validate(&schema, json!({ "field": sample })).unwrap_err();
        prop_assert!(err.to_string().contains("must be of type"));
        prop_assert_eq!(code(Err(err)), "type");
    }

    #[test]
    fn integer_bounds_are_inclusive(min in -1000i64..1000, span in 0i64..1000) {
        let max = min + span;
        let schema = Schema::new().with(IntegerValue::new("n").min(min).max(max));
        let accepts_min = validate(&schema, json!({ "n": min })).is_ok();
        let accepts_max = validate(&schema, json!({ "n": max })).is_ok();
        prop_assert!(accepts_min);
        prop_assert!(accepts_max);
        prop_assert_eq!(code(validate(&schema, json!({ "n": min - 1 }))), "range");
        prop_assert_eq!(code(validate(&schema, json!({ "n": max + 1 }))), "range");
    }

    #[test]
    fn number_bounds_are_inclusive(min in -1000i64..1000, span in 0i64..1000) {
        let (low, high) = (min as f64, (min + span) as f64);
        let schema = Schema::new().with(NumberValue::new("x").min(low).max(high));
        let accepts_low = validate(&schema, json!({ "x": low })).is_ok();
        let accepts_high = validate(&schema, json!({ "x": high })).is_ok();
        let rejects_below = validate(&schema, json!({ "x": low - 1.0 })).is_err();
        let rejects_above = validate(&schema, json!({ "x": high + 1.0 })).is_err();
        prop_assert!(accepts_low);
        prop_assert!(accepts_high);
        prop_assert!(rejects_below);
        prop_assert!(rejects_above);
    }

    #[test]
    fn string_length_bounds_count_characters(
        min in 0usize..20,
        span in 0usize..20,
        letter in prop::sample::select(vec!['a', 'é', '字']),
    ) {
        let max = min + span;
        let text = |len: usize| std::iter::repeat(letter).take(len).collect::<String>();
        let schema = Schema::new().with(StringValue::new("s").min(min).max(max));
        let accepts_min = validate(&schema, json!({ "s": text(min) })).is_ok();
        let accepts_max = validate(&schema, json!({ "s": text(max) })).is_ok();
        prop_assert!(accepts_min);
        prop_assert!(accepts_max);
        prop_assert_eq!(code(validate(&schema, json!({ "s": text(max + 1) }))), "length");
        if min > 0 {
            prop_assert_eq!(code(validate(&schema, json!({ "s": text(min - 1) }))), "length");
        }
    }

    #[test]
    fn validation_leaves_input_untouched(name in field_name(), default in "[a-z]{1,8}") {
        let schema = Schema::new().with(StringValue::new(name.clone()).default_value(default));
        let input = Map::new();
        let out = block_on(schema.validate(&input)).unwrap();
        prop_assert!(input.is_empty());
        prop_assert!(out.contains_key(&name));
    }

    #[test]
    fn export_is_deterministic(names in prop::collection::btree_set(field_name(), 1..8)) {
        let mut schema = Schema::new();
        for (index, name) in names.iter().enumerate() {
            match index % 3 {
                0 => schema.add_string(StringValue::new(name.clone()).min(index)),
                1 => schema.add_integer(IntegerValue::new(name.clone()).max(index as i64)),
                _ => schema.add_boolean(BooleanValue::new(name.clone()).required()),
            };
        }
        let first = schema.export();
        let second = schema.export();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        let keys: Vec<&str> = first.keys().collect();
        let declared: Vec<&str> = names.iter().map(String::as_str).collect();
        prop_assert_eq!(keys, declared);
    }
}
