//! Schema: an ordered set of named values and the validation algorithm.
//!
//! Validation runs three passes over the declared fields, in declaration
//! order, and stops at the first failure:
//!
//! 1. **Presence**: an absent (or `null`) field takes its default if it has
//!    one; otherwise a required field fails and an optional one is skipped.
//! 2. **Type**: every present field must have the JSON type of its value.
//! 3. **Constraints**: per-variant rules, then the value's custom checks.
//!    Nested objects recurse through the same three passes.
//!
//! Validation never mutates its input: it returns a copy with defaults
//! filled in.

use crate::error::{SchemaError, ValidationError};
use crate::export::SchemaDescriptor;
use crate::format::is_absolute_url;
use crate::value::{
    ArrayValue, BooleanValue, ImageValue, IntegerValue, NumberValue, ObjectValue, StringValue,
    Value,
};
use crate::CheckRule;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::{Map, Value as Json};
use std::collections::HashSet;
use tracing::{trace, warn};

/// Mapping from field name to [`Value`], in declaration order.
///
/// ```rust,ignore
/// use routeforge_schema::prelude::*;
///
/// let mut schema = Schema::new();
/// schema
///     .add_string(StringValue::new("name").required().min(1).max(50))
///     .add_integer(IntegerValue::new("age").min(18).max(65));
///
/// let data = json!({ "name": "Al" });
/// let validated = schema.validate_value(&data).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<Value>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under its own name.
    ///
    /// Re-adding a name replaces the earlier value in place.
    pub fn add(&mut self, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|e| e.name() == value.name()) {
            Some(existing) => {
                warn!(field = %value.name(), "schema field declared twice, keeping the last one");
                *existing = value;
            }
            None => self.entries.push(value),
        }
        self
    }

    /// Owned variant of [`add`](Self::add), handy for inline nested schemas.
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.add(value);
        self
    }

    pub fn add_string(&mut self, value: StringValue) -> &mut Self {
        self.add(value)
    }

    pub fn add_number(&mut self, value: NumberValue) -> &mut Self {
        self.add(value)
    }

    pub fn add_integer(&mut self, value: IntegerValue) -> &mut Self {
        self.add(value)
    }

    pub fn add_boolean(&mut self, value: BooleanValue) -> &mut Self {
        self.add(value)
    }

    pub fn add_object(&mut self, value: ObjectValue) -> &mut Self {
        self.add(value)
    }

    pub fn add_array(&mut self, value: ArrayValue) -> &mut Self {
        self.add(value)
    }

    pub fn add_image(&mut self, value: ImageValue) -> &mut Self {
        self.add(value)
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Value::name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export every field as a descriptor, keyed by field name.
    pub fn export(&self) -> SchemaDescriptor {
        SchemaDescriptor::new(self.entries.iter().map(Value::export).collect())
    }

    /// Validate `data`, returning a copy with defaults applied.
    pub async fn validate(&self, data: &Map<String, Json>) -> Result<Map<String, Json>, SchemaError> {
        let mut output = data.clone();
        self.validate_in_place(&mut output).await?;
        Ok(output)
    }

    /// Validate an arbitrary JSON value, which must be an object.
    pub async fn validate_value(&self, data: &Json) -> Result<Json, SchemaError> {
        match data {
            Json::Object(map) => self.validate(map).await.map(Json::Object),
            _ => Err(ValidationError::new(
                "",
                "type",
                "The request data must be an object.",
            )
            .into()),
        }
    }

    fn validate_in_place<'a>(
        &'a self,
        data: &'a mut Map<String, Json>,
    ) -> BoxFuture<'a, Result<(), SchemaError>> {
        async move {
            let mut present: Vec<&Value> = Vec::with_capacity(self.entries.len());

            for value in &self.entries {
                let name = value.name();
                if data.get(name).is_some_and(|field| !field.is_null()) {
                    present.push(value);
                } else if let Some(default) = value.default_json() {
                    trace!(field = %name, "applying default value");
                    data.insert(name.to_string(), default);
                    present.push(value);
                } else if value.is_required() {
                    return Err(
                        ValidationError::rule(name, "required", "has not been provided").into(),
                    );
                }
            }

            for value in &present {
                if let Some(field) = data.get(value.name()) {
                    check_type(value, value.name(), field)?;
                }
            }

            for value in present {
                if let Some(field) = data.get_mut(value.name()) {
                    check_constraints(value, value.name(), field).await?;
                }
            }

            Ok(())
        }
        .boxed()
    }
}

fn check_type(value: &Value, field: &str, data: &Json) -> Result<(), ValidationError> {
    let kind = value.kind();
    if kind.accepts(data) {
        Ok(())
    } else {
        Err(ValidationError::rule(
            field,
            "type",
            format_args!("must be of type {}", kind.expected_type()),
        ))
    }
}

/// Type check plus constraints, for a value validated outside its schema
/// (array items and `contains`).
async fn check_standalone(value: &Value, field: &str, data: &mut Json) -> Result<(), SchemaError> {
    check_type(value, field, data)?;
    check_constraints(value, field, data).await
}

fn check_constraints<'a>(
    value: &'a Value,
    field: &'a str,
    data: &'a mut Json,
) -> BoxFuture<'a, Result<(), SchemaError>> {
    async move {
        match value {
            Value::String(v) => {
                if let Some(s) = data.as_str() {
                    check_string(v, field, s)?;
                }
            }
            Value::Number(v) => {
                if let Some(n) = data.as_f64() {
                    check_range(field, n, v.min, v.max)?;
                }
            }
            Value::Integer(v) => {
                let whole = data
                    .as_i64()
                    .map(i128::from)
                    .or_else(|| data.as_u64().map(i128::from));
                if let Some(n) = whole {
                    check_range(field, n, v.min.map(i128::from), v.max.map(i128::from))?;
                } else if let Some(n) = data.as_f64() {
                    check_range(
                        field,
                        n,
                        v.min.map(|min| min as f64),
                        v.max.map(|max| max as f64),
                    )?;
                    if n.fract() != 0.0 {
                        return Err(
                            ValidationError::rule(field, "integer", "must be an integer").into(),
                        );
                    }
                }
            }
            Value::Boolean(_) => {}
            Value::Object(v) => {
                if let Json::Object(map) = &mut *data {
                    if !v.properties.is_empty() {
                        v.properties.validate_in_place(map).await?;
                    }
                }
            }
            Value::Array(v) => {
                if let Json::Array(items) = &mut *data {
                    check_array(v, field, items).await?;
                }
            }
            Value::Image(_) => {
                if !data.as_str().is_some_and(is_absolute_url) {
                    return Err(
                        ValidationError::rule(field, "image", "must be a valid image URL").into(),
                    );
                }
            }
        }

        run_checks(value.checks(), field, data).await
    }
    .boxed()
}

fn check_range<N>(field: &str, n: N, min: Option<N>, max: Option<N>) -> Result<(), ValidationError>
where
    N: PartialOrd + std::fmt::Display,
{
    match (min, max) {
        (Some(min), Some(max)) if n < min || n > max => Err(ValidationError::rule(
            field,
            "range",
            format_args!("must be between {min} and {max}"),
        )),
        (Some(min), None) if n < min => Err(ValidationError::rule(
            field,
            "range",
            format_args!("must be at least {min}"),
        )),
        (None, Some(max)) if n > max => Err(ValidationError::rule(
            field,
            "range",
            format_args!("must be at most {max}"),
        )),
        _ => Ok(()),
    }
}

fn check_string(value: &StringValue, field: &str, s: &str) -> Result<(), ValidationError> {
    if let Some(options) = &value.options {
        if !options.iter().any(|option| option == s) {
            return Err(ValidationError::rule(
                field,
                "options",
                format_args!("must be one of: {}", options.join(", ")),
            ));
        }
    }

    let len = s.chars().count();
    match (value.min, value.max) {
        (Some(min), Some(max)) if len < min || len > max => {
            return Err(ValidationError::rule(
                field,
                "length",
                format_args!("must be between {min} and {max} characters long"),
            ));
        }
        (Some(min), None) if len < min => {
            return Err(ValidationError::rule(
                field,
                "length",
                format_args!("must be at least {min} characters long"),
            ));
        }
        (None, Some(max)) if len > max => {
            return Err(ValidationError::rule(
                field,
                "length",
                format_args!("must be at most {max} characters long"),
            ));
        }
        _ => {}
    }

    if let Some(test) = value.test {
        if !test.matches(s) {
            return Err(ValidationError::rule(field, test.as_str(), test.rule()));
        }
    }

    Ok(())
}

async fn check_array(value: &ArrayValue, field: &str, items: &mut [Json]) -> Result<(), SchemaError> {
    let count = items.len();
    match (value.min, value.max) {
        (Some(min), Some(max)) if count < min || count > max => {
            return Err(ValidationError::rule(
                field,
                "items",
                format_args!("must contain between {min} and {max} items"),
            )
            .into());
        }
        (Some(min), None) if count < min => {
            return Err(ValidationError::rule(
                field,
                "items",
                format_args!("must contain at least {min} items"),
            )
            .into());
        }
        (None, Some(max)) if count > max => {
            return Err(ValidationError::rule(
                field,
                "items",
                format_args!("must contain at most {max} items"),
            )
            .into());
        }
        _ => {}
    }

    if value.unique {
        // object keys serialize sorted, so equal items encode identically
        let mut seen = HashSet::with_capacity(count);
        let duplicated = !items.iter().all(|item| seen.insert(item.to_string()));
        if duplicated {
            return Err(
                ValidationError::rule(field, "unique", "must only contain unique items").into(),
            );
        }
    }

    if let Some(shape) = &value.items {
        for (index, item) in items.iter_mut().enumerate() {
            let item_field = format!("{field}[{index}]");
            check_standalone(shape, &item_field, item).await?;
        }
    }

    if let Some(shape) = &value.contains {
        let mut matched = false;
        for (index, item) in items.iter().enumerate() {
            let item_field = format!("{field}[{index}]");
            let mut candidate = item.clone();
            match check_standalone(shape, &item_field, &mut candidate).await {
                Ok(()) => {
                    matched = true;
                    break;
                }
                Err(SchemaError::Invalid(_)) => {}
                Err(err) => return Err(err),
            }
        }
        if !matched {
            return Err(ValidationError::rule(
                field,
                "contains",
                "must contain at least one matching item",
            )
            .into());
        }
    }

    Ok(())
}

async fn run_checks(checks: &[CheckRule], field: &str, data: &Json) -> Result<(), SchemaError> {
    for rule in checks {
        match rule.run(field, data).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(ValidationError::new(field, "check", rule.failure_message()).into());
            }
            Err(source) => {
                return Err(SchemaError::Check {
                    field: field.to_string(),
                    source,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::StringTest;
    use serde_json::json;

    fn object(data: Json) -> Map<String, Json> {
        match data {
            Json::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    async fn message(schema: &Schema, data: Json) -> Option<String> {
        schema
            .validate(&object(data))
            .await
            .err()
            .map(|e| e.to_string())
    }

    #[test]
    fn add_overwrites_in_place() {
        let mut schema = Schema::new();
        schema
            .add_string(StringValue::new("a"))
            .add_integer(IntegerValue::new("b"))
            .add_boolean(BooleanValue::new("a"));
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            schema.get("a").map(Value::kind),
            Some(crate::ValueKind::Boolean)
        );
    }

    #[tokio::test]
    async fn optional_absent_field_does_not_stop_validation() {
        let schema = Schema::new()
            .with(StringValue::new("nickname"))
            .with(StringValue::new("name").required());
        assert_eq!(
            message(&schema, json!({})).await.as_deref(),
            Some("The field \"name\" has not been provided.")
        );
    }

    #[tokio::test]
    async fn every_missing_default_is_applied() {
        let schema = Schema::new()
            .with(IntegerValue::new("page").required().default_value(1))
            .with(IntegerValue::new("size").required().default_value(20))
            .with(StringValue::new("sort").default_value("asc"));
        let data = object(json!({}));
        let out = schema.validate(&data).await.unwrap();
        assert_eq!(Json::Object(out), json!({"page": 1, "size": 20, "sort": "asc"}));
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn defaults_are_rechecked() {
        let schema = Schema::new().with(IntegerValue::new("n").min(5).default_value(1));
        assert_eq!(
            message(&schema, json!({})).await.as_deref(),
            Some("The field \"n\" must be at least 5.")
        );
    }

    #[tokio::test]
    async fn null_counts_as_absent() {
        let schema = Schema::new().with(StringValue::new("name").required());
        assert_eq!(
            message(&schema, json!({"name": null})).await.as_deref(),
            Some("The field \"name\" has not been provided.")
        );
        let optional = Schema::new().with(StringValue::new("name").min(3));
        assert_eq!(message(&optional, json!({"name": null})).await, None);
    }

    #[tokio::test]
    async fn type_pass_precedes_constraints() {
        let schema = Schema::new()
            .with(StringValue::new("a").min(10))
            .with(IntegerValue::new("b"));
        assert_eq!(
            message(&schema, json!({"a": "short", "b": "1"})).await.as_deref(),
            Some("The field \"b\" must be of type integer.")
        );
    }

    #[tokio::test]
    async fn zero_bounds_are_enforced() {
        let schema = Schema::new().with(NumberValue::new("n").min(0.0));
        assert_eq!(
            message(&schema, json!({"n": -1})).await.as_deref(),
            Some("The field \"n\" must be at least 0.")
        );
        let schema = Schema::new().with(StringValue::new("s").max(0));
        assert_eq!(
            message(&schema, json!({"s": "x"})).await.as_deref(),
            Some("The field \"s\" must be at most 0 characters long.")
        );
    }

    #[tokio::test]
    async fn integer_range_runs_before_integer_check() {
        let schema = Schema::new().with(IntegerValue::new("n").min(1).max(3));
        assert_eq!(
            message(&schema, json!({"n": 3.5})).await.as_deref(),
            Some("The field \"n\" must be between 1 and 3.")
        );
        assert_eq!(
            message(&schema, json!({"n": 2.5})).await.as_deref(),
            Some("The field \"n\" must be an integer.")
        );
        assert_eq!(message(&schema, json!({"n": 2.0})).await, None);
    }

    #[tokio::test]
    async fn integer_bounds_hold_past_f64_precision() {
        let edge: i64 = 1 << 53;
        let schema = Schema::new().with(IntegerValue::new("n").min(-edge).max(edge));
        assert_eq!(message(&schema, json!({"n": edge})).await, None);
        assert_eq!(
            message(&schema, json!({"n": edge + 1})).await.as_deref(),
            Some("The field \"n\" must be between -9007199254740992 and 9007199254740992.")
        );
        assert!(message(&schema, json!({"n": -edge - 1})).await.is_some());
        assert!(message(&schema, json!({"n": u64::MAX})).await.is_some());

        let unbounded = Schema::new().with(IntegerValue::new("n").max(i64::MAX));
        assert!(message(&unbounded, json!({"n": u64::MAX})).await.is_some());
        assert_eq!(message(&unbounded, json!({"n": i64::MAX})).await, None);
    }

    #[tokio::test]
    async fn string_precedence() {
        let schema = Schema::new().with(
            StringValue::new("role")
                .options(["admin", "user"])
                .min(5)
                .test(StringTest::Email),
        );
        assert_eq!(
            message(&schema, json!({"role": "guest"})).await.as_deref(),
            Some("The field \"role\" must be one of: admin, user.")
        );
        assert_eq!(
            message(&schema, json!({"role": "user"})).await.as_deref(),
            Some("The field \"role\" must be at least 5 characters long.")
        );
        assert_eq!(
            message(&schema, json!({"role": "admin"})).await.as_deref(),
            Some("The field \"role\" must be a valid email address.")
        );
    }

    #[tokio::test]
    async fn checks_run_in_order_after_constraints() {
        let schema = Schema::new().with(
            StringValue::new("code")
                .max(4)
                .check_fn(|v| v.as_str() != Some("0000"), "Zero code is reserved")
                .check_fn(|_| false, "Always fails"),
        );
        assert_eq!(
            message(&schema, json!({"code": "00000"})).await.as_deref(),
            Some("The field \"code\" must be at most 4 characters long.")
        );
        assert_eq!(
            message(&schema, json!({"code": "0000"})).await.as_deref(),
            Some("Zero code is reserved.")
        );
        assert_eq!(
            message(&schema, json!({"code": "1234"})).await.as_deref(),
            Some("Always fails.")
        );
    }

    #[tokio::test]
    async fn faulty_check_is_not_a_validation_failure() {
        let schema = Schema::new().with(BooleanValue::new("flag").check_async(
            |_| async { Err::<bool, crate::CheckError>("lookup failed".into()) },
            "Unused",
        ));
        let err = schema.validate(&object(json!({"flag": true}))).await.unwrap_err();
        assert!(!err.is_invalid());
        assert!(matches!(err, SchemaError::Check { ref field, .. } if field == "flag"));
    }

    #[tokio::test]
    async fn nested_defaults_land_in_the_copy() {
        let schema = Schema::new().with(
            ObjectValue::new("paging")
                .properties(Schema::new().with(IntegerValue::new("page").default_value(1))),
        );
        let out = schema
            .validate(&object(json!({"paging": {}})))
            .await
            .unwrap();
        assert_eq!(Json::Object(out), json!({"paging": {"page": 1}}));
    }

    #[tokio::test]
    async fn arrays() {
        let schema = Schema::new().with(
            ArrayValue::new("tags")
                .min(1)
                .max(3)
                .unique()
                .items(StringValue::new("tag").min(2)),
        );
        assert_eq!(
            message(&schema, json!({"tags": []})).await.as_deref(),
            Some("The field \"tags\" must contain between 1 and 3 items.")
        );
        assert_eq!(
            message(&schema, json!({"tags": ["ab", "ab"]})).await.as_deref(),
            Some("The field \"tags\" must only contain unique items.")
        );
        assert_eq!(
            message(&schema, json!({"tags": ["ab", 3]})).await.as_deref(),
            Some("The field \"tags[1]\" must be of type string.")
        );
        assert_eq!(
            message(&schema, json!({"tags": ["ab", "c"]})).await.as_deref(),
            Some("The field \"tags[1]\" must be at least 2 characters long.")
        );
        assert_eq!(message(&schema, json!({"tags": ["ab", "cd"]})).await, None);
    }

    #[tokio::test]
    async fn unique_compares_whole_items() {
        let schema = Schema::new().with(ArrayValue::new("rows").unique());
        assert_eq!(
            message(&schema, json!({"rows": [{"a": 1, "b": 2}, {"b": 2, "a": 1}]}))
                .await
                .as_deref(),
            Some("The field \"rows\" must only contain unique items.")
        );
        assert_eq!(message(&schema, json!({"rows": [1, "1", [1], {"1": 1}]})).await, None);
    }

    #[tokio::test]
    async fn unique_scales_to_large_arrays() {
        let schema = Schema::new().with(ArrayValue::new("ids").unique());
        let mut ids: Vec<Json> = (0..200_000).map(Json::from).collect();
        assert_eq!(message(&schema, json!({"ids": ids.clone()})).await, None);

        ids.push(Json::from(199_999));
        assert_eq!(
            message(&schema, json!({"ids": ids})).await.as_deref(),
            Some("The field \"ids\" must only contain unique items.")
        );
    }

    #[tokio::test]
    async fn array_contains() {
        let schema = Schema::new().with(
            ArrayValue::new("scores").contains(IntegerValue::new("score").min(90)),
        );
        assert_eq!(
            message(&schema, json!({"scores": [10, "x", 20]})).await.as_deref(),
            Some("The field \"scores\" must contain at least one matching item.")
        );
        assert_eq!(message(&schema, json!({"scores": [10, 95]})).await, None);
    }

    #[tokio::test]
    async fn image_needs_absolute_url() {
        let schema = Schema::new().with(ImageValue::new("avatar"));
        assert_eq!(
            message(&schema, json!({"avatar": "me.png"})).await.as_deref(),
            Some("The field \"avatar\" must be a valid image URL.")
        );
        assert_eq!(
            message(&schema, json!({"avatar": 5})).await.as_deref(),
            Some("The field \"avatar\" must be of type string.")
        );
        assert_eq!(
            message(&schema, json!({"avatar": "https://cdn.example.com/me.png"})).await,
            None
        );
    }

    #[tokio::test]
    async fn validate_value_rejects_non_objects() {
        let schema = Schema::new();
        let err = schema.validate_value(&json!([1, 2])).await.unwrap_err();
        assert_eq!(err.to_string(), "The request data must be an object.");
    }
}
