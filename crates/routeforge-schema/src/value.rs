//! The value family: one variant per data kind.
//!
//! Each variant is a plain struct with public fields, so a value can be
//! declared as a struct literal:
//!
//! ```rust,ignore
//! use routeforge_schema::prelude::*;
//!
//! let name = StringValue {
//!     name: "name".into(),
//!     required: true,
//!     min: Some(1),
//!     max: Some(50),
//!     ..Default::default()
//! };
//! ```
//!
//! The chained setters (`StringValue::new("name").required().min(1)`) only fill
//! in the same fields. Constraints are never validated at construction time;
//! an impossible combination such as `min > max` shows up when data is
//! validated.

use crate::check::{Check, CheckError, CheckRule};
use crate::export::{Constraints, ValueDescriptor};
use crate::format::StringTest;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::fmt;
use std::future::Future;

/// Data kind of a [`Value`], as written in exported descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Image,
}

impl ValueKind {
    /// Wire tag (`"string"`, `"integer"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
            ValueKind::Image => "image",
        }
    }

    /// JSON type named in type-mismatch messages. Images travel as strings.
    pub fn expected_type(&self) -> &'static str {
        match self {
            ValueKind::Image => "string",
            other => other.as_str(),
        }
    }

    /// Returns `true` if `data` has the JSON shape this kind expects.
    pub fn accepts(&self, data: &Json) -> bool {
        match self {
            ValueKind::String | ValueKind::Image => data.is_string(),
            ValueKind::Number | ValueKind::Integer => data.is_number(),
            ValueKind::Boolean => data.is_boolean(),
            ValueKind::Object => data.is_object(),
            ValueKind::Array => data.is_array(),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Setters shared by every variant. `default_value` is typed per variant and
// written out by hand.
macro_rules! common_setters {
    ($ty:ident) => {
        impl $ty {
            /// Create a value with the given field name.
            pub fn new(name: impl Into<String>) -> Self {
                Self {
                    name: name.into(),
                    ..Default::default()
                }
            }

            /// Set the human-readable description.
            pub fn description(mut self, description: impl Into<String>) -> Self {
                self.description = description.into();
                self
            }

            /// Mark the field as required.
            pub fn required(mut self) -> Self {
                self.required = true;
                self
            }

            /// Reference an example structure by name (documentation only).
            pub fn structure(mut self, structure: impl Into<String>) -> Self {
                self.structure = Some(structure.into());
                self
            }

            /// Append a custom check.
            pub fn check(mut self, check: impl Check + 'static, message: impl Into<String>) -> Self {
                self.checks.push(CheckRule::new(check, message));
                self
            }

            /// Append a custom check backed by a synchronous closure.
            pub fn check_fn<F>(mut self, predicate: F, message: impl Into<String>) -> Self
            where
                F: Fn(&Json) -> bool + Send + Sync + 'static,
            {
                self.checks.push(CheckRule::from_fn(predicate, message));
                self
            }

            /// Append a custom check backed by an async closure.
            pub fn check_async<F, Fut>(mut self, predicate: F, message: impl Into<String>) -> Self
            where
                F: Fn(Json) -> Fut + Send + Sync + 'static,
                Fut: Future<Output = Result<bool, CheckError>> + Send + 'static,
            {
                self.checks.push(CheckRule::from_async_fn(predicate, message));
                self
            }
        }
    };
}

/// A string field.
#[derive(Debug, Clone, Default)]
pub struct StringValue {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default_value: Option<String>,
    pub structure: Option<String>,
    pub checks: Vec<CheckRule>,
    /// Minimum length in characters (inclusive)
    pub min: Option<usize>,
    /// Maximum length in characters (inclusive)
    pub max: Option<usize>,
    /// Closed set of allowed literals
    pub options: Option<Vec<String>>,
    /// Named format the string must satisfy
    pub test: Option<StringTest>,
}

common_setters!(StringValue);

impl StringValue {
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn test(mut self, test: StringTest) -> Self {
        self.test = Some(test);
        self
    }
}

/// A floating point field.
#[derive(Debug, Clone, Default)]
pub struct NumberValue {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default_value: Option<f64>,
    pub structure: Option<String>,
    pub checks: Vec<CheckRule>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

common_setters!(NumberValue);

impl NumberValue {
    pub fn default_value(mut self, value: f64) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

/// A number field that must hold a mathematical integer.
#[derive(Debug, Clone, Default)]
pub struct IntegerValue {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default_value: Option<i64>,
    pub structure: Option<String>,
    pub checks: Vec<CheckRule>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

common_setters!(IntegerValue);

impl IntegerValue {
    pub fn default_value(mut self, value: i64) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }
}

/// A boolean field.
#[derive(Debug, Clone, Default)]
pub struct BooleanValue {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default_value: Option<bool>,
    pub structure: Option<String>,
    pub checks: Vec<CheckRule>,
}

common_setters!(BooleanValue);

impl BooleanValue {
    pub fn default_value(mut self, value: bool) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// A nested object field, validated recursively against `properties`.
#[derive(Debug, Clone, Default)]
pub struct ObjectValue {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default_value: Option<Map<String, Json>>,
    pub structure: Option<String>,
    pub checks: Vec<CheckRule>,
    /// Nested schema. Empty means any object is accepted.
    pub properties: Schema,
}

common_setters!(ObjectValue);

impl ObjectValue {
    pub fn default_value(mut self, value: Map<String, Json>) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn properties(mut self, properties: Schema) -> Self {
        self.properties = properties;
        self
    }
}

/// An array field.
#[derive(Debug, Clone, Default)]
pub struct ArrayValue {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default_value: Option<Vec<Json>>,
    pub structure: Option<String>,
    pub checks: Vec<CheckRule>,
    /// Minimum number of items (inclusive)
    pub min: Option<usize>,
    /// Maximum number of items (inclusive)
    pub max: Option<usize>,
    /// Reject arrays holding two equal items
    pub unique: bool,
    /// Shape every item must have
    pub items: Option<Box<Value>>,
    /// Shape at least one item must have
    pub contains: Option<Box<Value>>,
}

common_setters!(ArrayValue);

impl ArrayValue {
    pub fn default_value(mut self, value: Vec<Json>) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn items(mut self, items: impl Into<Value>) -> Self {
        self.items = Some(Box::new(items.into()));
        self
    }

    pub fn contains(mut self, contains: impl Into<Value>) -> Self {
        self.contains = Some(Box::new(contains.into()));
        self
    }
}

/// A string field holding an absolute image URL.
#[derive(Debug, Clone, Default)]
pub struct ImageValue {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default_value: Option<String>,
    pub structure: Option<String>,
    pub checks: Vec<CheckRule>,
}

common_setters!(ImageValue);

impl ImageValue {
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// One declared field of a [`Schema`].
#[derive(Debug, Clone)]
pub enum Value {
    String(StringValue),
    Number(NumberValue),
    Integer(IntegerValue),
    Boolean(BooleanValue),
    Object(ObjectValue),
    Array(ArrayValue),
    Image(ImageValue),
}

// Evaluate `$body` with `$v` bound to the inner struct of any variant.
macro_rules! each_variant {
    ($value:expr, $v:ident => $body:expr) => {
        match $value {
            Value::String($v) => $body,
            Value::Number($v) => $body,
            Value::Integer($v) => $body,
            Value::Boolean($v) => $body,
            Value::Object($v) => $body,
            Value::Array($v) => $body,
            Value::Image($v) => $body,
        }
    };
}

impl Value {
    /// Field name; the key of this value in its schema.
    pub fn name(&self) -> &str {
        each_variant!(self, v => &v.name)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
            Value::Integer(_) => ValueKind::Integer,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
            Value::Image(_) => ValueKind::Image,
        }
    }

    pub fn description(&self) -> &str {
        each_variant!(self, v => &v.description)
    }

    pub fn is_required(&self) -> bool {
        each_variant!(self, v => v.required)
    }

    pub fn structure(&self) -> Option<&str> {
        each_variant!(self, v => v.structure.as_deref())
    }

    pub fn checks(&self) -> &[CheckRule] {
        each_variant!(self, v => &v.checks)
    }

    /// The default value as JSON, if one is declared.
    ///
    /// A non-finite number default has no JSON form and counts as no default.
    pub fn default_json(&self) -> Option<Json> {
        match self {
            Value::String(v) => v.default_value.clone().map(Json::String),
            Value::Number(v) => v
                .default_value
                .and_then(serde_json::Number::from_f64)
                .map(Json::Number),
            Value::Integer(v) => v.default_value.map(Json::from),
            Value::Boolean(v) => v.default_value.map(Json::Bool),
            Value::Object(v) => v.default_value.clone().map(Json::Object),
            Value::Array(v) => v.default_value.clone().map(Json::Array),
            Value::Image(v) => v.default_value.clone().map(Json::String),
        }
    }

    /// Export a plain descriptor of this value and its constraints.
    pub fn export(&self) -> ValueDescriptor {
        let constraints = match self {
            Value::String(v) => Some(Constraints::String {
                min: v.min,
                max: v.max,
                options: v.options.clone(),
                test: v.test,
            }),
            Value::Number(v) => Some(Constraints::Number {
                min: v.min,
                max: v.max,
            }),
            Value::Integer(v) => Some(Constraints::Integer {
                min: v.min,
                max: v.max,
            }),
            Value::Object(v) => Some(Constraints::Object {
                properties: v.properties.export(),
            }),
            Value::Array(v) => Some(Constraints::Array {
                min: v.min,
                max: v.max,
                unique: v.unique,
                items: v.items.as_ref().map(|item| Box::new(item.export())),
                contains: v.contains.as_ref().map(|item| Box::new(item.export())),
            }),
            Value::Boolean(_) | Value::Image(_) => None,
        };

        ValueDescriptor {
            kind: self.kind(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            required: self.is_required(),
            structure: self.structure().map(str::to_string),
            default_value: self.default_json(),
            constraints,
        }
    }
}

macro_rules! impl_from_variant {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_variant! {
    StringValue => String,
    NumberValue => Number,
    IntegerValue => Integer,
    BooleanValue => Boolean,
    ObjectValue => Object,
    ArrayValue => Array,
    ImageValue => Image,
}
