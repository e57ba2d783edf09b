//! # routeforge-schema
//!
//! Runtime schema validation for routeforge. A [`Schema`] is an ordered set of
//! named [`Value`]s; validating a JSON object against it checks presence, type
//! and constraints of every field, fills in defaults, and reports the first
//! failing rule as a [`ValidationError`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use routeforge_schema::prelude::*;
//!
//! let mut schema = Schema::new();
//! schema
//!     .add_string(StringValue::new("name").required().min(1).max(50))
//!     .add_string(StringValue::new("email").required().test(StringTest::Email))
//!     .add_integer(IntegerValue::new("age").min(18).max(65))
//!     .add_array(ArrayValue::new("tags").unique().items(StringValue::new("tag")));
//!
//! match schema.validate_value(&json!({ "name": "Al" })).await {
//!     Ok(data) => println!("valid: {data}"),
//!     Err(err) => println!("{err}"), // The field "email" has not been provided.
//! }
//! ```
//!
//! ## Messages
//!
//! Every rule violation reads `The field "<name>" <rule>.`, for example
//! `The field "age" must be between 18 and 65.` Array elements are named
//! `<name>[<index>]`. A custom check that rejects a value reports its own
//! message with a trailing period.
//!
//! ## Export
//!
//! [`Schema::export`] produces a [`SchemaDescriptor`], which serializes to the
//! field map written into `api.json`.

mod check;
mod error;
mod export;
mod format;
mod schema;
mod value;

pub use check::{AsyncFnCheck, Check, CheckError, CheckRule, FnCheck};
pub use error::{SchemaError, ValidationError};
pub use export::{Constraints, SchemaDescriptor, ValueDescriptor};
pub use format::{is_absolute_url, StringTest, UnknownStringTest};
pub use schema::Schema;
pub use value::{
    ArrayValue, BooleanValue, ImageValue, IntegerValue, NumberValue, ObjectValue, StringValue,
    Value, ValueKind,
};

// Re-exported for `Check` implementations outside this crate
pub use async_trait::async_trait;

/// Prelude module for schema declarations
pub mod prelude {
    pub use crate::check::{Check, CheckError, CheckRule};
    pub use crate::error::{SchemaError, ValidationError};
    pub use crate::format::StringTest;
    pub use crate::schema::Schema;
    pub use crate::value::{
        ArrayValue, BooleanValue, ImageValue, IntegerValue, NumberValue, ObjectValue,
        StringValue, Value, ValueKind,
    };
    pub use serde_json::json;
}

#[cfg(test)]
mod tests;
