//! Plain, serializable descriptors of schemas and values.
//!
//! This is the wire format of the `api.json` document consumed by the
//! documentation generator.

use crate::format::StringTest;
use crate::value::ValueKind;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value as Json;

/// Descriptor of a single value.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueDescriptor {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Json>,
    /// Type-specific constraints, flattened into the descriptor
    #[serde(flatten)]
    pub constraints: Option<Constraints>,
}

/// Type-specific constraints of a value.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Constraints {
    String {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        test: Option<StringTest>,
    },
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Integer {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Object {
        properties: SchemaDescriptor,
    },
    Array {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
        unique: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        items: Option<Box<ValueDescriptor>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        contains: Option<Box<ValueDescriptor>>,
    },
}

/// Descriptor of a whole schema: field name to [`ValueDescriptor`], in
/// declaration order. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDescriptor {
    fields: Vec<ValueDescriptor>,
}

impl SchemaDescriptor {
    pub(crate) fn new(fields: Vec<ValueDescriptor>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&ValueDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValueDescriptor> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for SchemaDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, field)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use serde_json::json;

    #[test]
    fn string_descriptor_carries_constraints() {
        let schema = Schema::new().with(
            StringValue::new("email")
                .description("Contact address")
                .required()
                .max(120)
                .test(StringTest::Email),
        );
        assert_eq!(
            serde_json::to_value(schema.export()).unwrap(),
            json!({
                "email": {
                    "type": "string",
                    "name": "email",
                    "description": "Contact address",
                    "required": true,
                    "max": 120,
                    "test": "email"
                }
            })
        );
    }

    #[test]
    fn nested_and_array_descriptors() {
        let schema = Schema::new()
            .with(
                ObjectValue::new("user")
                    .structure("User")
                    .properties(Schema::new().with(StringValue::new("id").required())),
            )
            .with(
                ArrayValue::new("tags")
                    .min(0)
                    .unique()
                    .items(StringValue::new("tag"))
                    .default_value(vec![json!("new")]),
            )
            .with(BooleanValue::new("active"));

        let exported = serde_json::to_value(schema.export()).unwrap();
        assert_eq!(
            exported["user"],
            json!({
                "type": "object",
                "name": "user",
                "description": "",
                "required": false,
                "structure": "User",
                "properties": {
                    "id": {"type": "string", "name": "id", "description": "", "required": true}
                }
            })
        );
        assert_eq!(exported["tags"]["min"], json!(0));
        assert_eq!(exported["tags"]["unique"], json!(true));
        assert_eq!(exported["tags"]["defaultValue"], json!(["new"]));
        assert_eq!(exported["tags"]["items"]["type"], json!("string"));
        assert_eq!(
            exported["active"],
            json!({"type": "boolean", "name": "active", "description": "", "required": false})
        );
    }

    #[test]
    fn keys_keep_declaration_order() {
        let schema = Schema::new()
            .with(StringValue::new("zeta"))
            .with(NumberValue::new("alpha"))
            .with(ImageValue::new("mid"));
        let exported = schema.export();
        assert_eq!(exported.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        let text = serde_json::to_string(&exported).unwrap();
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
    }
}
