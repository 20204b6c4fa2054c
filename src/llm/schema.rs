//! Declared response schemas for structured generation.
//!
//! Providers disagree on schema dialects: Gemini takes an `OpenAPI` subset
//! with upper-case type names, `OpenAI` takes standard JSON Schema. A
//! [`ResponseSchema`] is written once and rendered into either.

use serde_json::{Map, Value, json};

/// A response shape the model must produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSchema {
    /// A JSON string.
    String,
    /// A JSON number.
    Number,
    /// A JSON array of one item shape.
    Array(Box<Self>),
    /// A JSON object.
    Object {
        /// Properties in declaration order.
        properties: Vec<(String, Self)>,
        /// Names of required properties.
        required: Vec<String>,
    },
}

impl ResponseSchema {
    /// Builds an array schema.
    #[must_use]
    pub fn array(items: Self) -> Self {
        Self::Array(Box::new(items))
    }

    /// Builds an object schema where every listed property is required.
    #[must_use]
    pub fn object_all_required(properties: &[(&str, Self)]) -> Self {
        Self::Object {
            properties: properties
                .iter()
                .map(|(name, schema)| ((*name).to_string(), schema.clone()))
                .collect(),
            required: properties.iter().map(|(name, _)| (*name).to_string()).collect(),
        }
    }

    /// Returns true if the root of this schema is an object.
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object { .. })
    }

    /// Renders standard JSON Schema (lower-case type names).
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        self.render(false)
    }

    /// Renders the Gemini `OpenAPI` subset (upper-case type names).
    #[must_use]
    pub fn to_gemini_schema(&self) -> Value {
        self.render(true)
    }

    fn render(&self, upper: bool) -> Value {
        let type_name = |name: &str| {
            if upper {
                Value::String(name.to_uppercase())
            } else {
                Value::String(name.to_string())
            }
        };

        match self {
            Self::String => json!({ "type": type_name("string") }),
            Self::Number => json!({ "type": type_name("number") }),
            Self::Array(items) => json!({
                "type": type_name("array"),
                "items": items.render(upper),
            }),
            Self::Object {
                properties,
                required,
            } => {
                let mut props = Map::new();
                for (name, schema) in properties {
                    props.insert(name.clone(), schema.render(upper));
                }
                json!({
                    "type": type_name("object"),
                    "properties": props,
                    "required": required,
                })
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResponseSchema {
        ResponseSchema::array(ResponseSchema::object_all_required(&[
            ("name", ResponseSchema::String),
            ("gpa", ResponseSchema::Number),
        ]))
    }

    #[test]
    fn test_gemini_dialect_uses_upper_case_types() {
        let rendered = sample().to_gemini_schema();
        assert_eq!(rendered["type"], "ARRAY");
        assert_eq!(rendered["items"]["type"], "OBJECT");
        assert_eq!(rendered["items"]["properties"]["gpa"]["type"], "NUMBER");
        assert_eq!(rendered["items"]["required"], json!(["name", "gpa"]));
    }

    #[test]
    fn test_json_schema_dialect_uses_lower_case_types() {
        let rendered = sample().to_json_schema();
        assert_eq!(rendered["type"], "array");
        assert_eq!(rendered["items"]["properties"]["name"]["type"], "string");
    }

    #[test]
    fn test_is_object() {
        assert!(!sample().is_object());
        assert!(ResponseSchema::object_all_required(&[]).is_object());
    }
}
