use aws_sdk_dynamodb::types::{AttributeValue, ScalarAttributeType};
use std::collections::BTreeMap;

/// The attributes an application expects items in a table to carry.
///
/// DynamoDB itself is schemaless apart from the key attributes; this is only
/// used to drive prompts and printing in the interactive shell.
///
/// ```
/// use aws_sdk_samples::dynamodb::{FieldType, Schema};
///
/// let schema = Schema::new()
///     .add_field("year", FieldType::Number)
///     .add_field("title", FieldType::String);
/// assert_eq!(schema.fields().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: BTreeMap<String, FieldType>,
}

/// Scalar attribute types usable as table keys and schema fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
}

impl FieldType {
    /// Wraps raw user input as an attribute value of this type.
    ///
    /// Numbers are validated locally so a typo fails before the request is sent.
    pub fn attribute_value(self, raw: &str) -> anyhow::Result<AttributeValue> {
        match self {
            FieldType::String => Ok(AttributeValue::S(raw.to_string())),
            FieldType::Number => {
                let number: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("'{raw}' is not a number"))?;
                Ok(AttributeValue::N(number.to_string()))
            }
        }
    }
}

impl From<FieldType> for ScalarAttributeType {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => ScalarAttributeType::S,
            FieldType::Number => ScalarAttributeType::N,
        }
    }
}

impl Schema {
    /// Creates a new empty `Schema`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field to the schema and returns the modified `Schema`.
    pub fn add_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    /// Returns a reference to the fields in the schema.
    pub fn fields(&self) -> &BTreeMap<String, FieldType> {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_kept_in_name_order() {
        let schema = Schema::new()
            .add_field("title", FieldType::String)
            .add_field("rating", FieldType::Number);

        let names: Vec<_> = schema.fields().keys().map(String::as_str).collect();
        assert_eq!(names, ["rating", "title"]);
        assert_eq!(schema.fields().get("rating"), Some(&FieldType::Number));
    }

    #[test]
    fn numbers_are_validated() {
        assert_eq!(
            FieldType::Number.attribute_value(" 42 ").unwrap(),
            AttributeValue::N("42".to_string())
        );
        assert!(FieldType::Number.attribute_value("forty-two").is_err());
        assert_eq!(
            FieldType::String.attribute_value("forty-two").unwrap(),
            AttributeValue::S("forty-two".to_string())
        );
    }

    #[test]
    fn key_types_map_to_scalar_types() {
        assert_eq!(ScalarAttributeType::from(FieldType::Number), ScalarAttributeType::N);
        assert_eq!(ScalarAttributeType::from(FieldType::String), ScalarAttributeType::S);
    }
}
