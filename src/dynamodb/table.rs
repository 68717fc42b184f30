use crate::dynamodb::{FieldType, Schema};

/// A key attribute: its name and scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAttribute<'a> {
    pub name: &'a str,
    pub field_type: FieldType,
}

/// DynamoDB table configuration.
///
/// The primary key is a partition key plus an optional sort key. Key
/// attributes default to the string type; use [`Table::with_key_types`] for
/// numeric keys such as the movie table's `year`.
///
/// ```
/// use aws_sdk_samples::dynamodb::{FieldType, Table};
///
/// let table = Table::new("movies", "year", Some("title"))
///     .with_key_types(FieldType::Number, FieldType::String);
/// assert_eq!(table.partition_key(), "year");
/// ```
#[derive(Debug, Clone)]
pub struct Table<'a> {
    name: &'a str,
    partition_key: KeyAttribute<'a>,
    sort_key: Option<KeyAttribute<'a>>,
    schema: Option<Schema>,
}

impl<'a> Table<'a> {
    pub fn new(name: &'a str, partition_key: &'a str, sort_key: Option<&'a str>) -> Self {
        Self {
            name,
            partition_key: KeyAttribute {
                name: partition_key,
                field_type: FieldType::String,
            },
            sort_key: sort_key.map(|name| KeyAttribute {
                name,
                field_type: FieldType::String,
            }),
            schema: None,
        }
    }

    /// Sets the key attribute types. The sort key type is ignored when the
    /// table has no sort key.
    pub fn with_key_types(mut self, partition: FieldType, sort: FieldType) -> Self {
        self.partition_key.field_type = partition;
        if let Some(sort_key) = self.sort_key.as_mut() {
            sort_key.field_type = sort;
        }
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn partition_key(&self) -> &str {
        self.partition_key.name
    }

    pub fn sort_key(&self) -> Option<&str> {
        self.sort_key.map(|key| key.name)
    }

    /// Partition key followed by the sort key, if any.
    pub fn key_attributes(&self) -> Vec<KeyAttribute<'a>> {
        std::iter::once(self.partition_key)
            .chain(self.sort_key)
            .collect()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn is_key(&self, attribute: &str) -> bool {
        self.key_attributes().iter().any(|key| key.name == attribute)
    }
}
