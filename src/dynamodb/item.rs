use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

/// A DynamoDB item: attribute names mapped to typed values.
///
/// Every item in a table is identified by its primary key, so the key
/// attributes must be set before the item is written. The maximum item size
/// is 400 KB including attribute names.
///
/// # Example
///
/// ```
/// use aws_sdk_samples::dynamodb::Item;
///
/// let item = Item::new()
///     .set_number("year", 2013)
///     .set_string("title", "Rush")
///     .set_number("rating", 8.3);
/// assert_eq!(item.get_string("title"), Some(&"Rush".to_string()));
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Item {
    pub(crate) attributes: HashMap<String, AttributeValue>,
}

impl Item {
    /// Creates a new empty `Item`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a string attribute.
    pub fn set_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(key.into(), AttributeValue::S(value.into()));
        self
    }

    /// Sets a number attribute.
    ///
    /// DynamoDB transports numbers as strings, so the value is formatted here.
    pub fn set_number(mut self, key: impl Into<String>, value: impl Into<f64>) -> Self {
        self.attributes
            .insert(key.into(), AttributeValue::N(value.into().to_string()));
        self
    }

    /// Sets an attribute of any type.
    pub fn set(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Gets the value of an attribute as a string.
    pub fn get_string(&self, key: &str) -> Option<&String> {
        self.attributes.get(key).and_then(|av| av.as_s().ok())
    }

    /// Gets the value of an attribute as a number (f64).
    ///
    /// Returns `None` if the attribute doesn't exist, is not a number, or can't be parsed as f64.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.attributes
            .get(key)
            .and_then(|av| av.as_n().ok())
            .and_then(|n| n.parse().ok())
    }

    pub fn attributes(&self) -> &HashMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn into_attributes(self) -> HashMap<String, AttributeValue> {
        self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl From<HashMap<String, AttributeValue>> for Item {
    fn from(attributes: HashMap<String, AttributeValue>) -> Self {
        Self { attributes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters() {
        let item = Item::new()
            .set_string("key1", "value1")
            .set_number("key2", 42.0);

        assert_eq!(item.get_string("key1"), Some(&"value1".to_string()));
        assert_eq!(item.get_number("key2"), Some(42.0));
        assert_eq!(item.get_string("key2"), None);
        assert_eq!(item.get_number("key1"), None);
        assert_eq!(item.get_string("non_existent"), None);
    }

    #[test]
    fn numbers_are_sent_as_strings() {
        let item = Item::new().set_number("year", 2013).set_number("rating", 8.3);
        assert_eq!(
            item.attributes().get("year"),
            Some(&AttributeValue::N("2013".to_string()))
        );
        assert_eq!(
            item.attributes().get("rating"),
            Some(&AttributeValue::N("8.3".to_string()))
        );
    }
}
