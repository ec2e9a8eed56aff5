use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::{Error, Result, to_attribute_value};
use std::collections;

/// A single key attribute.
///
/// ```rust
/// use dynamodb_typed::common::key;
///
/// let key = key::Key::new("id", "1".to_string());
/// assert_eq!(key.name, "id");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key<T> {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: T,
}

impl<T> Key<T> {
    /// Build a key attribute.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Primary key of an item: a partition key and, for composite keys, a sort key.
///
/// ```rust
/// use dynamodb_typed::common::key;
///
/// let keys = key::Keys::new(key::Key::new("user_id", "u1".to_string()))
///     .with_sort_key(key::Key::new("order_id", "o1".to_string()));
/// assert!(keys.sort_key.is_some());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keys<T> {
    /// The partition key.
    pub partition_key: Key<T>,
    /// The sort key, for tables with a composite primary key.
    pub sort_key: Option<Key<T>>,
}

impl<T> Keys<T> {
    /// Primary key made of a partition key only.
    pub fn new(partition_key: Key<T>) -> Self {
        Self {
            partition_key,
            sort_key: None,
        }
    }

    /// Add a sort key.
    pub fn with_sort_key(mut self, sort_key: Key<T>) -> Self {
        self.sort_key = Some(sort_key);
        self
    }
}

impl<T: Serialize> TryFrom<Keys<T>> for collections::HashMap<String, types::AttributeValue> {
    type Error = Error;

    fn try_from(keys: Keys<T>) -> Result<Self> {
        let mut attributes = Self::with_capacity(2);
        for key in std::iter::once(keys.partition_key).chain(keys.sort_key) {
            let value = to_attribute_value(key.value)?;
            attributes.insert(key.name, value);
        }
        Ok(attributes)
    }
}
