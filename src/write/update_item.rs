use crate::common::{self, expression};
use crate::error::{Error, Result};
use crate::write;

use aws_sdk_dynamodb::{Client, error, operation, types};
use indexmap::IndexMap;
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Attribute changes applied by an update.
///
/// Attributes in `set` are assigned in insertion order, then attributes in
/// `remove` are removed. Each distinct attribute name gets one placeholder.
///
/// ```rust
/// use dynamodb_typed::write::update_item;
/// use indexmap::IndexMap;
///
/// let patch = update_item::Patch {
///     set: IndexMap::from([("name".to_string(), "Alice".to_string())]),
///     remove: vec!["nickname".to_string()],
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch<T> {
    /// Attributes to assign, keyed by attribute name.
    ///
    /// Assignments are emitted in insertion order. A `None` or unit value is
    /// stored as `NULL`, not removed; use `remove` for that.
    pub set: IndexMap<String, T>,
    /// Attributes to remove.
    pub remove: Vec<String>,
}

impl<T> Patch<T> {
    /// Whether the patch neither sets nor removes anything.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }
}

fn clause(action: &str, actions: Vec<String>) -> String {
    if actions.is_empty() {
        String::new()
    } else {
        format!("{action} {}", actions.join(", "))
    }
}

impl<T: Serialize> Patch<T> {
    pub(crate) fn into_expression_input(self) -> Result<common::ExpressionInput> {
        if self.is_empty() {
            return Err(expression::ExpressionError::EmptyPatch.into());
        }
        let namespace = expression::Namespace::UPDATE;
        let mut names: IndexMap<String, String> = IndexMap::new();
        let mut name_placeholder = |name: String| {
            let index = names.len();
            names
                .entry(name)
                .or_insert_with(|| namespace.name_placeholder(index))
                .clone()
        };
        let mut expression_attribute_values = collections::HashMap::with_capacity(self.set.len());
        let mut assignments = Vec::with_capacity(self.set.len());
        for (index, (name, value)) in self.set.into_iter().enumerate() {
            let name = name_placeholder(name);
            let value_placeholder = namespace.value_placeholder(index);
            assignments.push(format!("{name} = {value_placeholder}"));
            expression_attribute_values.insert(value_placeholder, to_attribute_value(value)?);
        }
        let removals: Vec<String> = self.remove.into_iter().map(name_placeholder).collect();
        let set = common::ExpressionInput {
            expression: clause("SET", assignments),
            expression_attribute_values,
            ..Default::default()
        };
        let remove = common::ExpressionInput {
            expression: clause("REMOVE", removals),
            ..Default::default()
        };
        let mut operation = common::ExpressionInput::merge(" ", vec![set, remove]);
        operation.expression_attribute_names = names
            .into_iter()
            .map(|(name, placeholder)| (placeholder, name))
            .collect();
        Ok(operation)
    }
}

/// update item operation
#[derive(Debug, PartialEq)]
struct UpdateItemInput {
    keys: collections::HashMap<String, types::AttributeValue>,
    update_expression: String,
    write_operation: write::common::WriteInput,
}

/// Update item operation.
///
/// Only the attributes named by the patch are touched. Missing items are
/// created, unless a condition prevents it.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_typed::{common, write};
/// use indexmap::IndexMap;
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let update_item = write::update_item::UpdateItem {
///     keys: common::key::Keys::new(common::key::Key::new("id", json!("1"))),
///     patch: write::update_item::Patch {
///         set: IndexMap::from([("age".to_string(), json!(31))]),
///         ..Default::default()
///     },
///     write_args: write::common::WriteArgs {
///         table_name: "users".to_string(),
///         ..Default::default()
///     },
/// };
/// update_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateItem<T> {
    /// The primary key of the item to update.
    pub keys: common::key::Keys<T>,
    /// The attribute changes.
    pub patch: Patch<T>,
    /// Write arguments (table name, condition, return values, ...).
    pub write_args: write::common::WriteArgs<T>,
}

impl<T: Serialize> TryFrom<UpdateItem<T>> for UpdateItemInput {
    type Error = Error;

    fn try_from(update_item: UpdateItem<T>) -> Result<Self> {
        let keys = update_item.keys.try_into()?;
        let patch = update_item.patch.into_expression_input()?;
        let (write_operation, update_expression) =
            write::common::WriteInput::new(update_item.write_args, Some(patch))?;
        let operation = Self {
            keys,
            update_expression: update_expression.unwrap_or_default(),
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> UpdateItem<T> {
    /// Execute the update item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.update_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::update_item::UpdateItemOutput,
        error::SdkError<operation::update_item::UpdateItemError>,
    > {
        let update_item: UpdateItemInput = self.try_into().map_err(error::BuildError::other)?;
        let builder = client
            .update_item()
            .set_key(Some(update_item.keys))
            .update_expression(update_item.update_expression);
        crate::apply_write_operation!(builder, update_item.write_operation)
            .send()
            .await
    }
}
