use crate::common::{self, expression};
use crate::error::{Error, Result};
use crate::write::update_item;

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::Serialize;
use serde_dynamo::to_item;
use std::collections;

/// One action of a transactional write.
///
/// Every action may carry a condition; if any condition fails the whole
/// transaction is cancelled.
#[derive(Clone, Debug, PartialEq)]
pub enum TransactWriteItem<T> {
    /// Create or replace an item.
    Put {
        /// The table to write to.
        table_name: String,
        /// The item to put.
        item: T,
        /// Condition on the existing item.
        condition: Option<expression::ConditionExpression<T>>,
    },
    /// Remove an item by its primary key.
    Delete {
        /// The table to write to.
        table_name: String,
        /// The primary key of the item to delete.
        keys: common::key::Keys<T>,
        /// Condition on the existing item.
        condition: Option<expression::ConditionExpression<T>>,
    },
    /// Patch an item.
    Update {
        /// The table to write to.
        table_name: String,
        /// The primary key of the item to update.
        keys: common::key::Keys<T>,
        /// The attribute changes.
        patch: update_item::Patch<T>,
        /// Condition on the existing item.
        condition: Option<expression::ConditionExpression<T>>,
    },
    /// Require a condition on an item the transaction does not write.
    ConditionCheck {
        /// The table holding the item.
        table_name: String,
        /// The primary key of the checked item.
        keys: common::key::Keys<T>,
        /// Condition on the item.
        condition: expression::ConditionExpression<T>,
    },
}

/// Placeholder maps of a single action.
#[derive(Default)]
struct ActionExpressions {
    names: Option<collections::HashMap<String, String>>,
    values: Option<collections::HashMap<String, types::AttributeValue>>,
}

impl ActionExpressions {
    fn condition<T: Serialize>(
        &mut self,
        condition: Option<expression::ConditionExpression<T>>,
    ) -> Result<Option<String>> {
        condition
            .map(|condition| {
                let operation =
                    condition.into_expression_input(expression::Namespace::CONDITION)?;
                Ok(operation.merge_into(&mut self.names, &mut self.values))
            })
            .transpose()
    }
}

impl<T: Serialize> TryFrom<TransactWriteItem<T>> for types::TransactWriteItem {
    type Error = Error;

    fn try_from(action: TransactWriteItem<T>) -> Result<Self> {
        let mut expressions = ActionExpressions::default();
        let builder = match action {
            TransactWriteItem::Put {
                table_name,
                item,
                condition,
            } => {
                let condition_expression = expressions.condition(condition)?;
                let put = types::Put::builder()
                    .set_item(Some(to_item(item)?))
                    .table_name(table_name)
                    .set_condition_expression(condition_expression)
                    .set_expression_attribute_names(expressions.names)
                    .set_expression_attribute_values(expressions.values)
                    .build()?;
                Self::builder().put(put)
            }
            TransactWriteItem::Delete {
                table_name,
                keys,
                condition,
            } => {
                let condition_expression = expressions.condition(condition)?;
                let delete = types::Delete::builder()
                    .set_key(Some(keys.try_into()?))
                    .table_name(table_name)
                    .set_condition_expression(condition_expression)
                    .set_expression_attribute_names(expressions.names)
                    .set_expression_attribute_values(expressions.values)
                    .build()?;
                Self::builder().delete(delete)
            }
            TransactWriteItem::Update {
                table_name,
                keys,
                patch,
                condition,
            } => {
                let update_expression = patch
                    .into_expression_input()?
                    .merge_into(&mut expressions.names, &mut expressions.values);
                let condition_expression = expressions.condition(condition)?;
                let update = types::Update::builder()
                    .set_key(Some(keys.try_into()?))
                    .update_expression(update_expression)
                    .table_name(table_name)
                    .set_condition_expression(condition_expression)
                    .set_expression_attribute_names(expressions.names)
                    .set_expression_attribute_values(expressions.values)
                    .build()?;
                Self::builder().update(update)
            }
            TransactWriteItem::ConditionCheck {
                table_name,
                keys,
                condition,
            } => {
                let condition_expression = expressions
                    .condition(Some(condition))?
                    .unwrap_or_default();
                let condition_check = types::ConditionCheck::builder()
                    .set_key(Some(keys.try_into()?))
                    .table_name(table_name)
                    .condition_expression(condition_expression)
                    .set_expression_attribute_names(expressions.names)
                    .set_expression_attribute_values(expressions.values)
                    .build()?;
                Self::builder().condition_check(condition_check)
            }
        };
        Ok(builder.build())
    }
}

/// Transactional write operation.
///
/// The actions are applied all-or-nothing. Supplying the same
/// `client_request_token` again within the idempotency window makes a retry a
/// no-op instead of a second write.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_typed::write;
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let transaction = write::transact_write_items::TransactWriteItems {
///     items: vec![
///         write::transact_write_items::TransactWriteItem::Put {
///             table_name: "users".to_string(),
///             item: json!({"id": "1", "name": "John"}),
///             condition: None,
///         },
///         write::transact_write_items::TransactWriteItem::Put {
///             table_name: "users".to_string(),
///             item: json!({"id": "2", "name": "Jane"}),
///             condition: None,
///         },
///     ],
///     client_request_token: Some("signup-1-2".to_string()),
///     ..Default::default()
/// };
/// transaction.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TransactWriteItems<T> {
    /// The actions, in request order.
    ///
    /// At most 100 actions, and no two of them may target the same item.
    pub items: Vec<TransactWriteItem<T>>,
    /// Idempotency token.
    ///
    /// A second call with the same token within ten minutes succeeds without
    /// writing again. Reusing the token with different actions fails with
    /// `IdempotentParameterMismatchException`.
    pub client_request_token: Option<String>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to return item collection metrics.
    pub return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
}

impl<T> Default for TransactWriteItems<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            client_request_token: None,
            return_consumed_capacity: None,
            return_item_collection_metrics: None,
        }
    }
}

impl<T: Serialize> TryFrom<TransactWriteItems<T>>
    for operation::transact_write_items::TransactWriteItemsInput
{
    type Error = Error;

    fn try_from(transact_write_items: TransactWriteItems<T>) -> Result<Self> {
        let transact_items = transact_write_items
            .items
            .into_iter()
            .map(types::TransactWriteItem::try_from)
            .collect::<Result<Vec<_>>>()?;
        let operation = Self::builder()
            .set_transact_items(Some(transact_items))
            .set_client_request_token(transact_write_items.client_request_token)
            .set_return_consumed_capacity(transact_write_items.return_consumed_capacity)
            .set_return_item_collection_metrics(
                transact_write_items.return_item_collection_metrics,
            )
            .build()?;
        Ok(operation)
    }
}

impl<T: Serialize> TransactWriteItems<T> {
    /// Execute the transactional write operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.transact_write_items", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::transact_write_items::TransactWriteItemsOutput,
        error::SdkError<operation::transact_write_items::TransactWriteItemsError>,
    > {
        let transact_write_items: operation::transact_write_items::TransactWriteItemsInput =
            self.try_into().map_err(error::BuildError::other)?;
        client
            .transact_write_items()
            .set_transact_items(transact_write_items.transact_items)
            .set_client_request_token(transact_write_items.client_request_token)
            .set_return_consumed_capacity(transact_write_items.return_consumed_capacity)
            .set_return_item_collection_metrics(
                transact_write_items.return_item_collection_metrics,
            )
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indexmap::IndexMap;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn keys() -> common::key::Keys<Value> {
        common::key::Keys::new(common::key::Key::new("id", json!("1")))
    }

    fn wire_keys() -> collections::HashMap<String, types::AttributeValue> {
        collections::HashMap::from([(
            "id".to_string(),
            types::AttributeValue::S("1".to_string()),
        )])
    }

    fn version_condition(version: i64) -> Option<expression::ConditionExpression<Value>> {
        Some(expression::ConditionExpression {
            expression: "#version = :version".to_string(),
            values: collections::HashMap::from([(":version".to_string(), json!(version))]),
            ..Default::default()
        })
    }

    #[rstest]
    #[case::unconditional_put(
        TransactWriteItem::Put {
            table_name: "users".to_string(),
            item: json!({"id": "1"}),
            condition: None,
        },
        types::TransactWriteItem::builder()
            .put(
                types::Put::builder()
                    .set_item(Some(wire_keys()))
                    .table_name("users")
                    .build()
                    .unwrap()
            )
            .build()
    )]
    #[case::conditional_delete(
        TransactWriteItem::Delete {
            table_name: "users".to_string(),
            keys: keys(),
            condition: version_condition(3),
        },
        types::TransactWriteItem::builder()
            .delete(
                types::Delete::builder()
                    .set_key(Some(wire_keys()))
                    .table_name("users")
                    .condition_expression("#COND_KEY0 = :COND_VALUE0")
                    .expression_attribute_names("#COND_KEY0", "version")
                    .expression_attribute_values(
                        ":COND_VALUE0",
                        types::AttributeValue::N("3".to_string())
                    )
                    .build()
                    .unwrap()
            )
            .build()
    )]
    #[case::conditional_update(
        TransactWriteItem::Update {
            table_name: "users".to_string(),
            keys: keys(),
            patch: update_item::Patch {
                set: IndexMap::from(
                    [
                        ("version".to_string(), json!(4)),
                    ]
                ),
                ..Default::default()
            },
            condition: version_condition(3),
        },
        types::TransactWriteItem::builder()
            .update(
                types::Update::builder()
                    .set_key(Some(wire_keys()))
                    .update_expression("SET #KEY0 = :VALUE0")
                    .table_name("users")
                    .condition_expression("#COND_KEY0 = :COND_VALUE0")
                    .expression_attribute_names("#KEY0", "version")
                    .expression_attribute_names("#COND_KEY0", "version")
                    .expression_attribute_values(
                        ":VALUE0",
                        types::AttributeValue::N("4".to_string())
                    )
                    .expression_attribute_values(
                        ":COND_VALUE0",
                        types::AttributeValue::N("3".to_string())
                    )
                    .build()
                    .unwrap()
            )
            .build()
    )]
    #[case::condition_check(
        TransactWriteItem::ConditionCheck {
            table_name: "accounts".to_string(),
            keys: keys(),
            condition: expression::ConditionExpression {
                expression: "attribute_exists(#id)".to_string(),
                ..Default::default()
            },
        },
        types::TransactWriteItem::builder()
            .condition_check(
                types::ConditionCheck::builder()
                    .set_key(Some(wire_keys()))
                    .table_name("accounts")
                    .condition_expression("attribute_exists(#COND_KEY0)")
                    .expression_attribute_names("#COND_KEY0", "id")
                    .build()
                    .unwrap()
            )
            .build()
    )]
    fn test_transact_write_item(
        #[case] args: TransactWriteItem<Value>,
        #[case] expected: types::TransactWriteItem,
    ) {
        let actual: types::TransactWriteItem = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_transact_write_items() {
        let transaction = TransactWriteItems {
            items: vec![
                TransactWriteItem::Put {
                    table_name: "users".to_string(),
                    item: json!({"id": "1"}),
                    condition: None,
                },
                TransactWriteItem::Delete {
                    table_name: "users".to_string(),
                    keys: keys(),
                    condition: None,
                },
            ],
            client_request_token: Some("token-1".to_string()),
            ..Default::default()
        };
        let actual: operation::transact_write_items::TransactWriteItemsInput =
            transaction.try_into().unwrap();
        assert_eq!(actual.client_request_token.as_deref(), Some("token-1"));
        let transact_items = actual.transact_items.unwrap();
        assert_eq!(transact_items.len(), 2);
        assert!(transact_items[0].put.is_some());
        assert!(transact_items[1].delete.is_some());
    }

    #[test]
    fn test_transact_write_items_empty_patch() {
        let transaction = TransactWriteItems {
            items: vec![TransactWriteItem::Update {
                table_name: "users".to_string(),
                keys: keys(),
                patch: update_item::Patch::default(),
                condition: None,
            }],
            ..Default::default()
        };
        let actual: Result<operation::transact_write_items::TransactWriteItemsInput> =
            transaction.try_into();
        assert!(matches!(
            actual,
            Err(Error::Expression(expression::ExpressionError::EmptyPatch))
        ));
    }
}
