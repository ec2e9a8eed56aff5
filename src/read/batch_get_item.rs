use crate::error::{Error, Result};
use crate::{common, read};

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::{Serialize, de::DeserializeOwned};
use std::collections;

/// Keys to read from one table within a batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchGetTable<T> {
    /// The primary keys of the items to retrieve.
    pub keys: Vec<common::key::Keys<T>>,
    /// Table name and read arguments shared by every key.
    pub single_read_args: read::common::SingleReadArgs,
}

impl<T: Serialize> BatchGetTable<T> {
    fn into_request_item(self) -> Result<(String, types::KeysAndAttributes)> {
        let single_read_operation: read::common::SingleReadInput = self.single_read_args.into();
        let mut keys = Vec::with_capacity(self.keys.len());
        for key in self.keys {
            keys.push(key.try_into()?);
        }
        let keys_and_attributes = types::KeysAndAttributes::builder()
            .set_consistent_read(single_read_operation.consistent_read)
            .set_expression_attribute_names(single_read_operation.expression_attribute_names)
            .set_keys(Some(keys))
            .set_projection_expression(single_read_operation.projection_expression)
            .build()?;
        Ok((single_read_operation.table_name, keys_and_attributes))
    }
}

/// Batch get item operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_typed::{common, read};
/// use serde_json::Value;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let batch_get = read::batch_get_item::BatchGetItem {
///     tables: vec![read::batch_get_item::BatchGetTable {
///         keys: vec![
///             common::key::Keys::new(common::key::Key::new("id", "1".to_string())),
///             common::key::Keys::new(common::key::Key::new("id", "2".to_string())),
///         ],
///         single_read_args: read::common::SingleReadArgs {
///             table_name: "users".to_string(),
///             ..Default::default()
///         },
///     }],
///     ..Default::default()
/// };
/// let users: Vec<Value> = batch_get.fetch(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchGetItem<T> {
    /// Keys to read, grouped by table.
    pub tables: Vec<BatchGetTable<T>>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
}

impl<T: Serialize> TryFrom<BatchGetItem<T>> for operation::batch_get_item::BatchGetItemInput {
    type Error = Error;

    fn try_from(batch_get_item: BatchGetItem<T>) -> Result<Self> {
        let mut request_items = collections::HashMap::with_capacity(batch_get_item.tables.len());
        for table in batch_get_item.tables {
            let (table_name, keys_and_attributes) = table.into_request_item()?;
            request_items.insert(table_name, keys_and_attributes);
        }
        let input = Self::builder()
            .set_request_items(Some(request_items))
            .set_return_consumed_capacity(batch_get_item.return_consumed_capacity)
            .build()?;
        Ok(input)
    }
}

impl<T: Serialize> BatchGetItem<T> {
    fn builder(
        self,
        client: &Client,
    ) -> Result<operation::batch_get_item::builders::BatchGetItemFluentBuilder> {
        let batch_get_item: operation::batch_get_item::BatchGetItemInput = self.try_into()?;
        let builder = client
            .batch_get_item()
            .set_request_items(batch_get_item.request_items)
            .set_return_consumed_capacity(batch_get_item.return_consumed_capacity);
        Ok(builder)
    }

    /// Execute the batch get item operation.
    ///
    /// Keys the service could not process are returned in `unprocessed_keys`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.batch_get_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::batch_get_item::BatchGetItemOutput,
        error::SdkError<operation::batch_get_item::BatchGetItemError>,
    > {
        self.builder(client)
            .map_err(error::BuildError::other)?
            .send()
            .await
    }

    /// Execute the batch get item operation and decode the items of every table.
    ///
    /// Keys the service could not process (`unprocessed_keys`, typically under
    /// throttling) are not retried and their items are missing from the result.
    /// Use [`Self::send`] when the caller needs to resubmit them.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.batch_get_item_fetch", skip_all, err)
    )]
    pub async fn fetch<U: DeserializeOwned>(self, client: &Client) -> Result<Vec<U>> {
        let output = self
            .builder(client)?
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        #[cfg(feature = "tracing")]
        if let Some(unprocessed_keys) = output
            .unprocessed_keys
            .as_ref()
            .filter(|keys| !keys.is_empty())
        {
            tracing::warn!(
                tables = unprocessed_keys.len(),
                "batch get returned unprocessed keys"
            );
        }
        let mut items = Vec::new();
        for table_items in output.responses.unwrap_or_default().into_values() {
            items.extend(read::common::decode_items::<U>(table_items)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case::single_table(
        BatchGetItem {
            tables: vec![
                BatchGetTable {
                    keys: vec![
                        common::key::Keys::new(
                            common::key::Key::new("id", json!("1"))
                        ),
                        common::key::Keys::new(
                            common::key::Key::new("id", json!("2"))
                        ),
                    ],
                    single_read_args: read::common::SingleReadArgs {
                        table_name: "users".to_string(),
                        ..Default::default()
                    },
                },
            ],
            ..Default::default()
        },
        operation::batch_get_item::BatchGetItemInput::builder()
            .set_request_items(
                Some(
                    collections::HashMap::from(
                        [(
                            "users".to_string(),
                            types::KeysAndAttributes::builder()
                                .set_keys(
                                    Some(
                                        vec![
                                            collections::HashMap::from(
                                                [(
                                                    "id".to_string(),
                                                    types::AttributeValue::S("1".to_string()),
                                                )]
                                            ),
                                            collections::HashMap::from(
                                                [(
                                                    "id".to_string(),
                                                    types::AttributeValue::S("2".to_string()),
                                                )]
                                            ),
                                        ]
                                    )
                                )
                                .build()
                                .unwrap(),
                        )]
                    )
                )
            )
            .build()
            .unwrap()
    )]
    #[case::projection_and_consistent_read(
        BatchGetItem {
            tables: vec![
                BatchGetTable {
                    keys: vec![
                        common::key::Keys::new(
                            common::key::Key::new("id", json!("1"))
                        ),
                    ],
                    single_read_args: read::common::SingleReadArgs {
                        consistent_read: Some(true),
                        projection: Some(
                            common::projection::Projection::Attributes(
                                vec![
                                    "name".to_string(),
                                ]
                            )
                        ),
                        table_name: "users".to_string(),
                        ..Default::default()
                    },
                },
            ],
            return_consumed_capacity: Some(
                types::ReturnConsumedCapacity::Total
            ),
        },
        operation::batch_get_item::BatchGetItemInput::builder()
            .set_request_items(
                Some(
                    collections::HashMap::from(
                        [(
                            "users".to_string(),
                            types::KeysAndAttributes::builder()
                                .set_consistent_read(Some(true))
                                .set_expression_attribute_names(
                                    Some(
                                        collections::HashMap::from(
                                            [
                                                ("#ATTR0".to_string(), "name".to_string()),
                                            ]
                                        )
                                    )
                                )
                                .set_keys(
                                    Some(
                                        vec![
                                            collections::HashMap::from(
                                                [(
                                                    "id".to_string(),
                                                    types::AttributeValue::S("1".to_string()),
                                                )]
                                            ),
                                        ]
                                    )
                                )
                                .set_projection_expression(Some("#ATTR0".to_string()))
                                .build()
                                .unwrap(),
                        )]
                    )
                )
            )
            .set_return_consumed_capacity(Some(types::ReturnConsumedCapacity::Total))
            .build()
            .unwrap()
    )]
    fn test_batch_get_item(
        #[case] args: BatchGetItem<Value>,
        #[case] expected: operation::batch_get_item::BatchGetItemInput,
    ) {
        let actual: operation::batch_get_item::BatchGetItemInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
