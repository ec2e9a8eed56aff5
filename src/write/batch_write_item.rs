use crate::common;
use crate::error::{Error, Result};

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::Serialize;
use serde_dynamo::to_item;
use std::collections;

/// A single request within a batch write operation.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteRequest<T> {
    /// Create or replace an item.
    Put {
        /// The item to put into the table.
        item: T,
    },
    /// Remove an item by its primary key.
    Delete {
        /// The primary key of the item to delete.
        keys: common::key::Keys<T>,
    },
}

impl<T: Serialize> TryFrom<WriteRequest<T>> for types::WriteRequest {
    type Error = Error;

    fn try_from(write_request: WriteRequest<T>) -> Result<Self> {
        let builder = match write_request {
            WriteRequest::Put { item } => {
                let put_request = types::PutRequest::builder()
                    .set_item(Some(to_item(item)?))
                    .build()?;
                Self::builder().put_request(put_request)
            }
            WriteRequest::Delete { keys } => {
                let delete_request = types::DeleteRequest::builder()
                    .set_key(Some(keys.try_into()?))
                    .build()?;
                Self::builder().delete_request(delete_request)
            }
        };
        Ok(builder.build())
    }
}

/// Batch write item operation.
///
/// The requests are not atomic: each one succeeds or fails on its own, and
/// throttled requests come back in `unprocessed_items`.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_typed::write;
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let batch_write = write::batch_write_item::BatchWriteItem::put_items(
///     "users",
///     vec![json!({"id": "1", "name": "John"}), json!({"id": "2", "name": "Jane"})],
/// );
/// let output = batch_write.send(client).await?;
/// let retry = output.unprocessed_items;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchWriteItem<T> {
    /// A map of table names to lists of write requests.
    pub request_items: collections::HashMap<String, Vec<WriteRequest<T>>>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to return item collection metrics.
    pub return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
}

impl<T> BatchWriteItem<T> {
    /// Put every item into a single table.
    pub fn put_items(table_name: impl Into<String>, items: impl IntoIterator<Item = T>) -> Self {
        let requests = items
            .into_iter()
            .map(|item| WriteRequest::Put { item })
            .collect();
        Self {
            request_items: collections::HashMap::from([(table_name.into(), requests)]),
            return_consumed_capacity: None,
            return_item_collection_metrics: None,
        }
    }
}

impl<T: Serialize> TryFrom<BatchWriteItem<T>> for operation::batch_write_item::BatchWriteItemInput {
    type Error = Error;

    fn try_from(batch_write_item: BatchWriteItem<T>) -> Result<Self> {
        let mut request_items =
            collections::HashMap::with_capacity(batch_write_item.request_items.len());
        for (table_name, table_requests) in batch_write_item.request_items {
            let table_requests = table_requests
                .into_iter()
                .map(types::WriteRequest::try_from)
                .collect::<Result<Vec<_>>>()?;
            request_items.insert(table_name, table_requests);
        }
        let operation = Self::builder()
            .set_request_items(Some(request_items))
            .set_return_consumed_capacity(batch_write_item.return_consumed_capacity)
            .set_return_item_collection_metrics(batch_write_item.return_item_collection_metrics)
            .build()?;
        Ok(operation)
    }
}

impl<T: Serialize> BatchWriteItem<T> {
    /// Execute the batch write item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.batch_write_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::batch_write_item::BatchWriteItemOutput,
        error::SdkError<operation::batch_write_item::BatchWriteItemError>,
    > {
        let batch_write_item: operation::batch_write_item::BatchWriteItemInput =
            self.try_into().map_err(error::BuildError::other)?;
        client
            .batch_write_item()
            .set_request_items(batch_write_item.request_items)
            .set_return_consumed_capacity(batch_write_item.return_consumed_capacity)
            .set_return_item_collection_metrics(batch_write_item.return_item_collection_metrics)
            .send()
            .await
    }
}
