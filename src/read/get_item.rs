use crate::error::{Error, Result};
use crate::{common, read};

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::{Serialize, de::DeserializeOwned};
use serde_dynamo::from_item;
use std::collections;

/// get item operation
#[derive(Clone, Debug, Default, PartialEq)]
struct GetItemInput {
    keys: collections::HashMap<String, types::AttributeValue>,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    single_read_operation: read::common::SingleReadInput,
}

impl GetItemInput {
    fn builder(self, client: &Client) -> operation::get_item::builders::GetItemFluentBuilder {
        let builder = client
            .get_item()
            .set_key(Some(self.keys))
            .set_return_consumed_capacity(self.return_consumed_capacity);
        crate::apply_single_read_operation!(builder, self.single_read_operation)
    }
}

/// Get item operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_typed::{common, read};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: String,
///     name: String,
/// }
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let get_item = read::get_item::GetItem {
///     keys: common::key::Keys::new(common::key::Key::new("id", "1".to_string())),
///     single_read_args: read::common::SingleReadArgs {
///         table_name: "users".to_string(),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let user: Option<User> = get_item.fetch(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetItem<T> {
    /// The primary key of the item to retrieve.
    pub keys: common::key::Keys<T>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Read arguments (table name, consistent read, projection).
    pub single_read_args: read::common::SingleReadArgs,
}

impl<T: Serialize> TryFrom<GetItem<T>> for GetItemInput {
    type Error = Error;

    fn try_from(get_item: GetItem<T>) -> Result<Self> {
        let keys = get_item.keys.try_into()?;
        let operation = Self {
            keys,
            return_consumed_capacity: get_item.return_consumed_capacity,
            single_read_operation: get_item.single_read_args.into(),
        };
        Ok(operation)
    }
}

impl<T: Serialize> GetItem<T> {
    /// Execute the get item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.get_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::get_item::GetItemOutput,
        error::SdkError<operation::get_item::GetItemError>,
    > {
        let get_item: GetItemInput = self.try_into().map_err(error::BuildError::other)?;
        get_item.builder(client).send().await
    }

    /// Execute the get item operation and decode the item.
    ///
    /// `None` when no item has the given key.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.get_item_fetch", skip_all, err)
    )]
    pub async fn fetch<U: DeserializeOwned>(self, client: &Client) -> Result<Option<U>> {
        let get_item: GetItemInput = self.try_into()?;
        let output = get_item
            .builder(client)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        let item: Option<U> = output
            .item
            .filter(|item| !item.is_empty())
            .map(from_item)
            .transpose()?;
        Ok(item)
    }
}
