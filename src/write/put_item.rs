use crate::error::{Error, Result};
use crate::write;

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::Serialize;
use serde_dynamo::to_item;
use std::collections;

/// put item operation
#[derive(Debug, PartialEq)]
struct PutItemInput {
    item: collections::HashMap<String, types::AttributeValue>,
    write_operation: write::common::WriteInput,
}

/// Put item operation.
///
/// `I` is the item shape and `T` the type of the condition values; they
/// default to the same type.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_typed::{common, write};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User {
///     id: String,
///     name: String,
/// }
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let put_item: write::put_item::PutItem<User, String> = write::put_item::PutItem {
///     item: User {
///         id: "1".to_string(),
///         name: "John".to_string(),
///     },
///     write_args: write::common::WriteArgs {
///         condition: Some(common::expression::ConditionExpression {
///             expression: "attribute_not_exists(#id)".to_string(),
///             ..Default::default()
///         }),
///         table_name: "users".to_string(),
///         ..Default::default()
///     },
/// };
/// put_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq)]
pub struct PutItem<I, T = I> {
    /// The item to put into the table.
    pub item: I,
    /// Write arguments (table name, condition, return values, ...).
    pub write_args: write::common::WriteArgs<T>,
}

impl<I: Serialize, T: Serialize> TryFrom<PutItem<I, T>> for PutItemInput {
    type Error = Error;

    fn try_from(put_item: PutItem<I, T>) -> Result<Self> {
        let item = to_item(put_item.item)?;
        let write_operation: write::common::WriteInput = put_item.write_args.try_into()?;
        let operation = Self {
            item,
            write_operation,
        };
        Ok(operation)
    }
}

impl<I: Serialize, T: Serialize> PutItem<I, T> {
    /// Execute the put item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.put_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::put_item::PutItemOutput,
        error::SdkError<operation::put_item::PutItemError>,
    > {
        let put_item: PutItemInput = self.try_into().map_err(error::BuildError::other)?;
        let builder = client.put_item().set_item(Some(put_item.item));
        crate::apply_write_operation!(builder, put_item.write_operation)
            .send()
            .await
    }
}
