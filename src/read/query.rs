use crate::common::expression;
use crate::error::{Error, Result};
use crate::read;

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::{Serialize, de::DeserializeOwned};

/// query operation
#[derive(Clone, Debug, Default, PartialEq)]
struct QueryInput {
    key_condition_expression: String,
    multiple_read_operation: read::common::MultipleReadInput,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    scan_index_forward: Option<bool>,
}

impl QueryInput {
    fn builder(self, client: &Client) -> operation::query::builders::QueryFluentBuilder {
        let builder = client
            .query()
            .key_condition_expression(self.key_condition_expression)
            .set_return_consumed_capacity(self.return_consumed_capacity)
            .set_scan_index_forward(self.scan_index_forward);
        crate::apply_multiple_read_operation!(builder, self.multiple_read_operation)
    }
}

/// Query operation.
///
/// The key condition is rewritten before the request is issued: every
/// `#name` becomes `#KEY{i}` and every `:value` becomes `:VALUE{i}`.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_typed::{common, read};
/// use std::collections::HashMap;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let query = read::query::Query {
///     key_condition: common::expression::ConditionExpression {
///         expression: "#user_id = :user_id AND begins_with(#order_id, :prefix)".to_string(),
///         values: HashMap::from([
///             (":user_id".to_string(), "u1".to_string()),
///             (":prefix".to_string(), "2024-".to_string()),
///         ]),
///         ..Default::default()
///     },
///     multiple_read_args: read::common::MultipleReadArgs {
///         table_name: "orders".to_string(),
///         limit: Some(25),
///         ..Default::default()
///     },
///     scan_index_forward: Some(false),
///     ..Default::default()
/// };
/// let output = query.send(client).await?;
/// let cursor = output.last_evaluated_key;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query<T> {
    /// Key condition on the partition key and, optionally, the sort key.
    ///
    /// The partition key must be matched with `=`. The sort key accepts
    /// comparisons, `BETWEEN` and `begins_with`.
    pub key_condition: expression::ConditionExpression<T>,
    /// Additional read arguments (table, index, filter, projection, paging, ...).
    pub multiple_read_args: read::common::MultipleReadArgs<T>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Sort key order: `true` ascending, `false` descending.
    ///
    /// Ascending when `None`.
    pub scan_index_forward: Option<bool>,
}

impl<T: Serialize> TryFrom<Query<T>> for QueryInput {
    type Error = Error;

    fn try_from(query: Query<T>) -> Result<Self> {
        let key_condition = query
            .key_condition
            .into_expression_input(expression::Namespace::KEY_CONDITION)?;
        let (multiple_read_operation, key_condition_expression) =
            read::common::MultipleReadInput::new(query.multiple_read_args, Some(key_condition))?;
        let operation = Self {
            key_condition_expression: key_condition_expression.unwrap_or_default(),
            multiple_read_operation,
            return_consumed_capacity: query.return_consumed_capacity,
            scan_index_forward: query.scan_index_forward,
        };
        Ok(operation)
    }
}

impl<T: Serialize> Query<T> {
    /// Execute a single query request.
    ///
    /// At most one page is read; resume with the returned `last_evaluated_key`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.query", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<operation::query::QueryOutput, error::SdkError<operation::query::QueryError>> {
        let query: QueryInput = self.try_into().map_err(error::BuildError::other)?;
        query.builder(client).send().await
    }

    /// Execute the query, following the pagination cursor until every page is read.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.query_all", skip_all, err)
    )]
    pub async fn send_all(
        self,
        client: &Client,
    ) -> Result<operation::query::QueryOutput, error::SdkError<operation::query::QueryError>> {
        let query: QueryInput = self.try_into().map_err(error::BuildError::other)?;
        let mut paginator = query.builder(client).into_paginator().send();
        crate::get_paginated_output!(paginator, operation::query::QueryOutput)
    }

    /// Execute a single query request and decode the returned items.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.query_fetch", skip_all, err)
    )]
    pub async fn fetch<U: DeserializeOwned>(
        self,
        client: &Client,
    ) -> Result<read::common::Page<U>> {
        let query: QueryInput = self.try_into()?;
        let output = query
            .builder(client)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        let page = read::common::Page::new(output.items, output.last_evaluated_key)?;
        Ok(page)
    }
}
