use crate::error::{Error, Result};
use crate::read;

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::{Serialize, de::DeserializeOwned};

/// scan operation
#[derive(Clone, Debug, Default, PartialEq)]
struct ScanInput {
    multiple_read_operation: read::common::MultipleReadInput,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    segment: Option<i32>,
    total_segments: Option<i32>,
}

impl ScanInput {
    fn builder(self, client: &Client) -> operation::scan::builders::ScanFluentBuilder {
        let builder = client
            .scan()
            .set_return_consumed_capacity(self.return_consumed_capacity)
            .set_segment(self.segment)
            .set_total_segments(self.total_segments);
        crate::apply_multiple_read_operation!(builder, self.multiple_read_operation)
    }
}

/// Scan operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_typed::read;
/// use serde_json::Value;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let scan: read::scan::Scan<Value> = read::scan::Scan {
///     multiple_read_args: read::common::MultipleReadArgs {
///         table_name: "users".to_string(),
///         limit: Some(10),
///         consistent_read: Some(true),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let page: read::common::Page<Value> = scan.fetch(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scan<T> {
    /// Read arguments (table, index, filter, projection, paging, ...).
    pub multiple_read_args: read::common::MultipleReadArgs<T>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// The segment to read in a parallel scan (0-indexed).
    ///
    /// Must be set together with `total_segments` and be lower than it.
    pub segment: Option<i32>,
    /// The total number of segments of a parallel scan.
    ///
    /// Each worker scans one segment; the union of all segments is the
    /// whole table or index.
    pub total_segments: Option<i32>,
}

impl<T: Serialize> TryFrom<Scan<T>> for ScanInput {
    type Error = Error;

    fn try_from(scan: Scan<T>) -> Result<Self> {
        let multiple_read_operation: read::common::MultipleReadInput =
            scan.multiple_read_args.try_into()?;
        let operation = Self {
            multiple_read_operation,
            return_consumed_capacity: scan.return_consumed_capacity,
            segment: scan.segment,
            total_segments: scan.total_segments,
        };
        Ok(operation)
    }
}

impl<T: Serialize> Scan<T> {
    /// Execute a single scan request.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.scan", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<operation::scan::ScanOutput, error::SdkError<operation::scan::ScanError>> {
        let scan: ScanInput = self.try_into().map_err(error::BuildError::other)?;
        scan.builder(client).send().await
    }

    /// Execute the scan, following the pagination cursor until every page is read.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.scan_all", skip_all, err)
    )]
    pub async fn send_all(
        self,
        client: &Client,
    ) -> Result<operation::scan::ScanOutput, error::SdkError<operation::scan::ScanError>> {
        let scan: ScanInput = self.try_into().map_err(error::BuildError::other)?;
        let mut paginator = scan.builder(client).into_paginator().send();
        crate::get_paginated_output!(paginator, operation::scan::ScanOutput)
    }

    /// Execute a single scan request and decode the returned items.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_typed.scan_fetch", skip_all, err)
    )]
    pub async fn fetch<U: DeserializeOwned>(self, client: &Client) -> Result<read::common::Page<U>> {
        let scan: ScanInput = self.try_into()?;
        let output = scan
            .builder(client)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        let page = read::common::Page::new(output.items, output.last_evaluated_key)?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common;

    use rstest::rstest;
    use serde_json::{Value, json};
    use std::collections;

    #[rstest]
    #[case::table_only(
        Scan {
            multiple_read_args: read::common::MultipleReadArgs {
                table_name: "users".to_string(),
                ..Default::default()
            },
            ..Default::default()
        },
        ScanInput {
            multiple_read_operation: read::common::MultipleReadInput {
                table_name: "users".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    )]
    #[case::limit_and_consistent_read(
        Scan {
            multiple_read_args: read::common::MultipleReadArgs {
                consistent_read: Some(true),
                limit: Some(10),
                table_name: "users".to_string(),
                ..Default::default()
            },
            ..Default::default()
        },
        ScanInput {
            multiple_read_operation: read::common::MultipleReadInput {
                consistent_read: Some(true),
                limit: Some(10),
                table_name: "users".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    )]
    #[case::full(
        Scan {
            multiple_read_args: read::common::MultipleReadArgs {
                consistent_read: Some(false),
                exclusive_start_key: Some(
                    collections::HashMap::from(
                        [
                            (
                                "id".to_string(),
                                types::AttributeValue::S(
                                    "u9".to_string()
                                )
                            ),
                        ]
                    )
                ),
                filter: Some(
                    common::expression::ConditionExpression {
                        expression: "#status = :status AND #size > :size".to_string(),
                        values: collections::HashMap::from(
                            [
                                (":status".to_string(), json!("ACTIVE")),
                                (":size".to_string(), json!(3)),
                            ]
                        ),
                        ..Default::default()
                    }
                ),
                index_name: Some("by_status".to_string()),
                limit: Some(50),
                projection: Some(
                    common::projection::Projection::Attributes(
                        vec![
                            "id".to_string(),
                            "status".to_string(),
                        ]
                    )
                ),
                select: Some(
                    types::Select::SpecificAttributes
                ),
                table_name: "users".to_string(),
                ..Default::default()
            },
            return_consumed_capacity: Some(
                types::ReturnConsumedCapacity::Total
            ),
            segment: Some(1),
            total_segments: Some(4),
        },
        ScanInput {
            multiple_read_operation: read::common::MultipleReadInput {
                consistent_read: Some(false),
                exclusive_start_key: Some(
                    collections::HashMap::from(
                        [
                            (
                                "id".to_string(),
                                types::AttributeValue::S(
                                    "u9".to_string()
                                )
                            ),
                        ]
                    )
                ),
                expression_attribute_names: Some(
                    collections::HashMap::from(
                        [
                            ("#FILTER_KEY0".to_string(), "status".to_string()),
                            ("#FILTER_KEY1".to_string(), "size".to_string()),
                            ("#ATTR0".to_string(), "id".to_string()),
                            ("#ATTR1".to_string(), "status".to_string()),
                        ]
                    )
                ),
                expression_attribute_values: Some(
                    collections::HashMap::from(
                        [
                            (
                                ":FILTER_VALUE0".to_string(),
                                types::AttributeValue::S(
                                    "ACTIVE".to_string()
                                )
                            ),
                            (
                                ":FILTER_VALUE1".to_string(),
                                types::AttributeValue::N(
                                    "3".to_string()
                                )
                            ),
                        ]
                    )
                ),
                filter_expression: Some(
                    "#FILTER_KEY0 = :FILTER_VALUE0 AND #FILTER_KEY1 > :FILTER_VALUE1".to_string()
                ),
                index_name: Some("by_status".to_string()),
                limit: Some(50),
                projection_expression: Some(
                    "#ATTR0, #ATTR1".to_string()
                ),
                select: Some(
                    types::Select::SpecificAttributes
                ),
                table_name: "users".to_string(),
            },
            return_consumed_capacity: Some(
                types::ReturnConsumedCapacity::Total
            ),
            segment: Some(1),
            total_segments: Some(4),
        }
    )]
    fn test_scan(#[case] args: Scan<Value>, #[case] expected: ScanInput) {
        let actual: ScanInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
