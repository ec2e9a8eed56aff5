use crate::common::{self, expression};
use crate::error::Result;

use aws_sdk_dynamodb::types;
use serde::{Serialize, de::DeserializeOwned};
use serde_dynamo::from_item;
use std::collections;

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SingleReadInput {
    pub(crate) consistent_read: Option<bool>,
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) projection_expression: Option<String>,
    pub(crate) table_name: String,
}

/// Arguments for single-item read operations (GetItem, BatchGetItem).
///
/// For a batch get these apply to every key of one table.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SingleReadArgs {
    /// Whether to use a strongly consistent read.
    ///
    /// `None` and `Some(false)` read eventually consistent data. A strongly
    /// consistent read reflects every write acknowledged before it, at twice
    /// the read capacity cost.
    pub consistent_read: Option<bool>,
    /// Extra name substitutions, applied after the generated ones.
    ///
    /// Needed when a verbatim [`common::projection::Projection::Expression`]
    /// references `#name` placeholders.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Which attributes to retrieve.
    ///
    /// All attributes are returned when `None`. Attribute paths get generated
    /// `#ATTR{i}` placeholders, so reserved words are safe here.
    pub projection: Option<common::projection::Projection>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl From<SingleReadArgs> for SingleReadInput {
    fn from(single_read_args: SingleReadArgs) -> Self {
        let mut expression_attribute_names = None;
        let projection_expression = single_read_args
            .projection
            .map(|projection| {
                let operation: common::ExpressionInput = projection.into();
                operation.merge_into(&mut expression_attribute_names, &mut None)
            })
            .filter(|expression| !expression.is_empty());
        common::merge_overrides(
            &mut expression_attribute_names,
            single_read_args.expression_attribute_names,
        );
        Self {
            consistent_read: single_read_args.consistent_read,
            expression_attribute_names,
            projection_expression,
            table_name: single_read_args.table_name,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct MultipleReadInput {
    pub(crate) consistent_read: Option<bool>,
    pub(crate) exclusive_start_key: Option<collections::HashMap<String, types::AttributeValue>>,
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) expression_attribute_values:
        Option<collections::HashMap<String, types::AttributeValue>>,
    pub(crate) filter_expression: Option<String>,
    pub(crate) index_name: Option<String>,
    pub(crate) limit: Option<i32>,
    pub(crate) projection_expression: Option<String>,
    pub(crate) select: Option<types::Select>,
    pub(crate) table_name: String,
}

/// Arguments for multiple-item read operations (Query, Scan).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipleReadArgs<T> {
    /// Whether to use a strongly consistent read.
    ///
    /// Eventually consistent when `None`. Global secondary indexes only
    /// support eventually consistent reads and reject `Some(true)`.
    pub consistent_read: Option<bool>,
    /// Pagination cursor.
    ///
    /// Pass the `last_evaluated_key` of the previous page to resume after it.
    /// `None` starts from the beginning of the table or index.
    pub exclusive_start_key: Option<collections::HashMap<String, types::AttributeValue>>,
    /// Extra name substitutions, applied after every generated one.
    ///
    /// On key collision these entries win.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Filter applied to the items read, before they are returned.
    ///
    /// Filtered-out items still consume read capacity and count towards
    /// `limit`. Its placeholders are rewritten into `#FILTER_KEY{i}` and
    /// `:FILTER_VALUE{i}`.
    pub filter: Option<expression::ConditionExpression<T>>,
    /// Secondary index to read instead of the base table.
    pub index_name: Option<String>,
    /// Maximum number of items to evaluate per page.
    ///
    /// The limit applies before the filter, so a page may hold fewer items.
    /// A page is also cut at 1 MB regardless of the limit.
    pub limit: Option<i32>,
    /// Which attributes to retrieve. All attributes when `None`.
    pub projection: Option<common::projection::Projection>,
    /// Which attributes to return (`AllAttributes`, `Count`, ...).
    ///
    /// Must be `SpecificAttributes` or `None` when a projection is set.
    pub select: Option<types::Select>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl MultipleReadInput {
    /// Resolve the read arguments, merging `key_condition` in before the caller overrides.
    ///
    /// Returns the input and the key condition expression, if any.
    pub(crate) fn new<T: Serialize>(
        multiple_read_args: MultipleReadArgs<T>,
        key_condition: Option<common::ExpressionInput>,
    ) -> Result<(Self, Option<String>)> {
        let mut expression_attribute_names = None;
        let mut expression_attribute_values = None;
        let key_condition_expression = key_condition.map(|operation| {
            operation.merge_into(
                &mut expression_attribute_names,
                &mut expression_attribute_values,
            )
        });
        let filter_expression = match multiple_read_args.filter {
            Some(filter) => {
                let operation = filter.into_expression_input(expression::Namespace::FILTER)?;
                Some(operation.merge_into(
                    &mut expression_attribute_names,
                    &mut expression_attribute_values,
                ))
            }
            None => None,
        };
        let projection_expression = multiple_read_args
            .projection
            .map(|projection| {
                let operation: common::ExpressionInput = projection.into();
                operation.merge_into(
                    &mut expression_attribute_names,
                    &mut expression_attribute_values,
                )
            })
            .filter(|expression| !expression.is_empty());
        common::merge_overrides(
            &mut expression_attribute_names,
            multiple_read_args.expression_attribute_names,
        );
        let operation = Self {
            consistent_read: multiple_read_args.consistent_read,
            exclusive_start_key: multiple_read_args.exclusive_start_key,
            expression_attribute_names,
            expression_attribute_values,
            filter_expression,
            index_name: multiple_read_args.index_name,
            limit: multiple_read_args.limit,
            projection_expression,
            select: multiple_read_args.select,
            table_name: multiple_read_args.table_name,
        };
        Ok((operation, key_condition_expression))
    }
}

impl<T: Serialize> TryFrom<MultipleReadArgs<T>> for MultipleReadInput {
    type Error = crate::error::Error;

    fn try_from(multiple_read_args: MultipleReadArgs<T>) -> Result<Self> {
        let (operation, _) = Self::new(multiple_read_args, None)?;
        Ok(operation)
    }
}

/// One page of Query or Scan results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page<U> {
    /// Decoded items, in the order returned.
    pub items: Vec<U>,
    /// Cursor to resume from, set when the result set was truncated.
    ///
    /// Pass it back as [`MultipleReadArgs::exclusive_start_key`].
    pub last_evaluated_key: Option<collections::HashMap<String, types::AttributeValue>>,
}

impl<U: DeserializeOwned> Page<U> {
    pub(crate) fn new(
        items: Option<Vec<collections::HashMap<String, types::AttributeValue>>>,
        last_evaluated_key: Option<collections::HashMap<String, types::AttributeValue>>,
    ) -> serde_dynamo::Result<Self> {
        let items = decode_items(items.unwrap_or_default())?;
        Ok(Self {
            items,
            last_evaluated_key: last_evaluated_key.filter(|key| !key.is_empty()),
        })
    }
}

pub(crate) fn decode_items<U: DeserializeOwned>(
    items: Vec<collections::HashMap<String, types::AttributeValue>>,
) -> serde_dynamo::Result<Vec<U>> {
    items.into_iter().map(from_item).collect()
}

/// collect every page of a paginator into a single output
#[macro_export]
macro_rules! get_paginated_output {
    ($paginator:expr, $output_type:ty) => {{
        let mut outputs = Vec::new();
        while let Some(page) = $paginator.next().await {
            outputs.push(page?);
        }
        let (items, count, scanned, capacities) = outputs.into_iter().fold(
            (Vec::new(), 0, 0, Vec::new()),
            |(mut items, count, scanned, mut capacities), output| {
                if let Some(page_items) = output.items {
                    items.extend(page_items);
                }
                if let Some(capacity) = output.consumed_capacity {
                    capacities.push(capacity);
                }
                (
                    items,
                    count + output.count,
                    scanned + output.scanned_count,
                    capacities,
                )
            },
        );
        let consumed_capacity = (!capacities.is_empty())
            .then(|| $crate::read::common::aggregate_capacity(capacities));
        let output = <$output_type>::builder()
            .set_items(Some(items))
            .set_count(Some(count))
            .set_scanned_count(Some(scanned))
            .set_consumed_capacity(consumed_capacity)
            .build();
        Ok(output)
    }};
}

/// Sum the consumed capacity of several pages.
pub fn aggregate_capacity(capacities: Vec<types::ConsumedCapacity>) -> types::ConsumedCapacity {
    let (total, read, write, table) = capacities.into_iter().fold(
        (0.0, 0.0, 0.0, None),
        |(total, read, write, table), capacity| {
            (
                total + capacity.capacity_units.unwrap_or(0.0),
                read + capacity.read_capacity_units.unwrap_or(0.0),
                write + capacity.write_capacity_units.unwrap_or(0.0),
                table.or(capacity.table_name),
            )
        },
    );
    types::ConsumedCapacity::builder()
        .set_table_name(table)
        .set_capacity_units(Some(total))
        .set_read_capacity_units(Some(read))
        .set_write_capacity_units(Some(write))
        .build()
}

/// apply single read settings to a builder
#[macro_export]
macro_rules! apply_single_read_operation {
    ($builder:expr, $single_read_operation:expr) => {
        $builder
            .set_consistent_read($single_read_operation.consistent_read)
            .set_expression_attribute_names($single_read_operation.expression_attribute_names)
            .set_projection_expression($single_read_operation.projection_expression)
            .table_name($single_read_operation.table_name)
    };
}

/// apply multiple read settings to a builder
#[macro_export]
macro_rules! apply_multiple_read_operation {
    ($builder:expr, $multiple_read_operation:expr) => {
        $builder
            .set_consistent_read($multiple_read_operation.consistent_read)
            .set_exclusive_start_key($multiple_read_operation.exclusive_start_key)
            .set_expression_attribute_names($multiple_read_operation.expression_attribute_names)
            .set_expression_attribute_values($multiple_read_operation.expression_attribute_values)
            .set_filter_expression($multiple_read_operation.filter_expression)
            .set_index_name($multiple_read_operation.index_name)
            .set_limit($multiple_read_operation.limit)
            .set_projection_expression($multiple_read_operation.projection_expression)
            .set_select($multiple_read_operation.select)
            .table_name($multiple_read_operation.table_name)
    };
}
