use crate::common::{self, expression};
use crate::error::Result;

use aws_sdk_dynamodb::types;
use serde::Serialize;
use std::collections;

/// Resolved write parameters, ready for a DynamoDB request builder.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct WriteInput {
    pub(crate) condition_expression: Option<String>,
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) expression_attribute_values:
        Option<collections::HashMap<String, types::AttributeValue>>,
    pub(crate) return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    pub(crate) return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
    pub(crate) return_values: Option<types::ReturnValue>,
    pub(crate) return_values_on_condition_check_failure:
        Option<types::ReturnValuesOnConditionCheckFailure>,
    pub(crate) table_name: String,
}

/// Arguments common to single-item writes (Put, Update, Delete).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteArgs<T> {
    /// Condition that must hold for the write to succeed.
    ///
    /// A failing condition surfaces as a `ConditionalCheckFailedException`.
    pub condition: Option<expression::ConditionExpression<T>>,
    /// Extra name substitutions, applied after every generated one.
    ///
    /// On key collision these entries win. They are not checked against the
    /// expressions of the request.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to return item collection metrics.
    pub return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
    /// Which item attributes to return (`AllOld`, `AllNew`, ...).
    ///
    /// Put and delete only accept `None` and `AllOld`; update accepts every
    /// variant.
    pub return_values: Option<types::ReturnValue>,
    /// Which item attributes to return when the condition fails.
    ///
    /// With `AllOld` the existing item is attached to the
    /// `ConditionalCheckFailedException`, saving a read.
    pub return_values_on_condition_check_failure:
        Option<types::ReturnValuesOnConditionCheckFailure>,
    /// The name of the table to write to.
    pub table_name: String,
}

impl WriteInput {
    /// Resolve the write arguments, merging `operation` in before the caller overrides.
    ///
    /// Returns the input and the expression of `operation`, if any.
    pub(crate) fn new<T: Serialize>(
        write_args: WriteArgs<T>,
        operation: Option<common::ExpressionInput>,
    ) -> Result<(Self, Option<String>)> {
        let mut expression_attribute_names = None;
        let mut expression_attribute_values = None;
        let expression = operation.map(|operation| {
            operation.merge_into(
                &mut expression_attribute_names,
                &mut expression_attribute_values,
            )
        });
        let condition_expression = match write_args.condition {
            Some(condition) => {
                let operation = condition.into_expression_input(expression::Namespace::CONDITION)?;
                Some(operation.merge_into(
                    &mut expression_attribute_names,
                    &mut expression_attribute_values,
                ))
            }
            None => None,
        };
        common::merge_overrides(
            &mut expression_attribute_names,
            write_args.expression_attribute_names,
        );
        let write_operation = Self {
            condition_expression,
            expression_attribute_names,
            expression_attribute_values,
            return_consumed_capacity: write_args.return_consumed_capacity,
            return_item_collection_metrics: write_args.return_item_collection_metrics,
            return_values: write_args.return_values,
            return_values_on_condition_check_failure: write_args
                .return_values_on_condition_check_failure,
            table_name: write_args.table_name,
        };
        Ok((write_operation, expression))
    }
}

impl<T: Serialize> TryFrom<WriteArgs<T>> for WriteInput {
    type Error = crate::error::Error;

    fn try_from(write_args: WriteArgs<T>) -> Result<Self> {
        let (write_operation, _) = Self::new(write_args, None)?;
        Ok(write_operation)
    }
}

/// apply common write settings to a builder
#[macro_export]
macro_rules! apply_write_operation {
    ($builder:expr, $write_operation:expr) => {
        $builder
            .set_condition_expression($write_operation.condition_expression)
            .set_expression_attribute_names($write_operation.expression_attribute_names)
            .set_expression_attribute_values($write_operation.expression_attribute_values)
            .set_return_consumed_capacity($write_operation.return_consumed_capacity)
            .set_return_item_collection_metrics($write_operation.return_item_collection_metrics)
            .set_return_values($write_operation.return_values)
            .set_return_values_on_condition_check_failure(
                $write_operation.return_values_on_condition_check_failure,
            )
            .table_name($write_operation.table_name)
    };
}
