//! Common utilities for DynamoDB operations.
//!
//! This module provides the pieces shared by read and write operations:
//! primary keys, projections and the condition expression rewriter.

/// Condition expression rewriting into collision-free placeholders.
pub mod expression;

/// Key types for identifying items in DynamoDB tables.
pub mod key;

/// Projection expressions for selecting returned attributes.
pub mod projection;

use aws_sdk_dynamodb::types;
use std::collections;

fn get_expression(left: String, separator: &str, right: String) -> String {
    if left.is_empty() {
        right
    } else if right.is_empty() {
        left
    } else {
        format!("{left}{separator}{right}")
    }
}

/// An expression together with the placeholders it references.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionInput {
    pub(crate) expression: String,
    pub(crate) expression_attribute_names: collections::HashMap<String, String>,
    pub(crate) expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionInput {
    pub(crate) fn merge(separator: &str, items: Vec<Self>) -> Self {
        let mut operation = Self::default();
        for item in items {
            operation
                .expression_attribute_names
                .extend(item.expression_attribute_names);
            operation
                .expression_attribute_values
                .extend(item.expression_attribute_values);
            operation.expression = get_expression(operation.expression, separator, item.expression);
        }
        operation
    }

    /// Move the placeholders into the request-level maps and return the expression.
    ///
    /// Empty maps are never materialized: DynamoDB rejects an empty
    /// `ExpressionAttributeNames` or `ExpressionAttributeValues`.
    pub(crate) fn merge_into(
        self,
        names: &mut Option<collections::HashMap<String, String>>,
        values: &mut Option<collections::HashMap<String, types::AttributeValue>>,
    ) -> String {
        extend_non_empty(names, self.expression_attribute_names);
        extend_non_empty(values, self.expression_attribute_values);
        self.expression
    }
}

/// Apply caller-supplied name substitutions on top of the generated ones.
///
/// Must run after every generated placeholder has been merged: on key
/// collision the caller entry wins.
pub(crate) fn merge_overrides(
    names: &mut Option<collections::HashMap<String, String>>,
    overrides: Option<collections::HashMap<String, String>>,
) {
    if let Some(overrides) = overrides {
        extend_non_empty(names, overrides);
    }
}

fn extend_non_empty<V>(
    target: &mut Option<collections::HashMap<String, V>>,
    source: collections::HashMap<String, V>,
) {
    if source.is_empty() {
        return;
    }
    match target {
        Some(existing) => existing.extend(source),
        None => *target = Some(source),
    }
}
