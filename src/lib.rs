#![deny(missing_docs)]

//! # DynamoDB Typed
//!
//! Typed item marshaling and placeholder-safe request construction for Amazon DynamoDB.
//!
//! ## Overview
//!
//! This library wraps the DynamoDB client with plain request structs that:
//! - Marshal any `serde` item shape to and from the DynamoDB attribute format
//! - Rewrite hand-written condition expressions into collision-free placeholders
//! - Cover Get, Put, Update, Delete, Query, Scan, batch and transactional writes
//! - Surface marshaling, expression and service failures through one error type
//!
//! ## Quick Example
//!
//! Write the key condition the way you think about it. Every `#name` and
//! `:value` token is renamed before the request leaves the process, so reserved
//! words such as `name` never reach the service unescaped:
//!
//! ```no_run
//! use aws_sdk_dynamodb::Client;
//! use dynamodb_typed::{common, read};
//! use serde::Deserialize;
//! use serde_json::json;
//! use std::collections::HashMap;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = Client::from_conf(aws_sdk_dynamodb::config::Config::builder().build());
//! let query = read::query::Query {
//!     key_condition: common::expression::ConditionExpression {
//!         expression: "#name = :name AND #age > :min_age".to_string(),
//!         values: HashMap::from([
//!             (":name".to_string(), json!("Alice")),
//!             (":min_age".to_string(), json!(21)),
//!         ]),
//!         ..Default::default()
//!     },
//!     multiple_read_args: read::common::MultipleReadArgs {
//!         table_name: "users".to_string(),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! // Sent as "#KEY0 = :VALUE0 AND #KEY1 > :VALUE1"
//! let page: read::common::Page<User> = query.fetch(&client).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@common`] - Keys, projections and the condition expression rewriter
//! - [`mod@error`] - The crate error type
//! - [`mod@read`] - Read operations (GetItem, BatchGetItem, Query, Scan)
//! - [`mod@write`] - Write operations (PutItem, UpdateItem, DeleteItem, BatchWriteItem, TransactWriteItems)

/// Keys, projections and the condition expression rewriter.
pub mod common;

/// Errors raised while building or issuing requests.
pub mod error;

/// Read operations for retrieving data from DynamoDB tables.
///
/// This module provides operations for:
/// - Getting individual items by key
/// - Batch retrieving multiple items
/// - Querying items with a key condition
/// - Scanning entire tables
pub mod read;

/// Write operations for modifying data in DynamoDB tables.
///
/// This module provides operations for:
/// - Putting new items or replacing existing ones
/// - Patching attributes of existing items
/// - Deleting items by key
/// - Batch and transactional writes
pub mod write;
