//! Read operations for retrieving data from DynamoDB tables.
//!
//! Every operation offers `send`, returning the raw SDK output, and `fetch`,
//! decoding the returned items into any `serde` type.

/// Batch get item operation for retrieving multiple items across tables.
pub mod batch_get_item;

/// Arguments and results shared by read operations.
pub mod common;

/// Get item operation for retrieving a single item by primary key.
pub mod get_item;

/// Query operation for retrieving items matching a key condition.
pub mod query;

/// Scan operation for reading a whole table or index.
pub mod scan;
