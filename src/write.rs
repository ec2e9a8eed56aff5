//! Write operations for modifying data in DynamoDB tables.
//!
//! Single-item writes (put, update, delete) share [`common::WriteArgs`],
//! whose optional condition is rewritten into `#COND_KEY{i}`/`:COND_VALUE{i}`
//! placeholders. Batch writes are not atomic; transactional writes are.

/// Batch write item operation for writing many items across tables.
pub mod batch_write_item;

/// Common utilities and types for write operations.
pub mod common;

/// Delete item operation for removing items from tables.
pub mod delete_item;

/// Put item operation for creating or replacing items.
pub mod put_item;

/// All-or-nothing writes across items and tables.
pub mod transact_write_items;

/// Update item operation for patching existing items.
pub mod update_item;
