//! Query validation
//!
//! A query is valid when it is non-blank and mentions at least one catalog
//! table by name.

use crate::catalog::Catalog;
use serde::Serialize;

pub const EMPTY_QUERY: &str = "Query cannot be empty";
pub const NO_TABLE_REFERENCE: &str = "No valid table reference found";
pub const VALID_QUERY: &str = "Query appears valid";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub query: String,
    pub is_valid: bool,
    pub message: String,
}

impl Validation {
    fn new(query: &str, is_valid: bool, message: &str) -> Self {
        Self {
            query: query.to_string(),
            is_valid,
            message: message.to_string(),
        }
    }
}

pub fn validate(catalog: &Catalog, query: &str) -> Validation {
    let normalized = query.to_lowercase();

    if normalized.trim().is_empty() {
        return Validation::new(query, false, EMPTY_QUERY);
    }

    let has_table = catalog
        .table_names()
        .any(|table| normalized.contains(table.as_str()));
    if !has_table {
        return Validation::new(query, false, NO_TABLE_REFERENCE);
    }

    Validation::new(query, true, VALID_QUERY)
}
