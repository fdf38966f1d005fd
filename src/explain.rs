//! Explains how a query was interpreted: which table was detected, whether
//! the generated statement aggregates, and which columns the table exposes.

use crate::catalog::{Catalog, TableName};
use crate::classifier::classify;
use crate::error::{QueryError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Aggregation,
    Selection,
}

impl QueryType {
    /// Only `SUM` marks a statement as an aggregation.
    pub fn of_statement(statement: &str) -> Self {
        if statement.contains("SUM") {
            QueryType::Aggregation
        } else {
            QueryType::Selection
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Breakdown {
    pub detected_table: TableName,
    pub query_type: QueryType,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub original_query: String,
    pub breakdown: Breakdown,
    pub translated_sql: String,
}

pub fn explain(catalog: &Catalog, query: &str) -> Result<Explanation> {
    let classification = classify(query);
    let columns = catalog
        .columns(classification.table)
        .ok_or_else(|| {
            QueryError::Explanation(format!("no descriptor for table '{}'", classification.table))
        })?
        .to_vec();

    Ok(Explanation {
        original_query: query.to_string(),
        breakdown: Breakdown {
            detected_table: classification.table,
            query_type: QueryType::of_statement(classification.statement),
            columns,
        },
        translated_sql: classification.statement.to_string(),
    })
}
