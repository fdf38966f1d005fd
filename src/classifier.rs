//! Query Classifier
//!
//! Maps free text to one of a fixed set of statements by ordered keyword
//! containment. First match wins; the function is total and pure.

use crate::catalog::TableName;

pub const SALES_BY_REGION: &str = "SELECT region, SUM(amount) FROM sales GROUP BY region";
pub const SALES_TOTAL: &str = "SELECT SUM(amount) FROM sales";
pub const SALES_BY_PRODUCT: &str = "SELECT product, SUM(amount) FROM sales GROUP BY product";
pub const CUSTOMER_COUNT: &str = "SELECT COUNT(*) FROM customers";
pub const RECENT_CUSTOMERS: &str = "SELECT * FROM customers ORDER BY signup_date DESC";
pub const DEFAULT_STATEMENT: &str = "SELECT * FROM sales";

/// Statement and table chosen for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub statement: &'static str,
    pub table: TableName,
}

impl Classification {
    fn new(statement: &'static str, table: TableName) -> Self {
        Self { statement, table }
    }

    fn fallback() -> Self {
        Self::new(DEFAULT_STATEMENT, TableName::Sales)
    }
}

pub fn classify(query: &str) -> Classification {
    let query = query.to_lowercase();

    let matched = if query.contains("sales") {
        let statement = if query.contains("by region") {
            Some(SALES_BY_REGION)
        } else if query.contains("total") {
            Some(SALES_TOTAL)
        } else if query.contains("by product") {
            Some(SALES_BY_PRODUCT)
        } else {
            None
        };
        statement.map(|sql| Classification::new(sql, TableName::Sales))
    } else if query.contains("customer") || query.contains("customers") {
        let statement = if query.contains("count") {
            Some(CUSTOMER_COUNT)
        } else if query.contains("new") || query.contains("recent") {
            Some(RECENT_CUSTOMERS)
        } else {
            None
        };
        statement.map(|sql| Classification::new(sql, TableName::Customers))
    } else {
        None
    };

    // A branch without a sub-pattern match lands on the default as well.
    matched.unwrap_or_else(Classification::fallback)
}
