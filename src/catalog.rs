//! Catalog of mock tables
//!
//! Holds the two table descriptors and the canned rows served for each.
//! A catalog is built once at startup and shared read-only (`Arc<Catalog>`).

use crate::error::{QueryError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::info;

/// One row of a mock dataset, keyed by column name in column order.
pub type Record = Map<String, Value>;

/// The closed set of tables the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Sales,
    Customers,
}

impl TableName {
    pub const ALL: [TableName; 2] = [TableName::Sales, TableName::Customers];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Sales => "sales",
            TableName::Customers => "customers",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        TableName::ALL
            .into_iter()
            .find(|t| t.as_str() == name.trim().to_lowercase())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: TableName,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub descriptor: TableDescriptor,
    pub rows: Vec<Record>,
}

/// On-disk shape of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    tables: Vec<TableEntry>,
}

#[derive(Debug, Deserialize)]
struct TableEntry {
    name: String,
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Record>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    tables: HashMap<TableName, Table>,
}

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        let sales = Table {
            descriptor: TableDescriptor {
                name: TableName::Sales,
                columns: columns(&["date", "amount", "region", "product"]),
            },
            rows: vec![
                record(json!({"date": "2025-03-01", "amount": 1000, "region": "North", "product": "Widget"})),
                record(json!({"date": "2025-03-02", "amount": 1500, "region": "South", "product": "Gadget"})),
            ],
        };
        let customers = Table {
            descriptor: TableDescriptor {
                name: TableName::Customers,
                columns: columns(&["id", "name", "email", "signup_date"]),
            },
            rows: vec![
                record(json!({"id": 1, "name": "John Doe", "email": "john@example.com", "signup_date": "2025-01-01"})),
                record(json!({"id": 2, "name": "Jane Smith", "email": "jane@example.com", "signup_date": "2025-02-01"})),
            ],
        };

        let mut tables = HashMap::new();
        tables.insert(TableName::Sales, sales);
        tables.insert(TableName::Customers, customers);
        Self { tables }
    }

    /// Build a catalog from explicit tables. Every known table must be present
    /// exactly once and every row may only use its table's columns.
    pub fn from_tables(tables: Vec<Table>) -> Result<Self> {
        let mut by_name = HashMap::new();
        for table in tables {
            let name = table.descriptor.name;
            for (idx, row) in table.rows.iter().enumerate() {
                if let Some(col) = row.keys().find(|k| !table.descriptor.columns.contains(*k)) {
                    return Err(QueryError::Config(format!(
                        "row {} of table '{}' has unknown column '{}'",
                        idx, name, col
                    )));
                }
            }
            if by_name.insert(name, table).is_some() {
                return Err(QueryError::Config(format!("table '{}' defined twice", name)));
            }
        }

        for name in TableName::ALL {
            if !by_name.contains_key(&name) {
                return Err(QueryError::Config(format!("table '{}' is missing", name)));
            }
        }

        Ok(Self { tables: by_name })
    }

    /// Load a catalog from a JSON file of the form
    /// `{"tables": [{"name": "...", "columns": [...], "rows": [...]}]}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&content)?;

        let tables = file
            .tables
            .into_iter()
            .map(|entry| {
                let name = TableName::parse(&entry.name).ok_or_else(|| {
                    QueryError::Config(format!("unknown table '{}'", entry.name))
                })?;
                Ok(Table {
                    descriptor: TableDescriptor { name, columns: entry.columns },
                    rows: entry.rows,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let catalog = Self::from_tables(tables)?;
        info!("Loaded catalog from {}", path.display());
        Ok(catalog)
    }

    pub fn table(&self, name: TableName) -> Option<&Table> {
        self.tables.get(&name)
    }

    pub fn columns(&self, name: TableName) -> Option<&[String]> {
        self.table(name).map(|t| t.descriptor.columns.as_slice())
    }

    pub fn rows(&self, name: TableName) -> Option<&[Record]> {
        self.table(name).map(|t| t.rows.as_slice())
    }

    /// Table names in a stable order.
    pub fn table_names(&self) -> impl Iterator<Item = TableName> + '_ {
        TableName::ALL
            .into_iter()
            .filter(|name| self.tables.contains_key(name))
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
