//! Mini Data Query Engine
//!
//! Maps natural-language-like questions onto a handful of canned SQL
//! statements over two mock tables and serves the results over HTTP.

pub mod auth;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod explain;
pub mod http;
pub mod server;
pub mod service;
pub mod validation;

pub use catalog::{Catalog, TableName};
pub use classifier::{classify, Classification};
pub use error::{QueryError, Result};
pub use service::QueryService;
