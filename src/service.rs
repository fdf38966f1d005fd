//! Query service
//!
//! The four operations exposed over HTTP. Each takes the raw JSON body and the
//! optional `Authorization` header, so they can be driven without a socket.

use crate::auth::{authorize, Credentials};
use crate::catalog::{Catalog, Record};
use crate::classifier::classify;
use crate::error::{QueryError, Result};
use crate::explain::{explain, Explanation};
use crate::validation::{validate, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

impl QueryRequest {
    pub fn from_body(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| QueryError::InvalidRequest(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub original_query: String,
    pub translated_sql: String,
    pub results: Vec<Record>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone)]
pub struct QueryService {
    catalog: Arc<Catalog>,
    credentials: Credentials,
}

impl QueryService {
    pub fn new(catalog: Arc<Catalog>, credentials: Credentials) -> Self {
        Self { catalog, credentials }
    }

    /// Translate the query and return every row of the matched table.
    pub fn process_query(&self, body: &str, auth: Option<&str>) -> Result<QueryResponse> {
        let request = self.authorized_request(body, auth)?;
        let classification = classify(&request.query);
        info!(
            "Translated '{}' to '{}' on {}",
            request.query, classification.statement, classification.table
        );

        let results = self
            .catalog
            .rows(classification.table)
            .ok_or_else(|| {
                QueryError::Processing(format!("no data for table '{}'", classification.table))
            })?
            .to_vec();

        Ok(QueryResponse {
            original_query: request.query,
            translated_sql: classification.statement.to_string(),
            results,
        })
    }

    pub fn explain_query(&self, body: &str, auth: Option<&str>) -> Result<Explanation> {
        let request = self.authorized_request(body, auth)?;
        let explanation = explain(&self.catalog, &request.query)?;
        debug!(
            "Explained '{}' as {:?} on {}",
            request.query, explanation.breakdown.query_type, explanation.breakdown.detected_table
        );
        Ok(explanation)
    }

    pub fn validate_query(&self, body: &str, auth: Option<&str>) -> Result<Validation> {
        let request = self.authorized_request(body, auth)?;
        let validation = validate(&self.catalog, &request.query);
        debug!("Validated '{}': {}", request.query, validation.message);
        Ok(validation)
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse { status: "healthy" }
    }

    fn authorized_request(&self, body: &str, auth: Option<&str>) -> Result<QueryRequest> {
        authorize(auth, &self.credentials)?;
        QueryRequest::from_body(body)
    }
}
