//! Catalog store boundary: raw record type, error type, runner trait.

use std::fmt;

use serde_json::{Map, Value};

use crate::query::ODataQuery;

/// A list item as returned by the store: field name → JSON value.
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Network or transport failure.
    Transport(String),
    /// The store answered with a non-success status.
    Api { status: Option<u16>, message: String },
    /// A response payload could not be decoded.
    Decode(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Transport(msg) => write!(f, "transport error: {msg}"),
            CatalogError::Api {
                status: Some(s),
                message,
            } => write!(f, "catalog api error status={s}: {message}"),
            CatalogError::Api {
                status: None,
                message,
            } => write!(f, "catalog api error: {message}"),
            CatalogError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Parameterized read access to a named collection.
#[async_trait::async_trait]
pub trait CatalogQueryRunner: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn query(
        &self,
        collection_id: &str,
        query: &ODataQuery,
    ) -> Result<Vec<RawRecord>, CatalogError>;
}
