//! Directory service boundary.
//!
//! This module defines **only** the raw record shape, the page envelope, the
//! error type and the fetcher trait. No filtering, no dedupe, no HTTP.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawManager {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A directory user exactly as the service returned it.
///
/// Every field is optional here; narrowing happens in the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUserRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub office_location: Option<String>,
    #[serde(default)]
    pub mobile_phone: Option<String>,
    #[serde(default)]
    pub manager: Option<RawManager>,
}

/// One page of users plus the continuation cursor (`None` on the last page).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryPage {
    pub records: Vec<RawUserRecord>,
    pub next_cursor: Option<String>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Network or transport failure.
    Transport(String),
    /// The service answered with a non-success status.
    Api { status: Option<u16>, message: String },
    /// A response payload could not be decoded.
    Decode(String),
    /// A single page did not complete within the configured timeout.
    Timeout { page: u32, secs: u64 },
    /// The cursor chain exceeded the configured page cap.
    PageLimitExceeded { max_pages: u32 },
    /// The service handed back a cursor it had already issued.
    CursorLoop { page: u32 },
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::Transport(msg) => write!(f, "transport error: {msg}"),
            DirectoryError::Api {
                status: Some(s),
                message,
            } => write!(f, "directory api error status={s}: {message}"),
            DirectoryError::Api {
                status: None,
                message,
            } => write!(f, "directory api error: {message}"),
            DirectoryError::Decode(msg) => write!(f, "decode error: {msg}"),
            DirectoryError::Timeout { page, secs } => {
                write!(f, "directory page {page} timed out after {secs}s")
            }
            DirectoryError::PageLimitExceeded { max_pages } => {
                write!(f, "directory cursor chain exceeded {max_pages} pages")
            }
            DirectoryError::CursorLoop { page } => {
                write!(f, "directory returned a repeated cursor after page {page}")
            }
        }
    }
}

impl std::error::Error for DirectoryError {}

// ---------------------------------------------------------------------------
// Fetcher trait
// ---------------------------------------------------------------------------

/// Paged access to the directory service.
///
/// `cursor` is `None` for the first page and the previous page's
/// `next_cursor` afterwards. Implementations must be object-safe and
/// `Send + Sync`.
#[async_trait::async_trait]
pub trait DirectoryPageFetcher: Send + Sync {
    /// Human-readable name identifying this fetcher (e.g. `"graph"`).
    fn source_name(&self) -> &'static str;

    async fn fetch(&self, cursor: Option<&str>) -> Result<DirectoryPage, DirectoryError>;
}
