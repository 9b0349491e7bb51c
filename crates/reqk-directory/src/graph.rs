//! Graph-style HTTP directory fetcher.
//!
//! First page: `GET {base}/users?$select=...&$expand=manager(...)&$top=N`.
//! Continuation: the absolute `@odata.nextLink` from the previous page.
//! The bearer token is supplied by the caller and never logged.

use serde::Deserialize;

use crate::provider::{DirectoryError, DirectoryPage, DirectoryPageFetcher, RawUserRecord};

const USER_SELECT: &str = "id,displayName,mail,jobTitle,department,officeLocation,mobilePhone";
const MANAGER_EXPAND: &str = "manager($select=id,displayName)";

/// Longest error body echoed into a [`DirectoryError::Api`] message.
const MAX_ERROR_BODY: usize = 256;

#[derive(Clone)]
pub struct GraphPageFetcher {
    http: reqwest::Client,
    base_url: String,
    token: String,
    page_size: u32,
}

impl std::fmt::Debug for GraphPageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphPageFetcher")
            .field("base_url", &self.base_url)
            .field("token", &"<REDACTED>")
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl GraphPageFetcher {
    pub fn new(token: String, page_size: u32) -> Self {
        Self::new_with_base_url(token, page_size, "https://graph.microsoft.com/v1.0".to_string())
    }

    pub fn new_with_base_url(token: String, page_size: u32, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            page_size,
        }
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }
}

#[async_trait::async_trait]
impl DirectoryPageFetcher for GraphPageFetcher {
    fn source_name(&self) -> &'static str {
        "graph"
    }

    async fn fetch(&self, cursor: Option<&str>) -> Result<DirectoryPage, DirectoryError> {
        let req = match cursor {
            None => {
                let top = self.page_size.to_string();
                self.http.get(self.users_url()).query(&[
                    ("$select", USER_SELECT),
                    ("$expand", MANAGER_EXPAND),
                    ("$top", top.as_str()),
                ])
            }
            Some(link) => {
                // The token must only ever travel to the configured host.
                if !within_base(&self.base_url, link) {
                    return Err(DirectoryError::Decode(format!(
                        "continuation link outside {}",
                        self.base_url
                    )));
                }
                self.http.get(link)
            }
        };

        let resp = req
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                status: Some(status.as_u16()),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body: GraphUsersResponse = resp
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;

        Ok(DirectoryPage {
            records: body.value,
            next_cursor: body.next_link,
        })
    }
}

/// Same scheme, host and port as `base`, and a path under `base`'s path at a
/// segment boundary.
fn within_base(base: &str, link: &str) -> bool {
    let (Ok(base), Ok(link)) = (reqwest::Url::parse(base), reqwest::Url::parse(link)) else {
        return false;
    };
    if base.scheme() != link.scheme()
        || base.host_str() != link.host_str()
        || base.port_or_known_default() != link.port_or_known_default()
    {
        return false;
    }
    let prefix = base.path().trim_end_matches('/');
    prefix.is_empty()
        || link
            .path()
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[derive(Debug, Deserialize)]
struct GraphUsersResponse {
    #[serde(default)]
    value: Vec<RawUserRecord>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

// -----------------
// Tests (local mock server)
// -----------------
