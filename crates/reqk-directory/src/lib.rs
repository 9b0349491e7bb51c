//! reqk-directory
//!
//! Paginated directory ingestion: fetch every page, narrow raw records into
//! [`DirectoryUser`], drop service accounts, dedupe by id.
//!
//! Fail-closed: any page failure discards everything accumulated so far. A
//! directory used for identity lookups is either complete or plainly empty.

pub mod graph;
pub mod provider;

use std::collections::HashSet;
use std::time::Duration;

use reqk_schemas::{DirectoryUser, ManagerRef};
use tracing::{debug, error, info};

pub use graph::GraphPageFetcher;
pub use provider::{DirectoryError, DirectoryPage, DirectoryPageFetcher, RawManager, RawUserRecord};

/// Case-insensitive e-mail substrings that identify non-person accounts:
/// Exchange health mailboxes, directory sync accounts, the online services team.
pub const DEFAULT_DENIED_EMAIL_SUBSTRINGS: &[&str] =
    &["healthmailbox", "sync_", "msonlineservicesteam"];

/// Filtering and safety limits for one directory refresh.
#[derive(Debug, Clone)]
pub struct DirectoryPolicy {
    denied_email_substrings: Vec<String>,
    pub max_pages: u32,
    pub page_timeout: Duration,
}

impl Default for DirectoryPolicy {
    fn default() -> Self {
        Self {
            denied_email_substrings: DEFAULT_DENIED_EMAIL_SUBSTRINGS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_pages: 500,
            page_timeout: Duration::from_secs(30),
        }
    }
}

impl DirectoryPolicy {
    pub fn new(max_pages: u32, page_timeout: Duration) -> Self {
        Self {
            max_pages,
            page_timeout,
            ..Self::default()
        }
    }

    /// Add extra denied substrings (e.g. vendor domains) on top of the defaults.
    pub fn with_denied<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for s in extra {
            let s = s.as_ref().trim().to_ascii_lowercase();
            if !s.is_empty() && !self.denied_email_substrings.contains(&s) {
                self.denied_email_substrings.push(s);
            }
        }
        self
    }

    pub fn is_denied(&self, email: &str) -> bool {
        let e = email.to_ascii_lowercase();
        self.denied_email_substrings.iter().any(|d| e.contains(d.as_str()))
    }
}

pub type ErrorSink = Box<dyn Fn(&DirectoryError) + Send + Sync>;

/// Pulls the full directory through a [`DirectoryPageFetcher`].
pub struct DirectoryClient<F> {
    fetcher: F,
    policy: DirectoryPolicy,
    error_sink: Option<ErrorSink>,
}

impl<F: DirectoryPageFetcher> DirectoryClient<F> {
    pub fn new(fetcher: F, policy: DirectoryPolicy) -> Self {
        Self {
            fetcher,
            policy,
            error_sink: None,
        }
    }

    /// Side channel invoked once per failed refresh, after logging.
    pub fn with_error_sink(mut self, sink: impl Fn(&DirectoryError) + Send + Sync + 'static) -> Self {
        self.error_sink = Some(Box::new(sink));
        self
    }

    /// Fetch the whole directory. Never fails: errors yield an empty vector.
    pub async fn fetch_all_users(&self) -> Vec<DirectoryUser> {
        match self.try_fetch_all_users().await {
            Ok(users) => users,
            Err(err) => {
                error!(
                    source = self.fetcher.source_name(),
                    error = %err,
                    "directory refresh failed; returning empty directory"
                );
                if let Some(sink) = &self.error_sink {
                    sink(&err);
                }
                Vec::new()
            }
        }
    }

    /// Typed variant of [`fetch_all_users`](Self::fetch_all_users).
    ///
    /// Pages are requested strictly in sequence; each cursor comes from the
    /// previous response.
    pub async fn try_fetch_all_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        let mut users: Vec<DirectoryUser> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut seen_cursors: HashSet<String> = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut page: u32 = 0;

        loop {
            if page >= self.policy.max_pages {
                return Err(DirectoryError::PageLimitExceeded {
                    max_pages: self.policy.max_pages,
                });
            }
            page += 1;

            let resp = tokio::time::timeout(
                self.policy.page_timeout,
                self.fetcher.fetch(cursor.as_deref()),
            )
            .await
            .map_err(|_| DirectoryError::Timeout {
                page,
                secs: self.policy.page_timeout.as_secs(),
            })??;

            let received = resp.records.len();
            let kept = self.ingest_page(resp.records, &mut seen_ids, &mut users);
            debug!(page, received, kept, "directory page ingested");

            match resp.next_cursor.filter(|c| !c.trim().is_empty()) {
                None => break,
                Some(next) => {
                    if !seen_cursors.insert(next.clone()) {
                        return Err(DirectoryError::CursorLoop { page });
                    }
                    cursor = Some(next);
                }
            }
        }

        info!(
            source = self.fetcher.source_name(),
            pages = page,
            users = users.len(),
            "directory refreshed"
        );
        Ok(users)
    }

    fn ingest_page(
        &self,
        records: Vec<RawUserRecord>,
        seen_ids: &mut HashSet<String>,
        out: &mut Vec<DirectoryUser>,
    ) -> usize {
        let before = out.len();
        for raw in records {
            let Some(user) = normalize_user(raw) else {
                continue;
            };
            if self.policy.is_denied(&user.email) {
                continue;
            }
            // First occurrence wins; page order defines precedence.
            if !seen_ids.insert(user.id.clone()) {
                continue;
            }
            out.push(user);
        }
        out.len() - before
    }
}

/// Narrow a raw record. Returns `None` without an id or e-mail.
///
/// Blank optional fields become `None`; a missing display name falls back to
/// the e-mail address.
pub fn normalize_user(raw: RawUserRecord) -> Option<DirectoryUser> {
    let id = non_blank(raw.id)?;
    let email = non_blank(raw.mail)?;
    let display_name = non_blank(raw.display_name).unwrap_or_else(|| email.clone());

    let manager = raw.manager.and_then(|m| {
        let id = non_blank(m.id)?;
        let display_name = non_blank(m.display_name).unwrap_or_default();
        Some(ManagerRef { id, display_name })
    });

    Some(DirectoryUser {
        id,
        display_name,
        email,
        job_title: non_blank(raw.job_title),
        department: non_blank(raw.department),
        office_location: non_blank(raw.office_location),
        mobile_phone: non_blank(raw.mobile_phone),
        manager,
    })
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
