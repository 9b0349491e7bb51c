//! SharePoint-style REST runner for [`CatalogQueryRunner`].
//!
//! `GET {base}/_api/web/lists/getbytitle('<collection>')/items?<odata>` with
//! `Accept: application/json;odata=nometadata`; rows come back under `value`.

use serde::Deserialize;

use crate::provider::{CatalogError, CatalogQueryRunner, RawRecord};
use crate::query::{escape_odata_literal, ODataQuery};

const MAX_ERROR_BODY: usize = 256;

#[derive(Clone)]
pub struct RestQueryRunner {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for RestQueryRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestQueryRunner")
            .field("base_url", &self.base_url)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl RestQueryRunner {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn items_url(&self, collection_id: &str) -> String {
        format!(
            "{}/_api/web/lists/getbytitle('{}')/items",
            self.base_url,
            escape_odata_literal(collection_id)
        )
    }
}

#[async_trait::async_trait]
impl CatalogQueryRunner for RestQueryRunner {
    fn source_name(&self) -> &'static str {
        "sharepoint-rest"
    }

    async fn query(
        &self,
        collection_id: &str,
        query: &ODataQuery,
    ) -> Result<Vec<RawRecord>, CatalogError> {
        let resp = self
            .http
            .get(self.items_url(collection_id))
            .query(&query.params())
            .header(reqwest::header::ACCEPT, "application/json;odata=nometadata")
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: Some(status.as_u16()),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body: ListItemsResponse = resp
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        Ok(body.value)
    }
}

#[derive(Debug, Deserialize)]
struct ListItemsResponse {
    #[serde(default)]
    value: Vec<RawRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogLists, CatalogRepository};
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn sends_odata_params_and_maps_rows() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/sites/hse/_api/web/lists/getbytitle('Items')/items")
                    .query_param("$orderby", "Order asc")
                    .query_param("$expand", "Author")
                    .header("authorization", "Bearer t0k");
                then.status(200).json_body(json!({
                    "value": [
                        {"Id": 7, "Title": "Rain Suit", "Order": 3, "Brands": ["Ansell"]}
                    ]
                }));
            })
            .await;

        let runner = RestQueryRunner::new(server.url("/sites/hse"), "t0k".to_string());
        let repo = CatalogRepository::new(runner, CatalogLists::default(), 0);
        let items = repo.fetch_items(&[]).await;

        m.assert_async().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 7);
        assert_eq!(items[0].brands, ["Ansell"]);
    }

    #[tokio::test]
    async fn non_success_maps_to_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(403).body("denied");
            })
            .await;

        let runner = RestQueryRunner::new(server.base_url(), "t0k".to_string());
        let err = runner
            .query("Items", &ODataQuery::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::Api {
                status: Some(403),
                message: "denied".to_string()
            }
        );
    }
}
