//! HTTP client for the remote collection API.

use super::error::GatewayError;
use super::types::{CardInput, CardUpdate, ListInput, RemoteCard, RemoteList, ReorderEntry};
use super::{CollectionGateway, GatewayResult};
use crate::logging::Pretty;
use crate::types::{BoardId, CardId, ListId};
use async_trait::async_trait;
use kanban_sync_config::ApiConfig;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, trace};
use url::Url;

/// Extract a human-readable message from a JSON error body.
///
/// Tries `message`, then `error`, then falls back to the raw body.
fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json.get("message").and_then(|v| v.as_str()) {
            return msg.to_string();
        }
        if let Some(err) = json.get("error").and_then(|v| v.as_str()) {
            return err.to_string();
        }
    }
    body.to_string()
}

/// Body of `PATCH /lists/{id}`
#[derive(Debug, Serialize)]
struct ListUpdateBody<'a> {
    #[serde(flatten)]
    input: &'a ListInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    reorder: Option<&'a [ReorderEntry]>,
}

/// Gateway speaking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: Url, token: Option<String>, timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Create a client from the `api` configuration section
    pub fn from_config(config: &ApiConfig) -> crate::Result<Self> {
        let base_url = config.base_url()?;
        Ok(Self::new(base_url, config.token.clone(), config.timeout())?)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map an HTTP response to a `GatewayError` based on status code.
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> GatewayResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        debug!(status = status_code, %message, "remote rejected request");

        match status_code {
            401 => Err(GatewayError::Unauthorized(message)),
            404 => Err(GatewayError::NotFound(message)),
            409 => Err(GatewayError::Conflict(message)),
            _ => Err(GatewayError::Api {
                status: status_code,
                body: message,
            }),
        }
    }
}

#[async_trait]
impl CollectionGateway for HttpGateway {
    #[instrument(skip_all, fields(board_id = %board_id))]
    async fn fetch_board(&self, board_id: &BoardId) -> GatewayResult<Vec<RemoteList>> {
        let url = self.url(&["boards", board_id.as_str(), "lists"]);
        let response = self.request(Method::GET, &url).send().await?;
        let response = self.check_response(response).await?;
        let lists: Vec<RemoteList> = response.json().await?;
        debug!(lists = lists.len(), "fetched board");
        Ok(lists)
    }

    #[instrument(skip_all, fields(board_id = %board_id))]
    async fn create_list(&self, board_id: &BoardId, input: ListInput) -> GatewayResult<RemoteList> {
        let url = self.url(&["boards", board_id.as_str(), "lists"]);
        trace!(body = %Pretty(&input), "POST {}", url);
        let response = self.request(Method::POST, &url).json(&input).send().await?;
        let response = self.check_response(response).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip_all, fields(list_id = %list_id))]
    async fn update_list(
        &self,
        list_id: &ListId,
        input: ListInput,
        reorder: Option<Vec<ReorderEntry>>,
    ) -> GatewayResult<RemoteList> {
        let url = self.url(&["lists", list_id.as_str()]);
        let body = ListUpdateBody {
            input: &input,
            reorder: reorder.as_deref(),
        };
        trace!(body = %Pretty(&body), "PATCH {}", url);
        let response = self.request(Method::PATCH, &url).json(&body).send().await?;
        let response = self.check_response(response).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip_all, fields(list_id = %list_id))]
    async fn delete_list(&self, list_id: &ListId) -> GatewayResult<()> {
        let url = self.url(&["lists", list_id.as_str()]);
        let response = self.request(Method::DELETE, &url).send().await?;
        self.check_response(response).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(list_id = %list_id))]
    async fn create_card(&self, list_id: &ListId, input: CardInput) -> GatewayResult<RemoteCard> {
        let url = self.url(&["lists", list_id.as_str(), "cards"]);
        trace!(body = %Pretty(&input), "POST {}", url);
        let response = self.request(Method::POST, &url).json(&input).send().await?;
        let response = self.check_response(response).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip_all, fields(card_id = %card_id))]
    async fn update_card(&self, card_id: &CardId, update: CardUpdate) -> GatewayResult<RemoteCard> {
        let url = self.url(&["cards", card_id.as_str()]);
        trace!(body = %Pretty(&update), "PATCH {}", url);
        let response = self
            .request(Method::PATCH, &url)
            .json(&update)
            .send()
            .await?;
        let response = self.check_response(response).await?;
        Ok(response.json().await?)
    }
}
