use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::ItemService;
use crate::config::Config;
use crate::dto::{
    ItemDraft, ItemPatch, ItemResponse, ReviewDateUpdate, TodaysReviewFilters, TodaysReviews,
    UnfinishRequest,
};
use crate::errors::{Result, RevisitError};
use crate::models::{Category, Item, Pattern, ReviewBox};

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt: Sized {
    /// Checks for error status and maps it to a [`RevisitError`]
    fn check(self) -> impl Future<Output = Result<Self>> + Send;
}

impl ResponseExt for Response {
    async fn check(self) -> Result<Self> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }

        let path = self.url().path().to_string();
        let body = self.json::<serde_json::Value>().await.ok();
        let message = body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(|e| e.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));

        debug!("{} answered {}: {}", path, status, message);

        Err(match status {
            StatusCode::NOT_FOUND => RevisitError::NotFound(path),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let field = body
                    .as_ref()
                    .and_then(|b| b.get("field"))
                    .and_then(|f| f.as_str())
                    .unwrap_or("request");
                RevisitError::validation(field, message)
            }
            _ => RevisitError::Transport(format!("{} ({})", message, status.as_u16())),
        })
    }
}

/// Item service backed by a remote server speaking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpItemService {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// The underlying HTTP client
    client: Client,
}

impl HttpItemService {
    /// Creates a new HttpItemService
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the server
    /// * `timeout` - Per-request timeout; requests are never retried
    ///
    /// ### Errors
    ///
    /// Returns `Transport` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Creates a service from the resolved configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.server_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.url(path)).send().await?.check().await?;
        Ok(response.json().await?)
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.post(self.url(path)).send().await?.check().await?;
        Ok(response.json().await?)
    }
}

impl ItemService for HttpItemService {
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create_item(&self, draft: ItemDraft) -> Result<Item> {
        let response = self
            .client
            .post(self.url("/items"))
            .json(&draft)
            .send()
            .await?
            .check()
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, patch))]
    async fn update_item(&self, item_id: &str, patch: ItemPatch) -> Result<ItemResponse> {
        let response = self
            .client
            .patch(self.url(&format!("/items/{}", item_id)))
            .json(&patch)
            .send()
            .await?
            .check()
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self))]
    async fn delete_item(&self, item_id: &str) -> Result<()> {
        self.client
            .delete(self.url(&format!("/items/{}", item_id)))
            .send()
            .await?
            .check()
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_item_finished(&self, item_id: &str) -> Result<ItemResponse> {
        self.post_empty(&format!("/items/{}/finish", item_id)).await
    }

    #[instrument(skip(self, request))]
    async fn mark_item_unfinished(&self, item_id: &str, request: UnfinishRequest) -> Result<ItemResponse> {
        let response = self
            .client
            .post(self.url(&format!("/items/{}/unfinish", item_id)))
            .json(&request)
            .send()
            .await?
            .check()
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self))]
    async fn complete_review_date(&self, item_id: &str, review_date_id: &str) -> Result<ItemResponse> {
        self.post_empty(&format!("/items/{}/review_dates/{}/complete", item_id, review_date_id))
            .await
    }

    #[instrument(skip(self))]
    async fn incomplete_review_date(&self, item_id: &str, review_date_id: &str) -> Result<ItemResponse> {
        self.post_empty(&format!("/items/{}/review_dates/{}/incomplete", item_id, review_date_id))
            .await
    }

    #[instrument(skip(self, update))]
    async fn update_review_date(
        &self,
        item_id: &str,
        review_date_id: &str,
        update: ReviewDateUpdate,
    ) -> Result<ItemResponse> {
        let response = self
            .client
            .patch(self.url(&format!("/items/{}/review_dates/{}", item_id, review_date_id)))
            .json(&update)
            .send()
            .await?
            .check()
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self))]
    async fn fetch_items_by_box(&self, box_id: &str) -> Result<Vec<Item>> {
        self.get_json(&format!("/boxes/{}/items", box_id)).await
    }

    #[instrument(skip(self))]
    async fn fetch_unclassified_items(&self) -> Result<Vec<Item>> {
        self.get_json("/items/unclassified").await
    }

    #[instrument(skip(self))]
    async fn fetch_unclassified_items_by_category(&self, category_id: &str) -> Result<Vec<Item>> {
        self.get_json(&format!("/categories/{}/items/unclassified", category_id))
            .await
    }

    #[instrument(skip(self, filters), fields(filters = %filters))]
    async fn fetch_todays_reviews(&self, filters: TodaysReviewFilters) -> Result<TodaysReviews> {
        let response = self
            .client
            .get(self.url("/reviews/today"))
            .query(&filters)
            .send()
            .await?
            .check()
            .await?;
        Ok(response.json().await?)
    }

    async fn fetch_patterns(&self) -> Result<Vec<Pattern>> {
        self.get_json("/patterns").await
    }

    async fn fetch_boxes(&self, category_id: &str) -> Result<Vec<ReviewBox>> {
        self.get_json(&format!("/categories/{}/boxes", category_id)).await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        self.get_json("/categories").await
    }
}
