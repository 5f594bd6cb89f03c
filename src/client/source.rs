//! Where the feed fetches pages from

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::content::{ListingRequest, ListingResponse, PostLoader};

/// A source of listing pages
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_page(&self, request: &ListingRequest) -> Result<ListingResponse>;
}

#[async_trait]
impl<S: PostSource + ?Sized> PostSource for Arc<S> {
    async fn fetch_page(&self, request: &ListingRequest) -> Result<ListingResponse> {
        (**self).fetch_page(request).await
    }
}

/// Fetches pages from a running server's listing endpoint
#[derive(Debug, Clone)]
pub struct HttpPostSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPostSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Listing endpoint URL for a request
    pub fn page_url(&self, request: &ListingRequest) -> String {
        format!(
            "{}/api/posts?page={}&limit={}&lang={}",
            self.base_url.trim_end_matches('/'),
            request.page,
            request.limit,
            request.language.code()
        )
    }
}

#[async_trait]
impl PostSource for HttpPostSource {
    async fn fetch_page(&self, request: &ListingRequest) -> Result<ListingResponse> {
        let url = self.page_url(request);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()?;

        Ok(response.json::<ListingResponse>().await?)
    }
}

/// Reads pages straight from a posts directory
#[derive(Debug, Clone)]
pub struct LocalPostSource {
    loader: PostLoader,
}

impl LocalPostSource {
    pub fn new(loader: PostLoader) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl PostSource for LocalPostSource {
    async fn fetch_page(&self, request: &ListingRequest) -> Result<ListingResponse> {
        let loader = self.loader.clone();
        let request = *request;
        let page = tokio::task::spawn_blocking(move || loader.list(&request)).await??;
        Ok(page)
    }
}
