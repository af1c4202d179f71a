// src/sources/urlscan.rs
use crate::session::StatusPolicy;
use crate::sources::{FetchContext, Source};
use crate::types::{Domain, SourceInfo, SubScoutError};
use async_trait::async_trait;
use log::info;
use serde::Deserialize;

const BASE_URL: &str = "https://urlscan.io";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    page: Option<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    url: Option<String>,
}

/// urlscan.io public scan search; yields page URLs, not hostnames
#[derive(Debug, Clone)]
pub struct UrlScanSource {
    name: String,
    base_url: String,
}

impl Default for UrlScanSource {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlScanSource {
    pub fn new() -> Self {
        Self {
            name: "urlscan".to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Source for UrlScanSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            description: "urlscan.io scanned pages".to_string(),
            is_default: true,
            active: false,
        }
    }

    async fn fetch(&self, domain: &Domain, ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError> {
        let url = format!(
            "{}/api/v1/search?q={}",
            self.base_url,
            urlencoding::encode(domain.as_str())
        );

        let response: Option<SearchResponse> = ctx
            .session
            .fetch_json(&self.name, &url, &StatusPolicy::OK_ONLY)
            .await?;

        let urls: Vec<String> = response
            .map(|response| response.results)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|result| result.page.and_then(|page| page.url))
            .filter(|url| url.contains(domain.as_str()))
            .collect();
        info!("[{}] {} page URLs for {}", self.name, urls.len(), domain);
        Ok(urls)
    }
}
