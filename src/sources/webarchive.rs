// src/sources/webarchive.rs
use crate::session::StatusPolicy;
use crate::sources::{FetchContext, Source};
use crate::types::{Domain, SourceInfo, SubScoutError};
use async_trait::async_trait;
use log::info;

const BASE_URL: &str = "https://web.archive.org";

/// Wayback Machine CDX index; one archived URL per line
#[derive(Debug, Clone)]
pub struct WebArchiveSource {
    name: String,
    base_url: String,
}

impl Default for WebArchiveSource {
    fn default() -> Self {
        Self::new()
    }
}

impl WebArchiveSource {
    pub fn new() -> Self {
        Self {
            name: "webarchive".to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Source for WebArchiveSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            description: "Wayback Machine archived URLs".to_string(),
            is_default: true,
            active: false,
        }
    }

    async fn fetch(&self, domain: &Domain, ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError> {
        let url = format!(
            "{}/cdx/search/cdx?url={}&output=text&fl=original&collapse=urlkey",
            self.base_url,
            urlencoding::encode(&format!("*.{}/*", domain))
        );

        let body = ctx
            .session
            .fetch_text(&self.name, &url, &StatusPolicy::OK_ONLY)
            .await?
            .unwrap_or_default();

        let urls: Vec<String> = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        info!("[{}] {} archived URLs for {}", self.name, urls.len(), domain);
        Ok(urls)
    }
}
