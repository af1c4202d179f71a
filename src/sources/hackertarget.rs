// src/sources/hackertarget.rs
use crate::session::StatusPolicy;
use crate::sources::{FetchContext, Source};
use crate::types::{Domain, SourceInfo, SubScoutError};
use async_trait::async_trait;
use log::{debug, info};

const BASE_URL: &str = "https://api.hackertarget.com";

/// HackerTarget API source
#[derive(Debug, Clone)]
pub struct HackerTargetSource {
    name: String,
    base_url: String,
}

impl Default for HackerTargetSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HackerTargetSource {
    pub fn new() -> Self {
        Self {
            name: "hackertarget".to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Body is `host,ip` per line, or a plain-text sentinel instead of data.
fn parse_hostsearch(source: &str, body: &str) -> Result<Vec<String>, SubScoutError> {
    let trimmed = body.trim();
    if trimmed.starts_with("API count exceeded") {
        return Err(SubScoutError::source_failure(source, trimmed));
    }
    if trimmed.starts_with("error") || trimmed.starts_with("No records found") {
        debug!("[{}] no data: {}", source, trimmed);
        return Ok(Vec::new());
    }

    Ok(trimmed
        .lines()
        .filter_map(|line| line.split(',').next())
        .map(|host| host.trim().to_string())
        .filter(|host| !host.is_empty())
        .collect())
}

#[async_trait]
impl Source for HackerTargetSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            description: "HackerTarget host search".to_string(),
            is_default: true,
            active: false,
        }
    }

    async fn fetch(&self, domain: &Domain, ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError> {
        let url = format!(
            "{}/hostsearch/?q={}",
            self.base_url,
            urlencoding::encode(domain.as_str())
        );

        let body = ctx
            .session
            .fetch_text(&self.name, &url, &StatusPolicy::OK_ONLY)
            .await?
            .unwrap_or_default();

        let hosts = parse_hostsearch(&self.name, &body)?;
        info!("[{}] {} hosts for {}", self.name, hosts.len(), domain);
        Ok(hosts)
    }
}
