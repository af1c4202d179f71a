// src/sources/crtsh.rs
use crate::session::StatusPolicy;
use crate::sources::{FetchContext, Source};
use crate::types::{Domain, SourceInfo, SubScoutError};
use async_trait::async_trait;
use log::info;
use serde::Deserialize;

const BASE_URL: &str = "https://crt.sh";

#[derive(Debug, Deserialize)]
struct CrtShEntry {
    #[serde(default)]
    name_value: String,
}

/// CRT.sh certificate transparency logs source
#[derive(Debug, Clone)]
pub struct CrtShSource {
    name: String,
    base_url: String,
}

impl Default for CrtShSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CrtShSource {
    pub fn new() -> Self {
        Self {
            name: "crtsh".to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

// name_value can hold several names separated by newlines
fn extract_names(entries: Vec<CrtShEntry>) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.name_value.lines())
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[async_trait]
impl Source for CrtShSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            description: "crt.sh certificate transparency search".to_string(),
            is_default: true,
            active: false,
        }
    }

    async fn fetch(&self, domain: &Domain, ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError> {
        let url = format!(
            "{}/?q={}&output=json",
            self.base_url,
            urlencoding::encode(&format!("%.{}", domain))
        );

        let entries: Vec<CrtShEntry> = ctx
            .session
            .fetch_json(&self.name, &url, &StatusPolicy::OK_ONLY)
            .await?
            .unwrap_or_default();

        let names = extract_names(entries);
        info!("[{}] {} certificate names for {}", self.name, names.len(), domain);
        Ok(names)
    }
}
