// src/sources/threatminer.rs
use crate::session::StatusPolicy;
use crate::sources::{FetchContext, Source};
use crate::types::{Domain, SourceInfo, SubScoutError};
use async_trait::async_trait;
use log::info;
use serde::Deserialize;

const BASE_URL: &str = "https://api.threatminer.org";
const STATUS: StatusPolicy = StatusPolicy::with_empty(&[404], &[200, 404]);

#[derive(Debug, Deserialize)]
struct ThreatMinerResponse {
    #[serde(default)]
    results: Vec<String>,
}

/// ThreatMiner domain report (rt=5 is the subdomain listing)
#[derive(Debug, Clone)]
pub struct ThreatMinerSource {
    name: String,
    base_url: String,
}

impl Default for ThreatMinerSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatMinerSource {
    pub fn new() -> Self {
        Self {
            name: "threatminer".to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Source for ThreatMinerSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            description: "ThreatMiner subdomain report".to_string(),
            is_default: true,
            active: false,
        }
    }

    async fn fetch(&self, domain: &Domain, ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError> {
        let url = format!(
            "{}/v2/domain.php?q={}&rt=5",
            self.base_url,
            urlencoding::encode(domain.as_str())
        );

        let results = ctx
            .session
            .fetch_json::<ThreatMinerResponse>(&self.name, &url, &STATUS)
            .await?
            .map(|response| response.results)
            .unwrap_or_default();

        info!("[{}] {} results for {}", self.name, results.len(), domain);
        Ok(results)
    }
}
