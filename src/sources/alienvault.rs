// src/sources/alienvault.rs
use crate::session::StatusPolicy;
use crate::sources::{FetchContext, Source};
use crate::types::{Domain, SourceInfo, SubScoutError};
use async_trait::async_trait;
use log::info;
use serde::Deserialize;

const BASE_URL: &str = "https://otx.alienvault.com";
// OTX answers 400 for domains it has never seen.
const STATUS: StatusPolicy = StatusPolicy::with_empty(&[400], &[200, 400]);

#[derive(Debug, Deserialize)]
struct PassiveDnsResponse {
    #[serde(default)]
    passive_dns: Vec<PassiveDnsRecord>,
}

#[derive(Debug, Deserialize)]
struct PassiveDnsRecord {
    #[serde(default)]
    hostname: String,
}

/// AlienVault OTX passive DNS source
#[derive(Debug, Clone)]
pub struct AlienVaultSource {
    name: String,
    base_url: String,
}

impl Default for AlienVaultSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AlienVaultSource {
    pub fn new() -> Self {
        Self {
            name: "alienvault".to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Source for AlienVaultSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            description: "AlienVault OTX passive DNS".to_string(),
            is_default: true,
            active: false,
        }
    }

    async fn fetch(&self, domain: &Domain, ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError> {
        let url = format!(
            "{}/api/v1/indicators/domain/{}/passive_dns",
            self.base_url, domain
        );

        let Some(response) = ctx
            .session
            .fetch_json::<PassiveDnsResponse>(&self.name, &url, &STATUS)
            .await?
        else {
            return Ok(Vec::new());
        };

        let hostnames: Vec<String> = response
            .passive_dns
            .into_iter()
            .map(|record| record.hostname)
            .collect();
        info!("[{}] {} passive DNS records for {}", self.name, hostnames.len(), domain);
        Ok(hostnames)
    }
}
