// src/sources/certspotter.rs
use crate::session::StatusPolicy;
use crate::sources::{FetchContext, Source};
use crate::types::{Domain, SourceInfo, SubScoutError};
use async_trait::async_trait;
use log::info;
use serde::Deserialize;

const BASE_URL: &str = "https://api.certspotter.com";
// Unauthenticated callers get 403 once the free allowance for a domain is used up.
const STATUS: StatusPolicy = StatusPolicy::with_empty(&[403], &[200, 403]);

#[derive(Debug, Deserialize)]
struct Issuance {
    #[serde(default)]
    dns_names: Vec<String>,
}

/// SSLMate Cert Spotter issuance search
#[derive(Debug, Clone)]
pub struct CertSpotterSource {
    name: String,
    base_url: String,
}

impl Default for CertSpotterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CertSpotterSource {
    pub fn new() -> Self {
        Self {
            name: "certspotter".to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Source for CertSpotterSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            description: "Cert Spotter certificate issuances".to_string(),
            is_default: true,
            active: false,
        }
    }

    async fn fetch(&self, domain: &Domain, ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError> {
        let url = format!(
            "{}/v1/issuances?domain={}&include_subdomains=true&expand=dns_names",
            self.base_url,
            urlencoding::encode(domain.as_str())
        );

        let issuances: Vec<Issuance> = ctx
            .session
            .fetch_json(&self.name, &url, &STATUS)
            .await?
            .unwrap_or_default();

        let names: Vec<String> = issuances
            .into_iter()
            .flat_map(|issuance| issuance.dns_names)
            .collect();
        info!("[{}] {} DNS names for {}", self.name, names.len(), domain);
        Ok(names)
    }
}
