// src/sources/rapiddns.rs
use crate::session::StatusPolicy;
use crate::sources::{FetchContext, Source};
use crate::types::{Domain, SourceInfo, SubScoutError};
use async_trait::async_trait;
use log::info;
use select::document::Document;
use select::predicate::Name;

const BASE_URL: &str = "https://rapiddns.io";

/// RapidDNS subdomain listing, scraped from its HTML result table
#[derive(Debug, Clone)]
pub struct RapidDnsSource {
    name: String,
    base_url: String,
}

impl Default for RapidDnsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RapidDnsSource {
    pub fn new() -> Self {
        Self {
            name: "rapiddns".to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// First `<td>` of every table row. Header rows have no `<td>` and are skipped;
/// running out of rows ends the data.
fn parse_table(html: &str) -> Vec<String> {
    let document = Document::from(html);
    document
        .find(Name("tr"))
        .filter_map(|row| row.find(Name("td")).next())
        .map(|cell| cell.text().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

#[async_trait]
impl Source for RapidDnsSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            description: "RapidDNS subdomain table".to_string(),
            is_default: true,
            active: false,
        }
    }

    async fn fetch(&self, domain: &Domain, ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError> {
        let url = format!("{}/subdomain/{}", self.base_url, domain);

        let html = ctx
            .session
            .fetch_text(&self.name, &url, &StatusPolicy::OK_ONLY)
            .await?
            .unwrap_or_default();

        let names = parse_table(&html);
        info!("[{}] {} table rows for {}", self.name, names.len(), domain);
        Ok(names)
    }
}
