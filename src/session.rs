// src/session.rs
use crate::types::{Config, SubScoutError};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Which HTTP statuses a provider may answer with, and which of those mean "nothing found".
#[derive(Debug, Clone, Copy)]
pub struct StatusPolicy {
    pub accepted: &'static [u16],
    pub empty: &'static [u16],
}

impl StatusPolicy {
    pub const OK_ONLY: StatusPolicy = StatusPolicy {
        accepted: &[200],
        empty: &[],
    };

    pub const fn with_empty(empty: &'static [u16], accepted: &'static [u16]) -> Self {
        Self { accepted, empty }
    }
}

#[derive(Clone)]
pub struct Session {
    pub client: Client,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self, SubScoutError> {
        let mut client_builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10);

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| SubScoutError::ConfigError(format!("Invalid proxy URL: {}", e)))?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder
            .build()
            .map_err(|e| SubScoutError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Session { client })
    }

    /// GET `url` on behalf of `source`. `Ok(None)` means the provider answered "no data".
    pub async fn fetch(
        &self,
        source: &str,
        url: &str,
        policy: &StatusPolicy,
    ) -> Result<Option<reqwest::Response>, SubScoutError> {
        debug!("[{}] GET {}", source, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SubScoutError::source_failure(source, format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        if !policy.accepted.contains(&status) {
            return Err(SubScoutError::source_failure(
                source,
                format!("Unexpected status code {}", status),
            ));
        }
        if policy.empty.contains(&status) {
            debug!("[{}] status {} means no data", source, status);
            return Ok(None);
        }

        Ok(Some(response))
    }

    pub async fn fetch_text(
        &self,
        source: &str,
        url: &str,
        policy: &StatusPolicy,
    ) -> Result<Option<String>, SubScoutError> {
        match self.fetch(source, url, policy).await? {
            Some(response) => response
                .text()
                .await
                .map(Some)
                .map_err(|e| SubScoutError::source_failure(source, format!("Failed to read body: {}", e))),
            None => Ok(None),
        }
    }

    pub async fn fetch_json<T>(
        &self,
        source: &str,
        url: &str,
        policy: &StatusPolicy,
    ) -> Result<Option<T>, SubScoutError>
    where
        T: DeserializeOwned,
    {
        match self.fetch_text(source, url, policy).await? {
            Some(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
                SubScoutError::source_failure(source, format!("Failed to parse JSON: {}", e))
            }),
            None => Ok(None),
        }
    }
}
