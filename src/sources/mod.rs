// src/sources/mod.rs
use crate::cancel::Cancellation;
use crate::progress::ProgressSink;
use crate::session::Session;
use crate::types::{Config, Domain, SourceInfo, SubScoutError};
use async_trait::async_trait;

mod alienvault;
mod bruteforce;
mod certspotter;
mod crtsh;
mod hackertarget;
mod rapiddns;
mod threatminer;
mod urlscan;
mod webarchive;

pub use alienvault::AlienVaultSource;
pub use bruteforce::BruteforceSource;
pub use certspotter::CertSpotterSource;
pub use crtsh::CrtShSource;
pub use hackertarget::HackerTargetSource;
pub use rapiddns::RapidDnsSource;
pub use threatminer::ThreatMinerSource;
pub use urlscan::UrlScanSource;
pub use webarchive::WebArchiveSource;

pub const BRUTEFORCE: &str = "bruteforce";

const PASSIVE_SOURCES: [&str; 8] = [
    "alienvault",
    "certspotter",
    "crtsh",
    "hackertarget",
    "rapiddns",
    "threatminer",
    "urlscan",
    "webarchive",
];

/// What a source gets to work with during one fetch.
pub struct FetchContext<'a> {
    pub session: &'a Session,
    pub sink: &'a dyn ProgressSink,
    pub cancel: &'a Cancellation,
}

impl<'a> FetchContext<'a> {
    pub fn new(session: &'a Session, sink: &'a dyn ProgressSink, cancel: &'a Cancellation) -> Self {
        Self { session, sink, cancel }
    }
}

#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;
    fn info(&self) -> SourceInfo;
    /// Raw, unnormalized candidates for `domain`. Never retries.
    async fn fetch(&self, domain: &Domain, ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError>;
}

/// Build a passive source by name.
pub fn create_source(name: &str) -> Option<Box<dyn Source>> {
    match name.to_lowercase().as_str() {
        "alienvault" => Some(Box::new(AlienVaultSource::new())),
        "certspotter" => Some(Box::new(CertSpotterSource::new())),
        "crtsh" => Some(Box::new(CrtShSource::new())),
        "hackertarget" => Some(Box::new(HackerTargetSource::new())),
        "rapiddns" => Some(Box::new(RapidDnsSource::new())),
        "threatminer" => Some(Box::new(ThreatMinerSource::new())),
        "urlscan" => Some(Box::new(UrlScanSource::new())),
        "webarchive" => Some(Box::new(WebArchiveSource::new())),
        _ => None,
    }
}

pub fn get_all_sources() -> Vec<Box<dyn Source>> {
    PASSIVE_SOURCES
        .into_iter()
        .filter_map(create_source)
        .collect()
}

/// Every name accepted in `--sources` and the config file.
pub fn is_known_source(name: &str) -> bool {
    let name = name.to_lowercase();
    name == BRUTEFORCE || PASSIVE_SOURCES.contains(&name.as_str())
}

/// Ordered set of sources for one enumeration run.
///
/// Built fresh for every domain and only read while the run is in progress.
#[derive(Default)]
pub struct ServiceRegistry {
    sources: Vec<Box<dyn Source>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Box<dyn Source>) -> Self {
        self.sources.push(source);
        self
    }

    /// The configured passive sources in order, with bruteforce appended last when given.
    pub fn from_config(
        config: &Config,
        bruteforce: Option<BruteforceSource>,
    ) -> Result<Self, SubScoutError> {
        let mut registry = Self::new();
        for name in &config.sources {
            if name.eq_ignore_ascii_case(BRUTEFORCE) {
                continue;
            }
            let source = create_source(name)
                .ok_or_else(|| SubScoutError::ConfigError(format!("Unknown source: {}", name)))?;
            registry = registry.with_source(source);
        }

        if let Some(bruteforce) = bruteforce {
            registry = registry.with_source(Box::new(bruteforce));
        }

        Ok(registry)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Source> {
        self.sources.iter().map(|source| &**source)
    }

    pub fn names(&self) -> Vec<String> {
        self.iter().map(|source| source.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_source() {
        assert!(create_source("crtsh").is_some());
        assert!(create_source("CRTSH").is_some());
        assert!(create_source("invalid").is_none());
        assert!(create_source(BRUTEFORCE).is_none());
    }

    #[test]
    fn test_all_sources_in_catalog_order() {
        let names: Vec<String> = get_all_sources()
            .iter()
            .map(|source| source.name().to_string())
            .collect();
        assert_eq!(names, PASSIVE_SOURCES.to_vec());
    }

    #[test]
    fn test_registry_from_config_follows_config_order() {
        let config = Config {
            sources: vec!["webarchive".to_string(), "crtsh".to_string(), "bruteforce".to_string()],
            ..Config::default()
        };
        let registry = ServiceRegistry::from_config(&config, None).unwrap();
        assert_eq!(registry.names(), vec!["webarchive", "crtsh"]);
    }

    #[test]
    fn test_registry_rejects_unknown_source() {
        let config = Config {
            sources: vec!["nope".to_string()],
            ..Config::default()
        };
        assert!(ServiceRegistry::from_config(&config, None).is_err());
    }

    #[test]
    fn test_is_known_source() {
        assert!(is_known_source("urlscan"));
        assert!(is_known_source("bruteforce"));
        assert!(!is_known_source("virustotal"));
    }
}
