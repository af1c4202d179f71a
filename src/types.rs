// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use trust_dns_resolver::proto::rr::RecordType;

#[derive(Debug, Clone)]
pub struct Config {
    pub timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<String>,
    pub sources: Vec<String>,
    pub parallel: bool,
    pub output: OutputConfig,
    pub bruteforce: BruteforceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("SubScout/{}", env!("CARGO_PKG_VERSION")),
            proxy: None,
            sources: vec![
                "alienvault".to_string(),
                "certspotter".to_string(),
                "crtsh".to_string(),
                "hackertarget".to_string(),
                "rapiddns".to_string(),
                "threatminer".to_string(),
                "urlscan".to_string(),
                "webarchive".to_string(),
            ],
            parallel: false,
            output: OutputConfig::default(),
            bruteforce: BruteforceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub directory: Option<PathBuf>,
    pub include_domain: bool,
    pub silent: bool,
    pub events: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// How the prober treats a name that exists but has no record of the queried type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoAnswerPolicy {
    /// Keep checking the remaining record types; the name only counts on a real answer.
    #[default]
    Unresolved,
    /// An empty NOERROR answer is enough to report the name.
    Match,
}

#[derive(Debug, Clone)]
pub struct BruteforceConfig {
    pub enabled: bool,
    pub wordlist: Option<PathBuf>,
    pub threads: usize,
    pub timeout: Duration,
    pub nameservers: Vec<String>,
    pub use_system_resolver: bool,
    pub no_answer_policy: NoAnswerPolicy,
    pub max_queries_per_second: Option<u32>,
    pub detect_wildcard: bool,
}

impl Default for BruteforceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            wordlist: None,
            threads: 50,
            timeout: Duration::from_millis(500),
            nameservers: vec![
                "8.8.8.8:53".to_string(),
                "8.8.4.4:53".to_string(),
                "1.1.1.1:53".to_string(),
                "1.0.0.1:53".to_string(),
            ],
            use_system_resolver: false,
            no_answer_policy: NoAnswerPolicy::Unresolved,
            max_queries_per_second: None,
            detect_wildcard: true,
        }
    }
}

/// Root domain under investigation, lowercased and without a trailing dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    pub fn parse(input: &str) -> Result<Self, SubScoutError> {
        let mut domain = input.trim().to_lowercase();
        if domain.ends_with('.') {
            domain.pop();
        }

        let bare = domain.strip_prefix('.').unwrap_or(&domain);
        if bare.is_empty() || !crate::utils::is_valid_domain(bare) {
            return Err(SubScoutError::InvalidDomain(input.to_string()));
        }

        Ok(Self(domain))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The string every subdomain of this domain must end with.
    pub fn suffix(&self) -> String {
        if self.0.starts_with('.') {
            self.0.clone()
        } else {
            format!(".{}", self.0)
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub name: String,
    pub record_type: Option<RecordType>,
}

impl ProbeResult {
    pub fn is_found(&self) -> bool {
        self.record_type.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceStats {
    pub source: String,
    pub raw: usize,
    pub new: usize,
    pub failed: bool,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainReport {
    pub domain: String,
    pub subdomains: Vec<String>,
    pub sources: Vec<SourceStats>,
    pub duration: Duration,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub domains: usize,
    pub total_subdomains: usize,
    pub failed_sources: usize,
    pub duration: Duration,
}

pub struct SourceInfo {
    pub name: String,
    pub description: String,
    pub is_default: bool,
    pub active: bool,
}

#[derive(Debug, Error)]
pub enum SubScoutError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Source error in {source_name}: {message}")]
    SourceError {
        source_name: String,
        message: String,
    },

    #[error("Resolution error: {0}")]
    ResolutionError(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Interrupted")]
    Interrupted,
}

impl SubScoutError {
    pub fn source_failure(source_name: &str, message: impl Into<String>) -> Self {
        SubScoutError::SourceError {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    /// Interrupt is the only condition that must abort a whole run.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, SubScoutError::Interrupted)
    }
}
