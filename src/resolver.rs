// src/resolver.rs
use crate::types::{BruteforceConfig, SubScoutError};
use async_trait::async_trait;
use log::debug;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use trust_dns_resolver::config::{
    NameServerConfig, Protocol, ResolverConfig as DnsResolverConfig, ResolverOpts,
};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::proto::rr::RecordType;
use trust_dns_resolver::TokioAsyncResolver;

/// Result of asking for one record type of one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Resolved,
    /// The name does not exist.
    NxDomain,
    /// The name exists but publishes no record of this type.
    NoAnswer,
    /// Timeout, SERVFAIL, refused, transport error...
    Failed(String),
}

#[async_trait]
pub trait DnsLookup: Send + Sync {
    async fn lookup(&self, name: &str, record_type: RecordType) -> LookupOutcome;
}

pub struct Resolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl Resolver {
    pub fn new(config: &BruteforceConfig) -> Result<Self, SubScoutError> {
        let mut opts = ResolverOpts::default();
        opts.timeout = config.timeout;
        opts.attempts = 1;

        let resolver = if config.use_system_resolver {
            let (system_config, mut system_opts) = trust_dns_resolver::system_conf::read_system_conf()
                .map_err(|e| SubScoutError::ResolutionError(format!("Failed to read system resolver configuration: {}", e)))?;
            system_opts.timeout = opts.timeout;
            system_opts.attempts = opts.attempts;
            TokioAsyncResolver::tokio(system_config, system_opts)
        } else {
            let mut resolver_config = DnsResolverConfig::new();

            for ns in &config.nameservers {
                let socket_addr = SocketAddr::from_str(ns)
                    .map_err(|e| SubScoutError::ConfigError(format!("Invalid nameserver address {}: {}", ns, e)))?;
                resolver_config.add_name_server(NameServerConfig {
                    socket_addr,
                    protocol: Protocol::Udp,
                    tls_dns_name: None,
                    trust_negative_responses: true,
                    bind_addr: None,
                });
            }

            TokioAsyncResolver::tokio(resolver_config, opts)
        };

        Ok(Self {
            resolver,
            timeout: config.timeout,
        })
    }
}

fn classify(err: &ResolveError) -> LookupOutcome {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::NXDomain => LookupOutcome::NxDomain,
            ResponseCode::NoError => LookupOutcome::NoAnswer,
            other => LookupOutcome::Failed(format!("{:?}", other)),
        },
        _ => LookupOutcome::Failed(err.to_string()),
    }
}

#[async_trait]
impl DnsLookup for Resolver {
    async fn lookup(&self, name: &str, record_type: RecordType) -> LookupOutcome {
        // Fully qualified so search domains never get appended.
        let fqdn = format!("{}.", name.trim_end_matches('.'));

        match tokio::time::timeout(self.timeout, self.resolver.lookup(fqdn.as_str(), record_type)).await {
            Ok(Ok(_)) => LookupOutcome::Resolved,
            Ok(Err(e)) => {
                let outcome = classify(&e);
                debug!("{} {}: {:?}", name, record_type, outcome);
                outcome
            }
            Err(_) => LookupOutcome::Failed("timed out".to_string()),
        }
    }
}
