// src/bruteforce.rs
use crate::cancel::Cancellation;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::resolver::{DnsLookup, LookupOutcome, Resolver};
use crate::types::{BruteforceConfig, Domain, NoAnswerPolicy, ProbeResult, SubScoutError};
use futures::stream::{self, StreamExt};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use log::{debug, info, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashSet;
use std::num::NonZeroU32;
use std::sync::Arc;
use trust_dns_resolver::proto::rr::RecordType;

/// Record types tried for every candidate, in order.
pub const PROBE_RECORD_TYPES: [RecordType; 6] = [
    RecordType::A,
    RecordType::AAAA,
    RecordType::CNAME,
    RecordType::DNSKEY,
    RecordType::MX,
    RecordType::TXT,
];

pub struct Bruteforcer {
    lookup: Arc<dyn DnsLookup>,
    threads: usize,
    no_answer_policy: NoAnswerPolicy,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    detect_wildcard: bool,
}

impl Bruteforcer {
    pub fn new(lookup: Arc<dyn DnsLookup>, config: &BruteforceConfig) -> Self {
        let limiter = config
            .max_queries_per_second
            .and_then(NonZeroU32::new)
            .map(|qps| Arc::new(RateLimiter::direct(Quota::per_second(qps))));

        Self {
            lookup,
            threads: config.threads.max(1),
            no_answer_policy: config.no_answer_policy,
            limiter,
            detect_wildcard: config.detect_wildcard,
        }
    }

    /// Prober backed by a real DNS resolver.
    pub fn from_config(config: &BruteforceConfig) -> Result<Self, SubScoutError> {
        let resolver = Resolver::new(config)?;
        Ok(Self::new(Arc::new(resolver), config))
    }

    /// Try each record type in turn and stop at the first one that resolves.
    pub async fn probe_name(&self, name: &str) -> ProbeResult {
        for record_type in PROBE_RECORD_TYPES {
            if let Some(limiter) = &self.limiter {
                limiter.until_ready().await;
            }

            let matched = match self.lookup.lookup(name, record_type).await {
                LookupOutcome::Resolved => true,
                LookupOutcome::NoAnswer => self.no_answer_policy == NoAnswerPolicy::Match,
                LookupOutcome::NxDomain => false,
                LookupOutcome::Failed(reason) => {
                    debug!("{} {} lookup failed: {}", name, record_type, reason);
                    false
                }
            };

            if matched {
                return ProbeResult {
                    name: name.to_string(),
                    record_type: Some(record_type),
                };
            }
        }

        ProbeResult {
            name: name.to_string(),
            record_type: None,
        }
    }

    /// Resolve `word.domain` for every word with a bounded number of lookups in flight.
    ///
    /// Lookup errors never escape; cancellation drops all in-flight lookups and
    /// returns `Interrupted`.
    pub async fn probe(
        &self,
        domain: &Domain,
        words: &[String],
        sink: &dyn ProgressSink,
        cancel: &Cancellation,
    ) -> Result<HashSet<String>, SubScoutError> {
        if cancel.is_cancelled() {
            return Err(SubScoutError::Interrupted);
        }

        let base = domain.as_str().trim_start_matches('.');

        if self.detect_wildcard {
            let canary = format!("{}.{}", random_label(), base);
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SubScoutError::Interrupted),
                result = self.probe_name(&canary) => result,
            };
            if result.is_found() {
                warn!("{} resolves random labels, bruteforce hits may be wildcard noise", domain);
                sink.notify(&ProgressEvent::WildcardDetected {
                    domain: domain.to_string(),
                });
            }
        }

        let total = words.len();
        let mut found = HashSet::new();
        let mut checked = 0;

        let names: Vec<String> = words.iter().map(|word| format!("{}.{}", word, base)).collect();
        let mut probes = stream::iter(names)
            .map(|name| async move { self.probe_name(&name).await })
            .buffer_unordered(self.threads);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SubScoutError::Interrupted),
                next = probes.next() => next,
            };
            let Some(result) = next else {
                break;
            };

            checked += 1;
            if let Some(record_type) = result.record_type {
                sink.notify(&ProgressEvent::BruteforceHit {
                    name: result.name.clone(),
                    record_type: record_type.to_string(),
                });
                found.insert(result.name);
            }
            sink.notify(&ProgressEvent::BruteforceProgress {
                checked,
                total,
                found: found.len(),
            });
        }

        info!("Bruteforce of {} resolved {}/{} names", domain, found.len(), total);
        Ok(found)
    }
}

fn random_label() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}
