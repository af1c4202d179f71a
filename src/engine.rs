use crate::bruteforce::Bruteforcer;
use crate::cancel::Cancellation;
use crate::enumerator::{EnumerationOutcome, Enumerator, ExecutionMode};
use crate::output::OutputManager;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::session::Session;
use crate::sources::{BruteforceSource, ServiceRegistry};
use crate::types::{BatchStats, Config, Domain, DomainReport, SubScoutError};
use crate::utils::load_wordlist;
use log::{error, info};
use std::sync::Arc;
use std::time::Instant;

type RegistryFactory = Box<dyn Fn() -> Result<ServiceRegistry, SubScoutError> + Send + Sync>;

pub struct SubScoutEngine {
    config: Config,
    enumerator: Enumerator,
    output_manager: OutputManager,
    sink: Arc<dyn ProgressSink>,
    registry_factory: RegistryFactory,
}

impl SubScoutEngine {
    pub fn new(
        config: Config,
        sink: Arc<dyn ProgressSink>,
        cancel: Cancellation,
    ) -> Result<Self, SubScoutError> {
        let session = Session::new(&config)?;

        // Wordlist and resolver are shared by every domain of the batch.
        let bruteforce = if config.bruteforce.enabled {
            let wordlist = Arc::new(load_wordlist(config.bruteforce.wordlist.as_deref())?);
            if wordlist.is_empty() {
                return Err(SubScoutError::ConfigError("Bruteforce wordlist is empty".to_string()));
            }
            info!("Loaded {} bruteforce words", wordlist.len());
            let prober = Arc::new(Bruteforcer::from_config(&config.bruteforce)?);
            Some((prober, wordlist))
        } else {
            None
        };

        let factory_config = config.clone();
        let registry_factory: RegistryFactory = Box::new(move || {
            let bruteforce = bruteforce
                .as_ref()
                .map(|(prober, wordlist)| BruteforceSource::new(prober.clone(), wordlist.clone()));
            ServiceRegistry::from_config(&factory_config, bruteforce)
        });

        // Fail on unknown sources before any output is touched.
        if registry_factory()?.is_empty() {
            return Err(SubScoutError::ConfigError("No valid sources configured".to_string()));
        }

        let output_manager = OutputManager::new(config.output.clone());
        output_manager.prepare()?;

        let mode = if config.parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Sequential
        };

        Ok(Self {
            enumerator: Enumerator::new(session, mode, cancel),
            config,
            output_manager,
            sink,
            registry_factory,
        })
    }

    /// Replace how the per-domain registry is built.
    pub fn with_registry_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<ServiceRegistry, SubScoutError> + Send + Sync + 'static,
    {
        self.registry_factory = Box::new(factory);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Enumerate and report every domain in turn. Stops at the first interrupt.
    pub async fn run(&self, domains: &[Domain]) -> Result<BatchStats, SubScoutError> {
        if domains.is_empty() {
            return Err(SubScoutError::ConfigError("No domains provided".to_string()));
        }

        info!("Starting enumeration for {} domains", domains.len());
        let start_time = Instant::now();
        let mut stats = BatchStats::default();

        for domain in domains {
            let report = self.enumerate_domain(domain).await?;

            stats.domains += 1;
            stats.total_subdomains += report.subdomains.len();
            stats.failed_sources += report.sources.iter().filter(|s| s.failed).count();

            self.output_manager.write_report(&report).map_err(|e| {
                error!("Failed to write results for {}: {}", domain, e);
                e
            })?;

            info!(
                "Completed enumeration for {}: found {} unique subdomains",
                domain,
                report.subdomains.len()
            );
        }

        stats.duration = start_time.elapsed();
        Ok(stats)
    }

    pub async fn enumerate_domain(&self, domain: &Domain) -> Result<DomainReport, SubScoutError> {
        info!("Enumerating subdomains for: {}", domain);
        let start_time = Instant::now();
        self.sink.notify(&ProgressEvent::DomainStarted {
            domain: domain.to_string(),
        });

        let outcome = match self.enumerate_domain_internal(domain).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.sink.notify(&ProgressEvent::Aborted {
                    domain: domain.to_string(),
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        let EnumerationOutcome {
            mut subdomains,
            sources,
        } = outcome;
        if self.config.output.include_domain {
            subdomains.insert(domain.as_str().trim_start_matches('.').to_string());
        }
        let subdomains: Vec<String> = subdomains.into_iter().collect();

        self.sink.notify(&ProgressEvent::Result {
            domain: domain.to_string(),
            subdomains: subdomains.clone(),
        });

        Ok(DomainReport {
            domain: domain.to_string(),
            subdomains,
            sources,
            duration: start_time.elapsed(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    async fn enumerate_domain_internal(&self, domain: &Domain) -> Result<EnumerationOutcome, SubScoutError> {
        // Fresh registry per domain; nothing carries over between runs.
        let registry = (self.registry_factory)()?;
        self.enumerator
            .enumerate(domain, &registry, self.sink.as_ref())
            .await
    }
}
