// src/enumerator.rs
use crate::cancel::Cancellation;
use crate::normalize::clean;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::session::Session;
use crate::sources::{FetchContext, ServiceRegistry};
use crate::types::{Domain, SourceStats, SubScoutError};
use futures::stream::{FuturesUnordered, StreamExt};
use log::{info, warn};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// One source at a time, in registry order.
    #[default]
    Sequential,
    /// All sources in flight at once, merged as they finish.
    Parallel,
}

#[derive(Debug, Clone, Default)]
pub struct EnumerationOutcome {
    pub subdomains: BTreeSet<String>,
    pub sources: Vec<SourceStats>,
}

pub struct Enumerator {
    session: Session,
    mode: ExecutionMode,
    cancel: Cancellation,
}

impl Enumerator {
    pub fn new(session: Session, mode: ExecutionMode, cancel: Cancellation) -> Self {
        Self { session, mode, cancel }
    }

    /// Query every source in `registry` for `domain` and merge what they find.
    ///
    /// Failing sources are reported and skipped. The only error is `Interrupted`.
    pub async fn enumerate(
        &self,
        domain: &Domain,
        registry: &ServiceRegistry,
        sink: &dyn ProgressSink,
    ) -> Result<EnumerationOutcome, SubScoutError> {
        let ctx = FetchContext::new(&self.session, sink, &self.cancel);
        let mut merger = Merger::new(domain, sink);

        match self.mode {
            ExecutionMode::Sequential => {
                for source in registry.iter() {
                    if self.cancel.is_cancelled() {
                        return Err(SubScoutError::Interrupted);
                    }

                    sink.notify(&ProgressEvent::SourceStarted {
                        source: source.name().to_string(),
                    });
                    let start = Instant::now();
                    let result = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Err(SubScoutError::Interrupted),
                        result = source.fetch(domain, &ctx) => result,
                    };
                    merger.merge(source.name(), result, start.elapsed())?;
                }
            }
            ExecutionMode::Parallel => {
                let mut pending = FuturesUnordered::new();
                for source in registry.iter() {
                    sink.notify(&ProgressEvent::SourceStarted {
                        source: source.name().to_string(),
                    });
                    let ctx = &ctx;
                    pending.push(async move {
                        let start = Instant::now();
                        let result = source.fetch(domain, ctx).await;
                        (source.name(), result, start.elapsed())
                    });
                }

                loop {
                    let next = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Err(SubScoutError::Interrupted),
                        next = pending.next() => next,
                    };
                    match next {
                        Some((name, result, duration)) => merger.merge(name, result, duration)?,
                        None => break,
                    }
                }
            }
        }

        Ok(merger.finish())
    }
}

/// The single point where source results enter the running set.
struct Merger<'a> {
    domain: &'a Domain,
    sink: &'a dyn ProgressSink,
    outcome: EnumerationOutcome,
}

impl<'a> Merger<'a> {
    fn new(domain: &'a Domain, sink: &'a dyn ProgressSink) -> Self {
        Self {
            domain,
            sink,
            outcome: EnumerationOutcome::default(),
        }
    }

    fn merge(
        &mut self,
        source: &str,
        result: Result<Vec<String>, SubScoutError>,
        duration: Duration,
    ) -> Result<(), SubScoutError> {
        match result {
            Ok(raw) => {
                let cleaned = clean(&raw, self.domain);
                let found = cleaned.len();
                let before = self.outcome.subdomains.len();
                self.outcome.subdomains.extend(cleaned);
                let new = self.outcome.subdomains.len() - before;

                info!(
                    "{}: Found {} subdomains ({} new) for {} in {:?}",
                    source, found, new, self.domain, duration
                );
                self.sink.notify(&ProgressEvent::SourceFinished {
                    source: source.to_string(),
                    found,
                    new,
                });
                self.outcome.sources.push(SourceStats {
                    source: source.to_string(),
                    raw: raw.len(),
                    new,
                    failed: false,
                    duration,
                });
            }
            Err(e) if e.is_interrupt() => return Err(e),
            Err(e) => {
                warn!("{}: Failed to enumerate {}: {}", source, self.domain, e);
                self.sink.notify(&ProgressEvent::SourceFailed {
                    source: source.to_string(),
                    reason: e.to_string(),
                });
                self.outcome.sources.push(SourceStats {
                    source: source.to_string(),
                    raw: 0,
                    new: 0,
                    failed: true,
                    duration,
                });
            }
        }

        Ok(())
    }

    fn finish(self) -> EnumerationOutcome {
        self.outcome
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::sources::{FetchContext, Source};
    use crate::types::{Domain, SourceInfo, SubScoutError};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Source with a canned answer.
    pub struct StaticSource {
        name: String,
        answer: Result<Vec<String>, String>,
        delay: Duration,
    }

    impl StaticSource {
        pub fn ok(name: &str, names: &[&str]) -> Self {
            Self {
                name: name.to_string(),
                answer: Ok(names.iter().map(|s| s.to_string()).collect()),
                delay: Duration::ZERO,
            }
        }

        pub fn failing(name: &str, reason: &str) -> Self {
            Self {
                name: name.to_string(),
                answer: Err(reason.to_string()),
                delay: Duration::ZERO,
            }
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl Source for StaticSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn info(&self) -> SourceInfo {
            SourceInfo {
                name: self.name.clone(),
                description: "canned".to_string(),
                is_default: false,
                active: false,
            }
        }

        async fn fetch(&self, _domain: &Domain, _ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer
                .clone()
                .map_err(|reason| SubScoutError::source_failure(&self.name, reason))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StaticSource;
    use super::*;
    use crate::progress::testing::RecordingSink;
    use crate::types::Config;

    fn enumerator(mode: ExecutionMode, cancel: Cancellation) -> Enumerator {
        Enumerator::new(Session::new(&Config::default()).unwrap(), mode, cancel)
    }

    fn domain() -> Domain {
        Domain::parse("example.com").unwrap()
    }

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn test_mixed_sources_scenario() {
        let registry = ServiceRegistry::new()
            .with_source(Box::new(StaticSource::ok(
                "a",
                &["http://foo.example.com/x", "example.com", "*.bar.example.com"],
            )))
            .with_source(Box::new(StaticSource::failing("b", "Unexpected status code 500")));
        let sink = RecordingSink::default();

        let outcome = enumerator(ExecutionMode::Sequential, Cancellation::new())
            .enumerate(&domain(), &registry, &sink)
            .await
            .unwrap();

        assert_eq!(names(&outcome.subdomains), vec!["bar.example.com", "foo.example.com"]);

        let failures: Vec<ProgressEvent> = sink
            .events()
            .into_iter()
            .filter(|event| matches!(event, ProgressEvent::SourceFailed { .. }))
            .collect();
        assert_eq!(failures.len(), 1);
        assert!(matches!(&failures[0], ProgressEvent::SourceFailed { source, .. } if source == "b"));
        assert!(outcome.sources[1].failed);
    }

    #[tokio::test]
    async fn test_all_sources_failing_yields_empty_set() {
        let registry = ServiceRegistry::new()
            .with_source(Box::new(StaticSource::failing("a", "timeout")))
            .with_source(Box::new(StaticSource::failing("b", "bad json")))
            .with_source(Box::new(StaticSource::failing("c", "status 403")));

        let outcome = enumerator(ExecutionMode::Sequential, Cancellation::new())
            .enumerate(&domain(), &registry, &RecordingSink::default())
            .await
            .unwrap();

        assert!(outcome.subdomains.is_empty());
        assert!(outcome.sources.iter().all(|stats| stats.failed));
    }

    #[tokio::test]
    async fn test_single_working_source_is_the_result() {
        let registry = ServiceRegistry::new()
            .with_source(Box::new(StaticSource::failing("a", "down")))
            .with_source(Box::new(StaticSource::ok("b", &["a.example.com", "b.example.com"])))
            .with_source(Box::new(StaticSource::failing("c", "down")));

        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let outcome = enumerator(mode, Cancellation::new())
                .enumerate(&domain(), &registry, &RecordingSink::default())
                .await
                .unwrap();
            assert_eq!(names(&outcome.subdomains), vec!["a.example.com", "b.example.com"]);
        }
    }

    #[tokio::test]
    async fn test_duplicates_count_as_new_once() {
        let registry = ServiceRegistry::new()
            .with_source(Box::new(StaticSource::ok("first", &["a.example.com", "x.example.com"])))
            .with_source(Box::new(StaticSource::ok("second", &["a.example.com"])));
        let sink = RecordingSink::default();

        let outcome = enumerator(ExecutionMode::Sequential, Cancellation::new())
            .enumerate(&domain(), &registry, &sink)
            .await
            .unwrap();

        let deltas: Vec<usize> = sink
            .events()
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::SourceFinished { new, .. } => Some(*new),
                _ => None,
            })
            .collect();
        assert_eq!(deltas, vec![2, 0]);
        assert_eq!(outcome.sources.iter().map(|s| s.new).sum::<usize>(), outcome.subdomains.len());
    }

    #[tokio::test]
    async fn test_parallel_mode_counts_each_name_once() {
        let registry = ServiceRegistry::new()
            .with_source(Box::new(
                StaticSource::ok("slow", &["a.example.com", "b.example.com"])
                    .delayed(Duration::from_millis(30)),
            ))
            .with_source(Box::new(StaticSource::ok("fast", &["a.example.com"])));
        let sink = RecordingSink::default();

        let outcome = enumerator(ExecutionMode::Parallel, Cancellation::new())
            .enumerate(&domain(), &registry, &sink)
            .await
            .unwrap();

        assert_eq!(outcome.subdomains.len(), 2);
        let total_new: usize = outcome.sources.iter().map(|s| s.new).sum();
        assert_eq!(total_new, 2);
        // The fast source lands first.
        assert_eq!(outcome.sources[0].source, "fast");
        assert_eq!(outcome.sources[0].new, 1);
    }

    #[tokio::test]
    async fn test_interrupt_aborts_the_run() {
        let registry = ServiceRegistry::new()
            .with_source(Box::new(StaticSource::ok("quick", &["a.example.com"])))
            .with_source(Box::new(
                StaticSource::ok("stuck", &["b.example.com"]).delayed(Duration::from_secs(30)),
            ))
            .with_source(Box::new(StaticSource::ok("never", &["c.example.com"])));
        let sink = RecordingSink::default();
        let cancel = Cancellation::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            enumerator(ExecutionMode::Sequential, cancel).enumerate(&domain(), &registry, &sink),
        )
        .await
        .expect("interrupt must not wait for the stuck source");

        assert!(matches!(result, Err(SubScoutError::Interrupted)));
        let started: Vec<ProgressEvent> = sink
            .events()
            .into_iter()
            .filter(|event| matches!(event, ProgressEvent::SourceStarted { .. }))
            .collect();
        assert_eq!(started.len(), 2, "no source may start after the interrupt");
    }

    #[tokio::test]
    async fn test_interrupt_in_parallel_mode() {
        let registry = ServiceRegistry::new().with_source(Box::new(
            StaticSource::ok("stuck", &["b.example.com"]).delayed(Duration::from_secs(30)),
        ));
        let cancel = Cancellation::new();
        cancel.cancel();

        let result = enumerator(ExecutionMode::Parallel, cancel)
            .enumerate(&domain(), &registry, &RecordingSink::default())
            .await;
        assert!(matches!(result, Err(SubScoutError::Interrupted)));
    }
}
