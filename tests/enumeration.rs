use async_trait::async_trait;
use mockito::Matcher;
use std::sync::Mutex;
use subscout::progress::ProgressEvent;
use subscout::session::Session;
use subscout::sources::{CrtShSource, FetchContext, UrlScanSource};
use subscout::types::SourceInfo;
use subscout::{
    Cancellation, Config, Domain, Enumerator, ExecutionMode, ProgressSink, ServiceRegistry, Source,
    SubScoutError,
};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<ProgressEvent>>,
}

impl Recorder {
    fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for Recorder {
    fn notify(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

struct Listed(&'static str, Vec<&'static str>);

#[async_trait]
impl Source for Listed {
    fn name(&self) -> &str {
        self.0
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.0.to_string(),
            description: String::new(),
            is_default: false,
            active: false,
        }
    }

    async fn fetch(&self, _domain: &Domain, _ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError> {
        Ok(self.1.iter().map(|s| s.to_string()).collect())
    }
}

fn enumerator(mode: ExecutionMode) -> Enumerator {
    Enumerator::new(Session::new(&Config::default()).unwrap(), mode, Cancellation::new())
}

#[tokio::test]
async fn url_root_and_wildcard_results_merge_past_a_failing_source() {
    let mut server = mockito::Server::new_async().await;
    let _search = server
        .mock("GET", "/api/v1/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"results":[
                {"page":{"url":"http://foo.example.com/x"}},
                {"page":{"url":"example.com"}},
                {"page":{"url":"*.bar.example.com"}}
            ]}"#,
        )
        .create_async()
        .await;
    let _broken = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
        let registry = ServiceRegistry::new()
            .with_source(Box::new(UrlScanSource::new().with_base_url(server.url())))
            .with_source(Box::new(CrtShSource::new().with_base_url(server.url())));
        let sink = Recorder::default();

        let outcome = enumerator(mode)
            .enumerate(&Domain::parse("example.com").unwrap(), &registry, &sink)
            .await
            .unwrap();

        let names: Vec<&str> = outcome.subdomains.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["bar.example.com", "foo.example.com"]);

        let failures: Vec<ProgressEvent> = sink
            .events()
            .into_iter()
            .filter(|event| matches!(event, ProgressEvent::SourceFailed { .. }))
            .collect();
        assert_eq!(failures.len(), 1);
        assert!(matches!(&failures[0], ProgressEvent::SourceFailed { source, .. } if source == "crtsh"));
    }
}

#[tokio::test]
async fn new_counts_add_up_to_the_final_set() {
    let registry = ServiceRegistry::new()
        .with_source(Box::new(Listed("one", vec!["a.example.com", "B.example.com"])))
        .with_source(Box::new(Listed("two", vec!["https://a.example.com/", "c.example.com:8443"])))
        .with_source(Box::new(Listed("three", vec!["other.org", "example.com"])));
    let sink = Recorder::default();

    let outcome = enumerator(ExecutionMode::Sequential)
        .enumerate(&Domain::parse("example.com").unwrap(), &registry, &sink)
        .await
        .unwrap();

    let reported_new: usize = sink
        .events()
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::SourceFinished { new, .. } => Some(*new),
            _ => None,
        })
        .sum();
    assert_eq!(reported_new, outcome.subdomains.len());
    assert_eq!(outcome.subdomains.len(), 3);
    assert!(outcome
        .subdomains
        .iter()
        .all(|name| name.ends_with(".example.com") && name != "example.com"));
}

#[tokio::test]
async fn cancelled_run_yields_no_result() {
    let registry = ServiceRegistry::new().with_source(Box::new(Listed("one", vec!["a.example.com"])));
    let cancel = Cancellation::new();
    cancel.cancel();
    let enumerator = Enumerator::new(
        Session::new(&Config::default()).unwrap(),
        ExecutionMode::Sequential,
        cancel,
    );

    let sink = Recorder::default();

    let result = enumerator
        .enumerate(&Domain::parse("example.com").unwrap(), &registry, &sink)
        .await;
    assert!(matches!(result, Err(SubScoutError::Interrupted)));
    assert!(!sink
        .events()
        .iter()
        .any(|event| matches!(event, ProgressEvent::Result { .. })));
}
