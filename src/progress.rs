// src/progress.rs
use indicatif::{ProgressBar, ProgressStyle};
use log::error;
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

/// Everything the enumeration core reports while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    DomainStarted { domain: String },
    SourceStarted { source: String },
    SourceFinished { source: String, found: usize, new: usize },
    SourceFailed { source: String, reason: String },
    BruteforceProgress { checked: usize, total: usize, found: usize },
    BruteforceHit { name: String, record_type: String },
    WildcardDetected { domain: String },
    Result { domain: String, subdomains: Vec<String> },
    Aborted { domain: String, reason: String },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::DomainStarted { domain } => {
                write!(f, "[*] Searching for subdomains of '{}'", domain)
            }
            ProgressEvent::SourceStarted { source } => write!(f, "  [*] Searching '{}'", source),
            ProgressEvent::SourceFinished { new, .. } => {
                write!(f, "  [*] Found {} new subdomains", new)
            }
            ProgressEvent::SourceFailed { source, .. } => {
                write!(f, "  [-] Failed to search '{}'", source)
            }
            ProgressEvent::BruteforceProgress { checked, total, found } => {
                write!(f, "  [*] Bruteforce: checked {}/{}, found {}", checked, total, found)
            }
            ProgressEvent::BruteforceHit { name, record_type } => {
                write!(f, "  [+] {} ({})", name, record_type)
            }
            ProgressEvent::WildcardDetected { domain } => write!(
                f,
                "  [!] '{}' answers for random labels, bruteforce hits may be wildcard noise",
                domain
            ),
            ProgressEvent::Result { domain, subdomains } => {
                write!(f, "[*] Found {} subdomains for {}", subdomains.len(), domain)
            }
            ProgressEvent::Aborted { domain, reason } => {
                write!(f, "[-] Enumeration of '{}' aborted: {}", domain, reason)
            }
        }
    }
}

/// Receiver of progress events. Calls must return promptly.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: &ProgressEvent);
}

/// Discards everything.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn notify(&self, _event: &ProgressEvent) {}
}

/// Human-readable progress on stdout; bruteforce liveness is drawn as a bar.
#[derive(Default)]
pub struct ConsoleSink {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn bruteforce_bar(&self, checked: usize, total: usize, found: usize) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };

        let bar = slot.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "  [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        });
        bar.set_position(checked as u64);
        bar.set_message(format!("found {}", found));

        if checked >= total {
            bar.finish_and_clear();
            *slot = None;
        }
    }

    fn print(&self, line: String) {
        match self.bar.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(bar) => bar.println(line),
                None => println!("{}", line),
            },
            Err(_) => println!("{}", line),
        }
    }
}

impl ProgressSink for ConsoleSink {
    fn notify(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::BruteforceProgress { checked, total, found } => {
                self.bruteforce_bar(*checked, *total, *found)
            }
            // The final listing is the output manager's job.
            ProgressEvent::Result { .. } => {}
            other => self.print(other.to_string()),
        }
    }
}

/// One JSON object per line on stdout, for consumers that forward events.
pub struct JsonLinesSink;

impl ProgressSink for JsonLinesSink {
    fn notify(&self, event: &ProgressEvent) {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to serialize progress event: {}", e),
        }
    }
}

/// Forwards events into an unbounded channel; never blocks the sender.
pub struct ChannelSink {
    tx: UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn notify(&self, event: &ProgressEvent) {
        // A gone listener must not stop the run.
        let _ = self.tx.send(event.clone());
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<ProgressEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressSink for RecordingSink {
        fn notify(&self, event: &ProgressEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }
}
