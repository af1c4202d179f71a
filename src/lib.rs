// src/lib.rs
pub mod bruteforce;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod engine;
pub mod enumerator;
pub mod error;
pub mod normalize;
pub mod output;
pub mod progress;
pub mod resolver;
pub mod session;
pub mod sources;
pub mod types;
pub mod utils;

pub use cancel::Cancellation;
pub use cli::Args;
pub use engine::SubScoutEngine;
pub use enumerator::{EnumerationOutcome, Enumerator, ExecutionMode};
pub use progress::{ProgressEvent, ProgressSink};
pub use sources::{ServiceRegistry, Source};
pub use types::{Config, Domain, DomainReport, SubScoutError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
