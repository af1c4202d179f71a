use crate::error::ErrorContext;
use crate::types::Domain;
use crate::utils;
use clap::Parser;
use log::error;
use std::io::{self, BufRead};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    " ",
    env!("BUILD_TIME"),
    ")"
);

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "subscout",
    version,
    long_version = LONG_VERSION,
    about = "Multi-source subdomain enumeration",
    long_about = "SubScout collects subdomains of a target from public passive sources\n(certificate logs, passive DNS, web archives) and can optionally bruteforce\nnames from a wordlist against DNS."
)]
pub struct Args {
    /// Target domain(s) to enumerate
    #[arg(value_name = "DOMAIN")]
    pub domains: Vec<String>,

    /// File containing list of domains
    #[arg(short = 'l', long = "list", value_name = "FILE")]
    pub domains_file: Option<PathBuf>,

    /// Directory to write one result file per domain into (must be empty)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also bruteforce subdomains over DNS
    #[arg(short = 'b', long = "bruteforce")]
    pub bruteforce: bool,

    /// Wordlist for bruteforcing (defaults to the built-in list)
    #[arg(short = 'w', long = "wordlist", value_name = "FILE")]
    pub wordlist: Option<PathBuf>,

    /// Add the target domain itself to the results
    #[arg(long = "include-domain")]
    pub include_domain: bool,

    /// Specific sources to use (comma-separated)
    #[arg(short = 's', long = "sources", value_delimiter = ',')]
    pub sources: Option<Vec<String>>,

    /// Query all sources at the same time
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Concurrent DNS lookups while bruteforcing
    #[arg(short = 't', long = "threads")]
    pub threads: Option<usize>,

    /// Count names that exist without records of the probed type as found
    #[arg(long = "no-answer-is-match")]
    pub no_answer_is_match: bool,

    /// HTTP timeout in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Output in JSON format
    #[arg(long = "json")]
    pub json: bool,

    /// Emit progress as JSON lines instead of text
    #[arg(long = "events")]
    pub events: bool,

    /// Silent mode (only output subdomains)
    #[arg(long = "silent")]
    pub silent: bool,

    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// List all available sources
    #[arg(long = "list-sources")]
    pub list_sources: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<PathBuf>,
}

impl Args {
    /// Check if we should read from stdin
    pub fn use_stdin(&self) -> bool {
        !atty::is(atty::Stream::Stdin)
    }

    /// Targets from the arguments, the `-l` file and piped stdin, in that order.
    ///
    /// An unreadable list file is an error. Invalid names are logged and skipped.
    pub fn collect_domains(&self) -> crate::error::Result<Vec<Domain>> {
        if self.use_stdin() {
            self.collect_domains_from(Some(io::stdin().lock()))
        } else {
            self.collect_domains_from(None::<io::Empty>)
        }
    }

    fn collect_domains_from<R: BufRead>(&self, stdin: Option<R>) -> crate::error::Result<Vec<Domain>> {
        let mut raw = self.domains.clone();

        if let Some(file_path) = &self.domains_file {
            let lines = utils::read_lines(file_path)
                .with_context(|| format!("Failed to read domains from {}", file_path.display()))?;
            raw.extend(lines);
        }

        if let Some(stdin) = stdin {
            raw.extend(stdin.lines().map_while(|line| line.ok()));
        }

        let mut domains: Vec<Domain> = Vec::new();
        for candidate in raw.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            match Domain::parse(candidate) {
                Ok(domain) if !domains.contains(&domain) => domains.push(domain),
                Ok(_) => {}
                Err(e) => error!("{}", e),
            }
        }
        Ok(domains)
    }
}
