use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use std::process;
use std::sync::Arc;
use subscout::progress::{ConsoleSink, JsonLinesSink, NullSink, ProgressSink};
use subscout::sources::{get_all_sources, BruteforceSource};
use subscout::{config, Args, Cancellation, SubScoutEngine, SubScoutError};

const BANNER: &str = r#"
   ____       __   ____                  __
  / __/__ __ / /  / __/____ ___  __ __ / /_
 _\ \ / // // _ \_\ \ / __// _ \/ // // __/
/___/ \_,_//_.__/___/ \__/ \___/\_,_/ \__/

      Multi-source subdomain enumeration
"#;

const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else if args.silent {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if args.list_sources {
        list_sources();
        return Ok(());
    }

    if !args.silent && !args.events {
        eprintln!("{}", BANNER);
    }

    let config = config::resolve_config(&args).context("Invalid configuration")?;

    let domains = args.collect_domains().context("Invalid input")?;
    if domains.is_empty() {
        error!("No input provided. Pass domains as arguments, use -l <file>, or pipe domains to stdin");
        process::exit(1);
    }

    let sink: Arc<dyn ProgressSink> = if config.output.events {
        Arc::new(JsonLinesSink)
    } else if config.output.silent {
        Arc::new(NullSink)
    } else {
        Arc::new(ConsoleSink::new())
    };

    let cancel = Cancellation::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let engine = SubScoutEngine::new(config, sink, cancel)?;

    match engine.run(&domains).await {
        Ok(stats) => {
            if !engine.config().output.silent && !engine.config().output.events {
                println!(
                    "\n[*] Done: {} subdomains across {} domains in {:.2}s",
                    stats.total_subdomains,
                    stats.domains,
                    stats.duration.as_secs_f64()
                );
            }
            info!("{} source failures", stats.failed_sources);
            Ok(())
        }
        Err(SubScoutError::Interrupted) => {
            eprintln!("\n[-] Interrupted");
            process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => Err(anyhow::anyhow!("Enumeration failed: {}", e)),
    }
}

fn list_sources() {
    println!("Available sources:\n");

    let passive: Vec<String> = get_all_sources()
        .iter()
        .map(|source| {
            let info = source.info();
            let marker = if info.is_default { " *" } else { "" };
            format!("{:<14}{}{}", info.name, info.description, marker)
        })
        .collect();

    println!("Passive sources ({})", passive.len());
    for line in passive {
        println!("  {}", line);
    }

    let bruteforce = BruteforceSource::describe();
    println!("\nActive sources (1)");
    println!("  {:<14}{}", bruteforce.name, bruteforce.description);

    println!("\n* = Enabled by default");
    println!("\nBruteforce is enabled with -b or by listing it in --sources.");
}
