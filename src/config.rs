use crate::cli::Args;
use crate::sources::is_known_source;
use crate::types::{Config, NoAnswerPolicy, OutputFormat, SubScoutError};
use log::debug;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn load_config(config_path: &Path) -> Result<Config, SubScoutError> {
    let mut config = Config::default();

    if config_path.exists() {
        let contents = fs::read_to_string(config_path)
            .map_err(|e| SubScoutError::ConfigError(format!("Failed to read config file: {}", e)))?;
        apply_toml(&mut config, &contents)?;
        debug!("Loaded configuration from {}", config_path.display());
    } else {
        debug!("Config file {} not found, using defaults", config_path.display());
    }

    Ok(config)
}

fn apply_toml(config: &mut Config, contents: &str) -> Result<(), SubScoutError> {
    let toml_config: toml::Value = toml::from_str(contents)
        .map_err(|e| SubScoutError::ConfigError(format!("Failed to parse config file: {}", e)))?;

    let Some(table) = toml_config.as_table() else {
        return Ok(());
    };

    if let Some(secs) = table.get("timeout").and_then(|v| v.as_integer()) {
        config.timeout = Duration::from_secs(non_negative("timeout", secs)?);
    }
    if let Some(user_agent) = table.get("user_agent").and_then(|v| v.as_str()) {
        config.user_agent = user_agent.to_string();
    }
    if let Some(proxy) = table.get("proxy").and_then(|v| v.as_str()) {
        config.proxy = Some(proxy.to_string());
    }
    if let Some(sources) = table.get("sources").and_then(|v| v.as_array()) {
        config.sources = string_list(sources);
    }
    if let Some(parallel) = table.get("parallel").and_then(|v| v.as_bool()) {
        config.parallel = parallel;
    }

    if let Some(bruteforce) = table.get("bruteforce").and_then(|v| v.as_table()) {
        let bf = &mut config.bruteforce;
        if let Some(enabled) = bruteforce.get("enabled").and_then(|v| v.as_bool()) {
            bf.enabled = enabled;
        }
        if let Some(wordlist) = bruteforce.get("wordlist").and_then(|v| v.as_str()) {
            bf.wordlist = Some(PathBuf::from(wordlist));
        }
        if let Some(threads) = bruteforce.get("threads").and_then(|v| v.as_integer()) {
            bf.threads = non_negative("bruteforce.threads", threads)? as usize;
        }
        if let Some(ms) = bruteforce.get("timeout_ms").and_then(|v| v.as_integer()) {
            bf.timeout = Duration::from_millis(non_negative("bruteforce.timeout_ms", ms)?);
        }
        if let Some(nameservers) = bruteforce.get("nameservers").and_then(|v| v.as_array()) {
            bf.nameservers = string_list(nameservers);
        }
        if let Some(system) = bruteforce.get("use_system_resolver").and_then(|v| v.as_bool()) {
            bf.use_system_resolver = system;
        }
        if let Some(matches) = bruteforce.get("treat_no_answer_as_match").and_then(|v| v.as_bool()) {
            bf.no_answer_policy = if matches {
                NoAnswerPolicy::Match
            } else {
                NoAnswerPolicy::Unresolved
            };
        }
        if let Some(qps) = bruteforce.get("max_queries_per_second").and_then(|v| v.as_integer()) {
            let qps = u32::try_from(qps).map_err(|_| {
                SubScoutError::ConfigError(format!(
                    "bruteforce.max_queries_per_second must be between 0 and {}",
                    u32::MAX
                ))
            })?;
            bf.max_queries_per_second = Some(qps);
        }
        if let Some(detect) = bruteforce.get("detect_wildcard").and_then(|v| v.as_bool()) {
            bf.detect_wildcard = detect;
        }
    }

    Ok(())
}

fn non_negative(key: &str, value: i64) -> Result<u64, SubScoutError> {
    u64::try_from(value)
        .map_err(|_| SubScoutError::ConfigError(format!("{} must not be negative", key)))
}

fn string_list(values: &[toml::Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn apply_env_overrides(config: &mut Config) -> Result<(), SubScoutError> {
    if let Ok(sources) = env::var("SUBSCOUT_SOURCES") {
        config.sources = split_list(&sources);
    }
    if let Ok(wordlist) = env::var("SUBSCOUT_WORDLIST") {
        config.bruteforce.wordlist = Some(PathBuf::from(wordlist));
    }
    if let Ok(proxy) = env::var("SUBSCOUT_PROXY") {
        config.proxy = Some(proxy);
    }
    Ok(())
}

fn apply_args(config: &mut Config, args: &Args) {
    if let Some(sources) = &args.sources {
        config.sources = sources
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if config.sources.iter().any(|s| s.eq_ignore_ascii_case(crate::sources::BRUTEFORCE)) {
        config.bruteforce.enabled = true;
    }
    if args.bruteforce {
        config.bruteforce.enabled = true;
    }
    if let Some(wordlist) = &args.wordlist {
        config.bruteforce.wordlist = Some(wordlist.clone());
    }
    if let Some(threads) = args.threads {
        config.bruteforce.threads = threads;
    }
    if args.no_answer_is_match {
        config.bruteforce.no_answer_policy = NoAnswerPolicy::Match;
    }
    if let Some(secs) = args.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if args.parallel {
        config.parallel = true;
    }
    if let Some(dir) = &args.output_dir {
        config.output.directory = Some(dir.clone());
    }
    if args.json {
        config.output.format = OutputFormat::Json;
    }
    config.output.include_domain |= args.include_domain;
    config.output.silent |= args.silent;
    config.output.events |= args.events;
}

pub fn validate_config(config: &Config) -> Result<(), SubScoutError> {
    if config.timeout.is_zero() {
        return Err(SubScoutError::ConfigError("Timeout must be greater than 0".to_string()));
    }
    if config.bruteforce.threads == 0 {
        return Err(SubScoutError::ConfigError("Bruteforce threads must be greater than 0".to_string()));
    }
    if config.bruteforce.timeout.is_zero() {
        return Err(SubScoutError::ConfigError("Bruteforce timeout must be greater than 0".to_string()));
    }
    if let Some(unknown) = config.sources.iter().find(|name| !is_known_source(name)) {
        return Err(SubScoutError::ConfigError(format!("Unknown source: {}", unknown)));
    }
    Ok(())
}

/// Layer the configuration: file, then environment, then command line.
pub fn resolve_config(args: &Args) -> Result<Config, SubScoutError> {
    let mut config = match &args.config_path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config)?;
    apply_args(&mut config, args);
    validate_config(&config)?;

    Ok(config)
}
