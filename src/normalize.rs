// src/normalize.rs
use crate::types::Domain;
use std::collections::HashSet;

/// Reduce a URL-shaped candidate to its bare host.
///
/// Scheme, path, userinfo and port are removed in that order, so
/// `https://user@sub.example.com:8443/path` becomes `sub.example.com`.
/// Bare hostnames pass through unchanged.
pub fn extract_host(candidate: &str) -> &str {
    let without_scheme = candidate
        .rsplit_once("://")
        .map_or(candidate, |(_, rest)| rest);
    let without_path = without_scheme
        .split_once('/')
        .map_or(without_scheme, |(host, _)| host);
    let without_userinfo = without_path
        .rsplit_once('@')
        .map_or(without_path, |(_, host)| host);
    without_userinfo
        .split_once(':')
        .map_or(without_userinfo, |(host, _)| host)
}

/// Turn raw provider candidates into the set of strict subdomains of `domain`.
pub fn clean<I, S>(candidates: I, domain: &Domain) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let suffix = domain.suffix();

    candidates
        .into_iter()
        .filter_map(|candidate| clean_one(candidate.as_ref(), domain, &suffix))
        .collect()
}

fn clean_one(candidate: &str, domain: &Domain, suffix: &str) -> Option<String> {
    let lowered = candidate.trim().to_lowercase();
    let host = extract_host(&lowered);
    if host.is_empty() || !host.ends_with(suffix) {
        return None;
    }

    let mut host = host;
    while let Some(rest) = host.strip_prefix("*.") {
        host = rest;
    }

    // Stripping may have eaten into the suffix itself, e.g. `*.example.com`.
    if host == domain.as_str() || !host.ends_with(suffix) {
        return None;
    }

    if host.starts_with('.') || host.contains("..") {
        return None;
    }

    Some(host.to_string())
}
