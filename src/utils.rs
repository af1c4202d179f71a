// src/utils.rs
use crate::error::{ErrorContext, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

const DEFAULT_WORDLIST: &str = include_str!("../wordlists/subdomains-top.txt");

/// Reads lines from a file into a vector of strings.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader.lines().collect()
}

/// Load a bruteforce wordlist: one label per line, trimmed, blank lines skipped.
pub fn load_wordlist(path: Option<&Path>) -> Result<Vec<String>> {
    let lines = match path {
        Some(path) => read_lines(path)
            .with_context(|| format!("Failed to read wordlist {}", path.display()))?,
        None => DEFAULT_WORDLIST.lines().map(str::to_string).collect(),
    };

    Ok(parse_wordlist(lines))
}

pub fn parse_wordlist<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Check if a string is a valid domain
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    for part in parts {
        if part.is_empty() || part.len() > 63 {
            return false;
        }

        if !part.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            return false;
        }

        if part.starts_with('-') || part.ends_with('-') {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_valid_domain() {
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("sub.example.com"));
        assert!(!is_valid_domain("example"));
        assert!(!is_valid_domain(""));
        assert!(!is_valid_domain("-example.com"));
        assert!(!is_valid_domain("example-.com"));
    }

    #[test]
    fn test_load_wordlist_trims_and_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "www\n  mail \n\n\t\napi\n").unwrap();

        let words = load_wordlist(Some(file.path())).unwrap();
        assert_eq!(words, vec!["www", "mail", "api"]);
    }

    #[test]
    fn test_load_wordlist_missing_file() {
        let err = load_wordlist(Some(Path::new("/nonexistent/words.txt"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read wordlist"));
    }

    #[test]
    fn test_default_wordlist_is_embedded() {
        let words = load_wordlist(None).unwrap();
        assert!(words.contains(&"www".to_string()));
        assert!(words.iter().all(|w| !w.is_empty()));
    }
}
