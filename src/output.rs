// src/output.rs
use crate::types::{DomainReport, OutputConfig, OutputFormat, SubScoutError};
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Make sure the output directory is usable before any work starts.
    ///
    /// An existing directory must not contain anything but hidden entries.
    pub fn prepare(&self) -> Result<(), SubScoutError> {
        let Some(dir) = &self.config.directory else {
            return Ok(());
        };

        if dir.exists() {
            let entries = fs::read_dir(dir).map_err(|e| {
                SubScoutError::OutputError(format!("Failed to read directory {}: {}", dir.display(), e))
            })?;
            for entry in entries.flatten() {
                if !entry.file_name().to_string_lossy().starts_with('.') {
                    return Err(SubScoutError::OutputError(format!(
                        "Output directory '{}' is not empty",
                        dir.display()
                    )));
                }
            }
        } else {
            fs::create_dir_all(dir).map_err(|e| {
                SubScoutError::OutputError(format!("Failed to create directory: {}", e))
            })?;
        }

        Ok(())
    }

    pub fn write_report(&self, report: &DomainReport) -> Result<(), SubScoutError> {
        match &self.config.directory {
            Some(dir) => self.write_to_dir(dir, report).map(|_| ()),
            None => self.write_to_stdout(report),
        }
    }

    fn report_path(&self, dir: &Path, report: &DomainReport) -> PathBuf {
        let ext = match self.config.format {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        };
        dir.join(format!("{}.{}", report.domain.trim_start_matches('.'), ext))
    }

    fn write_to_dir(&self, dir: &Path, report: &DomainReport) -> Result<PathBuf, SubScoutError> {
        let path = self.report_path(dir, report);
        let body = match self.config.format {
            OutputFormat::Text => report.subdomains.join("\n"),
            OutputFormat::Json => to_json(report)?,
        };

        fs::write(&path, body)
            .map_err(|e| SubScoutError::OutputError(format!("Failed to write {}: {}", path.display(), e)))?;
        debug!("Wrote {} subdomains to {}", report.subdomains.len(), path.display());

        if !self.config.silent && !self.config.events {
            println!(
                "Saved {} subdomains to '{}'",
                report.subdomains.len(),
                path.display()
            );
        }
        Ok(path)
    }

    fn write_to_stdout(&self, report: &DomainReport) -> Result<(), SubScoutError> {
        // The result event already carries the listing.
        if self.config.events {
            return Ok(());
        }

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write_listing(&mut handle, report)
    }

    fn write_listing<W: Write>(&self, writer: &mut W, report: &DomainReport) -> Result<(), SubScoutError> {
        let io_err = |e: std::io::Error| SubScoutError::OutputError(e.to_string());

        match self.config.format {
            OutputFormat::Json => {
                writeln!(writer, "{}", to_json(report)?).map_err(io_err)?;
            }
            OutputFormat::Text if self.config.silent => {
                for name in &report.subdomains {
                    writeln!(writer, "{}", name).map_err(io_err)?;
                }
            }
            OutputFormat::Text => {
                writeln!(
                    writer,
                    "  Found {} subdomains for {}:",
                    report.subdomains.len(),
                    report.domain
                )
                .map_err(io_err)?;
                for name in &report.subdomains {
                    writeln!(writer, "  - {}", name).map_err(io_err)?;
                }
            }
        }

        Ok(())
    }
}

fn to_json(report: &DomainReport) -> Result<String, SubScoutError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| SubScoutError::OutputError(format!("Failed to serialize JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn report() -> DomainReport {
        DomainReport {
            domain: "example.com".to_string(),
            subdomains: vec!["a.example.com".to_string(), "b.example.com".to_string()],
            sources: Vec::new(),
            duration: Duration::from_secs(1),
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn manager(directory: Option<PathBuf>, format: OutputFormat) -> OutputManager {
        OutputManager::new(OutputConfig {
            format,
            directory,
            silent: true,
            ..OutputConfig::default()
        })
    }

    #[test]
    fn test_prepare_creates_missing_directory() {
        let root = tempdir().unwrap();
        let dir = root.path().join("results/nested");

        manager(Some(dir.clone()), OutputFormat::Text).prepare().unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_prepare_rejects_non_empty_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("old.txt"), "x").unwrap();

        let result = manager(Some(dir.path().to_path_buf()), OutputFormat::Text).prepare();
        assert!(matches!(result, Err(SubScoutError::OutputError(_))));
    }

    #[test]
    fn test_prepare_ignores_hidden_entries() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".keep"), "").unwrap();

        manager(Some(dir.path().to_path_buf()), OutputFormat::Text).prepare().unwrap();
    }

    #[test]
    fn test_text_report_file() {
        let dir = tempdir().unwrap();
        let output = manager(Some(dir.path().to_path_buf()), OutputFormat::Text);

        let path = output.write_to_dir(dir.path(), &report()).unwrap();
        assert_eq!(path, dir.path().join("example.com.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "a.example.com\nb.example.com");
    }

    #[test]
    fn test_json_report_file() {
        let dir = tempdir().unwrap();
        let output = manager(Some(dir.path().to_path_buf()), OutputFormat::Json);

        let path = output.write_to_dir(dir.path(), &report()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["subdomains"][1], "b.example.com");
    }

    #[test]
    fn test_listing_formats() {
        let mut buf = Vec::new();
        let listing = OutputManager::new(OutputConfig::default());
        listing.write_listing(&mut buf, &report()).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "  Found 2 subdomains for example.com:\n  - a.example.com\n  - b.example.com\n"
        );

        let mut buf = Vec::new();
        manager(None, OutputFormat::Text).write_listing(&mut buf, &report()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a.example.com\nb.example.com\n");
    }
}
