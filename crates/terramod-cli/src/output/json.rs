//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use terramod_core::Checksum;
use terramod_core::PackageReport;
use terramod_core::PublishOutcome;
use terramod_core::PublishReport;

pub struct JsonFormatter;

#[derive(Serialize)]
struct PackageOutput {
    module: String,
    version: String,
    archive_name: String,
    archive_path: String,
    checksum: String,
    files_added: usize,
    directories_added: usize,
    entries_skipped: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    compression_ratio: f64,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl From<&PackageReport> for PackageOutput {
    fn from(report: &PackageReport) -> Self {
        Self {
            module: report.module_name.clone(),
            version: report.version.clone(),
            archive_name: report.archive_name.clone(),
            archive_path: report.archive_path.display().to_string(),
            checksum: report.checksum.to_string(),
            files_added: report.archive.files_added,
            directories_added: report.archive.directories_added,
            entries_skipped: report.archive.entries_skipped,
            bytes_written: report.archive.bytes_written,
            bytes_compressed: report.archive.bytes_compressed,
            compression_ratio: report.archive.compression_ratio(),
            duration_ms: report.archive.duration.as_millis(),
            warnings: report.archive.warnings.clone(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

const fn outcome_name(outcome: PublishOutcome) -> &'static str {
    match outcome {
        PublishOutcome::Uploaded => "uploaded",
        PublishOutcome::AlreadyPresent => "already_present",
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_package_result(&self, report: &PackageReport) -> Result<()> {
        let output = JsonOutput::success("package", PackageOutput::from(report));
        Self::output(&output)
    }

    fn format_publish_result(&self, report: &PublishReport) -> Result<()> {
        #[derive(Serialize)]
        struct PublishOutput {
            location: String,
            key: String,
            outcome: &'static str,
            package: PackageOutput,
        }

        let data = PublishOutput {
            location: report.location.clone(),
            key: report.key.clone(),
            outcome: outcome_name(report.outcome),
            package: PackageOutput::from(&report.package),
        };

        let output = JsonOutput::success("publish", data);
        Self::output(&output)
    }

    fn format_checksum(
        &self,
        module_dir: &Path,
        checksum: &Checksum,
        written: bool,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct ChecksumOutput {
            module_dir: String,
            checksum: String,
            written: bool,
        }

        let data = ChecksumOutput {
            module_dir: module_dir.display().to_string(),
            checksum: checksum.to_string(),
            written,
        };

        let output = JsonOutput::success("checksum", data);
        Self::output(&output)
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, error.to_string());
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use terramod_core::ArchiveReport;

    fn report() -> PackageReport {
        PackageReport {
            module_name: "vpc".into(),
            version: "1.0.0".into(),
            archive_name: "vpc-1.0.0.zip".into(),
            archive_path: PathBuf::from("dist/vpc-1.0.0.zip"),
            checksum: Checksum::of_bytes(b"hello"),
            archive: ArchiveReport {
                files_added: 2,
                directories_added: 1,
                ..ArchiveReport::default()
            },
        }
    }

    #[test]
    fn test_package_output_fields() {
        let json = serde_json::to_value(PackageOutput::from(&report())).unwrap();
        assert_eq!(json["module"], "vpc");
        assert_eq!(json["archive_name"], "vpc-1.0.0.zip");
        assert_eq!(json["checksum"], "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(json["files_added"], 2);
    }

    #[test]
    fn test_outcome_names() {
        assert_eq!(outcome_name(PublishOutcome::Uploaded), "uploaded");
        assert_eq!(outcome_name(PublishOutcome::AlreadyPresent), "already_present");
    }
}
