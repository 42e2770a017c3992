//! Human-readable output formatter with colors and styling.

use super::format_size;
use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use std::path::Path;
use terramod_core::Checksum;
use terramod_core::PackageReport;
use terramod_core::PublishOutcome;
use terramod_core::PublishReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn headline(&self, marker: &str, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style(marker).green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn write_package_details(&self, report: &PackageReport) {
        let archive = &report.archive;
        let _ = self
            .term
            .write_line(&format!("  Checksum:         {}", report.checksum));
        let _ = self
            .term
            .write_line(&format!("  Files added:      {}", archive.files_added));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            format_size(archive.bytes_written)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            format_size(archive.bytes_compressed)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Directories:      {}", archive.directories_added));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", archive.duration));
        }

        if archive.entries_skipped > 0 {
            let _ = self
                .term
                .write_line(&format!("  Entries skipped:  {}", archive.entries_skipped));
        }

        if archive.has_warnings() {
            let _ = self.term.write_line("");
            if self.use_colors {
                let _ = self
                    .term
                    .write_line(&format!("{}", style("Warnings:").yellow().bold()));
            } else {
                let _ = self.term.write_line("Warnings:");
            }
            for warning in &archive.warnings {
                let _ = self.term.write_line(&format!("  - {warning}"));
            }
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_package_result(&self, report: &PackageReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(
            "✓",
            &format!("Module packaged: {}", report.archive_path.display()),
        );
        self.write_package_details(report);
        Ok(())
    }

    fn format_publish_result(&self, report: &PublishReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let target = format!("{}/{}", report.location, report.key);
        match report.outcome {
            PublishOutcome::Uploaded => self.headline("✓", &format!("Module published: {target}")),
            PublishOutcome::AlreadyPresent => {
                self.headline("=", &format!("Already published, upload skipped: {target}"));
            }
        }
        self.write_package_details(&report.package);
        Ok(())
    }

    fn format_checksum(
        &self,
        module_dir: &Path,
        checksum: &Checksum,
        written: bool,
    ) -> Result<()> {
        // The bare digest is the useful output, even when quiet
        if self.quiet || !self.verbose {
            let _ = self.term.write_line(checksum.as_str());
        } else {
            let _ = self
                .term
                .write_line(&format!("{checksum}  {}", module_dir.display()));
        }

        if written && !self.quiet {
            let _ = Term::stderr().write_line(&format!(
                "Checksum written to {}",
                module_dir.join(terramod_core::CHECKSUM_FILE_NAME).display()
            ));
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error}"));
        }
    }
}
