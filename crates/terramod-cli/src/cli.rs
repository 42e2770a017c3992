//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "terramod")]
// The version is not propagated: `package` owns a `--version` argument.
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Checksum a module and package it as a versioned ZIP archive
    Package(PackageArgs),
    /// Package a module and upload it unless it is already published
    Publish(PublishArgs),
    /// Compute the module checksum
    Checksum(ChecksumArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct PackageArgs {
    /// Module directory to package
    #[arg(value_name = "MODULE_DIR")]
    pub module_dir: PathBuf,

    /// Module version used in the archive name
    #[arg(long = "version", value_name = "VERSION")]
    pub module_version: String,

    /// Directory the archive is written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,

    /// Leave subdirectories out of the module checksum instead of failing
    #[arg(long)]
    pub skip_nested_dirs: bool,
}

#[derive(clap::Args)]
pub struct PublishArgs {
    /// Module directory containing VERSION.txt
    #[arg(short, long, value_name = "DIR")]
    pub module: Option<PathBuf>,

    /// Directory the archive is built in (default: system temp directory)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Storage backend
    #[arg(long, default_value = "s3")]
    pub storage: String,

    /// Bucket the archive is published to
    #[arg(long, value_name = "BUCKET")]
    pub s3_bucket: Option<String>,

    /// Key prefix inside the bucket
    #[arg(long, value_name = "PREFIX", default_value = "")]
    pub s3_prefix: String,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,

    /// Leave subdirectories out of the module checksum instead of failing
    #[arg(long)]
    pub skip_nested_dirs: bool,
}

#[derive(clap::Args)]
pub struct ChecksumArgs {
    /// Module directory to checksum
    #[arg(value_name = "MODULE_DIR")]
    pub module_dir: PathBuf,

    /// Also write the checksum to the module's .checksum file
    #[arg(short, long)]
    pub write: bool,

    /// Leave subdirectories out of the module checksum instead of failing
    #[arg(long)]
    pub skip_nested_dirs: bool,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
