//! Publish command implementation.

use super::archive_options;
use super::nested_dir_policy;
use super::progress_for;
use crate::cli::PublishArgs;
use crate::error::add_package_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use terramod_core::PackageError;
use terramod_core::PublishConfig;
use terramod_core::publish_with_progress;
use terramod_core::storage::ObjectStoreRemote;
use terramod_core::storage::StorageBackend;
use terramod_core::storage::StorageTarget;

/// Validates every flag before touching the filesystem or the network.
pub fn build_config(args: &PublishArgs) -> Result<(PublishConfig, StorageTarget), PackageError> {
    let module = args.module.as_ref().ok_or(PackageError::MissingModule)?;
    let target = StorageTarget::parse(&args.storage, args.s3_bucket.as_deref())?;

    let mut config = PublishConfig::new(module)
        .with_prefix(args.s3_prefix.as_str())
        .with_archive_options(archive_options(args.compression_level))
        .with_nested_dirs(nested_dir_policy(args.skip_nested_dirs));
    if let Some(temp_dir) = &args.temp_dir {
        config = config.with_temp_dir(temp_dir);
    }

    Ok((config, target))
}

pub fn execute(args: &PublishArgs, formatter: &dyn OutputFormatter, show_progress: bool) -> Result<()> {
    let (config, target) = add_package_context(build_config(args))?;

    let store = match target.backend {
        StorageBackend::S3 => {
            add_package_context(ObjectStoreRemote::s3(&target.bucket).map_err(PackageError::from))?
        }
    };

    let mut progress = progress_for("Packaging", show_progress);
    let report = add_package_context(publish_with_progress(&config, &store, progress.as_mut()))?;
    drop(progress);

    formatter.format_publish_result(&report)
}
