//! Checksum command implementation.

use super::nested_dir_policy;
use crate::cli::ChecksumArgs;
use crate::error::add_package_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use terramod_core::module_checksum;
use terramod_core::package::validate_module_dir;
use terramod_core::write_module_checksum;

pub fn execute(args: &ChecksumArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let policy = nested_dir_policy(args.skip_nested_dirs);
    add_package_context(validate_module_dir(&args.module_dir))?;

    let checksum = if args.write {
        add_package_context(write_module_checksum(&args.module_dir, policy))?
    } else {
        add_package_context(module_checksum(&args.module_dir, policy))?
    };

    formatter.format_checksum(&args.module_dir, &checksum, args.write)
}
