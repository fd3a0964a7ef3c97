//! Command handler for the detector binary

use crate::cli::commands::CliArgs;
use crate::cli::output::{OutputFormatter, NO_GROUP_PASSED};
use crate::config::DetectorConfig;
use crate::detect::{GroupResolver, ResolutionResult};
use crate::platform::{read_order, write_group, write_plan, DirectoryCatalog, ProcessDetector};
use std::sync::Arc;
use tracing::{debug, error, info};

pub const CODE_SUCCESS: i32 = 0;
pub const CODE_FAILED: i32 = 1;
pub const CODE_REFUSED_ROOT: i32 = 2;
pub const CODE_INVALID_ARGS: i32 = 3;
/// No candidate group passed detection
pub const CODE_FAILED_DETECT: i32 = 100;

pub fn exit_code(result: &ResolutionResult) -> i32 {
    if result.is_success() {
        CODE_SUCCESS
    } else {
        CODE_FAILED_DETECT
    }
}

pub const REFUSING_ROOT: &str = "failed to build: refusing to run as root";

#[cfg(unix)]
pub fn running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
pub fn running_as_root() -> bool {
    false
}

/// Buildpacks must not run with root privileges unless the platform opts in.
pub fn check_user(is_root: bool, config: &DetectorConfig) -> anyhow::Result<()> {
    if is_root && !config.allow_root {
        anyhow::bail!(REFUSING_ROOT);
    }
    Ok(())
}

/// Runs detection with configuration from the environment overlaid by `args`.
pub async fn handle_detect(args: &CliArgs) -> i32 {
    handle_detect_with_config(args, DetectorConfig::default()).await
}

pub async fn handle_detect_with_config(args: &CliArgs, config: DetectorConfig) -> i32 {
    if !args.unexpected.is_empty() {
        error!(
            "failed to parse arguments: received unexpected arguments: {}",
            args.unexpected.join(" ")
        );
        return CODE_INVALID_ARGS;
    }

    let config = args.apply(config);
    if let Err(e) = config.validate() {
        error!("{}", e);
        return CODE_INVALID_ARGS;
    }
    debug!("{}", config);

    if let Err(e) = check_user(running_as_root(), &config) {
        error!("{}", e);
        return CODE_REFUSED_ROOT;
    }

    let order = match read_order(&config.order_path) {
        Ok(order) => order,
        Err(e) => {
            error!("{:#}", e);
            return CODE_FAILED;
        }
    };

    let resolver = GroupResolver::new(
        ProcessDetector::new(config.detect_timeout()),
        Arc::new(DirectoryCatalog::new(&config.buildpacks_dir)),
        config.execution_context(),
    )
    .with_strategy(args.strategy());

    let result = match resolver.resolve(&order).await {
        Ok(result) => result,
        Err(e) => {
            error!("failed to detect: {}", e);
            return CODE_FAILED;
        }
    };

    match &result {
        ResolutionResult::Success { group, plan, .. } => {
            if args.dry_run {
                info!("Dry run, not writing group and plan");
            } else {
                let group_path = config.resolved_group_path();
                let plan_path = config.resolved_plan_path();
                if let Err(e) = write_group(&group_path, group) {
                    error!("{:#}", e);
                    return CODE_FAILED;
                }
                if let Err(e) = write_plan(&plan_path, plan) {
                    error!("{:#}", e);
                    return CODE_FAILED;
                }
                info!(
                    group = %group_path.display(),
                    plan = %plan_path.display(),
                    "Wrote detection results"
                );
            }
        }
        ResolutionResult::Exhausted { .. } => {
            error!("{}", NO_GROUP_PASSED);
        }
    }

    if !args.quiet {
        match OutputFormatter::new(args.format.into()).format(&result) {
            Ok(output) => println!("{}", output),
            Err(e) => error!("Failed to format output: {:#}", e),
        }
    }

    exit_code(&result)
}
