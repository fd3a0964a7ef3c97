use buildpack_detector::cli::commands::{normalize_args, CliArgs};
use buildpack_detector::cli::handlers::handle_detect;
use buildpack_detector::util::logging::{config_from_env, init_logging};
use buildpack_detector::{NAME, VERSION};

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse_from(normalize_args(std::env::args()));
    init_logging(config_from_env(args.log_level.as_deref(), args.log_json));

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = handle_detect(&args).await;

    std::process::exit(exit_code);
}
