pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{normalize_args, CliArgs, OutputFormatArg};
pub use handlers::{
    check_user, exit_code, handle_detect, handle_detect_with_config, running_as_root,
    CODE_FAILED, CODE_FAILED_DETECT, CODE_INVALID_ARGS, CODE_REFUSED_ROOT, CODE_SUCCESS,
    REFUSING_ROOT,
};
pub use output::{OutputFormat, OutputFormatter};
