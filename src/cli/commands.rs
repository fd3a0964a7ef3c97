use crate::config::DetectorConfig;
use crate::detect::DetectStrategy;
use clap::{CommandFactory, Parser, ValueEnum};
use std::collections::HashSet;
use std::path::PathBuf;

/// Finds the buildpack group able to build an application
#[derive(Parser, Debug)]
#[command(
    name = "detector",
    about = "Finds the buildpack group able to build an application",
    version,
    long_about = "detector runs the detect phase of every candidate buildpack group in the \
                  order file until one group passes, then writes the winning group and its \
                  build plan.\n\n\
                  Every path option can also be set through the matching CNB_* environment \
                  variable (CNB_ORDER_PATH, CNB_GROUP_PATH, CNB_PLAN_PATH, CNB_APP_DIR, \
                  CNB_BUILDPACKS_DIR, CNB_PLATFORM_DIR, CNB_LAYERS_DIR)."
)]
pub struct CliArgs {
    #[arg(long, value_name = "PATH", help = "Path to order.toml")]
    pub order: Option<PathBuf>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Where to write group.toml (relative to the layers dir)"
    )]
    pub group: Option<PathBuf>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Where to write plan.toml (relative to the layers dir)"
    )]
    pub plan: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Application directory")]
    pub app: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Directory containing buildpacks")]
    pub buildpacks: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Platform directory")]
    pub platform: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Layers directory")]
    pub layers: Option<PathBuf>,

    #[arg(long, value_name = "SECONDS", help = "Time allowed for each bin/detect run")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(
        long,
        help = "Detect the buildpacks of a group concurrently instead of one by one"
    )]
    pub concurrent: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format for the result"
    )]
    pub format: OutputFormatArg,

    #[arg(long, help = "Print the result without writing group.toml and plan.toml")]
    pub dry_run: bool,

    #[arg(short = 'q', long, help = "Do not print the result")]
    pub quiet: bool,

    /// The detector takes no positional arguments; they are collected only to
    /// be rejected with a clear message.
    #[arg(hide = true)]
    pub unexpected: Vec<String>,
}

impl CliArgs {
    /// Overlays command-line flags on a configuration loaded from the environment.
    pub fn apply(&self, mut config: DetectorConfig) -> DetectorConfig {
        let paths = [
            (&self.order, &mut config.order_path),
            (&self.group, &mut config.group_path),
            (&self.plan, &mut config.plan_path),
            (&self.app, &mut config.app_dir),
            (&self.buildpacks, &mut config.buildpacks_dir),
            (&self.platform, &mut config.platform_dir),
            (&self.layers, &mut config.layers_dir),
        ];
        for (flag, target) in paths {
            if let Some(path) = flag {
                *target = path.clone();
            }
        }
        if let Some(timeout) = self.timeout {
            config.detect_timeout_secs = timeout;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.to_lowercase();
        }
        config
    }

    pub fn strategy(&self) -> DetectStrategy {
        if self.concurrent {
            DetectStrategy::Concurrent
        } else {
            DetectStrategy::Sequential
        }
    }
}

/// Rewrites single-dash long flags such as `-log-level=debug` into their
/// `--log-level=debug` form. Short flags, values and anything after `--` are
/// left alone.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut long_names: HashSet<String> = CliArgs::command()
        .get_arguments()
        .filter_map(|arg| arg.get_long())
        .map(str::to_string)
        .collect();
    long_names.extend(["help".to_string(), "version".to_string()]);

    let mut literal = false;
    args.into_iter()
        .map(|arg| {
            if literal {
                return arg;
            }
            if arg == "--" {
                literal = true;
                return arg;
            }
            let name = match arg.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => rest.split('=').next().unwrap_or(rest),
                _ => return arg,
            };
            if name.len() > 1 && long_names.contains(name) {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
