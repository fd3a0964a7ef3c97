//! Output formatting for multiple formats
//!
//! Renders a [`ResolutionResult`] as JSON, YAML or human-readable text. The
//! machine formats serialize the full result including the candidate trace;
//! the human format lists every candidate with its member outcomes.
//!
//! # Example
//!
//! ```
//! use buildpack_detector::cli::output::{OutputFormat, OutputFormatter};
//! use buildpack_detector::detect::ResolutionResult;
//!
//! let result = ResolutionResult::Exhausted { trace: vec![] };
//! let formatter = OutputFormatter::new(OutputFormat::Human);
//! let output = formatter.format(&result).unwrap();
//! assert!(output.contains("No buildpack groups passed detection."));
//! ```

use anyhow::{Context, Result};

use crate::detect::{BuildPlan, CandidateTrace, Group, MemberStatus, ResolutionResult};

pub const NO_GROUP_PASSED: &str = "No buildpack groups passed detection.";

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, result: &ResolutionResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(result)
                .context("Failed to serialize detection result to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(result)
                .context("Failed to serialize detection result to YAML"),
            OutputFormat::Human => Ok(self.format_human(result)),
        }
    }

    fn format_human(&self, result: &ResolutionResult) -> String {
        let mut output = String::new();

        output.push_str("Detection Trace\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        for candidate in result.trace() {
            format_candidate(&mut output, candidate, 0);
        }

        match result {
            ResolutionResult::Success { group, plan, .. } => {
                format_group(&mut output, group);
                format_plan(&mut output, plan);
            }
            ResolutionResult::Exhausted { .. } => {
                output.push_str(NO_GROUP_PASSED);
                output.push('\n');
            }
        }

        output
    }
}

fn format_candidate(output: &mut String, candidate: &CandidateTrace, depth: usize) {
    let indent = "  ".repeat(depth);
    output.push_str(&format!("{}Group #{}\n", indent, candidate.index + 1));

    for member in &candidate.members {
        let label = match &member.status {
            MemberStatus::Passed => "pass".to_string(),
            MemberStatus::Failed => "fail".to_string(),
            MemberStatus::Errored { message } => format!("err ({})", message),
            MemberStatus::Skipped => "skip".to_string(),
        };
        let optional = if member.buildpack.optional {
            " (optional)"
        } else {
            ""
        };
        output.push_str(&format!(
            "{}  {}: {}{}\n",
            indent, label, member.buildpack, optional
        ));

        for nested in &member.nested {
            format_candidate(output, nested, depth + 2);
        }
    }

    match &candidate.disqualified {
        Some(reason) => output.push_str(&format!("{}  \u{2717} {}\n", indent, reason)),
        None => output.push_str(&format!("{}  \u{2713} passed\n", indent)),
    }
    if depth == 0 {
        output.push('\n');
    }
}

fn format_group(output: &mut String, group: &Group) {
    output.push_str("Selected Group:\n");
    for buildpack in &group.buildpacks {
        let optional = if buildpack.optional {
            " (optional)"
        } else {
            ""
        };
        output.push_str(&format!("  {}{}\n", buildpack, optional));
    }
}

fn format_plan(output: &mut String, plan: &BuildPlan) {
    output.push_str("\nBuild Plan:\n");
    if plan.is_empty() {
        output.push_str("  (empty)\n");
        return;
    }

    for entry in &plan.entries {
        let providers: Vec<String> = entry.providers.iter().map(|p| p.to_string()).collect();
        let requirers = entry.requires.len();
        output.push_str(&format!(
            "  {}: provided by {}; {} requirement{}\n",
            entry.name().unwrap_or("-"),
            providers.join(", "),
            requirers,
            if requirers == 1 { "" } else { "s" }
        ));
    }
}
