//! `group.toml` and `plan.toml` persistence

use crate::detect::{BuildPlan, Group, Requirement};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Serialize)]
struct PlanFile<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entries: Vec<PlanFileEntry<'a>>,
}

#[derive(Serialize)]
struct PlanFileEntry<'a> {
    providers: Vec<PlanProvider<'a>>,
    requires: &'a [Requirement],
}

#[derive(Serialize)]
struct PlanProvider<'a> {
    id: &'a str,
    version: &'a str,
}

pub fn render_group(group: &Group) -> Result<String> {
    toml::to_string(group).context("Failed to serialize group")
}

/// Providers are written with `id` and `version` only. An empty plan renders
/// as an empty document.
pub fn render_plan(plan: &BuildPlan) -> Result<String> {
    let file = PlanFile {
        entries: plan
            .entries
            .iter()
            .map(|entry| PlanFileEntry {
                providers: entry
                    .providers
                    .iter()
                    .map(|p| PlanProvider {
                        id: &p.id,
                        version: &p.version,
                    })
                    .collect(),
                requires: &entry.requires,
            })
            .collect(),
    };
    toml::to_string(&file).context("Failed to serialize build plan")
}

pub fn write_group(path: &Path, group: &Group) -> Result<()> {
    write_file(path, &render_group(group)?)
        .with_context(|| format!("failed to write group file {}", path.display()))
}

pub fn write_plan(path: &Path, plan: &BuildPlan) -> Result<()> {
    write_file(path, &render_plan(plan)?)
        .with_context(|| format!("failed to write plan file {}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    debug!(path = %path.display(), bytes = contents.len(), "Wrote file");
    Ok(())
}
