use crate::detect::Order;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads an `order.toml` file.
pub fn read_order(path: &Path) -> Result<Order> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read buildpack order file {}", path.display()))?;
    let order = parse_order(&contents)
        .with_context(|| format!("failed to read buildpack order file {}", path.display()))?;
    debug!(path = %path.display(), candidates = order.groups.len(), "Loaded order");
    Ok(order)
}

pub fn parse_order(contents: &str) -> Result<Order> {
    toml::from_str(contents).context("invalid order TOML")
}
