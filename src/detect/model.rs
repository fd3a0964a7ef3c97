//! Data model shared by the resolver, the plan assembler and the persistence layer
//!
//! The serde layout of [`Order`], [`Group`] and [`BuildPlan`] mirrors the
//! `order.toml`, `group.toml` and `plan.toml` files exchanged with the rest of
//! the build lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Reference to a single buildpack as declared by the order author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildpackRef {
    pub id: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api: String,
}

impl BuildpackRef {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            optional: false,
            api: String::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_api(mut self, api: impl Into<String>) -> Self {
        self.api = api.into();
        self
    }

    /// `id@version`, used as catalog key and in diagnostics
    pub fn key(&self) -> String {
        format!("{}@{}", self.id, self.version)
    }
}

impl fmt::Display for BuildpackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}@{}", self.id, self.version)
        }
    }
}

/// Ordered list of buildpacks considered together as one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "group", default)]
    pub buildpacks: Vec<BuildpackRef>,
}

impl Group {
    pub fn new(buildpacks: Vec<BuildpackRef>) -> Self {
        Self { buildpacks }
    }

    pub fn is_empty(&self) -> bool {
        self.buildpacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buildpacks.len()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.buildpacks.iter().map(|bp| bp.id.as_str()).collect()
    }
}

/// Candidate groups, tried in sequence until one passes detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "order", default)]
    pub groups: Vec<Group>,
}

impl Order {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// A named capability a buildpack needs. Metadata is carried through to the
/// build phase untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,

    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub metadata: toml::Table,
}

impl Requirement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: toml::Table::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A named capability a buildpack offers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provision {
    pub name: String,
}

impl Provision {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Normalized result of detecting one leaf buildpack.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionOutcome {
    pub passed: bool,

    #[serde(default)]
    pub requires: Vec<Requirement>,

    #[serde(default)]
    pub provides: Vec<Provision>,
}

impl DetectionOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            requires: Vec::new(),
            provides: Vec::new(),
        }
    }

    pub fn fail() -> Self {
        Self::default()
    }

    pub fn requiring(mut self, requirement: Requirement) -> Self {
        self.requires.push(requirement);
        self
    }

    pub fn providing(mut self, name: impl Into<String>) -> Self {
        self.provides.push(Provision::new(name));
        self
    }
}

/// Requirements sharing one name, paired with the buildpacks providing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlanEntry {
    pub providers: Vec<BuildpackRef>,
    pub requires: Vec<Requirement>,
}

impl BuildPlanEntry {
    pub fn name(&self) -> Option<&str> {
        self.requires.first().map(|r| r.name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<BuildPlanEntry>,
}

impl BuildPlan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, name: &str) -> Option<&BuildPlanEntry> {
        self.entries.iter().find(|e| e.name() == Some(name))
    }
}
