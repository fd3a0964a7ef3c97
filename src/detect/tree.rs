//! Detectable tree model
//!
//! An [`Order`] only names buildpacks. Before resolution every reference is
//! looked up in a [`BuildpackCatalog`] and expanded into a [`TreeOrder`]: leaf
//! buildpacks are detected by running them, composite buildpacks pass when
//! their own embedded order resolves.
//!
//! Building the tree is where malformed input is rejected. Cycles, duplicate
//! IDs inside a group (also through composites) and composites with an empty
//! order all fail here, before any detection runs.

use super::error::{CatalogError, ConfigurationError};
use super::model::{BuildpackRef, Group, Order, Provision, Requirement};
use std::collections::{BTreeSet, HashMap};

/// What a buildpack reference resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildpackNode {
    Leaf { api: Option<String> },
    Composite(CompositeBuildpack),
}

impl BuildpackNode {
    pub fn leaf() -> Self {
        BuildpackNode::Leaf { api: None }
    }

    fn api(&self) -> Option<&str> {
        match self {
            BuildpackNode::Leaf { api } => api.as_deref(),
            BuildpackNode::Composite(composite) => composite.api.as_deref(),
        }
    }
}

/// A buildpack whose detection is the resolution of its own order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeBuildpack {
    pub api: Option<String>,
    pub order: Order,
    pub requires: Vec<Requirement>,
    pub provides: Vec<Provision>,
}

impl CompositeBuildpack {
    pub fn new(order: Order) -> Self {
        Self {
            order,
            ..Default::default()
        }
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

/// Looks up buildpack descriptors by reference.
pub trait BuildpackCatalog: Send + Sync {
    fn lookup(&self, buildpack: &BuildpackRef) -> Result<BuildpackNode, CatalogError>;
}

/// Catalog held in memory. References that were never registered are leaves.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    nodes: HashMap<String, BuildpackNode>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_composite(
        mut self,
        id: impl Into<String>,
        version: impl Into<String>,
        composite: CompositeBuildpack,
    ) -> Self {
        let key = BuildpackRef::new(id, version).key();
        self.nodes.insert(key, BuildpackNode::Composite(composite));
        self
    }

    pub fn insert(&mut self, buildpack: &BuildpackRef, node: BuildpackNode) {
        self.nodes.insert(buildpack.key(), node);
    }
}

impl BuildpackCatalog for InMemoryCatalog {
    fn lookup(&self, buildpack: &BuildpackRef) -> Result<BuildpackNode, CatalogError> {
        Ok(self
            .nodes
            .get(&buildpack.key())
            .cloned()
            .unwrap_or_else(BuildpackNode::leaf))
    }
}

/// An order with every composite expanded, validated before detection starts.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeOrder {
    pub groups: Vec<TreeGroup>,
}

/// One candidate of a [`TreeOrder`], members in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeGroup {
    pub members: Vec<TreeMember>,
}

/// A leaf to detect, or a composite carrying its own expanded order.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeMember {
    Leaf(BuildpackRef),
    Composite {
        buildpack: BuildpackRef,
        requires: Vec<Requirement>,
        provides: Vec<Provision>,
        order: TreeOrder,
    },
}

impl TreeMember {
    pub fn buildpack(&self) -> &BuildpackRef {
        match self {
            TreeMember::Leaf(buildpack) => buildpack,
            TreeMember::Composite { buildpack, .. } => buildpack,
        }
    }

    /// Every buildpack ID this member could place into a flattened group.
    fn reachable_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        ids.insert(self.buildpack().id.clone());
        if let TreeMember::Composite { order, .. } = self {
            for group in &order.groups {
                for member in &group.members {
                    ids.extend(member.reachable_ids());
                }
            }
        }
        ids
    }
}

impl TreeOrder {
    /// Expands `order` against `catalog`, validating it on the way.
    pub fn build(order: &Order, catalog: &dyn BuildpackCatalog) -> Result<Self, ConfigurationError> {
        let mut path = Vec::new();
        build_order(order, catalog, &mut path)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn build_order(
    order: &Order,
    catalog: &dyn BuildpackCatalog,
    path: &mut Vec<String>,
) -> Result<TreeOrder, ConfigurationError> {
    let groups = order
        .groups
        .iter()
        .map(|group| build_group(group, catalog, path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TreeOrder { groups })
}

fn build_group(
    group: &Group,
    catalog: &dyn BuildpackCatalog,
    path: &mut Vec<String>,
) -> Result<TreeGroup, ConfigurationError> {
    let mut members = Vec::with_capacity(group.len());
    let mut seen: BTreeSet<String> = BTreeSet::new();

    for buildpack in &group.buildpacks {
        let member = build_member(buildpack, catalog, path)?;
        for id in member.reachable_ids() {
            if !seen.insert(id.clone()) {
                return Err(ConfigurationError::DuplicateBuildpack {
                    id,
                    context: describe_group(group, path),
                });
            }
        }
        members.push(member);
    }

    Ok(TreeGroup { members })
}

fn build_member(
    buildpack: &BuildpackRef,
    catalog: &dyn BuildpackCatalog,
    path: &mut Vec<String>,
) -> Result<TreeMember, ConfigurationError> {
    if path.contains(&buildpack.id) {
        let mut cycle = path.clone();
        cycle.push(buildpack.id.clone());
        return Err(ConfigurationError::Cycle {
            id: buildpack.id.clone(),
            path: cycle.join(" -> "),
        });
    }

    let node = catalog.lookup(buildpack)?;
    let mut buildpack = buildpack.clone();
    if buildpack.api.is_empty() {
        if let Some(api) = node.api() {
            buildpack.api = api.to_string();
        }
    }

    match node {
        BuildpackNode::Leaf { .. } => Ok(TreeMember::Leaf(buildpack)),
        BuildpackNode::Composite(composite) => {
            if composite.order.is_empty() {
                return Err(ConfigurationError::EmptyOrder { id: buildpack.id });
            }
            path.push(buildpack.id.clone());
            let order = build_order(&composite.order, catalog, path);
            path.pop();
            Ok(TreeMember::Composite {
                buildpack,
                requires: composite.requires,
                provides: composite.provides,
                order: order?,
            })
        }
    }
}

fn describe_group(group: &Group, path: &[String]) -> String {
    let ids = group.ids().join(", ");
    if path.is_empty() {
        format!("group [{}]", ids)
    } else {
        format!("group [{}] inside {}", ids, path.join(" -> "))
    }
}
