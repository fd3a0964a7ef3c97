//! Buildpack descriptors on disk
//!
//! Buildpacks live at `<buildpacks dir>/<escaped id>/<version>/`, each with a
//! `buildpack.toml`. A descriptor that declares `[[order]]` is a composite
//! buildpack; anything else is a leaf with a `bin/detect` executable.

use crate::detect::{
    BuildpackCatalog, BuildpackNode, BuildpackRef, CatalogError, CompositeBuildpack, Group, Order,
};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct Descriptor {
    #[serde(default)]
    api: Option<String>,
    buildpack: DescriptorInfo,
    #[serde(default)]
    order: Vec<Group>,
}

#[derive(Debug, Deserialize)]
struct DescriptorInfo {
    id: String,
}

/// `/` is not allowed in directory names, so IDs like `heroku/nodejs` are
/// stored as `heroku_nodejs`.
pub fn escape_id(id: &str) -> String {
    id.replace('/', "_")
}

pub fn buildpack_dir(buildpacks_dir: &Path, buildpack: &BuildpackRef) -> PathBuf {
    buildpacks_dir
        .join(escape_id(&buildpack.id))
        .join(&buildpack.version)
}

#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BuildpackCatalog for DirectoryCatalog {
    fn lookup(&self, buildpack: &BuildpackRef) -> Result<BuildpackNode, CatalogError> {
        let path = buildpack_dir(&self.root, buildpack).join("buildpack.toml");
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::NotFound {
                    id: buildpack.id.clone(),
                    version: buildpack.version.clone(),
                })
            }
            Err(e) => {
                return Err(CatalogError::InvalidDescriptor {
                    path,
                    message: e.to_string(),
                })
            }
        };

        let descriptor: Descriptor =
            toml::from_str(&contents).map_err(|e| CatalogError::InvalidDescriptor {
                path: path.clone(),
                message: e.to_string(),
            })?;

        if descriptor.buildpack.id != buildpack.id {
            return Err(CatalogError::InvalidDescriptor {
                path,
                message: format!(
                    "declares id {} but was referenced as {}",
                    descriptor.buildpack.id, buildpack.id
                ),
            });
        }

        if descriptor.order.is_empty() {
            Ok(BuildpackNode::Leaf {
                api: descriptor.api,
            })
        } else {
            let mut composite = CompositeBuildpack::new(Order::new(descriptor.order));
            composite.api = descriptor.api;
            Ok(BuildpackNode::Composite(composite))
        }
    }
}
