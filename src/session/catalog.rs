use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;

use crate::foundation::error::{RenderPathError, RenderPathResult};
use crate::foundation::ids::AssetId;
use crate::param::parameter::ParamSpec;
use crate::stream::descriptor::StreamDescriptor;

/// A media asset as seen by the build: its native stream format and the controls it exposes.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaAsset {
    pub id: AssetId,
    pub name: String,
    pub native: StreamDescriptor,
    pub params: Vec<ParamSpec>,
}

/// Read-only access to assets by identity.
pub trait AssetLookup: Send + Sync + fmt::Debug {
    fn lookup(&self, id: AssetId) -> Option<&MediaAsset>;

    fn find(&self, name: &str) -> Option<&MediaAsset>;
}

/// Arena of assets. The arena index is the asset identity; entries are never removed.
#[derive(Clone, Debug, Default)]
pub struct AssetCatalog {
    assets: Vec<MediaAsset>,
    by_name: HashMap<String, AssetId>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        native: StreamDescriptor,
        params: Vec<ParamSpec>,
    ) -> RenderPathResult<AssetId> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RenderPathError::validation("asset name must be non-empty"));
        }
        if self.by_name.contains_key(&name) {
            return Err(RenderPathError::validation(format!(
                "asset '{name}' is already registered"
            )));
        }
        let mut seen = HashSet::new();
        for spec in &params {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(RenderPathError::validation(format!(
                    "asset '{name}' declares parameter '{}' twice",
                    spec.name
                )));
            }
        }

        let params = params
            .into_iter()
            .map(|spec| ParamSpec {
                default: spec.domain_default(),
                ..spec
            })
            .collect();
        let id = AssetId(self.assets.len() as u32);
        self.assets.push(MediaAsset {
            id,
            name: name.clone(),
            native,
            params,
        });
        self.by_name.insert(name, id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaAsset> {
        self.assets.iter()
    }
}

impl AssetLookup for AssetCatalog {
    fn lookup(&self, id: AssetId) -> Option<&MediaAsset> {
        self.assets.get(id.0 as usize)
    }

    fn find(&self, name: &str) -> Option<&MediaAsset> {
        self.by_name.get(name).and_then(|id| self.lookup(*id))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/catalog.rs"]
mod tests;
