use std::collections::BTreeMap;

use crate::foundation::core::Fps;
use crate::foundation::error::{RenderPathError, RenderPathResult};
use crate::param::parameter::ParamSpec;
use crate::param::source::ParamSourceDef;
use crate::session::placement::Edge;
use crate::stream::descriptor::StreamDescriptor;

/// Serialized session, the JSON boundary of the crate.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionDef {
    #[serde(default)]
    pub fps: Fps,
    /// Timeline length in frames; defaults to the end of the last placement.
    #[serde(default)]
    pub duration: Option<u64>,
    pub output: OutputDef,
    pub assets: BTreeMap<String, AssetDef>, // stable keys
    #[serde(default)]
    pub placements: Vec<PlacementDef>,
}

impl SessionDef {
    pub fn from_json(json: &str) -> RenderPathResult<Self> {
        serde_json::from_str(json).map_err(|e| RenderPathError::serde(e.to_string()))
    }

    pub fn to_json(&self) -> RenderPathResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RenderPathError::serde(e.to_string()))
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputDef {
    pub pipe: String,
    pub sink: StreamDescriptor,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetDef {
    pub native: StreamDescriptor,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementDef {
    pub id: String,
    pub asset: String, // key into SessionDef.assets
    pub at: LocatorDef,
    pub duration: u64,
    #[serde(default)]
    pub automation: BTreeMap<String, ParamSourceDef>,
}

/// `{"start": 10}` or `{"anchor": "intro", "edge": "end", "offset": -5}`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum LocatorDef {
    Fixed {
        start: u64,
    },
    Relative {
        anchor: String,
        #[serde(default)]
        edge: Edge,
        #[serde(default)]
        offset: i64,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/session/model.rs"]
mod tests;
