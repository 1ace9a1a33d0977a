use std::collections::HashSet;
use std::sync::Arc;

use crate::foundation::core::Fps;
use crate::foundation::error::{RenderPathError, RenderPathResult};
use crate::foundation::ids::{AssetId, PipeId, PlacementId};
use crate::param::parameter::ParamSet;
use crate::session::catalog::{AssetCatalog, AssetLookup, MediaAsset};
use crate::session::model::{LocatorDef, SessionDef};
use crate::session::placement::Locator;
use crate::stream::descriptor::StreamDescriptor;

/// The output the session renders into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputSpec {
    pub pipe: PipeId,
    pub label: Arc<str>,
    pub sink: StreamDescriptor,
}

impl OutputSpec {
    pub fn new(label: &str, sink: StreamDescriptor) -> Self {
        Self {
            pipe: PipeId::from_label(label),
            label: Arc::from(label),
            sink,
        }
    }
}

/// A placed media object together with its parameters.
///
/// Cloning shares the parameters: a clone in a later snapshot is the same object.
#[derive(Clone, Debug)]
pub struct MediaObject {
    pub id: PlacementId,
    pub label: Arc<str>,
    pub asset: AssetId,
    pub locator: Locator,
    pub duration: u64,
    pub params: ParamSet,
}

impl MediaObject {
    /// Instantiate an object of `asset` with one unbound parameter per declared spec.
    pub fn new(label: &str, asset: &MediaAsset, locator: Locator, duration: u64) -> Self {
        let id = PlacementId::from_label(label);
        Self {
            id,
            label: Arc::from(label),
            asset: asset.id,
            locator,
            duration,
            params: ParamSet::instantiate(id, &asset.params),
        }
    }
}

/// Immutable view of the session handed to the build.
///
/// Edits produce new snapshots; objects that survive an edit keep their parameters.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    catalog: Arc<dyn AssetLookup>,
    fps: Fps,
    duration: Option<u64>,
    output: OutputSpec,
    objects: Vec<MediaObject>,
}

impl SessionSnapshot {
    pub fn new(catalog: Arc<dyn AssetLookup>, fps: Fps, output: OutputSpec) -> Self {
        Self {
            catalog,
            fps,
            duration: None,
            output,
            objects: Vec::new(),
        }
    }

    pub fn with_duration(mut self, duration: Option<u64>) -> Self {
        self.duration = duration;
        self
    }

    pub fn from_json(json: &str) -> RenderPathResult<Self> {
        Self::from_def(&SessionDef::from_json(json)?)
    }

    /// Instantiate a snapshot from its serialized form, binding all automation.
    pub fn from_def(def: &SessionDef) -> RenderPathResult<Self> {
        let fps = Fps::new(def.fps.num, def.fps.den)?;
        if def.duration == Some(0) {
            return Err(RenderPathError::validation("duration must be > 0 frames"));
        }
        if def.output.pipe.trim().is_empty() {
            return Err(RenderPathError::validation("output pipe must be non-empty"));
        }

        let mut catalog = AssetCatalog::new();
        for (name, asset) in &def.assets {
            catalog.insert(name.clone(), asset.native.clone(), asset.params.clone())?;
        }

        let mut labels = HashSet::new();
        let mut objects = Vec::with_capacity(def.placements.len());
        for p in &def.placements {
            if p.id.trim().is_empty() {
                return Err(RenderPathError::validation("placement id must be non-empty"));
            }
            if !labels.insert(p.id.as_str()) {
                return Err(RenderPathError::validation(format!(
                    "duplicate placement id '{}'",
                    p.id
                )));
            }
            let asset = catalog.find(&p.asset).ok_or_else(|| {
                RenderPathError::validation(format!(
                    "placement '{}' references unknown asset key '{}'",
                    p.id, p.asset
                ))
            })?;
            let locator = match &p.at {
                LocatorDef::Fixed { start } => Locator::at(*start),
                LocatorDef::Relative {
                    anchor,
                    edge,
                    offset,
                } => Locator::Relative {
                    anchor: PlacementId::from_label(anchor),
                    edge: *edge,
                    offset: *offset,
                },
            };

            let obj = MediaObject::new(&p.id, asset, locator, p.duration);
            for (name, source) in &p.automation {
                let param = obj.params.get(name).ok_or_else(|| {
                    RenderPathError::validation(format!(
                        "placement '{}' automates unknown parameter '{name}'",
                        p.id
                    ))
                })?;
                param.bind_def(source)?;
            }
            objects.push(obj);
        }

        tracing::debug!(
            assets = catalog.len(),
            placements = objects.len(),
            "instantiated session snapshot"
        );

        Ok(Self {
            catalog: Arc::new(catalog),
            fps,
            duration: def.duration,
            output: OutputSpec::new(&def.output.pipe, def.output.sink.clone()),
            objects,
        })
    }

    pub fn catalog(&self) -> &dyn AssetLookup {
        self.catalog.as_ref()
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn duration(&self) -> Option<u64> {
        self.duration
    }

    pub fn output(&self) -> &OutputSpec {
        &self.output
    }

    pub fn objects(&self) -> &[MediaObject] {
        &self.objects
    }

    pub fn object(&self, id: PlacementId) -> Option<&MediaObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Create an object of the asset named `asset` without adding it.
    pub fn instantiate(
        &self,
        label: &str,
        asset: &str,
        locator: Locator,
        duration: u64,
    ) -> RenderPathResult<MediaObject> {
        let asset = self.catalog.find(asset).ok_or_else(|| {
            RenderPathError::validation(format!("unknown asset key '{asset}'"))
        })?;
        Ok(MediaObject::new(label, asset, locator, duration))
    }

    /// Copy of this snapshot with `obj` added, replacing any object with the same identity.
    pub fn with_placement(&self, obj: MediaObject) -> Self {
        let mut next = self.clone();
        match next.objects.iter_mut().find(|o| o.id == obj.id) {
            Some(slot) => *slot = obj,
            None => next.objects.push(obj),
        }
        next
    }

    /// Copy of this snapshot without the object `id`.
    pub fn without_placement(&self, id: PlacementId) -> Self {
        let mut next = self.clone();
        next.objects.retain(|o| o.id != id);
        next
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/snapshot.rs"]
mod tests;
