use std::sync::Arc;

use parking_lot::RwLock;

use crate::assembly::assembler::{AssembleOpts, Assembler};
use crate::assembly::engine::RenderEngine;
use crate::assembly::fingerprint::{PlanFingerprint, fingerprint_engine, fingerprint_fixture};
use crate::assembly::preroll::{FrameParams, PrerollOpts, preroll};
use crate::fixture::build::Fixture;
use crate::fixture::ports::{ModelPort, ModelPortRegistry};
use crate::foundation::core::FrameRange;
use crate::foundation::error::{BuildError, RenderPathError, RenderPathResult};
use crate::foundation::ids::PipeId;
use crate::path::manager::PathManager;
use crate::session::snapshot::SessionSnapshot;
use crate::stream::registry::StreamTypeRegistry;

/// Builder configuration; loadable from JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOpts {
    /// Assemble unsupported segments as gaps instead of failing.
    pub partial: bool,
    pub preroll: PrerollOpts,
}

impl BuildOpts {
    pub fn from_json(json: &str) -> RenderPathResult<Self> {
        serde_json::from_str(json).map_err(|e| RenderPathError::serde(e.to_string()))
    }
}

/// Result of a successful build as handed to the render side.
#[derive(Clone, Debug)]
pub struct Published {
    pub fixture: Arc<Fixture>,
    pub engine: Arc<RenderEngine>,
    pub port: ModelPort,
    pub fixture_fingerprint: PlanFingerprint,
    pub engine_fingerprint: PlanFingerprint,
}

/// Entry point of the build: snapshot → fixture → render engine → published model port.
///
/// Published values are immutable and swapped as a whole. A failed build leaves the last
/// publication and the committed model ports untouched.
#[derive(Debug)]
pub struct Builder {
    registry: Arc<StreamTypeRegistry>,
    opts: BuildOpts,
    ports: ModelPortRegistry,
    published: RwLock<Option<Published>>,
}

impl Builder {
    /// Builder using the process-wide stream type registry.
    pub fn new(opts: BuildOpts) -> Self {
        Self::with_registry(StreamTypeRegistry::global(), opts)
    }

    pub fn with_registry(registry: Arc<StreamTypeRegistry>, opts: BuildOpts) -> Self {
        Self {
            registry,
            opts,
            ports: ModelPortRegistry::new(),
            published: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &StreamTypeRegistry {
        &self.registry
    }

    pub fn opts(&self) -> &BuildOpts {
        &self.opts
    }

    pub fn ports(&self) -> &ModelPortRegistry {
        &self.ports
    }

    /// Segment the snapshot and decide every segment's strategy.
    pub fn rebuild(&self, snapshot: &SessionSnapshot) -> Result<Fixture, BuildError> {
        let fixture = Fixture::build(snapshot, &self.registry)?;
        Ok(PathManager::new(&self.registry).resolve(&fixture))
    }

    pub fn assemble(&self, fixture: &Fixture) -> Result<RenderEngine, BuildError> {
        Assembler::new(AssembleOpts {
            partial: self.opts.partial,
        })
        .build(fixture)
    }

    /// Rebuild, assemble and publish in one transaction.
    ///
    /// Segmentation and assembly run without locks; the port transaction and the swap run under
    /// the publication lock, so concurrent builds publish one after the other.
    ///
    /// When the new engine is structurally identical to the published one and binds the same
    /// parameters, the previous publication is kept and returned.
    #[tracing::instrument(skip_all, fields(pipe = %snapshot.output().pipe))]
    pub fn build_and_publish(&self, snapshot: &SessionSnapshot) -> Result<Published, BuildError> {
        let built = self
            .rebuild(snapshot)
            .and_then(|fixture| self.assemble(&fixture).map(|engine| (fixture, engine)));
        let (fixture, engine) = match built {
            Ok(built) => built,
            Err(e) => {
                tracing::warn!(error = %e, "build failed, keeping previous publication");
                return Err(e);
            }
        };
        let fixture_fingerprint = fingerprint_fixture(&fixture);
        let engine_fingerprint = fingerprint_engine(&engine);

        let mut slot = self.published.write();
        let output = snapshot.output();
        self.ports.clear();
        let port = match self
            .ports
            .define_port(output.pipe, &output.label, engine.sink().clone())
        {
            Ok(port) => port,
            Err(e) => {
                self.ports.rollback();
                tracing::warn!(error = %e, "port definition failed, keeping previous publication");
                return Err(e);
            }
        };
        self.ports.commit();
        if let Some(prev) = slot.as_ref()
            && prev.fixture_fingerprint == fixture_fingerprint
            && prev.engine_fingerprint == engine_fingerprint
            && prev.engine.shares_bindings(&engine)
        {
            tracing::info!(fingerprint = %engine_fingerprint, "render engine unchanged");
            return Ok(prev.clone());
        }

        let published = Published {
            fixture: Arc::new(fixture),
            engine: Arc::new(engine),
            port,
            fixture_fingerprint,
            engine_fingerprint,
        };
        *slot = Some(published.clone());
        tracing::info!(
            fingerprint = %engine_fingerprint,
            segments = published.fixture.segments().len(),
            stages = published.engine.stages().len(),
            "published render engine"
        );
        Ok(published)
    }

    /// The last published fixture and engine.
    pub fn current(&self) -> Option<Published> {
        self.published.read().clone()
    }

    pub fn port(&self, pipe: PipeId) -> Result<ModelPort, BuildError> {
        self.ports.get(pipe)
    }

    /// Pre-roll the parameters of the published engine over `range`.
    pub fn preroll(&self, range: FrameRange) -> RenderPathResult<Vec<FrameParams>> {
        let current = self
            .current()
            .ok_or_else(|| RenderPathError::validation("no render engine has been published"))?;
        preroll(&current.engine, range, &self.opts.preroll)
    }
}

#[cfg(test)]
#[path = "../tests/unit/builder.rs"]
mod tests;
