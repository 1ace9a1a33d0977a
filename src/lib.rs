//! renderpath turns an editable audio/video timeline into an executable render graph.
//!
//! The build runs in three steps:
//!
//! - [`Fixture::build`] cuts a [`SessionSnapshot`] into segments of constant placement sets
//! - [`PathManager::resolve`] picks a [`Strategy`] per segment from [`StreamType`] compatibility
//! - [`Assembler::build`] wires the stages of every segment into one [`RenderEngine`]
//!
//! [`Builder`] strings the steps together and publishes the result under a model port.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod assembly;
pub(crate) mod builder;
pub(crate) mod fixture;
pub(crate) mod param;
pub(crate) mod path;
pub(crate) mod session;
pub(crate) mod stream;

pub use crate::foundation::core::{Fps, FrameIndex, FrameRange};
pub use crate::foundation::error::{BuildError, ParamError, RenderPathError, RenderPathResult};
pub use crate::foundation::ids::{AssetId, PipeId, PlacementId, StageId, StreamTypeId};

pub use crate::stream::conversion::{
    Conversion, ConversionRule, ConversionStep, StructuralConversions,
};
pub use crate::stream::descriptor::{
    AudioFormat, ChannelLayout, MediaKind, PixelFormat, Rate, SampleFormat, Scan,
    StreamDescriptor, Structure, VideoFormat,
};
pub use crate::stream::registry::{StreamType, StreamTypeRegistry};

pub use crate::param::parameter::{AnyParameter, ParamEntry, ParamSet, ParamSpec, Parameter};
pub use crate::param::source::{
    Automation, Ease, Interp, Key, ParamSource, ParamSourceDef, TimeFn,
};
pub use crate::param::value::{ParamDomain, ParamKind, ParamValue};

pub use crate::session::catalog::{AssetCatalog, AssetLookup, MediaAsset};
pub use crate::session::model::{AssetDef, LocatorDef, OutputDef, PlacementDef, SessionDef};
pub use crate::session::placement::{Edge, Locator};
pub use crate::session::snapshot::{MediaObject, OutputSpec, SessionSnapshot};

pub use crate::fixture::build::Fixture;
pub use crate::fixture::ports::{ModelPort, ModelPortRegistry};
pub use crate::fixture::segment::{ExplicitPlacement, Segment};

pub use crate::path::manager::PathManager;
pub use crate::path::strategy::Strategy;

pub use crate::assembly::assembler::{AssembleOpts, Assembler};
pub use crate::assembly::engine::{
    ParamBinding, RenderEngine, SegmentOutput, Stage, StageKind,
};
pub use crate::assembly::fingerprint::{PlanFingerprint, fingerprint_engine, fingerprint_fixture};
pub use crate::assembly::preroll::{FrameParams, PrerollOpts, SampledParam, preroll};

pub use crate::builder::{BuildOpts, Builder, Published};
