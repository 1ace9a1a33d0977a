use crate::foundation::core::FrameRange;
use crate::foundation::ids::{AssetId, PipeId, PlacementId, StageId};
use crate::param::value::ParamDomain;
use crate::stream::registry::StreamType;

/// Convenience result type used across renderpath.
pub type RenderPathResult<T> = Result<T, RenderPathError>;

/// Top-level error taxonomy used by crate APIs.
#[derive(thiserror::Error, Debug)]
pub enum RenderPathError {
    /// Invalid user-provided session or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Parameter binding or sampling failure.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// Structural failure while building a fixture or render engine.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Errors when serializing or deserializing boundary data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RenderPathError {
    /// Build a [`RenderPathError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RenderPathError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Parameter failures. All of them are local to the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// Sampling was requested but no source is attached.
    #[error("parameter '{name}' of {owner} has no bound source")]
    UnboundParameter { owner: PlacementId, name: String },

    /// `bind` was called on a parameter that already has a source.
    #[error("parameter '{name}' of {owner} is already bound")]
    AlreadyBound { owner: PlacementId, name: String },

    /// A source or value of the wrong domain was offered.
    #[error("parameter '{name}' expects {expected} values, got {actual}")]
    DomainMismatch {
        name: String,
        expected: ParamDomain,
        actual: ParamDomain,
    },
}

/// Fixture and assembly failures. These are structural and surfaced whole.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A segment has no strategy able to render it.
    #[error(
        "cannot render segment #{segment} interval {range}: incompatible types {}",
        join_types(.types)
    )]
    Unsupported {
        segment: usize,
        range: FrameRange,
        types: Vec<StreamType>,
    },

    /// The assembler was handed a fixture whose strategies were never resolved.
    #[error("segment #{segment} has no resolved strategy")]
    Unresolved { segment: usize },

    #[error("placement '{label}' references unknown asset {asset}")]
    UnknownAsset { label: String, asset: AssetId },

    #[error("placement '{label}' is anchored to unknown placement {anchor}")]
    UnknownAnchor { label: String, anchor: PlacementId },

    #[error("placement '{label}' has a cyclic locator chain")]
    LocatorCycle { label: String },

    #[error("placement '{label}' resolves before the timeline origin")]
    NegativeStart { label: String },

    #[error("model port {0} is already defined in this transaction")]
    DuplicatePort(PipeId),

    #[error("model port {0} is not registered")]
    UnknownPort(PipeId),

    /// Stage input refers to a stage that does not precede it.
    #[error("stage {stage} has dangling input {input}")]
    DanglingInput { stage: StageId, input: StageId },

    /// Producer output type differs from the consumer's declared input type.
    #[error("stage {stage} expects {expected} but is fed {actual}")]
    LinkMismatch {
        stage: StageId,
        expected: StreamType,
        actual: StreamType,
    },
}

fn join_types(types: &[StreamType]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
