use std::fmt;

use xxhash_rust::xxh3::xxh3_64_with_seed;

const LABEL_SEED: u64 = 0x5eed_1ab3_1c0d_e7a1;

/// Index of an asset in the catalog arena. The index is the asset's identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct AssetId(pub u32);

/// Identity of a placed media object, stable across snapshots.
///
/// Derived from the placement label, so removing and re-adding a placement under the same label
/// yields the same identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct PlacementId(pub u64);

impl PlacementId {
    pub fn from_label(label: &str) -> Self {
        Self(xxh3_64_with_seed(label.as_bytes(), LABEL_SEED))
    }
}

/// Identity of an output pipe (model port key).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct PipeId(pub u64);

impl PipeId {
    pub fn from_label(label: &str) -> Self {
        Self(xxh3_64_with_seed(label.as_bytes(), LABEL_SEED ^ 0xff))
    }
}

/// Index of an interned stream type in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamTypeId(pub u32);

/// Index of a stage within one render engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(pub u32);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:016x}", self.0)
    }
}

impl fmt::Display for PipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipe:{:016x}", self.0)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}
