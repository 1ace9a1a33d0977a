use std::sync::Arc;

use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::ids::{AssetId, PlacementId};
use crate::path::strategy::Strategy;
use crate::stream::registry::StreamType;

/// A placement resolved to absolute timeline terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplicitPlacement {
    pub id: PlacementId,
    pub label: Arc<str>,
    pub asset: AssetId,
    /// Whole placement extent after clipping to the timeline, not just the part in one segment.
    pub range: FrameRange,
    pub stream_type: StreamType,
}

impl ExplicitPlacement {
    /// Offset of `t` into the placement's own media.
    pub fn source_offset(&self, t: FrameIndex) -> u64 {
        t.0.saturating_sub(self.range.start.0)
    }
}

/// Maximal interval over which the set of active placements does not change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub range: FrameRange,
    /// Ordered by (start, id).
    pub placements: Vec<ExplicitPlacement>,
    pub strategy: Option<Strategy>,
}

impl Segment {
    pub fn is_gap(&self) -> bool {
        self.placements.is_empty()
    }

    /// Distinct stream types of the active placements, in placement order.
    pub fn stream_types(&self) -> Vec<StreamType> {
        let mut out: Vec<StreamType> = Vec::with_capacity(self.placements.len());
        for p in &self.placements {
            if !out.contains(&p.stream_type) {
                out.push(p.stream_type.clone());
            }
        }
        out
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}
