use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::fixture::segment::{ExplicitPlacement, Segment};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::BuildError;
use crate::foundation::ids::PlacementId;
use crate::param::parameter::ParamSet;
use crate::session::placement::resolve_placements;
use crate::session::snapshot::SessionSnapshot;
use crate::stream::registry::{StreamType, StreamTypeRegistry};

/// Immutable, time-partitioned execution plan of a session.
///
/// Segments are contiguous, ordered and cover `[0, extent)` exactly. A fixture is never edited in
/// place; resolving strategies produces a new one.
#[derive(Clone, Debug)]
pub struct Fixture {
    extent: FrameIndex,
    sink: StreamType,
    segments: Vec<Segment>,
    params: Arc<BTreeMap<PlacementId, ParamSet>>,
}

impl PartialEq for Fixture {
    fn eq(&self, other: &Self) -> bool {
        self.extent == other.extent && self.sink == other.sink && self.segments == other.segments
    }
}

impl Eq for Fixture {}

impl Fixture {
    /// Cut the session timeline into segments of constant placement sets.
    #[tracing::instrument(skip_all, fields(placements = snapshot.objects().len()))]
    pub fn build(
        snapshot: &SessionSnapshot,
        registry: &StreamTypeRegistry,
    ) -> Result<Self, BuildError> {
        let sink = registry.classify(&snapshot.output().sink);
        let mut placements = resolve_placements(snapshot, registry)?;

        let extent = snapshot.duration().unwrap_or_else(|| {
            placements
                .iter()
                .map(|p| p.range.end.0)
                .max()
                .unwrap_or(0)
        });
        let bounds = FrameRange::from_frames(0, extent);
        for p in &mut placements {
            p.range = p.range.clip_to(bounds);
        }
        // Zero-length placements at the extent lie outside every segment.
        placements.retain(|p| !p.range.is_empty() || p.range.start.0 < extent);
        placements.sort_by_key(|p| (p.range.start, p.id));

        let mut cuts = BTreeSet::from([0, extent]);
        for p in placements.iter().filter(|p| !p.range.is_empty()) {
            cuts.insert(p.range.start.0);
            cuts.insert(p.range.end.0);
        }
        let cuts: Vec<u64> = cuts.into_iter().collect();

        // Every interior cut starts or ends a non-empty placement, so adjacent intervals always
        // differ and each interval is already a maximal segment.
        let mut segments: Vec<Segment> = Vec::with_capacity(cuts.len().saturating_sub(1));
        for w in cuts.windows(2) {
            let (t0, t1) = (w[0], w[1]);
            // Sorted by start, so only a prefix can be active.
            let candidates = placements.partition_point(|p| p.range.start.0 < t1);
            let active: Vec<ExplicitPlacement> = placements[..candidates]
                .iter()
                .filter(|p| {
                    if p.range.is_empty() {
                        t0 <= p.range.start.0
                    } else {
                        p.range.start.0 <= t0 && t0 < p.range.end.0
                    }
                })
                .cloned()
                .collect();
            segments.push(Segment {
                index: segments.len(),
                range: FrameRange::from_frames(t0, t1),
                placements: active,
                strategy: None,
            });
        }

        let params = snapshot
            .objects()
            .iter()
            .map(|o| (o.id, o.params.clone()))
            .collect();

        tracing::debug!(extent, segments = segments.len(), "built fixture");
        Ok(Self {
            extent: FrameIndex(extent),
            sink,
            segments,
            params: Arc::new(params),
        })
    }

    pub fn extent(&self) -> FrameIndex {
        self.extent
    }

    pub fn sink(&self) -> &StreamType {
        &self.sink
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_at(&self, t: FrameIndex) -> Option<&Segment> {
        let idx = self.segments.partition_point(|s| s.range.end <= t);
        self.segments.get(idx).filter(|s| s.range.contains(t))
    }

    /// Parameters of the object placed as `id`.
    pub fn params_of(&self, id: PlacementId) -> Option<&ParamSet> {
        self.params.get(&id)
    }

    /// `true` once every segment carries a strategy.
    pub fn is_resolved(&self) -> bool {
        self.segments.iter().all(|s| s.strategy.is_some())
    }

    /// Same fixture with new segments; extent, sink and parameters are shared.
    pub(crate) fn with_segments(&self, segments: Vec<Segment>) -> Self {
        Self {
            extent: self.extent,
            sink: self.sink.clone(),
            segments,
            params: Arc::clone(&self.params),
        }
    }

    /// Deterministic text form, stable across runs.
    pub fn dump(&self) -> String {
        let mut s = String::new();
        s.push_str("Fixture\n");
        s.push_str(&format!("extent: {}\n", self.extent));
        s.push_str(&format!("sink: {}\n", self.sink));
        s.push_str(&format!("segments: {}\n", self.segments.len()));
        for seg in &self.segments {
            let strategy = seg
                .strategy
                .as_ref()
                .map_or_else(|| "unresolved".to_owned(), ToString::to_string);
            s.push_str(&format!("  #{} {} {}\n", seg.index, seg.range, strategy));
            for p in &seg.placements {
                s.push_str(&format!(
                    "    {} '{}' {} {}\n",
                    p.id, p.label, p.range, p.stream_type
                ));
            }
        }
        s
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fixture/build.rs"]
mod tests;
