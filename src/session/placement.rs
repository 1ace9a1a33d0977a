use std::collections::HashMap;
use std::sync::Arc;

use crate::fixture::segment::ExplicitPlacement;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::BuildError;
use crate::foundation::ids::PlacementId;
use crate::session::snapshot::{MediaObject, SessionSnapshot};
use crate::stream::registry::StreamTypeRegistry;

/// Which edge of the anchor placement a relative locator attaches to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Start,
    #[default]
    End,
}

/// Where a placement starts on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Locator {
    Fixed {
        start: FrameIndex,
    },
    /// `offset` frames after (or before, when negative) an edge of another placement.
    Relative {
        anchor: PlacementId,
        edge: Edge,
        offset: i64,
    },
}

impl Locator {
    pub fn at(start: u64) -> Self {
        Self::Fixed {
            start: FrameIndex(start),
        }
    }

    pub fn after(anchor: PlacementId) -> Self {
        Self::Relative {
            anchor,
            edge: Edge::End,
            offset: 0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Mark {
    Unvisited,
    Visiting,
    Done(u64),
}

/// Resolves locator chains to absolute start frames, memoising every start it computes.
struct LocatorResolver<'a> {
    objects: &'a [MediaObject],
    index: HashMap<PlacementId, usize>,
    marks: Vec<Mark>,
}

impl<'a> LocatorResolver<'a> {
    fn new(objects: &'a [MediaObject]) -> Self {
        Self {
            objects,
            index: objects
                .iter()
                .enumerate()
                .map(|(i, o)| (o.id, i))
                .collect(),
            marks: vec![Mark::Unvisited; objects.len()],
        }
    }

    fn start_of(&mut self, idx: usize) -> Result<u64, BuildError> {
        // Walk anchors until a fixed or already resolved placement, then unwind.
        let mut chain: Vec<(usize, Edge, i64)> = Vec::new();
        let mut cur = idx;
        let (mut anchor, mut anchor_start) = loop {
            match self.marks[cur] {
                Mark::Done(start) => break (cur, start),
                Mark::Visiting => {
                    return Err(BuildError::LocatorCycle {
                        label: self.objects[cur].label.to_string(),
                    });
                }
                Mark::Unvisited => {}
            }
            let obj = &self.objects[cur];
            match obj.locator {
                Locator::Fixed { start } => {
                    self.marks[cur] = Mark::Done(start.0);
                    break (cur, start.0);
                }
                Locator::Relative {
                    anchor,
                    edge,
                    offset,
                } => {
                    let next = *self
                        .index
                        .get(&anchor)
                        .ok_or_else(|| BuildError::UnknownAnchor {
                            label: obj.label.to_string(),
                            anchor,
                        })?;
                    self.marks[cur] = Mark::Visiting;
                    chain.push((cur, edge, offset));
                    cur = next;
                }
            }
        };

        for &(i, edge, offset) in chain.iter().rev() {
            let edge_frame = match edge {
                Edge::Start => anchor_start,
                Edge::End => anchor_start.saturating_add(self.objects[anchor].duration),
            };
            let start = i128::from(edge_frame) + i128::from(offset);
            if start < 0 {
                return Err(BuildError::NegativeStart {
                    label: self.objects[i].label.to_string(),
                });
            }
            let start = u64::try_from(start).unwrap_or(u64::MAX);
            self.marks[i] = Mark::Done(start);
            anchor = i;
            anchor_start = start;
        }
        Ok(anchor_start)
    }
}

/// Resolve every placement of `snapshot` into absolute timeline terms, in snapshot order.
pub(crate) fn resolve_placements(
    snapshot: &SessionSnapshot,
    registry: &StreamTypeRegistry,
) -> Result<Vec<ExplicitPlacement>, BuildError> {
    let objects = snapshot.objects();
    let mut resolver = LocatorResolver::new(objects);
    let mut out = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        let asset =
            snapshot
                .catalog()
                .lookup(obj.asset)
                .ok_or_else(|| BuildError::UnknownAsset {
                    label: obj.label.to_string(),
                    asset: obj.asset,
                })?;
        let start = resolver.start_of(i)?;
        out.push(ExplicitPlacement {
            id: obj.id,
            label: Arc::clone(&obj.label),
            asset: obj.asset,
            range: FrameRange::from_frames(start, start.saturating_add(obj.duration)),
            stream_type: registry.classify(&asset.native),
        });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/session/placement.rs"]
mod tests;
