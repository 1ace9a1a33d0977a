use crate::fixture::build::Fixture;
use crate::fixture::segment::Segment;
use crate::path::strategy::Strategy;
use crate::stream::conversion::Conversion;
use crate::stream::registry::{StreamType, StreamTypeRegistry};

/// Chooses a render strategy per segment from stream type compatibility alone.
#[derive(Clone, Copy, Debug)]
pub struct PathManager<'r> {
    registry: &'r StreamTypeRegistry,
}

impl<'r> PathManager<'r> {
    pub fn new(registry: &'r StreamTypeRegistry) -> Self {
        Self { registry }
    }

    /// Strategy for rendering `segment` into `sink`. Depends only on the arguments.
    pub fn decide(&self, segment: &Segment, sink: &StreamType) -> Strategy {
        match segment.placements.as_slice() {
            [] => Strategy::Gap,
            [only] if only.stream_type == *sink => Strategy::DirectPassthrough { source: only.id },
            [only] => match self.registry.conversion(&only.stream_type, sink) {
                Some(conversion) => Strategy::SingleSourceTranscode {
                    source: only.id,
                    conversion,
                },
                None => unsupported(segment, sink),
            },
            many => {
                let types: Vec<&StreamType> = many.iter().map(|p| &p.stream_type).collect();
                let candidates = std::iter::once(sink.clone()).chain(segment.stream_types());
                let mut best: Option<(u32, Strategy)> = None;
                for composite in candidates {
                    let Some((cost, strategy)) = self.composite_via(&types, composite, sink) else {
                        continue;
                    };
                    // Strict `<` keeps the earliest candidate on ties.
                    if best.as_ref().is_none_or(|(c, _)| cost < *c) {
                        best = Some((cost, strategy));
                    }
                }
                best.map_or_else(|| unsupported(segment, sink), |(_, s)| s)
            }
        }
    }

    /// New fixture with every segment's strategy decided.
    #[tracing::instrument(skip_all, fields(segments = fixture.segments().len()))]
    pub fn resolve(&self, fixture: &Fixture) -> Fixture {
        let segments = fixture
            .segments()
            .iter()
            .map(|seg| {
                let strategy = self.decide(seg, fixture.sink());
                if !strategy.is_supported() {
                    tracing::warn!(
                        segment = seg.index,
                        range = %seg.range,
                        "no render path for segment"
                    );
                }
                seg.clone().with_strategy(strategy)
            })
            .collect();
        fixture.with_segments(segments)
    }

    fn composite_via(
        &self,
        types: &[&StreamType],
        composite: StreamType,
        sink: &StreamType,
    ) -> Option<(u32, Strategy)> {
        let output = self.registry.conversion(&composite, sink)?;
        let inputs = types
            .iter()
            .map(|t| {
                self.registry
                    .conversion(t, &composite)
                    .map(|c| ((*t).clone(), c))
            })
            .collect::<Option<Vec<(StreamType, Conversion)>>>()?;
        let cost = inputs.iter().map(|(_, c)| c.cost()).sum::<u32>() + output.cost();
        Some((
            cost,
            Strategy::MultiSourceComposite {
                composite,
                inputs,
                output,
            },
        ))
    }
}

fn unsupported(segment: &Segment, sink: &StreamType) -> Strategy {
    let mut types = segment.stream_types();
    if !types.contains(sink) {
        types.push(sink.clone());
    }
    Strategy::Unsupported { types }
}

#[cfg(test)]
#[path = "../../tests/unit/path/manager.rs"]
mod tests;
