use smallvec::{SmallVec, smallvec};

use crate::assembly::engine::{ParamBinding, RenderEngine, SegmentOutput, Stage, StageKind};
use crate::fixture::build::Fixture;
use crate::fixture::segment::{ExplicitPlacement, Segment};
use crate::foundation::error::BuildError;
use crate::foundation::ids::{PlacementId, StageId};
use crate::path::strategy::Strategy;
use crate::stream::conversion::Conversion;
use crate::stream::registry::StreamType;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AssembleOpts {
    /// Replace unsupported segments by gap stages instead of failing.
    pub partial: bool,
}

/// Wires the stages of every segment of a resolved fixture into one render engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Assembler {
    opts: AssembleOpts,
}

impl Assembler {
    pub fn new(opts: AssembleOpts) -> Self {
        Self { opts }
    }

    #[tracing::instrument(skip_all, fields(segments = fixture.segments().len(), partial = self.opts.partial))]
    pub fn build(&self, fixture: &Fixture) -> Result<RenderEngine, BuildError> {
        let mut wiring = Wiring {
            fixture,
            stages: Vec::new(),
        };
        let mut outputs: Vec<SegmentOutput> = Vec::with_capacity(fixture.segments().len());
        let mut skipped = Vec::new();

        for seg in fixture.segments() {
            let strategy = seg
                .strategy
                .as_ref()
                .ok_or(BuildError::Unresolved { segment: seg.index })?;
            let out = match strategy {
                Strategy::Gap => wiring.gap(seg),
                Strategy::DirectPassthrough { source } => {
                    let p = placement(seg, *source)?;
                    wiring.source(seg, p)
                }
                Strategy::SingleSourceTranscode { source, conversion } => {
                    let p = placement(seg, *source)?;
                    let src = wiring.source(seg, p);
                    wiring.transcode(seg, src, conversion, fixture.sink())
                }
                Strategy::MultiSourceComposite {
                    composite,
                    inputs,
                    output,
                } => {
                    if inputs.len() != seg.placements.len() {
                        return Err(BuildError::Unresolved { segment: seg.index });
                    }
                    let mut mixed: SmallVec<[StageId; 4]> = SmallVec::new();
                    for (p, (_, conversion)) in seg.placements.iter().zip(inputs) {
                        let src = wiring.source(seg, p);
                        mixed.push(wiring.transcode(seg, src, conversion, composite));
                    }
                    let mix = wiring.composite(seg, mixed, composite);
                    wiring.transcode(seg, mix, output, fixture.sink())
                }
                Strategy::Unsupported { types } => {
                    if !self.opts.partial {
                        return Err(BuildError::Unsupported {
                            segment: seg.index,
                            range: seg.range,
                            types: types.clone(),
                        });
                    }
                    tracing::warn!(
                        segment = seg.index,
                        range = %seg.range,
                        "skipping unsupported segment"
                    );
                    skipped.push(seg.index);
                    wiring.gap(seg)
                }
            };

            // Link check against the previous segment's output.
            let produced = &wiring.stages[out.0 as usize].output;
            let expected = outputs
                .last()
                .map_or(fixture.sink(), |prev| &wiring.stages[prev.stage.0 as usize].output);
            if produced != expected {
                return Err(BuildError::LinkMismatch {
                    stage: out,
                    expected: expected.clone(),
                    actual: produced.clone(),
                });
            }
            outputs.push(SegmentOutput {
                segment: seg.index,
                range: seg.range,
                stage: out,
                strategy: if skipped.last() == Some(&seg.index) {
                    Strategy::Gap.kind_name()
                } else {
                    strategy.kind_name()
                },
            });
        }

        let engine = RenderEngine {
            sink: fixture.sink().clone(),
            stages: wiring.stages,
            outputs,
            skipped,
        };
        engine.validate()?;
        tracing::debug!(
            stages = engine.stages.len(),
            skipped = engine.skipped.len(),
            "assembled render engine"
        );
        Ok(engine)
    }
}

fn placement(seg: &Segment, id: PlacementId) -> Result<&ExplicitPlacement, BuildError> {
    seg.placements
        .iter()
        .find(|p| p.id == id)
        .ok_or(BuildError::Unresolved { segment: seg.index })
}

struct Wiring<'f> {
    fixture: &'f Fixture,
    stages: Vec<Stage>,
}

impl Wiring<'_> {
    fn push(
        &mut self,
        seg: &Segment,
        kind: StageKind,
        inputs: SmallVec<[StageId; 4]>,
        output: StreamType,
        params: Vec<ParamBinding>,
    ) -> StageId {
        let id = StageId(self.stages.len() as u32);
        let input_types = inputs
            .iter()
            .map(|i| self.stages[i.0 as usize].output.clone())
            .collect();
        self.stages.push(Stage {
            id,
            segment: seg.index,
            range: seg.range,
            kind,
            inputs,
            input_types,
            output,
            params,
        });
        id
    }

    fn gap(&mut self, seg: &Segment) -> StageId {
        let sink = self.fixture.sink().clone();
        self.push(seg, StageKind::Gap, SmallVec::new(), sink, Vec::new())
    }

    fn source(&mut self, seg: &Segment, p: &ExplicitPlacement) -> StageId {
        let params = self
            .fixture
            .params_of(p.id)
            .map(|set| {
                set.iter()
                    .map(|e| ParamBinding {
                        param: e.param.clone(),
                        default: e.default,
                    })
                    .collect()
            })
            .unwrap_or_default();
        let kind = StageKind::Source {
            placement: p.id,
            asset: p.asset,
            source_offset: p.source_offset(seg.range.start),
        };
        self.push(seg, kind, SmallVec::new(), p.stream_type.clone(), params)
    }

    /// Convert the output of `input` to `to`. No stage is added when the input already has type `to`.
    fn transcode(
        &mut self,
        seg: &Segment,
        input: StageId,
        conversion: &Conversion,
        to: &StreamType,
    ) -> StageId {
        if conversion.is_identity() && self.stages[input.0 as usize].output == *to {
            return input;
        }
        let kind = StageKind::Transcode {
            conversion: conversion.clone(),
        };
        self.push(seg, kind, smallvec![input], to.clone(), Vec::new())
    }

    fn composite(
        &mut self,
        seg: &Segment,
        inputs: SmallVec<[StageId; 4]>,
        ty: &StreamType,
    ) -> StageId {
        self.push(seg, StageKind::Composite, inputs, ty.clone(), Vec::new())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assembly/assembler.rs"]
mod tests;
