use smallvec::SmallVec;

use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::BuildError;
use crate::foundation::ids::{AssetId, PlacementId, StageId};
use crate::param::parameter::AnyParameter;
use crate::param::value::ParamValue;
use crate::stream::conversion::Conversion;
use crate::stream::registry::StreamType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageKind {
    /// Reads the media of one placement, starting `source_offset` frames into it.
    Source {
        placement: PlacementId,
        asset: AssetId,
        source_offset: u64,
    },
    Transcode {
        conversion: Conversion,
    },
    /// Mixes all inputs, which share one stream type.
    Composite,
    /// Silence or black in the output type.
    Gap,
}

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Source { .. } => "source",
            Self::Transcode { .. } => "transcode",
            Self::Composite => "composite",
            Self::Gap => "gap",
        }
    }
}

/// A parameter of a media object, shared with the stage that renders it.
#[derive(Clone, Debug)]
pub struct ParamBinding {
    pub param: AnyParameter,
    pub default: Option<ParamValue>,
}

#[derive(Clone, Debug)]
pub struct Stage {
    pub id: StageId,
    pub segment: usize,
    pub range: FrameRange,
    pub kind: StageKind,
    /// Producer stages, parallel to `input_types`.
    pub inputs: SmallVec<[StageId; 4]>,
    pub input_types: SmallVec<[StreamType; 4]>,
    pub output: StreamType,
    pub params: Vec<ParamBinding>,
}

/// The stage whose output renders one segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentOutput {
    pub segment: usize,
    pub range: FrameRange,
    pub stage: StageId,
    pub strategy: &'static str,
}

/// Executable render graph for a whole fixture.
///
/// Stages are stored in topological order: every input of a stage precedes it. Segment outputs
/// are ordered along the timeline and all produce the sink type.
#[derive(Clone, Debug)]
pub struct RenderEngine {
    pub(crate) sink: StreamType,
    pub(crate) stages: Vec<Stage>,
    pub(crate) outputs: Vec<SegmentOutput>,
    pub(crate) skipped: Vec<usize>,
}

impl RenderEngine {
    pub fn sink(&self) -> &StreamType {
        &self.sink
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stages.get(id.0 as usize)
    }

    pub fn outputs(&self) -> &[SegmentOutput] {
        &self.outputs
    }

    /// Segments replaced by gap stages during partial assembly.
    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }

    pub fn extent(&self) -> FrameIndex {
        self.outputs
            .last()
            .map_or(FrameIndex(0), |o| o.range.end)
    }

    pub fn output_at(&self, t: FrameIndex) -> Option<&SegmentOutput> {
        let idx = self.outputs.partition_point(|o| o.range.end <= t);
        self.outputs.get(idx).filter(|o| o.range.contains(t))
    }

    /// All stages feeding `stage`, itself included, in stage order.
    pub fn upstream(&self, stage: StageId) -> Vec<&Stage> {
        let mut seen = vec![false; self.stages.len()];
        let mut todo = vec![stage];
        while let Some(id) = todo.pop() {
            let Some(s) = self.stage(id) else { continue };
            if std::mem::replace(&mut seen[id.0 as usize], true) {
                continue;
            }
            todo.extend(s.inputs.iter().copied());
        }
        self.stages
            .iter()
            .filter(|s| seen[s.id.0 as usize])
            .collect()
    }

    /// `true` if both engines bind the very same parameter instances, stage by stage.
    pub fn shares_bindings(&self, other: &RenderEngine) -> bool {
        self.stages.len() == other.stages.len()
            && self.stages.iter().zip(&other.stages).all(|(a, b)| {
                a.params.len() == b.params.len()
                    && a
                        .params
                        .iter()
                        .zip(&b.params)
                        .all(|(x, y)| x.param.same_instance(&y.param))
            })
    }

    /// Check the graph is closed and every link is type-correct.
    pub fn validate(&self) -> Result<(), BuildError> {
        for stage in &self.stages {
            debug_assert_eq!(stage.inputs.len(), stage.input_types.len());
            for (input, expected) in stage.inputs.iter().zip(&stage.input_types) {
                if input.0 >= stage.id.0 {
                    return Err(BuildError::DanglingInput {
                        stage: stage.id,
                        input: *input,
                    });
                }
                let producer = self.stage(*input).ok_or(BuildError::DanglingInput {
                    stage: stage.id,
                    input: *input,
                })?;
                if producer.output != *expected {
                    return Err(BuildError::LinkMismatch {
                        stage: stage.id,
                        expected: expected.clone(),
                        actual: producer.output.clone(),
                    });
                }
            }
        }
        for out in &self.outputs {
            let stage = self.stage(out.stage).ok_or(BuildError::DanglingInput {
                stage: out.stage,
                input: out.stage,
            })?;
            if stage.output != self.sink {
                return Err(BuildError::LinkMismatch {
                    stage: stage.id,
                    expected: self.sink.clone(),
                    actual: stage.output.clone(),
                });
            }
        }
        Ok(())
    }

    /// Deterministic text form, stable across runs.
    pub fn dump(&self) -> String {
        let mut s = String::new();
        s.push_str("RenderEngine\n");
        s.push_str(&format!("sink: {}\n", self.sink));
        s.push_str(&format!("stages: {}\n", self.stages.len()));
        for st in &self.stages {
            s.push_str(&format!(
                "  {}: seg=#{} {} {}",
                st.id,
                st.segment,
                st.range,
                st.kind.name()
            ));
            match &st.kind {
                StageKind::Source {
                    placement,
                    source_offset,
                    ..
                } => s.push_str(&format!(" {placement}+{source_offset}")),
                StageKind::Transcode { conversion } => s.push_str(&format!(" {conversion}")),
                StageKind::Composite | StageKind::Gap => {}
            }
            let inputs = st
                .inputs
                .iter()
                .map(ToString::to_string)
                .collect::<SmallVec<[String; 4]>>();
            s.push_str(&format!(" inputs=[{}] -> {}", inputs.join(","), st.output));
            if !st.params.is_empty() {
                let names = st
                    .params
                    .iter()
                    .map(|b| b.param.name())
                    .collect::<Vec<_>>();
                s.push_str(&format!(" params=[{}]", names.join(",")));
            }
            s.push('\n');
        }
        s.push_str(&format!("outputs: {}\n", self.outputs.len()));
        for o in &self.outputs {
            s.push_str(&format!(
                "  #{} {} {} <- {}\n",
                o.segment, o.range, o.strategy, o.stage
            ));
        }
        if !self.skipped.is_empty() {
            s.push_str(&format!("skipped: {:?}\n", self.skipped));
        }
        s
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assembly/engine.rs"]
mod tests;
