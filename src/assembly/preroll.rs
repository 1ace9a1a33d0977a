use rayon::prelude::*;

use crate::assembly::engine::RenderEngine;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ParamError, RenderPathError, RenderPathResult};
use crate::foundation::ids::PlacementId;
use crate::param::value::ParamValue;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PrerollOpts {
    pub parallel: bool,
    pub chunk_size: usize,
    pub threads: Option<usize>,
}

impl Default for PrerollOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SampledParam {
    pub owner: PlacementId,
    pub name: String,
    pub value: ParamValue,
    /// `true` when the value is the declared default of an unbound parameter.
    pub defaulted: bool,
}

/// Parameter values needed to render one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameParams {
    pub frame: FrameIndex,
    pub values: Vec<SampledParam>,
    /// Unbound parameters without a default, as `(owner, name)`.
    pub unbound: Vec<(PlacementId, String)>,
}

/// Sample every parameter feeding the output of each frame in `range`.
///
/// Frames beyond the engine extent are skipped. Parallel and sequential runs give identical results.
#[tracing::instrument(skip(engine, opts), fields(parallel = opts.parallel))]
pub fn preroll(
    engine: &RenderEngine,
    range: FrameRange,
    opts: &PrerollOpts,
) -> RenderPathResult<Vec<FrameParams>> {
    let range = range.clip_to(FrameRange::from_frames(0, engine.extent().0));
    if range.is_empty() {
        return Ok(Vec::new());
    }

    if !opts.parallel {
        return (range.start.0..range.end.0)
            .map(|f| sample_frame(engine, FrameIndex(f)))
            .collect();
    }

    let pool = build_thread_pool(opts.threads)?;
    let chunk_size = normalized_chunk_size(opts.chunk_size);
    let mut out = Vec::with_capacity(range.len_frames() as usize);
    let mut chunk_start = range.start.0;
    while chunk_start < range.end.0 {
        let chunk_end = chunk_start.saturating_add(chunk_size).min(range.end.0);
        let frames: Vec<u64> = (chunk_start..chunk_end).collect();
        let sampled = pool.install(|| {
            frames
                .par_iter()
                .map(|f| sample_frame(engine, FrameIndex(*f)))
                .collect::<Vec<_>>()
        });
        for item in sampled {
            out.push(item?);
        }
        chunk_start = chunk_end;
    }
    Ok(out)
}

fn sample_frame(engine: &RenderEngine, t: FrameIndex) -> RenderPathResult<FrameParams> {
    let mut frame = FrameParams {
        frame: t,
        values: Vec::new(),
        unbound: Vec::new(),
    };
    let Some(output) = engine.output_at(t) else {
        return Ok(frame);
    };
    for stage in engine.upstream(output.stage) {
        for binding in &stage.params {
            let owner = binding.param.owner();
            let name = binding.param.name().to_owned();
            match binding.param.sample(t) {
                Ok(value) => frame.values.push(SampledParam {
                    owner,
                    name,
                    value,
                    defaulted: false,
                }),
                Err(ParamError::UnboundParameter { .. }) => match binding.default {
                    Some(value) => frame.values.push(SampledParam {
                        owner,
                        name,
                        value,
                        defaulted: true,
                    }),
                    None => frame.unbound.push((owner, name)),
                },
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(frame)
}

fn build_thread_pool(threads: Option<usize>) -> RenderPathResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(RenderPathError::validation(
            "preroll 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assembly/preroll.rs"]
mod tests;
