use xxhash_rust::xxh3::Xxh3;

use crate::assembly::engine::{RenderEngine, StageKind};
use crate::fixture::build::Fixture;
use crate::foundation::core::FrameRange;
use crate::path::strategy::Strategy;
use crate::stream::conversion::Conversion;
use crate::stream::registry::StreamType;

const XXH3_SEED: u64 = 0x6d0c_5e7a_91f2_b3c4;

/// 128-bit structural fingerprint of a fixture or engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlanFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl std::fmt::Display for PlanFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

pub fn fingerprint_fixture(fixture: &Fixture) -> PlanFingerprint {
    let mut h = StableHasher::new();
    h.write_u8(0);
    h.write_u64(fixture.extent().0);
    write_type(&mut h, fixture.sink());
    h.write_u32(fixture.segments().len() as u32);
    for seg in fixture.segments() {
        write_range(&mut h, seg.range);
        h.write_u32(seg.placements.len() as u32);
        for p in &seg.placements {
            h.write_u64(p.id.0);
            h.write_u32(p.asset.0);
            write_range(&mut h, p.range);
            write_type(&mut h, &p.stream_type);
        }
        match &seg.strategy {
            None => h.write_u8(0),
            Some(s) => {
                h.write_u8(1);
                write_strategy(&mut h, s);
            }
        }
    }
    h.finish()
}

/// Parameter bindings contribute their owner and name, never their current values.
pub fn fingerprint_engine(engine: &RenderEngine) -> PlanFingerprint {
    let mut h = StableHasher::new();
    h.write_u8(1);
    write_type(&mut h, engine.sink());
    h.write_u32(engine.stages().len() as u32);
    for st in engine.stages() {
        h.write_u32(st.segment as u32);
        write_range(&mut h, st.range);
        match &st.kind {
            StageKind::Source {
                placement,
                asset,
                source_offset,
            } => {
                h.write_u8(0);
                h.write_u64(placement.0);
                h.write_u32(asset.0);
                h.write_u64(*source_offset);
            }
            StageKind::Transcode { conversion } => {
                h.write_u8(1);
                write_conversion(&mut h, conversion);
            }
            StageKind::Composite => h.write_u8(2),
            StageKind::Gap => h.write_u8(3),
        }
        h.write_u32(st.inputs.len() as u32);
        for i in &st.inputs {
            h.write_u32(i.0);
        }
        write_type(&mut h, &st.output);
        h.write_u32(st.params.len() as u32);
        for b in &st.params {
            h.write_u64(b.param.owner().0);
            h.write_str(b.param.name());
        }
    }
    h.write_u32(engine.outputs().len() as u32);
    for o in engine.outputs() {
        write_range(&mut h, o.range);
        h.write_u32(o.stage.0);
    }
    h.write_u32(engine.skipped().len() as u32);
    for s in engine.skipped() {
        h.write_u32(*s as u32);
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> PlanFingerprint {
        let v = self.inner.digest128();
        PlanFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_range(h: &mut StableHasher, r: FrameRange) {
    h.write_u64(r.start.0);
    h.write_u64(r.end.0);
}

// Types hash by descriptor, not by interning id, so fingerprints agree across registries.
fn write_type(h: &mut StableHasher, t: &StreamType) {
    h.write_str(&t.descriptor().to_string());
}

fn write_conversion(h: &mut StableHasher, c: &Conversion) {
    h.write_u32(c.cost());
    h.write_str(&c.to_string());
}

fn write_strategy(h: &mut StableHasher, s: &Strategy) {
    h.write_str(s.kind_name());
    match s {
        Strategy::Gap => {}
        Strategy::DirectPassthrough { source } => h.write_u64(source.0),
        Strategy::SingleSourceTranscode { source, conversion } => {
            h.write_u64(source.0);
            write_conversion(h, conversion);
        }
        Strategy::MultiSourceComposite {
            composite,
            inputs,
            output,
        } => {
            write_type(h, composite);
            h.write_u32(inputs.len() as u32);
            for (t, c) in inputs {
                write_type(h, t);
                write_conversion(h, c);
            }
            write_conversion(h, output);
        }
        Strategy::Unsupported { types } => {
            h.write_u32(types.len() as u32);
            for t in types {
                write_type(h, t);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assembly/fingerprint.rs"]
mod tests;
