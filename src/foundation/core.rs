use std::fmt;

use crate::foundation::error::{RenderPathError, RenderPathResult};

/// Time coordinate on the session timeline, in frames of the session timebase.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open frame interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: FrameIndex,
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    pub fn new(start: FrameIndex, end: FrameIndex) -> RenderPathResult<Self> {
        if start.0 > end.0 {
            return Err(RenderPathError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Build a range from raw frame numbers; `end < start` collapses to an empty range at `start`.
    pub fn from_frames(start: u64, end: u64) -> Self {
        Self {
            start: FrameIndex(start),
            end: FrameIndex(end.max(start)),
        }
    }

    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Clip `self` to `bounds`. Disjoint ranges collapse to an empty range at the clamped start.
    pub fn clip_to(self, bounds: FrameRange) -> Self {
        let start = self.start.0.clamp(bounds.start.0, bounds.end.0);
        let end = self.end.0.clamp(start, bounds.end.0.max(start));
        Self::from_frames(start, end)
    }

    pub fn shift(self, delta: i64) -> Self {
        Self {
            start: FrameIndex(shift_frame(self.start.0, delta)),
            end: FrameIndex(shift_frame(self.end.0, delta)),
        }
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start.0, self.end.0)
    }
}

pub(crate) fn shift_frame(v: u64, delta: i64) -> u64 {
    if delta >= 0 {
        v.saturating_add(delta as u64)
    } else {
        v.saturating_sub(delta.unsigned_abs())
    }
}

/// Session timebase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> RenderPathResult<Self> {
        if den == 0 {
            return Err(RenderPathError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(RenderPathError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 25, den: 1 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
