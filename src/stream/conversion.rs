use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::stream::descriptor::{
    ChannelLayout, PixelFormat, Rate, SampleFormat, Scan, StreamDescriptor, Structure,
};

/// One elementary operation of an implicit conversion.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConversionStep {
    /// Same structure, different origin library.
    Rewrap,
    Requantize {
        from: SampleFormat,
        to: SampleFormat,
    },
    Remix {
        from: ChannelLayout,
        to: ChannelLayout,
    },
    Resample {
        from: u32,
        to: u32,
    },
    PixelConvert {
        from: PixelFormat,
        to: PixelFormat,
    },
    Scale {
        from: (u32, u32),
        to: (u32, u32),
    },
    Retime {
        from: Rate,
        to: Rate,
    },
    Deinterlace,
    Interlace,
    /// Step contributed by a registered [`ConversionRule`] outside the structural set.
    Custom { name: Arc<str>, cost: u32 },
}

impl ConversionStep {
    pub fn cost(&self) -> u32 {
        match self {
            Self::Rewrap => 1,
            Self::Requantize { .. } => 2,
            Self::Remix { .. } => 4,
            Self::Resample { .. } => 8,
            Self::PixelConvert { .. } => 4,
            Self::Scale { .. } => 16,
            Self::Retime { .. } => 12,
            Self::Deinterlace => 10,
            Self::Interlace => 6,
            Self::Custom { cost, .. } => *cost,
        }
    }
}

impl fmt::Display for ConversionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rewrap => f.write_str("rewrap"),
            Self::Requantize { from, to } => write!(f, "requantize({from:?}->{to:?})"),
            Self::Remix { from, to } => write!(f, "remix({}ch->{}ch)", from.channels(), to.channels()),
            Self::Resample { from, to } => write!(f, "resample({from}->{to})"),
            Self::PixelConvert { from, to } => write!(f, "pixconv({from:?}->{to:?})"),
            Self::Scale { from, to } => {
                write!(f, "scale({}x{}->{}x{})", from.0, from.1, to.0, to.1)
            }
            Self::Retime { from, to } => {
                write!(f, "retime({}/{}->{}/{})", from.num, from.den, to.num, to.den)
            }
            Self::Deinterlace => f.write_str("deinterlace"),
            Self::Interlace => f.write_str("interlace"),
            Self::Custom { name, .. } => write!(f, "{name}"),
        }
    }
}

/// An ordered chain of conversion steps with its total cost.
///
/// The identity conversion has no steps and cost 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Conversion {
    steps: SmallVec<[ConversionStep; 4]>,
    cost: u32,
}

impl Conversion {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: impl IntoIterator<Item = ConversionStep>) -> Self {
        let steps: SmallVec<[ConversionStep; 4]> = steps.into_iter().collect();
        let cost = steps.iter().map(ConversionStep::cost).sum();
        Self { steps, cost }
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[ConversionStep] {
        &self.steps
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("identity");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Source of implicit conversions known to a registry.
///
/// Rules are consulted once per ordered pair of interned types; the cheapest plan wins.
pub trait ConversionRule: Send + Sync + fmt::Debug {
    fn plan(&self, from: &StreamDescriptor, to: &StreamDescriptor) -> Option<Conversion>;
}

/// Built-in conversions between structures of the same media kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuralConversions;

impl ConversionRule for StructuralConversions {
    fn plan(&self, from: &StreamDescriptor, to: &StreamDescriptor) -> Option<Conversion> {
        let mut steps = SmallVec::<[ConversionStep; 4]>::new();
        match (&from.structure, &to.structure) {
            (Structure::Audio(a), Structure::Audio(b)) => {
                if a.sample_format != b.sample_format {
                    steps.push(ConversionStep::Requantize {
                        from: a.sample_format,
                        to: b.sample_format,
                    });
                }
                if a.layout != b.layout {
                    steps.push(ConversionStep::Remix {
                        from: a.layout,
                        to: b.layout,
                    });
                }
                if a.sample_rate != b.sample_rate {
                    steps.push(ConversionStep::Resample {
                        from: a.sample_rate,
                        to: b.sample_rate,
                    });
                }
            }
            (Structure::Video(a), Structure::Video(b)) => {
                match (a.scan, b.scan) {
                    (Scan::Interlaced, Scan::Progressive) => steps.push(ConversionStep::Deinterlace),
                    (Scan::Progressive, Scan::Interlaced) => steps.push(ConversionStep::Interlace),
                    _ => {}
                }
                if a.rate != b.rate {
                    steps.push(ConversionStep::Retime {
                        from: a.rate,
                        to: b.rate,
                    });
                }
                if (a.width, a.height) != (b.width, b.height) {
                    steps.push(ConversionStep::Scale {
                        from: (a.width, a.height),
                        to: (b.width, b.height),
                    });
                }
                if a.pixel_format != b.pixel_format {
                    steps.push(ConversionStep::PixelConvert {
                        from: a.pixel_format,
                        to: b.pixel_format,
                    });
                }
            }
            (Structure::Other { name: a }, Structure::Other { name: b }) if a == b => {}
            _ => return None,
        }

        if steps.is_empty() && from.origin != to.origin {
            steps.push(ConversionStep::Rewrap);
        }
        Some(Conversion::from_steps(steps))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stream/conversion.rs"]
mod tests;
