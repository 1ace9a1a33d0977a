use std::fmt;

use crate::foundation::ids::PlacementId;
use crate::stream::conversion::Conversion;
use crate::stream::registry::StreamType;

/// How one segment gets rendered into the sink type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Nothing is placed; the segment renders as silence or black in the sink type.
    Gap,
    /// The only placement already produces the sink type.
    DirectPassthrough { source: PlacementId },
    SingleSourceTranscode {
        source: PlacementId,
        conversion: Conversion,
    },
    /// Every input is converted to `composite`, mixed, then converted to the sink.
    MultiSourceComposite {
        composite: StreamType,
        /// Per placement in segment order: its native type and the conversion into `composite`.
        inputs: Vec<(StreamType, Conversion)>,
        output: Conversion,
    },
    Unsupported { types: Vec<StreamType> },
}

impl Strategy {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Gap => "gap",
            Self::DirectPassthrough { .. } => "passthrough",
            Self::SingleSourceTranscode { .. } => "transcode",
            Self::MultiSourceComposite { .. } => "composite",
            Self::Unsupported { .. } => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }

    /// Sum of all conversion costs the strategy incurs.
    pub fn cost(&self) -> Option<u32> {
        match self {
            Self::Gap | Self::DirectPassthrough { .. } => Some(0),
            Self::SingleSourceTranscode { conversion, .. } => Some(conversion.cost()),
            Self::MultiSourceComposite { inputs, output, .. } => {
                Some(inputs.iter().map(|(_, c)| c.cost()).sum::<u32>() + output.cost())
            }
            Self::Unsupported { .. } => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gap => f.write_str("gap"),
            Self::DirectPassthrough { source } => write!(f, "passthrough {source}"),
            Self::SingleSourceTranscode { source, conversion } => {
                write!(f, "transcode {source} via {conversion}")
            }
            Self::MultiSourceComposite {
                composite,
                inputs,
                output,
            } => {
                write!(f, "composite {} inputs as {composite} [", inputs.len())?;
                for (i, (_, c)) in inputs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "] then {output}")
            }
            Self::Unsupported { types } => {
                f.write_str("unsupported")?;
                for t in types {
                    write!(f, " {t}")?;
                }
                Ok(())
            }
        }
    }
}
