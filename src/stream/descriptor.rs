//! Value descriptors for the data flowing through a render path.
//!
//! A [`StreamDescriptor`] is plain data: it can be compared, hashed and written down. Identity
//! (interning) is added by [`crate::stream::registry::StreamTypeRegistry`].
//!
//! The compact text notation is used both for serde and for `Display`/`FromStr`:
//!
//! - `audio:<rate>:<layout>:<format>`, e.g. `audio:48000:stereo:f32`
//! - `video:<w>x<h>:<fps><p|i>:<pixfmt>`, e.g. `video:1920x1080:25p:rgb8`,
//!   `video:1920x1080:30000/1001i:yuv422p10`
//! - `other:<name>`, e.g. `other:midi`
//!
//! An optional `@origin` suffix names the implementing library; it defaults to `builtin`.

use std::fmt;
use std::str::FromStr;

use crate::foundation::error::RenderPathError;

/// Origin tag assumed when the notation carries no `@origin` suffix.
pub const DEFAULT_ORIGIN: &str = "builtin";

/// Coarse classification; stream types of different kinds never convert implicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaKind {
    Audio,
    Video,
    Other,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Other => "other",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelLayout {
    Mono,
    Stereo,
    Surround51,
    Surround71,
}

impl ChannelLayout {
    pub fn channels(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
            Self::Surround51 => 6,
            Self::Surround71 => 8,
        }
    }

    fn token(self) -> &'static str {
        match self {
            Self::Mono => "mono",
            Self::Stereo => "stereo",
            Self::Surround51 => "5.1",
            Self::Surround71 => "7.1",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "mono" => Self::Mono,
            "stereo" => Self::Stereo,
            "5.1" => Self::Surround51,
            "7.1" => Self::Surround71,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SampleFormat {
    S16,
    S24,
    S32,
    F32,
}

impl SampleFormat {
    fn token(self) -> &'static str {
        match self {
            Self::S16 => "s16",
            Self::S24 => "s24",
            Self::S32 => "s32",
            Self::F32 => "f32",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "s16" => Self::S16,
            "s24" => Self::S24,
            "s32" => Self::S32,
            "f32" => Self::F32,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scan {
    Progressive,
    Interlaced,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
    Yuv420p,
    Yuv422p10,
}

impl PixelFormat {
    fn token(self) -> &'static str {
        match self {
            Self::Rgb8 => "rgb8",
            Self::Rgba8 => "rgba8",
            Self::Yuv420p => "yuv420p",
            Self::Yuv422p10 => "yuv422p10",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "rgb8" => Self::Rgb8,
            "rgba8" => Self::Rgba8,
            "yuv420p" => Self::Yuv420p,
            "yuv422p10" => Self::Yuv422p10,
            _ => return None,
        })
    }
}

/// Frame rate of a video stream as an exact fraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rate {
    pub num: u32,
    pub den: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub layout: ChannelLayout,
    pub sample_format: SampleFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VideoFormat {
    pub width: u32,
    pub height: u32,
    pub rate: Rate,
    pub scan: Scan,
    pub pixel_format: PixelFormat,
}

/// Structural part of a descriptor; the only part compatibility looks at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Structure {
    Audio(AudioFormat),
    Video(VideoFormat),
    Other { name: String },
}

/// Full description of a stream type: structure plus the library it originates from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamDescriptor {
    pub structure: Structure,
    pub origin: String,
}

impl StreamDescriptor {
    pub fn audio(sample_rate: u32, layout: ChannelLayout, sample_format: SampleFormat) -> Self {
        Self::from_structure(Structure::Audio(AudioFormat {
            sample_rate,
            layout,
            sample_format,
        }))
    }

    pub fn video(
        width: u32,
        height: u32,
        rate: Rate,
        scan: Scan,
        pixel_format: PixelFormat,
    ) -> Self {
        Self::from_structure(Structure::Video(VideoFormat {
            width,
            height,
            rate,
            scan,
            pixel_format,
        }))
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self::from_structure(Structure::Other { name: name.into() })
    }

    pub fn from_structure(structure: Structure) -> Self {
        Self {
            structure,
            origin: DEFAULT_ORIGIN.to_owned(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn kind(&self) -> MediaKind {
        match self.structure {
            Structure::Audio(_) => MediaKind::Audio,
            Structure::Video(_) => MediaKind::Video,
            Structure::Other { .. } => MediaKind::Other,
        }
    }
}

impl fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.structure {
            Structure::Audio(a) => write!(
                f,
                "audio:{}:{}:{}",
                a.sample_rate,
                a.layout.token(),
                a.sample_format.token()
            )?,
            Structure::Video(v) => {
                write!(f, "video:{}x{}:", v.width, v.height)?;
                if v.rate.den == 1 {
                    write!(f, "{}", v.rate.num)?;
                } else {
                    write!(f, "{}/{}", v.rate.num, v.rate.den)?;
                }
                let scan = match v.scan {
                    Scan::Progressive => 'p',
                    Scan::Interlaced => 'i',
                };
                write!(f, "{scan}:{}", v.pixel_format.token())?;
            }
            Structure::Other { name } => write!(f, "other:{name}")?,
        }
        if self.origin != DEFAULT_ORIGIN {
            write!(f, "@{}", self.origin)?;
        }
        Ok(())
    }
}

impl FromStr for StreamDescriptor {
    type Err = RenderPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (body, origin) = match s.rsplit_once('@') {
            Some((body, origin)) => (body, origin),
            None => (s, DEFAULT_ORIGIN),
        };
        if origin.is_empty() {
            return Err(bad(s, "empty origin"));
        }

        let parts: Vec<&str> = body.split(':').collect();
        let structure = match parts.as_slice() {
            ["audio", rate, layout, format] => Structure::Audio(AudioFormat {
                sample_rate: parse_positive(rate).ok_or_else(|| bad(s, "sample rate"))?,
                layout: ChannelLayout::parse(layout).ok_or_else(|| bad(s, "channel layout"))?,
                sample_format: SampleFormat::parse(format)
                    .ok_or_else(|| bad(s, "sample format"))?,
            }),
            ["video", size, rate, pixfmt] => {
                let (w, h) = size.split_once('x').ok_or_else(|| bad(s, "frame size"))?;
                let (rate, scan) = parse_rate(rate).ok_or_else(|| bad(s, "frame rate"))?;
                Structure::Video(VideoFormat {
                    width: parse_positive(w).ok_or_else(|| bad(s, "frame width"))?,
                    height: parse_positive(h).ok_or_else(|| bad(s, "frame height"))?,
                    rate,
                    scan,
                    pixel_format: PixelFormat::parse(pixfmt)
                        .ok_or_else(|| bad(s, "pixel format"))?,
                })
            }
            ["other", name] if !name.is_empty() => Structure::Other {
                name: (*name).to_owned(),
            },
            _ => return Err(bad(s, "unrecognised layout")),
        };

        Ok(Self {
            structure,
            origin: origin.to_owned(),
        })
    }
}

impl TryFrom<String> for StreamDescriptor {
    type Error = RenderPathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StreamDescriptor> for String {
    fn from(value: StreamDescriptor) -> Self {
        value.to_string()
    }
}

fn bad(input: &str, what: &str) -> RenderPathError {
    RenderPathError::validation(format!("stream descriptor '{input}': invalid {what}"))
}

fn parse_positive(s: &str) -> Option<u32> {
    s.parse::<u32>().ok().filter(|v| *v > 0)
}

fn parse_rate(s: &str) -> Option<(Rate, Scan)> {
    let (body, scan) = if let Some(b) = s.strip_suffix('p') {
        (b, Scan::Progressive)
    } else if let Some(b) = s.strip_suffix('i') {
        (b, Scan::Interlaced)
    } else {
        return None;
    };
    let rate = match body.split_once('/') {
        Some((n, d)) => Rate {
            num: parse_positive(n)?,
            den: parse_positive(d)?,
        },
        None => Rate {
            num: parse_positive(body)?,
            den: 1,
        },
    };
    Some((rate, scan))
}

#[cfg(test)]
#[path = "../../tests/unit/stream/descriptor.rs"]
mod tests;
