use std::fmt;

/// Value domains a parameter can range over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamDomain {
    Float,
    Int,
    Toggle,
}

impl fmt::Display for ParamDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Toggle => "toggle",
        })
    }
}

/// Domain-tagged parameter value.
///
/// In JSON a value is written bare: `true`, `5`, `0.75`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Toggle(bool),
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn domain(self) -> ParamDomain {
        match self {
            Self::Toggle(_) => ParamDomain::Toggle,
            Self::Int(_) => ParamDomain::Int,
            Self::Float(_) => ParamDomain::Float,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Rust types usable as a parameter value domain.
pub trait ParamKind: Clone + Send + Sync + fmt::Debug + 'static {
    const DOMAIN: ParamDomain;

    /// Blend from `a` to `b` with `t` in `[0, 1]`.
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self;

    fn into_value(self) -> ParamValue;

    /// Narrow a tagged value into this domain. Int widens to Float; nothing else converts.
    fn from_value(v: ParamValue) -> Option<Self>;
}

impl ParamKind for f64 {
    const DOMAIN: ParamDomain = ParamDomain::Float;

    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }

    fn into_value(self) -> ParamValue {
        ParamValue::Float(self)
    }

    fn from_value(v: ParamValue) -> Option<Self> {
        match v {
            ParamValue::Float(x) => Some(x),
            ParamValue::Int(x) => Some(x as f64),
            ParamValue::Toggle(_) => None,
        }
    }
}

impl ParamKind for i64 {
    const DOMAIN: ParamDomain = ParamDomain::Int;

    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        (*a as f64 + (*b as f64 - *a as f64) * t).round() as i64
    }

    fn into_value(self) -> ParamValue {
        ParamValue::Int(self)
    }

    fn from_value(v: ParamValue) -> Option<Self> {
        match v {
            ParamValue::Int(x) => Some(x),
            _ => None,
        }
    }
}

impl ParamKind for bool {
    const DOMAIN: ParamDomain = ParamDomain::Toggle;

    // Toggles step; they never blend.
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        if t >= 1.0 { *b } else { *a }
    }

    fn into_value(self) -> ParamValue {
        ParamValue::Toggle(self)
    }

    fn from_value(v: ParamValue) -> Option<Self> {
        match v {
            ParamValue::Toggle(x) => Some(x),
            _ => None,
        }
    }
}
