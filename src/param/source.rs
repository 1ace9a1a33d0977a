use std::fmt;
use std::sync::Arc;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ParamError, RenderPathError, RenderPathResult};
use crate::param::value::{ParamKind, ParamValue};

/// Easing curve applied from one key toward the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Interpolation between adjacent keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interp {
    Hold,
    #[default]
    Linear,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Key<V> {
    pub frame: FrameIndex,
    pub value: V,
    #[serde(default)]
    pub ease: Ease,
}

/// Keyframed automation curve in timeline frames. Values hold beyond the first and last key.
#[derive(Clone, Debug, PartialEq)]
pub struct Automation<V> {
    keys: Vec<Key<V>>,
    interp: Interp,
}

impl<V: ParamKind> Automation<V> {
    pub fn new(keys: Vec<Key<V>>, interp: Interp) -> RenderPathResult<Self> {
        if keys.is_empty() {
            return Err(RenderPathError::validation(
                "automation must have at least one key",
            ));
        }
        if !keys.windows(2).all(|w| w[0].frame <= w[1].frame) {
            return Err(RenderPathError::validation(
                "automation keys must be sorted by frame",
            ));
        }
        Ok(Self { keys, interp })
    }

    pub fn keys(&self) -> &[Key<V>] {
        &self.keys
    }

    pub fn sample(&self, t: FrameIndex) -> V {
        let idx = self.keys.partition_point(|k| k.frame <= t);
        if idx == 0 {
            return self.keys[0].value.clone();
        }
        if idx >= self.keys.len() {
            return self.keys[self.keys.len() - 1].value.clone();
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let span = b.frame.0 - a.frame.0;
        if span == 0 || self.interp == Interp::Hold {
            return a.value.clone();
        }
        let u = (t.0 - a.frame.0) as f64 / span as f64;
        V::interpolate(&a.value, &b.value, a.ease.apply(u))
    }
}

/// Arbitrary time function; must be pure.
#[derive(Clone)]
pub struct TimeFn<V>(Arc<dyn Fn(FrameIndex) -> V + Send + Sync>);

impl<V> fmt::Debug for TimeFn<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TimeFn(..)")
    }
}

/// What a bound parameter samples from.
#[derive(Clone, Debug)]
pub enum ParamSource<V> {
    Constant(V),
    Automation(Automation<V>),
    Function(TimeFn<V>),
}

impl<V: ParamKind> ParamSource<V> {
    pub fn function(f: impl Fn(FrameIndex) -> V + Send + Sync + 'static) -> Self {
        Self::Function(TimeFn(Arc::new(f)))
    }

    pub fn sample(&self, t: FrameIndex) -> V {
        match self {
            Self::Constant(v) => v.clone(),
            Self::Automation(a) => a.sample(t),
            Self::Function(TimeFn(f)) => f(t),
        }
    }
}

/// Domain-erased source as written in a session file.
///
/// Either a bare value (`5`, `0.5`, `true`) or `{"keys": [...], "interp": "hold"}`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamSourceDef {
    Constant(ParamValue),
    Automation {
        keys: Vec<Key<ParamValue>>,
        #[serde(default)]
        interp: Interp,
    },
}

impl ParamSourceDef {
    /// Convert into a typed source for parameter `name`.
    pub fn to_source<V: ParamKind>(&self, name: &str) -> RenderPathResult<ParamSource<V>> {
        let narrow = |v: ParamValue| {
            V::from_value(v).ok_or_else(|| ParamError::DomainMismatch {
                name: name.to_owned(),
                expected: V::DOMAIN,
                actual: v.domain(),
            })
        };
        match self {
            Self::Constant(v) => Ok(ParamSource::Constant(narrow(*v)?)),
            Self::Automation { keys, interp } => {
                let keys = keys
                    .iter()
                    .map(|k| {
                        Ok(Key {
                            frame: k.frame,
                            value: narrow(k.value)?,
                            ease: k.ease,
                        })
                    })
                    .collect::<Result<Vec<_>, ParamError>>()?;
                Ok(ParamSource::Automation(Automation::new(keys, *interp)?))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/param/source.rs"]
mod tests;
