use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ParamError, RenderPathError, RenderPathResult};
use crate::foundation::ids::PlacementId;
use crate::param::source::{ParamSource, ParamSourceDef};
use crate::param::value::{ParamDomain, ParamKind, ParamValue};

/// A single automatable control of a placed media object.
///
/// Binding and sampling go through a lock-protected slot holding an `Arc` to the source. Sampling
/// clones the `Arc` and releases the lock before evaluating, so render threads never block each
/// other and a concurrent `rebind` is seen either entirely or not at all.
pub struct Parameter<V: ParamKind> {
    owner: PlacementId,
    name: Arc<str>,
    slot: RwLock<Option<Arc<ParamSource<V>>>>,
}

impl<V: ParamKind> Parameter<V> {
    pub fn new(owner: PlacementId, name: impl Into<Arc<str>>) -> Self {
        Self {
            owner,
            name: name.into(),
            slot: RwLock::new(None),
        }
    }

    pub fn owner(&self) -> PlacementId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_bound(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Attach `source`. Fails with [`ParamError::AlreadyBound`] while another source is attached.
    pub fn bind(&self, source: ParamSource<V>) -> Result<(), ParamError> {
        let mut slot = self.slot.write();
        if slot.is_some() {
            return Err(ParamError::AlreadyBound {
                owner: self.owner,
                name: self.name.to_string(),
            });
        }
        *slot = Some(Arc::new(source));
        Ok(())
    }

    /// Detach and return the current source.
    pub fn unbind(&self) -> Option<ParamSource<V>> {
        self.slot.write().take().map(Arc::unwrap_or_clone)
    }

    /// Swap in a new source regardless of the current state; returns the old one.
    pub fn rebind(&self, source: ParamSource<V>) -> Option<ParamSource<V>> {
        self.slot
            .write()
            .replace(Arc::new(source))
            .map(Arc::unwrap_or_clone)
    }

    pub fn get_value(&self, t: FrameIndex) -> Result<V, ParamError> {
        let source = self.slot.read().clone();
        match source {
            Some(source) => Ok(source.sample(t)),
            None => Err(ParamError::UnboundParameter {
                owner: self.owner,
                name: self.name.to_string(),
            }),
        }
    }
}

impl<V: ParamKind> fmt::Debug for Parameter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("domain", &V::DOMAIN)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Declaration of a control exposed by an asset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub domain: ParamDomain,
    /// Substituted by callers when sampling reports an unbound parameter.
    #[serde(default)]
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    pub fn validate(&self) -> RenderPathResult<()> {
        if self.name.trim().is_empty() {
            return Err(RenderPathError::validation("parameter name must be non-empty"));
        }
        if let Some(default) = self.default
            && self.domain_default().is_none()
        {
            return Err(ParamError::DomainMismatch {
                name: self.name.clone(),
                expected: self.domain,
                actual: default.domain(),
            }
            .into());
        }
        Ok(())
    }

    /// The declared default tagged with the spec's own domain; Int defaults of Float specs widen.
    pub fn domain_default(&self) -> Option<ParamValue> {
        let default = self.default?;
        match self.domain {
            ParamDomain::Float => f64::from_value(default).map(ParamValue::Float),
            ParamDomain::Int => i64::from_value(default).map(ParamValue::Int),
            ParamDomain::Toggle => bool::from_value(default).map(ParamValue::Toggle),
        }
    }
}

/// Closed sum over the supported parameter domains.
#[derive(Clone, Debug)]
pub enum AnyParameter {
    Float(Arc<Parameter<f64>>),
    Int(Arc<Parameter<i64>>),
    Toggle(Arc<Parameter<bool>>),
}

impl AnyParameter {
    pub fn new(owner: PlacementId, name: &str, domain: ParamDomain) -> Self {
        match domain {
            ParamDomain::Float => Self::Float(Arc::new(Parameter::new(owner, name))),
            ParamDomain::Int => Self::Int(Arc::new(Parameter::new(owner, name))),
            ParamDomain::Toggle => Self::Toggle(Arc::new(Parameter::new(owner, name))),
        }
    }

    pub fn domain(&self) -> ParamDomain {
        match self {
            Self::Float(_) => ParamDomain::Float,
            Self::Int(_) => ParamDomain::Int,
            Self::Toggle(_) => ParamDomain::Toggle,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Float(p) => p.name(),
            Self::Int(p) => p.name(),
            Self::Toggle(p) => p.name(),
        }
    }

    pub fn owner(&self) -> PlacementId {
        match self {
            Self::Float(p) => p.owner(),
            Self::Int(p) => p.owner(),
            Self::Toggle(p) => p.owner(),
        }
    }

    pub fn is_bound(&self) -> bool {
        match self {
            Self::Float(p) => p.is_bound(),
            Self::Int(p) => p.is_bound(),
            Self::Toggle(p) => p.is_bound(),
        }
    }

    pub fn sample(&self, t: FrameIndex) -> Result<ParamValue, ParamError> {
        match self {
            Self::Float(p) => p.get_value(t).map(ParamKind::into_value),
            Self::Int(p) => p.get_value(t).map(ParamKind::into_value),
            Self::Toggle(p) => p.get_value(t).map(ParamKind::into_value),
        }
    }

    /// Bind from a domain-erased definition, checking the domain.
    pub fn bind_def(&self, def: &ParamSourceDef) -> RenderPathResult<()> {
        match self {
            Self::Float(p) => p.bind(def.to_source(p.name())?)?,
            Self::Int(p) => p.bind(def.to_source(p.name())?)?,
            Self::Toggle(p) => p.bind(def.to_source(p.name())?)?,
        }
        Ok(())
    }

    /// Detach the source; `true` if one was attached.
    pub fn unbind(&self) -> bool {
        match self {
            Self::Float(p) => p.unbind().is_some(),
            Self::Int(p) => p.unbind().is_some(),
            Self::Toggle(p) => p.unbind().is_some(),
        }
    }

    pub fn as_float(&self) -> Option<&Arc<Parameter<f64>>> {
        match self {
            Self::Float(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&Arc<Parameter<i64>>> {
        match self {
            Self::Int(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_toggle(&self) -> Option<&Arc<Parameter<bool>>> {
        match self {
            Self::Toggle(p) => Some(p),
            _ => None,
        }
    }

    /// `true` if both handles refer to the same parameter instance.
    pub fn same_instance(&self, other: &AnyParameter) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => Arc::ptr_eq(a, b),
            (Self::Int(a), Self::Int(b)) => Arc::ptr_eq(a, b),
            (Self::Toggle(a), Self::Toggle(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ParamEntry {
    pub param: AnyParameter,
    pub default: Option<ParamValue>,
}

/// Parameters of one media object, in the order its asset declares them.
#[derive(Clone, Debug, Default)]
pub struct ParamSet {
    entries: Vec<ParamEntry>,
}

impl ParamSet {
    /// Create one unbound parameter per spec.
    pub fn instantiate(owner: PlacementId, specs: &[ParamSpec]) -> Self {
        Self {
            entries: specs
                .iter()
                .map(|spec| ParamEntry {
                    param: AnyParameter::new(owner, &spec.name, spec.domain),
                    default: spec.domain_default(),
                })
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AnyParameter> {
        self.entry(name).map(|e| &e.param)
    }

    pub fn entry(&self, name: &str) -> Option<&ParamEntry> {
        self.entries.iter().find(|e| e.param.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/param/parameter.rs"]
mod tests;
