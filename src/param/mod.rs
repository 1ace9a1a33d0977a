//! Automatable parameters: value domains, sources and late-bound parameter slots.

pub(crate) mod parameter;
pub(crate) mod source;
pub(crate) mod value;
