//! Stream type classification, interning and implicit conversions.

pub(crate) mod conversion;
pub(crate) mod descriptor;
pub(crate) mod registry;
