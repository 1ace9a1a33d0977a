//! Per-segment render strategy selection.

pub(crate) mod manager;
pub(crate) mod strategy;
