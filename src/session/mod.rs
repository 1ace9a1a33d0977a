//! Session-side inputs of the build: asset catalog, placements and snapshots.

pub(crate) mod catalog;
pub(crate) mod model;
pub(crate) mod placement;
pub(crate) mod snapshot;
