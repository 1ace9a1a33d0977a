//! Time-partitioned execution plan built from a session snapshot, and the model ports it feeds.

pub(crate) mod build;
pub(crate) mod ports;
pub(crate) mod segment;
