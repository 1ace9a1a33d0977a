//! Render engine assembly from a resolved fixture, plus fingerprints and parameter pre-roll.

pub(crate) mod assembler;
pub(crate) mod engine;
pub(crate) mod fingerprint;
pub(crate) mod preroll;
