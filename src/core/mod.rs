//! Deterministic primitives: seeded randomness and canonical digests.

pub mod hash;
pub mod rng;
