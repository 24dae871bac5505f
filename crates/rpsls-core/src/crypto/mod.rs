//! Commit-reveal primitives.
//!
//! The commitment itself is computed by the hasher contract so that it is
//! bit-identical to what the game contract recomputes during `solve`.

mod commitment;

pub use commitment::{generate_commitment, Commitment, CommitmentHasher, Salt};
