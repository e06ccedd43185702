//! Seed management for world generation.
//!
//! Every stochastic system gets its own seed derived from one master seed, so
//! a world can be recreated exactly and individual systems can be re-rolled
//! without disturbing the others.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Seeds for all stochastic systems of a generation run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference).
    pub master: u64,
    /// Noise field sampling offset and Perlin permutation.
    pub noise: u64,
    /// Spawn-point and patrol-cell selection.
    pub placement: u64,
    /// Randomized bounded-depth region search.
    pub search: u64,
}

impl WorldSeeds {
    /// Derive all sub-seeds deterministically from a master seed.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            noise: derive_seed(master, "noise"),
            placement: derive_seed(master, "placement"),
            search: derive_seed(master, "search"),
        }
    }
}

impl Default for WorldSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Derive a sub-seed by hashing the master seed with a system label.
fn derive_seed(master: u64, label: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    label.hash(&mut hasher);
    hasher.finish()
}
