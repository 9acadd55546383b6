use serde::{Deserialize, Serialize};

/// Dense species tag. Packed configurations use values in `[0, S)` where `S`
/// is the number of distinct species on the lattice.
pub type Species = u8;

/// Ordered species-to-site assignment; the position is the site index.
pub type Configuration = Vec<Species>;

/// Flat storage for per-(shell, species-pair) parameters.
pub type ParameterStorage = Vec<f64>;

/// A canonicalized site pair together with its coordination-shell index.
///
/// Invariant: `i < j`, and `shell` indexes the sorted list of shells that
/// carry a nonzero weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePair {
    pub i: usize,
    pub j: usize,
    pub shell: usize,
}

impl SitePair {
    pub fn new(i: usize, j: usize, shell: usize) -> Self {
        Self { i, j, shell }
    }
}
