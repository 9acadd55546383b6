use super::types::ParameterStorage;

/// Marker for lower-triangle slots that must never be consulted.
pub const INVALID_SLOT: i32 = -1;

/// Number of slots needed for the upper triangle plus diagonal of an
/// `S x S` symmetric species-pair matrix.
pub fn reduced_pair_count(num_species: usize) -> usize {
    num_species * (num_species - 1) / 2 + num_species
}

/// Flat lookup table of length `S*S` mapping an ordered species pair
/// `(a, b)` with `a <= b` at offset `a*S + b` to a dense slot in `[0, P)`.
/// Lower-triangle offsets hold [`INVALID_SLOT`]; callers canonicalize.
pub fn pair_index_table(num_species: usize) -> Vec<i32> {
    let mut table = vec![INVALID_SLOT; num_species * num_species];
    let mut next = 0;
    for i in 0..num_species {
        for j in i..num_species {
            table[i * num_species + j] = next;
            next += 1;
        }
    }
    table
}

/// Compressed storage for the per-(shell, species-pair) search parameters.
///
/// The target, prefactor, and weight matrices arrive as full symmetric
/// `[M][S][S]` arrays; only the upper triangle of each shell block is kept,
/// reducing the hot loop's working set to `M * P` slots. The weight slot
/// folds the shell weight into the per-pair weight so the objective kernel
/// reads a single vector.
#[derive(Debug, Clone)]
pub struct ParamLayout {
    num_species: usize,
    num_shells: usize,
    pairs_per_shell: usize,
    reindexer: Vec<i32>,
    targets: ParameterStorage,
    prefactors: ParameterStorage,
    weights: ParameterStorage,
}

impl ParamLayout {
    /// Builds the reindexer and the three reduced vectors.
    ///
    /// `target_full` and `prefactors_full` are flat `[M][S][S]` arrays,
    /// `pair_weights` is a flat `[S][S]` array, `shell_weights` holds one
    /// weight per used shell. Inputs must be symmetric in the species
    /// indices; the upper triangle wins silently.
    pub fn build(
        num_species: usize,
        num_shells: usize,
        target_full: &[f64],
        prefactors_full: &[f64],
        pair_weights: &[f64],
        shell_weights: &[f64],
    ) -> Self {
        let pairs_per_shell = reduced_pair_count(num_species);
        let reindexer = pair_index_table(num_species);
        let reduced_len = num_shells * pairs_per_shell;

        let mut targets = vec![0.0; reduced_len];
        let mut prefactors = vec![0.0; reduced_len];
        let mut weights = vec![0.0; reduced_len];

        for shell in 0..num_shells {
            let shell_weight = shell_weights[shell];
            for i in 0..num_species {
                for j in i..num_species {
                    let slot =
                        shell * pairs_per_shell + reindexer[i * num_species + j] as usize;
                    let full = shell * num_species * num_species + i * num_species + j;
                    targets[slot] = target_full[full];
                    prefactors[slot] = prefactors_full[full];
                    weights[slot] = shell_weight * pair_weights[i * num_species + j];
                }
            }
        }

        Self {
            num_species,
            num_shells,
            pairs_per_shell,
            reindexer,
            targets,
            prefactors,
            weights,
        }
    }

    pub fn num_species(&self) -> usize {
        self.num_species
    }

    pub fn num_shells(&self) -> usize {
        self.num_shells
    }

    /// Slots per shell, `P = S(S-1)/2 + S`.
    pub fn pairs_per_shell(&self) -> usize {
        self.pairs_per_shell
    }

    /// Total compressed length, `M * P`.
    pub fn reduced_len(&self) -> usize {
        self.num_shells * self.pairs_per_shell
    }

    pub fn reindexer(&self) -> &[i32] {
        &self.reindexer
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn prefactors(&self) -> &[f64] {
        &self.prefactors
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Expands a compressed `M * P` vector back to the full symmetric
    /// `M * S * S` layout, mirroring each off-diagonal slot.
    pub fn expand(&self, compact: &[f64]) -> ParameterStorage {
        debug_assert_eq!(compact.len(), self.reduced_len());
        let square = self.num_species * self.num_species;
        let mut full = vec![0.0; self.num_shells * square];
        for shell in 0..self.num_shells {
            let offset_full = shell * square;
            let offset_compact = shell * self.pairs_per_shell;
            for i in 0..self.num_species {
                for j in i..self.num_species {
                    let slot = self.reindexer[i * self.num_species + j] as usize;
                    let value = compact[offset_compact + slot];
                    full[offset_full + i * self.num_species + j] = value;
                    if i != j {
                        full[offset_full + j * self.num_species + i] = value;
                    }
                }
            }
        }
        full
    }

    /// Inverse of [`expand`](Self::expand) for a single full `M * S * S`
    /// matrix; keeps the upper triangle of every shell block.
    pub fn reduce(&self, full: &[f64]) -> ParameterStorage {
        debug_assert_eq!(full.len(), self.num_shells * self.num_species * self.num_species);
        let square = self.num_species * self.num_species;
        let mut compact = vec![0.0; self.reduced_len()];
        for shell in 0..self.num_shells {
            let offset_full = shell * square;
            let offset_compact = shell * self.pairs_per_shell;
            for i in 0..self.num_species {
                for j in i..self.num_species {
                    let slot = self.reindexer[i * self.num_species + j] as usize;
                    compact[offset_compact + slot] = full[offset_full + i * self.num_species + j];
                }
            }
        }
        compact
    }
}
