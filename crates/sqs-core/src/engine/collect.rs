use std::collections::HashSet;

use num_bigint::BigUint;

use super::config::{IterationMode, IterationSettings};
use super::state::{Candidate, SqsResult};
use crate::core::layout::ParamLayout;
use crate::core::pack::unpack_configuration;
use crate::core::rank::rank_permutation;

/// Post-processes the admitted candidates into final results, in buffer
/// insertion order.
///
/// Each candidate gets its permutation rank (reported 1-based, matching the
/// systematic enumeration convention), its configuration unpacked to the
/// original species labels, and its SRO parameters expanded to the full
/// symmetric layout. Random mode can revisit a permutation, so duplicates
/// are dropped by rank there; the first occurrence wins. Systematic mode
/// cannot produce duplicates by construction.
pub(crate) fn collect_results(
    candidates: Vec<Candidate>,
    settings: &IterationSettings,
    layout: &ParamLayout,
) -> Vec<SqsResult> {
    let mut seen_ranks: HashSet<BigUint> = HashSet::new();
    let mut results = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let rank = rank_permutation(&candidate.configuration, settings.num_species()) + 1u32;
        if settings.mode() == IterationMode::Random && !seen_ranks.insert(rank.clone()) {
            continue;
        }
        results.push(SqsResult {
            objective: candidate.objective,
            rank,
            configuration: unpack_configuration(
                settings.pack_indices(),
                &candidate.configuration,
            ),
            parameters: layout.expand(&candidate.parameters),
        });
    }
    results
}
