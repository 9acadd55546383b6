use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::{IterationMode, IterationSettings};
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::split::WorkSlice;
use super::state::{Candidate, CandidateBuffer, SharedBest};
use crate::core::bonds::{count_pairs, pair_objective};
use crate::core::layout::ParamLayout;
use crate::core::rank::{next_permutation, unrank_permutation};
use crate::core::types::Species;

/// Per-worker telemetry surfaced alongside the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    pub worker_id: usize,
    pub iterations: u64,
    pub elapsed_micros: u64,
}

/// Runs every work slice to completion and returns the admitted candidates
/// in buffer order together with the per-worker statistics.
pub(crate) fn run_search(
    settings: &IterationSettings,
    layout: &ParamLayout,
    slices: &[WorkSlice],
    reporter: &ProgressReporter,
) -> Result<(Vec<Candidate>, Vec<WorkerStats>), EngineError> {
    let best = SharedBest::new();
    let buffer = CandidateBuffer::new(settings.num_output_configurations());
    let base_seed = settings.rng_seed().unwrap_or_else(rand::random);

    #[cfg(feature = "parallel")]
    let iterator = slices.par_iter();

    #[cfg(not(feature = "parallel"))]
    let iterator = slices.iter();

    let stats = iterator
        .map(|slice| run_worker(slice, settings, layout, &best, &buffer, base_seed, reporter))
        .collect::<Result<Vec<WorkerStats>, EngineError>>()?;

    Ok((buffer.into_candidates(), stats))
}

fn run_worker(
    slice: &WorkSlice,
    settings: &IterationSettings,
    layout: &ParamLayout,
    best: &SharedBest,
    buffer: &CandidateBuffer,
    base_seed: u64,
    reporter: &ProgressReporter,
) -> Result<WorkerStats, EngineError> {
    let started = Instant::now();
    let iterations = match settings.mode() {
        IterationMode::Systematic => run_systematic_slice(slice, settings, layout, best, buffer)?,
        IterationMode::Random => run_random_slice(slice, settings, layout, best, buffer, base_seed),
    };
    let elapsed_micros = started.elapsed().as_micros() as u64;

    debug!(
        worker_id = slice.worker_id,
        iterations, elapsed_micros, "worker finished its slice"
    );
    reporter.report(Progress::WorkerFinish {
        worker_id: slice.worker_id,
        iterations,
        elapsed_micros,
    });

    Ok(WorkerStats {
        worker_id: slice.worker_id,
        iterations,
        elapsed_micros,
    })
}

/// Enumerates the slice `[start, start + iterations)` of 1-based ranks in
/// lexicographic order: seed via unrank, then advance with the in-place
/// successor. The seed itself is evaluated first, so the union of all slices
/// covers the full space exactly once.
fn run_systematic_slice(
    slice: &WorkSlice,
    settings: &IterationSettings,
    layout: &ParamLayout,
    best: &SharedBest,
    buffer: &CandidateBuffer,
) -> Result<u64, EngineError> {
    if slice.iterations == 0 {
        return Ok(0);
    }

    let histogram = settings.histogram();
    // external ranks count from one, core::rank counts from zero
    let seed_rank = &slice.start - 1u32;
    let mut configuration = unrank_permutation(&histogram, &seed_rank)?;

    let mut bonds = vec![0.0; layout.reduced_len()];
    let mut local_best = best.load();
    let mut performed = 0u64;

    for step in 0..slice.iterations {
        count_pairs(
            &configuration,
            settings.pair_list(),
            &mut bonds,
            layout.reindexer(),
            settings.num_species(),
            true,
        );
        let objective =
            pair_objective(&mut bonds, layout.prefactors(), layout.weights(), layout.targets());
        performed += 1;

        if objective <= local_best {
            local_best = offer_candidate(objective, &configuration, &bonds, best, buffer);
        }

        if step + 1 < slice.iterations && !next_permutation(&mut configuration) {
            break;
        }
    }
    Ok(performed)
}

/// Draws `iterations` independent uniform shuffles of the packed
/// configuration. Rank bookkeeping is deferred to the collector; duplicates
/// across draws are possible and deduplicated there.
fn run_random_slice(
    slice: &WorkSlice,
    settings: &IterationSettings,
    layout: &ParamLayout,
    best: &SharedBest,
    buffer: &CandidateBuffer,
    base_seed: u64,
) -> u64 {
    let mut rng = SmallRng::seed_from_u64(mix_seed(base_seed, slice.worker_id as u64));
    let mut configuration = settings.packed_configuration().to_vec();

    let mut bonds = vec![0.0; layout.reduced_len()];
    let mut local_best = best.load();

    for _ in 0..slice.iterations {
        configuration.shuffle(&mut rng);
        count_pairs(
            &configuration,
            settings.pair_list(),
            &mut bonds,
            layout.reindexer(),
            settings.num_species(),
            true,
        );
        let objective =
            pair_objective(&mut bonds, layout.prefactors(), layout.weights(), layout.targets());

        if objective <= local_best {
            local_best = offer_candidate(objective, &configuration, &bonds, best, buffer);
        }
    }
    slice.iterations
}

/// Slow path of the two-step best check: re-reads the shared best under the
/// race, and only a confirmed improvement is pushed and published. Returns
/// the worker's refreshed local best.
#[inline]
fn offer_candidate(
    objective: f64,
    configuration: &[Species],
    bonds: &[f64],
    best: &SharedBest,
    buffer: &CandidateBuffer,
) -> f64 {
    let shared = best.load();
    if objective <= shared {
        buffer.push(Candidate {
            objective,
            configuration: configuration.to_vec(),
            parameters: bonds.to_vec(),
        });
        best.store(objective);
        objective
    } else {
        shared
    }
}

/// SplitMix64 finalizer over the base seed and worker id. Replaces wall-clock
/// seeding so two workers can never collide and a fixed base seed reproduces
/// the exact candidate stream.
fn mix_seed(base: u64, worker_id: u64) -> u64 {
    let mut z = base.wrapping_add(worker_id.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
