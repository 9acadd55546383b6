use num_bigint::BigUint;
use num_traits::ToPrimitive;

use super::config::{IterationMode, IterationSettings};
use super::error::EngineError;
use crate::core::rank::total_permutations;

/// One worker's share of the search.
///
/// In systematic mode `start` is a 1-based permutation rank (the external
/// rank convention); in random mode it is the first iteration index of the
/// slice. `iterations` is the number of candidates the worker evaluates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSlice {
    pub worker_id: usize,
    pub start: BigUint,
    pub iterations: u64,
}

pub fn compute_work_slices(
    settings: &IterationSettings,
    num_workers: usize,
) -> Result<Vec<WorkSlice>, EngineError> {
    match settings.mode() {
        IterationMode::Systematic => {
            let total = total_permutations(&settings.histogram());
            split_systematic(&total, num_workers)
        }
        IterationMode::Random => {
            let total = settings.num_iterations().ok_or_else(|| {
                EngineError::InvalidMode("random mode requires num_iterations".into())
            })?;
            Ok(split_random(total, num_workers))
        }
    }
}

/// Partitions the 1-based rank interval `[1, T + 1)` into `num_workers`
/// contiguous slices of size `⌊T/W⌋`, the last one absorbing the remainder.
fn split_systematic(total: &BigUint, num_workers: usize) -> Result<Vec<WorkSlice>, EngineError> {
    let chunk = total / num_workers;
    let mut slices = Vec::with_capacity(num_workers);
    for worker_id in 0..num_workers {
        let start = &chunk * worker_id + 1u32;
        let end = if worker_id == num_workers - 1 {
            total + 1u32
        } else {
            &chunk * (worker_id + 1) + 1u32
        };
        let iterations = (end - &start).to_u64().ok_or_else(|| {
            EngineError::InvalidMode(
                "systematic slice exceeds the addressable iteration budget".into(),
            )
        })?;
        slices.push(WorkSlice {
            worker_id,
            start,
            iterations,
        });
    }
    Ok(slices)
}

fn split_random(total: u64, num_workers: usize) -> Vec<WorkSlice> {
    let chunk = total / num_workers as u64;
    (0..num_workers)
        .map(|worker_id| {
            let start = chunk * worker_id as u64;
            let iterations = if worker_id == num_workers - 1 {
                total - start
            } else {
                chunk
            };
            WorkSlice {
                worker_id,
                start: BigUint::from(start),
                iterations,
            }
        })
        .collect()
}
