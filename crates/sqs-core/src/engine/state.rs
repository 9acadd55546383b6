use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::core::types::{Configuration, ParameterStorage};

/// One admitted configuration, fully post-processed.
///
/// `rank` follows the external 1-based convention of the systematic
/// enumeration; `configuration` carries the original species labels and
/// `parameters` the SRO parameters expanded to the full `M * S * S` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqsResult {
    pub objective: f64,
    pub rank: BigUint,
    pub configuration: Configuration,
    pub parameters: ParameterStorage,
}

/// A candidate as the workers produce it: packed configuration, compact
/// parameter vector, no rank yet. Rank computation and unpacking are
/// deferred to the collector so the bignum work stays off the hot path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub objective: f64,
    pub configuration: Configuration,
    pub parameters: ParameterStorage,
}

/// Best objective seen by any worker, stored as `f64` bits in an atomic.
///
/// Loads are a hint only: a stale read can at worst let a worker attempt a
/// redundant push, which the buffer's ring eviction cleans up. The follow-up
/// re-read in the worker loop gates every actual push.
pub(crate) struct SharedBest(AtomicU64);

impl SharedBest {
    pub fn new() -> Self {
        Self(AtomicU64::new(f64::INFINITY.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, objective: f64) {
        self.0.store(objective.to_bits(), Ordering::Release);
    }
}

/// Bounded FIFO of improvement candidates shared by all workers.
///
/// Capacity is the requested number of output configurations, clamped to at
/// least one. When full, the oldest entry is evicted: the search improves
/// monotonically, so evicted entries are never better than what replaced
/// them.
pub(crate) struct CandidateBuffer {
    entries: Mutex<VecDeque<Candidate>>,
    capacity: usize,
}

impl CandidateBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn push(&self, candidate: Candidate) {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(candidate);
    }

    /// Drains the buffer in insertion order (oldest first).
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.entries.into_inner().unwrap().into()
    }
}
