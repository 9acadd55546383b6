//! # SQS Core Library
//!
//! A high-performance library for finding Special Quasirandom Structures (SQS):
//! species-to-site assignments on a fixed lattice whose short-range order (SRO)
//! parameters best approximate a user-supplied target.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless combinatorial algorithms
//!   (multiset rank/unrank, species packing), the compressed symmetric parameter
//!   layout, and the allocation-free pair-counting and objective kernels that run
//!   inside the search loop.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates the search.
//!   It includes the iteration settings and their validation, the work splitter
//!   that partitions the permutation space across workers, the shared best-objective
//!   tracker and bounded candidate buffer, and the per-worker loops for both
//!   systematic enumeration and random sampling.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing layer.
//!   It ties the `engine` and `core` together to execute a complete search: validate
//!   the settings, build the parameter layout, split the work, run the workers in
//!   parallel, and post-process the candidates into the final result set.

pub mod core;
pub mod engine;
pub mod workflows;
