//! # Workflows Module
//!
//! This module provides the high-level entry points that orchestrate a
//! complete SQS search.
//!
//! ## Overview
//!
//! Workflows are the top-level API of the library. They validate the
//! iteration settings, build the compressed parameter layout, partition the
//! work across workers, run the parallel search, and post-process the
//! admitted candidates into the final, ordered result set with per-worker
//! telemetry.
//!
//! - **Pair Search Workflow** ([`search`]) - Systematic or random search over
//!   the multiset permutations of a lattice configuration, minimizing the
//!   weighted L1 distance between observed and target SRO parameters.

pub mod search;
