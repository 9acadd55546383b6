//! # Core Module
//!
//! This module provides the fundamental building blocks and algorithms for the
//! SQS search, serving as the computational core of the library.
//!
//! ## Overview
//!
//! Everything in this layer is stateless: pure functions and immutable data
//! layouts that the search engine shares read-only across worker threads.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different
//! aspects of the problem:
//!
//! - **Shared Types** ([`types`]) - Species tags, configurations, and site-pair triples
//! - **Multiset Permutations** ([`rank`]) - Rank/unrank bijection and lexicographic
//!   successor over a fixed species histogram, under arbitrary-precision ranks
//! - **Species Packing** ([`pack`]) - Bijection between arbitrary species labels and
//!   the dense `[0, S)` index range the rank arithmetic operates on
//! - **Parameter Layout** ([`layout`]) - Compressed upper-triangular storage for the
//!   per-(shell, species-pair) target, prefactor, and weight vectors
//! - **Hot Kernels** ([`bonds`]) - Pair counting and the weighted-L1 objective,
//!   written to allocate nothing and touch no shared mutable state

pub mod bonds;
pub mod layout;
pub mod pack;
pub mod rank;
pub mod types;
