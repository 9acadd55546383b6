use num_bigint::BigUint;
use num_traits::{One, Zero};
use thiserror::Error;

use super::types::{Configuration, Species};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankError {
    #[error("rank {rank} is out of range for a space of {total} permutations")]
    RankOutOfRange { rank: BigUint, total: BigUint },
}

/// Counts how often each dense species index occurs in a packed configuration.
pub fn configuration_histogram(configuration: &[Species], num_species: usize) -> Vec<usize> {
    let mut histogram = vec![0usize; num_species];
    for &species in configuration {
        histogram[species as usize] += 1;
    }
    histogram
}

/// Number of distinct permutations of the multiset described by `histogram`,
/// `N! / Π h_i!` with `N = Σ h_i`.
pub fn total_permutations(histogram: &[usize]) -> BigUint {
    let num_sites: usize = histogram.iter().sum();
    let mut total = factorial(num_sites);
    for &count in histogram {
        total /= factorial(count);
    }
    total
}

fn factorial(n: usize) -> BigUint {
    (2..=n).fold(BigUint::one(), |acc, k| acc * k)
}

/// Returns the permutation with the given zero-based rank in the standard
/// lexicographic enumeration of the multiset described by `histogram`.
///
/// At every site the species are tried in ascending index order; the number of
/// completions with species `s` placed next is `open * h_s / sites_left`, an
/// exact division since `open` is the permutation count of the unassigned
/// suffix.
pub fn unrank_permutation(histogram: &[usize], rank: &BigUint) -> Result<Configuration, RankError> {
    let total = total_permutations(histogram);
    if *rank >= total {
        return Err(RankError::RankOutOfRange {
            rank: rank.clone(),
            total,
        });
    }

    let num_sites: usize = histogram.iter().sum();
    let mut remaining = histogram.to_vec();
    let mut open = total;
    let mut residual = rank.clone();
    let mut configuration = Vec::with_capacity(num_sites);

    for position in 0..num_sites {
        let sites_left = num_sites - position;
        for species in 0..remaining.len() {
            if remaining[species] == 0 {
                continue;
            }
            let completions = &open * remaining[species] / sites_left;
            if residual < completions {
                configuration.push(species as Species);
                remaining[species] -= 1;
                open = completions;
                break;
            }
            residual -= completions;
        }
    }
    Ok(configuration)
}

/// Zero-based lexicographic rank of a packed configuration; inverse of
/// [`unrank_permutation`]. Accumulates suffix permutation counts from the
/// right so each step costs one exact bignum multiply-divide.
pub fn rank_permutation(configuration: &[Species], num_species: usize) -> BigUint {
    let mut seen = vec![0usize; num_species];
    let mut rank = BigUint::zero();
    let mut suffix_perms = BigUint::one();

    for (len, &tag) in configuration.iter().rev().enumerate() {
        let species = tag as usize;
        seen[species] += 1;
        suffix_perms = suffix_perms * (len + 1) / seen[species];
        for smaller in 0..species {
            if seen[smaller] > 0 {
                rank += &suffix_perms * seen[smaller] / (len + 1);
            }
        }
    }
    rank
}

/// Advances `configuration` to its lexicographic successor in place.
/// Returns `false` if the input was already the last permutation.
///
/// Standard pivot algorithm: locate the longest non-increasing suffix, swap
/// the pivot with the smallest larger element in the suffix, reverse the
/// suffix. Duplicate species are skipped naturally.
pub fn next_permutation(configuration: &mut [Species]) -> bool {
    let num_sites = configuration.len();
    if num_sites < 2 {
        return false;
    }

    let mut suffix_start = num_sites - 1;
    while suffix_start > 0 && configuration[suffix_start - 1] >= configuration[suffix_start] {
        suffix_start -= 1;
    }
    if suffix_start == 0 {
        return false;
    }

    let pivot = suffix_start - 1;
    let mut successor = num_sites - 1;
    while configuration[successor] <= configuration[pivot] {
        successor -= 1;
    }
    configuration.swap(pivot, successor);
    configuration[suffix_start..].reverse();
    true
}
