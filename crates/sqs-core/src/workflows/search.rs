use tracing::{debug, info, instrument};

use crate::core::layout::ParamLayout;
use crate::engine::collect::collect_results;
use crate::engine::config::IterationSettings;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::search::{run_search, WorkerStats};
use crate::engine::split::compute_work_slices;
use crate::engine::state::SqsResult;

/// Everything a finished search hands back: the admitted configurations in
/// buffer order plus per-worker telemetry.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<SqsResult>,
    pub worker_stats: Vec<WorkerStats>,
}

/// Runs a complete SQS search for the given settings.
///
/// The workflow is a pure function of its settings: validate, build the
/// compressed parameter layout, partition the permutation space (or random
/// budget) across workers, drive the parallel search, and post-process the
/// candidates into final results.
#[instrument(skip_all, name = "sqs_search")]
pub fn run(
    settings: &IterationSettings,
    reporter: &ProgressReporter,
) -> Result<SearchOutcome, EngineError> {
    // --- Phase 1: Validation ---
    settings.validate()?;

    let (shell_ids, shell_weights) = settings.shell_indices_and_weights();
    info!(
        num_atoms = settings.num_atoms(),
        num_species = settings.num_species(),
        num_shells = shell_ids.len(),
        mode = ?settings.mode(),
        "Starting SQS search."
    );
    for (shell, weight) in shell_ids.iter().zip(&shell_weights) {
        debug!(shell, weight, "shell participates in the objective");
    }

    // --- Phase 2: Parameter layout ---
    let layout = ParamLayout::build(
        settings.num_species(),
        settings.num_shells(),
        settings.target_objective(),
        settings.prefactors(),
        settings.parameter_weights(),
        &shell_weights,
    );

    // --- Phase 3: Work splitting ---
    let num_workers = settings.num_threads().unwrap_or_else(default_worker_count).max(1);
    let slices = compute_work_slices(settings, num_workers)?;
    reporter.report(Progress::SearchStart {
        mode: settings.mode(),
        num_workers,
    });

    // --- Phase 4: Parallel search ---
    let (candidates, worker_stats) = run_search(settings, &layout, &slices, reporter)?;

    // --- Phase 5: Collection ---
    let results = collect_results(candidates, settings, &layout);
    reporter.report(Progress::SearchFinish {
        num_candidates: results.len(),
    });
    info!(num_results = results.len(), "Search finished.");

    Ok(SearchOutcome {
        results,
        worker_stats,
    })
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bonds::{count_pairs, pair_objective};
    use crate::core::rank::{next_permutation, total_permutations, unrank_permutation};
    use crate::core::types::SitePair;
    use crate::engine::config::{IterationMode, IterationSettingsBuilder};
    use num_bigint::BigUint;
    use num_traits::{ToPrimitive, Zero};
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    fn ring_pair_list(num_sites: usize) -> Vec<SitePair> {
        let mut pairs: Vec<SitePair> = (0..num_sites - 1)
            .map(|site| SitePair::new(site, site + 1, 0))
            .collect();
        pairs.push(SitePair::new(0, num_sites - 1, 0));
        pairs
    }

    fn ring_settings(
        configuration: Vec<u8>,
        num_species: usize,
        mode: IterationMode,
        num_output_configurations: usize,
        prefactor: f64,
    ) -> IterationSettingsBuilder {
        let num_sites = configuration.len();
        let square = num_species * num_species;
        IterationSettingsBuilder::new()
            .configuration(configuration)
            .mode(mode)
            .num_output_configurations(num_output_configurations)
            .shell_weights(BTreeMap::from([(0, 1.0)]))
            .target_objective(vec![0.0; square])
            .parameter_weights(vec![1.0; square])
            .prefactors(vec![prefactor; square])
            .pair_list(ring_pair_list(num_sites))
    }

    fn layout_for(settings: &IterationSettings) -> ParamLayout {
        let (_, shell_weights) = settings.shell_indices_and_weights();
        ParamLayout::build(
            settings.num_species(),
            settings.num_shells(),
            settings.target_objective(),
            settings.prefactors(),
            settings.parameter_weights(),
            &shell_weights,
        )
    }

    /// Reference scalar pass: every permutation in lexicographic order with
    /// its 1-based rank and objective.
    fn enumerate_objectives(settings: &IterationSettings) -> Vec<(BigUint, f64)> {
        let layout = layout_for(settings);
        let histogram = settings.histogram();
        let total = total_permutations(&histogram).to_u64().unwrap();
        let mut configuration = unrank_permutation(&histogram, &BigUint::zero()).unwrap();
        let mut bonds = vec![0.0; layout.reduced_len()];
        let mut sequence = Vec::with_capacity(total as usize);

        for rank in 0..total {
            count_pairs(
                &configuration,
                settings.pair_list(),
                &mut bonds,
                layout.reindexer(),
                settings.num_species(),
                true,
            );
            let objective = pair_objective(
                &mut bonds,
                layout.prefactors(),
                layout.weights(),
                layout.targets(),
            );
            sequence.push((BigUint::from(rank + 1), objective));
            next_permutation(&mut configuration);
        }
        sequence
    }

    #[test]
    fn trivial_two_site_search_returns_both_permutations() {
        let settings = ring_settings(vec![10, 20], 2, IterationMode::Systematic, 2, 1.0)
            .pair_list(vec![SitePair::new(0, 1, 0)])
            .num_threads(1)
            .build()
            .unwrap();

        let outcome = run(&settings, &ProgressReporter::new()).unwrap();

        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].objective, outcome.results[1].objective);
        let ranks: HashSet<BigUint> = outcome.results.iter().map(|r| r.rank.clone()).collect();
        assert_eq!(
            ranks,
            HashSet::from([BigUint::from(1u32), BigUint::from(2u32)])
        );
        for result in &outcome.results {
            let mut labels = result.configuration.clone();
            labels.sort_unstable();
            assert_eq!(labels, vec![10, 20]);
        }
    }

    #[test]
    fn binary_half_and_half_matches_the_brute_force_minimum() {
        let configuration = vec![5, 5, 5, 5, 9, 9, 9, 9];
        let settings = ring_settings(configuration, 2, IterationMode::Systematic, 70, 0.25)
            .num_threads(4)
            .build()
            .unwrap();

        let reference = enumerate_objectives(&settings);
        assert_eq!(reference.len(), 70);
        let brute_minimum = reference
            .iter()
            .map(|(_, objective)| *objective)
            .fold(f64::INFINITY, f64::min);

        let outcome = run(&settings, &ProgressReporter::new()).unwrap();

        let engine_minimum = outcome
            .results
            .iter()
            .map(|result| result.objective)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(engine_minimum, brute_minimum);

        // every permutation was visited exactly once across the workers
        let visited: u64 = outcome.worker_stats.iter().map(|s| s.iterations).sum();
        assert_eq!(visited, 70);
        assert_eq!(outcome.worker_stats.len(), 4);
    }

    #[test]
    fn ternary_single_worker_reproduces_the_reference_improvement_chain() {
        let configuration = vec![1, 1, 2, 2, 3, 3];
        let settings = ring_settings(configuration, 3, IterationMode::Systematic, 90, 0.5)
            .num_threads(1)
            .build()
            .unwrap();

        // simulate the admission rule over the reference sequence
        let mut local_best = f64::INFINITY;
        let mut expected = Vec::new();
        for (rank, objective) in enumerate_objectives(&settings) {
            if objective <= local_best {
                expected.push((rank, objective));
                local_best = objective;
            }
        }

        let outcome = run(&settings, &ProgressReporter::new()).unwrap();

        let actual: Vec<(BigUint, f64)> = outcome
            .results
            .iter()
            .map(|result| (result.rank.clone(), result.objective))
            .collect();
        assert_eq!(actual, expected);

        // the admission chain is non-increasing by construction
        for window in outcome.results.windows(2) {
            assert!(window[1].objective <= window[0].objective);
        }

        assert_eq!(outcome.worker_stats[0].iterations, 90);
    }

    #[test]
    fn random_mode_with_a_fixed_seed_is_reproducible() {
        let build = || {
            ring_settings(
                vec![1, 1, 2, 2, 3, 3],
                3,
                IterationMode::Random,
                5,
                0.5,
            )
            .num_iterations(10_000)
            .num_threads(1)
            .rng_seed(42)
            .build()
            .unwrap()
        };

        let first = run(&build(), &ProgressReporter::new()).unwrap();
        let second = run(&build(), &ProgressReporter::new()).unwrap();

        assert!(!first.results.is_empty());
        assert_eq!(first.results, second.results);
    }

    #[test]
    fn random_mode_results_have_unique_ranks() {
        let settings = ring_settings(
            vec![1, 1, 2, 2, 3, 3],
            3,
            IterationMode::Random,
            16,
            0.5,
        )
        .num_iterations(5_000)
        .num_threads(2)
        .rng_seed(7)
        .build()
        .unwrap();

        let outcome = run(&settings, &ProgressReporter::new()).unwrap();

        let ranks: HashSet<BigUint> = outcome
            .results
            .iter()
            .map(|result| result.rank.clone())
            .collect();
        assert_eq!(ranks.len(), outcome.results.len());

        let visited: u64 = outcome.worker_stats.iter().map(|s| s.iterations).sum();
        assert_eq!(visited, 5_000);
    }

    #[test]
    fn search_reports_progress_events() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));

        let settings = ring_settings(vec![10, 20], 2, IterationMode::Systematic, 2, 1.0)
            .pair_list(vec![SitePair::new(0, 1, 0)])
            .num_threads(2)
            .build()
            .unwrap();
        run(&settings, &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert!(matches!(events.first(), Some(Progress::SearchStart { num_workers: 2, .. })));
        assert!(matches!(events.last(), Some(Progress::SearchFinish { .. })));
        let worker_events = events
            .iter()
            .filter(|event| matches!(event, Progress::WorkerFinish { .. }))
            .count();
        assert_eq!(worker_events, 2);
    }

    #[test]
    fn validation_failures_surface_before_any_worker_runs() {
        let settings = ring_settings(vec![10, 20], 2, IterationMode::Random, 2, 1.0)
            .pair_list(vec![SitePair::new(0, 1, 0)])
            .build()
            .unwrap();
        // random mode without a budget is rejected up front
        assert!(matches!(
            run(&settings, &ProgressReporter::new()),
            Err(EngineError::InvalidMode(_))
        ));
    }
}
