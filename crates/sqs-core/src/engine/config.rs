use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::EngineError;
use crate::core::pack::pack_configuration;
use crate::core::rank::configuration_histogram;
use crate::core::types::{Configuration, SitePair, Species};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// How candidate configurations are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationMode {
    /// Independent uniform shuffles; the budget is `num_iterations`.
    Random,
    /// Exhaustive lexicographic enumeration of the whole permutation space.
    Systematic,
}

/// Validated input to a search run.
///
/// Built through [`IterationSettingsBuilder`]; all geometric preprocessing
/// (shell matrix, pair list, prefactors) happens upstream. The settings are
/// immutable and shared read-only across workers.
#[derive(Debug, Clone)]
pub struct IterationSettings {
    configuration: Configuration,
    pack_indices: Vec<Species>,
    packed_configuration: Configuration,
    mode: IterationMode,
    num_iterations: Option<u64>,
    num_output_configurations: usize,
    shell_weights: BTreeMap<usize, f64>,
    target_objective: Vec<f64>,
    parameter_weights: Vec<f64>,
    prefactors: Vec<f64>,
    pair_list: Vec<SitePair>,
    rng_seed: Option<u64>,
    num_threads: Option<usize>,
}

impl IterationSettings {
    pub fn builder() -> IterationSettingsBuilder {
        IterationSettingsBuilder::default()
    }

    pub fn mode(&self) -> IterationMode {
        self.mode
    }

    pub fn num_atoms(&self) -> usize {
        self.configuration.len()
    }

    pub fn num_species(&self) -> usize {
        self.pack_indices.len()
    }

    /// Number of shells that actually participate, i.e. carry a nonzero weight.
    pub fn num_shells(&self) -> usize {
        self.shell_weights.values().filter(|&&w| w != 0.0).count()
    }

    pub fn num_iterations(&self) -> Option<u64> {
        self.num_iterations
    }

    pub fn num_output_configurations(&self) -> usize {
        self.num_output_configurations
    }

    pub fn configuration(&self) -> &[Species] {
        &self.configuration
    }

    pub fn pack_indices(&self) -> &[Species] {
        &self.pack_indices
    }

    pub fn packed_configuration(&self) -> &[Species] {
        &self.packed_configuration
    }

    pub fn histogram(&self) -> Vec<usize> {
        configuration_histogram(&self.packed_configuration, self.num_species())
    }

    /// Shell ids and weights of the participating shells, ascending by id.
    /// The pair list's shell indices address positions in this ordering.
    pub fn shell_indices_and_weights(&self) -> (Vec<usize>, Vec<f64>) {
        self.shell_weights
            .iter()
            .filter(|(_, &weight)| weight != 0.0)
            .map(|(&shell, &weight)| (shell, weight))
            .unzip()
    }

    pub fn target_objective(&self) -> &[f64] {
        &self.target_objective
    }

    pub fn parameter_weights(&self) -> &[f64] {
        &self.parameter_weights
    }

    pub fn prefactors(&self) -> &[f64] {
        &self.prefactors
    }

    pub fn pair_list(&self) -> &[SitePair] {
        &self.pair_list
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    pub fn num_threads(&self) -> Option<usize> {
        self.num_threads
    }

    /// Full consistency check, run once at workflow entry before any worker
    /// is spawned. The hot loop relies on every invariant verified here.
    pub fn validate(&self) -> Result<(), EngineError> {
        let num_atoms = self.num_atoms();
        let num_species = self.num_species();
        let num_shells = self.num_shells();
        let square = num_species * num_species;

        if num_atoms == 0 {
            return Err(EngineError::InvalidHistogram(
                "configuration contains no sites".into(),
            ));
        }
        if num_shells == 0 {
            return Err(EngineError::InvalidMode(
                "no shell carries a nonzero weight".into(),
            ));
        }

        if self.target_objective.len() != num_shells * square {
            return Err(EngineError::InvalidHistogram(format!(
                "target objective has {} entries, expected {} ({} shells x {} species squared)",
                self.target_objective.len(),
                num_shells * square,
                num_shells,
                num_species
            )));
        }
        if self.prefactors.len() != num_shells * square {
            return Err(EngineError::InvalidHistogram(format!(
                "prefactors have {} entries, expected {}",
                self.prefactors.len(),
                num_shells * square
            )));
        }
        if self.parameter_weights.len() != square {
            return Err(EngineError::InvalidHistogram(format!(
                "parameter weights have {} entries, expected {}",
                self.parameter_weights.len(),
                square
            )));
        }

        for (index, pair) in self.pair_list.iter().enumerate() {
            if pair.i >= pair.j {
                return Err(EngineError::InvalidPairList {
                    index,
                    reason: format!("sites must satisfy i < j, got ({}, {})", pair.i, pair.j),
                });
            }
            if pair.j >= num_atoms {
                return Err(EngineError::InvalidPairList {
                    index,
                    reason: format!("site {} is out of range for {} sites", pair.j, num_atoms),
                });
            }
            if pair.shell >= num_shells {
                return Err(EngineError::InvalidPairList {
                    index,
                    reason: format!(
                        "shell {} is out of range for {} used shells",
                        pair.shell, num_shells
                    ),
                });
            }
        }

        if self.mode == IterationMode::Random && self.num_iterations.is_none() {
            return Err(EngineError::InvalidMode(
                "random mode requires num_iterations".into(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct IterationSettingsBuilder {
    configuration: Option<Configuration>,
    mode: Option<IterationMode>,
    num_iterations: Option<u64>,
    num_output_configurations: Option<usize>,
    shell_weights: Option<BTreeMap<usize, f64>>,
    target_objective: Option<Vec<f64>>,
    parameter_weights: Option<Vec<f64>>,
    prefactors: Option<Vec<f64>>,
    pair_list: Option<Vec<SitePair>>,
    rng_seed: Option<u64>,
    num_threads: Option<usize>,
}

impl IterationSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configuration(mut self, configuration: Vec<Species>) -> Self {
        self.configuration = Some(configuration);
        self
    }

    pub fn mode(mut self, mode: IterationMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn num_iterations(mut self, num_iterations: u64) -> Self {
        self.num_iterations = Some(num_iterations);
        self
    }

    pub fn num_output_configurations(mut self, count: usize) -> Self {
        self.num_output_configurations = Some(count);
        self
    }

    pub fn shell_weights(mut self, shell_weights: BTreeMap<usize, f64>) -> Self {
        self.shell_weights = Some(shell_weights);
        self
    }

    pub fn target_objective(mut self, target_objective: Vec<f64>) -> Self {
        self.target_objective = Some(target_objective);
        self
    }

    pub fn parameter_weights(mut self, parameter_weights: Vec<f64>) -> Self {
        self.parameter_weights = Some(parameter_weights);
        self
    }

    pub fn prefactors(mut self, prefactors: Vec<f64>) -> Self {
        self.prefactors = Some(prefactors);
        self
    }

    pub fn pair_list(mut self, pair_list: Vec<SitePair>) -> Self {
        self.pair_list = Some(pair_list);
        self
    }

    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn build(self) -> Result<IterationSettings, ConfigError> {
        let configuration = self
            .configuration
            .ok_or(ConfigError::MissingParameter("configuration"))?;
        let mode = self.mode.ok_or(ConfigError::MissingParameter("mode"))?;
        let num_output_configurations = self
            .num_output_configurations
            .ok_or(ConfigError::MissingParameter("num_output_configurations"))?;
        let shell_weights = self
            .shell_weights
            .ok_or(ConfigError::MissingParameter("shell_weights"))?;
        let target_objective = self
            .target_objective
            .ok_or(ConfigError::MissingParameter("target_objective"))?;
        let parameter_weights = self
            .parameter_weights
            .ok_or(ConfigError::MissingParameter("parameter_weights"))?;
        let prefactors = self
            .prefactors
            .ok_or(ConfigError::MissingParameter("prefactors"))?;
        let pair_list = self
            .pair_list
            .ok_or(ConfigError::MissingParameter("pair_list"))?;

        let (pack_indices, packed_configuration) = pack_configuration(&configuration);

        Ok(IterationSettings {
            configuration,
            pack_indices,
            packed_configuration,
            mode,
            num_iterations: self.num_iterations,
            num_output_configurations,
            shell_weights,
            target_objective,
            parameter_weights,
            prefactors,
            pair_list,
            rng_seed: self.rng_seed,
            num_threads: self.num_threads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_builder() -> IterationSettingsBuilder {
        IterationSettings::builder()
            .configuration(vec![0, 1])
            .mode(IterationMode::Systematic)
            .num_output_configurations(1)
            .shell_weights(BTreeMap::from([(0, 1.0)]))
            .target_objective(vec![0.0; 4])
            .parameter_weights(vec![1.0; 4])
            .prefactors(vec![1.0; 4])
            .pair_list(vec![SitePair::new(0, 1, 0)])
    }

    #[test]
    fn build_fails_without_a_configuration() {
        let result = IterationSettings::builder()
            .mode(IterationMode::Systematic)
            .build();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingParameter("configuration")
        );
    }

    #[test]
    fn build_packs_the_configuration() {
        let settings = minimal_builder()
            .configuration(vec![30, 10, 30])
            .pair_list(vec![SitePair::new(0, 1, 0), SitePair::new(1, 2, 0)])
            .build()
            .unwrap();
        assert_eq!(settings.pack_indices(), &[10, 30]);
        assert_eq!(settings.packed_configuration(), &[1, 0, 1]);
        assert_eq!(settings.histogram(), vec![1, 2]);
    }

    #[test]
    fn validate_accepts_a_minimal_systematic_setup() {
        let settings = minimal_builder().build().unwrap();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validate_rejects_an_empty_configuration() {
        let settings = minimal_builder()
            .configuration(vec![])
            .pair_list(vec![])
            .build()
            .unwrap();
        assert!(matches!(
            settings.validate(),
            Err(EngineError::InvalidHistogram(_))
        ));
    }

    #[test]
    fn validate_rejects_all_zero_shell_weights() {
        let settings = minimal_builder()
            .shell_weights(BTreeMap::from([(0, 0.0)]))
            .build()
            .unwrap();
        assert!(matches!(settings.validate(), Err(EngineError::InvalidMode(_))));
    }

    #[test]
    fn validate_rejects_mismatched_target_dimensions() {
        let settings = minimal_builder()
            .target_objective(vec![0.0; 9])
            .build()
            .unwrap();
        assert!(matches!(
            settings.validate(),
            Err(EngineError::InvalidHistogram(_))
        ));
    }

    #[test]
    fn validate_rejects_unordered_pair_entries() {
        let settings = minimal_builder()
            .pair_list(vec![SitePair::new(1, 0, 0)])
            .build()
            .unwrap();
        assert!(matches!(
            settings.validate(),
            Err(EngineError::InvalidPairList { index: 0, .. })
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_sites_and_shells() {
        let settings = minimal_builder()
            .pair_list(vec![SitePair::new(0, 5, 0)])
            .build()
            .unwrap();
        assert!(matches!(
            settings.validate(),
            Err(EngineError::InvalidPairList { .. })
        ));

        let settings = minimal_builder()
            .pair_list(vec![SitePair::new(0, 1, 3)])
            .build()
            .unwrap();
        assert!(matches!(
            settings.validate(),
            Err(EngineError::InvalidPairList { .. })
        ));
    }

    #[test]
    fn validate_rejects_random_mode_without_a_budget() {
        let settings = minimal_builder()
            .mode(IterationMode::Random)
            .build()
            .unwrap();
        assert!(matches!(settings.validate(), Err(EngineError::InvalidMode(_))));
    }

    #[test]
    fn zero_weight_shells_are_dropped_from_the_ordering() {
        let settings = minimal_builder()
            .shell_weights(BTreeMap::from([(2, 0.5), (5, 0.0), (1, 2.0)]))
            .target_objective(vec![0.0; 8])
            .prefactors(vec![1.0; 8])
            .build()
            .unwrap();
        assert_eq!(settings.num_shells(), 2);
        let (shells, weights) = settings.shell_indices_and_weights();
        assert_eq!(shells, vec![1, 2]);
        assert_eq!(weights, vec![2.0, 0.5]);
    }
}
