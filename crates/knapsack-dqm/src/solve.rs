use std::collections::BTreeMap;

use knapsack_dqm_solver::{Sampler, SamplerError};
use thiserror::Error;
use tracing::{debug, info};

use crate::builder::{BuildError, KnapsackDqmBuilder, Penalty};
use crate::items::Items;
use crate::variable::KnapsackVariable;

/// Label attached to every sampler call
pub const SAMPLE_LABEL: &str = "Example - Knapsack";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("Sampler error: {0}")]
    Sampler(#[from] SamplerError),
    #[error("Sampler returned no samples")]
    NoSamples,
}

/// Decoded best sample
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct KnapsackSolution {
    /// Item index to chosen quantity, only for quantities above zero
    pub selected: BTreeMap<usize, usize>,
    /// Value of the slack variable
    pub slack: usize,
    pub energy: f64,
}

/// Build the model for `items`, sample it with `sampler` and decode the
/// lowest-energy sample
pub fn solve_knapsack<S: Sampler>(
    items: &Items,
    capacity: usize,
    penalty: Penalty,
    sampler: &S,
) -> Result<KnapsackSolution, SolveError> {
    let dqm = KnapsackDqmBuilder::new()
        .with_penalty(penalty)
        .build(items, capacity)?;

    let sampleset = sampler.sample_dqm(&dqm, SAMPLE_LABEL)?;
    let sample = sampleset.first().ok_or(SolveError::NoSamples)?;
    debug!(cases = ?sample.cases, "best sample");

    let mut selected = BTreeMap::new();
    let mut slack = 0;
    for (variable, case) in sampleset.assignment(sample) {
        let value = variable.value(case);
        match *variable {
            KnapsackVariable::Item(index) if value > 0 => {
                selected.insert(index, value);
            }
            KnapsackVariable::Item(_) => {}
            KnapsackVariable::Slack => slack = value,
        }
    }

    info!(energy = sample.energy, selected = selected.len(), slack, "solved knapsack");
    Ok(KnapsackSolution {
        selected,
        slack,
        energy: sample.energy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use knapsack_dqm_solver::{
        DiscreteQuadraticModel, ExactSolver, Label, SampleSet, SimulatedAnnealingSampler,
    };

    /// Sampler that always returns an empty sample set
    struct EmptySampler;

    impl Sampler for EmptySampler {
        fn sample_dqm<V: Label>(
            &self,
            model: &DiscreteQuadraticModel<V>,
            label: &str,
        ) -> Result<SampleSet<V>, SamplerError> {
            Ok(SampleSet::new(model.variables().to_vec(), Vec::new(), label))
        }
    }

    #[test]
    fn test_solve_exact() {
        let items = Items::new(vec![10.0, 6.0], vec![5.0, 4.0], vec![1, 1]).unwrap();
        let solution = solve_knapsack(&items, 5, Penalty::MaxCost, &ExactSolver::new()).unwrap();

        assert_eq!(solution.selected, BTreeMap::from([(0, 1)]));
        assert_eq!(solution.slack, 5);
        assert_eq!(solution.energy, -10.0);
    }

    #[test]
    fn test_solve_annealing_multiple_copies() {
        // Best: two copies of item 1 and one of item 2 (weight 7, cost 19)
        let items = Items::new(vec![4.0, 7.0, 5.0], vec![4.0, 3.0, 1.0], vec![1, 2, 1]).unwrap();
        let sampler = SimulatedAnnealingSampler::new().with_seed(11).with_num_reads(5);
        let solution = solve_knapsack(&items, 7, Penalty::MaxCost, &sampler).unwrap();

        println!("Solution: {:?}", solution);
        assert_eq!(solution.selected, BTreeMap::from([(1, 2), (2, 1)]));
        assert_eq!(solution.energy, -19.0);
    }

    #[test]
    fn test_solve_annealing_sample_rows() {
        // Rows of the bundled large.csv; the best selection at capacity 70 costs 840
        let rows = [
            (35.0, 3.0, 2), (85.0, 8.0, 1), (30.0, 2.0, 3), (50.0, 5.0, 2), (70.0, 7.0, 1),
            (80.0, 8.0, 2), (20.0, 1.0, 4), (65.0, 6.0, 1), (15.0, 2.0, 3), (45.0, 4.0, 2),
            (55.0, 6.0, 1), (40.0, 3.0, 2), (25.0, 2.0, 2), (60.0, 5.0, 1), (90.0, 9.0, 1),
        ];
        let items = Items::new(
            rows.iter().map(|r| r.0).collect(),
            rows.iter().map(|r| r.1).collect(),
            rows.iter().map(|r| r.2).collect(),
        )
        .unwrap();
        let sampler = SimulatedAnnealingSampler::new().with_seed(3);
        let solution = solve_knapsack(&items, 70, Penalty::MaxCost, &sampler).unwrap();

        let weight: f64 = solution.selected.iter().map(|(&i, &q)| items.weights()[i] * q as f64).sum();
        let cost: f64 = solution.selected.iter().map(|(&i, &q)| items.costs()[i] * q as f64).sum();
        println!("Solution: {:?} weight {} cost {}", solution, weight, cost);
        assert!(weight <= 70.0, "overweight selection: {}", weight);
        assert_eq!(cost, 840.0);
        assert!((solution.energy + 840.0).abs() < 1e-6, "energy {}", solution.energy);
    }

    #[test]
    fn test_empty_sample_set() {
        let items = Items::new(vec![1.0], vec![1.0], vec![1]).unwrap();
        let err = solve_knapsack(&items, 1, Penalty::MaxCost, &EmptySampler).unwrap_err();
        assert_eq!(err, SolveError::NoSamples);
    }

    #[test]
    fn test_build_errors_before_sampling() {
        let items = Items::new(vec![1.0], vec![1.0], vec![1]).unwrap();
        let err = solve_knapsack(&items, 0, Penalty::MaxCost, &EmptySampler).unwrap_err();
        assert_eq!(err, SolveError::Build(BuildError::ZeroCapacity));
    }

    #[test]
    fn test_sampler_errors_propagate() {
        let items = Items::new(vec![1.0; 4], vec![1.0; 4], vec![9; 4]).unwrap();
        let sampler = ExactSolver::new().with_max_states(100);
        let err = solve_knapsack(&items, 30, Penalty::MaxCost, &sampler).unwrap_err();
        assert!(matches!(err, SolveError::Sampler(SamplerError::TooManyStates { .. })));
    }
}
