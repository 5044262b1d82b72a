use tracing::debug;

use crate::model::{DiscreteQuadraticModel, Label};
use crate::sample::{Sample, SampleSet};
use crate::sampler::{Sampler, SamplerError};

/// Brute-force sampler that evaluates every assignment
pub struct ExactSolver {
    /// Refuse models with more states than this
    max_states: u128,
    /// How many of the lowest-energy assignments to return
    num_best: usize,
}

impl Default for ExactSolver {
    fn default() -> Self {
        Self {
            max_states: 1 << 24,
            num_best: 1,
        }
    }
}

impl ExactSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_states(mut self, max: u128) -> Self {
        self.max_states = max;
        self
    }

    pub fn with_num_best(mut self, n: usize) -> Self {
        self.num_best = n;
        self
    }
}

impl Sampler for ExactSolver {
    fn sample_dqm<V: Label>(
        &self,
        model: &DiscreteQuadraticModel<V>,
        label: &str,
    ) -> Result<SampleSet<V>, SamplerError> {
        if model.num_variables() == 0 {
            return Err(SamplerError::EmptyModel);
        }
        if self.num_best == 0 {
            return Err(SamplerError::InvalidParameter("num_best must be at least 1".to_string()));
        }
        let states = model.num_states().unwrap_or(u128::MAX);
        if states > self.max_states {
            return Err(SamplerError::TooManyStates {
                states,
                limit: self.max_states,
            });
        }

        debug!(label, states, variables = model.num_variables(), "exact enumeration");

        let radix = model.cases();
        let mut cases = vec![0usize; radix.len()];
        let mut best: Vec<Sample> = Vec::with_capacity(self.num_best);

        loop {
            let energy = model.energy_unchecked(&cases);
            let full = best.len() == self.num_best;
            if !full || best.last().is_some_and(|worst| energy < worst.energy) {
                if full {
                    best.pop();
                }
                // Equal energies keep enumeration order
                let pos = best.partition_point(|s| s.energy <= energy);
                best.insert(pos, Sample { cases: cases.clone(), energy });
            }

            // Mixed-radix increment, first variable fastest
            let mut carry = true;
            for (case, &n) in cases.iter_mut().zip(&radix) {
                *case += 1;
                if *case < n {
                    carry = false;
                    break;
                }
                *case = 0;
            }
            if carry {
                break;
            }
        }

        Ok(SampleSet::new(model.variables().to_vec(), best, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frustrated_model() -> DiscreteQuadraticModel<u32> {
        // Three variables whose pairwise tables reward disagreement
        let mut dqm = DiscreteQuadraticModel::new();
        for v in 0..3 {
            dqm.add_variable(3, v).unwrap();
        }
        let differ = |a: usize, b: usize| if a == b { 1.0 } else { -1.0 };
        for (u, v) in [(0, 1), (1, 2), (0, 2)] {
            let table = (0..3).map(|a| (0..3).map(|b| differ(a, b)).collect()).collect();
            dqm.set_quadratic(&u, &v, table).unwrap();
        }
        dqm.set_linear(&0, vec![0.0, 0.0, 0.5]).unwrap();
        dqm
    }

    #[test]
    fn test_finds_global_minimum() {
        let dqm = frustrated_model();
        let set = ExactSolver::new().sample_dqm(&dqm, "test").unwrap();

        let best = set.first().unwrap();
        println!("Best: {:?}", best);
        assert_eq!(best.energy, -3.0);
        assert_ne!(best.cases[0], 2, "variable 0 should avoid its penalized case");
        let mut distinct = best.cases.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 3, "all variables should disagree: {:?}", best.cases);
    }

    #[test]
    fn test_num_best_returns_sorted_samples() {
        let dqm = frustrated_model();
        let set = ExactSolver::new().with_num_best(5).sample_dqm(&dqm, "test").unwrap();

        assert_eq!(set.len(), 5);
        for pair in set.samples.windows(2) {
            assert!(pair[0].energy <= pair[1].energy, "samples out of order");
        }
        for sample in &set.samples {
            assert_eq!(dqm.energy(&sample.cases).unwrap(), sample.energy);
        }
    }

    #[test]
    fn test_state_limit() {
        let dqm = frustrated_model();
        let err = ExactSolver::new().with_max_states(26).sample_dqm(&dqm, "test").unwrap_err();
        assert_eq!(err, SamplerError::TooManyStates { states: 27, limit: 26 });
    }

    #[test]
    fn test_empty_model() {
        let dqm: DiscreteQuadraticModel<u32> = DiscreteQuadraticModel::new();
        let err = ExactSolver::new().sample_dqm(&dqm, "test").unwrap_err();
        assert_eq!(err, SamplerError::EmptyModel);
    }
}
