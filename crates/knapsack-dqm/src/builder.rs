use knapsack_dqm_solver::{DiscreteQuadraticModel, DqmError};
use thiserror::Error;
use tracing::debug;

use crate::items::Items;
use crate::variable::KnapsackVariable;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Item arrays differ in length: {costs} costs, {weights} weights, {numbers} numbers")]
    LengthMismatch {
        costs: usize,
        weights: usize,
        numbers: usize,
    },
    #[error("Weight capacity must be at least 1")]
    ZeroCapacity,
    #[error("No items to choose from")]
    NoItems,
    #[error("Invalid cost {value} for item {index}")]
    InvalidCost { index: usize, value: f64 },
    #[error("Invalid weight {value} for item {index}")]
    InvalidWeight { index: usize, value: f64 },
    #[error("Penalty multiplier must be finite and non-negative, got {0}")]
    InvalidPenalty(f64),
    #[error("Coefficients are too large: energies would overflow")]
    EnergyOverflow,
    #[error(transparent)]
    Model(#[from] DqmError),
}

/// How the penalty multiplier on the weight constraint is chosen
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Penalty {
    /// Largest item cost
    #[default]
    MaxCost,
    Fixed(f64),
}

impl Penalty {
    pub fn resolve(&self, items: &Items) -> Result<f64, BuildError> {
        match *self {
            Penalty::MaxCost => items.max_cost().ok_or(BuildError::NoItems),
            Penalty::Fixed(value) if value.is_finite() && value >= 0.0 => Ok(value),
            Penalty::Fixed(value) => Err(BuildError::InvalidPenalty(value)),
        }
    }
}

/// Builds the discrete quadratic model of a bounded knapsack problem.
///
/// The objective is `-Σ costs[i]·x_i + λ·(Σ weights[i]·x_i − y)²` expanded
/// into linear and pairwise tables, with `x_i` in `0..=numbers[i]` and the
/// slack `y` in `1..=capacity`.
#[derive(Debug, Clone, Default)]
pub struct KnapsackDqmBuilder {
    penalty: Penalty,
}

impl KnapsackDqmBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_penalty(mut self, penalty: Penalty) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn build(
        &self,
        items: &Items,
        capacity: usize,
    ) -> Result<DiscreteQuadraticModel<KnapsackVariable>, BuildError> {
        if items.is_empty() {
            return Err(BuildError::NoItems);
        }
        if capacity == 0 {
            return Err(BuildError::ZeroCapacity);
        }
        let lagrange = self.penalty.resolve(items)?;

        let costs = items.costs();
        let weights = items.weights();
        let numbers = items.numbers();
        let m = items.len();

        let mut dqm = DiscreteQuadraticModel::new();
        for (i, &n) in numbers.iter().enumerate() {
            dqm.add_variable(n + 1, KnapsackVariable::Item(i))?;
        }
        dqm.add_variable(capacity, KnapsackVariable::Slack)?;

        // x_i
        for i in 0..m {
            let biases = (0..=numbers[i])
                .map(|q| {
                    let q = q as f64;
                    -costs[i] * q + lagrange * weights[i] * weights[i] * q * q
                })
                .collect();
            dqm.set_linear(&KnapsackVariable::Item(i), biases)?;
        }

        // x_i x_j
        for i in 0..m {
            for j in (i + 1)..m {
                let table = (0..=numbers[i])
                    .map(|qi| {
                        (0..=numbers[j])
                            .map(|qj| 2.0 * lagrange * weights[i] * weights[j] * (qi * qj) as f64)
                            .collect()
                    })
                    .collect();
                dqm.set_quadratic(&KnapsackVariable::Item(i), &KnapsackVariable::Item(j), table)?;
            }
        }

        // y
        let slack = (1..=capacity)
            .map(|v| lagrange * (v * v) as f64)
            .collect();
        dqm.set_linear(&KnapsackVariable::Slack, slack)?;

        // x_i y
        for i in 0..m {
            let table = (0..=numbers[i])
                .map(|qi| {
                    (1..=capacity)
                        .map(|v| -2.0 * lagrange * weights[i] * (qi * v) as f64)
                        .collect()
                })
                .collect();
            dqm.set_quadratic(&KnapsackVariable::Item(i), &KnapsackVariable::Slack, table)?;
        }

        if !dqm.energy_bound().is_finite() {
            return Err(BuildError::EnergyOverflow);
        }

        debug!(
            items = m,
            capacity,
            lagrange,
            interactions = dqm.num_interactions(),
            "built knapsack model"
        );
        Ok(dqm)
    }
}

/// Build the knapsack model from raw arrays with the default penalty
pub fn build_knapsack_dqm(
    costs: &[f64],
    weights: &[f64],
    numbers: &[usize],
    capacity: usize,
) -> Result<DiscreteQuadraticModel<KnapsackVariable>, BuildError> {
    let items = Items::new(costs.to_vec(), weights.to_vec(), numbers.to_vec())?;
    KnapsackDqmBuilder::new().build(&items, capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use knapsack_dqm_solver::{ExactSolver, Sampler};

    use KnapsackVariable::{Item, Slack};

    /// Case vector in model order from item quantities and a slack value
    fn assignment(quantities: &[usize], slack: usize) -> Vec<usize> {
        let mut cases = quantities.to_vec();
        cases.push(slack - 1);
        cases
    }

    fn exact_quantities(costs: &[f64], weights: &[f64], numbers: &[usize], capacity: usize) -> Vec<usize> {
        let dqm = build_knapsack_dqm(costs, weights, numbers, capacity).unwrap();
        let set = ExactSolver::new().sample_dqm(&dqm, "test").unwrap();
        let best = set.first().unwrap();
        best.cases[..costs.len()].to_vec()
    }

    #[test]
    fn test_two_item_example() {
        let dqm = build_knapsack_dqm(&[10.0, 6.0], &[5.0, 4.0], &[1, 1], 5).unwrap();

        // λ = 10: −10 + 10·25 (x0) + 10·25 (y) − 2·10·5·5 (x0 y)
        let energy = dqm.energy(&assignment(&[1, 0], 5)).unwrap();
        assert_eq!(energy, -10.0);

        let set = ExactSolver::new().sample_dqm(&dqm, "test").unwrap();
        let best = set.first().unwrap();
        println!("Best: {:?}", best);
        assert_eq!(best.cases, assignment(&[1, 0], 5));
        assert_eq!(best.energy, energy);
    }

    #[test]
    fn test_coefficients() {
        let dqm = build_knapsack_dqm(&[3.0, 5.0], &[2.0, 3.0], &[2, 1], 4).unwrap();
        // λ = 5
        assert_eq!(dqm.get_linear(&Item(0)).unwrap(), &[0.0, -3.0 + 20.0, -6.0 + 80.0]);
        assert_eq!(dqm.get_linear(&Item(1)).unwrap(), &[0.0, -5.0 + 45.0]);
        assert_eq!(dqm.get_linear(&Slack).unwrap(), &[5.0, 20.0, 45.0, 80.0]);

        let x0x1 = dqm.get_quadratic(&Item(0), &Item(1)).unwrap().unwrap();
        assert_eq!(x0x1, vec![vec![0.0, 0.0], vec![0.0, 60.0], vec![0.0, 120.0]]);

        let x1y = dqm.get_quadratic(&Item(1), &Slack).unwrap().unwrap();
        assert_eq!(x1y, vec![vec![0.0; 4], vec![-30.0, -60.0, -90.0, -120.0]]);
    }

    #[test]
    fn test_domain_sizes() {
        let numbers = [3, 0, 2, 5];
        let dqm = build_knapsack_dqm(&[1.0, 2.0, 3.0, 4.0], &[1.0, 1.0, 2.0, 1.0], &numbers, 7).unwrap();

        assert_eq!(dqm.num_variables(), numbers.len() + 1);
        for (i, &n) in numbers.iter().enumerate() {
            assert_eq!(dqm.num_cases(&Item(i)).unwrap(), n + 1, "item {}", i);
            assert_eq!(dqm.get_linear(&Item(i)).unwrap().len(), n + 1);
        }
        assert_eq!(dqm.num_cases(&Slack).unwrap(), 7);
        assert_eq!(dqm.variables().last(), Some(&Slack));
    }

    #[test]
    fn test_quadratic_symmetry() {
        let dqm = build_knapsack_dqm(&[4.0, 2.0, 7.0], &[3.0, 1.0, 2.0], &[2, 3, 1], 6).unwrap();
        let labels = dqm.variables().to_vec();
        for u in &labels {
            for v in &labels {
                if u == v {
                    continue;
                }
                let uv = dqm.get_quadratic(u, v).unwrap().unwrap();
                let vu = dqm.get_quadratic(v, u).unwrap().unwrap();
                for (cu, row) in uv.iter().enumerate() {
                    for (cv, &bias) in row.iter().enumerate() {
                        assert_eq!(bias, vu[cv][cu], "{} {} at ({}, {})", u, v, cu, cv);
                    }
                }
            }
        }
    }

    #[test]
    fn test_energy_is_penalized_objective() {
        let costs = [4.0, 2.0, 7.0];
        let weights = [3.0, 1.0, 2.0];
        let dqm = build_knapsack_dqm(&costs, &weights, &[2, 3, 1], 6).unwrap();
        let lagrange = 7.0;

        for (quantities, slack) in [([0, 0, 0], 1), ([1, 2, 0], 5), ([2, 3, 1], 6), ([0, 1, 1], 2)] {
            let cost: f64 = quantities.iter().zip(&costs).map(|(&q, c)| q as f64 * c).sum();
            let weight: f64 = quantities.iter().zip(&weights).map(|(&q, w)| q as f64 * w).sum();
            let expected = -cost + lagrange * (weight - slack as f64).powi(2);
            let energy = dqm.energy(&assignment(&quantities, slack)).unwrap();
            assert_eq!(energy, expected, "quantities {:?}, y = {}", quantities, slack);
        }
    }

    #[test]
    fn test_selects_everything_when_capacity_allows() {
        let numbers = [1, 2, 1];
        let chosen = exact_quantities(&[3.0, 5.0, 4.0], &[2.0, 3.0, 1.0], &numbers, 9);
        assert_eq!(chosen, numbers.to_vec());
    }

    #[test]
    fn test_selects_best_subset_within_capacity() {
        // Items 1 and 2 together (cost 14, weight 6) beat item 0 alone (cost 10)
        let chosen = exact_quantities(&[10.0, 7.0, 7.0], &[4.0, 3.0, 3.0], &[1, 1, 1], 6);
        assert_eq!(chosen, vec![0, 1, 1]);
    }

    #[test]
    fn test_zero_number_is_single_case() {
        let dqm = build_knapsack_dqm(&[10.0, 6.0], &[5.0, 4.0], &[0, 1], 5).unwrap();
        assert_eq!(dqm.num_cases(&Item(0)).unwrap(), 1);
        assert_eq!(dqm.get_linear(&Item(0)).unwrap(), &[0.0]);

        let chosen = exact_quantities(&[10.0, 6.0], &[5.0, 4.0], &[0, 1], 5);
        assert_eq!(chosen, vec![0, 1]);
    }

    #[test]
    fn test_fixed_penalty() {
        let items = Items::new(vec![10.0, 6.0], vec![5.0, 4.0], vec![1, 1]).unwrap();
        let dqm = KnapsackDqmBuilder::new()
            .with_penalty(Penalty::Fixed(2.5))
            .build(&items, 5)
            .unwrap();
        assert_eq!(dqm.get_linear(&Slack).unwrap()[0], 2.5);

        let err = KnapsackDqmBuilder::new()
            .with_penalty(Penalty::Fixed(-1.0))
            .build(&items, 5)
            .unwrap_err();
        assert_eq!(err, BuildError::InvalidPenalty(-1.0));
    }

    #[test]
    fn test_overflowing_coefficients_are_rejected() {
        // λ·w² overflows to infinity
        let err = build_knapsack_dqm(&[1e200, 1.0], &[1e200, 1.0], &[1, 1], 2).unwrap_err();
        assert!(
            matches!(err, BuildError::Model(DqmError::NonFiniteBias { .. })),
            "unexpected error: {:?}",
            err
        );

        // Every bias is finite but their sum is not
        let items = Items::new(vec![1.0, 1.0], vec![1.0, 1.0], vec![1, 1]).unwrap();
        let err = KnapsackDqmBuilder::new()
            .with_penalty(Penalty::Fixed(f64::MAX / 4.0))
            .build(&items, 1)
            .unwrap_err();
        assert_eq!(err, BuildError::EnergyOverflow);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(
            build_knapsack_dqm(&[1.0], &[1.0], &[1], 0).unwrap_err(),
            BuildError::ZeroCapacity
        );
        assert_eq!(build_knapsack_dqm(&[], &[], &[], 5).unwrap_err(), BuildError::NoItems);
        assert_eq!(
            build_knapsack_dqm(&[1.0, 2.0], &[1.0, 2.0], &[1], 5).unwrap_err(),
            BuildError::LengthMismatch { costs: 2, weights: 2, numbers: 1 }
        );
    }
}
