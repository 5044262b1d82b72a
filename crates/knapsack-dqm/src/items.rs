use crate::builder::BuildError;

/// A single item available for the knapsack
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub cost: f64,
    pub weight: f64,
    /// Maximum quantity available
    pub number: usize,
}

/// Aligned per-item arrays
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Items {
    costs: Vec<f64>,
    weights: Vec<f64>,
    numbers: Vec<usize>,
}

impl Items {
    /// Build from three arrays of equal length. Costs and weights must be
    /// finite and non-negative.
    pub fn new(costs: Vec<f64>, weights: Vec<f64>, numbers: Vec<usize>) -> Result<Self, BuildError> {
        if costs.len() != weights.len() || costs.len() != numbers.len() {
            return Err(BuildError::LengthMismatch {
                costs: costs.len(),
                weights: weights.len(),
                numbers: numbers.len(),
            });
        }
        for (index, (&cost, &weight)) in costs.iter().zip(&weights).enumerate() {
            if !cost.is_finite() || cost < 0.0 {
                return Err(BuildError::InvalidCost { index, value: cost });
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(BuildError::InvalidWeight { index, value: weight });
            }
        }
        Ok(Self { costs, weights, numbers })
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn numbers(&self) -> &[usize] {
        &self.numbers
    }

    pub fn get(&self, index: usize) -> Option<Item> {
        Some(Item {
            cost: *self.costs.get(index)?,
            weight: self.weights[index],
            number: self.numbers[index],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Item> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }

    pub fn max_cost(&self) -> Option<f64> {
        self.costs.iter().copied().reduce(f64::max)
    }
}
