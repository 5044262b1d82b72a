use std::cmp::Ordering;

use crate::model::Label;

/// One assignment returned by a sampler
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Chosen case for each variable, in model variable order
    pub cases: Vec<usize>,
    /// Energy of the assignment
    pub energy: f64,
}

/// Samples returned by a sampler, lowest energy first
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct SampleSet<V: Label> {
    /// Variable labels, in the order used by [`Sample::cases`]
    pub variables: Vec<V>,
    pub samples: Vec<Sample>,
    /// Label the sampler was called with
    pub label: String,
}

impl<V: Label> SampleSet<V> {
    pub fn new(variables: Vec<V>, mut samples: Vec<Sample>, label: impl Into<String>) -> Self {
        samples.sort_by(|a, b| a.energy.partial_cmp(&b.energy).unwrap_or(Ordering::Equal));
        Self {
            variables,
            samples,
            label: label.into(),
        }
    }

    /// The lowest-energy sample
    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Pair each variable label with its case in `sample`
    pub fn assignment<'a>(&'a self, sample: &'a Sample) -> impl Iterator<Item = (&'a V, usize)> + 'a {
        self.variables.iter().zip(sample.cases.iter().copied())
    }
}
