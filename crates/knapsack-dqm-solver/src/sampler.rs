use thiserror::Error;

use crate::model::{DiscreteQuadraticModel, DqmError, Label};
use crate::sample::SampleSet;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    #[error("Model has no variables")]
    EmptyModel,
    #[error("Model has {states} states, more than the exact solver limit of {limit}")]
    TooManyStates { states: u128, limit: u128 },
    #[error("Invalid sampler parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Model(#[from] DqmError),
}

/// Something that returns low-energy assignments for a discrete quadratic model.
///
/// Solvers never construct a sampler themselves; callers pass one in.
pub trait Sampler {
    /// Sample `model`. `label` tags the run in logs and in the returned set.
    fn sample_dqm<V: Label>(
        &self,
        model: &DiscreteQuadraticModel<V>,
        label: &str,
    ) -> Result<SampleSet<V>, SamplerError>;
}

impl<S: Sampler> Sampler for &S {
    fn sample_dqm<V: Label>(
        &self,
        model: &DiscreteQuadraticModel<V>,
        label: &str,
    ) -> Result<SampleSet<V>, SamplerError> {
        (**self).sample_dqm(model, label)
    }
}
