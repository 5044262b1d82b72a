mod anneal;
mod exact;
mod model;
mod sample;
mod sampler;

pub use anneal::SimulatedAnnealingSampler;
pub use exact::ExactSolver;
pub use model::{DiscreteQuadraticModel, DqmError, Label};
pub use sample::{Sample, SampleSet};
pub use sampler::{Sampler, SamplerError};
