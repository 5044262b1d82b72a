use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::model::{DiscreteQuadraticModel, Label};
use crate::sample::{Sample, SampleSet};
use crate::sampler::{Sampler, SamplerError};

/// Metropolis simulated annealing over discrete cases.
///
/// Each read starts from a uniformly random assignment and performs
/// `num_sweeps` sweeps. A sweep proposes, for every variable in turn, a move
/// to a uniformly chosen different case. The move is paired with the single
/// neighbour switch that lowers the energy most given the new case, if any,
/// so tightly coupled variables (an item and the slack that tracks its
/// weight) can change together. The inverse temperature follows a geometric
/// schedule from `beta_range.0` to `beta_range.1`, and each read ends with a
/// greedy descent over the same paired moves. The best state visited during a
/// read is reported as that read's sample.
///
/// This is a heuristic: it returns low-energy samples, not a proven minimum.
pub struct SimulatedAnnealingSampler {
    num_reads: usize,
    num_sweeps: usize,
    /// Inverse temperature at the first and last sweep
    beta_range: Option<(f64, f64)>,
    seed: Option<u64>,
}

impl Default for SimulatedAnnealingSampler {
    fn default() -> Self {
        Self {
            num_reads: 10,
            num_sweeps: 1000,
            beta_range: None,
            seed: None,
        }
    }
}

impl SimulatedAnnealingSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_reads(mut self, n: usize) -> Self {
        self.num_reads = n;
        self
    }

    pub fn with_num_sweeps(mut self, n: usize) -> Self {
        self.num_sweeps = n;
        self
    }

    pub fn with_beta_range(mut self, hot: f64, cold: f64) -> Self {
        self.beta_range = Some((hot, cold));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<(), SamplerError> {
        if self.num_reads == 0 {
            return Err(SamplerError::InvalidParameter("num_reads must be at least 1".to_string()));
        }
        if self.num_sweeps == 0 {
            return Err(SamplerError::InvalidParameter("num_sweeps must be at least 1".to_string()));
        }
        if let Some((hot, cold)) = self.beta_range {
            if !(hot.is_finite() && cold.is_finite() && hot > 0.0 && cold >= hot) {
                return Err(SamplerError::InvalidParameter(format!(
                    "beta_range must satisfy 0 < hot <= cold, got ({}, {})",
                    hot, cold
                )));
            }
        }
        Ok(())
    }

    /// Pick a beta range from the bias magnitudes when none is configured:
    /// the hot end accepts the largest single-variable move half the time,
    /// the cold end rejects a move the size of the smallest bias almost always.
    fn default_beta_range<V: Label>(model: &DiscreteQuadraticModel<V>) -> (f64, f64) {
        let cases = model.cases();
        let mut max_delta: f64 = 0.0;
        let mut min_bias = f64::INFINITY;
        let mut observe = |b: f64| {
            if b != 0.0 {
                min_bias = min_bias.min(b.abs());
            }
        };

        for v in 0..model.num_variables() {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for c in 0..cases[v] {
                let b = model.linear_bias(v, c);
                observe(b);
                lo = lo.min(b);
                hi = hi.max(b);
            }
            let mut spread = hi - lo;

            for &u in model.neighbors(v) {
                let mut lo = f64::INFINITY;
                let mut hi = f64::NEG_INFINITY;
                for cv in 0..cases[v] {
                    for cu in 0..cases[u] {
                        let b = model.quadratic_bias(v, cv, u, cu);
                        observe(b);
                        lo = lo.min(b);
                        hi = hi.max(b);
                    }
                }
                spread += hi - lo;
            }
            max_delta = max_delta.max(spread);
        }

        if max_delta <= 0.0 || !min_bias.is_finite() {
            return (0.1, 1.0);
        }
        let hot = 2f64.ln() / max_delta;
        let cold = (100f64.ln() / min_bias).max(hot);
        (hot, cold)
    }
}

impl Sampler for SimulatedAnnealingSampler {
    fn sample_dqm<V: Label>(
        &self,
        model: &DiscreteQuadraticModel<V>,
        label: &str,
    ) -> Result<SampleSet<V>, SamplerError> {
        self.validate()?;
        if model.num_variables() == 0 {
            return Err(SamplerError::EmptyModel);
        }

        let (hot, cold) = self
            .beta_range
            .unwrap_or_else(|| Self::default_beta_range(model));
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        debug!(
            label,
            num_reads = self.num_reads,
            num_sweeps = self.num_sweeps,
            hot,
            cold,
            "simulated annealing"
        );

        let cases = model.cases();
        let ratio = if self.num_sweeps > 1 {
            (cold / hot).powf(1.0 / (self.num_sweeps - 1) as f64)
        } else {
            1.0
        };

        let mut samples = Vec::with_capacity(self.num_reads);
        for read in 0..self.num_reads {
            let mut state: Vec<usize> = cases.iter().map(|&n| rng.gen_range(0..n)).collect();
            let mut energy = model.energy_unchecked(&state);
            let mut best = Sample {
                cases: state.clone(),
                energy,
            };

            let mut beta = hot;
            for _ in 0..self.num_sweeps {
                for v in 0..state.len() {
                    let n = cases[v];
                    if n < 2 {
                        continue;
                    }
                    let current = state[v];
                    // Uniform over the other n - 1 cases
                    let mut proposal = rng.gen_range(0..n - 1);
                    if proposal >= current {
                        proposal += 1;
                    }

                    let (delta, partner) = paired_move(model, &cases, &mut state, v, proposal);
                    if delta <= 0.0 || rng.r#gen::<f64>() < (-beta * delta).exp() {
                        state[v] = proposal;
                        if let Some((u, case)) = partner {
                            state[u] = case;
                        }
                        energy += delta;
                        if energy < best.energy {
                            best.cases.copy_from_slice(&state);
                            best.energy = energy;
                        }
                    }
                }
                beta *= ratio;
            }

            energy = descend(model, &cases, &mut state, energy);
            if energy < best.energy {
                best.cases.copy_from_slice(&state);
                best.energy = energy;
            }

            // Drop accumulated rounding from the incremental updates
            best.energy = model.energy_unchecked(&best.cases);
            debug!(read, energy = best.energy, "read finished");
            samples.push(best);
        }

        Ok(SampleSet::new(model.variables().to_vec(), samples, label))
    }
}

/// Energy change of moving `v` to `proposal`, combined with the best
/// single switch of one neighbour given that move. Leaves `state` unchanged.
fn paired_move<V: Label>(
    model: &DiscreteQuadraticModel<V>,
    cases: &[usize],
    state: &mut [usize],
    v: usize,
    proposal: usize,
) -> (f64, Option<(usize, usize)>) {
    let current = state[v];
    let single = model.local_energy(v, proposal, state) - model.local_energy(v, current, state);

    state[v] = proposal;
    let mut best = (single, None);
    for &u in model.neighbors(v) {
        let here = model.local_energy(u, state[u], state);
        for case in (0..cases[u]).filter(|&c| c != state[u]) {
            let delta = single + model.local_energy(u, case, state) - here;
            if delta < best.0 {
                best = (delta, Some((u, case)));
            }
        }
    }
    state[v] = current;
    best
}

const MAX_DESCENT_PASSES: usize = 1000;

/// Apply improving paired moves until none is left, returning the new energy
fn descend<V: Label>(
    model: &DiscreteQuadraticModel<V>,
    cases: &[usize],
    state: &mut [usize],
    mut energy: f64,
) -> f64 {
    for _ in 0..MAX_DESCENT_PASSES {
        let mut improved = false;
        for v in 0..state.len() {
            for proposal in 0..cases[v] {
                if proposal == state[v] {
                    continue;
                }
                let (delta, partner) = paired_move(model, cases, state, v, proposal);
                if delta < 0.0 {
                    state[v] = proposal;
                    if let Some((u, case)) = partner {
                        state[u] = case;
                    }
                    energy += delta;
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
    energy
}
