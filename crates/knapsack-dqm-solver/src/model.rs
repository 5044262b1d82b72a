use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use thiserror::Error;

/// Anything usable as a variable label in a [`DiscreteQuadraticModel`]
pub trait Label: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> Label for T {}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DqmError {
    #[error("Variable {0} already exists")]
    DuplicateVariable(String),
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Variable {0} must have at least one case")]
    NoCases(String),
    #[error("Expected {expected} linear biases for {variable}, got {actual}")]
    LinearShape {
        variable: String,
        expected: usize,
        actual: usize,
    },
    #[error("Expected a {expected_rows}x{expected_cols} table for ({u}, {v}), got {actual_rows}x{actual_cols}")]
    QuadraticShape {
        u: String,
        v: String,
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },
    #[error("Non-finite bias {value} for {variable} at case {case}")]
    NonFiniteBias {
        variable: String,
        case: usize,
        value: f64,
    },
    #[error("Variable {0} cannot interact with itself")]
    SelfInteraction(String),
    #[error("Expected {expected} cases in assignment, got {actual}")]
    AssignmentLength { expected: usize, actual: usize },
    #[error("Case {case} is out of range for {variable} ({num_cases} cases)")]
    CaseOutOfRange {
        variable: String,
        case: usize,
        num_cases: usize,
    },
}

/// A quadratic model over variables with finite domains.
///
/// Each variable `v` takes one of `num_cases(v)` cases. The objective is the
/// sum of one linear bias per variable (indexed by its case) and one
/// quadratic bias per interacting pair (indexed by both cases).
#[derive(Debug, Clone)]
pub struct DiscreteQuadraticModel<V: Label> {
    variables: Vec<V>,
    index: HashMap<V, usize>,
    linear: Vec<Vec<f64>>,
    /// Tables keyed by `(u, v)` with `u < v`, stored row-major as
    /// `cases(u) x cases(v)`
    quadratic: HashMap<(usize, usize), Vec<f64>>,
    adjacency: Vec<Vec<usize>>,
}

impl<V: Label> Default for DiscreteQuadraticModel<V> {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            index: HashMap::new(),
            linear: Vec::new(),
            quadratic: HashMap::new(),
            adjacency: Vec::new(),
        }
    }
}

impl<V: Label> DiscreteQuadraticModel<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable with `num_cases` cases and zero biases, returning its index
    pub fn add_variable(&mut self, num_cases: usize, label: V) -> Result<usize, DqmError> {
        if self.index.contains_key(&label) {
            return Err(DqmError::DuplicateVariable(format!("{:?}", label)));
        }
        if num_cases == 0 {
            return Err(DqmError::NoCases(format!("{:?}", label)));
        }

        let idx = self.variables.len();
        self.index.insert(label.clone(), idx);
        self.variables.push(label);
        self.linear.push(vec![0.0; num_cases]);
        self.adjacency.push(Vec::new());
        Ok(idx)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_interactions(&self) -> usize {
        self.quadratic.len()
    }

    pub fn variables(&self) -> &[V] {
        &self.variables
    }

    pub fn variable_index(&self, label: &V) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn num_cases(&self, label: &V) -> Result<usize, DqmError> {
        let idx = self.require(label)?;
        Ok(self.linear[idx].len())
    }

    /// Case counts in variable order
    pub fn cases(&self) -> Vec<usize> {
        self.linear.iter().map(Vec::len).collect()
    }

    /// Number of distinct assignments, or `None` on overflow
    pub fn num_states(&self) -> Option<u128> {
        self.linear
            .iter()
            .try_fold(1u128, |acc, biases| acc.checked_mul(biases.len() as u128))
    }

    pub fn set_linear(&mut self, label: &V, biases: Vec<f64>) -> Result<(), DqmError> {
        let idx = self.require(label)?;
        let expected = self.linear[idx].len();
        if biases.len() != expected {
            return Err(DqmError::LinearShape {
                variable: format!("{:?}", label),
                expected,
                actual: biases.len(),
            });
        }
        if let Some((case, &value)) = biases.iter().enumerate().find(|(_, b)| !b.is_finite()) {
            return Err(DqmError::NonFiniteBias {
                variable: format!("{:?}", label),
                case,
                value,
            });
        }
        self.linear[idx] = biases;
        Ok(())
    }

    pub fn get_linear(&self, label: &V) -> Result<&[f64], DqmError> {
        let idx = self.require(label)?;
        Ok(&self.linear[idx])
    }

    /// Set the interaction table between `u` and `v`.
    ///
    /// `biases[cu][cv]` is the bias when `u` takes case `cu` and `v` takes
    /// case `cv`. The table must be exactly `cases(u) x cases(v)`.
    pub fn set_quadratic(&mut self, u: &V, v: &V, biases: Vec<Vec<f64>>) -> Result<(), DqmError> {
        let ui = self.require(u)?;
        let vi = self.require(v)?;
        if ui == vi {
            return Err(DqmError::SelfInteraction(format!("{:?}", u)));
        }

        let rows = self.linear[ui].len();
        let cols = self.linear[vi].len();
        let actual_cols = biases.first().map_or(0, Vec::len);
        if biases.len() != rows || biases.iter().any(|row| row.len() != cols) {
            return Err(DqmError::QuadraticShape {
                u: format!("{:?}", u),
                v: format!("{:?}", v),
                expected_rows: rows,
                expected_cols: cols,
                actual_rows: biases.len(),
                actual_cols,
            });
        }

        for (cu, row) in biases.iter().enumerate() {
            if let Some(&value) = row.iter().find(|b| !b.is_finite()) {
                return Err(DqmError::NonFiniteBias {
                    variable: format!("({:?}, {:?})", u, v),
                    case: cu,
                    value,
                });
            }
        }

        // Store with the lower index first
        let table = if ui < vi {
            biases.into_iter().flatten().collect()
        } else {
            let mut flat = vec![0.0; rows * cols];
            for (cu, row) in biases.iter().enumerate() {
                for (cv, &bias) in row.iter().enumerate() {
                    flat[cv * rows + cu] = bias;
                }
            }
            flat
        };

        let key = (ui.min(vi), ui.max(vi));
        if self.quadratic.insert(key, table).is_none() {
            self.adjacency[ui].push(vi);
            self.adjacency[vi].push(ui);
        }
        Ok(())
    }

    /// Interaction table oriented as `cases(u) x cases(v)`, or `None` if the
    /// pair does not interact
    pub fn get_quadratic(&self, u: &V, v: &V) -> Result<Option<Vec<Vec<f64>>>, DqmError> {
        let ui = self.require(u)?;
        let vi = self.require(v)?;
        let rows = self.linear[ui].len();
        let cols = self.linear[vi].len();

        Ok(self.quadratic.get(&(ui.min(vi), ui.max(vi))).map(|flat| {
            (0..rows)
                .map(|cu| {
                    (0..cols)
                        .map(|cv| {
                            if ui < vi {
                                flat[cu * cols + cv]
                            } else {
                                flat[cv * rows + cu]
                            }
                        })
                        .collect()
                })
                .collect()
        }))
    }

    /// Bias between variable indices `u` and `v` at cases `cu` and `cv`
    pub fn quadratic_bias(&self, u: usize, cu: usize, v: usize, cv: usize) -> f64 {
        let (lo, clo, hi, chi) = if u < v { (u, cu, v, cv) } else { (v, cv, u, cu) };
        match self.quadratic.get(&(lo, hi)) {
            Some(flat) => flat[clo * self.linear[hi].len() + chi],
            None => 0.0,
        }
    }

    pub fn linear_bias(&self, v: usize, case: usize) -> f64 {
        self.linear[v][case]
    }

    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjacency[v]
    }

    /// Energy contributed by variable `v` taking `case`, with every other
    /// variable at `cases`
    pub fn local_energy(&self, v: usize, case: usize, cases: &[usize]) -> f64 {
        self.adjacency[v]
            .iter()
            .fold(self.linear[v][case], |acc, &u| {
                acc + self.quadratic_bias(v, case, u, cases[u])
            })
    }

    /// Energy of a full assignment given as one case per variable, in
    /// variable order
    pub fn energy(&self, cases: &[usize]) -> Result<f64, DqmError> {
        self.check_assignment(cases)?;
        Ok(self.energy_unchecked(cases))
    }

    pub(crate) fn energy_unchecked(&self, cases: &[usize]) -> f64 {
        let linear: f64 = self
            .linear
            .iter()
            .zip(cases)
            .map(|(biases, &case)| biases[case])
            .sum();
        let quadratic: f64 = self
            .quadratic
            .iter()
            .map(|(&(u, v), flat)| flat[cases[u] * self.linear[v].len() + cases[v]])
            .sum();
        linear + quadratic
    }

    /// Upper bound on `|energy|` over all assignments; infinite when the
    /// biases are too large to sum without overflow
    pub fn energy_bound(&self) -> f64 {
        let max_abs = |biases: &[f64]| biases.iter().fold(0.0f64, |acc, b| acc.max(b.abs()));
        let linear: f64 = self.linear.iter().map(|biases| max_abs(biases.as_slice())).sum();
        let quadratic: f64 = self.quadratic.values().map(|flat| max_abs(flat.as_slice())).sum();
        linear + quadratic
    }

    pub fn check_assignment(&self, cases: &[usize]) -> Result<(), DqmError> {
        if cases.len() != self.variables.len() {
            return Err(DqmError::AssignmentLength {
                expected: self.variables.len(),
                actual: cases.len(),
            });
        }
        for (v, &case) in cases.iter().enumerate() {
            let num_cases = self.linear[v].len();
            if case >= num_cases {
                return Err(DqmError::CaseOutOfRange {
                    variable: format!("{:?}", self.variables[v]),
                    case,
                    num_cases,
                });
            }
        }
        Ok(())
    }

    fn require(&self, label: &V) -> Result<usize, DqmError> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| DqmError::UnknownVariable(format!("{:?}", label)))
    }
}
