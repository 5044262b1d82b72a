use std::fmt;

/// Variable label in a knapsack model
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KnapsackVariable {
    /// Quantity chosen of the item at this index; case `q` means `q` copies
    Item(usize),
    /// Total weight used; case `c` means weight `c + 1`
    Slack,
}

impl KnapsackVariable {
    /// Domain value represented by `case`
    pub fn value(&self, case: usize) -> usize {
        match self {
            KnapsackVariable::Item(_) => case,
            KnapsackVariable::Slack => case + 1,
        }
    }
}

impl fmt::Display for KnapsackVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnapsackVariable::Item(index) => write!(f, "x{}", index),
            KnapsackVariable::Slack => write!(f, "y"),
        }
    }
}
