pub mod builder;
pub mod items;
pub mod loader;
pub mod report;
pub mod solve;
pub mod variable;

pub use builder::{build_knapsack_dqm, BuildError, KnapsackDqmBuilder, Penalty};
pub use items::{Item, Items};
pub use loader::{load_items, parse_items, LoadError};
pub use report::{Report, SelectedItem};
pub use solve::{solve_knapsack, KnapsackSolution, SolveError, SAMPLE_LABEL};
pub use variable::KnapsackVariable;
