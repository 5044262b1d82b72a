use clap::{Parser, ValueEnum};
use knapsack_dqm::{load_items, solve_knapsack, KnapsackSolution, Penalty, Report, SolveError};
use knapsack_dqm_solver::{ExactSolver, SimulatedAnnealingSampler};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "knapsack")]
#[command(about = "Solve a bounded knapsack problem as a discrete quadratic model", long_about = None)]
struct Cli {
    /// Headerless CSV of cost,weight,number rows
    #[arg(default_value = "large.csv")]
    file: PathBuf,
    /// Maximum total weight
    #[arg(default_value_t = 70)]
    capacity: usize,
    /// Sampler used to minimize the model. Annealing is a heuristic and may
    /// stop short of the optimum; use `exact` for small models.
    #[arg(short, long, value_enum, default_value_t = SamplerKind::Anneal)]
    sampler: SamplerKind,
    /// Fixed penalty multiplier (defaults to the largest item cost)
    #[arg(short, long)]
    penalty: Option<f64>,
    /// Annealing runs
    #[arg(long, default_value_t = 10)]
    num_reads: usize,
    /// Sweeps per annealing run
    #[arg(long, default_value_t = 1000)]
    num_sweeps: usize,
    /// Seed for the annealing sampler
    #[arg(long, env = "KNAPSACK_SEED")]
    seed: Option<u64>,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum SamplerKind {
    /// Enumerate every assignment
    Exact,
    /// Simulated annealing
    Anneal,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn solve(cli: &Cli, items: &knapsack_dqm::Items) -> Result<KnapsackSolution, SolveError> {
    let penalty = cli.penalty.map_or(Penalty::MaxCost, Penalty::Fixed);

    match cli.sampler {
        SamplerKind::Exact => solve_knapsack(items, cli.capacity, penalty, &ExactSolver::new()),
        SamplerKind::Anneal => {
            let mut sampler = SimulatedAnnealingSampler::new()
                .with_num_reads(cli.num_reads)
                .with_num_sweeps(cli.num_sweeps);
            if let Some(seed) = cli.seed {
                sampler = sampler.with_seed(seed);
            }
            solve_knapsack(items, cli.capacity, penalty, &sampler)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let items = match load_items(&cli.file) {
        Ok(items) => items,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let solution = match solve(&cli, &items) {
        Ok(solution) => solution,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let report = Report::new(&solution, &items);
    match cli.format {
        Format::Text => println!("{}", report),
        Format::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                std::process::exit(1);
            }
        },
    }
}
