mod output;

use clap::{Parser, Subcommand, ValueEnum};
use critpath_model::{ProjectTable, Scenario};
use critpath_solver::{SolutionStatus, Solver};
use tracing::info;

#[derive(Parser)]
#[command(name = "critpath")]
#[command(about = "Critical path analysis by linear programming", long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for earliest start and end times and report the critical path
    Solve {
        /// Duration estimates to use (best, expected, worst)
        #[arg(short, long, default_value = "best")]
        scenario: Scenario,
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Show the critical path chain and binding precedence links
        #[arg(short, long)]
        analysis: bool,
        /// Extra precedence constraint, repeatable
        #[arg(short, long = "precedence", value_name = "ACTIVITY:PREDECESSOR", value_parser = parse_precedence)]
        precedences: Vec<(String, String)>,
        /// Hand the table to the solver without checking it first
        #[arg(long)]
        skip_validation: bool,
        /// Simplex pivots allowed per phase
        #[arg(long, default_value_t = 10000)]
        max_iterations: usize,
        /// Floating point tolerance for the solver
        #[arg(long, default_value_t = 1e-9)]
        tolerance: f64,
    },
    /// Check an activity table for errors
    Check {
        /// Duration estimates to use (best, expected, worst)
        #[arg(short, long, default_value = "best")]
        scenario: Scenario,
        /// Extra precedence constraint, repeatable
        #[arg(short, long = "precedence", value_name = "ACTIVITY:PREDECESSOR", value_parser = parse_precedence)]
        precedences: Vec<(String, String)>,
    },
    /// Print the activity table
    Table {
        /// Duration estimates to use (best, expected, worst)
        #[arg(short, long, default_value = "best")]
        scenario: Scenario,
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_precedence(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((activity, predecessor)) if !activity.is_empty() && !predecessor.is_empty() => {
            Ok((activity.to_string(), predecessor.to_string()))
        }
        _ => Err(format!("expected ACTIVITY:PREDECESSOR, got '{}'", s)),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_table(scenario: Scenario, precedences: &[(String, String)]) -> ProjectTable {
    let mut table = scenario.table();
    for (activity, predecessor) in precedences {
        if let Err(e) = table.add_predecessor(activity, predecessor) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
    table
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Solve {
            scenario,
            format,
            analysis,
            precedences,
            skip_validation,
            max_iterations,
            tolerance,
        } => {
            let table = load_table(scenario, &precedences);

            if skip_validation {
                info!("skipping table validation");
            } else if let Err(e) = table.validate() {
                eprintln!("Validation error: {}", e);
                std::process::exit(1);
            }

            let model = match critpath_model::build_model(&table) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Model error: {}", e);
                    std::process::exit(1);
                }
            };

            let solver = Solver::new()
                .with_max_iterations(max_iterations)
                .with_tolerance(tolerance);
            info!(%scenario, activities = model.num_activities(), "solving critical path model");
            let outcome = model.solve(&solver);

            match format {
                OutputFormat::Text => {
                    let mut stdout = std::io::stdout().lock();
                    if let Err(e) = output::write_outcome(&mut stdout, &table, scenario, &outcome, analysis) {
                        eprintln!("Error writing output: {}", e);
                        std::process::exit(1);
                    }
                }
                OutputFormat::Json => match output::outcome_json(&table, scenario, &outcome) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing result: {}", e);
                        std::process::exit(1);
                    }
                },
            }

            if outcome.status() != SolutionStatus::Optimal {
                std::process::exit(1);
            }
        }
        Commands::Check { scenario, precedences } => {
            let table = load_table(scenario, &precedences);
            match table.validate() {
                Ok(()) => {
                    println!("✓ {} ({} case) is valid", table.name, scenario);
                    println!("  {} activities", table.len());
                    println!("  {} precedence links", table.num_precedences());
                }
                Err(e) => {
                    eprintln!("✗ {} ({} case) has errors:", table.name, scenario);
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Table { scenario, format } => {
            let table = scenario.table();
            match format {
                OutputFormat::Text => {
                    let mut stdout = std::io::stdout().lock();
                    if let Err(e) = output::write_table(&mut stdout, &table, scenario) {
                        eprintln!("Error writing output: {}", e);
                        std::process::exit(1);
                    }
                }
                OutputFormat::Json => match serde_json::to_string_pretty(&table) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing table: {}", e);
                        std::process::exit(1);
                    }
                },
            }
        }
    }
}
