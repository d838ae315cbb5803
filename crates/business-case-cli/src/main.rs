mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::prioritization::MatrixArgs;
use commands::projection::{CashFlowsArgs, ChartArgs, IrrArgs, ProjectionArgs, SensitivityArgs};

/// Business case projections: NPV, IRR, payback and initiative prioritization
#[derive(Parser)]
#[command(
    name = "bizcase",
    version,
    about = "Business case projections: NPV, IRR, payback and prioritization",
    long_about = "A CLI for the monthly discounted-cash-flow business case with decimal \
                  precision. Projects 60 months of revenue and costs, discounts them to \
                  NPV, estimates IRR and discounted payback, rolls results up by year, \
                  and places initiatives on the ease/impact prioritization matrix."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full projection (NPV, IRR, payback, yearly summary)
    Projection(ProjectionArgs),
    /// Print the monthly cash flow schedule
    CashFlows(CashFlowsArgs),
    /// Report the IRR (business-case figure or computed)
    Irr(IrrArgs),
    /// Sweep NPV and payback across discount rates
    Sensitivity(SensitivityArgs),
    /// Place initiatives on the ease/impact prioritization matrix
    Matrix(MatrixArgs),
    /// Draw the yearly cash flow / cumulative NPV chart as text
    Chart(ChartArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Projection(args) => commands::projection::run_projection(args),
        Commands::CashFlows(args) => commands::projection::run_cash_flows(args),
        Commands::Irr(args) => commands::projection::run_irr(args),
        Commands::Sensitivity(args) => commands::projection::run_sensitivity(args),
        Commands::Matrix(args) => commands::prioritization::run_matrix(args),
        Commands::Chart(args) => match commands::projection::run_chart(args) {
            Ok(text) => {
                print!("{}", text);
                return;
            }
            Err(e) => Err(e),
        },
        Commands::Version => {
            println!("bizcase {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
