use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use business_case_core::projection::analysis::{self, IrrInput, ProjectionInput};
use business_case_core::projection::assumptions::Assumptions;
use business_case_core::projection::chart::ChartView;
use business_case_core::projection::sensitivity::{self, DiscountRateSweepInput};

use crate::input;
use crate::output::chart::TextChartRenderer;

/// Arguments for the full business-case projection
#[derive(Args)]
pub struct ProjectionArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual discount rate in percent (e.g. 10); unusable values fall back to 10
    #[arg(long, allow_hyphen_values = true)]
    pub discount_rate: Option<String>,

    /// Report the Newton-Raphson IRR instead of the business-case figure
    #[arg(long)]
    pub computed_irr: bool,

    /// Include the month-by-month series
    #[arg(long)]
    pub monthly: bool,
}

fn projection_input(args: &ProjectionArgs) -> Result<ProjectionInput, Box<dyn std::error::Error>> {
    let projection_input = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ProjectionInput {
            discount_rate_pct: args.discount_rate.clone().map(Value::String),
            use_computed_irr: args.computed_irr,
            include_monthly: args.monthly,
            assumptions: None,
        }
    };
    Ok(projection_input)
}

pub fn run_projection(args: ProjectionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let projection_input = projection_input(&args)?;
    let result = analysis::run_projection(&projection_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the monthly cash flow schedule
#[derive(Args)]
pub struct CashFlowsArgs {
    /// Path to JSON/YAML assumptions file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_cash_flows(args: CashFlowsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions: Option<Assumptions> = if let Some(ref path) = args.input {
        Some(input::file::read_input(path)?)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Some(serde_json::from_value(data)?)
    } else {
        None
    };
    let result = analysis::run_cash_flows(assumptions.as_ref())?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the IRR on its own
#[derive(Args)]
pub struct IrrArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Report the Newton-Raphson IRR instead of the business-case figure
    #[arg(long)]
    pub computed: bool,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let irr_input: IrrInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        IrrInput {
            use_computed_irr: args.computed,
            assumptions: None,
        }
    };
    let result = analysis::run_irr(&irr_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the discount-rate sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Lowest annual discount rate in percent
    #[arg(long)]
    pub min_rate: Option<Decimal>,

    /// Highest annual discount rate in percent
    #[arg(long)]
    pub max_rate: Option<Decimal>,

    /// Step between rates in percent
    #[arg(long)]
    pub step: Option<Decimal>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sweep_input: DiscountRateSweepInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        DiscountRateSweepInput {
            min_rate_pct: args.min_rate.unwrap_or(dec!(0)),
            max_rate_pct: args.max_rate.unwrap_or(dec!(30)),
            step_pct: args.step.unwrap_or(dec!(5)),
            assumptions: None,
        }
    };
    let result = sensitivity::discount_rate_sweep(&sweep_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the text cash-flow chart
#[derive(Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub projection: ProjectionArgs,

    /// Width of the longest bar in characters
    #[arg(long, default_value_t = 40)]
    pub width: usize,
}

/// Draw the yearly chart to a string. The view is dropped (and the chart
/// destroyed) once the text has been taken.
pub fn run_chart(args: ChartArgs) -> Result<String, Box<dyn std::error::Error>> {
    let projection_input = projection_input(&args.projection)?;
    let output = analysis::run_projection(&projection_input)?;

    let mut view = ChartView::new(TextChartRenderer::new(args.width));
    let rendered = view.update(&output.result.chart)?.clone();
    view.close();
    Ok(rendered)
}
