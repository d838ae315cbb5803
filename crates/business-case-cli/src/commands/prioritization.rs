use clap::Args;
use serde_json::Value;

use business_case_core::prioritization::matrix::{self, MatrixInput};

use crate::input;

/// Arguments for the prioritization matrix
#[derive(Args)]
pub struct MatrixArgs {
    /// Path to JSON/YAML file listing initiatives (defaults to the standard five)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_matrix(args: MatrixArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let matrix_input: MatrixInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        MatrixInput::default()
    };
    let result = matrix::build_matrix(&matrix_input)?;
    Ok(serde_json::to_value(result)?)
}
