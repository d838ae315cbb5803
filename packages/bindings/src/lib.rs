use napi::Result as NapiResult;
use napi_derive::napi;

use business_case_core::prioritization::matrix::{self, MatrixInput};
use business_case_core::projection::analysis::{self, IrrInput, ProjectionInput};
use business_case_core::projection::assumptions::Assumptions;
use business_case_core::projection::sensitivity::{self, DiscountRateSweepInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Empty strings mean "use the defaults".
fn parse_or_default<T>(input_json: &str) -> NapiResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if input_json.trim().is_empty() {
        Ok(T::default())
    } else {
        serde_json::from_str(input_json).map_err(to_napi_error)
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn run_projection(input_json: String) -> NapiResult<String> {
    let input: ProjectionInput = parse_or_default(&input_json)?;
    let output = analysis::run_projection(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Convenience entry for a rate typed into a form field; unusable text
/// falls back to 10%.
#[napi]
pub fn run_projection_at_rate(discount_rate: String, use_computed_irr: bool) -> NapiResult<String> {
    let input = ProjectionInput {
        discount_rate_pct: Some(serde_json::Value::String(discount_rate)),
        use_computed_irr,
        ..ProjectionInput::default()
    };
    let output = analysis::run_projection(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compute_cash_flows(assumptions_json: String) -> NapiResult<String> {
    let assumptions: Assumptions = parse_or_default(&assumptions_json)?;
    let output = analysis::run_cash_flows(Some(&assumptions)).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn estimate_irr(input_json: String) -> NapiResult<String> {
    let input: IrrInput = parse_or_default(&input_json)?;
    let output = analysis::run_irr(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn discount_rate_sweep(input_json: String) -> NapiResult<String> {
    let input: DiscountRateSweepInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = sensitivity::discount_rate_sweep(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Prioritization
// ---------------------------------------------------------------------------

#[napi]
pub fn prioritization_matrix(input_json: String) -> NapiResult<String> {
    let input: MatrixInput = parse_or_default(&input_json)?;
    let output = matrix::build_matrix(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
