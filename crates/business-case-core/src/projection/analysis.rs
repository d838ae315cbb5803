use std::str::FromStr;
use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::BusinessCaseResult;

use super::assumptions::Assumptions;
use super::cash_flows::{compute_cash_flows, CashFlowPoint};
use super::chart::{build_chart_data, ChartData};
use super::discounting::{compute_npv, computed_irr_pct, estimate_irr, IrrMethod};
use super::payback::{find_payback_period, PaybackPeriod};
use super::yearly::{
    aggregate_yearly, compute_totals, customer_table, CustomerYearSummary, ProjectionTotals,
    YearlySummary,
};

/// Discount rate used when none is given or the given one is unusable.
pub const DEFAULT_DISCOUNT_RATE_PCT: Decimal = dec!(10);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a full business-case projection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionInput {
    /// Annual discount rate in percent. Accepts a number or a numeric string;
    /// anything else falls back to 10%.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_rate_pct: Option<serde_json::Value>,
    /// Report the Newton-Raphson IRR instead of the business-case figure
    #[serde(default)]
    pub use_computed_irr: bool,
    /// Include the 61-month series in the output
    #[serde(default)]
    pub include_monthly: bool,
    /// Overrides for the growth and cost assumptions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<Assumptions>,
}

/// Headline figures of the projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub npv: Money,
    pub cumulative_npv: Vec<Money>,
    /// Annualised IRR in percent
    pub irr: Rate,
    /// "Y years, M months" or "Beyond 5 years"
    pub payback_period: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub discount_rate_pct: Rate,
    #[serde(flatten)]
    pub projection: ProjectionResult,
    pub irr_method: IrrMethod,
    /// Newton-Raphson estimate, when it converged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_irr_pct: Option<Rate>,
    pub payback: PaybackPeriod,
    pub yearly: Vec<YearlySummary>,
    pub customer_table: Vec<CustomerYearSummary>,
    pub totals: ProjectionTotals,
    pub chart: ChartData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_flows: Option<Vec<CashFlowPoint>>,
}

/// Input for the IRR on its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrrInput {
    #[serde(default)]
    pub use_computed_irr: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<Assumptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrOutput {
    pub irr_pct: Rate,
    pub irr_method: IrrMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_irr_pct: Option<Rate>,
}

// ---------------------------------------------------------------------------
// Discount rate input
// ---------------------------------------------------------------------------

/// Parse a user-entered annual discount rate (percent).
///
/// Returns `None` for anything that is not a finite, non-negative number.
pub fn parse_discount_rate(raw: &str) -> Option<Rate> {
    let trimmed = raw.trim().trim_end_matches('%').trim();
    let rate = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()?;
    (rate >= Decimal::ZERO).then_some(rate)
}

/// Resolve an optional user-entered rate, defaulting to 10%.
pub fn resolve_discount_rate(raw: Option<&str>) -> Rate {
    raw.and_then(parse_discount_rate)
        .unwrap_or(DEFAULT_DISCOUNT_RATE_PCT)
}

fn resolve_discount_rate_value(
    value: Option<&serde_json::Value>,
    warnings: &mut Vec<String>,
) -> Rate {
    let raw = match value {
        None | Some(serde_json::Value::Null) => return resolve_discount_rate(None),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if parse_discount_rate(&raw).is_none() {
        warnings.push(format!(
            "Discount rate {raw} is not a non-negative number; using {DEFAULT_DISCOUNT_RATE_PCT}%"
        ));
    }
    resolve_discount_rate(Some(&raw))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the full pipeline: cash flows, NPV, IRR, payback and yearly roll-up.
pub fn run_projection(
    input: &ProjectionInput,
) -> BusinessCaseResult<ComputationOutput<ProjectionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let assumptions = input.assumptions.clone().unwrap_or_default();
    assumptions.validate()?;
    let discount_rate_pct =
        resolve_discount_rate_value(input.discount_rate_pct.as_ref(), &mut warnings);

    let cash_flows = compute_cash_flows(&assumptions)?;
    log::debug!("projected {} months at {discount_rate_pct}%", cash_flows.len());

    let npv = compute_npv(&cash_flows, discount_rate_pct)?;
    let (irr, irr_method, computed_irr) =
        resolve_irr(&cash_flows, input.use_computed_irr, &mut warnings)?;
    let payback = find_payback_period(&npv.cumulative_npv);
    if payback == PaybackPeriod::BeyondHorizon {
        warnings.push("Discounted cash flow does not pay back within the projection horizon".into());
    }

    let yearly = aggregate_yearly(&cash_flows, &npv.cumulative_npv)?;
    let customers = customer_table(&cash_flows, assumptions.price_per_customer)?;
    let totals = compute_totals(&cash_flows, &yearly);
    let chart = build_chart_data(&yearly);

    let output = ProjectionOutput {
        discount_rate_pct,
        projection: ProjectionResult {
            npv: npv.npv,
            cumulative_npv: npv.cumulative_npv,
            irr,
            payback_period: payback.to_string(),
        },
        irr_method,
        computed_irr_pct: computed_irr,
        payback,
        yearly,
        customer_table: customers,
        totals,
        chart,
        cash_flows: input.include_monthly.then_some(cash_flows),
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Monthly DCF business case (NPV / IRR / discounted payback)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// IRR alone, with the same override rules as [`run_projection`].
pub fn run_irr(input: &IrrInput) -> BusinessCaseResult<ComputationOutput<IrrOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let assumptions = input.assumptions.clone().unwrap_or_default();
    assumptions.validate()?;
    let cash_flows = compute_cash_flows(&assumptions)?;
    let (irr_pct, irr_method, computed_irr_pct) =
        resolve_irr(&cash_flows, input.use_computed_irr, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Newton-Raphson IRR on monthly cash flows, annualised",
        &assumptions,
        warnings,
        elapsed,
        IrrOutput {
            irr_pct,
            irr_method,
            computed_irr_pct,
        },
    ))
}

/// The monthly series under the given (or default) assumptions.
pub fn run_cash_flows(
    assumptions: Option<&Assumptions>,
) -> BusinessCaseResult<ComputationOutput<Vec<CashFlowPoint>>> {
    let start = Instant::now();
    let assumptions = assumptions.cloned().unwrap_or_default();
    assumptions.validate()?;
    let cash_flows = compute_cash_flows(&assumptions)?;
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Monthly cash flow schedule",
        &assumptions,
        Vec::new(),
        elapsed,
        cash_flows,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Returns (reported IRR, method, converged Newton-Raphson estimate).
///
/// In override mode a non-converging estimate is only a warning; in computed
/// mode it is an error.
fn resolve_irr(
    cash_flows: &[CashFlowPoint],
    use_computed_irr: bool,
    warnings: &mut Vec<String>,
) -> BusinessCaseResult<(Rate, IrrMethod, Option<Rate>)> {
    let irr = estimate_irr(cash_flows, use_computed_irr)?;
    if use_computed_irr {
        return Ok((irr, IrrMethod::Computed, Some(irr)));
    }

    let computed = match computed_irr_pct(cash_flows) {
        Ok(estimate) => {
            warnings.push(format!(
                "IRR reported as the business-case figure {irr}%; the computed estimate is {estimate:.1}%"
            ));
            Some(estimate)
        }
        Err(e) => {
            warnings.push(format!(
                "IRR reported as the business-case figure {irr}%; no computed estimate ({e})"
            ));
            None
        }
    };
    Ok((irr, IrrMethod::BusinessCaseOverride, computed))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::assumptions::CustomerSchedule;
    use serde_json::json;

    #[test]
    fn test_resolve_discount_rate() {
        assert_eq!(resolve_discount_rate(None), dec!(10));
        assert_eq!(resolve_discount_rate(Some("8")), dec!(8));
        assert_eq!(resolve_discount_rate(Some(" 12.5% ")), dec!(12.5));
        assert_eq!(resolve_discount_rate(Some("0")), Decimal::ZERO);
        assert_eq!(resolve_discount_rate(Some("abc")), dec!(10));
        assert_eq!(resolve_discount_rate(Some("-3")), dec!(10));
        assert_eq!(resolve_discount_rate(Some("")), dec!(10));
    }

    #[test]
    fn test_default_projection() {
        let out = run_projection(&ProjectionInput::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.discount_rate_pct, dec!(10));
        assert_eq!(r.projection.irr, dec!(47.3));
        assert_eq!(r.irr_method, IrrMethod::BusinessCaseOverride);
        assert_eq!(r.projection.payback_period, "2 years, 10 months");
        assert_eq!(r.yearly.len(), 6);
        assert_eq!(r.chart.labels.len(), 6);
        assert!(r.cash_flows.is_none());
        assert!(r.computed_irr_pct.is_some());
        assert!(out.warnings.iter().any(|w| w.contains("business-case figure")));
    }

    #[test]
    fn test_invalid_rate_defaults_with_warning() {
        let input = ProjectionInput {
            discount_rate_pct: Some(json!("ten")),
            ..ProjectionInput::default()
        };
        let out = run_projection(&input).unwrap();
        assert_eq!(out.result.discount_rate_pct, dec!(10));
        assert!(out.warnings.iter().any(|w| w.contains("using 10%")));
    }

    fn resolve(value: serde_json::Value, warnings: &mut Vec<String>) -> Rate {
        resolve_discount_rate_value(Some(&value), warnings)
    }

    #[test]
    fn test_rate_value_shapes() {
        let mut warnings = Vec::new();
        assert_eq!(resolve_discount_rate_value(None, &mut warnings), dec!(10));
        assert_eq!(resolve(json!(null), &mut warnings), dec!(10));
        assert_eq!(resolve(json!(7.5), &mut warnings), dec!(7.5));
        assert_eq!(resolve(json!("9%"), &mut warnings), dec!(9));
        assert!(warnings.is_empty());

        assert_eq!(resolve(json!(true), &mut warnings), dec!(10));
        assert_eq!(resolve(json!("12abc"), &mut warnings), dec!(10));
        assert_eq!(warnings.len(), 2);
        assert!(warnings[1].starts_with("Discount rate 12abc "));
    }

    #[test]
    fn test_huge_rate_is_finite() {
        let input = ProjectionInput {
            discount_rate_pct: Some(json!("10000")),
            ..ProjectionInput::default()
        };
        let out = run_projection(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.discount_rate_pct, dec!(10000));
        assert_eq!(r.projection.cumulative_npv.len(), 61);
        assert!(r.projection.npv < dec!(-110000) && r.projection.npv > dec!(-111000));
        assert_eq!(r.payback, PaybackPeriod::BeyondHorizon);
    }

    #[test]
    fn test_runaway_assumptions_error_instead_of_panicking() {
        let input = ProjectionInput {
            assumptions: Some(Assumptions {
                annual_cost_escalation: dec!(1000000),
                ..Assumptions::default()
            }),
            ..ProjectionInput::default()
        };
        assert!(run_projection(&input).is_err());
        assert!(run_irr(&IrrInput {
            use_computed_irr: true,
            assumptions: input.assumptions.clone(),
        })
        .is_err());
    }

    #[test]
    fn test_numeric_rate_from_json() {
        let input: ProjectionInput =
            serde_json::from_str(r#"{"discount_rate_pct": 15, "include_monthly": true}"#).unwrap();
        let out = run_projection(&input).unwrap();
        assert_eq!(out.result.discount_rate_pct, dec!(15));
        assert_eq!(out.result.cash_flows.as_ref().map(Vec::len), Some(61));
    }

    #[test]
    fn test_computed_irr_mode() {
        let input = ProjectionInput {
            use_computed_irr: true,
            ..ProjectionInput::default()
        };
        let out = run_projection(&input).unwrap();
        assert_eq!(out.result.irr_method, IrrMethod::Computed);
        assert_eq!(Some(out.result.projection.irr), out.result.computed_irr_pct);
        assert!(out.result.projection.irr > dec!(50));
    }

    #[test]
    fn test_no_payback_warns() {
        let assumptions = Assumptions {
            price_per_customer: dec!(10),
            ..Assumptions::default()
        };
        let input = ProjectionInput {
            assumptions: Some(assumptions),
            ..ProjectionInput::default()
        };
        let out = run_projection(&input).unwrap();
        assert_eq!(out.result.payback, PaybackPeriod::BeyondHorizon);
        assert_eq!(out.result.projection.payback_period, "Beyond 5 years");
        assert!(out.warnings.iter().any(|w| w.contains("pay back")));
    }

    #[test]
    fn test_invalid_assumptions_rejected() {
        let input = ProjectionInput {
            assumptions: Some(Assumptions {
                customer_schedule: CustomerSchedule {
                    checkpoints: Vec::new(),
                },
                ..Assumptions::default()
            }),
            ..ProjectionInput::default()
        };
        assert!(run_projection(&input).is_err());
    }

    #[test]
    fn test_run_irr_override() {
        let out = run_irr(&IrrInput::default()).unwrap();
        assert_eq!(out.result.irr_pct, dec!(47.3));
        assert_eq!(out.result.irr_method, IrrMethod::BusinessCaseOverride);
        let estimate = out.result.computed_irr_pct.unwrap();
        assert!(estimate > dec!(55) && estimate < dec!(62));
        assert!(out.warnings[0].contains("computed estimate is 58."));
    }

    #[test]
    fn test_run_cash_flows() {
        let out = run_cash_flows(None).unwrap();
        assert_eq!(out.result.len(), 61);
        assert_eq!(out.result[0].net_cash_flow, dec!(-110600));
    }
}
