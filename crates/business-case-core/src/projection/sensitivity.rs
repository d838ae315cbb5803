use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BusinessCaseError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::BusinessCaseResult;

use super::analysis::DEFAULT_DISCOUNT_RATE_PCT;
use super::assumptions::Assumptions;
use super::cash_flows::compute_cash_flows;
use super::discounting::compute_npv;
use super::payback::find_payback_period;

/// Sweep cap so a tiny step cannot produce an unbounded table.
const MAX_SWEEP_POINTS: usize = 1000;

/// Input for an NPV sweep over annual discount rates (percent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRateSweepInput {
    pub min_rate_pct: Rate,
    pub max_rate_pct: Rate,
    pub step_pct: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<Assumptions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub discount_rate_pct: Rate,
    pub npv: Money,
    pub payback_period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payback_month: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRateSweepOutput {
    pub results: Vec<SweepPoint>,
    /// Index of the point closest to the default 10% rate
    pub base_case_index: usize,
    /// Lowest swept rate at which NPV is no longer positive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_non_positive_rate_pct: Option<Rate>,
}

/// Rates from min to max by step; max is always included.
fn generate_sweep_values(input: &DiscountRateSweepInput) -> BusinessCaseResult<Vec<Rate>> {
    if input.step_pct <= Decimal::ZERO {
        return Err(BusinessCaseError::InvalidInput {
            field: "step_pct".into(),
            reason: "Step must be positive".into(),
        });
    }
    if input.min_rate_pct < Decimal::ZERO {
        return Err(BusinessCaseError::InvalidInput {
            field: "min_rate_pct".into(),
            reason: "Discount rates must be non-negative".into(),
        });
    }
    if input.min_rate_pct > input.max_rate_pct {
        return Err(BusinessCaseError::InvalidInput {
            field: "min_rate_pct".into(),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = input.min_rate_pct;
    while current <= input.max_rate_pct {
        if values.len() >= MAX_SWEEP_POINTS {
            return Err(BusinessCaseError::InvalidInput {
                field: "step_pct".into(),
                reason: format!("Sweep would exceed {MAX_SWEEP_POINTS} points"),
            });
        }
        values.push(current);
        match current.checked_add(input.step_pct) {
            Some(next) => current = next,
            None => break,
        }
    }
    if let Some(&last) = values.last() {
        if last < input.max_rate_pct {
            values.push(input.max_rate_pct);
        }
    }

    Ok(values)
}

fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// NPV and payback at each swept discount rate.
pub fn discount_rate_sweep(
    input: &DiscountRateSweepInput,
) -> BusinessCaseResult<ComputationOutput<DiscountRateSweepOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let assumptions = input.assumptions.clone().unwrap_or_default();
    assumptions.validate()?;
    let rates = generate_sweep_values(input)?;
    let cash_flows = compute_cash_flows(&assumptions)?;

    let mut results = Vec::with_capacity(rates.len());
    for rate in &rates {
        let npv = compute_npv(&cash_flows, *rate)?;
        let payback = find_payback_period(&npv.cumulative_npv);
        results.push(SweepPoint {
            discount_rate_pct: *rate,
            npv: npv.npv,
            payback_period: payback.to_string(),
            payback_month: payback.month(),
        });
    }

    let first_non_positive_rate_pct = results
        .iter()
        .find(|p| p.npv <= Decimal::ZERO)
        .map(|p| p.discount_rate_pct);
    if first_non_positive_rate_pct == rates.first().copied() {
        warnings.push("NPV is not positive anywhere in the swept range".into());
    }

    let output = DiscountRateSweepOutput {
        base_case_index: closest_index(&rates, DEFAULT_DISCOUNT_RATE_PCT),
        results,
        first_non_positive_rate_pct,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "NPV sensitivity to annual discount rate",
        &serde_json::json!({
            "min_rate_pct": input.min_rate_pct,
            "max_rate_pct": input.max_rate_pct,
            "step_pct": input.step_pct,
            "assumptions": assumptions,
            "midpoint_pct": input.min_rate_pct / dec!(2) + input.max_rate_pct / dec!(2),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(min: Rate, max: Rate, step: Rate) -> DiscountRateSweepInput {
        DiscountRateSweepInput {
            min_rate_pct: min,
            max_rate_pct: max,
            step_pct: step,
            assumptions: None,
        }
    }

    #[test]
    fn test_sweep_includes_max() {
        let values = generate_sweep_values(&sweep(dec!(0), dec!(25), dec!(10))).unwrap();
        assert_eq!(values, vec![dec!(0), dec!(10), dec!(20), dec!(25)]);
    }

    #[test]
    fn test_sweep_rejects_bad_step() {
        assert!(generate_sweep_values(&sweep(dec!(0), dec!(10), dec!(0))).is_err());
        assert!(generate_sweep_values(&sweep(dec!(20), dec!(10), dec!(1))).is_err());
        assert!(generate_sweep_values(&sweep(dec!(0), dec!(10), dec!(0.001))).is_err());
    }

    #[test]
    fn test_npv_falls_as_rate_rises() {
        let out = discount_rate_sweep(&sweep(dec!(0), dec!(30), dec!(5))).unwrap();
        let npvs: Vec<Money> = out.result.results.iter().map(|p| p.npv).collect();
        assert!(npvs.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(out.result.results[0].npv, dec!(370655.1953125));
        assert_eq!(out.result.base_case_index, 2);
        assert_eq!(out.result.results[2].payback_month, Some(34));
    }

    #[test]
    fn test_sweep_survives_extreme_rates() {
        let out = discount_rate_sweep(&sweep(dec!(0), Decimal::MAX, Decimal::MAX)).unwrap();
        let rates: Vec<Rate> = out.result.results.iter().map(|p| p.discount_rate_pct).collect();
        assert_eq!(rates, vec![dec!(0), Decimal::MAX]);
        let extreme = &out.result.results[1];
        assert!((extreme.npv - dec!(-110600)).abs() < dec!(0.01));
        assert_eq!(extreme.payback_month, None);
    }

    #[test]
    fn test_breakeven_found_at_high_rates() {
        let out = discount_rate_sweep(&sweep(dec!(10), dec!(100), dec!(10))).unwrap();
        let breakeven = out.result.first_non_positive_rate_pct.unwrap();
        assert!(breakeven > dec!(40) && breakeven <= dec!(50));
    }
}
