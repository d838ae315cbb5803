use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::time_value;
use crate::types::{Money, Rate};
use crate::BusinessCaseResult;

use super::assumptions::MONTHS_PER_YEAR;
use super::cash_flows::{net_cash_flows, CashFlowPoint};

/// IRR quoted in the approved business case, reported unless the computed
/// figure is explicitly requested.
pub const BUSINESS_CASE_IRR_PCT: Decimal = dec!(47.3);

/// Starting monthly rate for the Newton-Raphson search.
pub const IRR_SEED: Rate = dec!(0.03);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpvResult {
    pub npv: Money,
    /// Running discounted total, aligned with the cash-flow months
    pub cumulative_npv: Vec<Money>,
}

/// Which figure `estimate_irr` reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrMethod {
    Computed,
    BusinessCaseOverride,
}

/// Monthly rate for an annual percentage: `pct / 100 / 12`.
pub fn monthly_rate(annual_rate_pct: Rate) -> Rate {
    annual_rate_pct / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
}

/// Discount the monthly series at an annual percentage rate.
///
/// Month `i` is divided by `(1 + monthly_rate)^i`, so month 0 is undiscounted.
pub fn compute_npv(
    cash_flows: &[CashFlowPoint],
    annual_discount_rate_pct: Rate,
) -> BusinessCaseResult<NpvResult> {
    let rate = monthly_rate(annual_discount_rate_pct);
    let cumulative_npv = time_value::cumulative_npv(rate, &net_cash_flows(cash_flows))?;
    let npv = cumulative_npv.last().copied().unwrap_or(Decimal::ZERO);
    log::debug!("NPV at {annual_discount_rate_pct}% = {npv}");
    Ok(NpvResult {
        npv,
        cumulative_npv,
    })
}

/// Annualised IRR (percentage) found by Newton-Raphson on the monthly series.
pub fn computed_irr_pct(cash_flows: &[CashFlowPoint]) -> BusinessCaseResult<Rate> {
    let monthly = time_value::irr(&net_cash_flows(cash_flows), IRR_SEED)?;
    let annual = time_value::annualize(monthly, MONTHS_PER_YEAR)?;
    log::debug!("IRR converged at {monthly} monthly ({annual} annual)");
    Ok(annual * dec!(100))
}

/// IRR as a percentage.
///
/// With `use_computed_irr` false this returns [`BUSINESS_CASE_IRR_PCT`]
/// regardless of the cash flows.
pub fn estimate_irr(
    cash_flows: &[CashFlowPoint],
    use_computed_irr: bool,
) -> BusinessCaseResult<Rate> {
    if use_computed_irr {
        computed_irr_pct(cash_flows)
    } else {
        Ok(BUSINESS_CASE_IRR_PCT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::cash_flows::standard_cash_flows;

    #[test]
    fn test_first_month_is_undiscounted() {
        let cfs = standard_cash_flows().unwrap();
        let result = compute_npv(&cfs, dec!(10)).unwrap();
        assert_eq!(result.cumulative_npv[0], cfs[0].net_cash_flow);
        assert_eq!(result.cumulative_npv.len(), cfs.len());
    }

    #[test]
    fn test_npv_at_ten_percent() {
        let cfs = standard_cash_flows().unwrap();
        let result = compute_npv(&cfs, dec!(10)).unwrap();
        assert!(
            (result.npv - dec!(231583.07)).abs() < dec!(0.5),
            "Expected NPV ~231583, got {}",
            result.npv
        );
        assert_eq!(result.npv, *result.cumulative_npv.last().unwrap());
    }

    #[test]
    fn test_zero_rate_is_plain_sum() {
        let cfs = standard_cash_flows().unwrap();
        let result = compute_npv(&cfs, Decimal::ZERO).unwrap();
        let plain: Decimal = cfs.iter().map(|cf| cf.net_cash_flow).sum();
        assert_eq!(result.npv, plain);
        assert_eq!(result.npv, dec!(370655.1953125));
    }

    #[test]
    fn test_higher_rate_lowers_npv() {
        let cfs = standard_cash_flows().unwrap();
        let low = compute_npv(&cfs, dec!(5)).unwrap().npv;
        let high = compute_npv(&cfs, dec!(20)).unwrap().npv;
        assert!(high < low);
    }

    #[test]
    fn test_override_irr() {
        let cfs = standard_cash_flows().unwrap();
        assert_eq!(estimate_irr(&cfs, false).unwrap(), dec!(47.3));
    }

    #[test]
    fn test_computed_irr() {
        let cfs = standard_cash_flows().unwrap();
        let irr = estimate_irr(&cfs, true).unwrap();
        assert!(
            (irr - dec!(58.24)).abs() < dec!(0.5),
            "Expected computed IRR ~58.2%, got {irr}"
        );
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
    }
}
