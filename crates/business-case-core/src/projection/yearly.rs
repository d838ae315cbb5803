use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BusinessCaseError;
use crate::types::{Money, Rate};
use crate::BusinessCaseResult;

use super::assumptions::{HORIZON_YEARS, MONTHS_PER_YEAR};
use super::cash_flows::CashFlowPoint;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Cash flow and running NPV for one year. Year 0 is the month-0 outlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: u32,
    pub cash_flow: Money,
    pub cumulative_npv: Money,
}

/// One row of the customer growth table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerYearSummary {
    pub year: u32,
    pub label: String,
    pub end_customers: u32,
    pub new_customers: u32,
    /// Year-on-year growth in end customers; None when the prior year had none
    pub growth_rate_pct: Option<Rate>,
    /// End customers * monthly price * 12
    pub annual_run_rate_revenue: Money,
}

/// Headline totals over the whole horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionTotals {
    pub total_revenue: Money,
    pub total_costs: Money,
    pub total_net_cash_flow: Money,
    pub year1_cash_flow: Money,
    pub years_2_to_5_cash_flow: Money,
    pub years_2_to_5_average: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Label used for a yearly bucket: "Initial" for year 0, "Year N" after.
pub fn year_label(year: u32) -> String {
    if year == 0 {
        "Initial".to_string()
    } else {
        format!("Year {year}")
    }
}

/// Roll the monthly series up into year 0 (month 0 alone) and years 1..=5.
///
/// Year `n` sums months `(n-1)*12+1 ..= n*12`, clipped to the series, and
/// takes the cumulative NPV at the last month it includes.
pub fn aggregate_yearly(
    cash_flows: &[CashFlowPoint],
    cumulative_npv: &[Money],
) -> BusinessCaseResult<Vec<YearlySummary>> {
    let (first_cf, first_npv) = match (cash_flows.first(), cumulative_npv.first()) {
        (Some(cf), Some(npv)) => (cf, *npv),
        _ => {
            return Err(BusinessCaseError::InsufficientData(
                "Yearly aggregation needs at least one month of cash flow and NPV".into(),
            ))
        }
    };

    let mut years = Vec::with_capacity(HORIZON_YEARS as usize + 1);
    years.push(YearlySummary {
        year: 0,
        cash_flow: first_cf.net_cash_flow,
        cumulative_npv: first_npv,
    });

    for year in 1..=HORIZON_YEARS {
        let start = ((year - 1) * MONTHS_PER_YEAR + 1) as usize;
        let end = ((year * MONTHS_PER_YEAR + 1) as usize).min(cash_flows.len());

        let cash_flow: Money = cash_flows
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|cf| cf.net_cash_flow)
            .sum();

        let last_idx = end.saturating_sub(1).min(cumulative_npv.len() - 1);
        years.push(YearlySummary {
            year,
            cash_flow,
            cumulative_npv: cumulative_npv[last_idx],
        });
    }

    Ok(years)
}

/// Customer growth table for years 0..=5, read at each year-end month.
pub fn customer_table(
    cash_flows: &[CashFlowPoint],
    price_per_customer: Money,
) -> BusinessCaseResult<Vec<CustomerYearSummary>> {
    let mut rows = Vec::with_capacity(HORIZON_YEARS as usize + 1);
    let mut prev_end: u32 = 0;

    for year in 0..=HORIZON_YEARS {
        let month = (year * MONTHS_PER_YEAR) as usize;
        let end_customers = cash_flows
            .get(month)
            .or_else(|| cash_flows.last())
            .map_or(0, |cf| cf.customers);
        let new_customers = end_customers.saturating_sub(prev_end);
        let growth_rate_pct = if year == 0 || prev_end == 0 {
            None
        } else {
            Some(
                (Decimal::from(new_customers) / Decimal::from(prev_end) * dec!(100)).round_dp(2),
            )
        };

        let annual_run_rate_revenue = Decimal::from(end_customers)
            .checked_mul(price_per_customer)
            .and_then(|monthly| monthly.checked_mul(Decimal::from(MONTHS_PER_YEAR)))
            .ok_or_else(|| BusinessCaseError::InvalidInput {
                field: "price_per_customer".into(),
                reason: format!("{} run-rate revenue overflows", year_label(year)),
            })?;

        rows.push(CustomerYearSummary {
            year,
            label: year_label(year),
            end_customers,
            new_customers,
            growth_rate_pct,
            annual_run_rate_revenue,
        });
        prev_end = end_customers;
    }

    Ok(rows)
}

pub fn compute_totals(cash_flows: &[CashFlowPoint], yearly: &[YearlySummary]) -> ProjectionTotals {
    let total_revenue: Money = cash_flows.iter().map(|cf| cf.revenue).sum();
    let total_costs: Money = cash_flows.iter().map(|cf| cf.costs).sum();

    let year1_cash_flow = yearly
        .iter()
        .find(|y| y.year == 1)
        .map_or(Decimal::ZERO, |y| y.cash_flow);
    let later: Vec<Money> = yearly
        .iter()
        .filter(|y| (2..=HORIZON_YEARS).contains(&y.year))
        .map(|y| y.cash_flow)
        .collect();
    let years_2_to_5_cash_flow: Money = later.iter().copied().sum();
    let years_2_to_5_average = if later.is_empty() {
        Decimal::ZERO
    } else {
        years_2_to_5_cash_flow / Decimal::from(later.len() as u64)
    };

    ProjectionTotals {
        total_revenue,
        total_costs,
        total_net_cash_flow: total_revenue - total_costs,
        year1_cash_flow,
        years_2_to_5_cash_flow,
        years_2_to_5_average,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
