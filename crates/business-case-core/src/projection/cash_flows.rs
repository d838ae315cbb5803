use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BusinessCaseError;
use crate::types::Money;
use crate::BusinessCaseResult;

use super::assumptions::{Assumptions, HORIZON_MONTHS};

/// One month of the business case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub month: u32,
    pub revenue: Money,
    pub costs: Money,
    /// revenue - costs
    pub net_cash_flow: Money,
    pub customers: u32,
}

/// Build the monthly series for months `0..=HORIZON_MONTHS`.
///
/// Costs are the escalated base cost every month, the setup cost in month 0,
/// and the escalated recurring cost from `recurring_cost_start_month`.
/// Revenue is `customers * price_per_customer` from `revenue_start_month`.
///
/// Fails when any amount, or the horizon total of revenue and costs, does not
/// fit in a `Decimal`.
pub fn compute_cash_flows(assumptions: &Assumptions) -> BusinessCaseResult<Vec<CashFlowPoint>> {
    let cash_flows = (0..=HORIZON_MONTHS)
        .map(|month| cash_flow_for_month(assumptions, month))
        .collect::<BusinessCaseResult<Vec<_>>>()?;

    // Every downstream sum is bounded by this one.
    cash_flows
        .iter()
        .try_fold(Decimal::ZERO, |acc, cf| {
            acc.checked_add(cf.revenue.abs())?.checked_add(cf.costs.abs())
        })
        .ok_or_else(|| overflow("horizon totals"))?;

    Ok(cash_flows)
}

/// The series under the default assumptions.
pub fn standard_cash_flows() -> BusinessCaseResult<Vec<CashFlowPoint>> {
    compute_cash_flows(&Assumptions::default())
}

/// Net cash flow column of a series.
pub fn net_cash_flows(cash_flows: &[CashFlowPoint]) -> Vec<Money> {
    cash_flows.iter().map(|cf| cf.net_cash_flow).collect()
}

fn overflow(what: &str) -> BusinessCaseError {
    BusinessCaseError::InvalidInput {
        field: "assumptions".into(),
        reason: format!("Cash flow {what} overflow"),
    }
}

fn cash_flow_for_month(a: &Assumptions, month: u32) -> BusinessCaseResult<CashFlowPoint> {
    let multiplier = a.cost_multiplier(month)?;
    let month_overflow = || overflow(&format!("in month {month}"));

    let mut costs = a
        .base_monthly_cost
        .checked_mul(multiplier)
        .ok_or_else(month_overflow)?;
    if month == 0 {
        costs = costs.checked_add(a.setup_cost).ok_or_else(month_overflow)?;
    }
    if month >= a.recurring_cost_start_month {
        let recurring = a
            .recurring_cost
            .checked_mul(multiplier)
            .ok_or_else(month_overflow)?;
        costs = costs.checked_add(recurring).ok_or_else(month_overflow)?;
    }

    let (customers, revenue) = if month >= a.revenue_start_month {
        let customers = a.customers_at(month);
        let revenue = Decimal::from(customers)
            .checked_mul(a.price_per_customer)
            .ok_or_else(month_overflow)?;
        (customers, revenue)
    } else {
        (0, Decimal::ZERO)
    };

    Ok(CashFlowPoint {
        month,
        revenue,
        costs,
        net_cash_flow: revenue.checked_sub(costs).ok_or_else(month_overflow)?,
        customers,
    })
}
