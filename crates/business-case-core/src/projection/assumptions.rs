use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BusinessCaseError;
use crate::types::{Money, Rate};
use crate::BusinessCaseResult;

/// Last projected month. The series covers months `0..=HORIZON_MONTHS`.
pub const HORIZON_MONTHS: u32 = 60;
pub const MONTHS_PER_YEAR: u32 = 12;
/// Number of yearly buckets after the initial (month 0) bucket.
pub const HORIZON_YEARS: u32 = HORIZON_MONTHS / MONTHS_PER_YEAR;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A point on the adoption curve: `customers` active at the end of `month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCheckpoint {
    pub month: u32,
    pub customers: u32,
}

/// Ordered adoption checkpoints. Months between checkpoints are linearly
/// interpolated; months after the last checkpoint hold its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerSchedule {
    pub checkpoints: Vec<CustomerCheckpoint>,
}

impl Default for CustomerSchedule {
    fn default() -> Self {
        let checkpoints = [(12, 4), (24, 8), (36, 12), (48, 16), (60, 20)]
            .into_iter()
            .map(|(month, customers)| CustomerCheckpoint { month, customers })
            .collect();
        Self { checkpoints }
    }
}

/// Growth and cost assumptions behind the monthly cash-flow series.
///
/// Every field defaults to the standard business case, so a partial JSON
/// object only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    /// Fixed running cost charged every month, before escalation
    pub base_monthly_cost: Money,
    /// One-time setup cost charged in month 0
    pub setup_cost: Money,
    /// Additional monthly cost once the service is live, before escalation
    pub recurring_cost: Money,
    /// First month the recurring cost applies
    pub recurring_cost_start_month: u32,
    /// First month that earns revenue
    pub revenue_start_month: u32,
    /// Monthly revenue per active customer (not escalated)
    pub price_per_customer: Money,
    /// Yearly compounding escalation applied to cost components (0.25 = 25%)
    pub annual_cost_escalation: Rate,
    pub customer_schedule: CustomerSchedule,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            base_monthly_cost: dec!(600),
            setup_cost: dec!(110000),
            recurring_cost: dec!(640),
            recurring_cost_start_month: 4,
            revenue_start_month: 4,
            price_per_customer: dec!(1000),
            annual_cost_escalation: dec!(0.25),
            customer_schedule: CustomerSchedule::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl Assumptions {
    pub fn validate(&self) -> BusinessCaseResult<()> {
        let money_fields = [
            ("base_monthly_cost", self.base_monthly_cost),
            ("setup_cost", self.setup_cost),
            ("recurring_cost", self.recurring_cost),
            ("price_per_customer", self.price_per_customer),
        ];
        for (field, value) in money_fields {
            if value < Decimal::ZERO {
                return Err(BusinessCaseError::InvalidInput {
                    field: field.into(),
                    reason: "Must be non-negative".into(),
                });
            }
        }
        if self.annual_cost_escalation <= dec!(-1) {
            return Err(BusinessCaseError::InvalidInput {
                field: "annual_cost_escalation".into(),
                reason: "Escalation must be greater than -100%".into(),
            });
        }
        if self.revenue_start_month == 0 {
            return Err(BusinessCaseError::InvalidInput {
                field: "revenue_start_month".into(),
                reason: "Revenue cannot start before month 1".into(),
            });
        }
        self.customer_schedule.validate(self.revenue_start_month)
    }

    /// Cost escalation multiplier for a month: `(1 + escalation)^(year - 1)`
    /// where `year = month / 12 + 1`.
    pub fn cost_multiplier(&self, month: u32) -> BusinessCaseResult<Decimal> {
        let completed_years = i64::from(month / MONTHS_PER_YEAR);
        Decimal::ONE
            .checked_add(self.annual_cost_escalation)
            .and_then(|base| base.checked_powi(completed_years))
            .ok_or_else(|| BusinessCaseError::InvalidInput {
                field: "annual_cost_escalation".into(),
                reason: format!("Escalated cost multiplier overflows in month {month}"),
            })
    }

    pub fn customers_at(&self, month: u32) -> u32 {
        self.customer_schedule.customers_at(month, self.revenue_start_month)
    }
}

impl CustomerSchedule {
    pub fn validate(&self, revenue_start_month: u32) -> BusinessCaseResult<()> {
        let first = self.checkpoints.first().ok_or_else(|| {
            BusinessCaseError::InsufficientData("Customer schedule has no checkpoints".into())
        })?;
        if first.month < revenue_start_month {
            return Err(BusinessCaseError::InvalidInput {
                field: "customer_schedule".into(),
                reason: format!(
                    "First checkpoint (month {}) precedes revenue start (month {revenue_start_month})",
                    first.month
                ),
            });
        }
        for pair in self.checkpoints.windows(2) {
            if pair[1].month <= pair[0].month {
                return Err(BusinessCaseError::InvalidInput {
                    field: "customer_schedule".into(),
                    reason: format!(
                        "Checkpoint months must be strictly increasing ({} then {})",
                        pair[0].month, pair[1].month
                    ),
                });
            }
            if pair[1].customers < pair[0].customers {
                return Err(BusinessCaseError::InvalidInput {
                    field: "customer_schedule".into(),
                    reason: format!(
                        "Customer counts must not decrease (month {} has {}, month {} has {})",
                        pair[0].month, pair[0].customers, pair[1].month, pair[1].customers
                    ),
                });
            }
        }
        Ok(())
    }

    /// Active customers in `month`.
    ///
    /// Zero before `revenue_start_month`; a linear ramp from revenue start up
    /// to the first checkpoint; piecewise-linear between checkpoints; flat
    /// after the last one. Fractional counts round half away from zero.
    pub fn customers_at(&self, month: u32, revenue_start_month: u32) -> u32 {
        let Some(first) = self.checkpoints.first() else {
            return 0;
        };
        if month < revenue_start_month {
            return 0;
        }

        if month <= first.month {
            // Ramp anchored one month before revenue starts.
            let anchor = i64::from(revenue_start_month) - 1;
            let span = i64::from(first.month) - anchor;
            let elapsed = i64::from(month) - anchor;
            return round_count(
                Decimal::from(elapsed) * Decimal::from(first.customers) / Decimal::from(span),
            );
        }

        for pair in self.checkpoints.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if month <= end.month {
                let span = Decimal::from(end.month - start.month);
                let elapsed = Decimal::from(month - start.month);
                let delta = Decimal::from(end.customers) - Decimal::from(start.customers);
                return round_count(Decimal::from(start.customers) + elapsed * delta / span);
            }
        }

        self.checkpoints.last().map_or(0, |last| last.customers)
    }
}

fn round_count(value: Decimal) -> u32 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_assumptions_are_valid() {
        Assumptions::default().validate().unwrap();
    }

    #[test]
    fn test_ramp_before_first_checkpoint() {
        let a = Assumptions::default();
        let ramp: Vec<u32> = (0..=12).map(|m| a.customers_at(m)).collect();
        assert_eq!(ramp, vec![0, 0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn test_interpolation_between_checkpoints() {
        let a = Assumptions::default();
        assert_eq!(a.customers_at(13), 4);
        assert_eq!(a.customers_at(14), 5);
        assert_eq!(a.customers_at(18), 6);
        assert_eq!(a.customers_at(24), 8);
        assert_eq!(a.customers_at(36), 12);
        assert_eq!(a.customers_at(59), 20);
        assert_eq!(a.customers_at(60), 20);
    }

    #[test]
    fn test_clamps_after_last_checkpoint() {
        let a = Assumptions::default();
        assert_eq!(a.customers_at(61), 20);
        assert_eq!(a.customers_at(500), 20);
    }

    #[test]
    fn test_cost_multiplier_compounds_yearly() {
        let a = Assumptions::default();
        assert_eq!(a.cost_multiplier(0).unwrap(), dec!(1));
        assert_eq!(a.cost_multiplier(11).unwrap(), dec!(1));
        assert_eq!(a.cost_multiplier(12).unwrap(), dec!(1.25));
        assert_eq!(a.cost_multiplier(48).unwrap(), dec!(2.44140625));
        // Month 60 opens the sixth year.
        assert_eq!(a.cost_multiplier(60).unwrap(), dec!(3.0517578125));
    }

    #[test]
    fn test_partial_json_overrides_only_named_fields() {
        let a: Assumptions = serde_json::from_str(r#"{"price_per_customer": "1500"}"#).unwrap();
        assert_eq!(a.price_per_customer, dec!(1500));
        assert_eq!(a.setup_cost, dec!(110000));
        assert_eq!(a.customer_schedule, CustomerSchedule::default());
    }

    #[test]
    fn test_rejects_decreasing_schedule() {
        let mut a = Assumptions::default();
        a.customer_schedule.checkpoints[2].customers = 3;
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_schedule() {
        let mut a = Assumptions::default();
        a.customer_schedule.checkpoints.clear();
        assert!(a.validate().is_err());
        assert_eq!(a.customers_at(30), 0);
    }

    #[test]
    fn test_rejects_negative_cost() {
        let a = Assumptions {
            setup_cost: dec!(-1),
            ..Assumptions::default()
        };
        assert!(a.validate().is_err());
    }
}
