use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;

use super::assumptions::{HORIZON_YEARS, MONTHS_PER_YEAR};

/// When cumulative discounted cash flow first turns positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaybackPeriod {
    Reached { month: u32, years: u32, months: u32 },
    BeyondHorizon,
}

impl PaybackPeriod {
    pub fn from_month(month: u32) -> Self {
        PaybackPeriod::Reached {
            month,
            years: month / MONTHS_PER_YEAR,
            months: month % MONTHS_PER_YEAR,
        }
    }

    pub fn month(&self) -> Option<u32> {
        match self {
            PaybackPeriod::Reached { month, .. } => Some(*month),
            PaybackPeriod::BeyondHorizon => None,
        }
    }
}

impl fmt::Display for PaybackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaybackPeriod::Reached { years, months, .. } => {
                write!(f, "{years} years, {months} months")
            }
            PaybackPeriod::BeyondHorizon => write!(f, "Beyond {HORIZON_YEARS} years"),
        }
    }
}

/// First month whose cumulative NPV is strictly positive.
pub fn find_payback_period(cumulative_npv: &[Money]) -> PaybackPeriod {
    cumulative_npv
        .iter()
        .position(|v| *v > Decimal::ZERO)
        .map_or(PaybackPeriod::BeyondHorizon, |i| {
            PaybackPeriod::from_month(i as u32)
        })
}
