use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::BusinessCaseError;
use crate::types::{Money, Rate};
use crate::BusinessCaseResult;

/// Newton-Raphson stops once |NPV| or the rate step falls below this.
pub const IRR_TOLERANCE: Decimal = dec!(0.00001);
pub const MAX_IRR_ITERATIONS: u32 = 100;

/// Running present value of a series of periodic cash flows.
///
/// Element `t` holds the sum of `cf[0..=t]` each discounted by `(1 + rate)^t`.
/// Period 0 is never discounted. Once the discount factor grows past what a
/// `Decimal` can hold, later periods contribute nothing.
pub fn cumulative_npv(rate: Rate, cash_flows: &[Money]) -> BusinessCaseResult<Vec<Money>> {
    if rate <= dec!(-1) {
        return Err(BusinessCaseError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    let one_plus_r = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| BusinessCaseError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate is too large".into(),
        })?;

    let mut running = Decimal::ZERO;
    let mut out = Vec::with_capacity(cash_flows.len());
    let mut discount = Some(Decimal::ONE);

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.and_then(|d| d.checked_mul(one_plus_r));
        }
        let present = match discount {
            Some(d) if d.is_zero() => {
                return Err(BusinessCaseError::DivisionByZero {
                    context: format!("NPV discount factor at period {t}"),
                });
            }
            Some(d) => cf
                .checked_div(d)
                .ok_or_else(|| BusinessCaseError::InvalidInput {
                    field: "cash_flows".into(),
                    reason: format!("Discounted cash flow overflows at period {t}"),
                })?,
            None => Decimal::ZERO,
        };
        running = running
            .checked_add(present)
            .ok_or_else(|| BusinessCaseError::InvalidInput {
                field: "cash_flows".into(),
                reason: format!("Running NPV overflows at period {t}"),
            })?;
        out.push(running);
    }

    Ok(out)
}

/// Net Present Value of a series of cash flows
pub fn npv(rate: Rate, cash_flows: &[Money]) -> BusinessCaseResult<Money> {
    let running = cumulative_npv(rate, cash_flows)?;
    Ok(running.last().copied().unwrap_or(Decimal::ZERO))
}

/// Periodic Internal Rate of Return using Newton-Raphson.
///
/// Converges when either the NPV at the current rate or the size of the
/// Newton step drops below [`IRR_TOLERANCE`].
pub fn irr(cash_flows: &[Money], guess: Rate) -> BusinessCaseResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(BusinessCaseError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let mut rate = guess;
    let mut last_delta = Decimal::ZERO;

    for i in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) = npv_and_derivative(rate, cash_flows)?;
        last_delta = npv_val;

        if npv_val.abs() < IRR_TOLERANCE {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(BusinessCaseError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        let step = npv_val
            .checked_div(dnpv)
            .ok_or_else(|| BusinessCaseError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            })?;
        let mut next = rate - step;

        // Guard against divergence
        if next < dec!(-0.99) {
            next = dec!(-0.99);
        } else if next > dec!(100.0) {
            next = dec!(100.0);
        }

        if (next - rate).abs() < IRR_TOLERANCE {
            return Ok(next);
        }
        rate = next;
    }

    Err(BusinessCaseError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta,
    })
}

/// Compound a periodic rate up to an annual one: `(1 + r)^n - 1`.
pub fn annualize(periodic_rate: Rate, periods_per_year: u32) -> BusinessCaseResult<Rate> {
    (Decimal::ONE + periodic_rate)
        .checked_powi(i64::from(periods_per_year))
        .map(|f| f - Decimal::ONE)
        .ok_or_else(|| BusinessCaseError::InvalidInput {
            field: "periodic_rate".into(),
            reason: format!("Rate {periodic_rate} overflows when compounded {periods_per_year} times"),
        })
}

fn npv_and_derivative(rate: Rate, cash_flows: &[Money]) -> BusinessCaseResult<(Money, Decimal)> {
    let overflow = |t: usize| BusinessCaseError::DivisionByZero {
        context: format!("IRR discount factor at period {t}"),
    };

    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;

    for (t, cf) in cash_flows.iter().enumerate() {
        let t_i = t as i64;
        // An overflowing discount factor means the term is negligible.
        let Some(discount) = one_plus_r.checked_powi(t_i) else {
            continue;
        };
        if discount.is_zero() {
            continue;
        }
        let term = cf.checked_div(discount).ok_or_else(|| overflow(t))?;
        npv_val = npv_val.checked_add(term).ok_or_else(|| overflow(t))?;

        if t > 0 {
            if let Some(next) = one_plus_r.checked_powi(t_i + 1).filter(|d| !d.is_zero()) {
                let slope = (Decimal::from(t_i) * cf)
                    .checked_div(next)
                    .ok_or_else(|| overflow(t))?;
                dnpv = dnpv.checked_sub(slope).ok_or_else(|| overflow(t))?;
            }
        }
    }

    Ok((npv_val, dnpv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // NPV at 10%: -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(1.0));
    }

    #[test]
    fn test_cumulative_npv_first_period_undiscounted() {
        let cfs = vec![dec!(-500), dec!(200), dec!(200)];
        let running = cumulative_npv(dec!(0.05), &cfs).unwrap();
        assert_eq!(running.len(), 3);
        assert_eq!(running[0], dec!(-500));
        assert!(running[1] > running[0]);
    }

    #[test]
    fn test_cumulative_npv_huge_rate_zeroes_late_periods() {
        let mut cfs = vec![dec!(-1000)];
        cfs.extend(std::iter::repeat(dec!(100)).take(60));
        let running = cumulative_npv(dec!(1000), &cfs).unwrap();
        assert_eq!(running.len(), 61);
        assert_eq!(running[60], running[20]);
        assert!(running[60] > dec!(-1000) && running[60] < dec!(-999));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_rejects_rate_at_minus_one() {
        let cfs = vec![dec!(-100), dec!(50)];
        assert!(npv(dec!(-1), &cfs).is_err());
    }

    #[test]
    fn test_irr_basic() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let result = irr(&cfs, dec!(0.10)).unwrap();
        // IRR should be ~9.7%
        assert!((result - dec!(0.097)).abs() < dec!(0.01));
    }

    #[test]
    fn test_irr_needs_two_flows() {
        assert!(irr(&[dec!(-100)], dec!(0.1)).is_err());
    }

    #[test]
    fn test_annualize_monthly() {
        let annual = annualize(dec!(0.01), 12).unwrap();
        // 1.01^12 - 1 ≈ 0.126825
        assert!((annual - dec!(0.126825)).abs() < dec!(0.000001));
    }
}
