use colored::Colorize;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use business_case_core::projection::chart::{ChartData, ChartRenderer};
use business_case_core::{BusinessCaseError, BusinessCaseResult};

/// Draws the yearly chart as horizontal text bars, one row per label, with
/// the cumulative NPV printed beside each bar.
pub struct TextChartRenderer {
    width: usize,
}

impl TextChartRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }
}

impl ChartRenderer for TextChartRenderer {
    type Handle = String;

    fn draw(&mut self, data: &ChartData) -> BusinessCaseResult<String> {
        if data.labels.is_empty() {
            return Err(BusinessCaseError::InsufficientData("Nothing to chart".into()));
        }

        let max_abs = data
            .cash_flow_bars
            .iter()
            .map(|v| v.abs())
            .max()
            .unwrap_or(Decimal::ZERO);
        let label_width = data.labels.iter().map(|l| l.len()).max().unwrap_or(0);

        let mut out = String::from("Cash flow and cumulative NPV\n");
        for ((label, bar), npv) in data
            .labels
            .iter()
            .zip(&data.cash_flow_bars)
            .zip(&data.cumulative_npv_line)
        {
            let len = bar_length(*bar, max_abs, self.width);
            let blocks = "█".repeat(len);
            let blocks = if bar.is_sign_negative() {
                blocks.red().to_string()
            } else {
                blocks.green().to_string()
            };
            let padding = " ".repeat(self.width - len);
            out.push_str(&format!(
                "{label:<label_width$}  {blocks}{padding}  {:>12}  NPV {:>12}\n",
                format_money(*bar),
                format_money(*npv),
            ));
        }
        Ok(out)
    }

    fn destroy(&mut self, handle: String) {
        log::debug!("discarding {} byte chart", handle.len());
    }
}

fn bar_length(value: Decimal, max_abs: Decimal, width: usize) -> usize {
    if max_abs.is_zero() {
        return 0;
    }
    (value.abs() / max_abs * Decimal::from(width as u64))
        .round()
        .to_usize()
        .unwrap_or(0)
        .min(width)
}

/// Whole currency units with thousands separators, e.g. "-110,600".
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round();
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(-110600)), "-110,600");
        assert_eq!(format_money(dec!(231583.07)), "231,583");
        assert_eq!(format_money(dec!(999)), "999");
        assert_eq!(format_money(dec!(0)), "0");
    }

    #[test]
    fn test_bar_length_scales_to_width() {
        assert_eq!(bar_length(dec!(-100), dec!(100), 40), 40);
        assert_eq!(bar_length(dec!(50), dec!(100), 40), 20);
        assert_eq!(bar_length(dec!(5), dec!(0), 40), 0);
    }

    #[test]
    fn test_draw_one_row_per_label() {
        let data = ChartData {
            labels: vec!["Initial".into(), "Year 1".into()],
            cash_flow_bars: vec![dec!(-100), dec!(50)],
            cumulative_npv_line: vec![dec!(-100), dec!(-52)],
        };
        let text = TextChartRenderer::new(10).draw(&data).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("Initial"));
        assert!(rows[2].trim_end().ends_with("-52"));
    }
}
