use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BusinessCaseError;
use crate::types::{with_metadata, ComputationOutput};
use crate::BusinessCaseResult;

/// Ease threshold separating Quick Wins from Strategic bets.
pub const QUICK_WIN_MIN_EASE: Decimal = dec!(6.5);
/// Impact threshold for either highlighted quadrant.
pub const HIGH_IMPACT_MIN: Decimal = dec!(8.5);

const SCORE_MIN: Decimal = dec!(0);
const SCORE_MAX: Decimal = dec!(10);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One bubble on the ease/impact matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    pub name: String,
    /// Implementation ease, 0-10
    pub ease: Decimal,
    /// Business impact, 0-10
    pub impact: Decimal,
    /// Rank, 1 = first to deliver
    pub priority: u32,
    /// Relative bubble size
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// High impact, easy to implement
    QuickWin,
    /// High impact, harder to implement
    Strategic,
    /// Outside both highlighted quadrants
    Unclassified,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatrixInput {
    /// Defaults to the standard five initiatives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiatives: Option<Vec<Initiative>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedInitiative {
    pub name: String,
    pub ease: Decimal,
    pub impact: Decimal,
    pub priority: u32,
    pub weight: u32,
    pub quadrant: Quadrant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixOutput {
    /// Sorted by priority
    pub initiatives: Vec<PlacedInitiative>,
    pub quick_wins: usize,
    pub strategic: usize,
    pub unclassified: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// The five initiatives plotted on the prioritization slide.
pub fn standard_initiatives() -> Vec<Initiative> {
    [
        ("Content Generation", dec!(8), dec!(10), 1, 18),
        ("Discovery Suite", dec!(6), dec!(9), 2, 15),
        ("Command Center", dec!(7), dec!(8), 3, 15),
        ("Continuous Monitor", dec!(5), dec!(9), 4, 14),
        ("Knowledge System", dec!(4), dec!(7), 5, 11),
    ]
    .into_iter()
    .map(|(name, ease, impact, priority, weight)| Initiative {
        name: name.to_string(),
        ease,
        impact,
        priority,
        weight,
    })
    .collect()
}

pub fn classify(ease: Decimal, impact: Decimal) -> Quadrant {
    if impact < HIGH_IMPACT_MIN {
        Quadrant::Unclassified
    } else if ease >= QUICK_WIN_MIN_EASE {
        Quadrant::QuickWin
    } else {
        Quadrant::Strategic
    }
}

/// Place each initiative in its quadrant, ordered by priority.
pub fn build_matrix(input: &MatrixInput) -> BusinessCaseResult<ComputationOutput<MatrixOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let initiatives = input
        .initiatives
        .clone()
        .unwrap_or_else(standard_initiatives);
    validate_initiatives(&initiatives)?;

    let mut placed: Vec<PlacedInitiative> = initiatives
        .into_iter()
        .map(|i| PlacedInitiative {
            quadrant: classify(i.ease, i.impact),
            name: i.name,
            ease: i.ease,
            impact: i.impact,
            priority: i.priority,
            weight: i.weight,
        })
        .collect();
    placed.sort_by_key(|p| p.priority);

    let count = |q: Quadrant| placed.iter().filter(|p| p.quadrant == q).count();
    let output = MatrixOutput {
        quick_wins: count(Quadrant::QuickWin),
        strategic: count(Quadrant::Strategic),
        unclassified: count(Quadrant::Unclassified),
        initiatives: placed,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Ease / impact prioritization matrix",
        &serde_json::json!({
            "quick_win_min_ease": QUICK_WIN_MIN_EASE,
            "high_impact_min": HIGH_IMPACT_MIN,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate_initiatives(initiatives: &[Initiative]) -> BusinessCaseResult<()> {
    if initiatives.is_empty() {
        return Err(BusinessCaseError::InsufficientData(
            "Prioritization matrix needs at least one initiative".into(),
        ));
    }
    for i in initiatives {
        for (field, score) in [("ease", i.ease), ("impact", i.impact)] {
            if score < SCORE_MIN || score > SCORE_MAX {
                return Err(BusinessCaseError::InvalidInput {
                    field: format!("{}.{field}", i.name),
                    reason: format!("Score must be between {SCORE_MIN} and {SCORE_MAX}"),
                });
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_matrix() {
        let out = build_matrix(&MatrixInput::default()).unwrap();
        let quadrants: Vec<(&str, Quadrant)> = out
            .result
            .initiatives
            .iter()
            .map(|p| (p.name.as_str(), p.quadrant))
            .collect();
        assert_eq!(
            quadrants,
            vec![
                ("Content Generation", Quadrant::QuickWin),
                ("Discovery Suite", Quadrant::Strategic),
                ("Command Center", Quadrant::Unclassified),
                ("Continuous Monitor", Quadrant::Strategic),
                ("Knowledge System", Quadrant::Unclassified),
            ]
        );
        assert_eq!(out.result.quick_wins, 1);
        assert_eq!(out.result.strategic, 2);
        assert_eq!(out.result.unclassified, 2);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(classify(dec!(6.5), dec!(8.5)), Quadrant::QuickWin);
        assert_eq!(classify(dec!(6.49), dec!(8.5)), Quadrant::Strategic);
        assert_eq!(classify(dec!(9), dec!(8.49)), Quadrant::Unclassified);
    }

    #[test]
    fn test_custom_initiatives_sorted_by_priority() {
        let input = MatrixInput {
            initiatives: Some(vec![
                Initiative {
                    name: "B".into(),
                    ease: dec!(3),
                    impact: dec!(9),
                    priority: 2,
                    weight: 10,
                },
                Initiative {
                    name: "A".into(),
                    ease: dec!(9),
                    impact: dec!(9),
                    priority: 1,
                    weight: 10,
                },
            ]),
        };
        let out = build_matrix(&input).unwrap();
        assert_eq!(out.result.initiatives[0].name, "A");
        assert_eq!(out.result.initiatives[1].quadrant, Quadrant::Strategic);
    }

    #[test]
    fn test_rejects_out_of_range_scores() {
        let mut initiatives = standard_initiatives();
        initiatives[0].impact = dec!(11);
        let input = MatrixInput {
            initiatives: Some(initiatives),
        };
        assert!(build_matrix(&input).is_err());
        assert!(build_matrix(&MatrixInput {
            initiatives: Some(Vec::new())
        })
        .is_err());
    }
}
