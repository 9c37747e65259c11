//! Cohort classification: each record lands in exactly one bucket.

use std::fmt;

use crate::table::Cell;

/// Channel values that identify a cold call, after normalization.
const COLD_CALL_VALUES: [&str; 2] = ["CC", "COLDCALL"];

/// Cohort assigned to each record, the row axis of the report matrices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CohortLabel {
    /// Lead received in the run's current year, bucketed per month.
    Lead { month: i32, year: i32 },
    /// Lead received in an earlier year; all months collapse per year.
    PriorYear { year: i32 },
    /// Record acquired through the cold-call channel.
    ColdCall,
    /// Temporal fields missing or unparseable.
    Unclassified,
}

impl fmt::Display for CohortLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CohortLabel::Lead { month, year } => write!(f, "Lead T{month:02}/{year}"),
            CohortLabel::PriorYear { year } => write!(f, "Year {year}"),
            CohortLabel::ColdCall => f.write_str("Cold Call Channel"),
            CohortLabel::Unclassified => f.write_str("Unclassified"),
        }
    }
}

impl CohortLabel {
    /// Marketing cohorts are the temporal ones; cold-call and unclassified
    /// rows are excluded from the marketing revenue scalar.
    pub fn is_marketing(&self) -> bool {
        matches!(
            self,
            CohortLabel::Lead { .. } | CohortLabel::PriorYear { .. }
        )
    }

    /// Sort key for the four display tiers: current-year leads newest
    /// first, prior years newest first, then cold call, then unclassified.
    pub fn sort_key(&self) -> (u8, i64, i64) {
        match self {
            CohortLabel::Lead { month, year } => (0, -(*year as i64), -(*month as i64)),
            CohortLabel::PriorYear { year } => (1, -(*year as i64), 0),
            CohortLabel::ColdCall => (2, 0, 0),
            CohortLabel::Unclassified => (3, 0, 0),
        }
    }
}

/// Assigns a cohort using the fixed branch priority: explicit channel
/// identity first, then current-year leads, then prior years, with
/// unparseable temporal fields falling through to
/// [`CohortLabel::Unclassified`]. Bad rows are bucketed, never dropped.
pub fn classify(
    source_channel: Option<&Cell>,
    lead_year: Option<&Cell>,
    lead_month: Option<&Cell>,
    current_year: i32,
) -> CohortLabel {
    if let Some(channel) = source_channel {
        let normalized: String = channel
            .text()
            .to_uppercase()
            .chars()
            .filter(|c| *c != ' ' && *c != '.')
            .collect();
        if COLD_CALL_VALUES.contains(&normalized.as_str()) {
            return CohortLabel::ColdCall;
        }
    }

    match (
        lead_year.and_then(parse_int),
        lead_month.and_then(parse_int),
    ) {
        (Some(year), Some(month)) if year == current_year => CohortLabel::Lead { month, year },
        (Some(year), Some(_)) => CohortLabel::PriorYear { year },
        _ => CohortLabel::Unclassified,
    }
}

/// Parses the close-month cell; only months inside the calendar range
/// survive. Anything else excludes the row from the matrices without
/// dropping it from the exported table.
pub fn close_month(cell: Option<&Cell>) -> Option<u32> {
    let month = cell.and_then(parse_int)?;
    (1..=12).contains(&month).then_some(month as u32)
}

/// Integer parse via float-then-truncate, so values like `"3.0"` survive.
fn parse_int(cell: &Cell) -> Option<i32> {
    let n = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then(|| n.trunc() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_cold_call_wins_over_valid_temporal_fields() {
        let label = classify(
            Some(&text("cc")),
            Some(&Cell::Number(2024.0)),
            Some(&Cell::Number(3.0)),
            2024,
        );
        assert_eq!(label, CohortLabel::ColdCall);
        assert_eq!(label.to_string(), "Cold Call Channel");
    }

    #[test]
    fn test_cold_call_value_normalization() {
        for value in ["CC", "cc", "C.C", "cold call", "Cold Call", "COLDCALL."] {
            assert_eq!(
                classify(Some(&text(value)), None, None, 2024),
                CohortLabel::ColdCall,
                "value {value:?} should classify as cold call"
            );
        }
        assert_eq!(
            classify(Some(&text("Facebook")), None, None, 2024),
            CohortLabel::Unclassified
        );
    }

    #[test]
    fn test_current_year_lead_label() {
        let label = classify(
            Some(&text("Facebook")),
            Some(&Cell::Number(2024.0)),
            Some(&Cell::Number(3.0)),
            2024,
        );
        assert_eq!(label, CohortLabel::Lead { month: 3, year: 2024 });
        assert_eq!(label.to_string(), "Lead T03/2024");
    }

    #[test]
    fn test_prior_year_discards_month() {
        let label = classify(
            None,
            Some(&text("2022")),
            Some(&text("11")),
            2024,
        );
        assert_eq!(label, CohortLabel::PriorYear { year: 2022 });
        assert_eq!(label.to_string(), "Year 2022");
    }

    #[test]
    fn test_float_text_fields_truncate() {
        let label = classify(
            None,
            Some(&text("2024.0")),
            Some(&text("3.0")),
            2024,
        );
        assert_eq!(label, CohortLabel::Lead { month: 3, year: 2024 });
    }

    #[test]
    fn test_missing_or_bad_temporal_fields_are_unclassified() {
        assert_eq!(classify(None, None, None, 2024), CohortLabel::Unclassified);
        assert_eq!(
            classify(None, Some(&text("unknown")), Some(&text("3")), 2024),
            CohortLabel::Unclassified
        );
        assert_eq!(
            classify(None, Some(&Cell::Number(2024.0)), Some(&Cell::Empty), 2024),
            CohortLabel::Unclassified
        );
    }

    #[test]
    fn test_close_month_range() {
        assert_eq!(close_month(Some(&Cell::Number(1.0))), Some(1));
        assert_eq!(close_month(Some(&Cell::Number(12.0))), Some(12));
        assert_eq!(close_month(Some(&text("12.0"))), Some(12));
        assert_eq!(close_month(Some(&Cell::Number(0.0))), None);
        assert_eq!(close_month(Some(&Cell::Number(13.0))), None);
        assert_eq!(close_month(Some(&text("n/a"))), None);
        assert_eq!(close_month(Some(&Cell::Empty)), None);
        assert_eq!(close_month(None), None);
    }

    #[test]
    fn test_sort_key_orders_the_four_tiers() {
        let mut labels = vec![
            CohortLabel::Unclassified,
            CohortLabel::PriorYear { year: 2021 },
            CohortLabel::Lead { month: 2, year: 2024 },
            CohortLabel::ColdCall,
            CohortLabel::PriorYear { year: 2023 },
            CohortLabel::Lead { month: 5, year: 2024 },
        ];
        labels.sort_by_key(|l| l.sort_key());

        assert_eq!(
            labels,
            vec![
                CohortLabel::Lead { month: 5, year: 2024 },
                CohortLabel::Lead { month: 2, year: 2024 },
                CohortLabel::PriorYear { year: 2023 },
                CohortLabel::PriorYear { year: 2021 },
                CohortLabel::ColdCall,
                CohortLabel::Unclassified,
            ]
        );
    }
}
