//! Semantic role resolution over loaded column names.
//!
//! Deployments rename and reorder the export columns freely, so roles are
//! resolved by keyword matching instead of exact names: a column fills a
//! role when its normalized name contains every keyword of that role, and
//! the leftmost satisfying column wins. Resolution runs once per table; the
//! resulting map is reused for every row.

use serde::Serialize;

const REVENUE_KEYWORDS: &[&str] = &["TARGET", "PREMIUM"];
const CLOSE_MONTH_KEYWORDS: &[&str] = &["THÁNG", "NHẬN", "FILE"];
const LEAD_MONTH_KEYWORDS: &[&str] = &["THÁNG", "NHẬN", "LEAD"];
const LEAD_YEAR_KEYWORDS: &[&str] = &["NĂM", "NHẬN", "LEAD"];
const RECORD_ID_KEYWORDS: &[&str] = &["LEAD", "ID"];
const SOURCE_KEYWORDS: &[&str] = &["SOURCE"];

/// Column index per semantic role. `None` means no column matched; the
/// pipeline degrades that role to its documented default instead of
/// failing the run.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnMap {
    pub revenue: Option<usize>,
    pub close_month: Option<usize>,
    pub lead_month: Option<usize>,
    pub lead_year: Option<usize>,
    pub record_id: Option<usize>,
    pub source_channel: Option<usize>,
}

impl ColumnMap {
    /// Resolves every role against the table's column names.
    pub fn resolve(headers: &[String]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize(h)).collect();

        ColumnMap {
            revenue: find_role(&normalized, REVENUE_KEYWORDS),
            close_month: find_role(&normalized, CLOSE_MONTH_KEYWORDS),
            lead_month: find_role(&normalized, LEAD_MONTH_KEYWORDS),
            lead_year: find_role(&normalized, LEAD_YEAR_KEYWORDS),
            record_id: find_role(&normalized, RECORD_ID_KEYWORDS),
            source_channel: find_role(&normalized, SOURCE_KEYWORDS),
        }
    }

    /// Roles that found no column, by display name.
    pub fn unresolved_roles(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.revenue.is_none() {
            missing.push("revenue amount");
        }
        if self.close_month.is_none() {
            missing.push("close month");
        }
        if self.lead_month.is_none() {
            missing.push("lead month");
        }
        if self.lead_year.is_none() {
            missing.push("lead year");
        }
        if self.record_id.is_none() {
            missing.push("record id");
        }
        if self.source_channel.is_none() {
            missing.push("source channel");
        }
        missing
    }
}

/// Uppercases and collapses internal whitespace to single spaces.
fn normalize(header: &str) -> String {
    header
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn find_role(normalized: &[String], keywords: &[&str]) -> Option<usize> {
    normalized
        .iter()
        .position(|name| keywords.iter().all(|k| name.contains(k)))
}
