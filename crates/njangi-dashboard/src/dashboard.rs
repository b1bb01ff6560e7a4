//! Dashboard view model: contributor ranking, category split, recent activity

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::HashMap;

use crate::coerce;
use crate::config::ColumnCandidates;
use crate::constants;
use crate::loader::DashboardData;
use crate::metrics::{compute_metrics, Metrics};
use crate::table::{cell_text, pick_column, scalar_key, Row, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct Contributor {
    pub member: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: &'static str,
    pub value: f64,
    /// Share of the three-category sum, 0-100
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentActivity {
    pub rows: Table,
    /// False when the time column was missing or did not parse
    pub sorted: bool,
}

/// Everything the Dashboard page shows
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub metrics: Metrics,
    /// `None` when there are no contributions or no recognizable amount column
    pub top_contributors: Option<Vec<Contributor>>,
    pub category_split: Vec<CategoryShare>,
    pub recent_activity: RecentActivity,
}

pub fn build_dashboard(data: &DashboardData, columns: &ColumnCandidates) -> DashboardView {
    let metrics = compute_metrics(data, columns);

    DashboardView {
        metrics,
        top_contributors: top_contributors(
            &data.contributions,
            &data.members,
            columns,
            constants::TOP_CONTRIBUTORS,
        ),
        category_split: category_split(&metrics),
        recent_activity: recent_activity(&data.history, columns, constants::RECENT_ACTIVITY_ROWS),
    }
}

// =============================================================================
// Top Contributors
// =============================================================================

/// How each contribution row gets its display label
enum Labeler<'a> {
    Column(&'a str),
    Join {
        id_column: &'a str,
        names: HashMap<String, String>,
    },
    Fallback,
}

impl Labeler<'_> {
    fn label(&self, row: &Row) -> String {
        match self {
            Labeler::Column(column) => match row.get(*column) {
                None | Some(Value::Null) => constants::UNKNOWN_MEMBER_LABEL.to_string(),
                Some(value) => cell_text(value),
            },
            Labeler::Join { id_column, names } => row
                .get(*id_column)
                .and_then(scalar_key)
                .and_then(|key| names.get(&key).cloned())
                .unwrap_or_else(|| constants::UNKNOWN_MEMBER_LABEL.to_string()),
            Labeler::Fallback => constants::FALLBACK_MEMBER_LABEL.to_string(),
        }
    }
}

fn labeler<'a>(contributions: &Table, members: &Table, columns: &'a ColumnCandidates) -> Labeler<'a> {
    if let Some(name_column) = pick_column(contributions, &columns.contribution_name) {
        return Labeler::Column(name_column);
    }

    let Some(id_column) = pick_column(contributions, &columns.contribution_member_id) else {
        return Labeler::Fallback;
    };
    if members.is_empty() {
        return Labeler::Fallback;
    }
    let (Some(member_id), Some(member_name)) = (
        pick_column(members, &columns.member_id),
        pick_column(members, &columns.member_name),
    ) else {
        return Labeler::Fallback;
    };

    let mut names = HashMap::new();
    for row in members.rows() {
        let Some(key) = row.get(member_id).and_then(scalar_key) else {
            continue;
        };
        let name = row.get(member_name).map(cell_text).unwrap_or_default();
        names.entry(key).or_insert(name);
    }

    Labeler::Join { id_column, names }
}

/// Rank contributors by summed amount, highest first, ties by name
pub fn top_contributors(
    contributions: &Table,
    members: &Table,
    columns: &ColumnCandidates,
    limit: usize,
) -> Option<Vec<Contributor>> {
    if contributions.is_empty() {
        return None;
    }
    let amount_column = pick_column(contributions, &columns.contribution_amount)?;
    let labeler = labeler(contributions, members, columns);

    let mut totals: Vec<Contributor> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in contributions.rows() {
        let label = labeler.label(row);
        let amount = row.get(amount_column).map(coerce::to_number).unwrap_or(0.0);

        match index.get(&label) {
            Some(&i) => totals[i].amount += amount,
            None => {
                index.insert(label.clone(), totals.len());
                totals.push(Contributor { member: label, amount });
            }
        }
    }

    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.member.cmp(&b.member)));
    totals.truncate(limit);

    Some(totals)
}

// =============================================================================
// Category Split
// =============================================================================

pub fn category_split(metrics: &Metrics) -> Vec<CategoryShare> {
    let values = [
        ("Pot", metrics.pot_total),
        ("Foundation", metrics.foundation_total),
        ("Loans Due", metrics.outstanding_loans_due),
    ];
    let total: f64 = values.iter().map(|(_, v)| v).sum();

    values
        .into_iter()
        .map(|(category, value)| CategoryShare {
            category,
            value,
            percent: if total != 0.0 { value / total * 100.0 } else { 0.0 },
        })
        .collect()
}

// =============================================================================
// Recent Activity
// =============================================================================

/// Parse the timestamp formats Supabase and hand-entered sheets produce
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    // Postgres timestamptz text form, e.g. "2025-01-05 10:00:00+00"
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a whole column; `None` if any non-null value is not a timestamp
fn parse_time_column<'a>(values: impl Iterator<Item = &'a Value>) -> Option<Vec<Option<NaiveDateTime>>> {
    values
        .map(|value| match value {
            Value::Null => Some(None),
            Value::String(s) => parse_timestamp(s).map(Some),
            _ => None,
        })
        .collect()
}

/// Most recent history rows, newest first when the time column parses
pub fn recent_activity(history: &Table, columns: &ColumnCandidates, limit: usize) -> RecentActivity {
    if history.is_empty() {
        return RecentActivity {
            rows: Table::empty(),
            sorted: false,
        };
    }

    let time_column = pick_column(history, &columns.history_time);
    let shown: Vec<&str> = [
        time_column,
        pick_column(history, &columns.history_type),
        pick_column(history, &columns.history_member),
        pick_column(history, &columns.history_amount),
        pick_column(history, &columns.history_interest_pct),
        pick_column(history, &columns.history_total_due),
    ]
    .into_iter()
    .flatten()
    .collect();

    let view = if shown.is_empty() { history.clone() } else { history.select(&shown) };

    // An all-null column gives no order to apply
    let times = time_column
        .and_then(|column| parse_time_column(view.column(column)))
        .filter(|times| times.iter().any(Option::is_some));
    let (view, sorted) = match times {
        Some(times) => {
            let mut order: Vec<usize> = (0..times.len()).collect();
            // Newest first, rows without a time last
            order.sort_by(|&a, &b| match (times[a], times[b]) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
            (view.reorder(&order), true)
        }
        None => {
            if let Some(column) = time_column {
                tracing::debug!(column, "history timestamps did not parse, leaving rows unsorted");
            }
            (view, false)
        }
    };

    RecentActivity {
        rows: view.head(limit),
        sorted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::rows;
    use serde_json::json;

    fn table(data: Value) -> Table {
        Table::from_rows(rows(data))
    }

    fn columns() -> ColumnCandidates {
        ColumnCandidates::default()
    }

    #[test]
    fn test_join_member_names_by_id() {
        let contributions = table(json!([
            {"member_id": 1, "amount": "100"},
            {"member_id": 1, "amount": "abc"},
        ]));
        let members = table(json!([{"id": 1, "name": "Alice"}]));

        let top = top_contributors(&contributions, &members, &columns(), 10).unwrap();
        assert_eq!(
            top,
            vec![Contributor {
                member: "Alice".to_string(),
                amount: 100.0
            }]
        );
    }

    #[test]
    fn test_join_matches_text_and_numeric_ids() {
        let contributions = table(json!([
            {"member_id": "2", "amount": 5},
            {"member_id": 3, "amount": 7},
        ]));
        let members = table(json!([{"id": 2, "full_name": "Bea"}]));

        let top = top_contributors(&contributions, &members, &columns(), 10).unwrap();
        assert_eq!(top[0].member, "Unknown");
        assert_eq!(top[0].amount, 7.0);
        assert_eq!(top[1].member, "Bea");
    }

    #[test]
    fn test_join_keeps_large_and_zero_padded_ids_distinct() {
        let contributions = table(json!([{"member_id": 9007199254740993u64, "amount": 10}]));
        let members = table(json!([
            {"id": 9007199254740992u64, "name": "Wrong"},
            {"id": 9007199254740993u64, "name": "Right"},
        ]));
        let top = top_contributors(&contributions, &members, &columns(), 10).unwrap();
        assert_eq!(top[0].member, "Right");

        let contributions = table(json!([{"member_id": "007", "amount": 10}]));
        let members = table(json!([
            {"id": "7", "name": "Seven"},
            {"id": "007", "name": "Bond"},
        ]));
        let top = top_contributors(&contributions, &members, &columns(), 10).unwrap();
        assert_eq!(top[0].member, "Bond");
    }

    #[test]
    fn test_direct_name_column_wins_over_join() {
        let contributions = table(json!([
            {"member_name": "Carl", "member_id": 1, "amount": 10},
        ]));
        let members = table(json!([{"id": 1, "name": "Alice"}]));

        let top = top_contributors(&contributions, &members, &columns(), 10).unwrap();
        assert_eq!(top[0].member, "Carl");
    }

    #[test]
    fn test_fallback_bucket_without_names() {
        let contributions = table(json!([{"amount": 10}, {"amount": 15}]));

        let top = top_contributors(&contributions, &Table::empty(), &columns(), 10).unwrap();
        assert_eq!(
            top,
            vec![Contributor {
                member: "Member".to_string(),
                amount: 25.0
            }]
        );

        // An id column alone is not enough when members cannot be joined
        let with_ids = table(json!([{"member_id": 1, "amount": 10}]));
        let members_without_names = table(json!([{"id": 1}]));
        let top = top_contributors(&with_ids, &members_without_names, &columns(), 10).unwrap();
        assert_eq!(top[0].member, "Member");
    }

    #[test]
    fn test_ranking_is_sorted_and_capped() {
        let data: Vec<Value> = (0..12)
            .map(|i| json!({"name": format!("m{:02}", i), "amount": i}))
            .chain([json!({"name": "m00", "amount": 100})])
            .collect();
        let contributions = table(Value::Array(data));

        let top = top_contributors(&contributions, &Table::empty(), &columns(), 10).unwrap();
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].member, "m00");
        assert_eq!(top[0].amount, 100.0);
        assert_eq!(top[1].member, "m11");
        assert_eq!(top[9].member, "m03");
    }

    #[test]
    fn test_no_chart_without_contributions() {
        assert_eq!(top_contributors(&Table::empty(), &Table::empty(), &columns(), 10), None);

        let unrecognized = table(json!([{"member_id": 1, "sum": 10}]));
        assert_eq!(top_contributors(&unrecognized, &Table::empty(), &columns(), 10), None);
    }

    #[test]
    fn test_category_split() {
        let metrics = Metrics {
            pot_total: 600.0,
            foundation_total: 300.0,
            outstanding_loans_due: 100.0,
            ..Default::default()
        };
        let split = category_split(&metrics);
        let categories: Vec<&str> = split.iter().map(|s| s.category).collect();
        assert_eq!(categories, vec!["Pot", "Foundation", "Loans Due"]);
        assert_eq!(split[0].percent, 60.0);
        assert_eq!(split[2].percent, 10.0);

        let zero = category_split(&Metrics::default());
        assert!(zero.iter().all(|s| s.percent == 0.0));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T10:30:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T10:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01 10:30:00+00"), Some(expected));
        assert_eq!(
            parse_timestamp("2025-03-01"),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("last tuesday"), None);
    }

    #[test]
    fn test_recent_activity_newest_first() {
        let history = table(json!([
            {"created_at": "2025-01-01", "type": "contribution", "amount": 10, "notes": "x"},
            {"created_at": null, "type": "fine", "amount": 2, "notes": "y"},
            {"created_at": "2025-03-01", "type": "loan", "amount": 50, "notes": "z"},
        ]));

        let activity = recent_activity(&history, &columns(), 20);
        assert!(activity.sorted);
        assert_eq!(activity.rows.columns(), &["created_at", "type", "amount"]);
        let types: Vec<String> = activity.rows.column("type").map(cell_text).collect();
        assert_eq!(types, vec!["loan", "contribution", "fine"]);
    }

    #[test]
    fn test_recent_activity_unsorted_when_time_unparseable() {
        let history = table(json!([
            {"date": "2025-01-01", "action": "a"},
            {"date": "soon", "action": "b"},
            {"date": "2025-03-01", "action": "c"},
        ]));

        let activity = recent_activity(&history, &columns(), 20);
        assert!(!activity.sorted);
        let actions: Vec<String> = activity.rows.column("action").map(cell_text).collect();
        assert_eq!(actions, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_recent_activity_all_null_times_not_sorted() {
        let history = table(json!([
            {"created_at": null, "type": "a"},
            {"created_at": null, "type": "b"},
        ]));

        let activity = recent_activity(&history, &columns(), 20);
        assert!(!activity.sorted);
        let types: Vec<String> = activity.rows.column("type").map(cell_text).collect();
        assert_eq!(types, vec!["a", "b"]);
    }

    #[test]
    fn test_recent_activity_limit_and_raw_columns() {
        let data: Vec<Value> = (0..30).map(|i| json!({"ref": i})).collect();
        let history = table(Value::Array(data));

        let activity = recent_activity(&history, &columns(), 20);
        assert_eq!(activity.rows.len(), 20);
        // No recognized column: every column is shown
        assert_eq!(activity.rows.columns(), &["ref"]);
        assert!(!activity.sorted);
    }

    #[test]
    fn test_build_dashboard_empty_contributions() {
        let data = DashboardData::default();
        let view = build_dashboard(&data, &columns());
        assert_eq!(view.metrics.pot_total, 0.0);
        assert_eq!(view.top_contributors, None);
        assert!(view.recent_activity.rows.is_empty());
    }
}
