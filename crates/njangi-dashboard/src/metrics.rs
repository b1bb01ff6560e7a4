//! Scalar totals shown on the dashboard
//!
//! Each total resolves its column from a candidate list, coerces and sums.
//! A missing table or column gives 0.

use crate::coerce;
use crate::config::ColumnCandidates;
use crate::loader::DashboardData;
use crate::table::{pick_column, Table};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    /// Sum of contributions (the Njangi pot)
    pub pot_total: f64,
    /// Sum of foundation payments
    pub foundation_total: f64,
    /// Sum of loan due/balance amounts
    pub outstanding_loans_due: f64,
    /// Sum of loan principals
    pub loan_principal_total: f64,
    /// Sum of interest recorded in history
    pub total_interest: f64,
    pub members_count: usize,
}

/// Sum the first matching column, or 0 when none matches
pub fn column_total<S: AsRef<str>>(table: &Table, candidates: &[S]) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    match pick_column(table, candidates) {
        Some(column) => coerce::to_numbers(table.column(column)).iter().sum(),
        None => 0.0,
    }
}

pub fn compute_metrics(data: &DashboardData, columns: &ColumnCandidates) -> Metrics {
    Metrics {
        pot_total: column_total(&data.contributions, &columns.contribution_amount),
        foundation_total: column_total(&data.foundation_payments, &columns.foundation_amount),
        outstanding_loans_due: column_total(&data.loans, &columns.loan_due),
        loan_principal_total: column_total(&data.loans, &columns.loan_principal),
        total_interest: column_total(&data.history, &columns.history_interest),
        members_count: data.members.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::rows;
    use serde_json::json;

    fn table(data: serde_json::Value) -> Table {
        Table::from_rows(rows(data))
    }

    #[test]
    fn test_metrics_from_all_tables() {
        let data = DashboardData {
            members: table(json!([{"id": 1}, {"id": 2}, {"id": 3}])),
            contributions: table(json!([{"amount": 100}, {"amount": "50.5"}])),
            foundation_payments: table(json!([{"amount_paid": 20, "amount": 999}])),
            loans: table(json!([{"total_due": 300, "principal": 250}])),
            history: table(json!([{"interest": 12}, {"interest": "3"}])),
            ..Default::default()
        };

        let metrics = compute_metrics(&data, &ColumnCandidates::default());
        assert_eq!(metrics.pot_total, 150.5);
        // amount_paid has priority over amount for foundation payments
        assert_eq!(metrics.foundation_total, 20.0);
        assert_eq!(metrics.outstanding_loans_due, 300.0);
        assert_eq!(metrics.loan_principal_total, 250.0);
        assert_eq!(metrics.total_interest, 15.0);
        assert_eq!(metrics.members_count, 3);
    }

    #[test]
    fn test_missing_columns_give_zero() {
        let data = DashboardData {
            contributions: table(json!([{"note": "paid 100"}])),
            loans: table(json!([{"borrower": "Bob"}])),
            ..Default::default()
        };

        let metrics = compute_metrics(&data, &ColumnCandidates::default());
        assert_eq!(metrics, Metrics::default());
    }

    #[test]
    fn test_empty_tables_give_zero() {
        let metrics = compute_metrics(&DashboardData::default(), &ColumnCandidates::default());
        assert_eq!(metrics, Metrics::default());
    }

    #[test]
    fn test_loans_fall_back_to_balance() {
        let data = DashboardData {
            loans: table(json!([{"balance": 120}, {"balance": "80"}])),
            ..Default::default()
        };

        let metrics = compute_metrics(&data, &ColumnCandidates::default());
        assert_eq!(metrics.outstanding_loans_due, 200.0);
    }

    #[test]
    fn test_unparseable_amounts_count_as_zero() {
        let data = DashboardData {
            contributions: table(json!([
                {"member_id": 1, "amount": "100"},
                {"member_id": 1, "amount": "abc"},
            ])),
            ..Default::default()
        };

        let metrics = compute_metrics(&data, &ColumnCandidates::default());
        assert_eq!(metrics.pot_total, 100.0);
    }

    #[test]
    fn test_overridden_candidates() {
        let data = DashboardData {
            contributions: table(json!([{"amount": 1, "dues": 40}])),
            ..Default::default()
        };
        let columns = ColumnCandidates {
            contribution_amount: vec!["dues".to_string()],
            ..Default::default()
        };

        assert_eq!(compute_metrics(&data, &columns).pot_total, 40.0);
    }
}
