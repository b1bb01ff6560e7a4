//! Table loading with a short-lived in-memory cache
//!
//! A failed read never stops the dashboard: the table comes back empty with
//! a warning attached, and every downstream metric reads as zero.
//! Results (failures included) are reused for the configured TTL so that
//! switching pages does not hammer the API.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::constants;
use crate::supabase::{FetchError, TableSource};
use crate::table::Table;

/// Non-fatal diagnostic shown above the page
#[derive(Debug, Clone, PartialEq)]
pub struct LoadWarning {
    pub table: String,
    pub message: String,
    /// Underlying error text
    pub detail: String,
}

impl LoadWarning {
    fn new(table: &str, error: &FetchError) -> Self {
        Self {
            table: table.to_string(),
            message: format!("⚠️ Could not load '{}'. (Table missing or RLS blocked)", table),
            detail: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub table: Table,
    pub warning: Option<LoadWarning>,
}

/// Cached result with its own expiry, checked on read
#[derive(Debug)]
struct CacheEntry {
    value: LoadedTable,
    fetched_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < self.ttl
    }
}

/// All tables the dashboard reads, plus the warnings raised loading them
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub members: Table,
    pub contributions: Table,
    pub foundation_payments: Table,
    pub loans: Table,
    pub fines: Table,
    pub payouts: Table,
    pub history: Table,
    pub sureties: Table,
    pub warnings: Vec<LoadWarning>,
}

impl DashboardData {
    /// Every table with its remote name, in load order
    pub fn tables(&self) -> [(&'static str, &Table); 8] {
        [
            (constants::MEMBERS_TABLE, &self.members),
            (constants::CONTRIBUTIONS_TABLE, &self.contributions),
            (constants::FOUNDATION_PAYMENTS_TABLE, &self.foundation_payments),
            (constants::LOANS_TABLE, &self.loans),
            (constants::FINES_TABLE, &self.fines),
            (constants::PAYOUTS_TABLE, &self.payouts),
            (constants::HISTORY_TABLE, &self.history),
            (constants::SURETIES_TABLE, &self.sureties),
        ]
    }
}

pub struct TableLoader<S> {
    source: S,
    ttl: Duration,
    cache: HashMap<(String, Option<usize>), CacheEntry>,
}

impl<S: TableSource> TableLoader<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cache: HashMap::new(),
        }
    }

    /// Load a table, or its first `limit` rows. A limit of 0 means no limit.
    pub async fn load(&mut self, name: &str, limit: Option<usize>) -> LoadedTable {
        let limit = limit.filter(|&n| n > 0);
        let key = (name.to_string(), limit);

        if let Some(entry) = self.cache.get(&key) {
            if entry.is_fresh(Instant::now()) {
                tracing::debug!(table = name, "cache hit");
                return entry.value.clone();
            }
        }

        let value = match self.source.fetch(name, limit).await {
            Ok(rows) => LoadedTable {
                table: Table::from_rows(rows),
                warning: None,
            },
            Err(e) => {
                tracing::warn!(table = name, error = %e, "could not load table");
                LoadedTable {
                    table: Table::empty(),
                    warning: Some(LoadWarning::new(name, &e)),
                }
            }
        };

        self.cache.insert(
            key,
            CacheEntry {
                value: value.clone(),
                fetched_at: Instant::now(),
                ttl: self.ttl,
            },
        );

        value
    }

    /// Load every dashboard table; history is capped at `history_limit` rows
    pub async fn load_all(&mut self, history_limit: usize) -> DashboardData {
        let mut warnings = Vec::new();
        let mut take = |loaded: LoadedTable| {
            warnings.extend(loaded.warning);
            loaded.table
        };

        let members = take(self.load(constants::MEMBERS_TABLE, None).await);
        let contributions = take(self.load(constants::CONTRIBUTIONS_TABLE, None).await);
        let foundation_payments = take(self.load(constants::FOUNDATION_PAYMENTS_TABLE, None).await);
        let loans = take(self.load(constants::LOANS_TABLE, None).await);
        let fines = take(self.load(constants::FINES_TABLE, None).await);
        let payouts = take(self.load(constants::PAYOUTS_TABLE, None).await);
        let history = take(self.load(constants::HISTORY_TABLE, Some(history_limit)).await);
        let sureties = take(self.load(constants::SURETIES_TABLE, None).await);

        DashboardData {
            members,
            contributions,
            foundation_payments,
            loans,
            fines,
            payouts,
            history,
            sureties,
            warnings,
        }
    }
}
