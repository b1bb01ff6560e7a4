//! Centralized constants for the njangi dashboard
//!
//! Table names, default column candidates and display limits live here.
//! Deployment-specific settings (credentials, overrides) come from config.toml.

// =============================================================================
// Supabase REST API
// =============================================================================

/// PostgREST path appended to the project URL
pub const REST_API_PATH: &str = "/rest/v1";

// =============================================================================
// Table Names
// =============================================================================

pub const MEMBERS_TABLE: &str = "members";
pub const CONTRIBUTIONS_TABLE: &str = "contributions";
pub const FOUNDATION_PAYMENTS_TABLE: &str = "foundation_payments";
pub const LOANS_TABLE: &str = "loans";
pub const FINES_TABLE: &str = "fines";
pub const PAYOUTS_TABLE: &str = "payouts";
pub const HISTORY_TABLE: &str = "history";
pub const SURETIES_TABLE: &str = "sureties";

// =============================================================================
// Loading & Caching
// =============================================================================

/// How long a fetched table is reused before hitting the API again
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Deadline for one table read, connect through body; a stalled read
/// becomes a load warning instead of blocking the page
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Row cap for the history table
pub const HISTORY_ROW_LIMIT: usize = 200;

// =============================================================================
// Dashboard Display
// =============================================================================

/// Number of contributors shown in the ranking chart
pub const TOP_CONTRIBUTORS: usize = 10;

/// Number of history rows shown under Recent Activity
pub const RECENT_ACTIVITY_ROWS: usize = 20;

/// Width of the longest bar in text charts
pub const CHART_WIDTH: usize = 40;

/// Label used when contributions cannot be attributed to anyone
pub const FALLBACK_MEMBER_LABEL: &str = "Member";

/// Label for contributions whose member id has no match in the members table
pub const UNKNOWN_MEMBER_LABEL: &str = "Unknown";

// =============================================================================
// Column Candidates (schema version 1)
// Ordered by priority: the first name present in a table wins
// =============================================================================

/// Version of the default candidate lists below
pub const COLUMN_SCHEMA_VERSION: u32 = 1;

pub const CONTRIBUTION_AMOUNT_COLUMNS: &[&str] = &[
    "amount",
    "amount_paid",
    "contribution_amount",
    "paid_amount",
    "value",
];
pub const FOUNDATION_AMOUNT_COLUMNS: &[&str] = &["amount_paid", "amount", "paid_amount", "value"];
pub const LOAN_DUE_COLUMNS: &[&str] = &[
    "total_due",
    "amount_due",
    "balance",
    "due_amount",
    "remaining_due",
];
pub const LOAN_PRINCIPAL_COLUMNS: &[&str] = &["principal", "amount", "loan_amount"];
pub const HISTORY_INTEREST_COLUMNS: &[&str] = &["interest", "interest_amount", "interest_generated"];

pub const CONTRIBUTION_NAME_COLUMNS: &[&str] = &["member_name", "name", "member", "full_name"];
pub const CONTRIBUTION_MEMBER_ID_COLUMNS: &[&str] = &["member_id", "user_id"];
pub const MEMBER_ID_COLUMNS: &[&str] = &["id", "member_id"];
pub const MEMBER_NAME_COLUMNS: &[&str] = &["name", "full_name", "member_name"];

pub const HISTORY_TIME_COLUMNS: &[&str] = &["created_at", "time", "date", "timestamp"];
pub const HISTORY_TYPE_COLUMNS: &[&str] = &["type", "action", "event_type", "category"];
pub const HISTORY_MEMBER_COLUMNS: &[&str] = &["member_name", "name", "member", "full_name"];
pub const HISTORY_AMOUNT_COLUMNS: &[&str] = &["amount", "value", "amount_paid"];
pub const HISTORY_INTEREST_PCT_COLUMNS: &[&str] = &["interest_pct", "interest_rate", "interest_percent"];
pub const HISTORY_TOTAL_DUE_COLUMNS: &[&str] = &["total_due", "amount_due", "due_amount"];

// =============================================================================
// Messages
// =============================================================================

pub const APP_TITLE: &str = "🌱 The Young Shall Grow – Njangi";

pub const SIDEBAR_TIP: &str =
    "Tip: If data shows 0, the dashboard is likely connected to an empty DB or RLS is blocking reads.";

pub const FOOTER_CAPTION: &str = "✅ If you see 0s but your website shows data, your SUPABASE url/anon_key \
     are pointing to a different Supabase project.";

// =============================================================================
// File Names
// =============================================================================

/// Default config file path
pub const CONFIG_FILE: &str = "config.toml";

/// Dashboard metrics CSV filename
pub const SUMMARY_FILENAME: &str = "summary.csv";

/// Top contributors CSV filename
pub const TOP_CONTRIBUTORS_FILENAME: &str = "top_contributors.csv";
