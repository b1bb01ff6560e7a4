//! Configuration for the njangi dashboard

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants;

/// Fatal problems found before anything is rendered
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Config file '{0}' not found.\n\n\
         To get started:\n\
         1. Copy config.toml.example to config.toml\n\
         2. Fill in your Supabase url and anon_key"
    )]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("❌ Missing supabase.url or supabase.anon_key in config file.")]
    MissingCredentials,
}

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub supabase: SupabaseSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub columns: ColumnCandidates,
}

/// Supabase credentials. Both are optional in the file so a missing value
/// is reported as a credentials problem rather than a TOML error.
#[derive(Debug, Deserialize)]
pub struct SupabaseSection {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    /// Seconds before a table read is abandoned
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SupabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    constants::REQUEST_TIMEOUT_SECS
}

#[derive(Debug, Deserialize)]
pub struct CacheSection {
    /// Seconds a loaded table is reused
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    constants::DEFAULT_CACHE_TTL_SECS
}

/// Ordered column-name candidates per metric or display field.
///
/// Any list can be overridden from the `[columns]` section; lists not named
/// there keep the defaults from `constants`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnCandidates {
    pub schema_version: u32,
    pub contribution_amount: Vec<String>,
    pub foundation_amount: Vec<String>,
    pub loan_due: Vec<String>,
    pub loan_principal: Vec<String>,
    pub history_interest: Vec<String>,
    pub contribution_name: Vec<String>,
    pub contribution_member_id: Vec<String>,
    pub member_id: Vec<String>,
    pub member_name: Vec<String>,
    pub history_time: Vec<String>,
    pub history_type: Vec<String>,
    pub history_member: Vec<String>,
    pub history_amount: Vec<String>,
    pub history_interest_pct: Vec<String>,
    pub history_total_due: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnCandidates {
    fn default() -> Self {
        Self {
            schema_version: constants::COLUMN_SCHEMA_VERSION,
            contribution_amount: owned(constants::CONTRIBUTION_AMOUNT_COLUMNS),
            foundation_amount: owned(constants::FOUNDATION_AMOUNT_COLUMNS),
            loan_due: owned(constants::LOAN_DUE_COLUMNS),
            loan_principal: owned(constants::LOAN_PRINCIPAL_COLUMNS),
            history_interest: owned(constants::HISTORY_INTEREST_COLUMNS),
            contribution_name: owned(constants::CONTRIBUTION_NAME_COLUMNS),
            contribution_member_id: owned(constants::CONTRIBUTION_MEMBER_ID_COLUMNS),
            member_id: owned(constants::MEMBER_ID_COLUMNS),
            member_name: owned(constants::MEMBER_NAME_COLUMNS),
            history_time: owned(constants::HISTORY_TIME_COLUMNS),
            history_type: owned(constants::HISTORY_TYPE_COLUMNS),
            history_member: owned(constants::HISTORY_MEMBER_COLUMNS),
            history_amount: owned(constants::HISTORY_AMOUNT_COLUMNS),
            history_interest_pct: owned(constants::HISTORY_INTEREST_PCT_COLUMNS),
            history_total_due: owned(constants::HISTORY_TOTAL_DUE_COLUMNS),
        }
    }
}

impl ColumnCandidates {
    /// Whether the lists were written for the column layout this build expects
    pub fn is_current_schema(&self) -> bool {
        self.schema_version == constants::COLUMN_SCHEMA_VERSION
    }
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Settings built once at startup and handed to the loader and renderer
#[derive(Debug, Clone)]
pub struct Config {
    /// Project URL without trailing slash
    pub supabase_url: String,
    pub anon_key: String,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub columns: ColumnCandidates,
}

impl Config {
    pub fn from_file(file_config: FileConfig) -> Result<Self, ConfigError> {
        let url = non_blank(file_config.supabase.url).ok_or(ConfigError::MissingCredentials)?;
        let anon_key = non_blank(file_config.supabase.anon_key).ok_or(ConfigError::MissingCredentials)?;

        if !file_config.columns.is_current_schema() {
            tracing::warn!(
                configured = file_config.columns.schema_version,
                expected = constants::COLUMN_SCHEMA_VERSION,
                "[columns] schema_version does not match; candidate lists may name outdated columns"
            );
        }

        Ok(Self {
            supabase_url: url.trim_end_matches('/').to_string(),
            anon_key,
            request_timeout: Duration::from_secs(file_config.supabase.timeout_secs),
            cache_ttl: Duration::from_secs(file_config.cache.ttl_secs),
            columns: file_config.columns,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Mask a key for safe logging, keeping only the first few characters
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{}****", prefix)
}
