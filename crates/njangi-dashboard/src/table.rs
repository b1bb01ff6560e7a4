//! In-memory tables built from loosely-typed API rows, and column lookup
//!
//! Deployments name the same field differently (`amount` vs `amount_paid`),
//! so callers never index a column directly: they resolve it from an ordered
//! list of candidates with [`pick_column`].

use serde_json::{Map, Value};

/// One record as returned by the REST API
pub type Row = Map<String, Value>;

static NULL: Value = Value::Null;

/// Rows plus the ordered union of their keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table; columns are listed in the order they are first seen
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Values of one column, null where a row lacks the key
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().map(move |row| row.get(name).unwrap_or(&NULL))
    }

    /// Project onto the given columns, keeping their order
    pub fn select(&self, names: &[&str]) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                names
                    .iter()
                    .map(|name| (name.to_string(), row.get(*name).cloned().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect();

        Table {
            columns: names.iter().map(|s| s.to_string()).collect(),
            rows,
        }
    }

    /// Keep only the first `n` rows
    pub fn head(mut self, n: usize) -> Table {
        self.rows.truncate(n);
        self
    }

    /// Reorder rows by position (used after sorting a key column)
    pub fn reorder(mut self, order: &[usize]) -> Table {
        let mut taken: Vec<Option<Row>> = self.rows.into_iter().map(Some).collect();
        self.rows = order.iter().filter_map(|&i| taken.get_mut(i).and_then(Option::take)).collect();
        self
    }
}

/// Return the first candidate that is a column of `table`, in priority order.
///
/// `None` when nothing matches, including for a table with no columns.
pub fn pick_column<'a, S: AsRef<str>>(table: &Table, candidates: &'a [S]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|candidate| candidate.as_ref())
        .find(|name| table.has_column(name))
}

/// Text shown in a table cell
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalized text of a scalar used to match ids across tables.
///
/// `1`, `1.0` and `"1"` all map to `"1"`. Integers keep every digit, and text
/// that is not a canonical number (`"007"`, `"1e3"`) is matched verbatim.
/// Nulls and nested values never match.
pub fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(if let Some(i) = n.as_i64() {
            i.to_string()
        } else if let Some(u) = n.as_u64() {
            u.to_string()
        } else {
            n.as_f64().map(float_key).unwrap_or_else(|| n.to_string())
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            if is_canonical_integer(trimmed) {
                return Some(trimmed.to_string());
            }
            match trimmed.split_once('.') {
                Some((int, frac))
                    if is_canonical_integer(int) && !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit()) =>
                {
                    match trimmed.parse::<f64>() {
                        Ok(f) => Some(float_key(f)),
                        Err(_) => Some(trimmed.to_string()),
                    }
                }
                _ => Some(trimmed.to_string()),
            }
        }
    }
}

/// Whole floats within the exact integer range print without a fraction
fn float_key(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// `0`, `42`, `-42`; not `007`, `+1`, `-0` or the empty string
fn is_canonical_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let well_formed = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
    let no_leading_zero = (digits == "0" && digits.len() == text.len()) || !digits.starts_with('0');
    well_formed && no_leading_zero
}

#[cfg(test)]
pub(crate) fn rows(value: Value) -> Vec<Row> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
