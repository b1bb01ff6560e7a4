//! Page rendering for the terminal
//!
//! Every page is rendered to a `String` so the same text can be printed once,
//! re-printed in interactive mode, or inspected in tests.

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::config::ColumnCandidates;
use crate::constants;
use crate::dashboard::{build_dashboard, CategoryShare, Contributor, DashboardView};
use crate::loader::{DashboardData, LoadWarning};
use crate::metrics::Metrics;
use crate::table::{cell_text, Table};

/// Navigation choices, in menu order
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Page {
    Dashboard,
    Members,
    Contributions,
    FoundationPayments,
    Loans,
    Fines,
    Payouts,
    History,
    Sureties,
}

impl Page {
    pub const ALL: [Page; 9] = [
        Page::Dashboard,
        Page::Members,
        Page::Contributions,
        Page::FoundationPayments,
        Page::Loans,
        Page::Fines,
        Page::Payouts,
        Page::History,
        Page::Sureties,
    ];

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Members => "Members",
            Page::Contributions => "Contributions",
            Page::FoundationPayments => "Foundation Payments",
            Page::Loans => "Loans",
            Page::Fines => "Fines",
            Page::Payouts => "Payouts",
            Page::History => "History",
            Page::Sureties => "Sureties",
        }
    }

    /// Page heading
    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "📊 Dashboard",
            Page::Members => "👥 Members",
            Page::Contributions => "💰 Contributions",
            Page::FoundationPayments => "🏦 Foundation Payments",
            Page::Loans => "💳 Loans",
            Page::Fines => "⚠️ Fines",
            Page::Payouts => "💸 Payouts",
            Page::History => "🧾 History",
            Page::Sureties => "🛡️ Sureties",
        }
    }

    /// Parse a menu selection: its 1-based number or its label in any case,
    /// with spaces, dashes or underscores between words
    pub fn from_choice(input: &str) -> Option<Page> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| Page::ALL.get(i).copied());
        }

        let wanted = normalize(input);
        Page::ALL.into_iter().find(|page| normalize(page.label()) == wanted)
    }

    fn table(self, data: &DashboardData) -> Option<&Table> {
        match self {
            Page::Dashboard => None,
            Page::Members => Some(&data.members),
            Page::Contributions => Some(&data.contributions),
            Page::FoundationPayments => Some(&data.foundation_payments),
            Page::Loans => Some(&data.loans),
            Page::Fines => Some(&data.fines),
            Page::Payouts => Some(&data.payouts),
            Page::History => Some(&data.history),
            Page::Sureties => Some(&data.sureties),
        }
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

// =============================================================================
// Formatting
// =============================================================================

/// Whole-dollar amount with thousands separators, e.g. `$1,234`
pub fn money(value: f64) -> String {
    if !value.is_finite() {
        return "$0".to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < 0.0 {
        format!("$-{}", grouped)
    } else {
        format!("${}", grouped)
    }
}

fn push_line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

fn rule(out: &mut String) {
    push_line(out, "─".repeat(60));
}

/// Boxed text table with every column of `table`
pub fn render_table(table: &Table) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.columns().iter().map(String::as_str));
    for row in table.rows() {
        builder.push_record(
            table
                .columns()
                .iter()
                .map(|column| row.get(column).map(cell_text).unwrap_or_default()),
        );
    }

    let mut rendered = builder.build();
    rendered.with(Style::rounded());
    rendered.to_string()
}

fn bar(value: f64, max: f64) -> String {
    let len = if max > 0.0 && value > 0.0 {
        ((value / max) * constants::CHART_WIDTH as f64).round() as usize
    } else {
        0
    };
    "█".repeat(len.min(constants::CHART_WIDTH))
}

fn pad(label: &str, width: usize) -> String {
    let len = label.chars().count();
    format!("{}{}", label, " ".repeat(width.saturating_sub(len)))
}

/// Horizontal bar chart of the contributor ranking
pub fn render_bar_chart(contributors: &[Contributor]) -> String {
    let width = contributors.iter().map(|c| c.member.chars().count()).max().unwrap_or(0);
    let max = contributors.iter().map(|c| c.amount).fold(0.0, f64::max);

    let mut out = String::new();
    for contributor in contributors {
        push_line(
            &mut out,
            format!(
                "  {}  {} {}",
                pad(&contributor.member, width),
                bar(contributor.amount, max),
                money(contributor.amount)
            ),
        );
    }
    out
}

/// Proportion chart: one bar per category scaled to its share of the sum
pub fn render_proportions(shares: &[CategoryShare]) -> String {
    let width = shares.iter().map(|s| s.category.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for share in shares {
        push_line(
            &mut out,
            format!(
                "  {}  {} {:>5.1}%  {}",
                pad(share.category, width),
                pad(&bar(share.percent, 100.0), constants::CHART_WIDTH),
                share.percent,
                money(share.value)
            ),
        );
    }
    out
}

fn render_kpis(metrics: &Metrics) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Njangi Pot", "Foundation", "Outstanding Loans", "Members"]);
    builder.push_record([
        money(metrics.pot_total),
        money(metrics.foundation_total),
        money(metrics.outstanding_loans_due),
        metrics.members_count.to_string(),
    ]);

    let mut rendered = builder.build();
    rendered.with(Style::rounded());
    rendered.to_string()
}

// =============================================================================
// Page Sections
// =============================================================================

fn render_warnings(out: &mut String, warnings: &[LoadWarning]) {
    for warning in warnings {
        push_line(out, &warning.message);
        push_line(out, format!("   {}", warning.detail));
    }
    if !warnings.is_empty() {
        push_line(out, "");
    }
}

fn render_sidebar(out: &mut String, selected: Page, metrics: &Metrics) {
    push_line(out, "📌 Menu");
    for (i, page) in Page::ALL.iter().enumerate() {
        let marker = if *page == selected { "▶" } else { " " };
        push_line(out, format!(" {} {}. {}", marker, i + 1, page.label()));
    }
    push_line(out, format!("Total Interest: {}", money(metrics.total_interest)));
    push_line(out, constants::SIDEBAR_TIP);
    rule(out);
}

fn render_dashboard(out: &mut String, view: &DashboardView) {
    push_line(out, render_kpis(&view.metrics));
    push_line(out, "  Pot: sum of contributions · Foundation: sum of foundation payments");
    push_line(out, "  Outstanding Loans: sum of loans due/balance · Members: rotation list size");
    rule(out);

    push_line(out, "📈 Contributions (Top 10)");
    match &view.top_contributors {
        Some(top) => out.push_str(&render_bar_chart(top)),
        None => push_line(out, "No contributions found (or column name not recognized)."),
    }
    rule(out);

    push_line(out, "🥧 Pot vs Foundation vs Loans Due");
    out.push_str(&render_proportions(&view.category_split));
    rule(out);

    push_line(out, "🕒 Recent Activity");
    if view.recent_activity.rows.is_empty() {
        push_line(out, "No history/activity found.");
    } else {
        if view.recent_activity.sorted {
            push_line(out, "  newest first");
        }
        push_line(out, render_table(&view.recent_activity.rows));
    }
}

fn render_table_page(out: &mut String, table: &Table) {
    if table.is_empty() {
        push_line(out, "No data found.");
    } else {
        push_line(out, render_table(table));
    }
}

/// Render a full page: title, load warnings, menu, body and footer
pub fn render_page(page: Page, data: &DashboardData, columns: &ColumnCandidates) -> String {
    let view = build_dashboard(data, columns);
    let mut out = String::new();

    push_line(&mut out, constants::APP_TITLE);
    rule(&mut out);
    render_warnings(&mut out, &data.warnings);
    render_sidebar(&mut out, page, &view.metrics);

    push_line(&mut out, page.title());
    match page.table(data) {
        None => render_dashboard(&mut out, &view),
        Some(table) => {
            if page == Page::Loans && !table.is_empty() {
                push_line(
                    &mut out,
                    format!(
                        "Principal: {} · Outstanding: {}",
                        money(view.metrics.loan_principal_total),
                        money(view.metrics.outstanding_loans_due)
                    ),
                );
            }
            render_table_page(&mut out, table);
        }
    }

    rule(&mut out);
    push_line(&mut out, constants::FOOTER_CAPTION);
    out
}
