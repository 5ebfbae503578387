use std::fmt;

use crate::data::correlation::CorrelationReport;
use crate::state::DashboardSnapshot;

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".to_string())
}

/// Plain-text rendering of a snapshot for terminal output.
pub fn render_text(snap: &DashboardSnapshot) -> String {
    TextReport(snap).to_string()
}

/// Displays a snapshot as the terminal report.
pub struct TextReport<'a>(pub &'a DashboardSnapshot);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(out, self.0)
    }
}

fn write_report(out: &mut fmt::Formatter<'_>, snap: &DashboardSnapshot) -> fmt::Result {
    writeln!(
        out,
        "Products: {}   Categories: {}",
        snap.overview.total_products, snap.overview.total_categories
    )?;
    writeln!(out)?;

    // ---- Overview ----
    writeln!(out, "== Selected data summary ==")?;
    writeln!(out, "Products (filtered): {}", snap.summary.row_count)?;
    for m in &snap.summary.means {
        writeln!(out, "Mean {}: {}", m.column, fmt_opt(m.mean))?;
    }
    if let Some(n) = snap.summary.distinct_categories {
        writeln!(out, "Selected categories: {n}")?;
    }
    writeln!(out)?;

    // ---- Category analysis ----
    writeln!(out, "== Top {} categories ==", snap.top_categories.len())?;
    for (rank, entry) in snap.top_categories.iter().enumerate() {
        writeln!(out, "{:>3}. {:<40} {}", rank + 1, entry.label, entry.count)?;
    }
    if let Some(most) = snap.summary.ranking.most_common() {
        writeln!(out, "Most products:  {} ({} products)", most.label, most.count)?;
    }
    if let Some(least) = snap.summary.ranking.least_common() {
        writeln!(out, "Least products: {} ({} products)", least.label, least.count)?;
    }
    writeln!(out)?;

    // ---- Correlation ----
    writeln!(out, "== Correlation ==")?;
    match &snap.correlation {
        CorrelationReport::NotApplicable { numeric_columns } => {
            writeln!(
                out,
                "Not enough numeric columns for correlation analysis ({} found).",
                numeric_columns.len()
            )?;
        }
        CorrelationReport::Matrix(m) => {
            let width = m.columns.iter().map(String::len).max().unwrap_or(0);
            write!(out, "{:width$}", "")?;
            for (j, _) in m.columns.iter().enumerate() {
                write!(out, " {:>7}", format!("[{j}]"))?;
            }
            writeln!(out)?;
            for (i, name) in m.columns.iter().enumerate() {
                write!(out, "{name:<width$}")?;
                for v in &m.values[i] {
                    write!(out, " {:>7}", fmt_opt(*v))?;
                }
                writeln!(out, "  [{i}]")?;
            }
        }
    }

    if let Some(scatter) = &snap.scatter {
        writeln!(
            out,
            "Scatter {} vs {}: {} points",
            scatter.selection.x,
            scatter.selection.y,
            scatter.points.len()
        )?;
    }
    writeln!(out)?;

    // ---- Preview ----
    writeln!(out, "== Preview (first {} rows) ==", snap.preview.len())?;
    writeln!(out, "{}", snap.columns.join(" | "))?;
    for row in &snap.preview {
        writeln!(out, "{}", row.join(" | "))?;
    }
    Ok(())
}
