//! Terminal rendering of one tick.

use colored::*;

use crate::core::telemetry::{Alert, AlertSeverity, DisplayRow, HistoryBuffer, Orchestrator, TickReport};

const LABEL_WIDTH: usize = 26;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Full dashboard frame: header, rows and any alerts raised this tick.
pub fn render_frame(report: &TickReport, orchestrator: &Orchestrator, speed: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}\n",
        "SENSORBOARD".bold().bright_cyan(),
        format!(
            "tick {} | {:.1} ms | {} refresh | Ctrl+C to quit",
            report.tick, report.elapsed_ms, speed
        )
        .as_str()
        .dimmed()
    ));
    out.push_str(&format!("{}\n", "=".repeat(72)));

    for row in &report.rows {
        let history = orchestrator.history(row.id);
        out.push_str(&render_row(row, &report.rows, history));
        out.push('\n');
    }

    for alert in &report.alerts {
        out.push_str(&render_alert(alert));
        out.push('\n');
    }
    out
}

pub fn render_row(row: &DisplayRow, all: &[DisplayRow], history: Option<&HistoryBuffer>) -> String {
    let label = match row.parent_group_id {
        Some(parent) => {
            let last_child = !all
                .iter()
                .any(|r| r.id > row.id && r.parent_group_id == Some(parent));
            format!("  {} {}", if last_child { "└─" } else { "├─" }, row.label)
        }
        None => row.label.clone(),
    };

    let value = if row.unit.is_empty() {
        row.formatted_value.clone()
    } else {
        format!("{} {}", row.formatted_value, row.unit)
    };
    let colored_value = value.as_str().truecolor(row.color.r, row.color.g, row.color.b);

    let spark = history
        .filter(|h| h.is_chartable())
        .map(sparkline)
        .unwrap_or_default();

    format!(
        "{:<width$} {:>14}  {}",
        label,
        colored_value,
        spark.as_str().dimmed(),
        width = LABEL_WIDTH
    )
}

fn render_alert(alert: &Alert) -> String {
    let tag = match alert.severity {
        AlertSeverity::Info => "INFO".green().bold(),
        AlertSeverity::Warning => "WARN".yellow().bold(),
        AlertSeverity::Critical => "CRIT".red().bold(),
    };
    format!("[{}] {}", tag, alert.message)
}

/// One block character per sample, scaled to the buffer's y-range.
pub fn sparkline(history: &HistoryBuffer) -> String {
    let (low, high) = history.y_range();
    let span = (high - low).max(f64::EPSILON);
    history
        .values()
        .iter()
        .map(|v| {
            let level = ((v - low) / span * (SPARK_LEVELS.len() - 1) as f64).round();
            SPARK_LEVELS[level.clamp(0.0, (SPARK_LEVELS.len() - 1) as f64) as usize]
        })
        .collect()
}
