//! Markdown rendering for build report documents.
//!
//! Turns the aggregation engine's typed [`ReportElement`] sequence into a
//! literal Markdown document. Rendering is line-oriented and pure: the
//! renderer never reorders or filters elements — ordering and verbosity
//! gating are the engine's responsibility — and performs no I/O.
//!
//! # Escaping
//!
//! Event-sourced text (messages, names, table cells) passes through
//! [`escape`], which backslash-escapes the characters Markdown would
//! otherwise interpret: `` \ ` * _ [ ] < > | # ``. Anchor ids are generated
//! from a restricted alphabet and are emitted verbatim.

use chrono::{SecondsFormat, TimeDelta};

use bmd_core::element::{ReportElement, TocRow, Tone};
use bmd_core::session::ReportDocument;

/// Width of a duration bar in cells.
const BAR_WIDTH: usize = 10;

/// Shown in the table of contents when a project ran its default targets.
const DEFAULT_TARGETS_PLACEHOLDER: &str = "(default targets)";

/// Renders a complete document, table of contents first, elements separated
/// by blank lines.
#[must_use]
pub fn render_document(document: &ReportDocument) -> String {
    let mut out = String::new();
    for element in document.elements() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&render_element(element));
    }
    out.push('\n');
    out
}

/// Renders a single element, without a trailing newline.
#[must_use]
pub fn render_element(element: &ReportElement) -> String {
    match element {
        ReportElement::Heading { level, text } => {
            let level = usize::from((*level).clamp(1, 6));
            format!("{} {}", "#".repeat(level), escape(text))
        }
        ReportElement::Anchor { id } => format!("<a id=\"{id}\"></a>"),
        ReportElement::Status { text, tone } => render_status(text, *tone),
        ReportElement::Message {
            text,
            timestamp,
            emphasized,
        } => {
            let stamp = timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
            if *emphasized {
                format!("**{}** ({stamp})", escape(text))
            } else {
                format!("{} ({stamp})", escape(text))
            }
        }
        ReportElement::Paragraph { text } => escape(text),
        ReportElement::Table { headers, rows } => render_table(headers, rows),
        ReportElement::BarChart { entries } => render_bar_chart(entries),
        ReportElement::ProjectIndex { rows } => render_project_index(rows),
    }
}

fn render_status(text: &str, tone: Tone) -> String {
    match tone {
        Tone::Neutral => format!("`{text}`"),
        Tone::Success => format!("**\u{2713} {}**", escape(text)),
        Tone::Failure | Tone::Error => format!("**\u{2717} {}**", escape(text)),
        Tone::Warning => format!("**\u{26a0} {}**", escape(text)),
    }
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(pipe_row(headers.iter().map(|h| escape(h)).collect()));
    lines.push(pipe_row(headers.iter().map(|_| "---".to_string()).collect()));
    for row in rows {
        lines.push(pipe_row(row.iter().map(|cell| escape(cell)).collect()));
    }
    lines.join("\n")
}

fn pipe_row(cells: Vec<String>) -> String {
    format!("| {} |", cells.join(" | "))
}

fn render_bar_chart(entries: &[(String, TimeDelta)]) -> String {
    if entries.is_empty() {
        return "(none)".to_string();
    }

    let max_ms = entries
        .iter()
        .map(|(_, d)| d.num_milliseconds())
        .max()
        .unwrap_or(0);
    let label_width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let durations: Vec<String> = entries.iter().map(|(_, d)| format_duration(*d)).collect();
    let duration_width = durations.iter().map(String::len).max().unwrap_or(0);

    let mut lines = Vec::with_capacity(entries.len() + 2);
    lines.push("```text".to_string());
    for ((label, duration), rendered) in entries.iter().zip(&durations) {
        lines.push(format!(
            "{label:<label_width$}  {rendered:>duration_width$}  {}",
            duration_bar(duration.num_milliseconds(), max_ms)
        ));
    }
    lines.push("```".to_string());
    lines.join("\n")
}

fn render_project_index(rows: &[TocRow]) -> String {
    let headers = ["Project", "Status", "Duration", "Started", "Targets"];
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(pipe_row(headers.iter().map(ToString::to_string).collect()));
    lines.push(pipe_row(headers.iter().map(|_| "---".to_string()).collect()));
    for row in rows {
        let status = if row.succeeded {
            "\u{2713} succeeded"
        } else {
            "\u{2717} failed"
        };
        lines.push(pipe_row(vec![
            format!("[{}](#{})", escape(&row.name), row.anchor),
            status.to_string(),
            format_duration(row.cumulative),
            row.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            row.target_names
                .as_deref()
                .map_or_else(|| DEFAULT_TARGETS_PLACEHOLDER.to_string(), escape),
        ]));
    }
    lines.join("\n")
}

/// Backslash-escapes Markdown-significant characters.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '|' | '#'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Formats a duration at the precision build steps actually have.
///
/// `Xh Ym` above an hour, `Xm Ys` above a minute, fractional seconds down
/// to one decimal, raw milliseconds below a second. Negative input renders
/// as `0 ms`; the aggregation layer has already flagged it.
#[must_use]
pub fn format_duration(duration: TimeDelta) -> String {
    let ms = duration.num_milliseconds();
    if ms < 0 {
        return "0 ms".to_string();
    }
    let secs = ms / 1000;
    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if ms >= 1000 {
        let tenths = (ms % 1000) / 100;
        if tenths == 0 {
            format!("{secs}s")
        } else {
            format!("{secs}.{tenths}s")
        }
    } else {
        format!("{ms} ms")
    }
}

/// Generates a fixed-width bar scaled to the largest chart entry.
/// Values under 5% of the maximum get a single block for visibility.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "bar cell counts are tiny"
)]
fn duration_bar(value: i64, max: i64) -> String {
    if max <= 0 || value <= 0 {
        return "\u{2591}".repeat(BAR_WIDTH);
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 {
        1
    } else {
        ((ratio * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH)
    };

    let empty = BAR_WIDTH - filled;
    format!(
        "{}{}",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(empty)
    )
}
