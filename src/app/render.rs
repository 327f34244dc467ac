// FlowTrace - app/render.rs
//
// The rendering collaborator: maps each content item variant to a plain-text
// representation, step by step. The terminal equivalent of the original
// flow-step cards.

use crate::core::model::{ContentPayload, Severity, Step};
use crate::core::summary::FlowSummary;
use std::io::{self, Write};

/// Render a step sequence as text.
///
/// Each step becomes a bordered block; items show their glyph, optional
/// timestamp, and classified fields. JSON payloads are pretty-printed and
/// indented under their key line.
pub fn render_steps<W: Write>(steps: &[Step], mut writer: W) -> io::Result<()> {
    if steps.is_empty() {
        writeln!(writer, "No recognised flow step entries.")?;
        return Ok(());
    }

    for (index, step) in steps.iter().enumerate() {
        match step.header {
            Some(ref header) => writeln!(writer, "┌─ {header}")?,
            None => writeln!(writer, "┌─")?,
        }

        for item in &step.content {
            let glyph = item.icon.glyph();
            let ts = item
                .timestamp
                .as_deref()
                .map(|t| format!("{t}  "))
                .unwrap_or_default();

            match &item.payload {
                ContentPayload::Message { severity, text } => {
                    if *severity == Severity::Plain {
                        writeln!(writer, "│  {glyph} {ts}{text}")?;
                    } else {
                        writeln!(writer, "│  {glyph} {ts}[{}] {text}", severity.short_label())?;
                    }
                }
                ContentPayload::KeyValue { key, value } => {
                    writeln!(writer, "│  {glyph} {ts}{key}: {value}")?;
                }
                ContentPayload::List { key, values } => {
                    writeln!(writer, "│  {glyph} {ts}{key}: {}", values.join(", "))?;
                }
                ContentPayload::Json { key, data } => {
                    writeln!(writer, "│  {glyph} {ts}{key}:")?;
                    let pretty = serde_json::to_string_pretty(data)
                        .unwrap_or_else(|_| data.to_string());
                    for line in pretty.lines() {
                        writeln!(writer, "│      {line}")?;
                    }
                }
            }
        }

        writeln!(writer, "└─")?;

        if index < steps.len() - 1 {
            writeln!(writer, "   ↓")?;
        }
    }

    Ok(())
}

/// Render the summary footer.
pub fn render_summary<W: Write>(summary: &FlowSummary, mut writer: W) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "{} step(s), {} item(s)",
        summary.step_count, summary.item_count
    )?;

    let counts: Vec<String> = Severity::all()
        .iter()
        .filter_map(|s| {
            let n = summary.severity_count(*s);
            (n > 0).then(|| format!("{}: {n}", s.label()))
        })
        .collect();
    if !counts.is_empty() {
        writeln!(writer, "Messages   {}", counts.join(", "))?;
    }

    if let (Some(earliest), Some(latest)) = (summary.earliest, summary.latest) {
        writeln!(
            writer,
            "Time span  {} .. {}",
            earliest.format("%Y-%m-%d %H:%M:%S"),
            latest.format("%Y-%m-%d %H:%M:%S")
        )?;
    }

    Ok(())
}
