// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Terminal drawing of rendered results

use console::{measure_text_width, pad_str, style, Alignment};
use std::fmt;

use super::view::{ConfidenceLevel, RenderedResult, ResultBody, RoutingSummary, TableView};

const NO_DATA: &str = "No data returned";

/// Terminal text for a rendered result
///
/// `styled` toggles ANSI colors; layout is identical either way.
pub struct TextView<'a> {
    pub view: &'a RenderedResult,
    pub styled: bool,
}

impl fmt::Display for TextView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled = self.styled;

        match self.view {
            RenderedResult::Error {
                source_label,
                message,
            } => {
                writeln!(f, "{}", style("Query Error").red().bold().force_styling(styled))?;
                writeln!(f, "{}", message)?;
                writeln!(f, "Attempted source: {}", source_label)
            }
            RenderedResult::Success { summary, body } => {
                write_summary(f, summary, styled)?;
                writeln!(f)?;
                writeln!(f, "{}", style("Query Results").green().bold().force_styling(styled))?;
                match body {
                    ResultBody::Tables(tables) => {
                        for (i, table) in tables.iter().enumerate() {
                            if i > 0 {
                                writeln!(f)?;
                            }
                            write_table(f, table, styled)?;
                        }
                        Ok(())
                    }
                    ResultBody::NoData => writeln!(f, "{}", NO_DATA),
                }
            }
        }
    }
}

/// Draw a rendered result as terminal text
pub fn to_text(view: &RenderedResult, styled: bool) -> String {
    TextView { view, styled }.to_string()
}

/// Draw a controller failure message
pub fn failure_text(message: &str, styled: bool) -> String {
    format!("{}\n", style(message).red().force_styling(styled))
}

fn write_summary(f: &mut impl fmt::Write, summary: &RoutingSummary, styled: bool) -> fmt::Result {
    let confidence = style(&summary.confidence).bold().force_styling(styled);
    let confidence = match summary.confidence_level {
        ConfidenceLevel::High => confidence.green(),
        ConfidenceLevel::Medium => confidence.yellow(),
        ConfidenceLevel::Low => confidence.red(),
    };

    let title = style("Query Routing").cyan().bold().force_styling(styled);
    writeln!(f, "{}", title)?;
    writeln!(f, "  Query: \"{}\"", summary.query)?;
    writeln!(f, "  Routed to: {}", summary.source_label)?;
    writeln!(f, "  Confidence: {}", confidence)?;
    if let Some(reason) = &summary.reason {
        writeln!(
            f,
            "  Reason: {}",
            style(reason).italic().dim().force_styling(styled)
        )?;
    }
    Ok(())
}

fn write_table(f: &mut impl fmt::Write, table: &TableView, styled: bool) -> fmt::Result {
    if let Some(title) = &table.title {
        writeln!(f, "{}", style(title).bold().force_styling(styled))?;
    }

    let mut widths: Vec<usize> = table.header.iter().map(|h| measure_text_width(h)).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            let width = measure_text_width(cell);
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(width),
                None => widths.push(width),
            }
        }
    }

    let header = format_row(&table.header, &widths);
    writeln!(f, "{}", style(header).bold().force_styling(styled))?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(f, "{}", rule.join("-+-"))?;
    for row in &table.rows {
        writeln!(f, "{}", format_row(row, &widths))?;
    }
    Ok(())
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad_str(cell, *width, Alignment::Left, None).into_owned())
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}
