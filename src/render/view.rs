// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Result view model
//!
//! [`render`] is a pure mapping from a backend result to what should be shown.
//! Column sets are discovered per table from the rows themselves.

use serde::Serialize;
use std::str::FromStr;

use super::value::display_value;
use crate::query::{DataSource, QueryResult, ResultData, Row};

/// Confidence at or above this is shown as high
pub const HIGH_CONFIDENCE: f64 = 0.8;
/// Confidence at or above this (and below high) is shown as medium
pub const MEDIUM_CONFIDENCE: f64 = 0.6;

const TAX_TABLE_TITLE: &str = "Tax Data (S3 Tables)";
const EV_TABLE_TITLE: &str = "EV Data (BigQuery)";

/// How a table's header is derived from its rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderStrategy {
    /// Header is the first row's keys; every row's values are taken in order.
    /// Rows must share the first row's keys and key order.
    #[default]
    FirstRow,
    /// Header is the ordered union of keys across all rows; cells are looked
    /// up by key and missing cells are left empty.
    UnionOfKeys,
}

impl FromStr for HeaderStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first-row" | "first_row" => Ok(Self::FirstRow),
            "union" | "union-of-keys" | "union_of_keys" => Ok(Self::UnionOfKeys),
            other => Err(format!("unknown header strategy: {}", other)),
        }
    }
}

/// Indicator band for routing confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(confidence: f64) -> Self {
        if confidence >= HIGH_CONFIDENCE {
            Self::High
        } else if confidence >= MEDIUM_CONFIDENCE {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Routing details shown above successful results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingSummary {
    /// Echoed query, or `N/A` when the backend did not echo it
    pub query: String,
    pub source_label: String,
    /// Confidence as a percentage with one decimal place, e.g. `92.0%`
    pub confidence: String,
    pub confidence_level: ConfidenceLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One rendered table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Body below the routing summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "tables", rename_all = "snake_case")]
pub enum ResultBody {
    Tables(Vec<TableView>),
    NoData,
}

/// Presentation of a backend result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedResult {
    /// Backend reported an error for the attempted source
    Error { source_label: String, message: String },
    Success {
        summary: RoutingSummary,
        body: ResultBody,
    },
}

impl RenderedResult {
    /// All tables in display order
    pub fn tables(&self) -> &[TableView] {
        match self {
            Self::Success {
                body: ResultBody::Tables(tables),
                ..
            } => tables,
            _ => &[],
        }
    }
}

/// Map a backend result to its presentation
pub fn render(result: &QueryResult, strategy: HeaderStrategy) -> RenderedResult {
    let source_label = result.source.label().to_string();

    if result.is_error() {
        let message = result
            .error
            .clone()
            .or_else(|| result.reason.clone())
            .unwrap_or_else(|| "Unknown error".to_string());
        return RenderedResult::Error {
            source_label,
            message,
        };
    }

    let summary = RoutingSummary {
        query: result.query.clone().unwrap_or_else(|| "N/A".to_string()),
        source_label,
        confidence: format!("{:.1}%", result.confidence * 100.0),
        confidence_level: ConfidenceLevel::from_score(result.confidence),
        reason: result.reason.clone(),
    };

    RenderedResult::Success {
        summary,
        body: render_body(result, strategy),
    }
}

fn render_body(result: &QueryResult, strategy: HeaderStrategy) -> ResultBody {
    match (&result.source, &result.data) {
        (DataSource::MultiSource, Some(ResultData::Split(split))) => {
            let tables = [
                (TAX_TABLE_TITLE, &split.tax_data),
                (EV_TABLE_TITLE, &split.ev_data),
            ]
            .into_iter()
            .filter_map(|(title, rows)| build_table(Some(title), rows, strategy))
            .collect();
            ResultBody::Tables(tables)
        }
        (DataSource::MultiSource, _) => ResultBody::NoData,
        (_, Some(ResultData::Rows(rows))) => match build_table(None, rows, strategy) {
            Some(table) => ResultBody::Tables(vec![table]),
            None => ResultBody::NoData,
        },
        _ => ResultBody::NoData,
    }
}

/// Build a table, or `None` for an empty row set
pub fn build_table(
    title: Option<&str>,
    rows: &[Row],
    strategy: HeaderStrategy,
) -> Option<TableView> {
    let first = rows.first()?;

    let (header, rows) = match strategy {
        HeaderStrategy::FirstRow => {
            let header: Vec<String> = first.keys().cloned().collect();
            let rows: Vec<Vec<String>> = rows
                .iter()
                .map(|row| row.values().map(display_value).collect())
                .collect();
            (header, rows)
        }
        HeaderStrategy::UnionOfKeys => {
            let mut header: Vec<String> = Vec::new();
            for key in rows.iter().flat_map(|row| row.keys()) {
                if !header.contains(key) {
                    header.push(key.clone());
                }
            }
            let rows: Vec<Vec<String>> = rows
                .iter()
                .map(|row| {
                    header
                        .iter()
                        .map(|key| row.get(key).map(display_value).unwrap_or_default())
                        .collect()
                })
                .collect();
            (header, rows)
        }
    };

    Some(TableView {
        title: title.map(str::to_string),
        header,
        rows,
    })
}
