// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cell stringification

use serde_json::Value;

/// Display text for a single cell
///
/// Strings are shown verbatim; everything else uses its compact JSON text,
/// so nested values are flattened rather than formatted.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
