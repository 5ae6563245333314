// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Result rendering
//!
//! Turns a backend result into a view model without touching the network
//! or any shared state, then draws that view for the terminal.

pub mod text;
pub mod value;
pub mod view;

pub use text::{failure_text, to_text, TextView};
pub use value::display_value;
pub use view::{
    build_table, render, ConfidenceLevel, HeaderStrategy, RenderedResult, ResultBody,
    RoutingSummary, TableView,
};
