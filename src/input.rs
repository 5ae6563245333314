// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Input capture and sample questions

use crate::query::{DataSource, Query};

/// A ready-made question for one of the backend's sources
#[derive(Debug, Clone, Copy)]
pub struct SampleQuery {
    pub text: &'static str,
    pub category: SampleCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCategory {
    ElectricVehicles,
    StateTax,
}

impl SampleCategory {
    pub fn title(&self) -> &'static str {
        match self {
            Self::ElectricVehicles => "Electric Vehicle Data (BigQuery)",
            Self::StateTax => "State Tax Data (S3 Tables)",
        }
    }

    /// Source the backend is expected to route this category to
    pub fn source(&self) -> DataSource {
        match self {
            Self::ElectricVehicles => DataSource::GcpBigquery,
            Self::StateTax => DataSource::AwsS3Tables,
        }
    }
}

pub const SAMPLE_QUERIES: &[SampleQuery] = &[
    SampleQuery {
        text: "What Tesla models are available?",
        category: SampleCategory::ElectricVehicles,
    },
    SampleQuery {
        text: "Show me electric vehicles with range over 300 miles",
        category: SampleCategory::ElectricVehicles,
    },
    SampleQuery {
        text: "What's the average MSRP of electric vehicles?",
        category: SampleCategory::ElectricVehicles,
    },
    SampleQuery {
        text: "What is California's tax rate?",
        category: SampleCategory::StateTax,
    },
    SampleQuery {
        text: "Show me Texas tax information",
        category: SampleCategory::StateTax,
    },
    SampleQuery {
        text: "Compare Colorado tax rates",
        category: SampleCategory::StateTax,
    },
];

/// Sample question by 1-based index, as listed by `examples`
pub fn sample(index: usize) -> Option<&'static SampleQuery> {
    index.checked_sub(1).and_then(|i| SAMPLE_QUERIES.get(i))
}

/// Turn raw user text into a query, or `None` when there is nothing to submit
pub fn capture(raw: &str) -> Option<Query> {
    Query::new(raw).ok()
}
