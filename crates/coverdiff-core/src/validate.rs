//! Strict parsing of the service's raw answer into a [`ComparisonResult`].
//!
//! Anything that is not exactly the expected shape is rejected: invalid JSON,
//! missing or mistyped fields, unknown fields, a table count other than two,
//! or an empty category name. Values are taken as-is (no trimming).

use thiserror::Error;

use crate::{ComparisonResult, WarrantyTableSummary};

#[derive(Error, Debug)]
pub enum MalformedComparisonError {
    #[error("response is empty")]
    Empty,
    #[error("response does not match the comparison schema: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("expected exactly 2 table summaries, got {0}")]
    TableCount(usize),
    #[error("table {table} category {index} has an empty name")]
    EmptyCategoryName { table: usize, index: usize },
}

/// Parse and validate a raw service response.
pub fn parse_comparison(raw: &str) -> Result<ComparisonResult, MalformedComparisonError> {
    if raw.trim().is_empty() {
        return Err(MalformedComparisonError::Empty);
    }

    let tables: Vec<WarrantyTableSummary> = serde_json::from_str(raw)?;
    if tables.len() != 2 {
        return Err(MalformedComparisonError::TableCount(tables.len()));
    }

    for (table, summary) in tables.iter().enumerate() {
        if let Some(index) = summary.categories.iter().position(|c| c.name.is_empty()) {
            return Err(MalformedComparisonError::EmptyCategoryName { table, index });
        }
    }

    let mut tables = tables.into_iter();
    match (tables.next(), tables.next()) {
        (Some(left), Some(right)) => Ok(ComparisonResult::new(left, right)),
        _ => Err(MalformedComparisonError::TableCount(0)),
    }
}
