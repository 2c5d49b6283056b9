use coverdiff_core::{AlignedCategoryPair, ComparisonResult};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// Aligned view returned by `/pdfData/aligned`.
#[derive(Serialize)]
pub struct AlignedResponse<'a> {
    pub tables: [&'a str; 2],
    pub categories: Vec<AlignedCategoryPair<'a>>,
}

impl<'a> From<&'a ComparisonResult> for AlignedResponse<'a> {
    fn from(result: &'a ComparisonResult) -> Self {
        AlignedResponse {
            tables: [&result.left.name, &result.right.name],
            categories: result.align().into_pairs(),
        }
    }
}
