use serde::{Deserialize, Serialize, Serializer};

pub mod align;
pub mod backend;
pub mod config_file;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod service;
pub mod validate;

// Re-export for convenience
pub use align::{AlignedCategoryPair, AlignedComparison, align};
pub use backend::{BackendError, PdfBackend};
pub use config_file::{Config, ConfigFile};
pub use error::{FailureKind, PipelineError, Side};
pub use pipeline::{DocumentPair, compare_documents};
pub use service::{OpenAiService, TextService, UpstreamError};
pub use validate::{MalformedComparisonError, parse_comparison};

/// A single coverage line item (e.g. a specific reimbursed care type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Warranty {
    pub name: String,
    /// Terse range/magnitude summary such as "20-40€".
    pub summary: String,
    pub special_rules: String,
}

/// A named group of warranties. `name` is the alignment key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarrantyCategory {
    pub name: String,
    pub warranties: Vec<Warranty>,
}

/// The digest of one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarrantyTableSummary {
    pub name: String,
    pub categories: Vec<WarrantyCategory>,
}

/// Exactly two table summaries, in input order.
///
/// `left` comes from the first document, `right` from the second. On the
/// wire this is a two-element JSON array. Untrusted JSON only becomes a
/// `ComparisonResult` through [`parse_comparison`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub left: WarrantyTableSummary,
    pub right: WarrantyTableSummary,
}

impl ComparisonResult {
    pub fn new(left: WarrantyTableSummary, right: WarrantyTableSummary) -> Self {
        Self { left, right }
    }

    /// Derive the aligned view. Recomputed on every call.
    pub fn align(&self) -> AlignedComparison<'_> {
        align::align(self)
    }
}

impl Serialize for ComparisonResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.left, &self.right).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_rules_uses_camel_case_on_the_wire() {
        let w = Warranty {
            name: "Soins".into(),
            summary: "100%".into(),
            special_rules: "Aucune".into(),
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["specialRules"], "Aucune");
        assert!(json.get("special_rules").is_none());
    }

    #[test]
    fn comparison_serializes_as_two_element_array() {
        let result = ComparisonResult::new(
            WarrantyTableSummary {
                name: "A".into(),
                categories: vec![],
            },
            WarrantyTableSummary {
                name: "B".into(),
                categories: vec![],
            },
        );
        let json = serde_json::to_value(&result).unwrap();
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["name"], "A");
        assert_eq!(arr[1]["name"], "B");
    }
}
