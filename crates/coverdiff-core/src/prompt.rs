//! Instruction payload sent to the text-understanding service.
//!
//! The wording here is a contract: the validator in [`crate::validate`]
//! expects exactly the schema described in [`TARGET_SCHEMA`], and the aligner
//! relies on the "same name, same string" rule stated in the instructions.

/// The JSON shape the service must produce, described in its own terms.
pub const TARGET_SCHEMA: &str = r#"Warranty = {
    "name": string,
    "summary": string,
    "specialRules": string
}

WarrantyCategory = {
    "name": string,
    "warranties": Warranty[]
}

WarrantyTableSummary = {
    "name": string,
    "categories": WarrantyCategory[]
}

WarrantyTablesComparison = [WarrantyTableSummary, WarrantyTableSummary]"#;

const PREAMBLE: &str = "You must compare 2 warranty tables.
You are given 1 PDF text content for each.
You will output a JSON string and nothing else: no commentary, no markdown fences.

The JSON string, once parsed, must match exactly the type WarrantyTablesComparison below.
The first element summarizes PDF 1, the second element summarizes PDF 2.
Every field is required. Do not add any other field.";

const RULES: &str = "In both PDFs, you will identify the main categories of warranties. Eg: dental, optic, common medicine, hospitalization, etc.
When a category in PDF 1 is similar to a category in PDF 2, you will merge them into one category.
For example, a category containing mostly optics material, and another category containing ophthalmologist consultations can be considered the same \"optics\" category.
When a category in one PDF cannot be mapped to a category in the other PDF, then you will only register this category for the former.
Each category will include multiple specific warranties. For each, you will make a very short summary that represents their range.
For example, if optics reimbursements are 20€ on level 1, 30€ on level 2, 40€ on level 3, you might output something like \"20-40€\". If there is a lot of information, make a high level summary instead of listing everything.
For each category, you will make a high level, concise but exhaustive summary of special cases/rules, shared by its warranties. Eg: \"Fidelity bonuses greatly increase reimbursements after a year. Most of the warranties require presenting invoices.\".
Names must be short and never empty.
Names of 2 categories that match each other must be the exact same string, with the exact same case and formatting, in both table summaries.

You will output data in the same language as the warranty tables.";

/// Build the single instruction for one comparison.
///
/// `text_a` and `text_b` are embedded verbatim, in that order.
pub fn build_instruction(text_a: &str, text_b: &str) -> String {
    format!(
        "{PREAMBLE}\n\n{TARGET_SCHEMA}\n\n{RULES}\n\nPDF text 1:\n{text_a}\n\nPDF text 2:\n{text_b}"
    )
}
