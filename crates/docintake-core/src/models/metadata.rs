//! Structured metadata produced for completed documents.
//!
//! The shape of the extracted record depends on the classified document type,
//! so it is modelled as an internally tagged union keyed by `documentType`.
//! Every variant has a fixed field set; fields the extraction service could not
//! fill are `None` or empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::{truncate_chars, FALLBACK_PREVIEW_CHARS};

/// Notice stored as `shortSummary` when a document falls outside the taxonomy.
pub const UNSUPPORTED_SUMMARY: &str = "Document type not yet supported.";

/// Closed taxonomy of document types plus the fallback label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentLabel {
    #[serde(rename = "Question Paper")]
    QuestionPaper,
    #[serde(rename = "Research Paper")]
    ResearchPaper,
    #[serde(rename = "Invoice")]
    Invoice,
    #[serde(rename = "Information Document")]
    InformationDocument,
    #[serde(rename = "To be supported")]
    Unsupported,
}

impl DocumentLabel {
    /// Labels a classifier may assign, excluding the fallback.
    pub const SUPPORTED: [DocumentLabel; 4] = [
        DocumentLabel::QuestionPaper,
        DocumentLabel::ResearchPaper,
        DocumentLabel::Invoice,
        DocumentLabel::InformationDocument,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentLabel::QuestionPaper => "Question Paper",
            DocumentLabel::ResearchPaper => "Research Paper",
            DocumentLabel::Invoice => "Invoice",
            DocumentLabel::InformationDocument => "Information Document",
            DocumentLabel::Unsupported => "To be supported",
        }
    }

    pub fn is_fallback(self) -> bool {
        self == DocumentLabel::Unsupported
    }
}

impl Display for DocumentLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SUPPORTED
            .into_iter()
            .chain(std::iter::once(DocumentLabel::Unsupported))
            .find(|label| label.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown document label: {}", s))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionPaperMetadata {
    #[serde(deserialize_with = "loose_string")]
    pub exam_name: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub subject: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub grade_or_class: Option<String>,
    #[serde(deserialize_with = "loose_number")]
    pub total_marks: Option<f64>,
    #[serde(deserialize_with = "loose_string")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "loose_integer")]
    pub num_questions: Option<i64>,
    #[serde(deserialize_with = "loose_strings")]
    pub topics: Vec<String>,
    #[serde(deserialize_with = "loose_string")]
    pub instructions_summary: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub language: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub short_summary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearchPaperMetadata {
    #[serde(deserialize_with = "loose_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "loose_strings")]
    pub authors: Vec<String>,
    #[serde(deserialize_with = "loose_strings")]
    pub affiliations: Vec<String>,
    #[serde(deserialize_with = "loose_string")]
    pub publication_venue: Option<String>,
    #[serde(deserialize_with = "loose_integer")]
    pub year: Option<i64>,
    #[serde(rename = "abstract", deserialize_with = "loose_string")]
    pub abstract_text: Option<String>,
    #[serde(deserialize_with = "loose_strings")]
    pub keywords: Vec<String>,
    #[serde(deserialize_with = "loose_string")]
    pub domain: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub conclusion_summary: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub short_summary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceLineItem {
    #[serde(deserialize_with = "loose_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "loose_number")]
    pub quantity: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub unit_price: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub line_total: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceMetadata {
    #[serde(deserialize_with = "loose_string")]
    pub invoice_number: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub invoice_date: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub due_date: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub supplier_name: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub supplier_address: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub customer_name: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub customer_address: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "loose_number")]
    pub total_amount: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub tax_amount: Option<f64>,
    #[serde(deserialize_with = "loose_line_items")]
    pub line_items: Vec<InvoiceLineItem>,
    #[serde(deserialize_with = "loose_string")]
    pub short_summary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NamedEntities {
    #[serde(deserialize_with = "loose_strings")]
    pub people: Vec<String>,
    #[serde(deserialize_with = "loose_strings")]
    pub organizations: Vec<String>,
    #[serde(deserialize_with = "loose_strings")]
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InformationDocumentMetadata {
    #[serde(deserialize_with = "loose_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub author_or_source: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub category: Option<String>,
    #[serde(deserialize_with = "loose_strings")]
    pub main_topics: Vec<String>,
    #[serde(deserialize_with = "loose_string")]
    pub short_summary: Option<String>,
    #[serde(deserialize_with = "loose_strings")]
    pub key_points: Vec<String>,
    #[serde(deserialize_with = "loose_record")]
    pub named_entities: NamedEntities,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UnsupportedMetadata {
    #[serde(deserialize_with = "loose_text")]
    pub short_summary: String,
    #[serde(deserialize_with = "loose_text")]
    pub raw_text_preview: String,
}

/// Extraction output, tagged by `documentType`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "documentType")]
pub enum ExtractedMetadata {
    #[serde(rename = "Question Paper")]
    QuestionPaper(QuestionPaperMetadata),
    #[serde(rename = "Research Paper")]
    ResearchPaper(ResearchPaperMetadata),
    #[serde(rename = "Invoice")]
    Invoice(InvoiceMetadata),
    #[serde(rename = "Information Document")]
    InformationDocument(InformationDocumentMetadata),
    #[serde(rename = "To be supported")]
    Unsupported(UnsupportedMetadata),
}

impl ExtractedMetadata {
    pub fn label(&self) -> DocumentLabel {
        match self {
            ExtractedMetadata::QuestionPaper(_) => DocumentLabel::QuestionPaper,
            ExtractedMetadata::ResearchPaper(_) => DocumentLabel::ResearchPaper,
            ExtractedMetadata::Invoice(_) => DocumentLabel::Invoice,
            ExtractedMetadata::InformationDocument(_) => DocumentLabel::InformationDocument,
            ExtractedMetadata::Unsupported(_) => DocumentLabel::Unsupported,
        }
    }

    /// Minimal record for text that does not fit the taxonomy.
    pub fn fallback(text: &str) -> Self {
        ExtractedMetadata::Unsupported(UnsupportedMetadata {
            short_summary: UNSUPPORTED_SUMMARY.to_string(),
            raw_text_preview: truncate_chars(text, FALLBACK_PREVIEW_CHARS).to_string(),
        })
    }

    /// Record of the label's shape with every field unset.
    pub fn empty(label: DocumentLabel) -> Self {
        match label {
            DocumentLabel::QuestionPaper => ExtractedMetadata::QuestionPaper(Default::default()),
            DocumentLabel::ResearchPaper => ExtractedMetadata::ResearchPaper(Default::default()),
            DocumentLabel::Invoice => ExtractedMetadata::Invoice(Default::default()),
            DocumentLabel::InformationDocument => {
                ExtractedMetadata::InformationDocument(Default::default())
            }
            DocumentLabel::Unsupported => ExtractedMetadata::Unsupported(Default::default()),
        }
    }

    /// Interpret loosely structured service output as a record for `label`.
    ///
    /// Nulls are treated as absent, numbers may arrive as strings and a bare
    /// string stands in for a one-element list. A field of the wrong type is
    /// dropped on its own; the rest of the record is kept. Whatever
    /// `documentType` the value carries is ignored in favour of `label`. Only
    /// a value that is not an object yields [`ExtractedMetadata::empty`].
    pub fn from_loose_json(label: DocumentLabel, value: serde_json::Value) -> Self {
        let serde_json::Value::Object(mut map) = strip_nulls(value) else {
            return Self::empty(label);
        };
        map.remove("documentType");
        let value = serde_json::Value::Object(map);

        let parsed = match label {
            DocumentLabel::QuestionPaper => {
                serde_json::from_value(value).map(ExtractedMetadata::QuestionPaper)
            }
            DocumentLabel::ResearchPaper => {
                serde_json::from_value(value).map(ExtractedMetadata::ResearchPaper)
            }
            DocumentLabel::Invoice => serde_json::from_value(value).map(ExtractedMetadata::Invoice),
            DocumentLabel::InformationDocument => {
                serde_json::from_value(value).map(ExtractedMetadata::InformationDocument)
            }
            DocumentLabel::Unsupported => {
                serde_json::from_value(value).map(ExtractedMetadata::Unsupported)
            }
        };
        parsed.unwrap_or_else(|e| {
            tracing::warn!(label = %label, error = %e, "Extracted metadata did not match schema");
            Self::empty(label)
        })
    }
}

/// Column names and a few leading rows of a tabular document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableShape {
    pub columns: Vec<String>,
    pub sample_rows: Vec<Vec<String>>,
}

/// Metadata persisted on a completed document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub processed_at: DateTime<Utc>,
    pub document_type: DocumentLabel,
    pub extracted: ExtractedMetadata,
    pub text_preview: String,
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableShape>,
}

impl DocumentMetadata {
    /// `document_type` always mirrors the variant of `extracted`.
    pub fn new(
        extracted: ExtractedMetadata,
        text_preview: String,
        page_count: Option<u32>,
        table: Option<TableShape>,
    ) -> Self {
        Self {
            processed_at: Utc::now(),
            document_type: extracted.label(),
            extracted,
            text_preview,
            page_count,
            table,
        }
    }
}

fn strip_nulls(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(strip_nulls)
                .collect(),
        ),
        other => other,
    }
}

fn scalar_text(value: serde_json::Value) -> Option<String> {
    use serde_json::Value;
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_number_text(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    cleaned.parse().ok()
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_text))
}

fn loose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_string(deserializer)?.unwrap_or_default())
}

fn loose_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.into_iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    })
}

fn loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_number_text(&s),
        _ => None,
    })
}

fn loose_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = loose_number(deserializer)?;
    Ok(value.filter(|n| n.is_finite()).map(|n| n.round() as i64))
}

fn loose_line_items<'de, D>(deserializer: D) -> Result<Vec<InvoiceLineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;
    let line_item = |value: Value| match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        other => scalar_text(other).map(|description| InvoiceLineItem {
            description: Some(description),
            ..Default::default()
        }),
    };
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.into_iter().filter_map(line_item).collect(),
        Some(other) => line_item(other).into_iter().collect(),
        None => Vec::new(),
    })
}

fn loose_record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_parsing_is_exact() {
        assert_eq!(
            "Invoice".parse::<DocumentLabel>().unwrap(),
            DocumentLabel::Invoice
        );
        assert_eq!(
            "To be supported".parse::<DocumentLabel>().unwrap(),
            DocumentLabel::Unsupported
        );
        assert!("invoice".parse::<DocumentLabel>().is_err());
        assert!("Invoice.".parse::<DocumentLabel>().is_err());
    }

    #[test]
    fn test_fallback_shape() {
        let text = "x".repeat(800);
        let meta = ExtractedMetadata::fallback(&text);
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["documentType"], "To be supported");
        assert_eq!(value["shortSummary"], UNSUPPORTED_SUMMARY);
        assert_eq!(value["rawTextPreview"].as_str().unwrap().len(), 500);
    }

    #[test]
    fn test_from_loose_json_forces_label_and_accepts_strings_for_numbers() {
        let value = json!({
            "documentType": "Research Paper",
            "invoiceNumber": "INV-42",
            "totalAmount": "1,250.50",
            "taxAmount": null,
            "lineItems": [
                {"description": "Widget", "quantity": "2", "unitPrice": 10, "lineTotal": 20}
            ],
            "shortSummary": "An invoice for widgets."
        });
        let meta = ExtractedMetadata::from_loose_json(DocumentLabel::Invoice, value);
        let ExtractedMetadata::Invoice(invoice) = &meta else {
            panic!("expected invoice variant, got {:?}", meta);
        };
        assert_eq!(invoice.invoice_number.as_deref(), Some("INV-42"));
        assert_eq!(invoice.total_amount, Some(1250.50));
        assert_eq!(invoice.tax_amount, None);
        assert_eq!(invoice.line_items[0].quantity, Some(2.0));
        assert_eq!(meta.label(), DocumentLabel::Invoice);

        let serialized = serde_json::to_value(&meta).unwrap();
        assert_eq!(serialized["documentType"], "Invoice");
    }

    #[test]
    fn test_from_loose_json_non_object_is_empty_record() {
        let meta = ExtractedMetadata::from_loose_json(DocumentLabel::QuestionPaper, json!("nope"));
        assert_eq!(meta, ExtractedMetadata::empty(DocumentLabel::QuestionPaper));
    }

    #[test]
    fn test_bare_string_stands_in_for_a_list() {
        let meta = ExtractedMetadata::from_loose_json(
            DocumentLabel::ResearchPaper,
            json!({"authors": "Jane Doe", "title": "Paper", "year": "2021"}),
        );
        let ExtractedMetadata::ResearchPaper(paper) = meta else {
            panic!("expected research paper");
        };
        assert_eq!(paper.authors, vec!["Jane Doe".to_string()]);
        assert_eq!(paper.title.as_deref(), Some("Paper"));
        assert_eq!(paper.year, Some(2021));
    }

    #[test]
    fn test_bad_field_does_not_discard_good_ones() {
        let meta = ExtractedMetadata::from_loose_json(
            DocumentLabel::Invoice,
            json!({
                "invoiceNumber": "A-7",
                "totalAmount": 99.5,
                "supplierName": "Acme",
                "lineItems": "see attached",
                "taxAmount": {"rate": "20%"},
                "currency": ["EUR"]
            }),
        );
        let ExtractedMetadata::Invoice(invoice) = meta else {
            panic!("expected invoice");
        };
        assert_eq!(invoice.invoice_number.as_deref(), Some("A-7"));
        assert_eq!(invoice.total_amount, Some(99.5));
        assert_eq!(invoice.supplier_name.as_deref(), Some("Acme"));
        assert_eq!(invoice.line_items.len(), 1);
        assert_eq!(
            invoice.line_items[0].description.as_deref(),
            Some("see attached")
        );
        assert_eq!(invoice.tax_amount, None);
        assert_eq!(invoice.currency, None);
    }

    #[test]
    fn test_mixed_list_items_keep_usable_entries() {
        let meta = ExtractedMetadata::from_loose_json(
            DocumentLabel::QuestionPaper,
            json!({
                "examName": "Midterm",
                "topics": ["algebra", 7, {"name": "geometry"}],
                "numQuestions": true
            }),
        );
        let ExtractedMetadata::QuestionPaper(paper) = meta else {
            panic!("expected question paper");
        };
        assert_eq!(paper.exam_name.as_deref(), Some("Midterm"));
        assert_eq!(paper.topics, vec!["algebra".to_string(), "7".to_string()]);
        assert_eq!(paper.num_questions, None);
    }

    #[test]
    fn test_null_lists_become_empty() {
        let meta = ExtractedMetadata::from_loose_json(
            DocumentLabel::InformationDocument,
            json!({
                "title": "Field notes",
                "mainTopics": null,
                "namedEntities": {"people": ["Ada"], "organizations": null}
            }),
        );
        let ExtractedMetadata::InformationDocument(info) = meta else {
            panic!("expected information document");
        };
        assert!(info.main_topics.is_empty());
        assert_eq!(info.named_entities.people, vec!["Ada".to_string()]);
        assert!(info.named_entities.organizations.is_empty());
    }

    #[test]
    fn test_document_metadata_serializes_camel_case() {
        let meta = DocumentMetadata::new(
            ExtractedMetadata::empty(DocumentLabel::QuestionPaper),
            "Q1. Define entropy.".to_string(),
            Some(2),
            None,
        );
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["documentType"], "Question Paper");
        assert_eq!(value["extracted"]["documentType"], "Question Paper");
        assert_eq!(value["pageCount"], 2);
        assert!(value.get("table").is_none());
        assert!(value.get("processedAt").is_some());

        let back: DocumentMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(back, meta);
    }
}
