//! Prompt templates for classification and per-type metadata extraction.

use docintake_core::constants::{truncate_chars, EXTRACTION_PROMPT_CHARS};
use docintake_core::models::{DocumentLabel, UNSUPPORTED_SUMMARY};

pub fn classification_prompt(snippet: &str) -> String {
    let categories: Vec<String> = DocumentLabel::SUPPORTED
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{}. {}", i + 1, label))
        .collect();

    format!(
        r#"You are a strict document classifier.

You must choose EXACTLY ONE of these categories that best describes the document:

{categories}

If it does not clearly fit any of the above, return exactly:
{fallback}

Rules:
- Return ONLY the category string, nothing else.
- Do NOT explain your choice.

Document text (partial):
"""{snippet}""""#,
        categories = categories.join("\n"),
        fallback = DocumentLabel::Unsupported,
        snippet = snippet,
    )
}

/// Structured-extraction prompt with the target JSON schema for `label`.
pub fn metadata_prompt(label: DocumentLabel, text: &str, page_count: Option<u32>) -> String {
    let page_count = page_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "Document type: {label}\nPage count: {page_count}\n\n\
         You must return ONLY valid JSON, no explanation.\n\n\
         {instructions}\n\n{schema}\n\n{hint}\n\
         Text:\n\"\"\"{text}\"\"\"",
        label = label,
        page_count = page_count,
        instructions = instructions(label),
        schema = schema(label),
        hint = hint(label),
        text = truncate_chars(text, EXTRACTION_PROMPT_CHARS),
    )
}

fn instructions(label: DocumentLabel) -> &'static str {
    match label {
        DocumentLabel::QuestionPaper => "Extract the following fields as JSON for a question paper:",
        DocumentLabel::ResearchPaper => "Extract the following fields as JSON for a research paper:",
        DocumentLabel::Invoice => "Extract the following fields as JSON for an invoice:",
        DocumentLabel::InformationDocument => {
            "Extract the following fields as JSON for an informational document (article, note, report, etc.):"
        }
        DocumentLabel::Unsupported => "Return this JSON:",
    }
}

fn hint(label: DocumentLabel) -> &'static str {
    match label {
        DocumentLabel::Invoice => "Use null when unsure. Do not guess amounts wildly.",
        DocumentLabel::InformationDocument => "Use null or [] when unsure.",
        DocumentLabel::Unsupported => "",
        _ => "Use null when unsure.",
    }
}

fn schema(label: DocumentLabel) -> String {
    match label {
        DocumentLabel::QuestionPaper => r#"{
  "documentType": "Question Paper",
  "examName": "<string or null>",
  "subject": "<string or null>",
  "gradeOrClass": "<string or null>",
  "totalMarks": "<number or null>",
  "duration": "<string or null>",
  "numQuestions": "<number or null>",
  "topics": ["<string>", "..."],
  "instructionsSummary": "<short summary string>",
  "language": "<e.g. English, Hindi>",
  "shortSummary": "<2-3 sentence summary>"
}"#
        .to_string(),
        DocumentLabel::ResearchPaper => r#"{
  "documentType": "Research Paper",
  "title": "<string or null>",
  "authors": ["<string>", "..."],
  "affiliations": ["<string>", "..."],
  "publicationVenue": "<journal/conference or null>",
  "year": "<number or null>",
  "abstract": "<string or null>",
  "keywords": ["<string>", "..."],
  "domain": "<e.g. Physics, AI, Biology>",
  "conclusionSummary": "<short summary>",
  "shortSummary": "<2-3 sentence summary>"
}"#
        .to_string(),
        DocumentLabel::Invoice => r#"{
  "documentType": "Invoice",
  "invoiceNumber": "<string or null>",
  "invoiceDate": "<string or null>",
  "dueDate": "<string or null>",
  "supplierName": "<string or null>",
  "supplierAddress": "<string or null>",
  "customerName": "<string or null>",
  "customerAddress": "<string or null>",
  "currency": "<string or null>",
  "totalAmount": "<number or null>",
  "taxAmount": "<number or null>",
  "lineItems": [
    {
      "description": "<string or null>",
      "quantity": "<number or null>",
      "unitPrice": "<number or null>",
      "lineTotal": "<number or null>"
    }
  ],
  "shortSummary": "<1-2 sentence summary>"
}"#
        .to_string(),
        DocumentLabel::InformationDocument => r#"{
  "documentType": "Information Document",
  "title": "<string or null>",
  "authorOrSource": "<string or null>",
  "category": "<e.g. Article, Report, Policy, Manual>",
  "mainTopics": ["<string>", "..."],
  "shortSummary": "<3-4 sentence summary>",
  "keyPoints": ["<bullet point strings>", "..."],
  "namedEntities": {
    "people": ["<string>", "..."],
    "organizations": ["<string>", "..."],
    "locations": ["<string>", "..."]
  }
}"#
        .to_string(),
        DocumentLabel::Unsupported => format!(
            r#"{{
  "documentType": "{}",
  "shortSummary": "{}",
  "rawTextPreview": "<first 500 characters of text>"
}}"#,
            DocumentLabel::Unsupported,
            UNSUPPORTED_SUMMARY
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_prompt_lists_taxonomy() {
        let prompt = classification_prompt("Q1. Define entropy.");
        assert!(prompt.contains("1. Question Paper\n2. Research Paper\n3. Invoice\n4. Information Document"));
        assert!(prompt.contains("return exactly:\nTo be supported"));
        assert!(prompt.ends_with("\"\"\"Q1. Define entropy.\"\"\""));
    }

    #[test]
    fn test_metadata_prompt_schema_per_label() {
        let prompt = metadata_prompt(DocumentLabel::Invoice, "INV-1", Some(2));
        assert!(prompt.starts_with("Document type: Invoice\nPage count: 2\n"));
        assert!(prompt.contains("\"lineItems\""));
        assert!(!prompt.contains("\"examName\""));

        let prompt = metadata_prompt(DocumentLabel::ResearchPaper, "Abstract", None);
        assert!(prompt.contains("Page count: unknown"));
        assert!(prompt.contains("\"abstract\""));
    }

    #[test]
    fn test_metadata_prompt_caps_embedded_text() {
        let text = "z".repeat(EXTRACTION_PROMPT_CHARS * 2);
        let prompt = metadata_prompt(DocumentLabel::InformationDocument, &text, None);
        assert!(prompt.contains(&"z".repeat(EXTRACTION_PROMPT_CHARS)));
        assert!(!prompt.contains(&"z".repeat(EXTRACTION_PROMPT_CHARS + 1)));
    }
}
