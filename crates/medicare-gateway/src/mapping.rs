//! Raw response to domain value, with placeholders for anything missing.
//!
//! A field counts as missing when it is absent, null, blank, or an empty
//! list. Each field is filled independently.

use medicare_core::types::{AnalysisResult, Message, ResearchResult, ResearchSource};

use crate::service::{AnalyzeResponse, ChatResponse, ResearchItem, ResearchResponse};

pub const APOLOGY: &str = "I apologize, but I couldn't process your request. Please try again.";

pub const NO_TEXT_EXTRACTED: &str = "No text extracted";
pub const ANALYSIS_COMPLETED: &str = "Analysis completed";
pub const PROCESSING_COMPLETE: &str = "Processing complete";
pub const REVIEW_RESULTS: &str = "Review results carefully";
pub const CONSULT_PROFESSIONAL: &str = "Consult with a healthcare professional";

pub const RESEARCH_SUMMARY: &str =
    "Research results for your query. Please consult official medical sources.";
pub const NO_URL: &str = "#";

fn text_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn list_or(value: Option<Vec<String>>, fallback: &str) -> Vec<String> {
    value
        .filter(|items| !items.is_empty())
        .unwrap_or_else(|| vec![fallback.to_string()])
}

/// Assistant reply for a chat response.
pub fn assistant_message(raw: ChatResponse) -> Message {
    Message::assistant(text_or(raw.response, APOLOGY))
}

pub fn analysis_result(raw: AnalyzeResponse) -> AnalysisResult {
    AnalysisResult {
        extracted_text: text_or(raw.extracted_text, NO_TEXT_EXTRACTED),
        summary: text_or(raw.summary, ANALYSIS_COMPLETED),
        key_findings: list_or(raw.key_findings, PROCESSING_COMPLETE),
        recommendations: list_or(raw.recommendations, REVIEW_RESULTS),
        next_steps: list_or(raw.next_steps, CONSULT_PROFESSIONAL),
    }
}

/// Results for `query`. An empty or missing list becomes a single
/// placeholder entry titled with the query.
pub fn research_results(raw: ResearchResponse, query: &str) -> Vec<ResearchResult> {
    match raw.results {
        Some(items) if !items.is_empty() => items
            .into_iter()
            .map(|item| research_result(item, query))
            .collect(),
        _ => vec![research_result(ResearchItem::default(), query)],
    }
}

fn research_result(item: ResearchItem, query: &str) -> ResearchResult {
    let source = item
        .source
        .as_deref()
        .and_then(ResearchSource::from_label)
        .unwrap_or_default();
    ResearchResult {
        title: text_or(item.title, query),
        source,
        summary: text_or(item.summary, RESEARCH_SUMMARY),
        url: text_or(item.url, NO_URL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medicare_core::types::Role;

    #[test]
    fn test_chat_response_mapped() {
        let message = assistant_message(ChatResponse {
            response: Some("Fever, chills and sweating.".to_string()),
        });
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "Fever, chills and sweating.");
    }

    #[test]
    fn test_chat_missing_or_empty_response_apologizes() {
        assert_eq!(assistant_message(ChatResponse::default()).content, APOLOGY);
        let empty = ChatResponse {
            response: Some("   ".to_string()),
        };
        assert_eq!(assistant_message(empty).content, APOLOGY);
    }

    #[test]
    fn test_analysis_missing_summary_gets_placeholder() {
        let result = analysis_result(AnalyzeResponse {
            extracted_text: Some("Glucose 180 mg/dL".to_string()),
            key_findings: Some(vec!["Hyperglycemia".to_string()]),
            ..AnalyzeResponse::default()
        });
        assert_eq!(result.extracted_text, "Glucose 180 mg/dL");
        assert_eq!(result.summary, "Analysis completed");
        assert_eq!(result.key_findings, vec!["Hyperglycemia"]);
        assert_eq!(result.recommendations, vec!["Review results carefully"]);
        assert_eq!(
            result.next_steps,
            vec!["Consult with a healthcare professional"]
        );
    }

    #[test]
    fn test_analysis_empty_response_all_placeholders() {
        let result = analysis_result(AnalyzeResponse {
            key_findings: Some(Vec::new()),
            ..AnalyzeResponse::default()
        });
        assert_eq!(result.extracted_text, "No text extracted");
        assert_eq!(result.key_findings, vec!["Processing complete"]);
    }

    #[test]
    fn test_research_fallback_entry() {
        let results = research_results(ResearchResponse::default(), "Malaria prevention");
        assert_eq!(
            results,
            vec![ResearchResult {
                title: "Malaria prevention".to_string(),
                source: ResearchSource::PubMed,
                summary: RESEARCH_SUMMARY.to_string(),
                url: "#".to_string(),
            }]
        );

        let empty = ResearchResponse {
            results: Some(Vec::new()),
        };
        assert_eq!(research_results(empty, "q").len(), 1);
    }

    #[test]
    fn test_research_items_filled_per_field() {
        let raw = ResearchResponse {
            results: Some(vec![
                ResearchItem {
                    title: Some("WHO malaria guidelines".to_string()),
                    source: Some("WHO".to_string()),
                    summary: Some("Vector control and chemoprevention.".to_string()),
                    url: Some("https://www.who.int/malaria".to_string()),
                },
                ResearchItem {
                    source: Some("NIH".to_string()),
                    ..ResearchItem::default()
                },
            ]),
        };
        let results = research_results(raw, "malaria");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, ResearchSource::Who);
        assert_eq!(results[0].url, "https://www.who.int/malaria");
        assert_eq!(results[1].title, "malaria");
        assert_eq!(results[1].source, ResearchSource::PubMed);
        assert_eq!(results[1].summary, RESEARCH_SUMMARY);
        assert_eq!(results[1].url, "#");
    }
}
