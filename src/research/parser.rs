//! Parsing of tagged reasoning output.
//!
//! The analyst emits `<think>…</think><output>{json}</output>`; the
//! reporter emits `<think>…</think>` followed by the report body. This
//! module extracts and validates both shapes.

use serde::Deserialize;

use super::state::QueryItem;
use crate::error::ResearchError;

/// Marker closing the reasoning block in both agent responses.
pub const THINK_CLOSE: &str = "</think>";

const OUTPUT_OPEN: &str = "<output>";
const OUTPUT_CLOSE: &str = "</output>";

/// A single extracted learning.
#[derive(Debug, Clone, Deserialize)]
pub struct Learning {
    /// The standalone fact text.
    pub content: String,
}

/// Structured result of one analyst call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutput {
    /// Facts extracted from the search results.
    #[serde(default)]
    pub learnings: Vec<Learning>,
    /// Suggested next queries for the following depth.
    #[serde(default)]
    pub follow_up_queries: Vec<QueryItem>,
}

/// Parses the analyst's tagged response into its structured output.
///
/// Looks for the `<output>` block, strips an optional markdown code
/// fence inside it, and deserializes the JSON object.
///
/// # Errors
///
/// Returns [`ResearchError::ResponseParse`] if the block is absent or
/// its JSON is malformed.
pub fn parse_analysis(content: &str) -> Result<AnalysisOutput, ResearchError> {
    let open = content.rfind(OUTPUT_OPEN).ok_or_else(|| parse_error(
        "response has no <output> block",
        content,
    ))?;
    let after_open = &content[open + OUTPUT_OPEN.len()..];
    let close = after_open
        .find(OUTPUT_CLOSE)
        .ok_or_else(|| parse_error("response has an unterminated <output> block", content))?;

    let body = after_open[..close].trim();
    let json_str = strip_code_fence(body);

    serde_json::from_str::<AnalysisOutput>(json_str).map_err(|e| {
        let preview_len = json_str.len().min(200);
        let preview = &json_str[..preview_len];
        parse_error(
            &format!("invalid output JSON: {e}. Preview: {preview:?}"),
            content,
        )
    })
}

/// Extracts the report segment from the reporter's tagged response.
///
/// Returns the text after the LAST `</think>` marker.
///
/// # Errors
///
/// Returns [`ResearchError::Synthesis`] if the marker is absent, the
/// terminal failure of a session.
pub fn extract_report(content: &str) -> Result<String, ResearchError> {
    content.rfind(THINK_CLOSE).map_or_else(
        || {
            Err(ResearchError::Synthesis {
                message: "report response lacks the reasoning-complete marker".to_string(),
            })
        },
        |pos| Ok(content[pos + THINK_CLOSE.len()..].trim().to_string()),
    )
}

/// Strips a surrounding markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    if text.starts_with("```") {
        text.trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        text
    }
}

fn parse_error(message: &str, content: &str) -> ResearchError {
    ResearchError::ResponseParse {
        message: message.to_string(),
        content: content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    const VALID: &str = r#"<think>weighing the evidence</think>
<output>
{
  "learnings": [{"content": "tokio is the most used runtime"}],
  "followUpQueries": [{"query": "smol embedded support", "goal": "check fit"}]
}
</output>"#;

    #[test]
    fn test_parse_valid_analysis() {
        let output = parse_analysis(VALID).unwrap_or_else(|e| unreachable!("parse failed: {e}"));
        assert_eq!(output.learnings.len(), 1);
        assert_eq!(output.learnings[0].content, "tokio is the most used runtime");
        assert_eq!(output.follow_up_queries.len(), 1);
        assert_eq!(output.follow_up_queries[0].query, "smol embedded support");
    }

    #[test]
    fn test_parse_analysis_code_fence() {
        let content = "<output>```json\n{\"learnings\": [], \"followUpQueries\": []}\n```</output>";
        let output = parse_analysis(content).unwrap_or_else(|e| unreachable!("parse failed: {e}"));
        assert!(output.learnings.is_empty());
    }

    #[test]
    fn test_parse_analysis_missing_fields_default_empty() {
        let content = "<output>{}</output>";
        let output = parse_analysis(content).unwrap_or_else(|e| unreachable!("parse failed: {e}"));
        assert!(output.learnings.is_empty());
        assert!(output.follow_up_queries.is_empty());
    }

    #[test_case("no tags at all"; "missing block")]
    #[test_case("<output>{\"learnings\": }"; "unterminated block")]
    #[test_case("<output>not json</output>"; "invalid json")]
    fn test_parse_analysis_failures(content: &str) {
        let result = parse_analysis(content);
        assert!(matches!(
            result,
            Err(ResearchError::ResponseParse { .. })
        ));
    }

    #[test]
    fn test_parse_uses_last_output_block() {
        let content = concat!(
            "<think>an <output>{\"learnings\": []}</output> example in thought</think>",
            "<output>{\"learnings\": [{\"content\": \"real\"}]}</output>",
        );
        let output = parse_analysis(content).unwrap_or_else(|e| unreachable!("parse failed: {e}"));
        assert_eq!(output.learnings.len(), 1);
        assert_eq!(output.learnings[0].content, "real");
    }

    #[test]
    fn test_extract_report_after_last_marker() {
        let content = "<think>draft</think>ignored<think>more</think>\n# Report\nbody";
        let report =
            extract_report(content).unwrap_or_else(|e| unreachable!("extract failed: {e}"));
        assert_eq!(report, "# Report\nbody");
    }

    #[test]
    fn test_extract_report_missing_marker_is_synthesis_error() {
        let result = extract_report("just prose, no marker");
        assert!(matches!(result, Err(ResearchError::Synthesis { .. })));
    }

    proptest! {
        #[test]
        fn prop_parse_analysis_never_panics(content in ".{0,400}") {
            let _ = parse_analysis(&content);
        }

        #[test]
        fn prop_extract_report_never_panics(content in ".{0,400}") {
            let _ = extract_report(&content);
        }

        #[test]
        fn prop_extract_report_roundtrip(body in "[a-zA-Z0-9 ]{0,80}") {
            let content = format!("<think>reasoning</think>{body}");
            let report = extract_report(&content);
            prop_assert_eq!(report.ok(), Some(body.trim().to_string()));
        }
    }
}
