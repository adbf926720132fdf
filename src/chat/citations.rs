//! Splits an AI response into its main text and trailing citations.
//!
//! Responses may end with a block like:
//!
//! ```text
//! The answer.
//! Citations:
//! Source one
//! Source two
//! ```

const CITATIONS_MARKER: &str = "\nCitations:\n";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedResponse {
    pub main_content: String,
    pub citations: Vec<String>,
}

/// Without the marker the response is returned untouched. With it, the
/// text before the first marker is trimmed and every non-blank line
/// after it becomes a citation as written.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let Some((main, rest)) = raw.split_once(CITATIONS_MARKER) else {
        return ParsedResponse {
            main_content: raw.to_string(),
            citations: Vec::new(),
        };
    };

    let citations = rest
        .trim()
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();

    ParsedResponse {
        main_content: main.trim().to_string(),
        citations,
    }
}
