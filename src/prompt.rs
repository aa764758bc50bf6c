//! Prompt construction for the summarizer.

use crate::summary::{SummaryRequest, WordLimit};

/// Build the user prompt for a summary.
///
/// Deterministic: the same text, limit and language always give the same string.
/// The article text is embedded verbatim after a blank line.
pub fn build_prompt(text: &str, max_words: WordLimit, language: Option<&str>) -> String {
    let language = match language {
        Some(language) => language.to_string(),
        None => "the same language as the article".to_string(),
    };
    format!(
        "Summarize this article in clear, concise bullet points in {language}, \
         keeping the summary under roughly {max_words} words.\n\n{text}"
    )
}

impl SummaryRequest {
    /// The prompt for this request
    pub fn prompt(&self) -> String {
        build_prompt(&self.text, self.max_words, self.language.as_deref())
    }
}
