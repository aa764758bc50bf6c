//! Summary request and result types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("max word count must be a positive integer, got {0}")]
    InvalidWordLimit(String),
    #[error("article text is empty")]
    EmptyText,
}

/// Upper bound on the summary length, in words. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct WordLimit(NonZeroU32);

impl WordLimit {
    pub const DEFAULT: WordLimit = match NonZeroU32::new(200) {
        Some(n) => WordLimit(n),
        None => unreachable!(),
    };

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for WordLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for WordLimit {
    type Error = RequestError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(WordLimit)
            .ok_or_else(|| RequestError::InvalidWordLimit(value.to_string()))
    }
}

impl FromStr for WordLimit {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<i64>()
            .map_err(|_| RequestError::InvalidWordLimit(trimmed.to_string()))
            .and_then(WordLimit::try_from)
    }
}

impl From<WordLimit> for u32 {
    fn from(limit: WordLimit) -> Self {
        limit.get()
    }
}

impl fmt::Display for WordLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the summarizer needs for one call
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub text: String,
    pub max_words: WordLimit,
    /// Output language; `None` keeps the article's own language
    pub language: Option<String>,
    pub model: String,
}

impl SummaryRequest {
    /// Build a request with the default model and the article's language
    pub fn new(text: impl Into<String>, max_words: WordLimit) -> Result<Self, RequestError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RequestError::EmptyText);
        }
        Ok(Self {
            text,
            max_words,
            language: None,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Like [`SummaryRequest::new`] but taking a raw count, as read from user input
    pub fn with_word_count(text: impl Into<String>, max_words: i64) -> Result<Self, RequestError> {
        Self::new(text, WordLimit::try_from(max_words)?)
    }

    pub fn language(mut self, language: Option<String>) -> Self {
        self.language = language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Text returned by the chat model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub text: String,
    /// Model reported by the API
    pub model: String,
}

impl SummaryResult {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

impl fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
