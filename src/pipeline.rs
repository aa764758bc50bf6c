//! The fetch → extract → prompt → summarize pipeline.
//!
//! Checks run in a fixed order: inputs are validated when the [`SummaryJob`]
//! is built, then the credential is checked, and only then is the article
//! downloaded. A missing key therefore never costs a network round trip.

use crate::agent::{ChatClient, Credential, SummarizeError};
use crate::config::Config;
use crate::extractor::{self, Article, ExtractionError};
use crate::fetcher::{self, ArticleSource, FetchError};
use crate::summary::{RequestError, SummaryRequest, SummaryResult, WordLimit};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}

/// Validated input for one summary run
#[derive(Debug, Clone)]
pub struct SummaryJob {
    pub source: ArticleSource,
    pub max_words: WordLimit,
    pub language: Option<String>,
    pub model: String,
    pub credential: Option<Credential>,
}

impl SummaryJob {
    /// A job with the configured model, language and key
    pub fn new(source: ArticleSource, max_words: WordLimit, config: &Config) -> Self {
        Self {
            source,
            max_words,
            language: config.summary.language.clone(),
            model: config.agent.model.clone(),
            credential: config.credential(),
        }
    }
}

/// Everything a front end shows after a successful run
#[derive(Debug, Clone)]
pub struct Outcome {
    pub article: Article,
    pub summary: SummaryResult,
}

/// Download and extract an article without summarizing it
pub async fn fetch_article(
    source: &ArticleSource,
    config: &Config,
) -> Result<Article, PipelineError> {
    let document = fetcher::fetch(source, &config.fetch).await?;
    let article = extractor::extract(&document)?;
    tracing::info!(
        url = %source,
        title = article.title.as_deref().unwrap_or(""),
        chars = article.text.len(),
        "article extracted"
    );
    Ok(article)
}

/// Run the whole pipeline once
pub async fn summarize(job: &SummaryJob, config: &Config) -> Result<Outcome, PipelineError> {
    let credential = job
        .credential
        .as_ref()
        .ok_or(SummarizeError::MissingCredential)?;
    let client = ChatClient::from_config(config)?;

    let article = fetch_article(&job.source, config).await?;

    let request = SummaryRequest::new(article.text.as_str(), job.max_words)?
        .language(job.language.clone())
        .model(job.model.as_str());
    let summary = client.summarize(&request, Some(credential)).await?;

    Ok(Outcome { article, summary })
}
