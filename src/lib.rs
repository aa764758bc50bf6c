//! # Summarist
//!
//! Summarise a web article with an LLM, from the command line or a small web form.
//!
//! ## Pipeline
//!
//! - **Fetch**: one GET with a timeout and a user agent ([`fetcher`])
//! - **Extract**: readability scoring picks the article body ([`extractor`])
//! - **Prompt**: word limit, language and the text ([`prompt`])
//! - **Summarize**: one chat-completion call ([`agent`])
//!
//! [`pipeline::summarize`] runs the stages in order for a validated [`SummaryJob`].

pub mod agent;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod pipeline;
pub mod prompt;
pub mod summary;
pub mod web;

pub use agent::{ChatClient, Credential};
pub use config::Config;
pub use pipeline::{Outcome, PipelineError, SummaryJob};
pub use summary::{SummaryRequest, SummaryResult, WordLimit};
