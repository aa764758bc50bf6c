//! Interactive web form.
//!
//! A single page served by axum: the form posts to `/summarize`, which runs
//! the pipeline for that request only and renders the result (or an inline
//! error) back into the same page. Nothing is kept between requests.

use crate::agent::Credential;
use crate::config::Config;
use crate::fetcher::ArticleSource;
use crate::pipeline::{self, Outcome, SummaryJob};
use crate::summary::WordLimit;
use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

/// Languages offered in the form; the empty value keeps the article's language
const LANGUAGES: &[(&str, &str)] = &[
    ("", "Same as article"),
    ("English", "English"),
    ("Hindi", "Hindi"),
    ("Spanish", "Spanish"),
    ("French", "French"),
    ("German", "German"),
];

/// Read-only state shared by all requests
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
}

/// Raw form fields, exactly as posted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub url: String,
    pub max_words: String,
    pub language: String,
    pub model: String,
    pub api_key: String,
}

/// A field that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FormInput {
    /// Form pre-filled with configured defaults
    fn with_defaults(config: &Config) -> Self {
        Self {
            max_words: config.summary.max_words.to_string(),
            language: config.summary.language.clone().unwrap_or_default(),
            model: config.agent.model.clone(),
            ..Self::default()
        }
    }

    /// Turn the posted fields into a job, collecting every field error.
    ///
    /// The API key is not checked here; the pipeline rejects a missing key
    /// after the other inputs are known to be valid.
    pub fn validate(&self, config: &Config) -> Result<SummaryJob, Vec<FieldError>> {
        let mut errors = Vec::new();

        let source = if self.url.trim().is_empty() {
            errors.push(FieldError {
                field: "url",
                message: "Please paste a valid article URL.".to_string(),
            });
            None
        } else {
            ArticleSource::parse(&self.url)
                .map_err(|e| {
                    errors.push(FieldError {
                        field: "url",
                        message: e.to_string(),
                    })
                })
                .ok()
        };

        let max_words = if self.max_words.trim().is_empty() {
            WordLimit::try_from(i64::from(config.summary.max_words)).ok()
        } else {
            self.max_words
                .parse::<WordLimit>()
                .map_err(|e| {
                    errors.push(FieldError {
                        field: "max_words",
                        message: e.to_string(),
                    })
                })
                .ok()
        };

        match (source, max_words) {
            (Some(source), Some(max_words)) if errors.is_empty() => {
                let mut job = SummaryJob::new(source, max_words, config);
                job.language = Some(self.language.trim().to_string()).filter(|l| !l.is_empty());
                if !self.model.trim().is_empty() {
                    job.model = self.model.trim().to_string();
                }
                job.credential = Credential::new(&self.api_key);
                Ok(job)
            }
            _ => {
                if errors.is_empty() {
                    errors.push(FieldError {
                        field: "max_words",
                        message: "max word count must be a positive integer".to_string(),
                    });
                }
                Err(errors)
            }
        }
    }
}

/// What one render of the page shows
#[derive(Debug, Default)]
struct PageView {
    input: FormInput,
    errors: Vec<FieldError>,
    failure: Option<String>,
    outcome: Option<Outcome>,
}

/// Build the router for the form
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form))
        .route("/summarize", post(submit_form))
        .with_state(Arc::new(state))
}

/// Serve the form until the process is stopped
pub async fn serve(config: Config, bind: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "web form listening");
    axum::serve(listener, router(AppState { config })).await
}

async fn show_form(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_page(&PageView {
        input: FormInput::with_defaults(&state.config),
        ..PageView::default()
    }))
}

async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(input): Form<FormInput>,
) -> Html<String> {
    let mut view = PageView {
        input,
        ..PageView::default()
    };

    match view.input.validate(&state.config) {
        Err(errors) => view.errors = errors,
        Ok(job) => match pipeline::summarize(&job, &state.config).await {
            Ok(outcome) => view.outcome = Some(outcome),
            Err(e) => {
                tracing::warn!(url = %job.source, error = %e, "summary failed");
                view.failure = Some(e.to_string());
            }
        },
    }

    Html(render_page(&view))
}

/// Render the page. The API key field is always left blank so the secret
/// never travels back in a response.
fn render_page(view: &PageView) -> String {
    let input = &view.input;
    let field_error = |field: &str| -> String {
        view.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| format!(r#"<p class="field-error">{}</p>"#, escape_html(&e.message)))
            .collect()
    };

    let mut languages = String::new();
    for (value, label) in LANGUAGES {
        let selected = if input.language == *value { " selected" } else { "" };
        let _ = write!(
            languages,
            r#"<option value="{}"{selected}>{}</option>"#,
            escape_html(value),
            escape_html(label)
        );
    }

    let mut page = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Web Article Summarizer</title>
<style>
body {{ font-family: sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; }}
label {{ display: block; margin-top: 0.8rem; font-weight: bold; }}
input, select {{ width: 100%; padding: 0.4rem; }}
.field-error, .error {{ color: #b00020; }}
.summary {{ white-space: pre-wrap; background: #f5f5f5; padding: 1rem; }}
textarea {{ width: 100%; height: 18rem; }}
</style>
</head>
<body>
<h1>Web Article Summarizer</h1>
<p>Paste a URL to any public article, enter your OpenAI API key, and get a concise summary.</p>
<form method="post" action="/summarize">
<label for="url">Article URL</label>
<input id="url" name="url" type="url" placeholder="https://example.com/some-article" value="{url}">
{url_error}
<label for="max_words">Max summary length (words)</label>
<input id="max_words" name="max_words" type="number" min="50" max="500" step="25" value="{max_words}">
{max_words_error}
<label for="language">Summary language</label>
<select id="language" name="language">{languages}</select>
<label for="model">OpenAI model</label>
<input id="model" name="model" type="text" value="{model}">
<label for="api_key">OpenAI API key</label>
<input id="api_key" name="api_key" type="password" autocomplete="off">
<p><button type="submit">Summarize</button></p>
</form>
"#,
        url = escape_html(&input.url),
        url_error = field_error("url"),
        max_words = escape_html(&input.max_words),
        max_words_error = field_error("max_words"),
        model = escape_html(&input.model),
    );

    if let Some(failure) = &view.failure {
        let _ = write!(page, r#"<p class="error">Error: {}</p>"#, escape_html(failure));
    }

    if let Some(outcome) = &view.outcome {
        page.push_str("<h2>Summary</h2>\n");
        if let Some(title) = &outcome.article.title {
            let _ = writeln!(page, "<h3>{}</h3>", escape_html(title));
        }
        let _ = write!(
            page,
            "<div class=\"summary\">{}</div>\n\
             <details><summary>Show extracted article text</summary>\
             <textarea readonly>{}</textarea></details>\n",
            escape_html(&outcome.summary.text),
            escape_html(&outcome.article.text)
        );
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
