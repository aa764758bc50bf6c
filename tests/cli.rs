//! Line-mode tests: run the built binary against a local mock server.

use mockito::{Matcher, Server};
use serde_json::json;
use std::process::{Command, Output};

const ARTICLE: &str =
    "<nav>Home</nav><article>Sentence one. Sentence two. Sentence three.</article>";

/// Run `summarist` with a clean environment: no key, no config file.
fn summarist(args: &[&str], env: &[(&str, &str)]) -> Output {
    let home = tempfile::tempdir().unwrap();
    let mut command = Command::new(env!("CARGO_BIN_EXE_summarist"));
    command
        .args(args)
        .current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("RUST_LOG");
    for (name, value) in env {
        command.env(name, value);
    }
    command.output().unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn missing_key_fails_without_fetching() {
    let mut server = Server::new();
    let page = server.mock("GET", "/a").expect(0).create();

    let url = format!("{}/a", server.url());
    let output = summarist(&[url.as_str()], &[]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("API key is missing"));
    assert!(output.stdout.is_empty());
    page.assert();
}

#[test]
fn invalid_url_is_reported_before_missing_key() {
    let output = summarist(&["not-a-url"], &[]);

    assert_eq!(output.status.code(), Some(1));
    let message = stderr(&output);
    assert!(message.contains("invalid URL"), "{message}");
    assert!(!message.contains("API key"));
}

#[test]
fn zero_word_count_is_a_usage_error() {
    let output = summarist(&["https://example.com/a", "0"], &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn prints_summary_on_stdout() {
    let mut server = Server::new();
    let _page = server.mock("GET", "/a").with_body(ARTICLE).create();
    let api = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-cli")
        .match_body(Matcher::Regex("under roughly 50 words".to_string()))
        .with_body(json!({ "choices": [{ "message": { "content": "- One.\n- Two." } }] }).to_string())
        .create();

    let url = format!("{}/a", server.url());
    let base_url = server.url();
    let output = summarist(
        &[url.as_str(), "50"],
        &[("OPENAI_API_KEY", "sk-cli"), ("OPENAI_BASE_URL", base_url.as_str())],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "- One.\n- Two.\n");
    api.assert();
}

#[test]
fn word_count_defaults_to_200() {
    let mut server = Server::new();
    let _page = server.mock("GET", "/a").with_body(ARTICLE).create();
    let api = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("under roughly 200 words".to_string()))
        .with_body(json!({ "choices": [{ "message": { "content": "Done." } }] }).to_string())
        .create();

    let url = format!("{}/a", server.url());
    let base_url = server.url();
    let output = summarist(
        &[url.as_str()],
        &[("OPENAI_API_KEY", "sk-cli"), ("OPENAI_BASE_URL", base_url.as_str())],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    api.assert();
}

#[test]
fn raw_mode_prints_extracted_text_without_a_key() {
    let mut server = Server::new();
    let _page = server.mock("GET", "/a").with_body(ARTICLE).create();

    let url = format!("{}/a", server.url());
    let output = summarist(&[url.as_str(), "--raw"], &[]);

    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Sentence one. Sentence two. Sentence three."));
    assert!(!stdout.contains("Home"));
}
