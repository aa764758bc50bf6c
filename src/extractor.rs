//! Readable-text extraction.
//!
//! Uses scraper for HTML parsing. The main content block is picked by a small
//! readability heuristic: text blocks are scored by length and punctuation,
//! their containers collect the score, and class names plus link density
//! push boilerplate down.

use crate::fetcher::RawDocument;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use thiserror::Error;

/// Blocks shorter than this are ignored when scoring
const MIN_BLOCK_CHARS: usize = 25;

/// Subtrees that never contribute article text
const SKIP_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript", "iframe", "svg", "button",
    "menu", "template", "select", "head",
];

/// Page wrappers that are never dropped because of their class or id
const STRUCTURAL_TAGS: &[&str] = &["html", "body", "form", "main"];

/// Siblings of the winner are kept when they reach this share of its score
const SIBLING_SHARE: f64 = 0.2;

/// Floor for the sibling threshold, so weak winners do not pull in everything
const MIN_SIBLING_SCORE: f64 = 5.0;

/// Elements that start a new paragraph in the extracted text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "article", "section", "main", "blockquote", "pre", "li", "ul", "ol", "dl", "dt",
    "dd", "table", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "figure", "figcaption",
    "br", "hr",
];

/// Inline elements whose text counts towards their container's own text
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "cite", "code", "em", "i", "mark", "q", "small", "span", "strong", "sub",
    "sup", "time", "u",
];

lazy_static! {
    static ref BLOCK_SELECTOR: Selector =
        Selector::parse("p, pre, td, blockquote, div, article, section, main").unwrap();
    static ref LINK_SELECTOR: Selector = Selector::parse("a").unwrap();
    static ref TITLE_SELECTOR: Selector = Selector::parse("title").unwrap();
    static ref H1_SELECTOR: Selector = Selector::parse("h1").unwrap();
    static ref BODY_SELECTOR: Selector = Selector::parse("body").unwrap();
    static ref FALLBACK_SELECTORS: Vec<Selector> =
        ["article", "main", "[role='main']", "#content", ".content"]
            .iter()
            .map(|s| Selector::parse(s).unwrap())
            .collect();
    static ref POSITIVE_NAMES: Regex =
        Regex::new(r"(?i)article|blog|body|content|entry|main|page|post|story|text").unwrap();
    static ref NEGATIVE_NAMES: Regex = Regex::new(
        r"(?i)\b(?:nav|menu|footer|sidebar|comment|share|social|related|promo|banner|sponsor|widget|breadcrumb|cookie|popup)|\bads?\b"
    )
    .unwrap();
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("no readable text found in the page")]
    NoContent,
}

/// Readable content of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: Option<String>,
    /// Plain text, paragraphs separated by a blank line
    pub text: String,
}

/// Extract the article from a downloaded document
pub fn extract(document: &RawDocument) -> Result<Article, ExtractionError> {
    extract_html(&document.html)
}

/// Extract the article from raw HTML
pub fn extract_html(html: &str) -> Result<Article, ExtractionError> {
    let document = Html::parse_document(html);
    let title = extract_title(&document);

    let content = main_content(&document)
        .or_else(|| fallback_container(&document).map(|element| vec![element]))
        .ok_or(ExtractionError::NoContent)?;

    let text = content
        .iter()
        .map(|element| plain_text(*element))
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    if text.is_empty() {
        return Err(ExtractionError::NoContent);
    }

    tracing::debug!(
        containers = content.len(),
        chars = text.len(),
        "extracted article text"
    );
    Ok(Article { title, text })
}

/// Extract the page title from <title> or <h1>
fn extract_title(document: &Html) -> Option<String> {
    [&*TITLE_SELECTOR, &*H1_SELECTOR].into_iter().find_map(|selector| {
        let element = document.select(selector).next()?;
        let title = collapse_whitespace(&element.text().collect::<String>());
        (!title.is_empty()).then_some(title)
    })
}

/// The best scoring container plus any siblings that look like more of the article
fn main_content(document: &Html) -> Option<Vec<ElementRef<'_>>> {
    // Each text block credits its container and the container's parent.
    let mut scores = HashMap::new();

    for block in document.select(&BLOCK_SELECTOR) {
        if is_excluded(block) {
            continue;
        }

        let tag = block.value().name();
        let is_container = matches!(tag, "div" | "article" | "section" | "main");
        let text = if is_container {
            own_text(block)
        } else {
            collapse_whitespace(&block.text().collect::<String>())
        };

        let length = text.chars().count();
        if length < MIN_BLOCK_CHARS {
            continue;
        }

        let commas = text.matches(',').count() as f64;
        let score = 1.0 + commas + (length / 100).min(3) as f64;

        let container = if is_container {
            Some(block)
        } else {
            parent_element(block)
        };
        let Some(container) = container else {
            continue;
        };
        *scores
            .entry(container.id())
            .or_insert_with(|| initial_score(container.value())) += score;

        if let Some(grandparent) = parent_element(container) {
            *scores
                .entry(grandparent.id())
                .or_insert_with(|| initial_score(grandparent.value())) += score / 2.0;
        }
    }

    // Document order, so the earliest of equal candidates wins on every run.
    let candidates: Vec<(ElementRef<'_>, f64)> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|element| {
            let score = scores.get(&element.id())?;
            Some((element, score * (1.0 - link_density(element))))
        })
        .collect();

    let (top, top_score) = candidates
        .iter()
        .copied()
        .fold(None, |best: Option<(ElementRef<'_>, f64)>, (element, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((element, score)),
        })?;
    tracing::trace!(tag = top.value().name(), score = top_score, "top candidate");

    Some(with_siblings(top, top_score, &candidates))
}

/// Keep siblings of the winner that score close to it, or are long prose paragraphs
fn with_siblings<'a>(
    top: ElementRef<'a>,
    top_score: f64,
    candidates: &[(ElementRef<'a>, f64)],
) -> Vec<ElementRef<'a>> {
    let Some(parent) = parent_element(top) else {
        return vec![top];
    };
    let threshold = (top_score * SIBLING_SHARE).max(MIN_SIBLING_SCORE);

    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|sibling| {
            if sibling.id() == top.id() {
                return true;
            }
            if is_skipped(sibling.value()) {
                return false;
            }
            match candidates.iter().find(|(el, _)| el.id() == sibling.id()) {
                Some((_, score)) => *score >= threshold,
                None => sibling.value().name() == "p" && is_dense_paragraph(*sibling),
            }
        })
        .collect()
}

/// A paragraph with plenty of text and few links
fn is_dense_paragraph(element: ElementRef<'_>) -> bool {
    let length = collapse_whitespace(&element.text().collect::<String>()).chars().count();
    length > 80 && link_density(element) < 0.25
}

/// First semantic container on the page, else `<body>`
fn fallback_container(document: &Html) -> Option<ElementRef<'_>> {
    FALLBACK_SELECTORS
        .iter()
        .chain(std::iter::once(&*BODY_SELECTOR))
        .find_map(|selector| document.select(selector).find(|el| !is_excluded(*el)))
}

fn initial_score(element: &Element) -> f64 {
    let tag_weight = match element.name() {
        "article" | "main" => 10.0,
        "div" | "section" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "body" | "html" => -5.0,
        _ => 0.0,
    };
    tag_weight + class_weight(element)
}

fn class_weight(element: &Element) -> f64 {
    let names = format!(
        "{} {}",
        element.attr("class").unwrap_or_default(),
        element.id().unwrap_or_default()
    );
    if names.trim().is_empty() {
        return 0.0;
    }

    let mut weight = 0.0;
    if POSITIVE_NAMES.is_match(&names) {
        weight += 25.0;
    }
    if NEGATIVE_NAMES.is_match(&names) {
        weight -= 25.0;
    }
    weight
}

/// Class or id marks this element as page furniture rather than content
fn is_unlikely(element: &Element) -> bool {
    !STRUCTURAL_TAGS.contains(&element.name()) && class_weight(element) < 0.0
}

fn is_skipped(element: &Element) -> bool {
    SKIP_TAGS.contains(&element.name()) || is_unlikely(element)
}

/// The element or one of its ancestors is boilerplate
fn is_excluded(element: ElementRef<'_>) -> bool {
    is_skipped(element.value())
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_skipped(ancestor.value()))
}

fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Text directly inside a container, ignoring nested blocks
fn own_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for child in element.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(el) if INLINE_TAGS.contains(&el.name()) => {
                if let Some(inline) = ElementRef::wrap(child) {
                    text.extend(inline.text());
                }
            }
            _ => {}
        }
    }
    collapse_whitespace(&text)
}

/// Share of the element's text that sits inside links
fn link_density(element: ElementRef<'_>) -> f64 {
    let total: usize = element.text().map(|t| t.trim().chars().count()).sum();
    if total == 0 {
        return 0.0;
    }
    let linked: usize = element
        .select(&LINK_SELECTOR)
        .flat_map(|link| link.text())
        .map(|t| t.trim().chars().count())
        .sum();
    (linked as f64 / total as f64).min(1.0)
}

/// Reduce an element to paragraphs of plain text
fn plain_text(element: ElementRef<'_>) -> String {
    let mut blocks = Vec::new();
    let mut current = String::new();
    collect_text(element, &mut blocks, &mut current);
    flush(&mut blocks, &mut current);
    blocks.join("\n\n")
}

fn collect_text(element: ElementRef<'_>, blocks: &mut Vec<String>, current: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => current.push_str(text),
            Node::Element(el) => {
                if is_skipped(el) {
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                if BLOCK_TAGS.contains(&el.name()) {
                    flush(blocks, current);
                    collect_text(child_element, blocks, current);
                    flush(blocks, current);
                } else {
                    collect_text(child_element, blocks, current);
                }
            }
            _ => {}
        }
    }
}

fn flush(blocks: &mut Vec<String>, current: &mut String) {
    let block = collapse_whitespace(current);
    if !block.is_empty() {
        blocks.push(block);
    }
    current.clear();
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEWS_PAGE: &str = r#"
        <html>
          <head><title>  Rust 2.0 announced </title><script>var x = 1;</script></head>
          <body>
            <header><a href="/">Home</a> <a href="/news">News</a></header>
            <nav class="menu"><ul><li><a href="/a">Archive</a></li><li><a href="/b">About us</a></li></ul></nav>
            <div id="main-content">
              <article class="post">
                <h1>Rust 2.0 announced</h1>
                <p>The language team announced a new edition today, with changes to the borrow checker, async traits, and tooling.</p>
                <p>Early adopters report that migration is smooth, although some macros need small adjustments.</p>
              </article>
            </div>
            <div class="sidebar"><p>Subscribe to our newsletter for more stories like this one.</p></div>
            <footer><p>Copyright 2026, all rights reserved by the publisher.</p></footer>
          </body>
        </html>"#;

    #[test]
    fn keeps_article_and_drops_navigation() {
        let article = extract_html(NEWS_PAGE).unwrap();

        assert!(article.text.contains("announced a new edition today"));
        assert!(article.text.contains("migration is smooth"));
        for boilerplate in ["Home", "Archive", "About us", "newsletter", "Copyright", "var x"] {
            assert!(
                !article.text.contains(boilerplate),
                "{boilerplate:?} leaked into {:?}",
                article.text
            );
        }
    }

    #[test]
    fn paragraphs_are_separated_and_whitespace_collapsed() {
        let html = "<article><p>First   paragraph\n with   odd spacing, long enough.</p>\
                    <p>Second paragraph, also long enough to score.</p></article>";
        let article = extract_html(html).unwrap();
        assert_eq!(
            article.text,
            "First paragraph with odd spacing, long enough.\n\nSecond paragraph, also long enough to score."
        );
    }

    #[test]
    fn bare_article_text_without_paragraphs() {
        let html = "<nav>Home</nav><article>Sentence one. Sentence two. Sentence three.</article>";
        let article = extract_html(html).unwrap();
        assert_eq!(article.text, "Sentence one. Sentence two. Sentence three.");
    }

    #[test]
    fn short_pages_fall_back_to_body_text() {
        let article = extract_html("<html><body><nav>Menu</nav><p>Short note.</p></body></html>").unwrap();
        assert_eq!(article.text, "Short note.");
    }

    #[test]
    fn empty_document_has_no_content() {
        for html in ["", "<html><body></body></html>", "<html><body><nav>Home</nav><script>x()</script></body></html>"] {
            assert!(matches!(extract_html(html), Err(ExtractionError::NoContent)));
        }
    }

    #[test]
    fn link_heavy_blocks_lose_to_prose() {
        let html = r#"<body>
            <div class="links">
              <p><a href="/1">A very long link text that goes on and on, and on</a></p>
              <p><a href="/2">Another very long link text, with a comma or two, here</a></p>
            </div>
            <div>
              <p>This paragraph is real prose written by a human, with commas, clauses, and ideas.</p>
            </div>
        </body>"#;
        let article = extract_html(html).unwrap();
        assert!(article.text.contains("real prose"));
        assert!(!article.text.contains("long link text"));
    }

    #[test]
    fn page_wrappers_with_boilerplate_names_are_kept() {
        let paragraphs = "<article>\
            <p>The first paragraph of the story, long enough to be scored as prose.</p>\
            <p>The second paragraph follows, with a comma or two, and more detail.</p>\
            </article>";
        let pages = [
            format!(r#"<html><body class="has-sidebar">{paragraphs}</body></html>"#),
            format!(r#"<html class="menu-closed"><body>{paragraphs}</body></html>"#),
            format!(r#"<html><body><form id="form1" action="/postback">{paragraphs}</form></body></html>"#),
            format!(r#"<html><body><main class="layout-with-sidebar">{paragraphs}</main></body></html>"#),
        ];
        for page in &pages {
            let article = extract_html(page).unwrap_or_else(|err| panic!("{err} for {page}"));
            assert!(article.text.contains("first paragraph of the story"), "{page}");
            assert!(article.text.contains("second paragraph follows"), "{page}");
        }
    }

    #[test]
    fn boilerplate_words_only_match_at_word_start() {
        let html = r#"<body><div id="canvas"><p>Drawing on the canvas element, with paths, fills, and strokes.</p></div></body>"#;
        let article = extract_html(html).unwrap();
        assert!(article.text.contains("Drawing on the canvas element"));

        let html = r#"<body>
            <div class="nav-links"><p>Previous story in this section, with a long title.</p></div>
            <div><p>The story itself, told at length, with commas and clauses.</p></div>
        </body>"#;
        let article = extract_html(html).unwrap();
        assert!(!article.text.contains("Previous story"));
    }

    #[test]
    fn equal_candidates_pick_the_same_content_every_time() {
        let html = "<body>\
            <div><p>Alpha paragraph, long enough to be scored.</p></div>\
            <div><p>Bravo paragraph, long enough to be scored.</p></div>\
            </body>";
        let first = extract_html(html).unwrap();
        for _ in 0..20 {
            assert_eq!(extract_html(html).unwrap(), first);
        }
        assert!(first.text.starts_with("Alpha paragraph"));
        assert!(first.text.contains("Bravo paragraph"));
    }

    #[test]
    fn article_split_across_sibling_containers_is_merged() {
        let html = r#"<body>
            <div class="story-part"><p>Part one of the story, with a comma, and then another, and more.</p></div>
            <aside><p>Advertisement text that should never be merged in, even if long.</p></aside>
            <div class="story-part"><p>Part two continues the story, with commas, clauses, and detail.</p></div>
            <p>A closing paragraph outside any container, long enough and free of links to count as prose.</p>
            <div class="links"><a href="/1">One link</a> <a href="/2">Two links, long enough to score</a></div>
        </body>"#;
        let article = extract_html(html).unwrap();

        assert!(article.text.contains("Part one of the story"));
        assert!(article.text.contains("Part two continues"));
        assert!(article.text.contains("closing paragraph"));
        assert!(!article.text.contains("Advertisement"));
        assert!(!article.text.contains("Two links"));
        assert!(article.text.find("Part one") < article.text.find("Part two"));
    }

    #[test]
    fn title_from_title_tag_then_h1() {
        assert_eq!(
            extract_html(NEWS_PAGE).unwrap().title.as_deref(),
            Some("Rust 2.0 announced")
        );
        let html = "<body><h1>Heading only</h1><p>Body text that is long enough to count.</p></body>";
        assert_eq!(extract_html(html).unwrap().title.as_deref(), Some("Heading only"));
        let html = "<body><p>Body text that is long enough to count.</p></body>";
        assert_eq!(extract_html(html).unwrap().title, None);
    }
}
