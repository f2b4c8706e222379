use std::collections::HashSet;

use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;

const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";
const LEGAL_FORM_PATTERN: &str = r#"(ООО|ИП|АО|ЗАО|ПАО)\s+["«]?([^"»\n]+)["»]?"#;

/// Contact and company details scraped out of a page. Every field is
/// best-effort: extraction failures degrade to empty/absent values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteMetadata {
    pub language: Option<String>,
    pub emails: Vec<String>,
    pub company_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl SiteMetadata {
    pub fn from_html(html_content: &str) -> Self {
        let document = Html::parse_document(html_content);

        SiteMetadata {
            language: extract_language(&document),
            emails: extract_emails(&document),
            company_name: extract_company_name(&document),
            title: extract_title(&document),
            description: extract_description(&document),
        }
    }
}

fn extract_language(document: &Html) -> Option<String> {
    let html_selector = Selector::parse("html").unwrap();

    document
        .select(&html_selector)
        .next()
        .and_then(|tag| tag.value().attr("lang"))
        .map(|lang| lang.split(['-', '_']).next().unwrap_or(lang).to_lowercase())
        .filter(|lang| !lang.is_empty())
}

fn extract_emails(document: &Html) -> Vec<String> {
    let email_regex = Regex::new(EMAIL_PATTERN).unwrap();
    let a_tag_selector = Selector::parse("a").unwrap();

    let mut seen = HashSet::new();
    let mut emails = vec![];

    let text: String = document.root_element().text().collect::<Vec<_>>().join(" ");
    for found in email_regex.find_iter(&text) {
        if seen.insert(found.as_str().to_string()) {
            emails.push(found.as_str().to_string());
        }
    }

    for a_tag in document.select(&a_tag_selector) {
        if let Some(email) = a_tag
            .value()
            .attr("href")
            .and_then(|href| href.strip_prefix("mailto:"))
        {
            let email = email.split('?').next().unwrap_or(email).trim();
            if email.contains('@') && seen.insert(email.to_string()) {
                emails.push(email.to_string());
            }
        }
    }

    emails
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").unwrap();

    document
        .select(&title_selector)
        .next()
        .map(|tag| tag.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn extract_description(document: &Html) -> Option<String> {
    let meta_selector = Selector::parse(r#"meta[name="description"]"#).unwrap();

    document
        .select(&meta_selector)
        .next()
        .and_then(|tag| tag.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

/*
 Company name heuristics, first hit wins:
 1. og:site_name meta tag
 2. meta author tag
 3. <title> content before a "|" separator
 4. Russian legal-form pattern (ООО/ИП/АО/ЗАО/ПАО) in the footer
*/
fn extract_company_name(document: &Html) -> Option<String> {
    let og_selector = Selector::parse(r#"meta[property="og:site_name"]"#).unwrap();
    let author_selector = Selector::parse(r#"meta[name="author"]"#).unwrap();
    let footer_selector = Selector::parse("footer").unwrap();

    let from_meta = document
        .select(&og_selector)
        .next()
        .and_then(|tag| tag.value().attr("content"))
        .or_else(|| {
            document
                .select(&author_selector)
                .next()
                .and_then(|tag| tag.value().attr("content"))
        })
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty());

    if from_meta.is_some() {
        return from_meta;
    }

    let from_title = extract_title(document)
        .map(|title| title.split('|').next().unwrap_or(&title).trim().to_string())
        .filter(|title| !title.is_empty());

    if from_title.is_some() {
        return from_title;
    }

    let legal_form_regex = Regex::new(LEGAL_FORM_PATTERN).unwrap();
    document.select(&footer_selector).next().and_then(|footer| {
        let footer_text: String = footer.text().collect::<Vec<_>>().join(" ");
        legal_form_regex
            .find(&footer_text)
            .map(|m| m.as_str().trim().to_string())
    })
}
