// src/services/courses.rs

//! Course discovery from the authenticated home page.

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::Course;
use crate::services::parse_selector;
use crate::utils::url::resolve_url;

/// Parse the course list from the home page.
///
/// Malformed entries are skipped with a warning; an empty result is valid
/// (no enrolled courses this term).
pub fn parse_courses(html: &str, base_url: &Url) -> Result<Vec<Course>> {
    let document = Html::parse_document(html);

    let item_sel = parse_selector("#cursos li[id^=\"curso.\"]")?;
    let link_sel = parse_selector("a[href]")?;
    let name_sel = parse_selector("h1 span")?;
    let code_sel = parse_selector("h2")?;

    let mut courses = Vec::new();
    for item in document.select(&item_sel) {
        let id = item
            .value()
            .attr("id")
            .and_then(|id| id.strip_prefix("curso."))
            .unwrap_or("")
            .to_string();

        let Some(link) = item.select(&link_sel).next() else {
            log::warn!("Course entry '{id}' has no link, skipping");
            continue;
        };
        let href = link.value().attr("href").unwrap_or("");

        let name: String = item
            .select(&name_sel)
            .next()
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default()
            .trim()
            .to_string();

        let code: String = item
            .select(&code_sel)
            .next()
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default()
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();

        if id.is_empty() || name.is_empty() || href.is_empty() {
            log::warn!("Skipping malformed course entry (id='{id}', name='{name}')");
            continue;
        }

        courses.push(Course {
            id,
            code,
            name,
            url: resolve_url(base_url, href),
        });
    }

    Ok(courses)
}
