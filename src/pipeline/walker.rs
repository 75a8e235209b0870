// src/pipeline/walker.rs

//! Pagination walking for the attachment-bearing sections.
//!
//! Drives fetch, parse, classify and group per page until the feed runs dry:
//! a page that yields zero groups, or no advertised next page, ends the
//! walk. Fetch failures retry with linear backoff; exhaustion keeps whatever
//! was already gathered. Groups repeating across pages (pinned posts) are
//! collapsed by their natural id, first occurrence wins.

use std::collections::HashSet;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::{AttachmentGroup, Course, PortalConfig, Section};
use crate::services::{Classifier, group_attachments, parse_feed_page};
use crate::session::PageFetcher;

/// What a walk over one course section produced.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// De-duplicated groups in page order
    pub groups: Vec<AttachmentGroup>,

    pub pages_fetched: u32,

    pub retries: u32,

    pub duplicates_skipped: usize,

    /// Set when the walk stopped early; gathered groups are still valid
    pub failure: Option<AppError>,
}

/// Walk one course section page by page.
///
/// Only an authentication loss aborts; anything else degrades to a partial
/// outcome.
pub async fn walk_section(
    fetcher: &dyn PageFetcher,
    classifier: &Classifier,
    portal: &PortalConfig,
    course: &Course,
    section: Section,
) -> Result<WalkOutcome> {
    let mut outcome = WalkOutcome::default();
    let mut url = course.service_url(section.slug());
    let mut visited: HashSet<String> = HashSet::new();
    let mut seen_groups: HashSet<String> = HashSet::new();
    let mut page_no: u32 = 1;

    loop {
        if page_no > 1 && portal.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(portal.request_delay_ms)).await;
        }
        visited.insert(url.clone());

        let html = match fetch_with_retry(fetcher, &url, page_no, portal, &mut outcome).await? {
            Some(html) => html,
            None => break,
        };
        outcome.pages_fetched += 1;

        let page = match parse_feed_page(&html, &url) {
            Ok(page) => page,
            Err(e) => {
                log::warn!(
                    "Page {page_no} of {}/{} did not parse: {e}",
                    course.name,
                    section
                );
                outcome.failure = Some(e);
                break;
            }
        };

        let groups = group_attachments(&page.links, classifier, &course.name, section);
        if groups.is_empty() {
            log::debug!(
                "Page {page_no} of {}/{} yielded no groups, stopping",
                course.name,
                section
            );
            break;
        }

        for group in groups {
            if seen_groups.insert(group.natural_id.clone()) {
                outcome.groups.push(group);
            } else {
                outcome.duplicates_skipped += 1;
            }
        }

        match page.next_page {
            Some(next) if !visited.contains(&next) => url = next,
            Some(_) => {
                log::debug!("Pagination of {}/{} loops back, stopping", course.name, section);
                break;
            }
            None => break,
        }
        page_no += 1;
    }

    Ok(outcome)
}

/// Fetch one page, retrying transient failures up to the configured bound.
///
/// `Ok(None)` means exhaustion: the caller stops and keeps partial results.
async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    url: &str,
    page_no: u32,
    portal: &PortalConfig,
    outcome: &mut WalkOutcome,
) -> Result<Option<String>> {
    let limit = portal.page_retry_limit.max(1);
    let mut last_error: Option<AppError> = None;

    for attempt in 1..=limit {
        match fetcher.fetch_html(url).await {
            Ok(html) => return Ok(Some(html)),
            Err(err @ AppError::Authentication(_)) => return Err(err),
            Err(err) => {
                log::warn!("Fetch attempt {attempt}/{limit} for page {page_no} ({url}) failed: {err}");
                last_error = Some(err);
                if attempt < limit {
                    outcome.retries += 1;
                    let backoff = portal.retry_backoff_ms.saturating_mul(attempt as u64);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
            }
        }
    }

    let message = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let error = AppError::page_fetch(page_no, message);
    log::warn!("Giving up on {url}: {error}");
    outcome.failure = Some(error);
    Ok(None)
}
