// src/pipeline/sections.rs

//! Per-section orchestration across the selected courses.
//!
//! One failing course degrades its section to a partial result; only a lost
//! session aborts the run. A section that errored and produced nothing at
//! all counts as failed outright, which the binary turns into a non-zero
//! exit.

use crate::calendar::{EventBuilder, Feed};
use crate::error::{AppError, Result};
use crate::models::{Config, Course, Section};
use crate::pipeline::{materialize_groups, walk_section};
use crate::services::{Classifier, parse_controls, parse_tareas};
use crate::session::{FileTransfer, PageFetcher};
use crate::storage::FileStore;

/// Summary of one attachment section across all selected courses.
#[derive(Debug)]
pub struct SectionReport {
    pub section: Section,
    pub courses: usize,
    pub groups: usize,
    pub pages_fetched: u32,
    pub files_written: usize,
    pub files_skipped: usize,
    pub failures: usize,
    pub duplicates_skipped: usize,
    pub partial: bool,
}

impl SectionReport {
    fn new(section: Section) -> Self {
        Self {
            section,
            courses: 0,
            groups: 0,
            pages_fetched: 0,
            files_written: 0,
            files_skipped: 0,
            failures: 0,
            duplicates_skipped: 0,
            partial: false,
        }
    }

    /// Errored and produced nothing.
    pub fn failed_outright(&self) -> bool {
        self.partial && self.groups == 0
    }

    pub fn log_summary(&self) {
        log::info!(
            "{}: {} courses, {} groups over {} pages, {} files written, {} skipped, {} failures{}",
            self.section.label(),
            self.courses,
            self.groups,
            self.pages_fetched,
            self.files_written,
            self.files_skipped,
            self.failures,
            if self.partial { " (partial)" } else { "" }
        );
    }
}

/// Summary of one event-producing section.
#[derive(Debug)]
pub struct EventsReport {
    pub label: &'static str,
    pub courses: usize,
    pub records: usize,
    pub events: usize,
    pub partial: bool,
}

impl EventsReport {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            courses: 0,
            records: 0,
            events: 0,
            partial: false,
        }
    }

    pub fn failed_outright(&self) -> bool {
        self.partial && self.events == 0
    }

    pub fn log_summary(&self) {
        log::info!(
            "{}: {} courses, {} records, {} events{}",
            self.label,
            self.courses,
            self.records,
            self.events,
            if self.partial { " (partial)" } else { "" }
        );
    }
}

/// Walk and materialize one attachment section for every course.
pub async fn run_attachment_section(
    fetcher: &dyn PageFetcher,
    transfer: &dyn FileTransfer,
    classifier: &Classifier,
    config: &Config,
    store: &FileStore,
    courses: &[Course],
    section: Section,
) -> Result<SectionReport> {
    let mut report = SectionReport::new(section);

    for course in courses {
        let outcome = walk_section(fetcher, classifier, &config.portal, course, section).await?;
        log::info!(
            "{} / {}: {} groups over {} pages",
            course.name,
            section.label(),
            outcome.groups.len(),
            outcome.pages_fetched
        );
        report.courses += 1;
        report.groups += outcome.groups.len();
        report.pages_fetched += outcome.pages_fetched;
        report.duplicates_skipped += outcome.duplicates_skipped;
        if outcome.failure.is_some() {
            report.partial = true;
            report.failures += 1;
        }

        let materialized = materialize_groups(transfer, store, &outcome.groups).await;
        report.files_written += materialized.files_written;
        report.files_skipped += materialized.files_skipped;
        if !materialized.failures.is_empty() {
            report.failures += materialized.failures.len();
            report.partial = true;
        }
    }

    report.log_summary();
    Ok(report)
}

/// Scrape every course's calendario page and feed the control events.
pub async fn collect_control_events(
    fetcher: &dyn PageFetcher,
    config: &Config,
    courses: &[Course],
    feed: &mut Feed,
) -> Result<EventsReport> {
    let builder = EventBuilder::new(config)?;
    let mut report = EventsReport::new("controles");

    for course in courses {
        let url = course.service_url("calendario");
        let records = match fetch_and_parse(fetcher, &url, parse_controls).await? {
            Some(records) => records,
            None => {
                report.partial = true;
                continue;
            }
        };
        log::info!("{}: {} controls", course.name, records.len());
        report.courses += 1;
        report.records += records.len();
        for record in &records {
            feed.insert(builder.control_event(course, record));
            report.events += 1;
        }
    }

    report.log_summary();
    Ok(report)
}

/// Scrape every course's tareas page and feed the deadline events.
pub async fn collect_tarea_events(
    fetcher: &dyn PageFetcher,
    config: &Config,
    courses: &[Course],
    feed: &mut Feed,
) -> Result<EventsReport> {
    let builder = EventBuilder::new(config)?;
    let mut report = EventsReport::new("tareas");

    for course in courses {
        let url = course.service_url("tareas");
        let records = match fetch_and_parse(fetcher, &url, parse_tareas).await? {
            Some(records) => records,
            None => {
                report.partial = true;
                continue;
            }
        };
        log::info!("{}: {} tareas", course.name, records.len());
        report.courses += 1;
        report.records += records.len();
        for record in &records {
            let events = builder.tarea_events(course, record);
            report.events += events.len();
            feed.extend(events);
        }
    }

    report.log_summary();
    Ok(report)
}

/// Fetch one page and run a parser over it. `Ok(None)` marks a recoverable
/// per-course failure; only authentication loss propagates.
async fn fetch_and_parse<T>(
    fetcher: &dyn PageFetcher,
    url: &str,
    parse: fn(&str, &str) -> Result<Vec<T>>,
) -> Result<Option<Vec<T>>> {
    let html = match fetcher.fetch_html(url).await {
        Ok(html) => html,
        Err(err @ AppError::Authentication(_)) => return Err(err),
        Err(e) => {
            log::warn!("Skipping {url}: {e}");
            return Ok(None);
        }
    };
    match parse(&html, url) {
        Ok(records) => Ok(Some(records)),
        Err(e) => {
            log::warn!("Could not parse {url}: {e}");
            Ok(None)
        }
    }
}
