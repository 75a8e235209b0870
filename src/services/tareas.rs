// src/services/tareas.rs

//! Assignment row parsing from a course's tareas page.
//!
//! Same sortable-table idiom as the calendario: the name cell carries an
//! `h1 a` link to the assignment, the deadline cells carry epochs in their
//! `rel` attributes (`td.plazo` for the deadline, `td.atraso` for the
//! optional late window), and the estado/entrega cells carry the lifecycle
//! and submission texts.

use chrono::{DateTime, TimeZone, Utc};
use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{LifecycleState, SubmissionState, TareaRecord};
use crate::services::parse_selector;
use crate::utils::url::{extract_file_id, resolve_url};

/// Parse the assignment records from a tareas page.
pub fn parse_tareas(html: &str, page_url: &str) -> Result<Vec<TareaRecord>> {
    let base = Url::parse(page_url)?;
    let document = Html::parse_document(html);

    let row_sel = parse_selector("table.sortable tr")?;
    let title_sel = parse_selector("td.string h1 a")?;
    let plazo_sel = parse_selector("td.plazo")?;
    let atraso_sel = parse_selector("td.atraso")?;
    let estado_sel = parse_selector("td.estado")?;
    let entrega_sel = parse_selector("td.entrega")?;

    let mut records = Vec::new();
    for row in document.select(&row_sel) {
        let Some(title_link) = row.select(&title_sel).next() else {
            continue;
        };
        let name: String = title_link.text().collect::<String>().trim().to_string();
        if name.is_empty() {
            continue;
        }

        let url = resolve_url(&base, title_link.value().attr("href").unwrap_or(""));

        let Some(deadline) = row
            .select(&plazo_sel)
            .next()
            .and_then(|cell| cell.value().attr("rel"))
            .and_then(|rel| rel.trim().parse::<i64>().ok())
            .and_then(epoch_to_utc)
        else {
            log::warn!("Tarea '{name}' has no parsable deadline, skipping");
            continue;
        };

        let late_deadline = row
            .select(&atraso_sel)
            .next()
            .and_then(|cell| cell.value().attr("rel"))
            .and_then(|rel| rel.trim().parse::<i64>().ok())
            .and_then(epoch_to_utc);

        let lifecycle = row
            .select(&estado_sel)
            .next()
            .map(|cell| LifecycleState::from_cell(&cell.text().collect::<String>()))
            .unwrap_or(LifecycleState::Open);

        let submission = row
            .select(&entrega_sel)
            .next()
            .map(|cell| SubmissionState::from_cell(&cell.text().collect::<String>()))
            .unwrap_or(SubmissionState::Pending);

        records.push(TareaRecord {
            id: extract_file_id(&url),
            name,
            url,
            deadline,
            late_deadline,
            submission,
            lifecycle,
        });
    }

    Ok(records)
}

fn epoch_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0).single()
}
