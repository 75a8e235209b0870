// src/services/calendario.rs

//! Control row parsing from a course's calendario page.
//!
//! The calendario is one `table.sortable` whose tbody blocks alternate
//! between `tr.separador` section bars and event rows. Only rows under the
//! "Control" bar become records; tareas listed here are covered by the
//! tareas page instead. Each event cell carries the day as an epoch in its
//! `rel` attribute and the wall-clock range as an "(HH:MM - HH:MM)"
//! annotation.

use std::collections::HashSet;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::ControlRecord;
use crate::services::parse_selector;
use crate::utils::url::resolve_url;

const CONTROL_SECTION: &str = "Control";

/// Parse the control records from a calendario page.
pub fn parse_controls(html: &str, page_url: &str) -> Result<Vec<ControlRecord>> {
    let base = Url::parse(page_url)?;
    let document = Html::parse_document(html);

    let tbody_sel = parse_selector("table.sortable tbody")?;
    let separador_sel = parse_selector("tr.separador td")?;
    let row_sel = parse_selector("tr")?;
    let cell_sel = parse_selector("td.string")?;
    let title_sel = parse_selector("h1 a")?;
    let range_sel = parse_selector("h2")?;
    let place_sel = parse_selector("span.lugar")?;

    let range_re = Regex::new(r"\((\d{1,2}):(\d{2})\s*-\s*(\d{1,2}):(\d{2})\)")
        .map_err(|e| crate::error::AppError::parse("calendario", e))?;

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut current_section = String::new();

    for tbody in document.select(&tbody_sel) {
        if let Some(separador) = tbody.select(&separador_sel).next() {
            current_section = separador.text().collect::<String>().trim().to_string();
            continue;
        }
        if current_section != CONTROL_SECTION {
            continue;
        }

        for row in tbody.select(&row_sel) {
            let Some(cell) = row.select(&cell_sel).next() else {
                continue;
            };
            let Some(day) = cell
                .value()
                .attr("rel")
                .and_then(|rel| rel.trim().parse::<i64>().ok())
                .and_then(epoch_to_utc)
            else {
                continue;
            };
            let Some(title_link) = cell.select(&title_sel).next() else {
                continue;
            };

            let name: String = title_link.text().collect::<String>().trim().to_string();
            if name.is_empty() {
                continue;
            }
            let url = resolve_url(&base, title_link.value().attr("href").unwrap_or(""));

            let range_text: String = cell
                .select(&range_sel)
                .next()
                .map(|h2| h2.text().collect())
                .unwrap_or_default();
            let time_range = parse_time_range(&range_re, &range_text);

            let location = cell
                .select(&place_sel)
                .next()
                .map(|e| e.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty());

            // The portal repeats pinned rows; collapse exact duplicates.
            if !seen.insert((name.clone(), day.timestamp(), time_range)) {
                continue;
            }

            records.push(ControlRecord {
                name,
                url,
                day,
                time_range,
                location,
            });
        }
    }

    Ok(records)
}

fn epoch_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0).single()
}

fn parse_time_range(re: &Regex, text: &str) -> Option<(NaiveTime, NaiveTime)> {
    let caps = re.captures(text)?;
    let hm = |h: usize, m: usize| -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(
            caps.get(h)?.as_str().parse().ok()?,
            caps.get(m)?.as_str().parse().ok()?,
            0,
        )
    };
    Some((hm(1, 2)?, hm(3, 4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://www.u-cursos.cl/ingenieria/2026/1/CC3301/1/calendario/";

    const PAGE: &str = r#"
        <table class="sortable">
          <tbody><tr class="separador"><td>Control</td></tr></tbody>
          <tbody>
            <tr>
              <td class="string" rel="1760303940">
                <h1><a href="evento?id=55">Control 1</a></h1>
                <h2>Lunes 13 (13:00 - 16:00)</h2>
                <span class="lugar">Sala B21</span>
              </td>
            </tr>
            <tr>
              <td class="string" rel="1760303940">
                <h1><a href="evento?id=55">Control 1</a></h1>
                <h2>Lunes 13 (13:00 - 16:00)</h2>
              </td>
            </tr>
            <tr>
              <td class="string" rel="1762000000">
                <h1><a href="evento?id=56">Control 2</a></h1>
                <h2>sin hora publicada</h2>
              </td>
            </tr>
          </tbody>
          <tbody><tr class="separador"><td>Tareas</td></tr></tbody>
          <tbody>
            <tr>
              <td class="string" rel="1760390340">
                <h1><a href="evento?id=57">Tarea 1</a></h1>
                <h2>(23:59 - 23:59)</h2>
              </td>
            </tr>
          </tbody>
        </table>
    "#;

    #[test]
    fn parses_only_control_rows_and_collapses_duplicates() {
        let records = parse_controls(PAGE, PAGE_URL).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Control 1");
        assert_eq!(records[0].day.timestamp(), 1760303940);
        assert_eq!(
            records[0].time_range,
            Some((
                NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(16, 0, 0).unwrap()
            ))
        );
        assert_eq!(records[0].location.as_deref(), Some("Sala B21"));
        assert_eq!(records[0].url, format!("{PAGE_URL}evento?id=55"));
    }

    #[test]
    fn rows_without_time_range_keep_none() {
        let records = parse_controls(PAGE, PAGE_URL).unwrap();
        assert_eq!(records[1].name, "Control 2");
        assert_eq!(records[1].time_range, None);
        assert_eq!(records[1].location, None);
    }

    #[test]
    fn page_without_control_section_yields_nothing() {
        let html = r#"
            <table class="sortable">
              <tbody><tr class="separador"><td>Tareas</td></tr></tbody>
              <tbody><tr><td class="string" rel="1760390340">
                <h1><a href="evento?id=57">Tarea 1</a></h1>
              </td></tr></tbody>
            </table>
        "#;
        let records = parse_controls(html, PAGE_URL).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn time_range_regex_tolerates_spacing() {
        let re = Regex::new(r"\((\d{1,2}):(\d{2})\s*-\s*(\d{1,2}):(\d{2})\)").unwrap();
        assert!(parse_time_range(&re, "(9:00-10:15)").is_some());
        assert!(parse_time_range(&re, "(13:00  -  16:00)").is_some());
        assert!(parse_time_range(&re, "13:00 - 16:00").is_none());
    }
}
