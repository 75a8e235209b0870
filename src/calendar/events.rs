// src/calendar/events.rs

//! Building feed events from scraped records, and the feed itself.
//!
//! Uids are derived only from identity (course, kind, natural key), so a
//! record whose presentation changed between runs keeps its uid and calendar
//! clients update the entry in place instead of duplicating it. The feed is
//! regenerated wholesale on every run; there is no incremental merge state.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, LocalResult, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::Result;
use crate::models::{
    Config, ControlRecord, Course, EventKind, FeedEvent, TareaRecord, stable_uid,
};
use crate::utils;

/// Turns records into [`FeedEvent`]s with portal times mapped into the
/// configured timezone.
pub struct EventBuilder<'a> {
    config: &'a Config,
    tz: Tz,
}

impl<'a> EventBuilder<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        let tz = config.timezone()?;
        Ok(Self { config, tz })
    }

    /// One event per control, spanning its announced time range.
    pub fn control_event(&self, course: &Course, record: &ControlRecord) -> FeedEvent {
        let key = format!("{}|{}", record.name, record.day.timestamp());
        let title = format!("[{}] {}", self.config.abbreviation(&course.name), record.name);

        let (start, end, description) = match record.time_range {
            Some((from, to)) => {
                let start = self.at_wall_time(record.day, from);
                let end = self.at_wall_time(record.day, to).max(start);
                let minutes = (end - start).num_minutes();
                (start, Some(end), format!("Duration: {minutes} minutes"))
            }
            None => (record.day.with_timezone(&self.tz), None, String::new()),
        };

        FeedEvent {
            uid: stable_uid(&course.id, EventKind::Control, &key),
            kind: EventKind::Control,
            title,
            start,
            end,
            location: record.location.clone(),
            description,
            url: Some(record.url.clone()),
            reminder_offset: self.reminder(),
        }
    }

    /// One event per tarea deadline, plus a second one when late hand-ins
    /// are accepted.
    pub fn tarea_events(&self, course: &Course, record: &TareaRecord) -> Vec<FeedEvent> {
        let key = record
            .id
            .clone()
            .unwrap_or_else(|| utils::slug(&record.name));
        let abbrev = self.config.abbreviation(&course.name);

        let mut title = format!("[{abbrev}] {}", record.name);
        if let Some(symbol) = record.submission.symbol() {
            title.push(' ');
            title.push_str(symbol);
        }

        let mut description = format!(
            "Estado: {}\nEntrega: {}\n",
            record.lifecycle.label(),
            record.submission.label()
        );
        if let Some(late) = record.late_deadline {
            description.push_str(&format!(
                "Acepta atrasos hasta: {}\n",
                late.with_timezone(&self.tz).format("%Y-%m-%d %H:%M")
            ));
        }

        let mut events = vec![FeedEvent {
            uid: stable_uid(&course.id, EventKind::Deadline, &key),
            kind: EventKind::Deadline,
            title: title.clone(),
            start: record.deadline.with_timezone(&self.tz),
            end: None,
            location: None,
            description,
            url: Some(record.url.clone()),
            reminder_offset: self.reminder(),
        }];

        if let Some(late) = record.late_deadline {
            let late_description = format!(
                "Estado: {}\nEntrega: {}\nPlazo de atrasos\n",
                record.lifecycle.label(),
                record.submission.label()
            );
            events.push(FeedEvent {
                uid: stable_uid(&course.id, EventKind::LateDeadline, &key),
                kind: EventKind::LateDeadline,
                title: format!("{title} - Atraso"),
                start: late.with_timezone(&self.tz),
                end: None,
                location: None,
                description: late_description,
                url: Some(record.url.clone()),
                reminder_offset: self.reminder(),
            });
        }

        events
    }

    fn reminder(&self) -> Duration {
        Duration::hours(i64::from(self.config.calendar.reminder_hours))
    }

    /// Local wall-clock time on the record's day. DST gaps fall back to the
    /// record's own timestamp, ambiguous times take the earlier offset.
    fn at_wall_time(&self, day: DateTime<Utc>, time: NaiveTime) -> DateTime<Tz> {
        let date = day.with_timezone(&self.tz).date_naive();
        match self.tz.from_local_datetime(&date.and_time(time)) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earlier, _) => earlier,
            LocalResult::None => day.with_timezone(&self.tz),
        }
    }
}

/// The full event set for one run, keyed and ordered by uid.
#[derive(Debug, Default)]
pub struct Feed {
    events: BTreeMap<String, FeedEvent>,
    collisions: usize,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event. A uid collision is loud and the newcomer wins.
    pub fn insert(&mut self, event: FeedEvent) {
        let uid = event.uid.clone();
        if let Some(previous) = self.events.insert(uid.clone(), event) {
            self.collisions += 1;
            log::warn!(
                "Uid collision on {uid}: '{}' replaced by a later record",
                previous.title
            );
        }
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = FeedEvent>) {
        for event in events {
            self.insert(event);
        }
    }

    /// Events in uid order.
    pub fn events(&self) -> impl Iterator<Item = &FeedEvent> {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LifecycleState, SubmissionState};
    use chrono::NaiveTime;

    fn config() -> Config {
        Config::default()
    }

    fn course() -> Course {
        Course {
            id: "372892".to_string(),
            code: "CC3301".to_string(),
            name: "Programación de Software de Sistemas".to_string(),
            url: "https://www.u-cursos.cl/ingenieria/2026/1/CC3301/1".to_string(),
        }
    }

    fn control(name: &str) -> ControlRecord {
        ControlRecord {
            name: name.to_string(),
            url: "https://www.u-cursos.cl/ingenieria/2026/1/CC3301/1/calendario/".to_string(),
            day: Utc.with_ymd_and_hms(2026, 4, 15, 12, 0, 0).unwrap(),
            time_range: Some((
                NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            )),
            location: Some("Auditorio B".to_string()),
        }
    }

    fn tarea(submission: SubmissionState) -> TareaRecord {
        TareaRecord {
            id: Some("8841".to_string()),
            name: "Tarea 1".to_string(),
            url: "https://www.u-cursos.cl/ingenieria/2026/1/CC3301/1/tareas/detalle?id=8841"
                .to_string(),
            deadline: Utc.with_ymd_and_hms(2026, 4, 20, 2, 59, 0).unwrap(),
            late_deadline: None,
            submission,
            lifecycle: LifecycleState::Open,
        }
    }

    #[test]
    fn control_event_spans_the_announced_range() {
        let config = config();
        let builder = EventBuilder::new(&config).unwrap();
        let event = builder.control_event(&course(), &control("Control 1"));

        assert_eq!(event.title, "[PSS] Control 1");
        assert_eq!(event.description, "Duration: 180 minutes");
        assert_eq!(event.location.as_deref(), Some("Auditorio B"));
        assert_eq!(event.start.format("%Y-%m-%d %H:%M").to_string(), "2026-04-15 13:00");
        let end = event.end.unwrap();
        assert_eq!(end.format("%H:%M").to_string(), "16:00");
    }

    #[test]
    fn rebuilding_from_identical_records_yields_identical_events() {
        let config = config();
        let builder = EventBuilder::new(&config).unwrap();
        let course = course();
        let record = tarea(SubmissionState::Pending);

        let first = builder.tarea_events(&course, &record);
        let second = builder.tarea_events(&course, &record);

        assert_eq!(first, second);
    }

    #[test]
    fn uid_survives_presentation_changes() {
        let config = config();
        let builder = EventBuilder::new(&config).unwrap();
        let course = course();

        let pending = builder.tarea_events(&course, &tarea(SubmissionState::Pending));
        let submitted = builder.tarea_events(&course, &tarea(SubmissionState::Submitted));

        assert_eq!(pending[0].uid, submitted[0].uid);
        assert_eq!(pending[0].title, "[PSS] Tarea 1");
        assert_eq!(submitted[0].title, "[PSS] Tarea 1 ✓");
        assert_ne!(pending[0].description, submitted[0].description);
    }

    #[test]
    fn late_window_produces_a_second_distinct_event() {
        let config = config();
        let builder = EventBuilder::new(&config).unwrap();
        let mut record = tarea(SubmissionState::NotSubmitted);
        record.late_deadline = Some(Utc.with_ymd_and_hms(2026, 4, 22, 2, 59, 0).unwrap());

        let events = builder.tarea_events(&course(), &record);

        assert_eq!(events.len(), 2);
        assert_ne!(events[0].uid, events[1].uid);
        assert_eq!(events[1].title, "[PSS] Tarea 1 ✗ - Atraso");
        assert!(events[0].description.contains("Acepta atrasos hasta: 2026-04-21"));
        assert!(events[1].description.contains("Plazo de atrasos"));
    }

    #[test]
    fn control_without_range_is_a_point_event() {
        let config = config();
        let builder = EventBuilder::new(&config).unwrap();
        let mut record = control("Examen");
        record.time_range = None;

        let event = builder.control_event(&course(), &record);

        assert!(event.end.is_none());
        assert!(event.description.is_empty());
    }

    #[test]
    fn feed_orders_by_uid_and_counts_collisions() {
        let config = config();
        let builder = EventBuilder::new(&config).unwrap();
        let course = course();
        let mut feed = Feed::new();

        feed.extend(builder.tarea_events(&course, &tarea(SubmissionState::Pending)));
        feed.insert(builder.control_event(&course, &control("Control 1")));
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.collisions(), 0);

        // Same identity again: replaced, not duplicated.
        feed.extend(builder.tarea_events(&course, &tarea(SubmissionState::Submitted)));
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.collisions(), 1);

        let uids: Vec<&str> = feed.events().map(|e| e.uid.as_str()).collect();
        let mut sorted = uids.clone();
        sorted.sort_unstable();
        assert_eq!(uids, sorted);
    }
}
