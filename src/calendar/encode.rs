// src/calendar/encode.rs

//! iCalendar encoding of the feed.
//!
//! Times are emitted with an explicit TZID rather than in UTC so calendar
//! clients show portal wall-clock times regardless of the viewer's locale.

use icalendar::{Alarm, Calendar, CalendarDateTime, Component, Event, EventLike, Property};

use crate::calendar::Feed;
use crate::models::{CalendarConfig, EventKind, FeedEvent};

const PRODID: &str = "-//ucsync//EN";

/// Encode the whole feed as an iCalendar document.
pub fn encode_feed(feed: &Feed, config: &CalendarConfig) -> String {
    let mut calendar = Calendar::new();
    calendar
        .name(&config.name)
        .timezone(&config.timezone)
        .append_property(Property::new("PRODID", PRODID));

    for event in feed.events() {
        calendar.push(encode_event(event));
    }

    calendar.done().to_string()
}

fn encode_event(event: &FeedEvent) -> Event {
    let mut encoded = Event::new();
    encoded
        .uid(&event.uid)
        .summary(&event.title)
        .starts(wall_time(&event.start))
        // Deadlines carry no span; start doubles as end.
        .ends(wall_time(event.end.as_ref().unwrap_or(&event.start)))
        .description(&full_description(event))
        .alarm(Alarm::display(
            &reminder_text(event),
            -event.reminder_offset,
        ));
    if let Some(location) = &event.location {
        encoded.location(location);
    }
    encoded.done()
}

fn wall_time(moment: &chrono::DateTime<chrono_tz::Tz>) -> CalendarDateTime {
    CalendarDateTime::WithTimezone {
        date_time: moment.naive_local(),
        tzid: moment.timezone().name().to_string(),
    }
}

fn full_description(event: &FeedEvent) -> String {
    match &event.url {
        Some(url) => format!("{}\n\nURL: {}", event.description, url),
        None => event.description.clone(),
    }
}

fn reminder_text(event: &FeedEvent) -> String {
    match event.kind {
        EventKind::Control => format!("Control tomorrow: {}", event.title),
        EventKind::Deadline => format!("Tarea mañana: {}", event.title),
        EventKind::LateDeadline => format!("Plazo de atrasos mañana: {}", event.title),
    }
}
