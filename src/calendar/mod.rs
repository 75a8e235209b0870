// src/calendar/mod.rs

//! Calendar side of the pipeline: event building, iCalendar encoding and
//! publishing.

mod encode;
mod events;
mod publish;

pub use encode::encode_feed;
pub use events::{EventBuilder, Feed};
pub use publish::{publish_feed, serve};
