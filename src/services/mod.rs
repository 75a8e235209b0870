//! Service layer for the synchronizer.
//!
//! Parsing and policy only; no I/O lives here. This module contains:
//! - feed page parsing into ordered link descriptors (`feed_page`)
//! - the download/external/drop classification policy (`classify`)
//! - the sequential grouping algorithm (`group`)
//! - course discovery from the home page (`courses`)
//! - control and assignment row parsing (`calendario`, `tareas`)

mod calendario;
mod classify;
mod courses;
mod feed_page;
mod group;
mod tareas;

// Re-export the service surface
pub use calendario::parse_controls;
pub use classify::{Classification, Classifier};
pub use courses::parse_courses;
pub use feed_page::{FeedPage, parse_feed_page};
pub use group::group_attachments;
pub use tareas::parse_tareas;

use scraper::Selector;

use crate::error::{AppError, Result};

/// Parse a CSS selector, mapping failures onto [`AppError::Selector`].
pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
