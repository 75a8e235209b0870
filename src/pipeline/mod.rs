// src/pipeline/mod.rs

//! Pipeline entry points for a scrape run.
//!
//! - `walk_section`: page through one course section and gather groups
//! - `materialize_groups`: download groups into the folder tree
//! - `run_attachment_section` / `collect_*_events`: per-section drivers

mod materialize;
mod sections;
mod walker;

pub use materialize::{MaterializeOutcome, materialize_groups};
pub use sections::{
    EventsReport, SectionReport, collect_control_events, collect_tarea_events,
    run_attachment_section,
};
pub use walker::{WalkOutcome, walk_section};
