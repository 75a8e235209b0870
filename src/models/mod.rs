// src/models/mod.rs

//! Domain models for the synchronizer.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod course;
mod event;
mod link;
mod record;

// Re-export all public types
pub use config::{CalendarConfig, Config, OutputConfig, PortalConfig};
pub use course::{Course, Section};
pub use event::{EventKind, FeedEvent, stable_uid};
pub use link::{Attachment, AttachmentGroup, LinkDescriptor, LinkKind};
pub use record::{ControlRecord, LifecycleState, SubmissionState, TareaRecord};
