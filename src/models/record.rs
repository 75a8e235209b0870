// src/models/record.rs

//! Raw deadline-bearing rows parsed from the portal, before event building.

use chrono::{DateTime, NaiveTime, Utc};

/// Submission status of an assignment, recomputed from the live page each
/// run and reflected only in event titles/descriptions, never in uids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Submitted,
    NotSubmitted,
    Pending,
}

impl SubmissionState {
    /// Read the state from the portal's status cell text.
    ///
    /// The negative spellings are checked first: "no entregada" contains
    /// "entregada", so the positive match must come last.
    pub fn from_cell(text: &str) -> Self {
        let normalized = text.trim().to_lowercase();
        if normalized.contains("sin entrega") || normalized.contains("no entregada") {
            SubmissionState::NotSubmitted
        } else if normalized.contains("entregada") {
            SubmissionState::Submitted
        } else {
            SubmissionState::Pending
        }
    }

    /// Title suffix symbol; pending adds nothing.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            SubmissionState::Submitted => Some("✓"),
            SubmissionState::NotSubmitted => Some("✗"),
            SubmissionState::Pending => None,
        }
    }

    /// Portal-language label for descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Submitted => "Entregada",
            SubmissionState::NotSubmitted => "Sin Entrega",
            SubmissionState::Pending => "Pendiente",
        }
    }
}

/// Whether the assignment still accepts submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Open,
    Closed,
}

impl LifecycleState {
    /// Read the state from the portal's estado cell text.
    pub fn from_cell(text: &str) -> Self {
        if text.trim().to_lowercase().contains("finalizada") {
            LifecycleState::Closed
        } else {
            LifecycleState::Open
        }
    }

    /// Portal-language label for descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Open => "En Plazo",
            LifecycleState::Closed => "Finalizada",
        }
    }
}

/// One assignment row from the tareas page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TareaRecord {
    /// Portal assignment id when the row link carries one
    pub id: Option<String>,

    pub name: String,

    /// Absolute URL of the assignment page
    pub url: String,

    pub deadline: DateTime<Utc>,

    /// Late-submission deadline, when the assignment accepts atrasos
    pub late_deadline: Option<DateTime<Utc>>,

    pub submission: SubmissionState,

    pub lifecycle: LifecycleState,
}

/// One control row from the calendario page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRecord {
    pub name: String,

    /// Absolute URL of the calendario entry
    pub url: String,

    /// Epoch of the row's day, from the cell's `rel` attribute
    pub day: DateTime<Utc>,

    /// Wall-clock start/end parsed from the "(HH:MM - HH:MM)" annotation
    pub time_range: Option<(NaiveTime, NaiveTime)>,

    pub location: Option<String>,
}
