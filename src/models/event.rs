// src/models/event.rs

//! Calendar event model with stable, regeneration-safe identifiers.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use sha2::{Digest, Sha256};

/// Event kinds carried by the feed. A tarea with a late deadline yields one
/// `Deadline` and one `LateDeadline` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Control,
    Deadline,
    LateDeadline,
}

impl EventKind {
    /// Stable tag mixed into uids; never rename.
    pub fn tag(&self) -> &'static str {
        match self {
            EventKind::Control => "control",
            EventKind::Deadline => "tarea",
            EventKind::LateDeadline => "tarea-atraso",
        }
    }
}

/// One calendar entry, ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    /// Deterministic identifier; calendar clients track events by it across
    /// regenerations
    pub uid: String,

    pub kind: EventKind,

    pub title: String,

    pub start: DateTime<Tz>,

    /// Controls carry a real end time; deadline events are point-in-time
    pub end: Option<DateTime<Tz>>,

    pub location: Option<String>,

    pub description: String,

    /// Appended to the description at encode time
    pub url: Option<String>,

    /// Alarm offset before `start`
    pub reminder_offset: Duration,
}

/// Derive the stable uid for a record.
///
/// Only the course id, the kind tag and the record's natural key
/// participate; mutable presentation state (titles, submission marks) never
/// does. The digest is truncated, the readable prefix keeps uids greppable.
pub fn stable_uid(course_id: &str, kind: EventKind, natural_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(course_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(kind.tag().as_bytes());
    hasher.update([0u8]);
    hasher.update(natural_key.as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("{}-{}-{}@ucursos", kind.tag(), course_id, &digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_uid_is_deterministic() {
        let a = stable_uid("372892", EventKind::Deadline, "1234");
        let b = stable_uid("372892", EventKind::Deadline, "1234");
        assert_eq!(a, b);
    }

    #[test]
    fn stable_uid_separates_kinds() {
        let deadline = stable_uid("372892", EventKind::Deadline, "1234");
        let atraso = stable_uid("372892", EventKind::LateDeadline, "1234");
        assert_ne!(deadline, atraso);
        assert!(deadline.starts_with("tarea-372892-"));
        assert!(atraso.starts_with("tarea-atraso-372892-"));
    }

    #[test]
    fn stable_uid_separates_courses_and_keys() {
        let a = stable_uid("1", EventKind::Control, "Control 1");
        let b = stable_uid("2", EventKind::Control, "Control 1");
        let c = stable_uid("1", EventKind::Control, "Control 2");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn stable_uid_shape() {
        let uid = stable_uid("372892", EventKind::Control, "Control 1|1760303940");
        assert!(uid.ends_with("@ucursos"));
        let digest = uid
            .trim_end_matches("@ucursos")
            .rsplit('-')
            .next()
            .unwrap();
        assert_eq!(digest.len(), 16);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
