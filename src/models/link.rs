// src/models/link.rs

//! Attachment links as parsed from a feed page, and their grouped form.

use crate::models::Section;
use crate::utils;

/// Link type as declared by the markup or decided by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Pdf,
    Zip,
    /// Recognized markup but not a downloadable document
    Other,
}

impl LinkKind {
    /// Map a lowercased file extension to a kind.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "pdf" => LinkKind::Pdf,
            "zip" => LinkKind::Zip,
            _ => LinkKind::Other,
        }
    }

    /// Whether this kind is downloaded and filed.
    pub fn is_attachment(&self) -> bool {
        matches!(self, LinkKind::Pdf | LinkKind::Zip)
    }

    /// Canonical file extension for downloadable kinds.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            LinkKind::Pdf => Some("pdf"),
            LinkKind::Zip => Some("zip"),
            _ => None,
        }
    }
}

/// One anchor element from a feed page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDescriptor {
    /// Anchor text
    pub display_name: String,

    /// Href resolved against the page URL
    pub href: String,

    /// Kind suggested by the markup (display-name extension)
    pub declared_kind: LinkKind,

    /// Wrapped in the portal's script-driven viewer overlay
    pub is_lightbox: bool,
}

/// A classified, downloadable attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Display name from the originating descriptor
    pub name: String,

    /// Direct download URL (lightbox links already rewritten)
    pub url: String,

    pub kind: LinkKind,
}

/// Attachments belonging to one announcement, anchored by its primary
/// document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentGroup {
    /// Folder name: primary display name, extension stripped, slugged
    pub anchor_name: String,

    /// Portal file id of the anchor when extractable, else the anchor name;
    /// used for cross-page de-duplication
    pub natural_id: String,

    /// Ordered members; the first is the primary document
    pub members: Vec<Attachment>,

    /// Course display name
    pub course: String,

    pub section: Section,
}

impl AttachmentGroup {
    /// Open a group anchored by `primary`.
    pub fn open(primary: Attachment, course: &str, section: Section) -> Self {
        let (stem, _) = utils::split_extension(&primary.name);
        let anchor_name = utils::slug(stem);
        let natural_id = utils::url::extract_file_id(&primary.url)
            .unwrap_or_else(|| anchor_name.clone());
        Self {
            anchor_name,
            natural_id,
            members: vec![primary],
            course: course.to_string(),
            section,
        }
    }

    /// Append a follower attachment.
    pub fn push(&mut self, member: Attachment) {
        self.members.push(member);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
