// src/services/classify.rs

//! Attachment classification policy.
//!
//! Decides, per link descriptor, whether it is a downloadable document, an
//! external reference, or noise. Pure decision logic; the session performs
//! the actual transfer later.

use url::Url;

use crate::models::{Attachment, LinkDescriptor, LinkKind};
use crate::utils;
use crate::utils::url::{host_of, with_last_segment};

/// The portal's raw download endpoint; lightbox viewer links are rewritten
/// to their sibling under this segment.
const DOWNLOAD_SEGMENT: &str = "bajar";

/// Outcome of classifying one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Downloadable document with its direct URL
    Attachment(Attachment),

    /// Off-portal reference; never downloaded
    External,

    /// Unknown or non-document link, dropped
    Dropped,
}

/// Classifier bound to the portal host.
pub struct Classifier {
    portal_host: String,
}

impl Classifier {
    pub fn new(portal_base: &Url) -> Self {
        Self {
            portal_host: portal_base
                .host_str()
                .unwrap_or_default()
                .to_lowercase(),
        }
    }

    /// Apply the classification rules in order; the first match wins.
    ///
    /// 1. A host other than the portal's makes the link external.
    /// 2. Lightbox links are rewritten to the direct download URL and then
    ///    reclassified by extension.
    /// 3. Everything else classifies by extension; unknown extensions are
    ///    dropped with a log line.
    pub fn classify(&self, link: &LinkDescriptor) -> Classification {
        if let Some(host) = host_of(&link.href) {
            if host != self.portal_host {
                return Classification::External;
            }
        }

        if link.is_lightbox {
            let direct = with_last_segment(&link.href, DOWNLOAD_SEGMENT)
                .unwrap_or_else(|| link.href.clone());
            return self.attach_or_drop(link, direct);
        }

        self.attach_or_drop(link, link.href.clone())
    }

    fn attach_or_drop(&self, link: &LinkDescriptor, url: String) -> Classification {
        let kind = effective_kind(&url, link);
        if kind.is_attachment() {
            Classification::Attachment(Attachment {
                name: link.display_name.clone(),
                url,
                kind,
            })
        } else {
            log::debug!(
                "Dropping link '{}' ({}): no downloadable extension",
                link.display_name,
                link.href
            );
            Classification::Dropped
        }
    }
}

/// Extension of the URL's final path segment, then of the display name, then
/// the markup-declared kind.
fn effective_kind(url: &str, link: &LinkDescriptor) -> LinkKind {
    if let Some(ext) = path_extension(url) {
        let kind = LinkKind::from_extension(&ext);
        if kind.is_attachment() {
            return kind;
        }
    }
    if let Some(ext) = utils::extension_of(&link.display_name) {
        let kind = LinkKind::from_extension(&ext);
        if kind.is_attachment() {
            return kind;
        }
    }
    if link.declared_kind.is_attachment() {
        return link.declared_kind;
    }
    LinkKind::Other
}

fn path_extension(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    utils::extension_of(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(&Url::parse("https://www.u-cursos.cl/").unwrap())
    }

    fn link(name: &str, href: &str, declared: LinkKind, lightbox: bool) -> LinkDescriptor {
        LinkDescriptor {
            display_name: name.to_string(),
            href: href.to_string(),
            declared_kind: declared,
            is_lightbox: lightbox,
        }
    }

    #[test]
    fn foreign_host_is_external() {
        let out = classifier().classify(&link(
            "enunciado.pdf",
            "https://drive.google.com/file/d/abc",
            LinkKind::Pdf,
            false,
        ));
        assert_eq!(out, Classification::External);
    }

    #[test]
    fn lightbox_resolves_to_direct_url_on_same_host() {
        let out = classifier().classify(&link(
            "Apunte Unix Exec",
            "https://www.u-cursos.cl/x/novedades/detalle?id=101",
            LinkKind::Pdf,
            true,
        ));
        match out {
            Classification::Attachment(att) => {
                assert_eq!(att.url, "https://www.u-cursos.cl/x/novedades/bajar?id=101");
                assert_eq!(att.kind, LinkKind::Pdf);
            }
            other => panic!("expected attachment, got {other:?}"),
        }
    }

    #[test]
    fn classifies_by_path_extension_first() {
        let out = classifier().classify(&link(
            "material",
            "https://www.u-cursos.cl/files/guia.zip",
            LinkKind::Other,
            false,
        ));
        match out {
            Classification::Attachment(att) => assert_eq!(att.kind, LinkKind::Zip),
            other => panic!("expected attachment, got {other:?}"),
        }
    }

    #[test]
    fn falls_back_to_display_name_extension() {
        let out = classifier().classify(&link(
            "codigo.zip",
            "https://www.u-cursos.cl/x/novedades/bajar?id=102",
            LinkKind::Zip,
            false,
        ));
        match out {
            Classification::Attachment(att) => {
                assert_eq!(att.kind, LinkKind::Zip);
                assert_eq!(att.url, "https://www.u-cursos.cl/x/novedades/bajar?id=102");
            }
            other => panic!("expected attachment, got {other:?}"),
        }
    }

    #[test]
    fn unknown_extension_is_dropped() {
        let out = classifier().classify(&link(
            "notas.docx",
            "https://www.u-cursos.cl/files/notas.docx",
            LinkKind::Other,
            false,
        ));
        assert_eq!(out, Classification::Dropped);
    }

    #[test]
    fn relative_looking_urls_belong_to_the_portal() {
        // Unparseable hosts never count as foreign
        let out = classifier().classify(&link(
            "guia.pdf",
            "bajar?id=9",
            LinkKind::Pdf,
            false,
        ));
        assert!(matches!(out, Classification::Attachment(_)));
    }
}
