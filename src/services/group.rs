// src/services/group.rs

//! Sequential attachment grouping.
//!
//! The portal renders an announcement's primary document and its companion
//! files as consecutive anchors; nothing but position ties them together.
//! This scan reconstructs the association: a downloadable link opens a group
//! when none is open and joins the open one otherwise, while any external or
//! non-document link closes the open group. Groups never continue across a
//! page boundary; a page-initial downloadable always anchors a fresh group.

use crate::models::{AttachmentGroup, LinkDescriptor, Section};
use crate::services::{Classification, Classifier};

/// Group one page's descriptors, in order, into attachment groups.
pub fn group_attachments(
    links: &[LinkDescriptor],
    classifier: &Classifier,
    course: &str,
    section: Section,
) -> Vec<AttachmentGroup> {
    let mut groups = Vec::new();
    let mut open: Option<AttachmentGroup> = None;

    for link in links {
        match classifier.classify(link) {
            Classification::Attachment(attachment) => match open.as_mut() {
                Some(group) => group.push(attachment),
                None => open = Some(AttachmentGroup::open(attachment, course, section)),
            },
            Classification::External | Classification::Dropped => {
                close(&mut open, &mut groups);
            }
        }
    }
    close(&mut open, &mut groups);

    groups
}

fn close(open: &mut Option<AttachmentGroup>, groups: &mut Vec<AttachmentGroup>) {
    if let Some(group) = open.take() {
        if group.is_empty() {
            // Groups are anchored at construction, so this is a boundary
            // anomaly worth hearing about.
            log::warn!(
                "Skipping empty attachment group '{}' in {}/{}",
                group.anchor_name,
                group.course,
                group.section
            );
            return;
        }
        groups.push(group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkKind;
    use url::Url;

    fn classifier() -> Classifier {
        Classifier::new(&Url::parse("https://www.u-cursos.cl/").unwrap())
    }

    fn pdf(name: &str, id: u32) -> LinkDescriptor {
        LinkDescriptor {
            display_name: name.to_string(),
            href: format!("https://www.u-cursos.cl/x/novedades/bajar?id={id}"),
            declared_kind: LinkKind::Pdf,
            is_lightbox: false,
        }
    }

    fn zip(name: &str, id: u32) -> LinkDescriptor {
        LinkDescriptor {
            display_name: name.to_string(),
            href: format!("https://www.u-cursos.cl/x/novedades/bajar?id={id}"),
            declared_kind: LinkKind::Zip,
            is_lightbox: false,
        }
    }

    fn other(name: &str) -> LinkDescriptor {
        LinkDescriptor {
            display_name: name.to_string(),
            href: "https://www.u-cursos.cl/x/novedades/detalle?id=900".to_string(),
            declared_kind: LinkKind::Other,
            is_lightbox: false,
        }
    }

    fn external(name: &str) -> LinkDescriptor {
        LinkDescriptor {
            display_name: name.to_string(),
            href: "https://youtu.be/xyz".to_string(),
            declared_kind: LinkKind::Other,
            is_lightbox: false,
        }
    }

    #[test]
    fn zip_after_pdf_joins_the_open_group() {
        let links = vec![pdf("Tarea 1.pdf", 1), zip("base.zip", 2)];
        let groups = group_attachments(&links, &classifier(), "Batos", Section::Novedades);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].anchor_name, "Tarea-1");
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0].members[1].name, "base.zip");
    }

    #[test]
    fn separator_closes_group_and_next_pdf_anchors_fresh() {
        // The mixed page from the announcements feed: two posts, the first
        // with a companion archive and an external reference between them.
        let links = vec![
            pdf("A.pdf", 1),
            zip("a.zip", 2),
            external("ext-link"),
            pdf("B.pdf", 3),
        ];
        let groups = group_attachments(&links, &classifier(), "PSS", Section::Novedades);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].anchor_name, "A");
        let first: Vec<&str> = groups[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(first, vec!["A.pdf", "a.zip"]);
        assert_eq!(groups[1].anchor_name, "B");
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn order_is_preserved_within_and_across_groups() {
        let links = vec![
            pdf("Guia 1.pdf", 1),
            zip("anexo1.zip", 2),
            zip("anexo2.zip", 3),
            other("detalle"),
            pdf("Guia 2.pdf", 4),
            other("detalle"),
            pdf("Guia 3.pdf", 5),
        ];
        let groups = group_attachments(&links, &classifier(), "PSS", Section::Material);

        let anchors: Vec<&str> = groups.iter().map(|g| g.anchor_name.as_str()).collect();
        assert_eq!(anchors, vec!["Guia-1", "Guia-2", "Guia-3"]);
        let members: Vec<&str> = groups[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(members, vec!["Guia 1.pdf", "anexo1.zip", "anexo2.zip"]);
    }

    #[test]
    fn page_of_noise_yields_no_groups() {
        let links = vec![other("detalle"), external("video"), other("foro")];
        let groups = group_attachments(&links, &classifier(), "PSS", Section::Novedades);
        assert!(groups.is_empty());
    }

    #[test]
    fn trailing_open_group_is_flushed() {
        let links = vec![other("detalle"), pdf("Final.pdf", 7)];
        let groups = group_attachments(&links, &classifier(), "PSS", Section::Material);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].anchor_name, "Final");
    }

    #[test]
    fn page_initial_follower_anchors_its_own_group() {
        // Pagination can split an announcement so that a companion archive
        // lands at the top of the next page. Grouping is page-local, so the
        // orphaned companion anchors a fresh group under its own name
        // instead of rejoining the previous page's anchor. Known limitation.
        let page_two = vec![zip("anexo.zip", 8), other("detalle")];
        let groups = group_attachments(&page_two, &classifier(), "PSS", Section::Material);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].anchor_name, "anexo");
        assert_eq!(groups[0].members[0].name, "anexo.zip");
    }

    #[test]
    fn nothing_is_lost_except_external_and_other() {
        let links = vec![
            pdf("A.pdf", 1),
            external("video"),
            zip("b.zip", 2),
            other("foro"),
            pdf("C.pdf", 3),
        ];
        let groups = group_attachments(&links, &classifier(), "PSS", Section::Novedades);

        let total: usize = groups.iter().map(AttachmentGroup::len).sum();
        assert_eq!(total, 3);
    }
}
