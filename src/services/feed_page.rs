// src/services/feed_page.rs

//! Feed page parsing.
//!
//! Turns one material/novedades page into the ordered link descriptors the
//! grouper consumes. The portal renders both sections as a `table.paginable`
//! whose `td.string` cells carry the anchors; association between a primary
//! document and its companions exists only in document order, so this layer
//! must preserve it exactly.

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{LinkDescriptor, LinkKind};
use crate::services::parse_selector;
use crate::utils;
use crate::utils::url::resolve_url;

/// One parsed feed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    /// All anchors in document order
    pub links: Vec<LinkDescriptor>,

    /// Absolute URL of the next page, when the pagination block advertises
    /// one
    pub next_page: Option<String>,
}

/// Parse a feed page into ordered descriptors plus the next-page link.
pub fn parse_feed_page(html: &str, page_url: &str) -> Result<FeedPage> {
    let base = Url::parse(page_url)?;
    let document = Html::parse_document(html);

    let link_sel = parse_selector("table.paginable td.string a")?;
    let next_sel = parse_selector("p.paginas a[rel=\"next\"]")?;

    let mut links = Vec::new();
    for anchor in document.select(&link_sel) {
        let Some(raw_href) = anchor.value().attr("href") else {
            continue;
        };
        if raw_href.is_empty() || raw_href.starts_with('#') || raw_href.starts_with("javascript:")
        {
            continue;
        }

        let text: String = anchor.text().collect();
        let display_name = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let display_name = if display_name.is_empty() {
            match anchor.value().attr("title") {
                Some(title) if !title.trim().is_empty() => title.trim().to_string(),
                _ => continue,
            }
        } else {
            display_name
        };

        let classes = anchor.value().attr("class").unwrap_or("");
        let rel = anchor.value().attr("rel").unwrap_or("");

        links.push(LinkDescriptor {
            href: resolve_url(&base, raw_href),
            declared_kind: declared_kind(classes, &display_name),
            is_lightbox: has_token(rel, "lightbox") || has_token(classes, "lightbox"),
            display_name,
        });
    }

    let next_page = document
        .select(&next_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| resolve_url(&base, href));

    Ok(FeedPage { links, next_page })
}

/// Kind as the markup declares it: the anchor's file-type class when
/// present, the display-name extension otherwise.
fn declared_kind(classes: &str, display_name: &str) -> LinkKind {
    if has_token(classes, "pdf") {
        return LinkKind::Pdf;
    }
    if has_token(classes, "zip") {
        return LinkKind::Zip;
    }
    match utils::extension_of(display_name) {
        Some(ext) => LinkKind::from_extension(&ext),
        None => LinkKind::Other,
    }
}

fn has_token(attr: &str, token: &str) -> bool {
    attr.split_whitespace().any(|t| t == token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://www.u-cursos.cl/ingenieria/2026/1/CC3301/1/novedades/";

    const PAGE: &str = r#"
        <table class="paginable">
          <tr>
            <td class="string">
              <h1><a href="detalle?id=101" rel="lightbox" class="pdf">Apunte Unix Exec</a></h1>
              <a href="bajar?id=102">codigo.zip</a>
              <p>ver <a href="https://youtu.be/xyz">video</a></p>
            </td>
          </tr>
          <tr>
            <td class="string">
              <h1><a href="detalle?id=103" rel="lightbox" class="pdf">Guia 2</a></h1>
            </td>
          </tr>
        </table>
        <p class="paginas"><a rel="next" href="?pagina=2">siguiente</a></p>
    "#;

    #[test]
    fn parses_links_in_document_order() {
        let page = parse_feed_page(PAGE, PAGE_URL).unwrap();
        let names: Vec<&str> = page
            .links
            .iter()
            .map(|l| l.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["Apunte Unix Exec", "codigo.zip", "video", "Guia 2"]);
    }

    #[test]
    fn resolves_hrefs_and_next_page() {
        let page = parse_feed_page(PAGE, PAGE_URL).unwrap();
        assert_eq!(
            page.links[0].href,
            format!("{PAGE_URL}detalle?id=101")
        );
        assert_eq!(
            page.next_page.as_deref(),
            Some("https://www.u-cursos.cl/ingenieria/2026/1/CC3301/1/novedades/?pagina=2")
        );
    }

    #[test]
    fn declared_kinds_and_lightbox_flag() {
        let page = parse_feed_page(PAGE, PAGE_URL).unwrap();
        assert_eq!(page.links[0].declared_kind, LinkKind::Pdf);
        assert!(page.links[0].is_lightbox);
        assert_eq!(page.links[1].declared_kind, LinkKind::Zip);
        assert!(!page.links[1].is_lightbox);
        assert_eq!(page.links[2].declared_kind, LinkKind::Other);
    }

    #[test]
    fn skips_anchors_without_usable_href_or_name() {
        let html = r##"
            <table class="paginable"><tr><td class="string">
              <a href="#">ancla</a>
              <a href="javascript:void(0)">script</a>
              <a href="bajar?id=1"><img src="i.png"/></a>
              <a href="bajar?id=2" title="Informe.pdf"><img src="i.png"/></a>
            </td></tr></table>
        "##;
        let page = parse_feed_page(html, PAGE_URL).unwrap();
        assert_eq!(page.links.len(), 1);
        assert_eq!(page.links[0].display_name, "Informe.pdf");
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn no_pagination_block_means_no_next_page() {
        let page = parse_feed_page("<table class=\"paginable\"></table>", PAGE_URL).unwrap();
        assert!(page.links.is_empty());
        assert!(page.next_page.is_none());
    }
}
