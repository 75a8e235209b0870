// src/models/course.rs

//! Course identity and portal section vocabulary.

use serde::{Deserialize, Serialize};

/// A course visible on the authenticated portal home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Stable portal id (digits from the course list entry)
    pub id: String,

    /// Short course code, e.g. "CC3301"
    pub code: String,

    /// Full display name, used for folder names and title fallbacks
    pub name: String,

    /// Absolute URL of the course home
    pub url: String,
}

impl Course {
    /// Absolute URL of a portal service under this course.
    pub fn service_url(&self, slug: &str) -> String {
        let base = self.url.trim_end_matches('/');
        format!("{base}/{slug}/")
    }

    /// Case-insensitive name/code match for the `--course` filter.
    pub fn matches_filter(&self, filter: &str) -> bool {
        let needle = filter.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.code.to_lowercase().contains(&needle)
    }
}

/// Attachment-bearing portal sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Material,
    Novedades,
}

impl Section {
    /// Portal path segment, also the on-disk section folder name.
    pub fn slug(&self) -> &'static str {
        match self {
            Section::Material => "material_docente",
            Section::Novedades => "novedades",
        }
    }

    /// Short label for logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Section::Material => "material",
            Section::Novedades => "novedades",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> Course {
        Course {
            id: "372892".to_string(),
            code: "CC3301".to_string(),
            name: "Programación de Software de Sistemas".to_string(),
            url: "https://www.u-cursos.cl/ingenieria/2026/1/CC3301/1".to_string(),
        }
    }

    #[test]
    fn service_url_handles_trailing_slash() {
        let mut c = course();
        assert_eq!(
            c.service_url("novedades"),
            "https://www.u-cursos.cl/ingenieria/2026/1/CC3301/1/novedades/"
        );
        c.url.push('/');
        assert_eq!(
            c.service_url("material_docente"),
            "https://www.u-cursos.cl/ingenieria/2026/1/CC3301/1/material_docente/"
        );
    }

    #[test]
    fn filter_matches_name_and_code() {
        let c = course();
        assert!(c.matches_filter("software"));
        assert!(c.matches_filter("cc3301"));
        assert!(!c.matches_filter("biologia"));
    }

    #[test]
    fn section_slugs() {
        assert_eq!(Section::Material.slug(), "material_docente");
        assert_eq!(Section::Novedades.slug(), "novedades");
    }
}
