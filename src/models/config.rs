//! Application configuration structures.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Portal location and HTTP behavior settings
    #[serde(default)]
    pub portal: PortalConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Calendar feed settings
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Course name to short tag used in event titles
    #[serde(default = "defaults::abbreviations")]
    pub abbreviations: HashMap<String, String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.portal.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .is_none()
        {
            return Err(AppError::validation("portal.base_url is not a valid URL"));
        }
        if self.portal.user_agent.trim().is_empty() {
            return Err(AppError::validation("portal.user_agent is empty"));
        }
        if self.portal.timeout_secs == 0 {
            return Err(AppError::validation("portal.timeout_secs must be > 0"));
        }
        if self.portal.page_retry_limit == 0 {
            return Err(AppError::validation("portal.page_retry_limit must be > 0"));
        }
        if self.output.root.trim().is_empty() {
            return Err(AppError::validation("output.root is empty"));
        }
        if self.output.calendar_file.trim().is_empty()
            || self.output.calendar_file.contains(['/', '\\'])
        {
            return Err(AppError::validation(
                "output.calendar_file must be a bare file name",
            ));
        }
        if self.calendar.reminder_hours == 0 {
            return Err(AppError::validation("calendar.reminder_hours must be > 0"));
        }
        self.timezone()?;
        Ok(())
    }

    /// Parse the configured calendar timezone.
    pub fn timezone(&self) -> Result<chrono_tz::Tz> {
        self.calendar
            .timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| {
                AppError::validation(format!(
                    "calendar.timezone '{}' is not a known timezone",
                    self.calendar.timezone
                ))
            })
    }

    /// Short tag for a course name, falling back to the full name.
    pub fn abbreviation<'a>(&'a self, course_name: &'a str) -> &'a str {
        self.abbreviations
            .get(course_name)
            .map(String::as_str)
            .unwrap_or(course_name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal: PortalConfig::default(),
            output: OutputConfig::default(),
            calendar: CalendarConfig::default(),
            abbreviations: defaults::abbreviations(),
        }
    }
}

/// Portal location and HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Portal base URL; `UCURSOS_URL` overrides it at startup
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Politeness delay between page fetches in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Attempts per feed page before giving up on the section
    #[serde(default = "defaults::page_retry_limit")]
    pub page_retry_limit: u32,

    /// Base backoff between retries in milliseconds, scaled by attempt
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            page_retry_limit: defaults::page_retry_limit(),
            retry_backoff_ms: defaults::retry_backoff(),
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for downloaded attachments and the calendar file
    #[serde(default = "defaults::output_root")]
    pub root: String,

    /// Calendar file name inside the output root
    #[serde(default = "defaults::calendar_file")]
    pub calendar_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: defaults::output_root(),
            calendar_file: defaults::calendar_file(),
        }
    }
}

/// Calendar feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar display name (`X-WR-CALNAME`)
    #[serde(default = "defaults::calendar_name")]
    pub name: String,

    /// IANA timezone for event times
    #[serde(default = "defaults::calendar_timezone")]
    pub timezone: String,

    /// Reminder alarm offset before each event, in hours
    #[serde(default = "defaults::reminder_hours")]
    pub reminder_hours: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            name: defaults::calendar_name(),
            timezone: defaults::calendar_timezone(),
            reminder_hours: defaults::reminder_hours(),
        }
    }
}

mod defaults {
    use std::collections::HashMap;

    // Portal defaults
    pub fn base_url() -> String {
        "https://www.u-cursos.cl".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; ucsync/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        250
    }
    pub fn page_retry_limit() -> u32 {
        3
    }
    pub fn retry_backoff() -> u64 {
        500
    }

    // Output defaults
    pub fn output_root() -> String {
        "downloads".into()
    }
    pub fn calendar_file() -> String {
        "calendar.ics".into()
    }

    // Calendar defaults
    pub fn calendar_name() -> String {
        "U-Cursos".into()
    }
    pub fn calendar_timezone() -> String {
        "America/Santiago".into()
    }
    pub fn reminder_hours() -> u32 {
        24
    }

    // Abbreviation defaults; titles fall back to the full course name
    pub fn abbreviations() -> HashMap<String, String> {
        HashMap::from([
            (
                "Análisis Avanzado de Algoritmos".to_string(),
                "Análisis".to_string(),
            ),
            ("Bases de Datos".to_string(), "Batos".to_string()),
            (
                "Matemáticas Discretas para la Computación".to_string(),
                "Discretas".to_string(),
            ),
            (
                "Metodologías de Diseño y Programación".to_string(),
                "Memes".to_string(),
            ),
            (
                "Programación de Software de Sistemas".to_string(),
                "PSS".to_string(),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.portal.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.portal.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_timezone() {
        let mut config = Config::default();
        config.calendar.timezone = "America/Nowhere".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_pathy_calendar_file() {
        let mut config = Config::default();
        config.output.calendar_file = "feeds/calendar.ics".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn abbreviation_falls_back_to_full_name() {
        let config = Config::default();
        assert_eq!(config.abbreviation("Bases de Datos"), "Batos");
        assert_eq!(config.abbreviation("Curso Nuevo"), "Curso Nuevo");
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [portal]
            request_delay_ms = 50

            [output]
            root = "/tmp/u"
        "#,
        )
        .unwrap();
        assert_eq!(config.portal.request_delay_ms, 50);
        assert_eq!(config.output.root, "/tmp/u");
        assert_eq!(config.calendar.name, "U-Cursos");
    }
}
