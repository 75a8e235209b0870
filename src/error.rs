// src/error.rs

//! Unified error handling for the synchronizer.

use std::fmt;

use thiserror::Error;

/// Result type alias for synchronizer operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Portal login failed or the session expired
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Page navigation failed
    #[error("Navigation error for {url}: {message}")]
    Navigation { url: String, message: String },

    /// Attachment byte transfer failed
    #[error("Transfer error for {url}: {message}")]
    Transfer { url: String, message: String },

    /// Feed page fetch failed after retries
    #[error("Page fetch error on page {page}: {message}")]
    PageFetch { page: u32, message: String },

    /// Markup did not match the expected portal structure
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create a navigation error with the target URL.
    pub fn navigation(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a transfer error with the source URL.
    pub fn transfer(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transfer {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a page fetch error with the page number.
    pub fn page_fetch(page: u32, message: impl fmt::Display) -> Self {
        Self::PageFetch {
            page,
            message: message.to_string(),
        }
    }

    /// Create a parse error with context.
    pub fn parse(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
