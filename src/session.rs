// src/session.rs

//! Authenticated portal session and the fetch/transfer collaborators.
//!
//! The [`Session`] owns the cookie-carrying HTTP client. Pipeline components
//! never talk to it directly; they take the narrow [`PageFetcher`] and
//! [`FileTransfer`] traits so they can run against fakes in tests.

use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::parse_selector;
use crate::utils;

/// Portal credentials, read from the environment before any network traffic.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Read `UCURSOS_USERNAME` / `UCURSOS_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        let username = std::env::var("UCURSOS_USERNAME")
            .map_err(|_| AppError::config("UCURSOS_USERNAME is not set"))?;
        let password = std::env::var("UCURSOS_PASSWORD")
            .map_err(|_| AppError::config("UCURSOS_PASSWORD is not set"))?;

        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::config("portal credentials are empty"));
        }

        Ok(Self { username, password })
    }
}

/// Fetches one page of HTML. Implemented by [`Session`]; faked in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

/// Fetches raw attachment bytes. Implemented by [`Session`]; faked in tests.
#[async_trait]
pub trait FileTransfer: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// An authenticated browsing session on the portal.
pub struct Session {
    client: reqwest::Client,
    base: Url,
    page: String,
    page_url: String,
}

impl Session {
    /// Log into the portal and land on the authenticated home page.
    ///
    /// Posts the login form found on the base page and verifies the course
    /// list is visible afterwards. Rejected credentials surface as
    /// [`AppError::Authentication`]; transport failures keep their HTTP
    /// error.
    pub async fn login(config: &Config, credentials: &Credentials) -> Result<Self> {
        let base = Url::parse(&config.portal.base_url)?;
        let client = reqwest::Client::builder()
            .user_agent(&config.portal.user_agent)
            .timeout(Duration::from_secs(config.portal.timeout_secs))
            .cookie_store(true)
            .build()?;

        log::debug!("Fetching portal login page {base}");
        let landing = client
            .get(base.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if has_course_list(&landing) {
            log::info!("Portal session already authenticated");
            return Ok(Self {
                client,
                page_url: base.to_string(),
                base,
                page: landing,
            });
        }

        let form = extract_login_form(&landing, &base)?;
        let mut fields = form.fields;
        fields.push(("username".to_string(), credentials.username.clone()));
        fields.push(("password".to_string(), credentials.password.clone()));

        log::debug!("Posting credentials to {}", form.action);
        let after_login = client
            .post(&form.action)
            .form(&fields)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        // Some portal variants bounce through an intermediate page; the
        // home page is the authoritative check.
        let home = if has_course_list(&after_login) {
            after_login
        } else {
            client
                .get(base.clone())
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?
        };

        if !has_course_list(&home) {
            return Err(AppError::authentication(
                "portal did not show the course list after login; check credentials",
            ));
        }

        log::info!("Logged into portal as {}", credentials.username);
        Ok(Self {
            client,
            page_url: base.to_string(),
            base,
            page: home,
        })
    }

    /// Portal base URL of this session.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Load `url` and make it the current page.
    pub async fn navigate(&mut self, url: &str) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::navigation(url, e))?;
        let response = response
            .error_for_status()
            .map_err(|e| AppError::navigation(url, e))?;
        let html = response
            .text()
            .await
            .map_err(|e| AppError::navigation(url, e))?;

        if looks_like_login(&html) {
            return Err(AppError::authentication("portal session expired"));
        }

        self.page = html;
        self.page_url = url.to_string();
        Ok(())
    }

    /// HTML of the page most recently navigated to.
    pub fn current_page_html(&self) -> &str {
        &self.page
    }

    /// URL of the page most recently navigated to.
    pub fn current_url(&self) -> &str {
        &self.page_url
    }
}

#[async_trait]
impl PageFetcher for Session {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if looks_like_login(&html) {
            return Err(AppError::authentication("portal session expired"));
        }
        Ok(html)
    }
}

#[async_trait]
impl FileTransfer for Session {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::transfer(url, e))?;
        let response = response
            .error_for_status()
            .map_err(|e| AppError::transfer(url, e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::transfer(url, e))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug)]
struct LoginForm {
    action: String,
    /// Hidden fields carried over into the credential POST
    fields: Vec<(String, String)>,
}

fn extract_login_form(html: &str, page_url: &Url) -> Result<LoginForm> {
    let doc = Html::parse_document(html);
    let form_selector = parse_selector("form")?;
    let input_selector = parse_selector("input")?;

    for form in doc.select(&form_selector) {
        let mut has_username = false;
        let mut has_password = false;
        let mut fields = Vec::new();

        for input in form.select(&input_selector) {
            let Some(name) = input.value().attr("name") else {
                continue;
            };
            match name {
                "username" => has_username = true,
                "password" => has_password = true,
                _ => {
                    if input.value().attr("type") == Some("hidden") {
                        let value = input.value().attr("value").unwrap_or("");
                        fields.push((name.to_string(), value.to_string()));
                    }
                }
            }
        }

        if has_username && has_password {
            let action = form.value().attr("action").unwrap_or("");
            return Ok(LoginForm {
                action: utils::url::resolve_url(page_url, action),
                fields,
            });
        }
    }

    Err(AppError::authentication(
        "login form not found on the portal page",
    ))
}

fn has_course_list(html: &str) -> bool {
    html.contains("id=\"cursos\"") || html.contains("id='cursos'")
}

fn looks_like_login(html: &str) -> bool {
    (html.contains("name=\"password\"") || html.contains("name='password'"))
        && (html.contains("name=\"username\"") || html.contains("name='username'"))
}
