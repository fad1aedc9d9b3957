use std::sync::Arc;

use once_cell::sync::Lazy;
use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::settings::Settings;

static PASSWORD_FIELD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"form input[name="password"]"#).expect("selector parses"));

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("login returned status {0}")]
    Status(StatusCode),
    #[error("portal rejected the credentials")]
    Rejected,
    #[error("session cookie {0:?} was not set")]
    MissingCookie(String),
}

/// A logged-in portal session; the client carries the session cookies.
#[derive(Clone)]
pub struct PortalSession {
    client: reqwest::Client,
    jar: Arc<Jar>,
}

impl PortalSession {
    pub async fn login(settings: &Settings) -> Result<Self, AuthError> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()?;

        info!(url = %settings.login_url, "logging into portal");
        let response = client
            .post(settings.login_url.as_str())
            .form(&[
                ("userid", settings.manaba_id.as_str()),
                ("password", settings.manaba_pass.as_str()),
                ("login", "ログイン"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AuthError::Status(status));
        }
        let landing = response.url().clone();
        let body = response.text().await?;
        if shows_login_form(&body) {
            return Err(AuthError::Rejected);
        }

        let session = Self { client, jar };
        if !session.has_cookie(&landing, &settings.session_cookie) {
            return Err(AuthError::MissingCookie(settings.session_cookie.clone()));
        }
        debug!(landing = %landing, "portal session established");
        Ok(session)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    fn has_cookie(&self, url: &Url, name: &str) -> bool {
        let Some(header) = self.jar.cookies(url) else {
            return false;
        };
        let Ok(cookies) = header.to_str() else {
            return false;
        };
        cookies
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(key, _)| key == name)
    }
}

fn shows_login_form(html: &str) -> bool {
    let document = Html::parse_document(html);
    document.select(&PASSWORD_FIELD).next().is_some()
}
