use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::notify::DEFAULT_NOTIFY_URL;

#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    pub manaba_id: String,
    pub manaba_pass: String,
    pub token_err: String,
    pub notify_token: Option<String>,
    pub login_url: Url,
    pub list_url: Url,
    pub notify_url: Url,
    pub session_cookie: String,
    pub lookahead_hours: i64,
    pub show_deadline: bool,
    pub error_log: Option<PathBuf>,
    pub debug: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Tunables come from KADAI_* variables
            .add_source(Environment::with_prefix("KADAI").try_parsing(true))
            .set_default("login_url", "https://room.chuo-u.ac.jp/ct/login")?
            .set_default("list_url", "https://room.chuo-u.ac.jp/ct/home_library_query")?
            .set_default("notify_url", DEFAULT_NOTIFY_URL)?
            .set_default("session_cookie", "sessionid")?
            .set_default("lookahead_hours", 48)?
            .set_default("show_deadline", true)?
            .set_default("debug", false)?
            // Credentials keep their historical unprefixed names
            .set_override_option("manaba_id", std::env::var("MANABA_ID").ok())?
            .set_override_option("manaba_pass", std::env::var("MANABA_PASS").ok())?
            .set_override_option("token_err", std::env::var("TOKEN_ERR").ok())?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        if chrono::Duration::try_hours(settings.lookahead_hours).is_none() {
            return Err(ConfigError::Message(format!(
                "lookahead_hours {} is out of range",
                settings.lookahead_hours
            )));
        }
        Ok(settings)
    }

    /// Token used for the regular deadline message.
    pub fn message_token(&self) -> &str {
        self.notify_token.as_deref().unwrap_or(&self.token_err)
    }

    pub fn lookahead(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.lookahead_hours).unwrap_or(chrono::Duration::MAX)
    }

    /// Resolves the diagnostic log location, defaulting to `err.log` beside the executable.
    pub fn error_log_path(&self) -> std::io::Result<PathBuf> {
        if let Some(path) = &self.error_log {
            return Ok(path.clone());
        }
        let exe = std::env::current_exe()?;
        let dir = exe.parent().map(PathBuf::from).unwrap_or_default();
        Ok(dir.join("err.log"))
    }
}

// Credentials stay out of debug output.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("manaba_id", &self.manaba_id)
            .field("login_url", &self.login_url.as_str())
            .field("list_url", &self.list_url.as_str())
            .field("notify_url", &self.notify_url.as_str())
            .field("session_cookie", &self.session_cookie)
            .field("lookahead_hours", &self.lookahead_hours)
            .field("show_deadline", &self.show_deadline)
            .field("error_log", &self.error_log)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
