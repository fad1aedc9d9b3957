use thiserror::Error;

use crate::auth::AuthError;
use crate::deadline::ParseError;
use crate::notify::NotifyError;
use crate::scraper::FetchError;

/// A pipeline failure tagged with the step that produced it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("login: {0}")]
    Login(#[source] AuthError),
    #[error("fetch: {0}")]
    Fetch(#[source] FetchError),
    #[error("parse: {0}")]
    Parse(#[source] ParseError),
    #[error("notify: {0}")]
    Notify(#[source] NotifyError),
}

impl PipelineError {
    pub fn step(&self) -> &'static str {
        match self {
            PipelineError::Login(_) => "login",
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Parse(_) => "parse",
            PipelineError::Notify(_) => "notify",
        }
    }
}

impl From<AuthError> for PipelineError {
    fn from(value: AuthError) -> Self {
        PipelineError::Login(value)
    }
}

impl From<FetchError> for PipelineError {
    fn from(value: FetchError) -> Self {
        PipelineError::Fetch(value)
    }
}

impl From<ParseError> for PipelineError {
    fn from(value: ParseError) -> Self {
        PipelineError::Parse(value)
    }
}

impl From<NotifyError> for PipelineError {
    fn from(value: NotifyError) -> Self {
        PipelineError::Notify(value)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_display_is_step_prefixed() {
        let err = PipelineError::from(AuthError::Rejected);
        assert_eq!(err.step(), "login");
        assert!(err.to_string().starts_with("login: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_parse_error_wraps_deadline_text() {
        let err: PipelineError = crate::deadline::parse_deadline("next friday")
            .unwrap_err()
            .into();
        assert_eq!(err.step(), "parse");
        assert!(err.to_string().contains("next friday"));
    }
}
