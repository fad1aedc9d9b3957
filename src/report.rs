use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;
use thiserror::Error;
use tracing::{error, warn};

use crate::error::PipelineError;
use crate::notify::Notifier;

pub const ALERT_MESSAGE: &str = "notifyKadaiに重大エラーが発生しました。";
pub const INIT_ALERT_MESSAGE: &str = "notifyKadaiに重大なエラーが発生しました";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Terminal sink for pipeline failures: one alert on the error channel, one log entry.
pub struct FailureReporter<'a> {
    notifier: &'a Notifier,
    token: &'a str,
    log_path: PathBuf,
}

impl<'a> FailureReporter<'a> {
    pub fn new(notifier: &'a Notifier, token: &'a str, log_path: PathBuf) -> Self {
        Self {
            notifier,
            token,
            log_path,
        }
    }

    pub async fn report(&self, failure: &PipelineError) -> Result<(), LoggingError> {
        error!(step = failure.step(), error = %failure, "run failed");

        let alert = self.notifier.send(ALERT_MESSAGE, self.token).await;
        if let Err(err) = &alert {
            warn!(error = %err, "failed to send alert");
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|source| LoggingError::Open {
                path: self.log_path.clone(),
                source,
            })?;

        let mut lines = vec!["start".to_string()];
        if let Err(err) = alert {
            lines.push(err.to_string());
        }
        lines.push(failure.to_string());
        lines.push("end".to_string());

        write_entry(&mut file, &lines).map_err(|source| LoggingError::Write {
            path: self.log_path.clone(),
            source,
        })
    }
}

fn write_entry(file: &mut File, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(file, "{} {line}", Local::now().format("%Y/%m/%d %H:%M:%S"))?;
    }
    writeln!(file)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::auth::AuthError;

    #[tokio::test]
    async fn test_report_writes_entry_even_if_alert_fails() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("err.log");
        // Nothing listens on port 9 locally, so the alert fails to send.
        let notifier = Notifier::new(Url::parse("http://127.0.0.1:9/api/notify").unwrap());
        let reporter = FailureReporter::new(&notifier, "err-token", log_path.clone());

        reporter
            .report(&PipelineError::from(AuthError::Rejected))
            .await
            .unwrap();

        let log = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<_> = log.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with(" start"));
        assert!(lines[1].contains("HTTP error"));
        assert!(lines[2].ends_with("login: portal rejected the credentials"));
        assert!(lines[3].ends_with(" end"));
        assert_eq!(lines[4], "");
    }

    #[tokio::test]
    async fn test_report_fails_when_log_cannot_open() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("missing").join("err.log");
        let notifier = Notifier::new(Url::parse("http://127.0.0.1:9/api/notify").unwrap());
        let reporter = FailureReporter::new(&notifier, "err-token", log_path);

        let err = reporter
            .report(&PipelineError::from(AuthError::Rejected))
            .await
            .unwrap_err();
        assert!(matches!(err, LoggingError::Open { .. }));
    }
}
