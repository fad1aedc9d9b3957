pub mod auth;
pub mod deadline;
pub mod error;
pub mod message;
pub mod models;
pub mod notify;
pub mod report;
pub mod scraper;
pub mod settings;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::auth::PortalSession;
use crate::deadline::DeadlineFilter;
use crate::error::PipelineError;
use crate::message::MessageFormatter;
use crate::models::Assignment;
use crate::notify::{DEFAULT_NOTIFY_URL, Notifier};
use crate::report::{FailureReporter, INIT_ALERT_MESSAGE, LoggingError};
use crate::scraper::{KadaiScraper, extract_rows};
use crate::settings::Settings;

/// What a successful run delivered.
#[derive(Debug)]
pub struct RunOutcome {
    pub assignments: Vec<Assignment>,
    pub message: String,
}

#[derive(Debug)]
pub enum RunReport {
    Delivered(RunOutcome),
    /// The pipeline failed and the failure went through the reporter.
    Reported(PipelineError),
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            init_tracing(false);
            error!(error = %err, "failed to load settings");
            alert_init_failure().await;
            return Err(err.into());
        }
    };
    init_tracing(settings.debug);

    let log_path = match settings.error_log_path() {
        Ok(path) => path,
        Err(err) => {
            error!(error = %err, "failed to resolve error log path");
            alert_init_failure().await;
            return Err(err.into());
        }
    };

    match notify_once(&settings, log_path, Utc::now()).await? {
        RunReport::Delivered(outcome) => {
            info!(count = outcome.assignments.len(), "notification delivered");
        }
        RunReport::Reported(failure) => {
            info!(step = failure.step(), "failure reported");
        }
    }
    Ok(())
}

fn init_tracing(debug: bool) {
    let env_filter = if debug { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .try_init();
}

/// Runs the pipeline once and routes any failure to the reporter.
/// Only a failure to write the diagnostic log escapes.
pub async fn notify_once(
    settings: &Settings,
    log_path: PathBuf,
    now: DateTime<Utc>,
) -> Result<RunReport, LoggingError> {
    let notifier = Notifier::new(settings.notify_url.clone());
    match check_deadlines(settings, &notifier, now).await {
        Ok(outcome) => Ok(RunReport::Delivered(outcome)),
        Err(failure) => {
            FailureReporter::new(&notifier, &settings.token_err, log_path)
                .report(&failure)
                .await?;
            Ok(RunReport::Reported(failure))
        }
    }
}

pub async fn check_deadlines(
    settings: &Settings,
    notifier: &Notifier,
    now: DateTime<Utc>,
) -> Result<RunOutcome, PipelineError> {
    let session = PortalSession::login(settings).await?;
    let html = KadaiScraper::new(&session, &settings.list_url)
        .fetch_list_page()
        .await?;

    let assignments = {
        let document = ::scraper::Html::parse_document(&html);
        DeadlineFilter::new(settings.lookahead(), now)
            .apply(extract_rows(&document), &settings.list_url)?
    };
    for assignment in &assignments {
        debug!(
            title = %assignment.title,
            course = %assignment.course,
            deadline = %assignment.deadline,
            "assignment due soon"
        );
    }
    info!(
        count = assignments.len(),
        lookahead_hours = settings.lookahead_hours,
        "assignments inside lookahead window"
    );

    let message = MessageFormatter::new(settings.list_url.clone(), settings.show_deadline)
        .render(&assignments);
    notifier.send(&message, settings.message_token()).await?;

    Ok(RunOutcome {
        assignments,
        message,
    })
}

/// Best-effort alert when settings cannot be built; reads the token straight from the environment.
async fn alert_init_failure() {
    let Ok(token) = std::env::var("TOKEN_ERR") else {
        warn!("TOKEN_ERR is not set, skipping alert");
        return;
    };
    let endpoint = std::env::var("KADAI_NOTIFY_URL")
        .ok()
        .and_then(|url| Url::parse(&url).ok())
        .or_else(|| Url::parse(DEFAULT_NOTIFY_URL).ok());
    let Some(endpoint) = endpoint else {
        return;
    };
    if let Err(err) = Notifier::new(endpoint).send(INIT_ALERT_MESSAGE, &token).await {
        warn!(error = %err, "failed to send alert");
    }
}
