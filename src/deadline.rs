use chrono::{DateTime, Duration, FixedOffset, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::models::{Assignment, KadaiRow};

pub const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The portal prints deadlines in Japan Standard Time.
const PORTAL_OFFSET_SECS: i32 = 9 * 3600;
const PORTAL_OFFSET_SUFFIX: &str = "+0900";

static DEADLINE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}$").expect("regex compiles"));

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid deadline {0:?}: expected YYYY-MM-DD HH:MM")]
    Shape(String),
    #[error("invalid deadline {text:?}: {source}")]
    Deadline {
        text: String,
        #[source]
        source: chrono::ParseError,
    },
}

pub fn portal_offset() -> FixedOffset {
    FixedOffset::east_opt(PORTAL_OFFSET_SECS).expect("offset within a day")
}

pub fn parse_deadline(text: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    if !DEADLINE_SHAPE.is_match(text) {
        return Err(ParseError::Shape(text.to_string()));
    }
    let stamped = format!("{text} {PORTAL_OFFSET_SUFFIX}");
    DateTime::parse_from_str(&stamped, &format!("{DEADLINE_FORMAT} %z")).map_err(|source| {
        ParseError::Deadline {
            text: text.to_string(),
            source,
        }
    })
}

pub fn format_deadline(deadline: &DateTime<FixedOffset>) -> String {
    deadline
        .with_timezone(&portal_offset())
        .format(DEADLINE_FORMAT)
        .to_string()
}

#[derive(Debug, Clone, Copy)]
pub struct DeadlineFilter {
    threshold: Duration,
    now: DateTime<Utc>,
}

impl DeadlineFilter {
    pub fn new(threshold: Duration, now: DateTime<Utc>) -> Self {
        Self { threshold, now }
    }

    /// Overdue deadlines count as due soon: their remaining time is negative.
    pub fn is_due_soon(&self, deadline: &DateTime<FixedOffset>) -> bool {
        deadline.with_timezone(&Utc) - self.now < self.threshold
    }

    /// Keeps the rows due inside the window, stopping at the first malformed deadline.
    pub fn apply<I>(&self, rows: I, base: &Url) -> Result<Vec<Assignment>, ParseError>
    where
        I: IntoIterator<Item = KadaiRow>,
    {
        rows.into_iter()
            .filter_map(|row| match parse_deadline(&row.deadline) {
                Ok(deadline) if self.is_due_soon(&deadline) => {
                    Some(Ok(row.into_assignment(deadline, base)))
                }
                Ok(_) => None,
                Err(err) => Some(Err(err)),
            })
            .collect()
    }
}
