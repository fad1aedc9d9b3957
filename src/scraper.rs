use once_cell::sync::Lazy;
use reqwest::StatusCode;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::auth::PortalSession;
use crate::models::KadaiRow;

static ROW_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"tr[class]:not([class="title"])"#).expect("selector parses")
});
static DEADLINE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.center.td-period").expect("selector parses"));
static INFO_CELL_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td:not([class])").expect("selector parses"));
static LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("selector parses"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("status code is not 200 but {0}")]
    Status(StatusCode),
}

pub struct KadaiScraper<'a> {
    session: &'a PortalSession,
    list_url: &'a Url,
}

impl<'a> KadaiScraper<'a> {
    pub fn new(session: &'a PortalSession, list_url: &'a Url) -> Self {
        Self { session, list_url }
    }

    pub async fn fetch_list_page(&self) -> Result<String, FetchError> {
        info!(url = %self.list_url, "fetching assignment list");
        let response = self
            .session
            .client()
            .get(self.list_url.as_str())
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status));
        }
        let body = response.text().await?;
        Ok(body)
    }
}

/// Yields one row per assignment in document order, skipping rows without a deadline.
pub fn extract_rows(document: &Html) -> impl Iterator<Item = KadaiRow> + '_ {
    document.select(&ROW_SEL).filter_map(|row| {
        let deadline = row
            .select(&DEADLINE_SEL)
            .last()
            .map(|cell| cell_text(&cell))
            .unwrap_or_default();
        if deadline.is_empty() {
            return None;
        }

        let cells: Vec<ElementRef> = row.select(&INFO_CELL_SEL).collect();
        let (title, title_href) = cells.first().map(label_and_href).unwrap_or_default();
        let (course, course_href) = cells.last().map(label_and_href).unwrap_or_default();

        Some(KadaiRow {
            title,
            title_href,
            course,
            course_href,
            deadline,
        })
    })
}

fn cell_text(element: &ElementRef) -> String {
    element.text().collect::<Vec<_>>().join("").trim().to_string()
}

fn label_and_href(cell: &ElementRef) -> (String, Option<String>) {
    match cell.select(&LINK_SEL).next() {
        Some(link) => (
            cell_text(&link),
            link.value().attr("href").map(str::to_string),
        ),
        None => (cell_text(cell), None),
    }
}
