use chrono::{DateTime, FixedOffset};
use url::Url;

/// One assignment listed on the portal, alive for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub title: String,
    pub title_link: Option<Url>,
    pub course: String,
    pub course_link: Option<Url>,
    pub deadline: DateTime<FixedOffset>,
}

/// Raw cell contents of one assignment row, before deadline parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KadaiRow {
    pub title: String,
    pub title_href: Option<String>,
    pub course: String,
    pub course_href: Option<String>,
    pub deadline: String,
}

impl KadaiRow {
    /// Builds the assignment once the deadline has been parsed, resolving links against `base`.
    pub fn into_assignment(self, deadline: DateTime<FixedOffset>, base: &Url) -> Assignment {
        let resolve = |href: Option<String>| href.and_then(|h| base.join(&h).ok());
        Assignment {
            title: self.title,
            title_link: resolve(self.title_href),
            course: self.course,
            course_link: resolve(self.course_href),
            deadline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_assignment_resolves_relative_links() {
        let base = Url::parse("https://room.chuo-u.ac.jp/ct/home_library_query").unwrap();
        let deadline = DateTime::parse_from_rfc3339("2025-07-01T23:59:00+09:00").unwrap();
        let row = KadaiRow {
            title: "Report 3".to_string(),
            title_href: Some("course_1234_report_5678".to_string()),
            course: "Linear Algebra".to_string(),
            course_href: Some("/ct/course_1234".to_string()),
            deadline: "2025-07-01 23:59".to_string(),
        };

        let assignment = row.into_assignment(deadline, &base);
        assert_eq!(
            assignment.title_link.unwrap().as_str(),
            "https://room.chuo-u.ac.jp/ct/course_1234_report_5678"
        );
        assert_eq!(
            assignment.course_link.unwrap().as_str(),
            "https://room.chuo-u.ac.jp/ct/course_1234"
        );
        assert_eq!(assignment.deadline, deadline);
    }

    #[test]
    fn test_into_assignment_without_links() {
        let base = Url::parse("https://example.com/list").unwrap();
        let deadline = DateTime::parse_from_rfc3339("2025-07-01T10:00:00+09:00").unwrap();
        let row = KadaiRow {
            title: "Quiz".to_string(),
            title_href: None,
            course: "Physics".to_string(),
            course_href: None,
            deadline: "2025-07-01 10:00".to_string(),
        };
        let assignment = row.into_assignment(deadline, &base);
        assert!(assignment.title_link.is_none());
        assert!(assignment.course_link.is_none());
    }
}
