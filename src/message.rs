use url::Url;

use crate::deadline::format_deadline;
use crate::models::Assignment;

pub const NO_ASSIGNMENTS: &str = "直近の課題はありません";
pub const UPCOMING_HEADER: &str = "期限が迫っている課題があります";

/// Renders the notification text for the retained assignments.
#[derive(Clone, Debug)]
pub struct MessageFormatter {
    list_url: Url,
    show_deadline: bool,
}

impl MessageFormatter {
    pub fn new(list_url: Url, show_deadline: bool) -> Self {
        Self {
            list_url,
            show_deadline,
        }
    }

    pub fn render(&self, assignments: &[Assignment]) -> String {
        let mut message = MessageBuilder::default();
        if assignments.is_empty() {
            message.section(NO_ASSIGNMENTS);
            return message.build();
        }

        message.section(UPCOMING_HEADER);
        for assignment in assignments {
            message.section(self.block(assignment));
        }
        message.section(self.list_url.as_str());
        message.build()
    }

    fn block(&self, assignment: &Assignment) -> String {
        let mut lines = vec![
            assignment.title.clone(),
            format!("({})", assignment.course),
        ];
        if self.show_deadline {
            lines.push(format!("締め切り:{}", format_deadline(&assignment.deadline)));
        }
        lines.join("\n")
    }
}

/// Sections separated by blank lines. The leading newline keeps the text
/// off the sender-name line the notify service prepends.
#[derive(Default)]
struct MessageBuilder {
    sections: Vec<String>,
}

impl MessageBuilder {
    fn section(&mut self, text: impl Into<String>) {
        self.sections.push(text.into());
    }

    fn build(self) -> String {
        format!("\n{}", self.sections.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use crate::deadline::parse_deadline;

    use super::*;

    fn list_url() -> Url {
        Url::parse("https://room.chuo-u.ac.jp/ct/home_library_query").unwrap()
    }

    fn assignment(title: &str, course: &str, deadline: &str) -> Assignment {
        Assignment {
            title: title.to_string(),
            title_link: None,
            course: course.to_string(),
            course_link: None,
            deadline: parse_deadline(deadline).unwrap(),
        }
    }

    #[test]
    fn test_render_empty() {
        let formatter = MessageFormatter::new(list_url(), true);
        assert_eq!(formatter.render(&[]), "\n直近の課題はありません");
    }

    #[test]
    fn test_render_with_deadlines() {
        let formatter = MessageFormatter::new(list_url(), true);
        let body = formatter.render(&[
            assignment("レポート1", "線形代数", "2025-07-01 23:59"),
            assignment("小テスト", "物理学", "2025-07-02 10:00"),
        ]);

        assert_eq!(
            body,
            "\n期限が迫っている課題があります\n\n\
             レポート1\n(線形代数)\n締め切り:2025-07-01 23:59\n\n\
             小テスト\n(物理学)\n締め切り:2025-07-02 10:00\n\n\
             https://room.chuo-u.ac.jp/ct/home_library_query"
        );
    }

    #[test]
    fn test_render_without_deadline_line() {
        let formatter = MessageFormatter::new(list_url(), false);
        let body = formatter.render(&[assignment("レポート1", "線形代数", "2025-07-01 23:59")]);

        assert!(!body.contains("締め切り"));
        assert!(body.contains("レポート1\n(線形代数)\n\nhttps://"));
    }
}
