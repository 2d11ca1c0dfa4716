use crate::Config;
use crate::dates;
use crate::models::Task;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::task_list::priority_color;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Date with its weekday, or the raw value flagged when it does not parse
fn date_text(task: &Task) -> String {
    match task.calendar_date() {
        Some(date) => format!("{} {}", dates::weekday_name(date), dates::format_task_date(date)),
        None => format!("{} (unrecognized)", task.date),
    }
}

fn time_text(task: &Task) -> String {
    match task.clock_time() {
        Some(time) => dates::format_task_time(time),
        None => format!("{} (unrecognized)", task.time),
    }
}

/// Detail lines for one task
pub fn task_detail_lines(task: &Task) -> Vec<Line<'static>> {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let status = if task.is_completed { "Completed" } else { "Open" };

    let mut lines = vec![
        Line::from(vec![Span::styled("Title: ", label), Span::raw(task.title.clone())]),
        Line::from(vec![Span::styled("Date: ", label), Span::raw(date_text(task))]),
        Line::from(vec![Span::styled("Time: ", label), Span::raw(time_text(task))]),
        Line::from(vec![
            Span::styled("Priority: ", label),
            Span::styled(task.priority.to_string(), Style::default().fg(priority_color(&task.priority))),
        ]),
        Line::from(vec![Span::styled("Status: ", label), Span::raw(status)]),
    ];
    if !task.tag.is_empty() {
        lines.push(Line::from(vec![Span::styled("Tag: ", label), Span::raw(task.tag.clone())]));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Description:", label)));
    lines.extend(task.description.lines().map(|line| Line::from(line.to_string())));
    lines
}

pub fn render_item_view(f: &mut Frame, area: Rect, task: Option<&Task>, config: &Config) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    let fg_color = parse_color(&config.get_active_theme().fg);

    let text = match task {
        Some(task) => Text::from(task_detail_lines(task)),
        None => Text::from("No task selected"),
    };

    // trim: false keeps indentation in descriptions
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Task"))
        .style(Style::default().fg(fg_color))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    #[test]
    fn detail_includes_tag_only_when_set() {
        let mut task = Task {
            id: Some(1),
            title: "Plan trip".to_string(),
            description: "book trains\nfind hotel".to_string(),
            date: "20/06/2025".to_string(),
            time: "10:00".to_string(),
            priority: Priority::Low,
            is_completed: false,
            tag: String::new(),
        };
        let without_tag = task_detail_lines(&task);
        task.tag = "travel".to_string();
        let with_tag = task_detail_lines(&task);

        assert_eq!(with_tag.len(), without_tag.len() + 1);
        let last = with_tag.last().map(|line| line.to_string()).unwrap_or_default();
        assert_eq!(last, "find hotel");
    }

    #[test]
    fn malformed_date_and_time_are_flagged() {
        let mut task = Task {
            id: Some(2),
            title: "Old row".to_string(),
            description: "x".to_string(),
            date: "15-05-2025".to_string(),
            time: "9:05".to_string(),
            priority: Priority::Other("Urgent".to_string()),
            is_completed: true,
            tag: String::new(),
        };
        assert_eq!(date_text(&task), "Thursday 15/05/2025");
        assert_eq!(time_text(&task), "09:05");

        task.date = "someday".to_string();
        task.time = "noon".to_string();
        assert_eq!(date_text(&task), "someday (unrecognized)");
        assert_eq!(time_text(&task), "noon (unrecognized)");
    }
}
