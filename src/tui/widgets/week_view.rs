use crate::Config;
use crate::dates;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::views::WeekDay;
use chrono::NaiveDate;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget};

/// Longest bar drawn next to a day's count
const MAX_BAR: usize = 10;

/// "Mon 12/05  ███ 3" style row
pub fn format_week_row(day: &WeekDay, max_count: usize) -> String {
    let bar_len = if max_count == 0 {
        0
    } else {
        (day.count * MAX_BAR).div_ceil(max_count)
    };
    format!(
        "{} {}  {:<width$} {}",
        day.date.format("%a"),
        day.date.format("%d/%m"),
        "█".repeat(bar_len),
        day.count,
        width = MAX_BAR
    )
}

pub fn render_week_view(
    f: &mut Frame,
    area: Rect,
    week: &[WeekDay],
    focused: usize,
    today: NaiveDate,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let max_count = week.iter().map(|day| day.count).max().unwrap_or(0);
    let items: Vec<ListItem> = week
        .iter()
        .map(|day| {
            let style = if day.date == today {
                Style::default().fg(fg_color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(fg_color)
            };
            ListItem::new(format_week_row(day, max_count)).style(style)
        })
        .collect();

    let title = match week.first() {
        Some(monday) => format!("Week of {}", dates::format_task_date(monday.date)),
        None => "Week".to_string(),
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    let mut state = ListState::default();
    state.select(Some(focused.min(week.len().saturating_sub(1))));
    StatefulWidget::render(list, area, f.buffer_mut(), &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_busiest_day() {
        let day = |d, count| WeekDay {
            date: NaiveDate::from_ymd_opt(2025, 5, d).unwrap(),
            count,
        };
        assert_eq!(format_week_row(&day(12, 4), 4), "Mon 12/05  ██████████ 4");
        assert_eq!(format_week_row(&day(13, 1), 4), "Tue 13/05  ███        1");
        assert_eq!(format_week_row(&day(14, 0), 0), "Wed 14/05             0");
    }
}
