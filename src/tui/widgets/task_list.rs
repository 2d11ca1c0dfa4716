use crate::Config;
use crate::models::{Priority, Task};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget,
};

/// Marker color for each priority tier
pub fn priority_color(priority: &Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
        Priority::Other(_) => Color::Gray,
    }
}

/// One list row: status, time, title, and the date when the list spans several days
pub fn format_task_row(task: &Task, show_date: bool, max_width: usize) -> String {
    let status_indicator = if task.is_completed { "✓" } else { "○" };
    let mut row = if show_date {
        format!("{} {} {} {}", status_indicator, task.date, task.time, task.title)
    } else {
        format!("{} {} {}", status_indicator, task.time, task.title)
    };
    if !task.tag.is_empty() {
        row.push_str(&format!(" #{}", task.tag));
    }
    if row.chars().count() > max_width {
        row = row.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
    }
    row
}

pub fn render_task_list(
    f: &mut Frame,
    area: Rect,
    title: &str,
    tasks: &[Task],
    show_date: bool,
    list_state: &mut ListState,
    config: &Config,
) {
    // Borders, padding and the priority marker
    let max_width = area.width.saturating_sub(6) as usize;

    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            let mut text_style = Style::default().fg(fg_color);
            if task.is_completed {
                text_style = text_style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
            }
            ListItem::new(Line::from(vec![
                Span::styled("▌ ", Style::default().fg(priority_color(&task.priority))),
                Span::styled(format_task_row(task, show_date, max_width), text_style),
            ]))
        })
        .collect();

    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    let total_items = items.len();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!("{} ({})", title, tasks.len())))
        .style(Style::default().fg(fg_color))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    let visible_items = list_area.height.saturating_sub(2) as usize;
    if total_items > visible_items && scrollbar_area.width > 0 && list_area.height > 2 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1,
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );

        let selected_index = list_state.selected().unwrap_or(0);
        let scroll_position = selected_index.saturating_sub(visible_items.saturating_sub(1));

        let mut scrollbar_state = ScrollbarState::new(total_items)
            .viewport_content_length(visible_items)
            .position(scroll_position);

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}
