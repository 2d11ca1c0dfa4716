use crate::Config;
use crate::tui::app::Tab;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;

/// Tab title with the extra context each view carries (day shown, overdue count)
pub fn tab_label(tab: Tab, day_label: &str, overdue_count: usize) -> String {
    match tab {
        Tab::Day => format!("{} {}", tab.title(), day_label),
        Tab::Week => tab.title().to_string(),
        Tab::Overdue if overdue_count > 0 => format!("{} ({})", tab.title(), overdue_count),
        Tab::Overdue => tab.title().to_string(),
    }
}

pub fn render_tabs(f: &mut Frame, area: Rect, current_tab: Tab, labels: &[String], config: &Config) {
    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let tab_bg = parse_color(&active_theme.tab_bg);

    // Readable on whatever gray the terminal renders for tab_bg
    let tab_fg = get_contrast_text_color(tab_bg);

    // Padded background spans make each tab look like a box
    let titles: Vec<Line> = labels
        .iter()
        .map(|label| {
            Line::from(vec![
                Span::styled("  ", Style::default().bg(tab_bg)),
                Span::styled(label.clone(), Style::default().fg(tab_fg).bg(tab_bg)),
                Span::styled("  ", Style::default().bg(tab_bg)),
            ])
        })
        .collect();

    let highlight_fg = get_contrast_text_color(highlight_bg);

    let tabs = Tabs::new(titles)
        .select(current_tab.index())
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .divider("  ")
        .padding("", "");

    f.render_widget(tabs, area);
}
