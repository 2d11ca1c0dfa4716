use crate::Config;
use crate::models::Priority;
use crate::tui::app::{FormField, TaskForm};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::task_list::priority_color;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

/// Field order and titles as drawn top to bottom
const FIELDS: [(FormField, &str); 6] = [
    (FormField::Title, "Title"),
    (FormField::Description, "Description"),
    (FormField::Date, "Date (DD/MM/YYYY)"),
    (FormField::Time, "Time (HH:MM)"),
    (FormField::Priority, "Priority"),
    (FormField::Tag, "Tag (optional)"),
];

/// Text shown in the priority selector
pub fn priority_choice_label(priority: &Priority, is_active: bool) -> String {
    if is_active {
        format!("< {} >", priority)
    } else {
        priority.to_string()
    }
}

fn editor_for(form: &TaskForm, field: FormField) -> Option<&Editor> {
    match field {
        FormField::Title => Some(&form.title),
        FormField::Description => Some(&form.description),
        FormField::Date => Some(&form.date),
        FormField::Time => Some(&form.time),
        FormField::Priority => None,
        FormField::Tag => Some(&form.tag),
    }
}

pub fn render_task_form(f: &mut Frame, area: Rect, form: &TaskForm, config: &Config) {
    if area.width < 2 || area.height < 2 {
        return;
    }

    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };
    let highlight_style = Style::default().bg(highlight_bg).fg(highlight_fg);
    let inactive_field_style = Style::default()
        .fg(parse_color(&active_theme.fg))
        .add_modifier(Modifier::DIM);

    let outer_title = if form.editing_item_id.is_some() { "Edit Task" } else { "New Task" };
    let outer = Block::default().borders(Borders::ALL).title(outer_title);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    // Each single-line field: border top + content + border bottom
    let mut constraints = vec![Constraint::Length(3); FIELDS.len()];
    constraints.push(Constraint::Min(0));
    let field_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (index, (field, title)) in FIELDS.iter().enumerate() {
        let field_area = field_areas[index];
        if field_area.height == 0 {
            continue;
        }
        let is_active = form.current_field == *field;
        let style = if is_active { highlight_style } else { inactive_field_style };
        let viewport_width = field_area.width.saturating_sub(2) as usize;

        let line = match editor_for(form, *field) {
            Some(editor) => Line::from(Span::styled(editor.visible_text(viewport_width), style)),
            None => Line::from(Span::styled(
                priority_choice_label(&form.priority, is_active),
                style.fg(priority_color(&form.priority)),
            )),
        };
        let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(*title));
        f.render_widget(paragraph, field_area);

        if is_active {
            if let Some((x, y)) = editor_for(form, *field).and_then(|editor| editor.get_cursor_screen_pos(field_area)) {
                f.set_cursor_position((x, y));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_priority_shows_arrows() {
        assert_eq!(priority_choice_label(&Priority::Medium, true), "< Medium >");
        assert_eq!(priority_choice_label(&Priority::Low, false), "Low");
    }

    #[test]
    fn priority_field_has_no_editor() {
        let form = TaskForm::new_for(chrono::NaiveDate::from_ymd_opt(2025, 5, 14).unwrap());
        assert!(editor_for(&form, FormField::Priority).is_none());
        assert_eq!(editor_for(&form, FormField::Date).map(Editor::value), Some("14/05/2025".to_string()));
    }
}
