use crate::dates;
use crate::tui::app::{Mode, Tab};
use crate::tui::widgets::{
    color::parse_color,
    form::render_task_form,
    help::render_help,
    item_view::render_item_view,
    status_bar::render_status_bar,
    tabs::{render_tabs, tab_label},
    task_list::render_task_list,
    week_view::render_week_view,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display as key;
use crate::views;
use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};
use std::time::Instant;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Taskmaster")
        .title_alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(parse_color(&active_theme.fg))
                .bg(parse_color(&active_theme.bg)),
        );
    f.render_widget(outer_block, f.area());

    let day_label = app.selected_date.format("%a %d/%m/%Y").to_string();
    let overdue_count = views::overdue(&app.tasks, app.today).len();
    let labels: Vec<String> = Tab::ALL
        .iter()
        .map(|tab| tab_label(*tab, &day_label, overdue_count))
        .collect();
    render_tabs(f, layout.tabs_area, app.current_tab, &labels, &app.config);

    let visible = app.visible_tasks();
    let selected = visible.get(app.selected_index).cloned();

    match app.current_tab {
        Tab::Day => {
            let title = if app.selected_date == app.today {
                "Today".to_string()
            } else {
                dates::weekday_name(app.selected_date)
            };
            render_task_list(f, layout.sidebar_area, &title, &visible, false, &mut app.list_state, &app.config);
        }
        Tab::Week => {
            let week = app.week_overview();
            render_week_view(f, layout.sidebar_area, &week, app.week_index, app.today, &app.config);
        }
        Tab::Overdue => {
            render_task_list(f, layout.sidebar_area, "Overdue", &visible, true, &mut app.list_state, &app.config);
        }
    }

    match (&app.mode, &app.form) {
        (Mode::Form, Some(form)) => render_task_form(f, layout.main_area, form, &app.config),
        _ if app.current_tab == Tab::Week => {
            let title = dates::format_task_date(app.week_focus_date());
            render_task_list(f, layout.main_area, &title, &visible, false, &mut app.list_state, &app.config);
        }
        _ => render_item_view(f, layout.main_area, selected.as_ref(), &app.config),
    }

    if app.mode == Mode::Help {
        render_help(f, f.area(), &app.config);
    }

    // An open undo window takes over the status bar until it closes
    let now = Instant::now();
    let message = app.undo_prompt(now).or_else(|| app.status.message.clone());
    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, message.as_deref(), &key_hints, &app.config);
}

fn get_key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    match app.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", key(&kb.help))],
        Mode::Form => vec![
            "Tab/Enter: Next field".to_string(),
            "Shift+Tab: Previous field".to_string(),
            "←/→: Priority".to_string(),
            format!("{}: Save", key(&kb.save)),
            "Esc: Cancel".to_string(),
        ],
        Mode::View => {
            let mut hints = vec![
                format!("{}: Quit", key(&kb.quit)),
                format!("{}: New", key(&kb.new)),
                format!("{}: Edit", key(&kb.edit)),
                format!("{}: Done", key(&kb.toggle_complete)),
                format!("{}: Delete", key(&kb.delete)),
            ];
            match app.current_tab {
                Tab::Day => {
                    hints.push(format!("{}/{}: Day", key(&kb.prev_day), key(&kb.next_day)));
                    hints.push(format!("{}: Today", key(&kb.today)));
                }
                Tab::Week => {
                    hints.push(format!("{}/{}: Day", key(&kb.prev_day), key(&kb.next_day)));
                    hints.push(format!("{}: Open day", key(&kb.select)));
                }
                Tab::Overdue => {}
            }
            hints.push(format!("{}: Share", key(&kb.share)));
            hints.push(format!("{}: Help", key(&kb.help)));
            hints
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, Database};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;

    fn draw(app: &mut App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let layout = Layout::calculate(Rect::new(0, 0, 100, 30));
        terminal.draw(|f| render(f, app, &layout)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn renders_tabs_and_hints() {
        let mut app = App::new(Config::default(), Database::open_in_memory().unwrap()).unwrap();
        let screen = draw(&mut app);
        assert!(screen.contains("Taskmaster"));
        assert!(screen.contains("Week"));
        assert!(screen.contains("Overdue"));
        assert!(screen.contains("q: Quit"));
        assert!(screen.contains("No task selected"));
    }

    #[test]
    fn form_replaces_detail_pane() {
        let mut app = App::new(Config::default(), Database::open_in_memory().unwrap()).unwrap();
        app.enter_create_mode();
        let screen = draw(&mut app);
        assert!(screen.contains("New Task"));
        assert!(screen.contains("Date (DD/MM/YYYY)"));
        assert!(screen.contains("Esc: Cancel"));
    }
}
