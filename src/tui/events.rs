use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;
use std::time::{Duration, Instant};

use crate::config::KeyBindings;
use crate::tui::App;
use crate::tui::app::{FormField, Mode, Tab};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::utils::{ParsedKeyBinding, parse_key_binding};

/// Restores the terminal even if the event loop panics.
/// Leaving raw mode or the alternate screen active would make the shell unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore on normal exit; the guard does nothing on drop afterwards
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Already on a cleanup path, errors are ignored
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check the size before entering the alternate screen so the error is readable
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;
    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        let now = Instant::now();
        app.drain_snapshots();
        app.tick(now);

        let size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, size.width, size.height);
        let layout = Layout::calculate(terminal_rect);

        // Keep the focused field's cursor visible before drawing
        let field_width = layout.main_area.width.saturating_sub(2) as usize;
        if let Some(editor) = app.get_current_form_editor() {
            editor.update_horizontal_scroll(field_width);
        }

        terminal.draw(|f| crate::tui::render::render(f, &mut app, &layout))?;

        // Only Press events; Windows also reports Release
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    if handle_key_event(&mut app, key_event)? {
                        break;
                    }
                }
                // Layout is recomputed from terminal.size() on the next frame
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    guard.restore()?;
    Ok(())
}

fn binding(
    app: &App,
    select: impl Fn(&KeyBindings) -> &String,
) -> Result<ParsedKeyBinding, TuiError> {
    parse_key_binding(select(&app.config.key_bindings)).map_err(TuiError::KeyBindingError)
}

/// Route a key press; returns true when the app should quit
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match app.mode {
        Mode::Form => handle_form_mode(app, key_event),
        Mode::Help => handle_help_mode(app, key_event),
        Mode::View => handle_view_mode(app, key_event),
    }
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let help = binding(app, |kb| &kb.help)?;
    if key_event.code == KeyCode::Esc || help.matches(&key_event) {
        app.exit_help_mode();
    }
    // Everything else is swallowed while the popup is open
    Ok(false)
}

fn handle_form_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let save = binding(app, |kb| &kb.save)?;
    if save.matches(&key_event) {
        if let Err(e) = app.save_form() {
            tracing::error!(error = %e, "failed to save task");
            app.set_status_message(format!("Unexpected error while saving: {}", e));
        }
        return Ok(false);
    }

    let on_priority = app
        .form
        .as_ref()
        .map(|form| form.current_field == FormField::Priority)
        .unwrap_or(false);

    match key_event.code {
        KeyCode::Esc => app.exit_form(),
        KeyCode::Tab | KeyCode::Enter | KeyCode::Down => app.navigate_form_field(true),
        KeyCode::BackTab | KeyCode::Up => app.navigate_form_field(false),
        KeyCode::Left if on_priority => app.cycle_form_priority(false),
        KeyCode::Right if on_priority => app.cycle_form_priority(true),
        code => {
            if let Some(editor) = app.get_current_form_editor() {
                match code {
                    KeyCode::Char(ch) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                        editor.insert_char(ch)
                    }
                    KeyCode::Backspace => editor.delete_char(),
                    KeyCode::Delete => editor.delete_forward(),
                    KeyCode::Left => editor.move_cursor_left(),
                    KeyCode::Right => editor.move_cursor_right(),
                    KeyCode::Home => editor.move_cursor_home(),
                    KeyCode::End => editor.move_cursor_end(),
                    _ => {}
                }
            }
        }
    }
    Ok(false)
}

fn handle_view_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let now = Instant::now();

    if binding(app, |kb| &kb.quit)?.matches(&key_event) {
        return Ok(true);
    }
    if key_event.code == KeyCode::Esc {
        app.dismiss_undo();
    } else if binding(app, |kb| &kb.help)?.matches(&key_event) {
        app.enter_help_mode();
    } else if binding(app, |kb| &kb.new)?.matches(&key_event) {
        app.enter_create_mode();
    } else if binding(app, |kb| &kb.edit)?.matches(&key_event) {
        app.enter_edit_mode();
    } else if binding(app, |kb| &kb.delete)?.matches(&key_event) {
        if let Err(e) = app.delete_selected(now) {
            tracing::error!(error = %e, "failed to delete task");
            app.set_status_message(format!("Failed to delete task: {}", e));
        }
    } else if binding(app, |kb| &kb.undo)?.matches(&key_event) {
        if let Err(e) = app.undo_delete(now) {
            tracing::error!(error = %e, "failed to restore task");
            app.set_status_message(format!("Failed to restore task: {}", e));
        }
    } else if binding(app, |kb| &kb.toggle_complete)?.matches(&key_event) {
        if let Err(e) = app.toggle_selected_completed() {
            tracing::error!(error = %e, "failed to update task");
            app.set_status_message(format!("Failed to update task: {}", e));
        }
    } else if binding(app, |kb| &kb.share)?.matches(&key_event) {
        app.share_day();
    } else if binding(app, |kb| &kb.prev_day)?.matches(&key_event) {
        app.shift_day(-1);
    } else if binding(app, |kb| &kb.next_day)?.matches(&key_event) {
        app.shift_day(1);
    } else if binding(app, |kb| &kb.today)?.matches(&key_event) {
        app.go_to_today();
    } else if binding(app, |kb| &kb.select)?.matches(&key_event) {
        app.open_week_day();
    } else if binding(app, |kb| &kb.list_up)?.matches(&key_event) || key_event.code == KeyCode::Up {
        app.move_selection_up();
    } else if binding(app, |kb| &kb.list_down)?.matches(&key_event) || key_event.code == KeyCode::Down {
        app.move_selection_down();
    } else if binding(app, |kb| &kb.tab_left)?.matches(&key_event) {
        app.switch_tab(app.current_tab.previous());
    } else if binding(app, |kb| &kb.tab_right)?.matches(&key_event) {
        app.switch_tab(app.current_tab.next());
    } else if binding(app, |kb| &kb.tab_1)?.matches(&key_event) {
        app.switch_tab(Tab::Day);
    } else if binding(app, |kb| &kb.tab_2)?.matches(&key_event) {
        app.switch_tab(Tab::Week);
    } else if binding(app, |kb| &kb.tab_3)?.matches(&key_event) {
        app.switch_tab(Tab::Overdue);
    }
    Ok(false)
}
