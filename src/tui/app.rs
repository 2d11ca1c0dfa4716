use crate::database::DatabaseError;
use crate::models::{Priority, Task, TaskDraft};
use crate::reminder::{Reminder, ReminderKind};
use crate::store::TaskStore;
use crate::tui::widgets::editor::Editor;
use crate::undo::UndoBuffer;
use crate::views::{self, WeekDay};
use crate::{Config, Database, dates};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use ratatui::widgets::ListState;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Day,
    Week,
    Overdue,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Day, Tab::Week, Tab::Overdue];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Day => "Day",
            Tab::Week => "Week",
            Tab::Overdue => "Overdue",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Day => 0,
            Tab::Week => 1,
            Tab::Overdue => 2,
        }
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Form,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Date,
    Time,
    Priority,
    Tag,
}

impl FormField {
    const ORDER: [FormField; 6] = [
        FormField::Title,
        FormField::Description,
        FormField::Date,
        FormField::Time,
        FormField::Priority,
        FormField::Tag,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|field| *field == self).unwrap_or(0)
    }

    pub fn next(self) -> FormField {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> FormField {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Create/edit form for a single task
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub current_field: FormField,
    pub title: Editor,
    pub description: Editor,
    pub date: Editor,
    pub time: Editor,
    pub priority: Priority,
    pub tag: Editor,
    /// None for new tasks, Some(id) when editing
    pub editing_item_id: Option<i64>,
    pub is_completed: bool,
}

impl TaskForm {
    /// Empty form with the date prefilled
    pub fn new_for(date: NaiveDate) -> Self {
        Self {
            current_field: FormField::Title,
            title: Editor::new(),
            description: Editor::new(),
            date: Editor::from_string(dates::format_task_date(date)),
            time: Editor::new(),
            priority: Priority::default(),
            tag: Editor::new(),
            editing_item_id: None,
            is_completed: false,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            current_field: FormField::Title,
            title: Editor::from_string(task.title.clone()),
            description: Editor::from_string(task.description.clone()),
            date: Editor::from_string(task.date.clone()),
            time: Editor::from_string(task.time.clone()),
            priority: task.priority.clone(),
            tag: Editor::from_string(task.tag.clone()),
            editing_item_id: task.id,
            is_completed: task.is_completed,
        }
    }

    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.value(),
            description: self.description.value(),
            date: self.date.value(),
            time: self.time.value(),
            priority: self.priority.to_string(),
            tag: self.tag.value(),
        }
    }

    /// Editor for the focused field; the priority field has none
    pub fn current_editor_mut(&mut self) -> Option<&mut Editor> {
        match self.current_field {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Date => Some(&mut self.date),
            FormField::Time => Some(&mut self.time),
            FormField::Priority => None,
            FormField::Tag => Some(&mut self.tag),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    pub config: Config,
    pub database: Database,
    snapshots: Receiver<Vec<Task>>,

    /// Latest full snapshot of the store
    pub tasks: Vec<Task>,

    pub current_tab: Tab,
    pub mode: Mode,
    pub today: NaiveDate,
    /// Day shown in the Day tab; also anchors the Week tab
    pub selected_date: NaiveDate,
    pub selected_index: usize,
    pub list_state: ListState,
    /// Highlighted weekday (0 = Monday) in the Week tab
    pub week_index: usize,

    pub form: Option<TaskForm>,
    pub undo: UndoBuffer,
    pub status: StatusState,
    /// Day the high-priority reminder last fired in this session
    reminded_on: Option<NaiveDate>,
}

impl App {
    pub fn new(config: Config, database: Database) -> Result<Self, DatabaseError> {
        let snapshots = database.subscribe();
        let tasks = database.all_tasks()?;
        let today = dates::today();
        let undo = UndoBuffer::new(config.undo_window());

        let mut app = Self {
            config,
            database,
            snapshots,
            tasks,
            current_tab: Tab::Day,
            mode: Mode::View,
            today,
            selected_date: today,
            selected_index: 0,
            list_state: ListState::default(),
            week_index: today.weekday_index(),
            form: None,
            undo,
            status: StatusState::default(),
            reminded_on: None,
        };
        app.adjust_selected_index();
        tracing::debug!(tasks = app.tasks.len(), "tui started");
        Ok(app)
    }

    /// Apply any snapshots published since the last frame.
    /// Returns true if the task list changed.
    pub fn drain_snapshots(&mut self) -> bool {
        let mut latest = None;
        loop {
            match self.snapshots.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("task snapshot channel closed");
                    break;
                }
            }
        }
        match latest {
            Some(snapshot) => {
                self.tasks = snapshot;
                self.adjust_selected_index();
                true
            }
            None => false,
        }
    }

    /// Per-frame housekeeping: day rollover, undo expiry, status timeout
    pub fn tick(&mut self, now: Instant) {
        let today = dates::today();
        if today != self.today {
            tracing::info!(%today, "date changed");
            if self.selected_date == self.today {
                self.selected_date = today;
            }
            self.today = today;
            self.adjust_selected_index();
        }
        self.undo.expire(now);
        self.check_status_message_timeout(now);
        self.check_reminder(chrono::Local::now().naive_local());
    }

    /// Show the daily reminder once the configured time has passed, at most once per day
    pub fn check_reminder(&mut self, at: NaiveDateTime) {
        let day = at.date();
        if self.reminded_on == Some(day) || at.time() < self.config.reminder.time_of_day() {
            return;
        }
        self.reminded_on = Some(day);

        let kind = if self.config.reminder.catch_up {
            ReminderKind::CatchUp
        } else {
            ReminderKind::SameDay
        };
        if let Some(notification) = Reminder::new(kind).evaluate(&self.tasks, day) {
            tracing::info!(title = %notification.title, "showing reminder");
            self.set_status_message(format!("{}: {}", notification.title, notification.message));
        }
    }

    /// Tasks listed in the current tab, in display order
    pub fn visible_tasks(&self) -> Vec<Task> {
        match self.current_tab {
            Tab::Day | Tab::Week => views::day_view(&self.tasks, self.week_focus_date()),
            Tab::Overdue => views::overdue_view(&self.tasks, self.today),
        }
    }

    /// The day the list shows: the selected day, or the highlighted weekday in the Week tab
    pub fn week_focus_date(&self) -> NaiveDate {
        match self.current_tab {
            Tab::Week => dates::week_days(dates::week_start(self.selected_date))[self.week_index.min(6)],
            _ => self.selected_date,
        }
    }

    pub fn week_overview(&self) -> Vec<WeekDay> {
        views::week_overview(&self.tasks, self.selected_date)
    }

    pub fn selected_task(&self) -> Option<Task> {
        self.visible_tasks().into_iter().nth(self.selected_index)
    }

    pub fn adjust_selected_index(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.selected_index = 0;
            self.list_state.select(None);
        } else {
            self.selected_index = self.selected_index.min(len - 1);
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn move_selection_down(&mut self) {
        let len = self.visible_tasks().len();
        if self.selected_index + 1 < len {
            self.selected_index += 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        if tab == Tab::Week {
            self.week_index = self.selected_date.weekday_index();
        }
        self.selected_index = 0;
        self.adjust_selected_index();
    }

    /// Move the Day tab by `days`, or the highlighted weekday in the Week tab
    pub fn shift_day(&mut self, days: i64) {
        match self.current_tab {
            Tab::Day => {
                self.selected_date += Duration::days(days);
            }
            Tab::Week => {
                let target = self.week_focus_date() + Duration::days(days);
                self.selected_date = target;
                self.week_index = target.weekday_index();
            }
            Tab::Overdue => return,
        }
        self.selected_index = 0;
        self.adjust_selected_index();
    }

    pub fn go_to_today(&mut self) {
        self.selected_date = self.today;
        self.week_index = self.today.weekday_index();
        self.selected_index = 0;
        self.adjust_selected_index();
    }

    /// Open the highlighted weekday in the Day tab
    pub fn open_week_day(&mut self) {
        if self.current_tab == Tab::Week {
            self.selected_date = self.week_focus_date();
            self.switch_tab(Tab::Day);
        }
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    pub fn check_status_message_timeout(&mut self, now: Instant) {
        if let Some(time) = self.status.message_time {
            if now.saturating_duration_since(time) >= self.config.status_message_timeout() {
                self.clear_status_message();
            }
        }
    }

    /// Undo prompt shown in the status bar while a deleted task can be restored
    pub fn undo_prompt(&self, now: Instant) -> Option<String> {
        let task = self.undo.pending(now)?;
        let left = self.undo.remaining(now)?;
        Some(format!(
            "Deleted \"{}\". Press {} to undo ({}s)",
            task.title,
            crate::utils::format_key_binding_for_display(&self.config.key_bindings.undo),
            left.as_millis().div_ceil(1000)
        ))
    }

    /// Forget the deleted task; it can no longer be restored
    pub fn dismiss_undo(&mut self) {
        self.undo.dismiss();
    }

    pub fn enter_help_mode(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.mode = Mode::View;
    }

    pub fn enter_create_mode(&mut self) {
        let date = match self.current_tab {
            Tab::Overdue => self.today,
            _ => self.week_focus_date(),
        };
        self.form = Some(TaskForm::new_for(date));
        self.mode = Mode::Form;
    }

    pub fn enter_edit_mode(&mut self) {
        match self.selected_task() {
            Some(task) => {
                self.form = Some(TaskForm::from_task(&task));
                self.mode = Mode::Form;
            }
            None => self.set_status_message("No task selected".to_string()),
        }
    }

    pub fn exit_form(&mut self) {
        self.form = None;
        self.mode = Mode::View;
    }

    pub fn navigate_form_field(&mut self, forward: bool) {
        if let Some(form) = self.form.as_mut() {
            form.current_field = if forward {
                form.current_field.next()
            } else {
                form.current_field.previous()
            };
        }
    }

    pub fn cycle_form_priority(&mut self, forward: bool) {
        if let Some(form) = self.form.as_mut() {
            form.priority = if forward {
                form.priority.next()
            } else {
                form.priority.previous()
            };
        }
    }

    pub fn get_current_form_editor(&mut self) -> Option<&mut Editor> {
        self.form.as_mut().and_then(TaskForm::current_editor_mut)
    }

    /// Validate the form and write it to the store.
    /// Validation problems stay in the form and show in the status bar.
    pub fn save_form(&mut self) -> Result<(), DatabaseError> {
        let Some(form) = self.form.clone() else {
            return Ok(());
        };

        let mut task = match form.draft().validate() {
            Ok(task) => task,
            Err(err) => {
                self.set_status_message(format!("Validation error: {}", err));
                return Ok(());
            }
        };

        let message = if let Some(id) = form.editing_item_id {
            task.id = Some(id);
            task.is_completed = form.is_completed;
            if self.database.update(&task)? == 0 {
                "Task no longer exists".to_string()
            } else {
                "Task updated".to_string()
            }
        } else {
            self.database.insert(&task)?;
            "Task created".to_string()
        };

        // Show the day the task landed on
        if let Some(date) = task.calendar_date() {
            if self.current_tab != Tab::Overdue {
                self.selected_date = date;
                self.week_index = date.weekday_index();
            }
        }
        self.exit_form();
        self.drain_snapshots();
        self.adjust_selected_index();
        self.set_status_message(message);
        Ok(())
    }

    /// Delete the selected task immediately, keeping it for undo
    pub fn delete_selected(&mut self, now: Instant) -> Result<(), DatabaseError> {
        let Some(task) = self.selected_task() else {
            self.set_status_message("No task selected".to_string());
            return Ok(());
        };
        self.undo.delete(&self.database, task, now)?;
        self.clear_status_message();
        self.drain_snapshots();
        Ok(())
    }

    pub fn undo_delete(&mut self, now: Instant) -> Result<(), DatabaseError> {
        match self.undo.undo(&self.database, now)? {
            Some(_) => {
                self.drain_snapshots();
                self.set_status_message("Task restored".to_string());
            }
            None => self.set_status_message("Nothing to undo".to_string()),
        }
        Ok(())
    }

    pub fn toggle_selected_completed(&mut self) -> Result<(), DatabaseError> {
        let Some(task) = self.selected_task() else {
            return Ok(());
        };
        let Some(id) = task.id else {
            return Ok(());
        };
        let completed = !task.is_completed;
        self.database.set_completed(id, completed)?;
        self.drain_snapshots();
        let message = if completed {
            "Task marked as done"
        } else {
            "Task marked as not done"
        };
        self.set_status_message(message.to_string());
        Ok(())
    }

    /// Summary of the focused day for sharing
    pub fn share_text(&self) -> String {
        let date = match self.current_tab {
            Tab::Overdue => self.today,
            _ => self.week_focus_date(),
        };
        views::share_text(&self.tasks, date)
    }

    /// Copy the day summary to the clipboard, falling back to the status bar
    pub fn share_day(&mut self) {
        let text = self.share_text();
        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.clone()));
        match copied {
            Ok(()) => self.set_status_message("Day summary copied to clipboard".to_string()),
            Err(err) => {
                tracing::warn!(error = %err, "clipboard unavailable");
                self.set_status_message(text.replace('\n', "  "));
            }
        }
    }
}

trait WeekdayIndex {
    fn weekday_index(&self) -> usize;
}

impl WeekdayIndex for NaiveDate {
    fn weekday_index(&self) -> usize {
        chrono::Datelike::weekday(self).num_days_from_monday() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn app_on(today: NaiveDate) -> App {
        let db = Database::open_in_memory().unwrap();
        let mut app = App::new(Config::default(), db).unwrap();
        app.today = today;
        app.selected_date = today;
        app.week_index = today.weekday_index();
        app
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fill_form(app: &mut App, title: &str, time: &str, priority: Priority) {
        app.enter_create_mode();
        let form = app.form.as_mut().unwrap();
        form.title = Editor::from_string(title.to_string());
        form.description = Editor::from_string("details".to_string());
        form.time = Editor::from_string(time.to_string());
        form.priority = priority;
    }

    #[test]
    fn create_form_saves_to_selected_day() {
        let mut app = app_on(ymd(2025, 5, 14));
        fill_form(&mut app, "Dentist", "09:30", Priority::Medium);
        assert_eq!(app.form.as_ref().unwrap().date.value(), "14/05/2025");

        app.save_form().unwrap();
        assert_eq!(app.mode, Mode::View);
        let visible = app.visible_tasks();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Dentist");
        assert_eq!(visible[0].priority, Priority::Medium);
    }

    #[test]
    fn invalid_form_stays_open() {
        let mut app = app_on(ymd(2025, 5, 14));
        fill_form(&mut app, "Dentist", "25:99", Priority::High);
        app.save_form().unwrap();
        assert_eq!(app.mode, Mode::Form);
        assert!(app.status.message.as_deref().unwrap_or_default().contains("Time"));
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn edit_keeps_completion_and_id() {
        let mut app = app_on(ymd(2025, 5, 14));
        fill_form(&mut app, "Report", "11:00", Priority::Low);
        app.save_form().unwrap();
        app.toggle_selected_completed().unwrap();
        let id = app.selected_task().unwrap().id;

        app.enter_edit_mode();
        app.form.as_mut().unwrap().title = Editor::from_string("Final report".to_string());
        app.save_form().unwrap();

        let task = app.selected_task().unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.title, "Final report");
        assert!(task.is_completed);
    }

    #[test]
    fn delete_then_undo_within_window() {
        let mut app = app_on(ymd(2025, 5, 14));
        fill_form(&mut app, "Laundry", "18:00", Priority::Low);
        app.save_form().unwrap();

        let t0 = Instant::now();
        app.delete_selected(t0).unwrap();
        assert!(app.visible_tasks().is_empty());
        assert!(app.undo_prompt(t0).unwrap().contains("Laundry"));

        app.undo_delete(t0 + StdDuration::from_secs(1)).unwrap();
        assert_eq!(app.visible_tasks().len(), 1);
        assert_eq!(app.visible_tasks()[0].title, "Laundry");
    }

    #[test]
    fn undo_prompt_disappears_after_window() {
        let mut app = app_on(ymd(2025, 5, 14));
        fill_form(&mut app, "Laundry", "18:00", Priority::Low);
        app.save_form().unwrap();

        let t0 = Instant::now();
        app.delete_selected(t0).unwrap();
        let later = t0 + app.config.undo_window();
        assert!(app.undo_prompt(later).is_none());
        app.undo_delete(later).unwrap();
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn dismissed_undo_cannot_restore() {
        let mut app = app_on(ymd(2025, 5, 14));
        fill_form(&mut app, "Laundry", "18:00", Priority::Low);
        app.save_form().unwrap();

        let t0 = Instant::now();
        app.delete_selected(t0).unwrap();
        app.dismiss_undo();
        assert!(app.undo_prompt(t0).is_none());
        app.undo_delete(t0).unwrap();
        assert!(app.tasks.is_empty());
        assert_eq!(app.status.message.as_deref(), Some("Nothing to undo"));
    }

    #[test]
    fn reminder_fires_once_after_configured_time() {
        let mut app = app_on(ymd(2025, 5, 14));
        fill_form(&mut app, "Call bank", "10:00", Priority::High);
        app.save_form().unwrap();
        app.clear_status_message();

        let day = ymd(2025, 5, 14);
        app.check_reminder(day.and_hms_opt(5, 59, 0).unwrap());
        assert!(app.status.message.is_none());

        app.check_reminder(day.and_hms_opt(6, 0, 0).unwrap());
        assert_eq!(
            app.status.message.as_deref(),
            Some("High Priority Tasks Today: You have 1 important task(s) to complete!")
        );

        app.clear_status_message();
        app.check_reminder(day.and_hms_opt(12, 0, 0).unwrap());
        assert!(app.status.message.is_none());
    }

    #[test]
    fn week_tab_focuses_days_and_opens_them() {
        let mut app = app_on(ymd(2025, 5, 14)); // Wednesday
        fill_form(&mut app, "Mon task", "08:00", Priority::High);
        app.form.as_mut().unwrap().date = Editor::from_string("12/05/2025".to_string());
        app.save_form().unwrap();

        app.switch_tab(Tab::Week);
        let counts: Vec<usize> = app.week_overview().iter().map(|day| day.count).collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 0, 0, 0]);

        app.week_index = 0;
        assert_eq!(app.visible_tasks().len(), 1);
        app.open_week_day();
        assert_eq!(app.current_tab, Tab::Day);
        assert_eq!(app.selected_date, ymd(2025, 5, 12));
    }

    #[test]
    fn overdue_tab_lists_past_tasks() {
        let mut app = app_on(ymd(2025, 5, 14));
        fill_form(&mut app, "Old", "08:00", Priority::High);
        app.form.as_mut().unwrap().date = Editor::from_string("01/05/2025".to_string());
        app.save_form().unwrap();

        app.switch_tab(Tab::Overdue);
        assert_eq!(app.visible_tasks().len(), 1);
        app.shift_day(1);
        assert_eq!(app.current_tab, Tab::Overdue);
    }

    #[test]
    fn shifting_days_moves_selected_date() {
        let mut app = app_on(ymd(2025, 5, 14));
        app.shift_day(-1);
        assert_eq!(app.selected_date, ymd(2025, 5, 13));
        app.go_to_today();
        assert_eq!(app.selected_date, ymd(2025, 5, 14));
        assert_eq!(Tab::Day.previous(), Tab::Overdue);
        assert_eq!(Tab::Overdue.next(), Tab::Day);
    }

    #[test]
    fn share_text_uses_focused_day() {
        let mut app = app_on(ymd(2025, 5, 14));
        assert_eq!(app.share_text(), "No tasks for Wednesday.");
        fill_form(&mut app, "Gym", "07:00", Priority::High);
        app.save_form().unwrap();
        assert_eq!(app.share_text(), "Wednesday's Tasks:\n• Gym (High) - 07:00");
    }

    #[test]
    fn external_store_changes_arrive_as_snapshots() {
        let mut app = app_on(ymd(2025, 5, 14));
        let mut task = Task::new(
            "From CLI".to_string(),
            ymd(2025, 5, 14),
            chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            Priority::High,
        );
        task.description = "x".to_string();
        app.database.insert(&task).unwrap();

        assert!(app.drain_snapshots());
        assert_eq!(app.visible_tasks().len(), 1);
        assert!(!app.drain_snapshots());
    }
}
