use chrono::{Local, NaiveDate};
use ratatui::widgets::ListState;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use focusdeck_core::assistant::PendingSend;
use focusdeck_core::note::parse_tags;
use focusdeck_core::task::{parse_duration, COLOR_OPTIONS};
use focusdeck_core::{
    AppState, AssistantClient, Config, CoreError, NewNote, NewTask, PomodoroSettings, Task,
    TaskType, TickOutcome,
};
use crate::tui::{self, AppEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Tasks,
    Notes,
    Pomodoro,
    Assistant,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Tasks, Tab::Notes, Tab::Pomodoro, Tab::Assistant];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Tasks => "Tasks",
            Tab::Notes => "Notes",
            Tab::Pomodoro => "Pomodoro",
            Tab::Assistant => "Assistant",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text buffer with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text(TextInput),
    Choice { options: Vec<String>, selected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FormField {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            kind: FieldKind::Text(TextInput::new(value)),
        }
    }

    fn choice(label: &'static str, options: Vec<String>, selected: usize) -> Self {
        Self {
            label,
            kind: FieldKind::Choice { options, selected },
        }
    }

    pub fn value(&self) -> &str {
        match &self.kind {
            FieldKind::Text(input) => &input.value,
            FieldKind::Choice { options, selected } => {
                options.get(*selected).map(String::as_str).unwrap_or("")
            }
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, FieldKind::Text(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    NewTask,
    TaskDetail,
    NewNote,
    EditNote,
    PomodoroSettings,
}

/// Modal form. Edits stay local until the form is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub kind: FormKind,
    pub target_id: Option<String>,
    pub fields: Vec<FormField>,
    pub focused: usize,
}

const NO_COLOR: &str = "none";

fn color_options() -> Vec<String> {
    std::iter::once(NO_COLOR.to_string())
        .chain(COLOR_OPTIONS.iter().map(|c| c.to_string()))
        .collect()
}

fn color_index(color: Option<&str>) -> usize {
    color
        .and_then(|c| COLOR_OPTIONS.iter().position(|o| o.eq_ignore_ascii_case(c)))
        .map(|i| i + 1)
        .unwrap_or(0)
}

impl Form {
    pub fn new_task() -> Self {
        let types = TaskType::all().iter().map(|t| t.label().to_string()).collect();
        Self {
            kind: FormKind::NewTask,
            target_id: None,
            fields: vec![
                FormField::text("Title", ""),
                FormField::text("Description", ""),
                FormField::choice("Type", types, 0),
                FormField::text("Duration (min)", ""),
                FormField::text("Start (HH:MM)", ""),
                FormField::text("End (HH:MM)", ""),
                FormField::choice("Color", color_options(), 1),
            ],
            focused: 0,
        }
    }

    pub fn task_detail(task: &Task) -> Self {
        Self {
            kind: FormKind::TaskDetail,
            target_id: Some(task.id.clone()),
            fields: vec![
                FormField::text("Title", task.title.clone()),
                FormField::text("Description", task.description.clone().unwrap_or_default()),
                FormField::text("Start (HH:MM)", task.start_time.clone().unwrap_or_default()),
                FormField::text("End (HH:MM)", task.end_time.clone().unwrap_or_default()),
                FormField::text("Notes", task.notes.clone().unwrap_or_default()),
            ],
            focused: 0,
        }
    }

    pub fn new_note() -> Self {
        Self {
            kind: FormKind::NewNote,
            target_id: None,
            fields: vec![
                FormField::text("Title", ""),
                FormField::text("Content", ""),
                FormField::text("Tags", ""),
                FormField::choice("Color", color_options(), 0),
            ],
            focused: 0,
        }
    }

    pub fn edit_note(note: &focusdeck_core::Note) -> Self {
        let tags = note.tags.as_ref().map(|t| t.join(", ")).unwrap_or_default();
        Self {
            kind: FormKind::EditNote,
            target_id: Some(note.id.clone()),
            fields: vec![
                FormField::text("Title", note.title.clone()),
                FormField::text("Content", note.content.clone()),
                FormField::text("Tags", tags),
                FormField::choice("Color", color_options(), color_index(note.color.as_deref())),
            ],
            focused: 0,
        }
    }

    pub fn pomodoro_settings(settings: &PomodoroSettings) -> Self {
        Self {
            kind: FormKind::PomodoroSettings,
            target_id: None,
            fields: vec![
                FormField::text("Work (min)", settings.work_duration.to_string()),
                FormField::text("Short break (min)", settings.short_break_duration.to_string()),
                FormField::text("Long break (min)", settings.long_break_duration.to_string()),
                FormField::text("Sessions before long break", settings.sessions_before_long_break.to_string()),
                FormField::text("Waiting time (min)", settings.waiting_time.to_string()),
            ],
            focused: 0,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::NewTask => "New Task",
            FormKind::TaskDetail => "Task Details",
            FormKind::NewNote => "New Note",
            FormKind::EditNote => "Edit Note",
            FormKind::PomodoroSettings => "Timer Settings",
        }
    }

    pub fn next_field(&mut self) {
        self.focused = (self.focused + 1) % self.fields.len().max(1);
    }

    pub fn prev_field(&mut self) {
        let len = self.fields.len().max(1);
        self.focused = (self.focused + len - 1) % len;
    }

    pub fn focused_field(&self) -> Option<&FormField> {
        self.fields.get(self.focused)
    }

    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.fields.get_mut(self.focused).map(|f| &mut f.kind) {
            Some(FieldKind::Text(input)) => Some(input),
            _ => None,
        }
    }

    /// Step a choice field; no-op on text fields
    pub fn cycle_choice(&mut self, forward: bool) {
        if let Some(FieldKind::Choice { options, selected }) =
            self.fields.get_mut(self.focused).map(|f| &mut f.kind)
        {
            let len = options.len().max(1);
            *selected = if forward {
                (*selected + 1) % len
            } else {
                (*selected + len - 1) % len
            };
        }
    }

    pub fn value(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(FormField::value)
            .unwrap_or("")
    }

    fn optional(&self, label: &str) -> Option<String> {
        let value = self.value(label).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn color(&self) -> Option<String> {
        self.optional("Color").filter(|c| c != NO_COLOR)
    }

    fn task_type(&self) -> TaskType {
        let label = self.value("Type");
        TaskType::all()
            .into_iter()
            .find(|t| t.label() == label)
            .unwrap_or(TaskType::Planned)
    }

    fn minutes(&self, label: &str, fallback: u32) -> std::result::Result<u32, String> {
        let value = self.value(label).trim();
        if value.is_empty() {
            return Ok(fallback);
        }
        value
            .parse()
            .map_err(|_| format!("{} must be a whole number", label))
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub tab: Tab,
    pub input_mode: InputMode,
    pub state: AppState,
    pub form: Option<Form>,
    pub status_message: Option<String>,

    // Tasks tab
    pub today: NaiveDate,
    pub selected_date: NaiveDate,
    pub task_state: ListState,

    // Notes tab
    pub note_state: ListState,

    // Pomodoro tab
    pub tip_state: ListState,
    ticker: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<AppEvent>,

    // Assistant tab
    pub chat_input: TextInput,
    pub chat_scroll_back: u16,
    pub assistant_task: Option<(PendingSend, JoinHandle<focusdeck_core::Result<String>>)>,
    client: AssistantClient,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(config: &Config, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        let today = Local::now().date_naive();
        let client = AssistantClient::new(&config.assistant_endpoint());
        tracing::info!(endpoint = client.endpoint(), "assistant client ready");

        let mut app = Self {
            should_quit: false,
            tab: Tab::Tasks,
            input_mode: InputMode::Normal,
            state: AppState::from_config(config),
            form: None,
            status_message: None,

            today,
            selected_date: today,
            task_state: ListState::default(),

            note_state: ListState::default(),

            tip_state: ListState::default(),
            ticker: None,
            events,

            chat_input: TextInput::default(),
            chat_scroll_back: 0,
            assistant_task: None,
            client,

            animation_frame: 0,
        };
        app.clamp_selections();
        app
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Keep every list selection inside its list
    pub fn clamp_selections(&mut self) {
        let tasks = self.day_tasks().len();
        clamp(&mut self.task_state, tasks);
        clamp(&mut self.note_state, self.state.notes.len());
        clamp(&mut self.tip_state, self.state.tips.all().len());
    }

    // Tasks

    pub fn day_tasks(&self) -> Vec<&Task> {
        self.state.tasks.tasks_by_date(self.selected_date)
    }

    pub fn selected_task_id(&self) -> Option<String> {
        let tasks = self.day_tasks();
        self.task_state
            .selected()
            .and_then(|i| tasks.get(i))
            .map(|t| t.id.clone())
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.task_state.select(None);
        self.clamp_selections();
    }

    pub fn toggle_selected_task(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.state.tasks.toggle_status(&id);
        }
    }

    /// Current focus: the first unfinished task scheduled today
    pub fn focus_task(&self) -> Option<&Task> {
        self.state.tasks.pending_on(self.today).into_iter().next()
    }

    // Notes

    pub fn selected_note_id(&self) -> Option<String> {
        self.note_state
            .selected()
            .and_then(|i| self.state.notes.all().get(i))
            .map(|n| n.id.clone())
    }

    pub fn delete_selected_note(&mut self) {
        if let Some(id) = self.selected_note_id() {
            self.state.notes.delete(&id);
            self.clamp_selections();
        }
    }

    // Forms

    pub fn open_form(&mut self, form: Form) {
        self.input_mode = match form.kind {
            FormKind::TaskDetail | FormKind::EditNote => InputMode::Normal,
            _ => InputMode::Editing,
        };
        self.form = Some(form);
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.input_mode = InputMode::Normal;
    }

    /// Apply the open form. On failure the form stays open and the reason
    /// goes to the status line.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };
        match self.apply_form(&form) {
            Ok(message) => {
                self.close_form();
                self.clamp_selections();
                self.set_status(message);
            }
            Err(reason) => self.set_status(reason),
        }
    }

    fn apply_form(&mut self, form: &Form) -> std::result::Result<String, String> {
        match form.kind {
            FormKind::NewTask => {
                let mut new_task = NewTask::new(form.value("Title").trim(), self.selected_date);
                new_task.description = form.optional("Description");
                new_task.task_type = form.task_type();
                new_task.duration = parse_duration(form.value("Duration (min)"));
                new_task.start_time = form.optional("Start (HH:MM)");
                new_task.end_time = form.optional("End (HH:MM)");
                new_task.color = form.color();
                let task = self.state.tasks.add(new_task).map_err(|e| e.to_string())?;
                Ok(format!("Added \"{}\"", task.title))
            }
            FormKind::TaskDetail => {
                let id = form.target_id.as_deref().unwrap_or_default();
                let mut task = self
                    .state
                    .tasks
                    .get(id)
                    .cloned()
                    .ok_or_else(|| CoreError::not_found("task", id).to_string())?;
                task.title = form.value("Title").trim().to_string();
                task.description = form.optional("Description");
                task.start_time = form.optional("Start (HH:MM)");
                task.end_time = form.optional("End (HH:MM)");
                task.notes = form.optional("Notes");
                self.state.tasks.update(task).map_err(|e| e.to_string())?;
                Ok("Task saved".to_string())
            }
            FormKind::NewNote => {
                let mut new_note = NewNote::new(form.value("Title").trim(), form.value("Content"));
                new_note.tags = parse_tags(form.value("Tags"));
                new_note.color = form.color();
                let note = self.state.notes.add(new_note).map_err(|e| e.to_string())?;
                Ok(format!("Added \"{}\"", note.title))
            }
            FormKind::EditNote => {
                let id = form.target_id.as_deref().unwrap_or_default();
                let mut note = self
                    .state
                    .notes
                    .get(id)
                    .cloned()
                    .ok_or_else(|| CoreError::not_found("note", id).to_string())?;
                note.title = form.value("Title").trim().to_string();
                note.content = form.value("Content").to_string();
                note.tags = parse_tags(form.value("Tags"));
                note.color = form.color();
                self.state.notes.update(note).map_err(|e| e.to_string())?;
                Ok("Note saved".to_string())
            }
            FormKind::PomodoroSettings => {
                let current = *self.state.pomodoro.settings();
                let settings = PomodoroSettings {
                    work_duration: form.minutes("Work (min)", current.work_duration)?,
                    short_break_duration: form.minutes("Short break (min)", current.short_break_duration)?,
                    long_break_duration: form.minutes("Long break (min)", current.long_break_duration)?,
                    sessions_before_long_break: form
                        .minutes("Sessions before long break", current.sessions_before_long_break)?,
                    waiting_time: form.minutes("Waiting time (min)", current.waiting_time)?,
                };
                self.state.pomodoro.update_settings(settings);
                if let Err(e) = Config::save_pomodoro_settings(settings) {
                    tracing::warn!(error = %e, "could not persist timer settings");
                }
                Ok("Timer settings saved".to_string())
            }
        }
    }

    /// Delete the record behind the open form, if it has one
    pub fn delete_form_target(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let Some(id) = form.target_id.clone() else {
            return;
        };
        let deleted = match form.kind {
            FormKind::TaskDetail => self.state.tasks.delete(&id),
            FormKind::EditNote => self.state.notes.delete(&id),
            _ => false,
        };
        if deleted {
            self.close_form();
            self.clamp_selections();
            self.set_status("Deleted");
        }
    }

    // Theme

    pub fn toggle_theme(&mut self) {
        self.state.theme.toggle();
        if let Err(e) = Config::save_dark_mode(self.state.theme.is_dark()) {
            tracing::warn!(error = %e, "could not persist theme");
        }
    }

    // Pomodoro

    pub fn toggle_timer(&mut self) {
        if self.state.pomodoro.is_running() {
            self.state.pomodoro.pause();
        } else {
            self.state.pomodoro.start();
        }
    }

    /// Skip to the next phase. A phase entered this way gets a fresh ticker so
    /// its first second is a full second.
    pub fn skip_phase(&mut self) {
        let before = self.state.pomodoro.status();
        self.state.pomodoro.skip_to_next();
        if self.state.pomodoro.status() != before {
            if let Some(ticker) = self.ticker.take() {
                ticker.abort();
            }
            self.sync_pomodoro_ticker();
        }
    }

    pub fn tick_pomodoro(&mut self) {
        if let TickOutcome::Completed { to, .. } = self.state.pomodoro.tick() {
            self.set_status(format!("{} started", self.state.pomodoro.label()));
            tracing::debug!(?to, "phase completed");
        }
    }

    /// Spawn the one-second ticker when the timer starts running and drop it
    /// when it stops
    pub fn sync_pomodoro_ticker(&mut self) {
        let running = self.state.pomodoro.is_running();
        match (running, self.ticker.is_some()) {
            (true, false) => {
                self.ticker = Some(tui::spawn_pomodoro_ticker(self.events.clone()));
            }
            (false, true) => {
                if let Some(ticker) = self.ticker.take() {
                    ticker.abort();
                }
            }
            _ => {}
        }
    }

    pub fn delete_selected_tip(&mut self) {
        if let Some(i) = self.tip_state.selected() {
            self.state.tips.remove(i);
            self.clamp_selections();
        }
    }

    // Assistant

    pub fn send_chat(&mut self) {
        if self.assistant_task.is_some() {
            return;
        }
        let Some(pending) = self.state.assistant.begin_send(&self.chat_input.value) else {
            return;
        };
        self.chat_input.take();
        self.chat_scroll_back = 0;

        let client = self.client.clone();
        let history = pending.history.clone();
        let handle = tokio::spawn(async move { client.complete(&history).await });
        self.assistant_task = Some((pending, handle));
    }

    /// Hand a finished request back to the store
    pub async fn poll_assistant(&mut self) {
        let finished = self
            .assistant_task
            .as_ref()
            .is_some_and(|(_, handle)| handle.is_finished());
        if !finished {
            return;
        }
        let Some((pending, handle)) = self.assistant_task.take() else {
            return;
        };
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(CoreError::Assistant(format!("request task failed: {}", e))),
        };
        self.state.assistant.finish_send(pending, result);
        self.chat_scroll_back = 0;
    }

    pub fn new_conversation(&mut self) {
        self.state.assistant.create_conversation();
        self.chat_scroll_back = 0;
    }

    pub fn delete_current_conversation(&mut self) {
        if let Some(id) = self.state.assistant.current_id().map(str::to_string) {
            self.state.assistant.delete_conversation(&id);
            self.chat_scroll_back = 0;
        }
    }

    /// Move the current conversation up or down the sidebar
    pub fn cycle_conversation(&mut self, forward: bool) {
        let conversations = self.state.assistant.conversations();
        if conversations.is_empty() {
            return;
        }
        let len = conversations.len();
        let current = self
            .state
            .assistant
            .current_id()
            .and_then(|id| conversations.iter().position(|c| c.id == id))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        let id = conversations[next].id.clone();
        self.state.assistant.select_conversation(&id);
        self.chat_scroll_back = 0;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.state.assistant.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

fn clamp(state: &mut ListState, len: usize) {
    match (state.selected(), len) {
        (_, 0) => state.select(None),
        (None, _) => state.select(Some(0)),
        (Some(i), len) if i >= len => state.select(Some(len - 1)),
        _ => {}
    }
}
