use anyhow::Result;
use chrono::Duration;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use focusdeck_core::task::shift_month;
use crate::app::{App, Form, FormKind, InputMode, Tab};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::PomodoroTick => app.tick_pomodoro(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.form.is_some() {
        handle_form_key(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_chat_editing(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Keys shared by every tab
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('t') => {
            app.toggle_theme();
            return;
        }
        KeyCode::Tab => {
            app.tab = app.tab.next();
            return;
        }
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            app.tab = Tab::ALL[idx];
            return;
        }
        _ => {}
    }

    app.status_message = None;
    match app.tab {
        Tab::Tasks => handle_tasks_normal(app, key),
        Tab::Notes => handle_notes_normal(app, key),
        Tab::Pomodoro => handle_pomodoro_normal(app, key),
        Tab::Assistant => handle_assistant_normal(app, key),
    }
}

fn handle_tasks_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        // Calendar
        KeyCode::Char('h') | KeyCode::Left => app.select_date(app.selected_date - Duration::days(1)),
        KeyCode::Char('l') | KeyCode::Right => app.select_date(app.selected_date + Duration::days(1)),
        KeyCode::Char('H') => app.select_date(shift_month(app.selected_date, -1)),
        KeyCode::Char('L') => app.select_date(shift_month(app.selected_date, 1)),
        KeyCode::Char('T') => app.select_date(app.today),

        // Day list
        KeyCode::Char('j') | KeyCode::Down => {
            let len = app.day_tasks().len();
            list_down(&mut app.task_state, len);
        }
        KeyCode::Char('k') | KeyCode::Up => list_up(&mut app.task_state),
        KeyCode::Char(' ') => app.toggle_selected_task(),
        KeyCode::Enter => {
            let task = app
                .selected_task_id()
                .and_then(|id| app.state.tasks.get(&id))
                .map(Form::task_detail);
            if let Some(form) = task {
                app.open_form(form);
            }
        }
        KeyCode::Char('a') => app.open_form(Form::new_task()),
        _ => {}
    }
}

fn handle_notes_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => list_down(&mut app.note_state, app.state.notes.len()),
        KeyCode::Char('k') | KeyCode::Up => list_up(&mut app.note_state),
        KeyCode::Char('a') => app.open_form(Form::new_note()),
        KeyCode::Enter | KeyCode::Char('e') => {
            let note = app
                .selected_note_id()
                .and_then(|id| app.state.notes.get(&id))
                .map(Form::edit_note);
            if let Some(form) = note {
                app.open_form(form);
            }
        }
        KeyCode::Char('d') => app.delete_selected_note(),
        _ => {}
    }
}

fn handle_pomodoro_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('s') | KeyCode::Char(' ') => app.toggle_timer(),
        KeyCode::Char('r') => app.state.pomodoro.reset(),
        KeyCode::Char('n') => app.skip_phase(),
        KeyCode::Char('e') => {
            let form = Form::pomodoro_settings(app.state.pomodoro.settings());
            app.open_form(form);
        }
        KeyCode::Char('j') | KeyCode::Down => list_down(&mut app.tip_state, app.state.tips.all().len()),
        KeyCode::Char('k') | KeyCode::Up => list_up(&mut app.tip_state),
        KeyCode::Char('x') | KeyCode::Char('d') => app.delete_selected_tip(),
        _ => {}
    }
}

fn handle_assistant_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            app.state.assistant.ensure_conversation();
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('[') => app.cycle_conversation(false),
        KeyCode::Char(']') => app.cycle_conversation(true),
        KeyCode::Char('N') => app.new_conversation(),
        KeyCode::Char('D') => app.delete_current_conversation(),
        KeyCode::Char('k') | KeyCode::Up => {
            app.chat_scroll_back = app.chat_scroll_back.saturating_add(1);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.chat_scroll_back = app.chat_scroll_back.saturating_sub(1);
        }
        KeyCode::Char('G') => app.chat_scroll_back = 0,
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.send_chat();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => app.chat_input.backspace(),
        KeyCode::Delete => app.chat_input.delete(),
        KeyCode::Left => app.chat_input.left(),
        KeyCode::Right => app.chat_input.right(),
        KeyCode::Home => app.chat_input.home(),
        KeyCode::End => app.chat_input.end(),
        KeyCode::Char(c) => app.chat_input.insert(c),
        _ => {}
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) {
    // Save works in both modes
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.submit_form();
        return;
    }

    let Some(form) = app.form.as_mut() else {
        return;
    };

    // Field navigation works in both modes
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            form.next_field();
            return;
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.prev_field();
            return;
        }
        _ => {}
    }

    let on_text = form.focused_field().is_some_and(|f| f.is_text());
    if !on_text {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => form.cycle_choice(false),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => form.cycle_choice(true),
            KeyCode::Enter => app.submit_form(),
            KeyCode::Esc => app.close_form(),
            _ => {}
        }
        return;
    }

    match app.input_mode {
        InputMode::Editing => match key.code {
            KeyCode::Esc => app.input_mode = InputMode::Normal,
            KeyCode::Enter => app.submit_form(),
            _ => {
                if let Some(input) = form.focused_input() {
                    match key.code {
                        KeyCode::Backspace => input.backspace(),
                        KeyCode::Delete => input.delete(),
                        KeyCode::Left => input.left(),
                        KeyCode::Right => input.right(),
                        KeyCode::Home => input.home(),
                        KeyCode::End => input.end(),
                        KeyCode::Char(c) => input.insert(c),
                        _ => {}
                    }
                }
            }
        },
        InputMode::Normal => {
            let kind = form.kind;
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => app.close_form(),
                KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
                KeyCode::Char('j') => form.next_field(),
                KeyCode::Char('k') => form.prev_field(),
                KeyCode::Char('d') => app.delete_form_target(),
                KeyCode::Char(' ') if kind == FormKind::TaskDetail => {
                    let target = form.target_id.clone();
                    if let Some(id) = target {
                        if let Some(status) = app.state.tasks.toggle_status(&id) {
                            app.set_status(format!("Marked {:?}", status).to_lowercase());
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.form.is_some() {
        return;
    }
    match (mouse.kind, app.tab) {
        (MouseEventKind::ScrollUp, Tab::Assistant) => {
            app.chat_scroll_back = app.chat_scroll_back.saturating_add(3);
        }
        (MouseEventKind::ScrollDown, Tab::Assistant) => {
            app.chat_scroll_back = app.chat_scroll_back.saturating_sub(3);
        }
        (MouseEventKind::ScrollUp, Tab::Tasks) => list_up(&mut app.task_state),
        (MouseEventKind::ScrollDown, Tab::Tasks) => {
            let len = app.day_tasks().len();
            list_down(&mut app.task_state, len);
        }
        (MouseEventKind::ScrollUp, Tab::Notes) => list_up(&mut app.note_state),
        (MouseEventKind::ScrollDown, Tab::Notes) => {
            let len = app.state.notes.len();
            list_down(&mut app.note_state, len);
        }
        _ => {}
    }
}

fn list_down(state: &mut ratatui::widgets::ListState, len: usize) {
    if len > 0 {
        let i = state.selected().unwrap_or(0);
        state.select(Some((i + 1).min(len - 1)));
    }
}

fn list_up(state: &mut ratatui::widgets::ListState) {
    let i = state.selected().unwrap_or(0);
    state.select(Some(i.saturating_sub(1)));
}
