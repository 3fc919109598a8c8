use chrono::{Datelike, Duration, Local, NaiveDate};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use focusdeck_core::pomodoro::{format_clock, PendingPhase, BreakKind};
use focusdeck_core::task::{format_time, month_days};
use focusdeck_core::theme::parse_hex_color;
use focusdeck_core::{ChatRole, Palette, TaskStatus, TimerStatus};
use crate::app::{App, FieldKind, Form, FormKind, InputMode, Tab};

/// Theme palette resolved to terminal colours
#[derive(Debug, Clone, Copy)]
struct Colors {
    background: Color,
    card: Color,
    text: Color,
    border: Color,
    primary: Color,
    secondary: Color,
}

impl From<&Palette> for Colors {
    fn from(palette: &Palette) -> Self {
        Self {
            background: hex(palette.background),
            card: hex(palette.card),
            text: hex(palette.text),
            border: hex(palette.border),
            primary: hex(palette.primary),
            secondary: hex(palette.secondary),
        }
    }
}

fn hex(value: &str) -> Color {
    parse_hex_color(value)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Reset)
}

fn card(title: impl Into<Line<'static>>, focused: bool, c: Colors) -> Block<'static> {
    let title: Line<'static> = title.into();
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { c.primary } else { c.border }))
        .style(Style::default().bg(c.card).fg(c.text))
        .title(title)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let c = Colors::from(app.state.theme.colors());

    frame.render_widget(
        Block::default().style(Style::default().bg(c.background).fg(c.text)),
        area,
    );

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, c);

    match app.tab {
        Tab::Tasks => render_tasks_screen(app, frame, body_area, c),
        Tab::Notes => render_notes_screen(app, frame, body_area, c),
        Tab::Pomodoro => render_pomodoro_screen(app, frame, body_area, c),
        Tab::Assistant => render_assistant_screen(app, frame, body_area, c),
    }

    render_footer(app, frame, footer_area);

    if let Some(form) = app.form.as_ref() {
        render_form(app, form, frame, area, c);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, c: Colors) {
    let [title_area, tabs_area, timer_area] = Layout::horizontal([
        Constraint::Length(20),
        Constraint::Min(0),
        Constraint::Length(26),
    ])
    .areas(area);

    let title = Line::from(vec![
        Span::styled(" FocusDeck ", Style::default().fg(c.primary).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title).style(Style::default().bg(c.card)), title_area);

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .style(Style::default().bg(c.card).fg(c.text))
        .highlight_style(Style::default().fg(c.primary).add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
        .divider("|");
    frame.render_widget(tabs, tabs_area);

    // Timer stays visible from every tab once started
    let pomodoro = &app.state.pomodoro;
    let timer = if pomodoro.status() == TimerStatus::Idle {
        Line::default()
    } else {
        let dot_color = if pomodoro.is_running() { c.secondary } else { Color::DarkGray };
        Line::from(vec![
            Span::styled("● ", Style::default().fg(dot_color)),
            Span::styled(format_clock(pomodoro.time_remaining()), Style::default().bold()),
            Span::raw(format!(" {} ", pomodoro.label())),
        ])
        .right_aligned()
    };
    frame.render_widget(Paragraph::new(timer).style(Style::default().bg(c.card)), timer_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match (&app.form, app.input_mode) {
        (_, InputMode::Editing) => " EDIT ".to_string(),
        (Some(_), InputMode::Normal) => " FORM ".to_string(),
        (None, InputMode::Normal) => format!(" {} ", app.tab.title().to_uppercase()),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: Vec<(&str, &str)> = match (&app.form, app.input_mode) {
        (Some(_), InputMode::Editing) => vec![
            ("Tab", "next field"),
            ("Enter", "save"),
            ("Esc", "stop typing"),
        ],
        (Some(form), InputMode::Normal) => {
            let mut pairs = vec![("j/k", "field"), ("i", "edit"), ("^S", "save")];
            if form.kind == FormKind::TaskDetail {
                pairs.push(("Space", "toggle"));
            }
            if form.target_id.is_some() {
                pairs.push(("d", "delete"));
            }
            pairs.push(("Esc", "close"));
            pairs
        }
        (None, InputMode::Editing) => vec![("Enter", "send"), ("Esc", "stop typing")],
        (None, InputMode::Normal) => {
            let mut pairs = match app.tab {
                Tab::Tasks => vec![
                    ("h/l", "day"),
                    ("H/L", "month"),
                    ("T", "today"),
                    ("j/k", "task"),
                    ("Space", "done"),
                    ("Enter", "open"),
                    ("a", "add"),
                ],
                Tab::Notes => vec![("j/k", "nav"), ("a", "add"), ("Enter", "edit"), ("d", "delete")],
                Tab::Pomodoro => vec![
                    ("s", if app.state.pomodoro.is_running() { "pause" } else { "start" }),
                    ("r", "reset"),
                    ("n", "skip"),
                    ("e", "settings"),
                    ("x", "remove tip"),
                ],
                Tab::Assistant => vec![
                    ("i", "type"),
                    ("[/]", "chat"),
                    ("N", "new"),
                    ("D", "delete"),
                    ("j/k", "scroll"),
                ],
            };
            pairs.extend([("t", "theme"), ("q", "quit")]);
            pairs
        }
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    for (key, label) in pairs {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }
    if let Some(message) = &app.status_message {
        spans.push(Span::styled(
            format!("  {}", message),
            Style::default().bg(Color::Black).fg(Color::Yellow),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

// Tasks

fn render_tasks_screen(app: &mut App, frame: &mut Frame, area: Rect, c: Colors) {
    let [calendar_area, list_area] = Layout::horizontal([
        Constraint::Length(32),
        Constraint::Min(0),
    ])
    .areas(area);

    render_calendar(app, frame, calendar_area, c);
    render_day_tasks(app, frame, list_area, c);
}

fn render_calendar(app: &App, frame: &mut Frame, area: Rect, c: Colors) {
    let selected = app.selected_date;
    let block = card(format!(" {} ", selected.format("%B %Y")), false, c);

    let mut lines = vec![
        Line::from(Span::styled(
            " Su  Mo  Tu  We  Th  Fr  Sa",
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
    ];

    let days = month_days(selected.year(), selected.month());
    let lead = days
        .first()
        .map(|d| d.weekday.num_days_from_sunday() as usize)
        .unwrap_or(0);

    let mut week: Vec<Span> = vec![Span::raw("    "); lead];
    for day in &days {
        let has_tasks = app.state.tasks.has_tasks_on(day.date);
        let marker = if has_tasks { "•" } else { " " };
        let style = if day.date == selected {
            Style::default().bg(c.primary).fg(c.background).bold()
        } else if day.date == app.today {
            Style::default().fg(c.primary).bold()
        } else {
            Style::default()
        };
        week.push(Span::styled(format!("{:>3}", day.date.day()), style));
        week.push(Span::styled(marker, Style::default().fg(c.secondary)));

        if day.weekday == chrono::Weekday::Sat {
            lines.push(Line::from(std::mem::take(&mut week)));
            lines.push(Line::default());
        }
    }
    if !week.is_empty() {
        lines.push(Line::from(week));
    }

    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled(" • ", Style::default().fg(c.secondary)),
        Span::styled("has tasks", Style::default().fg(Color::DarkGray)),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_day_tasks(app: &mut App, frame: &mut Frame, area: Rect, c: Colors) {
    let title = if app.selected_date == app.today {
        format!(" Today, {} ", app.selected_date.format("%B %-d"))
    } else {
        format!(" {} ", app.selected_date.format("%A, %B %-d"))
    };
    let block = card(title, true, c);

    let tasks = app.day_tasks();
    if tasks.is_empty() {
        let placeholder = Paragraph::new(vec![
            Line::from("No tasks scheduled"),
            Line::from(Span::styled(
                "Press 'a' to create a new task for this date.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            let done = task.status == TaskStatus::Completed;
            let check = if done { "[x] " } else { "[ ] " };
            let swatch = task.color.as_deref().map(hex).unwrap_or(c.primary);
            let title_style = if done {
                Style::default().add_modifier(Modifier::CROSSED_OUT).fg(Color::DarkGray)
            } else {
                Style::default().bold()
            };

            let mut first = vec![
                Span::styled("▌", Style::default().fg(swatch)),
                Span::raw(check),
                Span::styled(task.title.clone(), title_style),
            ];
            if let Some(range) = time_range(task.start_time.as_deref(), task.end_time.as_deref()) {
                first.push(Span::styled(format!("  {}", range), Style::default().fg(c.secondary)));
            }
            first.push(Span::styled(
                format!("  {}", task.task_type.label()),
                Style::default().fg(Color::DarkGray),
            ));

            let mut lines = vec![Line::from(first)];
            if let Some(description) = &task.description {
                lines.push(Line::from(Span::styled(
                    format!("     {}", description),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(c.border))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.task_state);
}

fn time_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{} - {}", format_time(s), format_time(e))),
        (Some(s), None) => Some(format_time(s)),
        (None, Some(e)) => Some(format!("until {}", format_time(e))),
        (None, None) => None,
    }
}

// Notes

fn render_notes_screen(app: &mut App, frame: &mut Frame, area: Rect, c: Colors) {
    let [list_area, preview_area] = Layout::horizontal([
        Constraint::Percentage(40),
        Constraint::Percentage(60),
    ])
    .areas(area);

    let block = card(format!(" Notes ({}) ", app.state.notes.len()), true, c);

    if app.state.notes.is_empty() {
        let placeholder = Paragraph::new(vec![
            Line::from("No notes yet"),
            Line::from(Span::styled("Press 'a' to write one.", Style::default().fg(Color::DarkGray))),
        ])
        .block(block);
        frame.render_widget(placeholder, list_area);
    } else {
        let items: Vec<ListItem> = app
            .state
            .notes
            .all()
            .iter()
            .map(|note| {
                let swatch = note.color.as_deref().map(hex).unwrap_or(c.border);
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled("▌", Style::default().fg(swatch)),
                        Span::styled(note.title.clone(), Style::default().bold()),
                    ]),
                    Line::from(Span::styled(
                        format!(" {}", note.updated_at.format("%b %-d, %Y")),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(c.border))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut app.note_state);
    }

    let note = app
        .note_state
        .selected()
        .and_then(|i| app.state.notes.all().get(i));
    let preview_block = card(" Preview ", false, c);
    let Some(note) = note else {
        frame.render_widget(preview_block, preview_area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(note.title.clone(), Style::default().fg(c.primary).bold())),
        Line::from(Span::styled(
            format!(
                "Created {} · Updated {}",
                note.created_at.format("%b %-d, %Y"),
                note.updated_at.format("%b %-d, %Y %H:%M")
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(tags) = note.tags.as_ref().filter(|t| !t.is_empty()) {
        let tags: Vec<Span> = tags
            .iter()
            .map(|t| Span::styled(format!("#{} ", t), Style::default().fg(c.secondary)))
            .collect();
        lines.push(Line::from(tags));
    }
    lines.push(Line::default());
    lines.extend(note.content.lines().map(|l| Line::from(l.to_string())));

    let preview = Paragraph::new(lines)
        .block(preview_block)
        .wrap(Wrap { trim: false });
    frame.render_widget(preview, preview_area);
}

// Pomodoro

fn render_pomodoro_screen(app: &mut App, frame: &mut Frame, area: Rect, c: Colors) {
    let [timer_area, tips_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(44),
    ])
    .areas(area);

    let pomodoro = &app.state.pomodoro;
    let block = card(" Pomodoro Timer ", true, c);
    let inner = block.inner(timer_area);
    frame.render_widget(block, timer_area);

    let [_, label_area, clock_area, gauge_area, info_area, _] = Layout::vertical([
        Constraint::Percentage(20),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(6),
        Constraint::Min(0),
    ])
    .areas(inner);

    let phase_color = match pomodoro.status() {
        TimerStatus::Work => c.primary,
        TimerStatus::ShortBreak | TimerStatus::LongBreak => c.secondary,
        _ => Color::DarkGray,
    };

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            pomodoro.label().to_uppercase(),
            Style::default().fg(phase_color).bold(),
        )))
        .centered(),
        label_area,
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format_clock(pomodoro.time_remaining()),
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .centered(),
        clock_area,
    );

    let gauge_width = gauge_area.width.min(50);
    let gauge_rect = Rect::new(
        gauge_area.x + (gauge_area.width - gauge_width) / 2,
        gauge_area.y,
        gauge_width,
        1,
    );
    let gauge = Gauge::default()
        .ratio(pomodoro.progress())
        .label("")
        .gauge_style(Style::default().fg(phase_color).bg(c.border));
    frame.render_widget(gauge, gauge_rect);

    let cycle = pomodoro.settings().sessions_before_long_break.max(1);
    let mut info = vec![
        Line::default(),
        Line::from(format!("Session {} of {}", pomodoro.current_session(), cycle)),
    ];
    if let Some(pending) = pomodoro.pending_phase() {
        let next = match pending {
            PendingPhase::Break(BreakKind::Short) => "Short Break",
            PendingPhase::Break(BreakKind::Long) => "Long Break",
            PendingPhase::WorkAfter(_) => "Focus Time",
        };
        info.push(Line::from(Span::styled(
            format!("Up next: {}", next),
            Style::default().fg(c.secondary),
        )));
    }
    info.push(Line::default());
    match app.focus_task() {
        Some(task) => info.push(Line::from(vec![
            Span::styled("Current focus: ", Style::default().fg(Color::DarkGray)),
            Span::styled(task.title.clone(), Style::default().bold()),
        ])),
        None => info.push(Line::from(Span::styled(
            "No pending tasks today",
            Style::default().fg(Color::DarkGray),
        ))),
    }
    frame.render_widget(Paragraph::new(info).centered(), info_area);

    let [settings_area, tips_list_area] = Layout::vertical([
        Constraint::Length(7),
        Constraint::Min(0),
    ])
    .areas(tips_area);

    let settings = app.state.pomodoro.settings();
    let waiting = if settings.waiting_time == 0 {
        "off".to_string()
    } else {
        format!("{} min", settings.waiting_time)
    };
    let summary = Paragraph::new(vec![
        Line::from(format!("Focus        {} min", settings.work_duration)),
        Line::from(format!("Short break  {} min", settings.short_break_duration)),
        Line::from(format!("Long break   {} min", settings.long_break_duration)),
        Line::from(format!("Long break every {} sessions", settings.sessions_before_long_break)),
        Line::from(format!("Waiting      {}", waiting)),
    ])
    .block(card(" Settings (e) ", false, c));
    frame.render_widget(summary, settings_area);

    let tips_block = card(" Focus Tips ", false, c);
    if app.state.tips.all().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No tips left", Style::default().fg(Color::DarkGray)))
                .block(tips_block),
            tips_list_area,
        );
        return;
    }
    let items: Vec<ListItem> = app
        .state
        .tips
        .all()
        .iter()
        .map(|tip| ListItem::new(format!("• {}", tip)))
        .collect();
    let list = List::new(items)
        .block(tips_block)
        .highlight_style(Style::default().bg(c.border))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, tips_list_area, &mut app.tip_state);
}

// Assistant

fn render_assistant_screen(app: &mut App, frame: &mut Frame, area: Rect, c: Colors) {
    let [sidebar_area, chat_area] = Layout::horizontal([
        Constraint::Length(30),
        Constraint::Min(0),
    ])
    .areas(area);

    render_conversation_list(app, frame, sidebar_area, c);

    let [log_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(chat_area);

    render_chat_log(app, frame, log_area, c);
    render_chat_input(app, frame, input_area, c);
}

fn render_conversation_list(app: &App, frame: &mut Frame, area: Rect, c: Colors) {
    let block = card(" Conversations ", false, c);
    let today = Local::now().date_naive();
    let conversations = app.state.assistant.conversations();

    let items: Vec<ListItem> = conversations
        .iter()
        .map(|conv| {
            ListItem::new(vec![
                Line::from(Span::styled(conv.title.clone(), Style::default().bold())),
                Line::from(Span::styled(
                    format!(" {}", day_label(conv.updated_at.date_naive(), today)),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let mut state = ListState::default();
    state.select(
        app.state
            .assistant
            .current_id()
            .and_then(|id| conversations.iter().position(|conv| conv.id == id)),
    );

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(c.border).fg(c.primary))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if date == today - Duration::days(1) {
        "Yesterday".to_string()
    } else {
        date.format("%b %-d").to_string()
    }
}

fn render_chat_log(app: &App, frame: &mut Frame, area: Rect, c: Colors) {
    let assistant = &app.state.assistant;
    let title = assistant
        .current()
        .map(|conv| format!(" {} ", conv.title))
        .unwrap_or_else(|| " Assistant ".to_string());
    let block = card(title, app.input_mode == InputMode::Normal, c);
    let inner = block.inner(area);

    let Some(conversation) = assistant.current() else {
        let placeholder = Paragraph::new(Span::styled(
            "No conversation selected. Press 'N' to start one.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    for msg in &conversation.messages {
        let (name, color) = match msg.role {
            ChatRole::User => ("You", c.primary),
            ChatRole::Assistant => ("Assistant", c.secondary),
        };
        lines.push(Line::from(vec![
            Span::styled(name, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  {}", msg.timestamp.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for line in msg.content.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }

    if assistant.is_loading() {
        lines.push(Line::from(Span::styled(
            "Assistant",
            Style::default().fg(c.secondary).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let total = wrapped_height(&lines, inner.width);
    let bottom = total.saturating_sub(inner.height);
    let scroll = bottom.saturating_sub(app.chat_scroll_back);

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Rows the lines occupy once wrapped to `width`
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| {
            let chars = line.width();
            if chars == 0 { 1 } else { chars.div_ceil(width) }
        })
        .sum::<usize>()
        .min(u16::MAX as usize) as u16
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect, c: Colors) {
    let editing = app.input_mode == InputMode::Editing && app.form.is_none();
    let title = if app.state.assistant.is_loading() { " Waiting for reply " } else { " Message " };
    let block = card(title, editing, c);
    let inner = block.inner(area);

    let content = if app.chat_input.value.is_empty() && !editing {
        Span::styled("Ask me anything... (press i)", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.chat_input.value.clone())
    };
    frame.render_widget(Paragraph::new(content).block(block), area);

    if editing {
        let cursor_x = app.chat_input.cursor.min(inner.width.saturating_sub(1) as usize) as u16;
        frame.set_cursor_position((inner.x + cursor_x, inner.y));
    }
}

// Forms

const LABEL_WIDTH: u16 = 28;

fn render_form(app: &App, form: &Form, frame: &mut Frame, area: Rect, c: Colors) {
    let header = form_header(app, form);
    let popup_width = 72.min(area.width.saturating_sub(4));
    let popup_height = (form.fields.len() as u16 + header.len() as u16 + 4).min(area.height.saturating_sub(2));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(c.primary))
        .style(Style::default().bg(c.card).fg(c.text))
        .title(format!(" {} ", form.title()));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = header;
    let first_field_row = lines.len() as u16;
    for (idx, field) in form.fields.iter().enumerate() {
        let focused = idx == form.focused;
        let label_style = if focused {
            Style::default().fg(c.primary).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![Span::styled(
            format!("{:<width$}", field.label, width = LABEL_WIDTH as usize),
            label_style,
        )];
        match &field.kind {
            FieldKind::Text(input) => spans.push(Span::raw(input.value.clone())),
            FieldKind::Choice { .. } => {
                let value = field.value();
                spans.push(Span::raw("< "));
                if value.starts_with('#') {
                    spans.push(Span::styled("■ ", Style::default().fg(hex(value))));
                }
                spans.push(Span::raw(value.to_string()));
                spans.push(Span::raw(" >"));
            }
        }
        let line = Line::from(spans);
        lines.push(if focused { line.style(Style::default().bg(c.border)) } else { line });
    }

    frame.render_widget(Paragraph::new(lines), inner);

    if app.input_mode == InputMode::Editing {
        if let Some(FieldKind::Text(input)) = form.focused_field().map(|f| &f.kind) {
            let max = inner.width.saturating_sub(LABEL_WIDTH + 1) as usize;
            let cursor_x = inner.x + LABEL_WIDTH + input.cursor.min(max) as u16;
            frame.set_cursor_position((cursor_x, inner.y + first_field_row + form.focused as u16));
        }
    }
}

fn form_header(app: &App, form: &Form) -> Vec<Line<'static>> {
    match form.kind {
        FormKind::TaskDetail => {
            let Some(task) = form.target_id.as_deref().and_then(|id| app.state.tasks.get(id)) else {
                return vec![Line::default()];
            };
            let status = match task.status {
                TaskStatus::Pending => "pending",
                TaskStatus::Completed => "completed",
            };
            let mut meta = format!(
                "{} · {} · {}",
                task.date.format("%a %b %-d, %Y"),
                task.task_type.label(),
                status
            );
            if let Some(minutes) = task.duration {
                meta.push_str(&format!(" · {} min", minutes));
            }
            vec![
                Line::from(Span::styled(meta, Style::default().fg(Color::DarkGray))),
                Line::default(),
            ]
        }
        FormKind::NewTask => vec![
            Line::from(Span::styled(
                format!("For {}", app.selected_date.format("%A, %B %-d")),
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
        ],
        FormKind::NewNote | FormKind::EditNote => vec![
            Line::from(Span::styled(
                "Separate tags with commas",
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
        ],
        FormKind::PomodoroSettings => vec![
            Line::from(Span::styled(
                "Durations in minutes. Waiting time 0 turns the pause between phases off.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_terminal_color() {
        assert_eq!(hex("#3b82f6"), Color::Rgb(0x3b, 0x82, 0xf6));
        assert_eq!(hex("blue"), Color::Reset);
    }

    #[test]
    fn test_day_labels() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 6).unwrap();
        assert_eq!(day_label(today, today), "Today");
        assert_eq!(day_label(today - Duration::days(1), today), "Yesterday");
        assert_eq!(day_label(today - Duration::days(3), today), "Jun 3");
    }

    #[test]
    fn test_time_range() {
        assert_eq!(time_range(Some("10:00"), Some("14:30")).as_deref(), Some("10:00 AM - 2:30 PM"));
        assert_eq!(time_range(None, None), None);
    }

    #[test]
    fn test_wrapped_height_counts_blank_lines() {
        let lines = vec![Line::from("abcdef"), Line::default()];
        assert_eq!(wrapped_height(&lines, 4), 3);
    }
}
