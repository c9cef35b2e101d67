//! Shared UI components (status bar, forms, modal helpers).
//!
//! Contains small building blocks reused by every screen.
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::forms::{FieldKind, Form};
use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState, ToastKind};

/// Render the bottom status bar: mode, counts, page and filter, or the
/// current toast / working indicator.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    if let Some(pending) = &app.pending {
        let p = Paragraph::new(format!("{}...", pending.label())).style(
            Style::default()
                .fg(app.theme.status_fg)
                .bg(app.theme.status_bg)
                .add_modifier(Modifier::ITALIC),
        );
        f.render_widget(p, area);
        return;
    }
    if let Some(toast) = &app.toast {
        let fg = match toast.kind {
            ToastKind::Success => app.theme.success,
            ToastKind::Error => app.theme.error,
        };
        let p = Paragraph::new(toast.message.clone()).style(
            Style::default()
                .fg(fg)
                .bg(app.theme.status_bg)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(p, area);
        return;
    }

    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Editing => "EDIT",
        InputMode::Modal => "MODAL",
    };
    let filter = app.status_filter.map(|s| s.as_str()).unwrap_or("all");
    let who = app
        .auth
        .user()
        .map(|u| format!("  {} ({})", u.name, u.role))
        .unwrap_or_default();
    let msg = format!(
        "mode: {mode}  users:{}/{}  page:{}/{}  filter:{filter}  backend:{}{who}  ?: help",
        app.users.len(),
        app.users_all.len(),
        app.current_page,
        app.page_count(),
        app.backend.name(),
    );
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Draw a form: one line per field, then the button row and any error.
pub fn render_form(f: &mut Frame, area: Rect, app: &AppState, form: &Form, title: &str) {
    let focused = Style::default()
        .fg(app.theme.highlight_fg)
        .bg(app.theme.highlight_bg)
        .add_modifier(Modifier::BOLD);
    let label_w = form
        .fields
        .iter()
        .map(|fl| fl.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = Vec::new();
    for (idx, field) in form.fields.iter().enumerate() {
        let is_focus = form.focus == idx;
        let marker = if is_focus { "▶ " } else { "  " };
        let value = match field.kind {
            FieldKind::Choice(_) => format!("< {} >", field.display()),
            _ if is_focus => format!("{}_", field.display()),
            _ => field.display(),
        };
        let value_style = if !field.enabled {
            Style::default().fg(app.theme.muted)
        } else if is_focus {
            focused
        } else {
            Style::default().fg(app.theme.text)
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(
                format!("{:>w$}: ", field.label, w = label_w),
                Style::default().fg(app.theme.title),
            ),
            Span::styled(value, value_style),
        ]));
    }

    lines.push(Line::raw(""));
    let mut buttons: Vec<Span> = vec![Span::raw("  ")];
    for (idx, label) in form.actions.iter().enumerate() {
        let style = if form.focused_action() == Some(idx) {
            focused.add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(app.theme.text)
        };
        buttons.push(Span::styled(format!("[ {label} ]"), style));
        buttons.push(Span::raw("  "));
    }
    lines.push(Line::from(buttons));

    if let Some(err) = &form.error {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(app.theme.error),
        )));
    }

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::Info { message } = state {
        let max_w = area.width.saturating_sub(6).max(30);
        let min_w = 40u16.min(max_w);
        let approx_lines = (message.len() as u16 / (min_w.saturating_sub(4).max(10))).max(1);
        let max_h = area.height.saturating_sub(6).max(5);
        let height = (approx_lines + 4).min(max_h).max(5);
        let rect = centered_rect(min_w, height, area);
        let p = Paragraph::new(message.clone())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Info")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Yes/No confirmation before a record is deleted.
pub fn render_delete_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::DeleteConfirm { id, name, selected } = state {
        let rect = centered_rect(50u16.min(area.width), 7, area);
        let choice = |idx: usize, label: &'static str| {
            if idx == *selected {
                Span::styled(
                    format!("[ {label} ]"),
                    Style::default()
                        .fg(app.theme.highlight_fg)
                        .add_modifier(Modifier::REVERSED),
                )
            } else {
                Span::raw(format!("  {label}  "))
            }
        };
        let lines = vec![
            Line::raw(format!("Delete user #{id} '{name}'?")),
            Line::raw("This cannot be undone."),
            Line::raw(""),
            Line::from(vec![choice(0, "Yes"), Span::raw("   "), choice(1, "No")]),
        ];
        let p = Paragraph::new(lines).block(
            Block::default()
                .title("Confirm delete")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.error)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

const HELP_GENERAL: [(&str, KeyAction); 6] = [
    ("Next tab", KeyAction::NextTab),
    ("Previous tab", KeyAction::PrevTab),
    ("Refresh", KeyAction::Refresh),
    ("Help", KeyAction::OpenHelp),
    ("Sign out", KeyAction::Logout),
    ("Quit", KeyAction::Quit),
];

const HELP_USERS: [(&str, KeyAction); 10] = [
    ("Move up", KeyAction::MoveUp),
    ("Move down", KeyAction::MoveDown),
    ("Previous page", KeyAction::PrevPage),
    ("Next page", KeyAction::NextPage),
    ("Search", KeyAction::StartSearch),
    ("Cycle status filter", KeyAction::CycleStatusFilter),
    ("Open details", KeyAction::OpenSelection),
    ("Edit", KeyAction::EditSelection),
    ("Delete", KeyAction::DeleteSelection),
    ("New user", KeyAction::NewUser),
];

/// Render the help modal with the active keybindings.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 70u16.min(area.width.saturating_sub(4)).max(40);
    let height = 28u16.min(area.height.saturating_sub(2)).max(10);
    let rect = centered_rect(width, height, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let italic = Style::default().add_modifier(Modifier::ITALIC);
    let row = |label: &str, keys: String| {
        Line::from(vec![
            Span::raw(format!("  {label:>20} │ ")),
            Span::styled(keys, italic),
        ])
    };

    let mut lines: Vec<Line> = vec![Line::from(Span::styled("General:", bold))];
    for (label, action) in HELP_GENERAL {
        lines.push(row(label, app.keymap.keys_for(action).join(", ")));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Users list:", bold)));
    for (label, action) in HELP_USERS {
        lines.push(row(label, app.keymap.keys_for(action).join(", ")));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Forms:", bold)));
    for (label, keys) in [
        ("Next / previous", "Tab, Down / Shift+Tab, Up"),
        ("Change choice", "Space, Left, Right"),
        ("Submit", "Enter on a button"),
        ("Cancel", "Esc"),
    ] {
        lines.push(row(label, keys.to_string()));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::raw("Close help: "),
        Span::styled("Esc / Enter", italic),
    ]));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
