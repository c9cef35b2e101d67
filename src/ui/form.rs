use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::AppState;
use crate::ui::components::render_form;

pub fn render_user_form(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(2)].as_ref())
        .split(area);
    let uf = &app.user_form;
    render_form(f, rows[0], app, &uf.form, &uf.title());

    let mut hint = String::from("Photo file: path to an image, uploaded with the record.");
    if let Some(current) = &uf.current_photo {
        hint.push_str(&format!("\nCurrent photo: {current} (kept when left empty)"));
    }
    let p = Paragraph::new(hint)
        .style(Style::default().fg(app.theme.muted))
        .wrap(Wrap { trim: true });
    f.render_widget(p, rows[1]);
}

/// The payload of the last created user, shown once.
pub fn render_form_result(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .title("User created")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let Some(data) = &app.form_result else {
        let p = Paragraph::new("No submitted data. Press Esc to return to the list.")
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        f.render_widget(p, area);
        return;
    };

    let label = Style::default().fg(app.theme.title);
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Submitted data",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
    ];
    for (name, value) in [
        ("Name", &data.name),
        ("Email", &data.email),
        ("Phone", &data.phone),
        ("Address", &data.address),
        ("City", &data.city),
        ("Country", &data.country),
        ("Photo", &data.photo_preview),
    ] {
        let shown = if value.is_empty() { "-" } else { value.as_str() };
        lines.push(Line::from(vec![
            Span::styled(format!("{name:>8}: "), label),
            Span::styled(shown.to_string(), Style::default().fg(app.theme.text)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Enter / Esc: back to the list",
        Style::default().fg(app.theme.muted),
    )));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    f.render_widget(p, area);
}
