use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Paragraph;

use crate::app::{AppState, Screen};
use crate::ui::components::{centered_rect, render_form};

/// Sign-in or registration form, centered in `area`.
pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let (form, title, hint) = match app.screen {
        Screen::Register => (
            &app.register_form,
            "Create an account",
            "All fields are required.",
        ),
        _ => (
            &app.login_form,
            "Sign in",
            "Local demo account: admin / admin",
        ),
    };
    let height = form.fields.len() as u16 + 8;
    let rect = centered_rect(64u16.min(area.width), height + 2, area);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(height), Constraint::Length(2)].as_ref())
        .split(rect);

    render_form(f, parts[0], app, form, title);
    let hint = Paragraph::new(format!("{hint}\nEsc: {}", esc_label(app.screen)))
        .style(Style::default().fg(app.theme.muted));
    f.render_widget(hint, parts[1]);
}

fn esc_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Register => "back to sign in",
        _ => "quit",
    }
}
