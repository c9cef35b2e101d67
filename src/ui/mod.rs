pub mod components;
pub mod dashboard;
pub mod export;
pub mod form;
pub mod login;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use crate::app::{AppState, ModalState, Screen};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    render_header(f, root[0], app);

    match app.screen {
        Screen::Login | Screen::Register => login::render(f, root[1], app),
        Screen::Dashboard => dashboard::render(f, root[1], app),
        Screen::Users => users::render_users(f, root[1], app),
        Screen::Detail(_) => users::render_detail(f, root[1], app),
        Screen::NewUser | Screen::EditUser(_) => form::render_user_form(f, root[1], app),
        Screen::FormResult => form::render_form_result(f, root[1], app),
        Screen::Export => export::render(f, root[1], app),
    }

    components::render_status_bar(f, root[2], app);

    if app.modal.is_some() {
        render_modal(f, f.area(), app);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .title("user-admin")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    if app.screen.is_public() {
        let p = Paragraph::new(format!("{}  (backend: {})", app.screen.tab_title(), app.backend.name()))
            .block(block)
            .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
        f.render_widget(p, area);
        return;
    }

    let titles: Vec<&str> = Screen::TABS.iter().map(|s| s.tab_title()).collect();
    let tabs = Tabs::new(titles)
        .select(app.screen.tab_index().unwrap_or(0))
        .block(block)
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg))
        .highlight_style(
            Style::default()
                .fg(app.theme.highlight_fg)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    f.render_widget(tabs, area);
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    if let Some(state) = app.modal.as_ref() {
        match state {
            ModalState::DeleteConfirm { .. } => {
                components::render_delete_modal(f, area, app, state);
            }
            ModalState::Help { scroll } => {
                components::render_help_modal(f, area, app, *scroll);
            }
            ModalState::Info { .. } => {
                components::render_info_modal(f, area, app, state);
            }
        }
    }
}
