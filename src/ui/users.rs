use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};

use crate::app::{AppState, InputMode};
use crate::model::{Status, UserRecord};

/// Search prompt, the current page of the users table and a preview of the
/// selected record.
pub fn render_users(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)].as_ref())
        .split(area);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)].as_ref())
        .split(rows[1]);

    render_search(f, rows[0], app);
    render_users_table(f, body[0], app);
    if let Some(user) = app.selected_user() {
        render_user_details(f, body[1], app, user, "Selected");
    } else {
        let p = Paragraph::new("No users match the current search and filter.")
            .style(Style::default().fg(app.theme.muted))
            .block(
                Block::default()
                    .title("Selected")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
        f.render_widget(p, body[1]);
    }
}

fn render_search(f: &mut Frame, area: Rect, app: &AppState) {
    let searching = app.input_mode == InputMode::Search;
    let query = if searching {
        format!("{}_", app.search_query)
    } else if app.search_query.is_empty() {
        "press / to search by name or email".to_string()
    } else {
        app.search_query.clone()
    };
    let query_style = if searching {
        Style::default().fg(app.theme.highlight_fg)
    } else if app.search_query.is_empty() {
        Style::default().fg(app.theme.muted)
    } else {
        Style::default().fg(app.theme.text)
    };
    let filter = match app.status_filter {
        None => "All statuses",
        Some(s) => s.label(),
    };
    let line = Line::from(vec![
        Span::styled("Search: ", Style::default().fg(app.theme.title)),
        Span::styled(query, query_style),
        Span::raw("   "),
        Span::styled("Status (f): ", Style::default().fg(app.theme.title)),
        Span::styled(filter, Style::default().fg(app.theme.text)),
    ]);
    let p = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}

pub fn render_users_table(f: &mut Frame, area: Rect, app: &AppState) {
    let start = (app.current_page.max(1) - 1) * app.rows_per_page.max(1);
    let slice = app.page_rows();

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let absolute_index = start + i;
        let style = if absolute_index == app.selected_user_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(vec![
            Cell::from(u.id.to_string()),
            Cell::from(u.name.clone()),
            Cell::from(u.email.clone()),
            status_cell(app, u.status),
            Cell::from(u.created_date()),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(30),
        Constraint::Percentage(40),
        Constraint::Length(9),
        Constraint::Length(11),
    ];

    let header = Row::new(vec!["ID", "NAME", "EMAIL", "STATUS", "CREATED"]).style(
        Style::default()
            .fg(app.theme.title)
            .add_modifier(Modifier::BOLD),
    );

    let title = format!(
        "Users ({}) page {}/{}",
        app.users.len(),
        app.current_page,
        app.page_count()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}

fn status_cell(app: &AppState, status: Status) -> Cell<'static> {
    let fg = match status {
        Status::Active => app.theme.success,
        Status::Inactive => app.theme.muted,
    };
    Cell::from(status.label()).style(Style::default().fg(fg))
}

/// Full record view used by the detail screen and the list preview.
pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState, user: &UserRecord, title: &str) {
    let label = Style::default().fg(app.theme.title);
    let field = |name: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{name:>9}: "), label),
            Span::styled(value, Style::default().fg(app.theme.text)),
        ])
    };
    let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let location = user.location();
    let lines = vec![
        field("ID", user.id.to_string()),
        field("Name", user.name.clone()),
        field("Email", user.email.clone()),
        field("Phone", opt(&user.phone)),
        field("Address", opt(&user.address)),
        field("Location", if location.is_empty() { "-".into() } else { location }),
        Line::from(vec![
            Span::styled(format!("{:>9}: ", "Status"), label),
            Span::styled(
                user.status.label(),
                Style::default().fg(match user.status {
                    Status::Active => app.theme.success,
                    Status::Inactive => app.theme.muted,
                }),
            ),
        ]),
        field("Created", user.created_date()),
        field(
            "Photo",
            user.photo
                .as_ref()
                .map(|p| p.describe())
                .unwrap_or_else(|| "none".to_string()),
        ),
    ];
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}

pub fn render_detail(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(area);
    match &app.detail {
        Some(user) => render_user_details(f, rows[0], app, user, &format!("User #{}", user.id)),
        None => f.render_widget(Paragraph::new("Loading..."), rows[0]),
    }
    let hint = Paragraph::new("e: edit   d: delete   Esc: back to list")
        .style(Style::default().fg(app.theme.muted));
    f.render_widget(hint, rows[1]);
}
