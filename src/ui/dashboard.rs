//! Dashboard: stat cards, monthly histogram, active ratio and recent records.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{BarChart, Block, Borders, Cell, Gauge, Paragraph, Row, Table};

use crate::app::AppState;
use crate::stats::AggregateStats;

/// Number of records listed under "Recent users".
const RECENT: usize = 5;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(8), Constraint::Length(3)].as_ref())
        .split(area);

    let empty;
    let stats = match app.stats.as_ref() {
        Some(s) => s,
        None => {
            empty = AggregateStats::compute(&[], app.today());
            &empty
        }
    };

    render_cards(f, rows[0], app, stats);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(rows[1]);
    render_histogram(f, middle[0], app, stats);
    render_recent(f, middle[1], app);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title("Active users")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .gauge_style(Style::default().fg(app.theme.success).bg(app.theme.header_bg))
        .percent(stats.active_percent().min(100));
    f.render_widget(gauge, rows[2]);
}

fn render_cards(f: &mut Frame, area: Rect, app: &AppState, stats: &AggregateStats) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4].as_ref())
        .split(area);
    let cards = [
        ("Total users", stats.total_users),
        ("Active", stats.active_users),
        ("Inactive", stats.inactive_users),
        ("New this month", stats.new_users_this_month),
    ];
    for (rect, (label, value)) in cols.iter().zip(cards) {
        let p = Paragraph::new(Line::from(Span::styled(
            value.to_string(),
            Style::default()
                .fg(app.theme.highlight_fg)
                .add_modifier(Modifier::BOLD),
        )))
        .block(
            Block::default()
                .title(label)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(p, *rect);
    }
}

fn render_histogram(f: &mut Frame, area: Rect, app: &AppState, stats: &AggregateStats) {
    let bars = stats.month_bars();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Users by month")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .data(bars.as_slice())
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(app.theme.title))
        .value_style(
            Style::default()
                .fg(app.theme.header_bg)
                .bg(app.theme.title),
        )
        .label_style(Style::default().fg(app.theme.text));
    f.render_widget(chart, area);
}

/// Most recently created records first.
fn render_recent(f: &mut Frame, area: Rect, app: &AppState) {
    let mut recent: Vec<_> = app.users_all.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    let rows = recent.into_iter().take(RECENT).map(|u| {
        let status_fg = if u.status == crate::model::Status::Active {
            app.theme.success
        } else {
            app.theme.muted
        };
        Row::new(vec![
            Cell::from(u.name.clone()),
            Cell::from(u.created_date()),
            Cell::from(u.status.label()).style(Style::default().fg(status_fg)),
        ])
    });
    let header = Row::new(vec!["Name", "Created", "Status"]).style(
        Style::default()
            .fg(app.theme.title)
            .add_modifier(Modifier::BOLD),
    );
    let widths = [Constraint::Percentage(50), Constraint::Length(11), Constraint::Length(9)];
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title("Recent users")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .column_spacing(1);
    f.render_widget(table, area);
}
