use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::app::AppState;
use crate::app::forms::export_request;
use crate::report::ReportKind;

/// Number of records shown in the users preview.
const PREVIEW_ROWS: usize = 5;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(2)].as_ref())
        .split(cols[0]);

    crate::ui::components::render_form(f, left[0], app, &app.export_form, "Export");
    let dest = Paragraph::new(format!(
        "Saved to: {}",
        app.settings.export_dir.display()
    ))
    .style(Style::default().fg(app.theme.muted));
    f.render_widget(dest, left[1]);

    // export_request takes the form mutably; read from a copy.
    let mut form = app.export_form.clone();
    let request = export_request(&mut form);
    let block = Block::default()
        .title(format!(
            "Preview: {} ({})",
            request.kind.label(),
            request.file_name(app.today())
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    match request.kind {
        ReportKind::Users => {
            let records = request.date_range.filter(&app.users_all, app.today());
            let total = records.len();
            let rows = records.into_iter().take(PREVIEW_ROWS).map(|u| {
                Row::new(vec![
                    Cell::from(u.id.to_string()),
                    Cell::from(u.name),
                    Cell::from(u.email),
                    Cell::from(u.status.as_str()),
                    Cell::from(u.created_at.format("%Y-%m-%d").to_string()),
                ])
            });
            let header = Row::new(vec!["ID", "Name", "Email", "Status", "Created"]).style(
                Style::default()
                    .fg(app.theme.title)
                    .add_modifier(Modifier::BOLD),
            );
            let widths = [
                Constraint::Length(4),
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Length(8),
                Constraint::Length(10),
            ];
            let table = Table::new(rows, widths)
                .header(header)
                .block(block.title_bottom(Line::from(format!(
                    " {} of {total} records, {} ",
                    total.min(PREVIEW_ROWS),
                    request.date_range.label()
                ))))
                .column_spacing(1);
            f.render_widget(table, cols[1]);
        }
        ReportKind::Statistics => {
            let mut lines: Vec<Line> = Vec::new();
            match &app.stats {
                Some(s) => {
                    lines.push(Line::raw(format!("Total Users: {}", s.total_users)));
                    lines.push(Line::raw(format!("Active Users: {}", s.active_users)));
                    lines.push(Line::raw(format!("Inactive Users: {}", s.inactive_users)));
                    lines.push(Line::raw(format!("New Users This Month: {}", s.new_users_this_month)));
                    lines.push(Line::raw(""));
                    for mc in &s.users_by_month {
                        lines.push(Line::raw(format!("{:<4}{}", mc.month, mc.count)));
                    }
                }
                None => lines.push(Line::raw("Statistics not loaded yet.")),
            }
            let p = Paragraph::new(lines)
                .style(Style::default().fg(app.theme.text))
                .block(block);
            f.render_widget(p, cols[1]);
        }
    }
}
