//! CSV rendering. Rows are joined with `\n` and there is no trailing newline.

use crate::model::UserRecord;
use crate::stats::AggregateStats;

/// Quote a field only when it contains a delimiter, quote or line break.
pub fn escape(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}

fn row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(escape)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn users_csv(users: &[UserRecord]) -> String {
    let mut lines = vec![row(["ID", "Name", "Email", "Status", "Created Date"])];
    lines.extend(users.iter().map(|u| {
        let id = u.id.to_string();
        let created = u.created_date();
        row([
            id.as_str(),
            u.name.as_str(),
            u.email.as_str(),
            u.status.as_str(),
            created.as_str(),
        ])
    }));
    lines.join("\n")
}

pub fn statistics_csv(stats: &AggregateStats) -> String {
    let general = [
        ("Total Users", stats.total_users),
        ("Active Users", stats.active_users),
        ("Inactive Users", stats.inactive_users),
        ("New Users This Month", stats.new_users_this_month),
    ];
    let mut lines = vec!["Metric,Value".to_string()];
    lines.extend(general.iter().map(|(k, v)| format!("{k},{v}")));
    lines.push(",".into());
    lines.push("Monthly Registration Stats,".into());
    lines.push("Month,New Users".into());
    lines.extend(
        stats
            .users_by_month
            .iter()
            .map(|m| format!("{},{}", escape(&m.month), m.count)),
    );
    lines.join("\n")
}
