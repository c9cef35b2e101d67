//! Page layouts for the two report kinds.

use super::DateRange;
use super::pdf::PdfDocument;
use crate::model::UserRecord;
use crate::stats::AggregateStats;

const COLUMNS: [(f32, &str); 5] = [
    (20.0, "ID"),
    (40.0, "Name"),
    (90.0, "Email"),
    (150.0, "Status"),
    (175.0, "Created Date"),
];
const RULE_FROM: f32 = 20.0;
const RULE_TO: f32 = 190.0;
const ROW_STEP: f32 = 10.0;
/// A row whose cursor passes this goes to a new page.
const PAGE_BOTTOM: f32 = 270.0;
const CONTINUATION_TOP: f32 = 20.0;

fn header_row(doc: &mut PdfDocument, y: f32) {
    doc.set_font_size(10.0);
    for (x, title) in COLUMNS {
        doc.text(x, y, title);
    }
    doc.line(RULE_FROM, y + 2.0, RULE_TO, y + 2.0);
}

pub fn users_pdf(users: &[UserRecord], range: DateRange) -> PdfDocument {
    let mut doc = PdfDocument::new();
    doc.set_font_size(18.0);
    doc.text_centered(105.0, 15.0, "User Report");
    doc.set_font_size(12.0);
    doc.text_centered(105.0, 25.0, &format!("Date Range: {}", range.as_str()));
    doc.text_centered(105.0, 35.0, &format!("Total Users: {}", users.len()));

    header_row(&mut doc, 50.0);
    let mut y = 60.0;
    for user in users {
        if y > PAGE_BOTTOM {
            doc.add_page();
            header_row(&mut doc, CONTINUATION_TOP);
            y = CONTINUATION_TOP + ROW_STEP;
        }
        let created = user.created_date();
        let cells = [
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            user.status.as_str().to_string(),
            created,
        ];
        for ((x, _), cell) in COLUMNS.iter().zip(&cells) {
            doc.text(*x, y, cell);
        }
        y += ROW_STEP;
    }
    doc
}

pub fn statistics_pdf(stats: &AggregateStats) -> PdfDocument {
    let mut doc = PdfDocument::new();
    doc.set_font_size(18.0);
    doc.text_centered(105.0, 15.0, "Statistics Report");

    doc.set_font_size(14.0);
    doc.text(20.0, 30.0, "General Statistics");
    doc.set_font_size(10.0);
    let general = [
        ("Total Users", stats.total_users),
        ("Active Users", stats.active_users),
        ("Inactive Users", stats.inactive_users),
        ("New Users This Month", stats.new_users_this_month),
    ];
    for (i, (label, value)) in general.iter().enumerate() {
        doc.text(20.0, 40.0 + 10.0 * i as f32, &format!("{label}: {value}"));
    }

    doc.set_font_size(14.0);
    doc.text(20.0, 90.0, "Monthly Registration Stats");
    doc.set_font_size(10.0);
    doc.text(20.0, 100.0, "Month");
    doc.text(60.0, 100.0, "New Users");
    doc.line(20.0, 102.0, 100.0, 102.0);
    let mut y = 110.0;
    for m in &stats.users_by_month {
        doc.text(20.0, y, &m.month);
        doc.text(60.0, y, &m.count.to_string());
        y += ROW_STEP;
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::demo_records;
    use chrono::NaiveDate;

    fn count(hay: &[u8], needle: &[u8]) -> usize {
        hay.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn many_users(n: usize) -> Vec<UserRecord> {
        let base = demo_records();
        (0..n)
            .map(|i| {
                let mut u = base[i % base.len()].clone();
                u.id = i as u64 + 1;
                u
            })
            .collect()
    }

    #[test]
    fn users_fit_on_one_page_up_to_22_rows() {
        // rows at y = 60, 70, .., 270 fit; the 23rd would start at 280
        assert_eq!(users_pdf(&many_users(22), DateRange::All).page_count(), 1);
        assert_eq!(users_pdf(&many_users(23), DateRange::All).page_count(), 2);
    }

    #[test]
    fn continuation_pages_repeat_the_header() {
        let doc = users_pdf(&many_users(30), DateRange::ThisYear);
        assert_eq!(doc.page_count(), 2);
        let second = doc.page_content(1).unwrap();
        assert_eq!(count(second, b"(Created Date) Tj"), 1);
        assert_eq!(count(second, b"@example.com) Tj"), 8);
        let first = doc.page_content(0).unwrap();
        assert_eq!(count(first, b"(Date Range: thisYear) Tj"), 1);
        assert_eq!(count(first, b"(Total Users: 30) Tj"), 1);
    }

    #[test]
    fn empty_users_report_still_has_header() {
        let doc = users_pdf(&[], DateRange::All);
        assert_eq!(doc.page_count(), 1);
        let page = doc.page_content(0).unwrap();
        assert_eq!(count(page, b"(Total Users: 0) Tj"), 1);
        assert_eq!(count(page, b"(ID) Tj"), 1);
    }

    #[test]
    fn statistics_is_single_page_with_all_months() {
        let stats = AggregateStats::compute(
            &demo_records(),
            NaiveDate::from_ymd_opt(2023, 7, 31).unwrap(),
        );
        let doc = statistics_pdf(&stats);
        assert_eq!(doc.page_count(), 1);
        let page = doc.page_content(0).unwrap();
        assert_eq!(count(page, b"(Total Users: 7) Tj"), 1);
        assert_eq!(count(page, b"(Dec) Tj"), 1);
        assert!(doc.to_bytes().unwrap().starts_with(b"%PDF-1.4"));
    }
}
