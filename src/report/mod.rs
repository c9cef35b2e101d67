//! Report generation: users or statistics, as CSV or PDF.
//!
//! A report is produced from a snapshot of records (and optionally
//! precomputed statistics) plus an [`ExportRequest`]. The result is an
//! in-memory [`Export`] which is then saved atomically into the export
//! directory.

pub mod csv;
pub mod layout;
pub mod pdf;

use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use tracing::info;

use crate::error::{AdminError, AdminResult};
use crate::model::UserRecord;
use crate::stats::AggregateStats;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReportKind {
    #[default]
    Users,
    Statistics,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Users => "users",
            ReportKind::Statistics => "statistics",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Users => "User Data",
            ReportKind::Statistics => "Statistics",
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" | "user" => Ok(ReportKind::Users),
            "statistics" | "stats" => Ok(ReportKind::Statistics),
            other => Err(format!("unknown report kind '{other}' (expected users|statistics)")),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Pdf => "PDF",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unknown format '{other}' (expected csv|pdf)")),
        }
    }
}

/// Creation-date window applied to users reports.
///
/// Bounds are inclusive below and exclusive above, at day granularity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    ThisMonth,
    LastMonth,
    ThisYear,
}

impl DateRange {
    pub const ALL: [DateRange; 4] = [
        DateRange::All,
        DateRange::ThisMonth,
        DateRange::LastMonth,
        DateRange::ThisYear,
    ];

    /// Identifier used in file names and PDF headers.
    pub fn as_str(self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::ThisMonth => "thisMonth",
            DateRange::LastMonth => "lastMonth",
            DateRange::ThisYear => "thisYear",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DateRange::All => "All Time",
            DateRange::ThisMonth => "This Month",
            DateRange::LastMonth => "Last Month",
            DateRange::ThisYear => "This Year",
        }
    }

    /// `(from, until)` relative to `today`; `None` means unbounded.
    pub fn bounds(self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let this_month = first_of_month(today.year(), today.month());
        match self {
            DateRange::All => (None, None),
            DateRange::ThisMonth => (Some(this_month), None),
            DateRange::LastMonth => {
                let (y, m) = if today.month() == 1 {
                    (today.year() - 1, 12)
                } else {
                    (today.year(), today.month() - 1)
                };
                (Some(first_of_month(y, m)), Some(this_month))
            }
            DateRange::ThisYear => (Some(first_of_month(today.year(), 1)), None),
        }
    }

    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        let (from, until) = self.bounds(today);
        from.is_none_or(|f| date >= f) && until.is_none_or(|u| date < u)
    }

    pub fn filter(self, records: &[UserRecord], today: NaiveDate) -> Vec<UserRecord> {
        records
            .iter()
            .filter(|r| self.contains(r.created_at, today))
            .cloned()
            .collect()
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match norm.as_str() {
            "all" | "alltime" => Ok(DateRange::All),
            "thismonth" => Ok(DateRange::ThisMonth),
            "lastmonth" => Ok(DateRange::LastMonth),
            "thisyear" => Ok(DateRange::ThisYear),
            _ => Err(format!(
                "unknown date range '{s}' (expected all|this-month|last-month|this-year)"
            )),
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Options for one export operation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportRequest {
    pub kind: ReportKind,
    pub format: ExportFormat,
    pub date_range: DateRange,
}

impl ExportRequest {
    pub fn new(kind: ReportKind, format: ExportFormat, date_range: DateRange) -> Self {
        Self {
            kind,
            format,
            date_range,
        }
    }

    /// `users_export_<range>_<date>.<ext>` or `statistics_export_<date>.<ext>`.
    pub fn file_name(&self, today: NaiveDate) -> String {
        let date = today.format("%Y-%m-%d");
        let ext = self.format.extension();
        match self.kind {
            ReportKind::Users => format!("users_export_{}_{date}.{ext}", self.date_range.as_str()),
            ReportKind::Statistics => format!("statistics_export_{date}.{ext}"),
        }
    }
}

/// A generated report held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Export {
    /// Write into `dir` through a temporary file and rename it into place,
    /// so a failure never leaves a partial report behind.
    pub fn save(&self, dir: &Path) -> AdminResult<PathBuf> {
        let fail = |what: &str, e: &dyn fmt::Display| {
            AdminError::export(format!("{what} {}: {e}", dir.display()))
        };
        std::fs::create_dir_all(dir).map_err(|e| fail("cannot create", &e))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| fail("cannot write to", &e))?;
        tmp.write_all(&self.bytes)
            .and_then(|_| tmp.flush())
            .map_err(|e| fail("cannot write to", &e))?;
        let target = dir.join(&self.file_name);
        tmp.persist(&target)
            .map_err(|e| fail("cannot persist into", &e.error))?;
        info!(path = %target.display(), bytes = self.bytes.len(), "report saved");
        Ok(target)
    }
}

/// Build the report described by `request`.
///
/// `stats` lets callers pass server-side figures; when absent they are
/// computed from `records`. The date range only applies to users reports.
pub fn generate(
    records: &[UserRecord],
    stats: Option<&AggregateStats>,
    request: &ExportRequest,
    today: NaiveDate,
) -> AdminResult<Export> {
    let bytes = match request.kind {
        ReportKind::Users => {
            let users = request.date_range.filter(records, today);
            match request.format {
                ExportFormat::Csv => csv::users_csv(&users).into_bytes(),
                ExportFormat::Pdf => layout::users_pdf(&users, request.date_range).to_bytes()?,
            }
        }
        ReportKind::Statistics => {
            let computed;
            let stats = match stats {
                Some(s) => s,
                None => {
                    computed = AggregateStats::compute(records, today);
                    &computed
                }
            };
            match request.format {
                ExportFormat::Csv => csv::statistics_csv(stats).into_bytes(),
                ExportFormat::Pdf => layout::statistics_pdf(stats).to_bytes()?,
            }
        }
    };
    info!(
        kind = request.kind.as_str(),
        format = request.format.extension(),
        range = request.date_range.as_str(),
        bytes = bytes.len(),
        "report generated"
    );
    Ok(Export {
        file_name: request.file_name(today),
        content_type: request.format.content_type(),
        bytes,
    })
}
