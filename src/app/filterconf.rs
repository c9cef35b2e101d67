//! Filters configuration: parse/write `filter.conf` and apply to AppState.
//!
//! Persists the users-list status filter and page size between runs.

use std::path::Path;

use super::AppState;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::model::Status;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FiltersConfig {
    /// `None` shows every status.
    pub status: Option<Status>,
    pub page_size: usize,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            status: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FiltersConfig {
    pub fn from_app(app: &AppState) -> Self {
        Self {
            status: app.status_filter,
            page_size: app.rows_per_page,
        }
    }

    pub fn save_from_app(app: &AppState, path: &Path) -> std::io::Result<()> {
        Self::from_app(app).write_file(path)
    }

    /// Load `path`, or write and return `base` when it does not exist.
    pub fn load_or_init(path: &Path, base: Self) -> Self {
        if path.exists() {
            return Self::from_file(path, base.clone()).unwrap_or(base);
        }
        let _ = base.write_file(path);
        base
    }

    /// `<key> = <value>` lines; comments and unknown keys are skipped.
    pub fn from_file(path: &Path, base: Self) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut cfg = base;
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let lhs = parts.next().map(|s| s.trim()).unwrap_or("");
            let rhs = parts.next().map(|s| s.trim()).unwrap_or("");
            if lhs.is_empty() || rhs.is_empty() {
                continue;
            }
            match lhs {
                "status" => {
                    cfg.status = match rhs {
                        "all" | "none" | "None" => None,
                        other => other.parse::<Status>().ok().or(cfg.status),
                    };
                }
                "page_size" => {
                    if let Ok(n) = rhs.parse::<usize>()
                        && n > 0
                    {
                        cfg.page_size = n;
                    }
                }
                _ => {}
            }
        }
        Some(cfg)
    }

    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# user-admin list filters\n");
        buf.push_str("# status: all|active|inactive\n");
        let _ = writeln!(
            &mut buf,
            "status = {}",
            self.status.map(Status::as_str).unwrap_or("all")
        );
        let _ = writeln!(&mut buf, "page_size = {}", self.page_size);
        std::fs::write(path, buf)
    }

    pub fn apply_to(&self, app: &mut AppState) {
        app.status_filter = self.status;
        app.rows_per_page = self.page_size.max(1);
    }
}
