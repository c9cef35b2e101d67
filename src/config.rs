//! Configuration directory layout and `settings.conf`.
//!
//! All configuration lives in one directory, chosen by `--config-dir`,
//! `USER_ADMIN_CONFIG_DIR`, or `<platform config dir>/user-admin`. Files are
//! `key = value` lines; `#` starts a comment. Missing files are written with
//! defaults on first run.

use std::path::{Path, PathBuf};


pub const APP_DIR_NAME: &str = "user-admin";
pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Well-known files inside the configuration directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigPaths {
    pub dir: PathBuf,
}

impl ConfigPaths {
    /// Use `explicit` when given, else the platform default. Falls back to
    /// the current directory when no platform directory is known.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let dir = match explicit {
            Some(p) => p.to_path_buf(),
            None => dirs::config_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        Self { dir }
    }

    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    pub fn settings(&self) -> PathBuf {
        self.dir.join("settings.conf")
    }

    pub fn theme(&self) -> PathBuf {
        self.dir.join("theme.conf")
    }

    pub fn keybinds(&self) -> PathBuf {
        self.dir.join("keybinds.conf")
    }

    pub fn filters(&self) -> PathBuf {
        self.dir.join("filter.conf")
    }

    pub fn log_file(&self) -> PathBuf {
        self.dir.join("user-admin.log")
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.dir.join("storage")
    }

    pub fn default_export_dir(&self) -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| self.dir.join("exports"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Remote API base URL; `None` runs on local demo data.
    pub api_url: Option<String>,
    pub export_dir: PathBuf,
    pub page_size: usize,
    pub log_level: String,
}

impl Settings {
    pub fn defaults(paths: &ConfigPaths) -> Self {
        Self {
            api_url: None,
            export_dir: paths.default_export_dir(),
            page_size: DEFAULT_PAGE_SIZE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Read `settings.conf`, writing defaults first if it does not exist.
    ///
    /// Runs before logging is set up, so a failed write of the defaults is
    /// handed back for the caller to log; the defaults are used either way.
    pub fn load_or_init(paths: &ConfigPaths) -> (Self, Option<std::io::Error>) {
        let path = paths.settings();
        let defaults = Self::defaults(paths);
        if path.exists() {
            return (Self::from_file(&path, defaults.clone()).unwrap_or(defaults), None);
        }
        let err = paths
            .ensure_dir()
            .and_then(|_| defaults.write_file(&path))
            .err();
        (defaults, err)
    }

    /// Parse `path` over `base`. Unknown keys and bad values are ignored.
    pub fn from_file(path: &Path, base: Self) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents, base))
    }

    pub fn parse(contents: &str, mut base: Self) -> Self {
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let (key, val) = (key.trim(), val.trim());
            match key {
                "api_url" => base.api_url = (!val.is_empty()).then(|| val.to_string()),
                "export_dir" if !val.is_empty() => base.export_dir = expand_home(val),
                "page_size" => {
                    if let Ok(n) = val.parse::<usize>()
                        && n > 0
                    {
                        base.page_size = n;
                    }
                }
                "log_level" if !val.is_empty() => base.log_level = val.to_string(),
                _ => {}
            }
        }
        base
    }

    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# user-admin settings\n");
        buf.push_str("# api_url: leave empty to use built-in demo data, e.g. http://localhost:8000/api\n");
        let _ = writeln!(buf, "api_url = {}", self.api_url.as_deref().unwrap_or(""));
        let _ = writeln!(buf, "export_dir = {}", self.export_dir.display());
        let _ = writeln!(buf, "page_size = {}", self.page_size);
        buf.push_str("# log_level: error|warn|info|debug|trace or an env-filter directive\n");
        let _ = writeln!(buf, "log_level = {}", self.log_level);
        std::fs::write(path, buf)
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(val: &str) -> PathBuf {
    match (val.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(val),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(dir: &Path) -> ConfigPaths {
        ConfigPaths::resolve(Some(dir))
    }

    #[test]
    fn first_run_writes_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let p = paths(&tmp.path().join("cfg"));
        let (s, err) = Settings::load_or_init(&p);
        assert!(err.is_none());
        assert_eq!(s.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(s.api_url, None);
        assert!(p.settings().exists());
        assert_eq!(Settings::load_or_init(&p).0, s);
    }

    #[test]
    fn file_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let p = paths(tmp.path());
        let s = Settings {
            api_url: Some("http://localhost:8000/api".into()),
            export_dir: tmp.path().join("out"),
            page_size: 12,
            log_level: "debug".into(),
        };
        s.write_file(&p.settings()).unwrap();
        assert_eq!(Settings::load_or_init(&p).0, s);
    }

    #[test]
    fn failed_default_write_is_returned() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let p = paths(&blocker);
        let (s, err) = Settings::load_or_init(&p);
        assert!(err.is_some());
        assert_eq!(s, Settings::defaults(&p));
    }

    #[test]
    fn bad_values_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let base = Settings::defaults(&paths(tmp.path()));
        let s = Settings::parse("page_size = zero\nbogus = 1\napi_url =\n", base.clone());
        assert_eq!(s, base);
    }
}
