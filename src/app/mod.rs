//! Application state types and entry glue.
//!
//! Defines the screens, modal and toast state of the TUI, the queued
//! backend actions, and the `AppState` that ties them to a [`Backend`]
//! and the [`AuthGate`]. The event loop lives in [`update`] (re-exported as `run`).

pub mod filterconf;
pub mod forms;
pub mod keymap;
pub mod update;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use ratatui::style::Color;

use crate::auth::{AuthGate, AuthState, Registration};
use crate::backend::Backend;
use crate::config::{ConfigPaths, Settings};
use crate::model::{FormData, Status, UserFields, UserRecord};
use crate::report::ExportRequest;
use crate::repo::{page_count, paginate};
use crate::stats::AggregateStats;

use self::filterconf::FiltersConfig;
use self::forms::{Form, UserForm};
use self::keymap::Keymap;

/// How long a toast stays in the status bar.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Dashboard,
    Users,
    Detail(u64),
    NewUser,
    EditUser(u64),
    FormResult,
    Export,
}

impl Screen {
    /// Screens reachable from the tab bar, in order.
    pub const TABS: [Screen; 4] = [Screen::Dashboard, Screen::Users, Screen::NewUser, Screen::Export];

    pub fn tab_title(self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::Users | Screen::Detail(_) | Screen::EditUser(_) => "Users",
            Screen::NewUser | Screen::FormResult => "New user",
            Screen::Export => "Export",
            Screen::Login => "Sign in",
            Screen::Register => "Register",
        }
    }

    /// Position in [`Screen::TABS`] of the tab this screen belongs to.
    pub fn tab_index(self) -> Option<usize> {
        let title = self.tab_title();
        Self::TABS.iter().position(|t| t.tab_title() == title)
    }

    pub fn is_public(self) -> bool {
        matches!(self, Screen::Login | Screen::Register)
    }

    /// Screens whose keys go to a form instead of the keymap.
    pub fn is_form(self) -> bool {
        matches!(
            self,
            Screen::Login | Screen::Register | Screen::NewUser | Screen::EditUser(_) | Screen::Export
        )
    }
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Editing,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub success: Color,
    pub error: Color,
}

impl Theme {
    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            success: Color::Rgb(0xa6, 0xe3, 0xa1),      // green
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &std::path::Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            if let Some(color) = Self::parse_color(val) {
                match key {
                    "text" => theme.text = color,
                    "muted" => theme.muted = color,
                    "title" => theme.title = color,
                    "border" => theme.border = color,
                    "header_bg" => theme.header_bg = color,
                    "header_fg" => theme.header_fg = color,
                    "status_bg" => theme.status_bg = color,
                    "status_fg" => theme.status_fg = color,
                    "highlight_fg" => theme.highlight_fg = color,
                    "highlight_bg" => theme.highlight_bg = color,
                    "success" => theme.success = color,
                    "error" => theme.error = color,
                    _ => {}
                }
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB"), "index:N", or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        if let Some(i) = lower.strip_prefix("index:") {
            return i.parse().ok().map(Color::Indexed);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() == 6
            && hex.is_ascii()
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Some(Color::Rgb(r, g, b));
        }
        None
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# user-admin theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, index:N, or 'reset'\n\n");

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                Color::Reset => "reset".to_string(),
                // Named colors: best-effort hex approximation
                Color::Black => "#000000".to_string(),
                Color::Red => "#FF0000".to_string(),
                Color::Green => "#00FF00".to_string(),
                Color::Yellow => "#FFFF00".to_string(),
                Color::Blue => "#0000FF".to_string(),
                Color::Magenta => "#FF00FF".to_string(),
                Color::Cyan => "#00FFFF".to_string(),
                Color::Gray => "#B3B3B3".to_string(),
                Color::DarkGray => "#4D4D4D".to_string(),
                Color::LightRed => "#FF6666".to_string(),
                Color::LightGreen => "#66FF66".to_string(),
                Color::LightYellow => "#FFFF66".to_string(),
                Color::LightBlue => "#6666FF".to_string(),
                Color::LightMagenta => "#FF66FF".to_string(),
                Color::LightCyan => "#66FFFF".to_string(),
                Color::White => "#FFFFFF".to_string(),
                Color::Indexed(i) => format!("index:{}", i),
            }
        }

        let mut kv = |k: &str, v: Color| {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        };
        kv("text", self.text);
        kv("muted", self.muted);
        kv("title", self.title);
        kv("border", self.border);
        kv("header_bg", self.header_bg);
        kv("header_fg", self.header_fg);
        kv("status_bg", self.status_bg);
        kv("status_fg", self.status_fg);
        kv("highlight_fg", self.highlight_fg);
        kv("highlight_bg", self.highlight_bg);
        kv("success", self.success);
        kv("error", self.error);

        std::fs::write(path, buf)
    }

    /// Load `path`, or write and return `mocha` when it does not exist.
    pub fn load_or_init(path: &std::path::Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        let _ = t.write_file(path);
        t
    }
}

/// Modal dialogs drawn over the current screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    /// `selected`: 0 = Yes, 1 = No.
    DeleteConfirm { id: u64, name: String, selected: usize },
    Help { scroll: u16 },
    Info { message: String },
}

/// Backend work queued by a key press and run once after the next frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    Login { identifier: String, secret: String },
    Register(Registration),
    Logout,
    /// Reload the record list and statistics.
    Refresh,
    OpenUser { id: u64, edit: bool },
    CreateUser(UserFields),
    UpdateUser { id: u64, fields: UserFields },
    DeleteUser { id: u64 },
    Export(ExportRequest),
}

impl PendingAction {
    pub fn label(&self) -> &'static str {
        match self {
            PendingAction::Login { .. } => "Signing in",
            PendingAction::Register(_) => "Creating account",
            PendingAction::Logout => "Signing out",
            PendingAction::Refresh => "Loading",
            PendingAction::OpenUser { .. } => "Loading user",
            PendingAction::CreateUser(_) => "Creating user",
            PendingAction::UpdateUser { .. } => "Saving",
            PendingAction::DeleteUser { .. } => "Deleting",
            PendingAction::Export(_) => "Exporting",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
}

pub struct AppState {
    pub started_at: Instant,
    pub backend: Box<dyn Backend>,
    pub auth: AuthGate,
    pub settings: Settings,
    /// Where `filter.conf` is saved; `None` keeps filters in memory only.
    pub filters_path: Option<PathBuf>,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub users_all: Vec<UserRecord>,
    pub users: Vec<UserRecord>,
    /// Absolute index into `users`.
    pub selected_user_index: usize,
    /// 1-based.
    pub current_page: usize,
    pub rows_per_page: usize,
    pub search_query: String,
    pub status_filter: Option<Status>,
    pub stats: Option<AggregateStats>,
    pub detail: Option<UserRecord>,
    pub login_form: Form,
    pub register_form: Form,
    pub user_form: UserForm,
    pub export_form: Form,
    pub form_result: Option<FormData>,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub toast: Option<Toast>,
    pub pending: Option<PendingAction>,
    pub should_quit: bool,
    /// Fixed "today" for reports and statistics; `None` uses the local date.
    pub today_override: Option<NaiveDate>,
}

impl AppState {
    /// State with default theme, keymap and filters, starting on the login screen.
    pub fn new(backend: Box<dyn Backend>, auth: AuthGate, settings: Settings) -> Self {
        let rows_per_page = settings.page_size.max(1);
        Self {
            started_at: Instant::now(),
            backend,
            auth,
            settings,
            filters_path: None,
            screen: Screen::Login,
            input_mode: InputMode::Editing,
            users_all: Vec::new(),
            users: Vec::new(),
            selected_user_index: 0,
            current_page: 1,
            rows_per_page,
            search_query: String::new(),
            status_filter: None,
            stats: None,
            detail: None,
            login_form: forms::login_form(),
            register_form: forms::register_form(),
            user_form: UserForm::new(),
            export_form: forms::export_form(),
            form_result: None,
            theme: Theme::mocha(),
            keymap: Keymap::default(),
            modal: None,
            toast: None,
            pending: None,
            should_quit: false,
            today_override: None,
        }
    }

    /// Load theme, keymap and filters from the config directory, then
    /// restore any persisted session.
    pub fn bootstrap(
        backend: Box<dyn Backend>,
        auth: AuthGate,
        settings: Settings,
        paths: &ConfigPaths,
    ) -> Self {
        let mut app = Self::new(backend, auth, settings);
        app.theme = Theme::load_or_init(&paths.theme());
        app.keymap = Keymap::load_or_init(&paths.keybinds());
        let base = FiltersConfig {
            status: None,
            page_size: app.rows_per_page,
        };
        FiltersConfig::load_or_init(&paths.filters(), base).apply_to(&mut app);
        app.filters_path = Some(paths.filters());
        app.restore_session();
        app
    }

    pub fn restore_session(&mut self) {
        let restored = self.auth.is_authenticated()
            || matches!(
                self.auth.restore(self.backend.as_mut()),
                AuthState::Authenticated(_)
            );
        if restored {
            self.go(Screen::Dashboard);
            self.pending = Some(PendingAction::Refresh);
        } else {
            self.go(Screen::Login);
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today_override
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Switch screens. Protected screens redirect to Login when signed out.
    pub fn go(&mut self, screen: Screen) {
        let screen = if !screen.is_public() && !self.auth.is_authenticated() {
            Screen::Login
        } else {
            screen
        };
        self.screen = screen;
        self.modal = None;
        self.input_mode = if screen.is_form() {
            InputMode::Editing
        } else {
            InputMode::Normal
        };
    }

    pub fn toast_success(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            kind: ToastKind::Success,
            shown_at: Instant::now(),
        });
    }

    pub fn toast_error(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            kind: ToastKind::Error,
            shown_at: Instant::now(),
        });
    }

    pub fn expire_toast(&mut self) {
        if self
            .toast
            .as_ref()
            .is_some_and(|t| t.shown_at.elapsed() >= TOAST_TTL)
        {
            self.toast = None;
        }
    }

    pub fn page_count(&self) -> usize {
        page_count(self.users.len(), self.rows_per_page)
    }

    /// Rows of the current page.
    pub fn page_rows(&self) -> &[UserRecord] {
        paginate(&self.users, self.rows_per_page, self.current_page)
    }

    pub fn selected_user(&self) -> Option<&UserRecord> {
        self.users.get(self.selected_user_index)
    }

    /// Keep the current page in step with the selection.
    pub fn sync_page_to_selection(&mut self) {
        let size = self.rows_per_page.max(1);
        self.current_page = self.selected_user_index / size + 1;
    }

    pub fn save_filters(&self) {
        if let Some(path) = &self.filters_path
            && let Err(e) = FiltersConfig::save_from_app(self, path)
        {
            tracing::warn!(path = %path.display(), error = %e, "could not save filters");
        }
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
