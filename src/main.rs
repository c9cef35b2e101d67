//! user-admin binary entry point.
//!
//! Parses the command line, loads configuration and logging, then either
//! runs the TUI (raw mode, restored on exit) or writes one report headlessly.
//!
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{error, info, warn};

use user_admin::app::{self, AppState};
use user_admin::auth::AuthGate;
use user_admin::backend::{self, Backend};
use user_admin::config::{ConfigPaths, Settings};
use user_admin::error::{Context, Result, simple_error};
use user_admin::logging::{self, LogTarget};
use user_admin::report::{DateRange, ExportFormat, ExportRequest, ReportKind};
use user_admin::storage::ClientStorage;

/// Manage user records, view statistics and export CSV/PDF reports.
#[derive(Parser)]
#[command(name = "user-admin", version, about)]
struct Cli {
    /// Configuration directory (default: <config dir>/user-admin)
    #[arg(long, env = "USER_ADMIN_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    /// Remote API base URL; overrides `api_url` in settings.conf
    #[arg(long, env = "USER_ADMIN_API_URL", global = true)]
    api_url: Option<String>,

    /// Log level or env-filter directive; overrides `log_level`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the terminal UI (default)
    Tui,
    /// Write a report to disk without starting the UI
    Export(ExportArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// users | statistics
    #[arg(long, default_value = "users")]
    kind: ReportKind,

    /// csv | pdf
    #[arg(long, default_value = "csv")]
    format: ExportFormat,

    /// all | thisMonth | lastMonth | thisYear (users reports only)
    #[arg(long, default_value = "all")]
    range: DateRange,

    /// Output directory; defaults to `export_dir` from settings.conf
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn run_tui(paths: &ConfigPaths, settings: Settings, backend: Box<dyn Backend>) -> Result<()> {
    let auth = AuthGate::new(ClientStorage::new(paths.storage_dir()));
    let mut state = AppState::bootstrap(backend, auth, settings, paths);

    let mut terminal = init_terminal().map_err(|e| format!("init terminal: {}", e))?;

    let res = app::run(&mut terminal, &mut state);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        error!(error = %err, "application error");
        eprintln!("application error: {err}");
    }
    Ok(())
}

fn run_export(
    paths: &ConfigPaths,
    settings: &Settings,
    mut backend: Box<dyn Backend>,
    args: ExportArgs,
) -> Result<()> {
    let mut auth = AuthGate::new(ClientStorage::new(paths.storage_dir()));
    auth.restore(backend.as_mut());
    if backend.name() == "remote" && !auth.is_authenticated() {
        return Err(simple_error(
            "not signed in: sign in through the TUI before exporting from a server",
        ));
    }

    let request = ExportRequest::new(args.kind, args.format, args.range);
    let today = chrono::Local::now().date_naive();
    let dir = args.out.unwrap_or_else(|| settings.export_dir.clone());
    let export = backend.export(&request, today)?;
    let path = export
        .save(&dir)
        .with_ctx(|| format!("write report into {}", dir.display()))?;
    info!(path = %path.display(), bytes = export.bytes.len(), "report written");
    println!("{}", path.display());
    Ok(())
}

/// Program entry point: dispatch the subcommand and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = ConfigPaths::resolve(cli.config_dir.as_deref());
    paths
        .ensure_dir()
        .with_ctx(|| format!("create config dir {}", paths.dir.display()))?;
    let (mut settings, settings_err) = Settings::load_or_init(&paths);
    if let Some(url) = cli.api_url {
        settings.api_url = Some(url);
    }
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }

    let command = cli.command.unwrap_or(Command::Tui);
    let log_path = paths.log_file();
    let target = match command {
        Command::Tui => LogTarget::File(&log_path),
        Command::Export(_) => LogTarget::Stderr,
    };
    logging::init(&settings.log_level, target).with_ctx(|| "initialize logging".to_string())?;
    if let Some(e) = settings_err {
        warn!(path = %paths.settings().display(), error = %e, "could not write default settings");
    }

    let backend = backend::from_api_url(settings.api_url.as_deref())?;
    info!(backend = backend.name(), config = %paths.dir.display(), "starting");

    match command {
        Command::Tui => run_tui(&paths, settings, backend),
        Command::Export(args) => run_export(&paths, &settings, backend, args),
    }
}
