use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::app::forms::{self, FormOutcome, UserForm};
use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState, PendingAction, Screen};
use crate::error::{AdminError, AdminResult};
use crate::model::{FormData, Status};
use crate::search::{ListFilter, apply_filters_and_search};
use crate::ui;

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        app.expire_toast();
        terminal.draw(|f| {
            ui::render(f, app);
        })?;

        // The frame above shows the working indicator; input is not read
        // until the action has finished.
        if let Some(pending) = app.pending.take() {
            perform_pending_action(app, pending);
            continue;
        }

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key(app, key);
        }
    }

    info!(uptime_secs = app.started_at.elapsed().as_secs(), "exiting");
    Ok(())
}

/// Route one key press according to modal, input mode and screen.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    if app.modal.is_some() {
        handle_modal_key(app, key.code);
        return;
    }
    match app.input_mode {
        InputMode::Search => handle_search_key(app, key),
        InputMode::Editing => handle_form_key(app, key),
        InputMode::Normal | InputMode::Modal => {
            if let Some(action) = app.keymap.resolve(&key) {
                handle_action(app, action);
            }
        }
    }
}

fn handle_search_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Esc => {
            app.search_query.clear();
            apply_filters_and_search(app);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            apply_filters_and_search(app);
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            apply_filters_and_search(app);
        }
        KeyCode::Up => move_selection(app, false),
        KeyCode::Down => move_selection(app, true),
        _ => {}
    }
}

fn handle_form_key(app: &mut AppState, key: KeyEvent) {
    match app.screen {
        Screen::Login => match app.login_form.handle_key(key) {
            FormOutcome::Action(forms::LOGIN_SUBMIT) => {
                let identifier = app.login_form.value(0).trim().to_string();
                let secret = app.login_form.value(1).to_string();
                if identifier.is_empty() || secret.is_empty() {
                    app.login_form.error = Some("Username and password are required".into());
                    return;
                }
                app.login_form.error = None;
                app.pending = Some(PendingAction::Login { identifier, secret });
            }
            FormOutcome::Action(forms::LOGIN_TO_REGISTER) => {
                app.register_form = forms::register_form();
                app.go(Screen::Register);
            }
            FormOutcome::Cancel => app.should_quit = true,
            _ => {}
        },
        Screen::Register => match app.register_form.handle_key(key) {
            FormOutcome::Action(forms::REGISTER_SUBMIT) => {
                let registration = forms::registration_from(&app.register_form);
                match registration.validate() {
                    Ok(()) => {
                        app.register_form.error = None;
                        app.pending = Some(PendingAction::Register(registration));
                    }
                    Err(e) => app.register_form.error = Some(e.to_string()),
                }
            }
            FormOutcome::Action(forms::REGISTER_TO_LOGIN) | FormOutcome::Cancel => {
                app.go(Screen::Login);
            }
            _ => {}
        },
        Screen::NewUser | Screen::EditUser(_) => match app.user_form.form.handle_key(key) {
            FormOutcome::Action(_) => match app.user_form.to_fields() {
                Ok(fields) => {
                    app.user_form.form.error = None;
                    app.pending = Some(match app.user_form.editing {
                        Some(id) => PendingAction::UpdateUser { id, fields },
                        None => PendingAction::CreateUser(fields),
                    });
                }
                Err(e) => app.user_form.form.error = Some(e.to_string()),
            },
            FormOutcome::Cancel => match app.user_form.editing {
                Some(id) if app.detail.as_ref().is_some_and(|d| d.id == id) => {
                    app.go(Screen::Detail(id))
                }
                _ => app.go(Screen::Users),
            },
            FormOutcome::Pending => {}
        },
        Screen::Export => {
            let outcome = app.export_form.handle_key(key);
            let request = forms::export_request(&mut app.export_form);
            match outcome {
                FormOutcome::Action(_) => app.pending = Some(PendingAction::Export(request)),
                FormOutcome::Cancel => app.go(Screen::Dashboard),
                FormOutcome::Pending => {}
            }
        }
        Screen::Dashboard | Screen::Users | Screen::Detail(_) | Screen::FormResult => {
            app.input_mode = InputMode::Normal;
        }
    }
}

fn handle_action(app: &mut AppState, action: KeyAction) {
    match action {
        KeyAction::Quit => {
            app.should_quit = true;
            return;
        }
        KeyAction::OpenHelp => {
            app.modal = Some(ModalState::Help { scroll: 0 });
            app.input_mode = InputMode::Modal;
            return;
        }
        KeyAction::Logout => {
            app.pending = Some(PendingAction::Logout);
            return;
        }
        KeyAction::Refresh => {
            app.pending = Some(PendingAction::Refresh);
            return;
        }
        KeyAction::NextTab => {
            switch_tab(app, true);
            return;
        }
        KeyAction::PrevTab => {
            switch_tab(app, false);
            return;
        }
        KeyAction::NewUser => {
            open_new_user(app);
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::Users => users_action(app, action),
        Screen::Detail(id) => match action {
            KeyAction::EditSelection => {
                if let Some(record) = app.detail.as_ref().filter(|d| d.id == id) {
                    app.user_form = UserForm::for_record(record);
                    app.go(Screen::EditUser(id));
                } else {
                    app.pending = Some(PendingAction::OpenUser { id, edit: true });
                }
            }
            KeyAction::DeleteSelection => {
                let name = app
                    .detail
                    .as_ref()
                    .map(|d| d.name.clone())
                    .unwrap_or_default();
                open_delete_confirm(app, id, name);
            }
            KeyAction::Back => app.go(Screen::Users),
            _ => {}
        },
        Screen::FormResult => {
            if matches!(action, KeyAction::Back | KeyAction::OpenSelection) {
                app.form_result = None;
                app.go(Screen::Users);
            }
        }
        Screen::Dashboard if action == KeyAction::OpenSelection => app.go(Screen::Users),
        _ => {}
    }
}

fn users_action(app: &mut AppState, action: KeyAction) {
    match action {
        KeyAction::StartSearch => app.input_mode = InputMode::Search,
        KeyAction::CycleStatusFilter => {
            app.status_filter = match app.status_filter {
                None => Some(Status::Active),
                Some(Status::Active) => Some(Status::Inactive),
                Some(Status::Inactive) => None,
            };
            apply_filters_and_search(app);
            app.save_filters();
        }
        KeyAction::MoveUp => move_selection(app, false),
        KeyAction::MoveDown => move_selection(app, true),
        KeyAction::PrevPage => change_page(app, false),
        KeyAction::NextPage => change_page(app, true),
        KeyAction::OpenSelection | KeyAction::EditSelection => {
            if let Some(u) = app.selected_user() {
                let id = u.id;
                let edit = action == KeyAction::EditSelection;
                app.pending = Some(PendingAction::OpenUser { id, edit });
            }
        }
        KeyAction::DeleteSelection => {
            if let Some(u) = app.selected_user() {
                let (id, name) = (u.id, u.name.clone());
                open_delete_confirm(app, id, name);
            }
        }
        KeyAction::Back => {
            if !app.search_query.is_empty() {
                app.search_query.clear();
                apply_filters_and_search(app);
            }
        }
        _ => {}
    }
}

fn move_selection(app: &mut AppState, down: bool) {
    if down {
        if app.selected_user_index + 1 < app.users.len() {
            app.selected_user_index += 1;
        }
    } else if app.selected_user_index > 0 {
        app.selected_user_index -= 1;
    }
    app.sync_page_to_selection();
}

/// Move one page and select its first row.
fn change_page(app: &mut AppState, forward: bool) {
    let pages = app.page_count();
    let page = if forward {
        (app.current_page + 1).min(pages)
    } else {
        app.current_page.saturating_sub(1).max(1)
    };
    app.current_page = page;
    app.selected_user_index = (page - 1) * app.rows_per_page.max(1);
    if app.selected_user_index >= app.users.len() {
        app.selected_user_index = app.users.len().saturating_sub(1);
    }
}

fn switch_tab(app: &mut AppState, forward: bool) {
    let tabs = Screen::TABS;
    let current = app.screen.tab_index().unwrap_or(0);
    let next = if forward {
        (current + 1) % tabs.len()
    } else {
        (current + tabs.len() - 1) % tabs.len()
    };
    match tabs[next] {
        Screen::NewUser => open_new_user(app),
        Screen::Export => {
            forms::export_request(&mut app.export_form);
            app.go(Screen::Export);
        }
        other => app.go(other),
    }
}

fn open_new_user(app: &mut AppState) {
    app.user_form = UserForm::new();
    app.go(Screen::NewUser);
}

fn open_delete_confirm(app: &mut AppState, id: u64, name: String) {
    app.modal = Some(ModalState::DeleteConfirm {
        id,
        name,
        selected: 1,
    });
    app.input_mode = InputMode::Modal;
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    match &mut app.modal {
        Some(ModalState::DeleteConfirm { id, selected, .. }) => match code {
            KeyCode::Esc | KeyCode::Char('n') => close_modal(app),
            KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab
            | KeyCode::BackTab
            | KeyCode::Char('h')
            | KeyCode::Char('l') => *selected = 1 - *selected,
            KeyCode::Char('y') => {
                let id = *id;
                close_modal(app);
                app.pending = Some(PendingAction::DeleteUser { id });
            }
            KeyCode::Enter => {
                let confirmed = (*selected == 0).then_some(*id);
                close_modal(app);
                if let Some(id) = confirmed {
                    app.pending = Some(PendingAction::DeleteUser { id });
                }
            }
            _ => {}
        },
        Some(ModalState::Help { scroll }) => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => {
                close_modal(app)
            }
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            _ => {}
        },
        Some(ModalState::Info { .. }) => {
            if matches!(code, KeyCode::Esc | KeyCode::Enter) {
                close_modal(app);
            }
        }
        None => {}
    }
}

fn close_modal(app: &mut AppState) {
    app.modal = None;
    app.input_mode = if app.screen.is_form() {
        InputMode::Editing
    } else {
        InputMode::Normal
    };
}

/// Run a queued backend action. Errors end up as toasts.
pub fn perform_pending_action(app: &mut AppState, pending: PendingAction) {
    debug!(action = pending.label(), "running action");
    if let Err(err) = run_action(app, pending) {
        handle_error(app, err);
    }
}

fn run_action(app: &mut AppState, pending: PendingAction) -> AdminResult<()> {
    match pending {
        PendingAction::Login { identifier, secret } => {
            let user = match app.auth.login(app.backend.as_mut(), &identifier, &secret) {
                Ok(user) => user,
                Err(e) => {
                    app.login_form.error = Some(e.to_string());
                    app.login_form.set_value(1, "");
                    return Err(e);
                }
            };
            app.login_form = forms::login_form();
            app.go(Screen::Dashboard);
            app.toast_success(format!("Welcome, {}", user.name));
            refresh(app)?;
        }
        PendingAction::Register(registration) => {
            if let Err(e) = app.auth.register(app.backend.as_mut(), &registration) {
                app.register_form.error = Some(e.to_string());
                return Err(e);
            }
            app.register_form = forms::register_form();
            app.go(Screen::Login);
            app.toast_success("Account created, please sign in");
        }
        PendingAction::Logout => {
            app.auth.logout(app.backend.as_mut());
            clear_data(app);
            app.go(Screen::Login);
            app.toast_success("Signed out");
        }
        PendingAction::Refresh => refresh(app)?,
        PendingAction::OpenUser { id, edit } => {
            let record = app.backend.get_user(id)?;
            if edit {
                app.user_form = UserForm::for_record(&record);
                app.go(Screen::EditUser(id));
            } else {
                app.go(Screen::Detail(id));
            }
            app.detail = Some(record);
        }
        PendingAction::CreateUser(fields) => {
            let today = app.today();
            let data = FormData::from_fields(&fields);
            let record = app.backend.create_user(fields, today)?;
            info!(id = record.id, "user created");
            if let Err(e) = app.auth.storage().save_form_data(&data) {
                warn!(error = %e, "could not store form data");
            }
            app.user_form = UserForm::new();
            app.form_result = app
                .auth
                .storage()
                .take_form_data()
                .or(Some(data));
            app.go(Screen::FormResult);
            app.toast_success(format!("User {} created", record.name));
            refresh(app)?;
        }
        PendingAction::UpdateUser { id, fields } => {
            let record = app.backend.update_user(id, fields)?;
            info!(id, "user updated");
            app.toast_success(format!("User {} saved", record.name));
            app.detail = Some(record);
            app.go(Screen::Detail(id));
            refresh(app)?;
        }
        PendingAction::DeleteUser { id } => {
            app.backend.delete_user(id)?;
            info!(id, "user deleted");
            if app.detail.as_ref().is_some_and(|d| d.id == id) {
                app.detail = None;
            }
            if app.screen != Screen::Users {
                app.go(Screen::Users);
            }
            app.toast_success("User deleted");
            refresh(app)?;
        }
        PendingAction::Export(request) => {
            let today = app.today();
            let saved = app
                .backend
                .export(&request, today)
                .and_then(|export| export.save(&app.settings.export_dir))
                .map_err(|e| match e {
                    AdminError::Unauthorized | AdminError::ExportFailure(_) => e,
                    other => AdminError::export(other.to_string()),
                })?;
            info!(path = %saved.display(), kind = request.kind.as_str(), "export saved");
            app.toast_success("Export complete");
            app.modal = Some(ModalState::Info {
                message: format!("Report saved to {}", saved.display()),
            });
            app.input_mode = InputMode::Modal;
        }
    }
    Ok(())
}

/// Reload records and statistics, keeping the selection when possible.
fn refresh(app: &mut AppState) -> AdminResult<()> {
    let today = app.today();
    app.users_all = app.backend.list_users(&ListFilter::default())?;
    let keep = app.selected_user_index;
    apply_filters_and_search(app);
    app.selected_user_index = keep.min(app.users.len().saturating_sub(1));
    app.sync_page_to_selection();
    app.stats = Some(app.backend.stats(today)?);
    debug!(count = app.users_all.len(), "records loaded");
    Ok(())
}

fn clear_data(app: &mut AppState) {
    app.users_all.clear();
    app.users.clear();
    app.selected_user_index = 0;
    app.current_page = 1;
    app.stats = None;
    app.detail = None;
    app.form_result = None;
}

fn handle_error(app: &mut AppState, err: AdminError) {
    warn!(error = %err, "action failed");
    match err {
        AdminError::Unauthorized => {
            app.auth.force_logout(app.backend.as_mut());
            clear_data(app);
            app.go(Screen::Login);
            app.toast_error(err.to_string());
        }
        AdminError::NotFound { .. } => {
            app.detail = None;
            app.go(Screen::Users);
            app.toast_error("User not found");
        }
        other => {
            if matches!(app.screen, Screen::NewUser | Screen::EditUser(_)) {
                app.user_form.form.error = Some(other.to_string());
            }
            app.toast_error(other.to_string());
        }
    }
}
