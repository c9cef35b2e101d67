//! Form state for the login, register, user and export screens.
//!
//! A [`Form`] is a column of fields followed by action buttons. Focus moves
//! with Up/Down/Tab/Shift-Tab over enabled rows; Enter on a field advances,
//! Enter on a button reports it. Choice fields cycle with Space or Left/Right.

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::auth::Registration;
use crate::error::AdminResult;
use crate::model::{Photo, Status, UserFields, UserRecord, non_empty};
use crate::report::{DateRange, ExportFormat, ExportRequest, ReportKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Secret,
    Choice(&'static [&'static str]),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
    pub enabled: bool,
}

impl Field {
    pub fn text(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            kind: FieldKind::Text,
            enabled: true,
        }
    }

    pub fn secret(label: &'static str) -> Self {
        Self {
            kind: FieldKind::Secret,
            ..Self::text(label)
        }
    }

    pub fn choice(label: &'static str, options: &'static [&'static str]) -> Self {
        Self {
            value: options.first().copied().unwrap_or_default().to_string(),
            kind: FieldKind::Choice(options),
            ..Self::text(label)
        }
    }

    /// Value as shown on screen; secrets are masked.
    pub fn display(&self) -> String {
        match self.kind {
            FieldKind::Secret => "*".repeat(self.value.chars().count()),
            _ => self.value.clone(),
        }
    }

    fn cycle(&mut self, forward: bool) {
        let FieldKind::Choice(options) = self.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let idx = options.iter().position(|o| *o == self.value).unwrap_or(0);
        let next = if forward {
            (idx + 1) % options.len()
        } else {
            (idx + options.len() - 1) % options.len()
        };
        self.value = options[next].to_string();
    }
}

/// Result of feeding a key to a form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormOutcome {
    Pending,
    Action(usize),
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Form {
    pub fields: Vec<Field>,
    pub actions: Vec<&'static str>,
    /// Index into fields, then actions.
    pub focus: usize,
    pub error: Option<String>,
}

impl Form {
    pub fn new(fields: Vec<Field>, actions: Vec<&'static str>) -> Self {
        Self {
            fields,
            actions,
            focus: 0,
            error: None,
        }
    }

    fn rows(&self) -> usize {
        self.fields.len() + self.actions.len()
    }

    fn row_enabled(&self, row: usize) -> bool {
        self.fields.get(row).is_none_or(|f| f.enabled)
    }

    pub fn focused_field(&self) -> Option<&Field> {
        self.fields.get(self.focus)
    }

    /// Focused button index, if focus is on the button row.
    pub fn focused_action(&self) -> Option<usize> {
        self.focus.checked_sub(self.fields.len())
    }

    pub fn value(&self, idx: usize) -> &str {
        self.fields.get(idx).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn set_value(&mut self, idx: usize, value: impl Into<String>) {
        if let Some(f) = self.fields.get_mut(idx) {
            f.value = value.into();
        }
    }

    fn step(&mut self, forward: bool) {
        let rows = self.rows();
        if rows == 0 {
            return;
        }
        for _ in 0..rows {
            self.focus = if forward {
                (self.focus + 1) % rows
            } else {
                (self.focus + rows - 1) % rows
            };
            if self.row_enabled(self.focus) {
                break;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancel,
            KeyCode::Up | KeyCode::BackTab => self.step(false),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => self.step(false),
            KeyCode::Down | KeyCode::Tab => self.step(true),
            KeyCode::Enter => match self.focused_action() {
                Some(i) => return FormOutcome::Action(i),
                None => self.step(true),
            },
            code => {
                let Some(field) = self.fields.get_mut(self.focus) else {
                    return FormOutcome::Pending;
                };
                match (field.kind, code) {
                    (FieldKind::Choice(_), KeyCode::Char(' ') | KeyCode::Right) => field.cycle(true),
                    (FieldKind::Choice(_), KeyCode::Left) => field.cycle(false),
                    (FieldKind::Text | FieldKind::Secret, KeyCode::Char(c)) => {
                        field.value.push(c);
                        self.error = None;
                    }
                    (FieldKind::Text | FieldKind::Secret, KeyCode::Backspace) => {
                        field.value.pop();
                    }
                    _ => {}
                }
            }
        }
        FormOutcome::Pending
    }
}

pub const LOGIN_SUBMIT: usize = 0;
pub const LOGIN_TO_REGISTER: usize = 1;

pub fn login_form() -> Form {
    Form::new(
        vec![Field::text("Username"), Field::secret("Password")],
        vec!["Sign in", "Create an account"],
    )
}

pub const REGISTER_SUBMIT: usize = 0;
pub const REGISTER_TO_LOGIN: usize = 1;

pub fn register_form() -> Form {
    Form::new(
        vec![
            Field::text("Full name"),
            Field::text("Email"),
            Field::secret("Password"),
            Field::secret("Confirm password"),
        ],
        vec!["Create account", "Back to sign in"],
    )
}

pub fn registration_from(form: &Form) -> Registration {
    Registration {
        name: form.value(0).trim().to_string(),
        email: form.value(1).trim().to_string(),
        password: form.value(2).to_string(),
        password_confirmation: form.value(3).to_string(),
    }
}

const STATUS_OPTIONS: &[&str] = &["active", "inactive"];

const F_NAME: usize = 0;
const F_EMAIL: usize = 1;
const F_PHONE: usize = 2;
const F_ADDRESS: usize = 3;
const F_CITY: usize = 4;
const F_COUNTRY: usize = 5;
const F_STATUS: usize = 6;
const F_PHOTO: usize = 7;

/// Create or edit form for one user record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserForm {
    pub form: Form,
    /// `Some(id)` when editing.
    pub editing: Option<u64>,
    /// Description of the photo already on the record.
    pub current_photo: Option<String>,
}

impl Default for UserForm {
    fn default() -> Self {
        Self::new()
    }
}

impl UserForm {
    pub fn new() -> Self {
        Self {
            form: Form::new(
                vec![
                    Field::text("Name *"),
                    Field::text("Email *"),
                    Field::text("Phone"),
                    Field::text("Address"),
                    Field::text("City"),
                    Field::text("Country"),
                    Field::choice("Status", STATUS_OPTIONS),
                    Field::text("Photo file"),
                ],
                vec!["Save"],
            ),
            editing: None,
            current_photo: None,
        }
    }

    pub fn for_record(record: &UserRecord) -> Self {
        let mut me = Self::new();
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        let f = &mut me.form;
        f.set_value(F_NAME, record.name.clone());
        f.set_value(F_EMAIL, record.email.clone());
        f.set_value(F_PHONE, opt(&record.phone));
        f.set_value(F_ADDRESS, opt(&record.address));
        f.set_value(F_CITY, opt(&record.city));
        f.set_value(F_COUNTRY, opt(&record.country));
        f.set_value(F_STATUS, record.status.as_str());
        me.editing = Some(record.id);
        me.current_photo = record.photo.as_ref().map(Photo::describe);
        me
    }

    pub fn title(&self) -> String {
        match self.editing {
            Some(id) => format!("Edit user #{id}"),
            None => "New user".to_string(),
        }
    }

    /// Collect the field set. A non-empty photo path is read from disk.
    pub fn to_fields(&self) -> AdminResult<UserFields> {
        let f = &self.form;
        let photo = match non_empty(f.value(F_PHOTO)) {
            Some(path) => Some(Photo::from_file(Path::new(&path))?),
            None => None,
        };
        let fields = UserFields {
            name: f.value(F_NAME).trim().to_string(),
            email: f.value(F_EMAIL).trim().to_string(),
            phone: non_empty(f.value(F_PHONE)),
            address: non_empty(f.value(F_ADDRESS)),
            city: non_empty(f.value(F_CITY)),
            country: non_empty(f.value(F_COUNTRY)),
            status: f.value(F_STATUS).parse::<Status>().ok(),
            photo,
        };
        fields.validate()?;
        Ok(fields)
    }
}

const KIND_OPTIONS: &[&str] = &["users", "statistics"];
const FORMAT_OPTIONS: &[&str] = &["csv", "pdf"];
const RANGE_OPTIONS: &[&str] = &["all", "thisMonth", "lastMonth", "thisYear"];

const E_KIND: usize = 0;
const E_FORMAT: usize = 1;
const E_RANGE: usize = 2;

pub fn export_form() -> Form {
    Form::new(
        vec![
            Field::choice("Report", KIND_OPTIONS),
            Field::choice("Format", FORMAT_OPTIONS),
            Field::choice("Date range", RANGE_OPTIONS),
        ],
        vec!["Export"],
    )
}

/// Read the request from the export form and keep the date range row
/// enabled only for users reports.
pub fn export_request(form: &mut Form) -> ExportRequest {
    let kind = form.value(E_KIND).parse().unwrap_or(ReportKind::Users);
    let format = form.value(E_FORMAT).parse().unwrap_or(ExportFormat::Csv);
    let date_range = form.value(E_RANGE).parse().unwrap_or(DateRange::All);
    if let Some(f) = form.fields.get_mut(E_RANGE) {
        f.enabled = kind == ReportKind::Users;
    }
    ExportRequest::new(kind, format, date_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminError;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(form: &mut Form, s: &str) {
        for c in s.chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn login_form_navigation_and_submit() {
        let mut f = login_form();
        type_str(&mut f, "admin");
        f.handle_key(key(KeyCode::Enter));
        type_str(&mut f, "pw");
        assert_eq!(f.value(0), "admin");
        assert_eq!(f.focused_field().unwrap().display(), "**");
        assert_eq!(f.handle_key(key(KeyCode::Enter)), FormOutcome::Pending);
        assert_eq!(f.handle_key(key(KeyCode::Enter)), FormOutcome::Action(LOGIN_SUBMIT));
        f.handle_key(key(KeyCode::Down));
        assert_eq!(f.handle_key(key(KeyCode::Enter)), FormOutcome::Action(LOGIN_TO_REGISTER));
        f.handle_key(key(KeyCode::Down));
        assert_eq!(f.focus, 0);
        assert_eq!(f.handle_key(key(KeyCode::Esc)), FormOutcome::Cancel);
    }

    #[test]
    fn choice_fields_cycle() {
        let mut f = UserForm::new();
        f.form.focus = F_STATUS;
        f.form.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(f.form.value(F_STATUS), "inactive");
        f.form.handle_key(key(KeyCode::Right));
        assert_eq!(f.form.value(F_STATUS), "active");
        f.form.handle_key(key(KeyCode::Left));
        assert_eq!(f.form.value(F_STATUS), "inactive");
        // typing into a choice does nothing
        f.form.handle_key(key(KeyCode::Char('x')));
        assert_eq!(f.form.value(F_STATUS), "inactive");
    }

    #[test]
    fn user_form_builds_fields_and_validates() {
        let mut f = UserForm::new();
        assert!(matches!(f.to_fields(), Err(AdminError::Validation { .. })));
        f.form.set_value(F_NAME, " Zed ");
        f.form.set_value(F_EMAIL, "zed@example.com");
        f.form.set_value(F_CITY, "  ");
        let fields = f.to_fields().unwrap();
        assert_eq!(fields.name, "Zed");
        assert_eq!(fields.city, None);
        assert_eq!(fields.status, Some(Status::Active));
        assert_eq!(fields.photo, None);
    }

    #[test]
    fn photo_path_must_be_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("me.png");
        std::fs::write(&png, [0x89, b'P', b'N', b'G']).unwrap();
        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "hi").unwrap();

        let mut f = UserForm::new();
        f.form.set_value(F_NAME, "Zed");
        f.form.set_value(F_EMAIL, "zed@example.com");
        f.form.set_value(F_PHOTO, png.to_string_lossy());
        match f.to_fields().unwrap().photo {
            Some(Photo::Inline { content_type, bytes }) => {
                assert_eq!(content_type, "image/png");
                assert_eq!(bytes.len(), 4);
            }
            other => panic!("unexpected {other:?}"),
        }
        f.form.set_value(F_PHOTO, txt.to_string_lossy());
        assert!(matches!(f.to_fields(), Err(AdminError::Validation { .. })));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let rec = crate::repo::demo_records().remove(2);
        let f = UserForm::for_record(&rec);
        assert_eq!(f.editing, Some(3));
        assert_eq!(f.form.value(F_NAME), "Robert Johnson");
        assert_eq!(f.form.value(F_STATUS), "inactive");
        assert!(f.current_photo.is_some());
        assert_eq!(f.title(), "Edit user #3");
    }

    #[test]
    fn export_range_only_for_users() {
        let mut f = export_form();
        let req = export_request(&mut f);
        assert_eq!(req, ExportRequest::default());
        f.handle_key(key(KeyCode::Right));
        let req = export_request(&mut f);
        assert_eq!(req.kind, ReportKind::Statistics);
        assert!(!f.fields[E_RANGE].enabled);
        f.handle_key(key(KeyCode::Down));
        f.handle_key(key(KeyCode::Down));
        // range row is skipped
        assert_eq!(f.focused_action(), Some(0));
    }
}
