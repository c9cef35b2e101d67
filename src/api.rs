//! Blocking HTTP client for the remote user API.
//!
//! Every request carries `Accept: application/json` and, once a token is
//! attached, `Authorization: Bearer <token>`. Non-success statuses map to
//! [`AdminError`]: 401 -> `Unauthorized`, 404 on a user path -> `NotFound`,
//! 422 -> `Validation` with the server's first message, anything else ->
//! `Api`. Object responses may be bare or wrapped in `{"data": ...}`.

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{AdminError, AdminResult};
use crate::model::{Photo, SessionUser, UserFields, UserRecord};
use crate::report::ExportFormat;
use crate::search::ListFilter;
use crate::stats::AggregateStats;

const TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on pages fetched for one listing.
const MAX_PAGES: u32 = 1000;

#[derive(Clone, Debug)]
pub struct ApiClient {
    base: String,
    http: Client,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub user: SessionUser,
    pub token: String,
}

/// One page of `GET /users`.
#[derive(Debug, Deserialize)]
pub struct UserPage {
    pub data: Vec<UserRecord>,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub last_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

fn first_page() -> u32 {
    1
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody {
    Paged(UserPage),
    Bare(Vec<UserRecord>),
}

impl ApiClient {
    pub fn new(base_url: &str) -> AdminResult<Self> {
        let http = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("user-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            http,
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let rb = self
            .http
            .request(method, format!("{}{path}", self.base))
            .header(ACCEPT, "application/json");
        match &self.token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }

    /// Send and map failure statuses. `user_id` turns a 404 into `NotFound`.
    fn send(&self, rb: RequestBuilder, user_id: Option<u64>) -> AdminResult<Response> {
        let resp = rb.send()?;
        let status = resp.status().as_u16();
        debug!(status, url = %resp.url(), "api response");
        if resp.status().is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(error_for_status(status, body, user_id))
    }

    fn json<T: DeserializeOwned>(&self, rb: RequestBuilder, user_id: Option<u64>) -> AdminResult<T> {
        let value: Value = self.send(rb, user_id)?.json()?;
        Ok(serde_json::from_value(unwrap_data(value))?)
    }

    pub fn login(&self, email: &str, password: &str) -> AdminResult<LoginResponse> {
        let rb = self
            .request(Method::POST, "/auth/login")
            .json(&json!({ "email": email, "password": password }));
        match self.json(rb, None) {
            Err(AdminError::Unauthorized) | Err(AdminError::Validation { .. }) => {
                Err(AdminError::InvalidCredentials)
            }
            other => other,
        }
    }

    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> AdminResult<()> {
        let rb = self.request(Method::POST, "/auth/register").json(&json!({
            "name": name,
            "email": email,
            "password": password,
            "password_confirmation": password_confirmation,
        }));
        self.send(rb, None).map(drop)
    }

    pub fn logout(&self) -> AdminResult<()> {
        self.send(self.request(Method::POST, "/auth/logout"), None)
            .map(drop)
    }

    pub fn current_user(&self) -> AdminResult<SessionUser> {
        self.json(self.request(Method::GET, "/auth/user"), None)
    }

    /// One page of users. A bare array is treated as the only page.
    pub fn list_page(&self, filter: &ListFilter, page: u32) -> AdminResult<UserPage> {
        let mut query: Vec<(&str, String)> = vec![("page", page.to_string())];
        if !filter.search_term.is_empty() {
            query.push(("search", filter.search_term.clone()));
        }
        if let Some(status) = filter.status {
            query.push(("status", status.as_str().to_string()));
        }
        let rb = self.request(Method::GET, "/users").query(&query);
        let body: ListBody = self.send(rb, None)?.json()?;
        Ok(match body {
            ListBody::Paged(p) => p,
            ListBody::Bare(data) => UserPage {
                total: Some(data.len() as u64),
                data,
                current_page: 1,
                last_page: Some(1),
            },
        })
    }

    /// Every matching user, following pagination to the last page.
    pub fn list_users(&self, filter: &ListFilter) -> AdminResult<Vec<UserRecord>> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let p = self.list_page(filter, page)?;
            let done = p.data.is_empty() || p.last_page.is_none_or(|last| p.current_page >= last);
            all.extend(p.data);
            if done {
                break;
            }
            if page >= MAX_PAGES {
                warn!(page, "stopping pagination at page limit");
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    pub fn get_user(&self, id: u64) -> AdminResult<UserRecord> {
        self.json(self.request(Method::GET, &format!("/users/{id}")), Some(id))
    }

    pub fn create_user(&self, fields: &UserFields) -> AdminResult<UserRecord> {
        let rb = self
            .request(Method::POST, "/users")
            .multipart(user_form(fields)?);
        self.json(rb, None)
    }

    pub fn update_user(&self, id: u64, fields: &UserFields) -> AdminResult<UserRecord> {
        let rb = self
            .request(Method::POST, &format!("/users/{id}"))
            .multipart(user_form(fields)?);
        self.json(rb, Some(id))
    }

    pub fn delete_user(&self, id: u64) -> AdminResult<()> {
        self.send(self.request(Method::DELETE, &format!("/users/{id}")), Some(id))
            .map(drop)
    }

    /// Server-rendered export of the full user set.
    pub fn export_blob(&self, format: ExportFormat) -> AdminResult<Vec<u8>> {
        let path = format!("/users/export/{}", format.extension());
        let resp = self.send(self.request(Method::GET, &path), None)?;
        Ok(resp.bytes()?.to_vec())
    }

    pub fn stats(&self) -> AdminResult<AggregateStats> {
        let stats: AggregateStats = self.json(self.request(Method::GET, "/users/stats"), None)?;
        Ok(stats.normalized())
    }
}

/// Text fields plus an optional `photo` file part.
fn user_form(fields: &UserFields) -> AdminResult<Form> {
    let mut form = Form::new();
    for (key, value) in fields.text_pairs() {
        form = form.text(key, value);
    }
    match &fields.photo {
        Some(photo @ Photo::Inline { content_type, bytes }) => {
            let part = Part::bytes(bytes.clone())
                .file_name(photo.file_name())
                .mime_str(content_type)?;
            form = form.part("photo", part);
        }
        Some(Photo::Url(url)) => form = form.text("photo_url", url.clone()),
        None => {}
    }
    Ok(form)
}

/// Strip a `{"data": ...}` envelope around a single object.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if !map.contains_key("id") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn error_for_status(status: u16, body: String, user_id: Option<u64>) -> AdminError {
    match (status, user_id) {
        (401, _) => AdminError::Unauthorized,
        (404, Some(id)) => AdminError::NotFound { id },
        (422, _) => {
            let (field, message) = validation_message(&body);
            AdminError::Validation { field, message }
        }
        _ => AdminError::Api { status, body },
    }
}

/// First `errors.<field>[0]` of a validation body, falling back to `message`.
fn validation_message(body: &str) -> (String, String) {
    let Ok(v) = serde_json::from_str::<Value>(body) else {
        return ("request".into(), body.to_string());
    };
    if let Some((field, msgs)) = v.get("errors").and_then(Value::as_object).and_then(|e| e.iter().next()) {
        let msg = msgs
            .as_array()
            .and_then(|a| a.first())
            .or(Some(msgs))
            .and_then(Value::as_str)
            .unwrap_or("is invalid");
        return (field.clone(), msg.to_string());
    }
    let msg = v.get("message").and_then(Value::as_str).unwrap_or(body);
    ("request".into(), msg.to_string())
}
