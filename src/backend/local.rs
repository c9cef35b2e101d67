use chrono::NaiveDate;
use tracing::info;

use super::Backend;
use crate::auth::Registration;
use crate::error::{AdminError, AdminResult};
use crate::model::{SessionUser, UserFields, UserRecord};
use crate::repo::Repository;
use crate::report::{self, Export, ExportRequest};
use crate::search::ListFilter;
use crate::stats::AggregateStats;

pub const DEMO_LOGIN: &str = "admin";
pub const DEMO_PASSWORD: &str = "admin";
pub const DEMO_TOKEN: &str = "demo-token-123456";

/// In-memory backend over a [`Repository`] with a single demo account.
#[derive(Debug, Default)]
pub struct LocalBackend {
    repo: Repository,
    token: Option<String>,
}

impl LocalBackend {
    pub fn new(repo: Repository) -> Self {
        Self { repo, token: None }
    }

    pub fn with_demo_data() -> Self {
        Self::new(Repository::with_demo_data())
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

pub fn demo_user() -> SessionUser {
    SessionUser {
        id: 1,
        name: "Administrator".into(),
        email: "admin@example.com".into(),
        role: "admin".into(),
        photo_url: None,
    }
}

impl Backend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn login(&mut self, identifier: &str, secret: &str) -> AdminResult<(SessionUser, String)> {
        if identifier.trim() == DEMO_LOGIN && secret == DEMO_PASSWORD {
            Ok((demo_user(), DEMO_TOKEN.to_string()))
        } else {
            Err(AdminError::InvalidCredentials)
        }
    }

    fn register(&mut self, registration: &Registration) -> AdminResult<()> {
        registration.validate()?;
        info!(email = %registration.email, "registration accepted (local, not stored)");
        Ok(())
    }

    fn logout(&mut self) -> AdminResult<()> {
        self.token = None;
        Ok(())
    }

    fn list_users(&mut self, filter: &ListFilter) -> AdminResult<Vec<UserRecord>> {
        Ok(self.repo.list(filter))
    }

    fn get_user(&mut self, id: u64) -> AdminResult<UserRecord> {
        self.repo.get(id).cloned()
    }

    fn create_user(&mut self, fields: UserFields, today: NaiveDate) -> AdminResult<UserRecord> {
        self.repo.create(fields, today)
    }

    fn update_user(&mut self, id: u64, fields: UserFields) -> AdminResult<UserRecord> {
        self.repo.update(id, fields)
    }

    fn delete_user(&mut self, id: u64) -> AdminResult<()> {
        self.repo.delete(id)
    }

    fn stats(&mut self, today: NaiveDate) -> AdminResult<AggregateStats> {
        Ok(AggregateStats::compute(self.repo.all(), today))
    }

    fn export(&mut self, request: &ExportRequest, today: NaiveDate) -> AdminResult<Export> {
        report::generate(self.repo.all(), None, request, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, 31).unwrap()
    }

    #[test]
    fn only_demo_credentials_log_in() {
        let mut b = LocalBackend::with_demo_data();
        let (user, token) = b.login("admin", "admin").unwrap();
        assert_eq!(user.email, "admin@example.com");
        assert!(user.is_admin());
        assert_eq!(token, DEMO_TOKEN);
        assert!(matches!(b.login("admin", "wrong"), Err(AdminError::InvalidCredentials)));
        assert!(matches!(b.login("", ""), Err(AdminError::InvalidCredentials)));
    }

    #[test]
    fn deleting_removes_from_stats() {
        let mut b = LocalBackend::with_demo_data();
        b.delete_user(3).unwrap();
        let s = b.stats(today()).unwrap();
        assert_eq!(s.total_users, 6);
        assert_eq!(s.inactive_users, 1);
        let inactive = b
            .list_users(&ListFilter::new("", Some(Status::Inactive)))
            .unwrap();
        assert_eq!(inactive.len(), 1);
    }

    #[test]
    fn register_validates_without_storing() {
        let mut b = LocalBackend::with_demo_data();
        let ok = Registration {
            name: "N".into(),
            email: "n@x.io".into(),
            password: "pw".into(),
            password_confirmation: "pw".into(),
        };
        b.register(&ok).unwrap();
        assert_eq!(b.repository().len(), 7);
        let bad = Registration {
            password_confirmation: "other".into(),
            ..ok
        };
        assert!(matches!(b.register(&bad), Err(AdminError::Validation { .. })));
    }
}
