//! Authentication gate: session state over durable client storage.
//!
//! `Anonymous --login ok--> Authenticated --logout--> Anonymous`. A failed
//! login leaves the state unchanged; an `Unauthorized` response anywhere
//! forces a logout.

use tracing::{info, warn};

use crate::backend::Backend;
use crate::error::{AdminError, AdminResult};
use crate::model::SessionUser;
use crate::storage::ClientStorage;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: SessionUser,
    pub token: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

/// Sign-up payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl Registration {
    pub fn validate(&self) -> AdminResult<()> {
        for (field, value) in [
            ("name", self.name.trim()),
            ("email", self.email.trim()),
            ("password", self.password.as_str()),
            ("password_confirmation", self.password_confirmation.as_str()),
        ] {
            if value.is_empty() {
                return Err(AdminError::validation(field, "is required"));
            }
        }
        if !self.email.contains('@') {
            return Err(AdminError::validation("email", "is not a valid address"));
        }
        if self.password != self.password_confirmation {
            return Err(AdminError::validation("password", "Passwords do not match"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct AuthGate {
    storage: ClientStorage,
    state: AuthState,
}

impl AuthGate {
    pub fn new(storage: ClientStorage) -> Self {
        Self {
            storage,
            state: AuthState::Anonymous,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn storage(&self) -> &ClientStorage {
        &self.storage
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match &self.state {
            AuthState::Authenticated(s) => Some(&s.user),
            AuthState::Anonymous => None,
        }
    }

    /// Pick up a persisted session and hand its token to `backend`.
    pub fn restore(&mut self, backend: &mut dyn Backend) -> &AuthState {
        self.state = match self.storage.load_session() {
            Some((user, token)) => {
                info!(user = %user.email, "session restored");
                backend.set_token(token.clone());
                AuthState::Authenticated(Session { user, token })
            }
            None => AuthState::Anonymous,
        };
        &self.state
    }

    pub fn login(
        &mut self,
        backend: &mut dyn Backend,
        identifier: &str,
        secret: &str,
    ) -> AdminResult<SessionUser> {
        let (user, token) = match backend.login(identifier, secret) {
            Ok(v) => v,
            Err(e) => {
                warn!(identifier, error = %e, "login failed");
                return Err(e);
            }
        };
        self.storage.save_session(&user, &token)?;
        backend.set_token(Some(token.clone()));
        info!(user = %user.email, backend = backend.name(), "logged in");
        self.state = AuthState::Authenticated(Session {
            user: user.clone(),
            token: Some(token),
        });
        Ok(user)
    }

    /// Always ends Anonymous; a backend failure is only logged.
    pub fn logout(&mut self, backend: &mut dyn Backend) {
        if self.is_authenticated()
            && let Err(e) = backend.logout()
        {
            warn!(error = %e, "logout request failed");
        }
        self.drop_session(backend);
        info!("logged out");
    }

    /// Clear the session without contacting the backend (after a 401).
    pub fn force_logout(&mut self, backend: &mut dyn Backend) {
        warn!("session rejected by backend, signing out");
        self.drop_session(backend);
    }

    fn drop_session(&mut self, backend: &mut dyn Backend) {
        self.storage.clear_session();
        backend.set_token(None);
        self.state = AuthState::Anonymous;
    }

    pub fn register(&self, backend: &mut dyn Backend, registration: &Registration) -> AdminResult<()> {
        registration.validate()?;
        backend.register(registration)?;
        info!(email = %registration.email.trim(), "registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use crate::backend::local::DEMO_TOKEN;

    fn gate() -> (tempfile::TempDir, AuthGate) {
        let dir = tempfile::tempdir().unwrap();
        let gate = AuthGate::new(ClientStorage::new(dir.path()));
        (dir, gate)
    }

    #[test]
    fn login_persists_and_attaches_token() {
        let (_dir, mut gate) = gate();
        let mut backend = LocalBackend::with_demo_data();
        let user = gate.login(&mut backend, "admin", "admin").unwrap();
        assert_eq!(user.name, "Administrator");
        assert!(gate.is_authenticated());
        assert_eq!(backend.token(), Some(DEMO_TOKEN));
        let (stored, token) = gate.storage().load_session().unwrap();
        assert_eq!(stored, user);
        assert_eq!(token.as_deref(), Some(DEMO_TOKEN));
    }

    #[test]
    fn failed_login_persists_nothing() {
        let (_dir, mut gate) = gate();
        let mut backend = LocalBackend::with_demo_data();
        let err = gate.login(&mut backend, "admin", "nope").unwrap_err();
        assert!(matches!(err, AdminError::InvalidCredentials));
        assert!(!gate.is_authenticated());
        assert!(gate.storage().load_session().is_none());
    }

    #[test]
    fn restore_then_logout() {
        let (dir, mut gate) = gate();
        let mut backend = LocalBackend::with_demo_data();
        gate.login(&mut backend, "admin", "admin").unwrap();

        let mut fresh = AuthGate::new(ClientStorage::new(dir.path()));
        let mut other = LocalBackend::with_demo_data();
        assert!(matches!(fresh.restore(&mut other), AuthState::Authenticated(_)));
        assert_eq!(other.token(), Some(DEMO_TOKEN));

        fresh.logout(&mut other);
        assert_eq!(fresh.state(), &AuthState::Anonymous);
        assert_eq!(other.token(), None);
        assert!(fresh.storage().load_session().is_none());
    }

    #[test]
    fn corrupt_user_restores_anonymous() {
        let (dir, mut gate) = gate();
        std::fs::write(dir.path().join("user.json"), "{oops").unwrap();
        let mut backend = LocalBackend::with_demo_data();
        assert_eq!(gate.restore(&mut backend), &AuthState::Anonymous);
        assert!(!dir.path().join("user.json").exists());
    }

    #[test]
    fn registration_rules() {
        let ok = Registration {
            name: "N".into(),
            email: "n@x.io".into(),
            password: "secret".into(),
            password_confirmation: "secret".into(),
        };
        assert!(ok.validate().is_ok());
        let mismatch = Registration {
            password_confirmation: "other".into(),
            ..ok.clone()
        };
        match mismatch.validate() {
            Err(AdminError::Validation { message, .. }) => assert_eq!(message, "Passwords do not match"),
            other => panic!("unexpected {other:?}"),
        }
        let empty = Registration {
            name: " ".into(),
            ..ok
        };
        assert!(matches!(empty.validate(), Err(AdminError::Validation { field, .. }) if field == "name"));
    }
}
