//! Durable client-side key/value storage.
//!
//! Each key is a JSON file `<dir>/<key>.json`. Values that fail to parse are
//! treated as absent and removed, so a corrupt file never blocks startup.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AdminResult;
use crate::model::{FormData, SessionUser};

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "token";
pub const FORM_DATA_KEY: &str = "formData";

#[derive(Clone, Debug)]
pub struct ClientStorage {
    dir: PathBuf,
}

impl ClientStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path(key);
        let raw = std::fs::read(&path).ok()?;
        match serde_json::from_slice(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "discarding corrupt stored value");
                self.remove(key);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> AdminResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let bytes = serde_json::to_vec_pretty(value)?;
        std::fs::write(self.path(key), bytes)?;
        Ok(())
    }

    /// Remove `key`; a missing key is not an error.
    pub fn remove(&self, key: &str) {
        if let Err(e) = std::fs::remove_file(self.path(key))
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(key, error = %e, "failed to remove stored value");
        }
    }

    /// Read and delete in one step.
    pub fn take<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let v = self.get(key);
        self.remove(key);
        v
    }

    pub fn save_session(&self, user: &SessionUser, token: &str) -> AdminResult<()> {
        self.set(USER_KEY, user)?;
        self.set(TOKEN_KEY, &token)
    }

    /// The persisted user and token. A user without a token is still
    /// returned; the local backend does not need one.
    pub fn load_session(&self) -> Option<(SessionUser, Option<String>)> {
        let user = self.get::<SessionUser>(USER_KEY)?;
        Some((user, self.get::<String>(TOKEN_KEY)))
    }

    pub fn clear_session(&self) {
        self.remove(USER_KEY);
        self.remove(TOKEN_KEY);
    }

    pub fn save_form_data(&self, data: &FormData) -> AdminResult<()> {
        self.set(FORM_DATA_KEY, data)
    }

    /// The last submitted form payload, consumed on read.
    pub fn take_form_data(&self) -> Option<FormData> {
        self.take(FORM_DATA_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: 1,
            name: "Administrator".into(),
            email: "admin@example.com".into(),
            role: "admin".into(),
            photo_url: None,
        }
    }

    #[test]
    fn session_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let st = ClientStorage::new(dir.path().join("storage"));
        st.save_session(&user(), "tok").unwrap();
        let (u, t) = st.load_session().unwrap();
        assert_eq!(u, user());
        assert_eq!(t.as_deref(), Some("tok"));
        st.clear_session();
        assert!(st.load_session().is_none());
    }

    #[test]
    fn corrupt_value_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let st = ClientStorage::new(dir.path());
        std::fs::write(dir.path().join("user.json"), b"{not json").unwrap();
        assert!(st.load_session().is_none());
        assert!(!dir.path().join("user.json").exists());
    }

    #[test]
    fn form_data_is_consumed_once() {
        let dir = tempfile::tempdir().unwrap();
        let st = ClientStorage::new(dir.path());
        let data = FormData {
            name: "A".into(),
            email: "a@b.c".into(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            country: String::new(),
            photo_preview: String::new(),
        };
        st.save_form_data(&data).unwrap();
        assert_eq!(st.take_form_data(), Some(data));
        assert_eq!(st.take_form_data(), None);
    }

    #[test]
    fn form_data_uses_camel_case_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let st = ClientStorage::new(dir.path());
        let data = FormData {
            name: "A".into(),
            email: "a@b.c".into(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            country: String::new(),
            photo_preview: "x".into(),
        };
        st.save_form_data(&data).unwrap();
        let raw = std::fs::read_to_string(dir.path().join("formData.json")).unwrap();
        assert!(raw.contains("\"photoPreview\""));
    }
}
