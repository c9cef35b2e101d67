//! Backend seam between the UI and where records live.
//!
//! [`LocalBackend`] keeps everything in memory with the demo data set;
//! [`RemoteBackend`] talks to an HTTP API. The UI only sees `dyn Backend`.

pub mod local;
pub mod remote;

use chrono::NaiveDate;

use crate::auth::Registration;
use crate::error::AdminResult;
use crate::model::{SessionUser, UserFields, UserRecord};
use crate::report::{Export, ExportRequest};
use crate::search::ListFilter;
use crate::stats::AggregateStats;

pub use local::LocalBackend;
pub use remote::RemoteBackend;

pub trait Backend {
    /// Short name for logs and the status bar.
    fn name(&self) -> &'static str;

    /// Attach or detach the bearer credential used for later calls.
    fn set_token(&mut self, token: Option<String>);

    /// Verify credentials and return the identity plus its token.
    fn login(&mut self, identifier: &str, secret: &str) -> AdminResult<(SessionUser, String)>;

    fn register(&mut self, registration: &Registration) -> AdminResult<()>;

    fn logout(&mut self) -> AdminResult<()>;

    fn list_users(&mut self, filter: &ListFilter) -> AdminResult<Vec<UserRecord>>;

    fn get_user(&mut self, id: u64) -> AdminResult<UserRecord>;

    fn create_user(&mut self, fields: UserFields, today: NaiveDate) -> AdminResult<UserRecord>;

    fn update_user(&mut self, id: u64, fields: UserFields) -> AdminResult<UserRecord>;

    fn delete_user(&mut self, id: u64) -> AdminResult<()>;

    fn stats(&mut self, today: NaiveDate) -> AdminResult<AggregateStats>;

    fn export(&mut self, request: &ExportRequest, today: NaiveDate) -> AdminResult<Export>;
}

/// Pick the backend for a configured API URL; none means local demo data.
pub fn from_api_url(api_url: Option<&str>) -> AdminResult<Box<dyn Backend>> {
    match api_url.map(str::trim).filter(|s| !s.is_empty()) {
        Some(url) => Ok(Box::new(RemoteBackend::new(url)?)),
        None => Ok(Box::new(LocalBackend::with_demo_data())),
    }
}
