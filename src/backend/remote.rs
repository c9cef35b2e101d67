use chrono::NaiveDate;
use tracing::info;

use super::Backend;
use crate::api::ApiClient;
use crate::auth::Registration;
use crate::error::AdminResult;
use crate::model::{SessionUser, UserFields, UserRecord};
use crate::report::{self, DateRange, Export, ExportRequest, ReportKind};
use crate::search::ListFilter;
use crate::stats::AggregateStats;

/// Backend served by the HTTP API.
#[derive(Clone, Debug)]
pub struct RemoteBackend {
    client: ApiClient,
}

impl RemoteBackend {
    pub fn new(base_url: &str) -> AdminResult<Self> {
        Ok(Self {
            client: ApiClient::new(base_url)?,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.client.token()
    }
}

impl Backend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn set_token(&mut self, token: Option<String>) {
        self.client.set_token(token);
    }

    fn login(&mut self, identifier: &str, secret: &str) -> AdminResult<(SessionUser, String)> {
        let resp = self.client.login(identifier.trim(), secret)?;
        Ok((resp.user, resp.token))
    }

    fn register(&mut self, registration: &Registration) -> AdminResult<()> {
        registration.validate()?;
        self.client.register(
            registration.name.trim(),
            registration.email.trim(),
            &registration.password,
            &registration.password_confirmation,
        )
    }

    fn logout(&mut self) -> AdminResult<()> {
        let res = self.client.logout();
        self.client.set_token(None);
        res
    }

    fn list_users(&mut self, filter: &ListFilter) -> AdminResult<Vec<UserRecord>> {
        self.client.list_users(filter)
    }

    fn get_user(&mut self, id: u64) -> AdminResult<UserRecord> {
        self.client.get_user(id)
    }

    fn create_user(&mut self, fields: UserFields, _today: NaiveDate) -> AdminResult<UserRecord> {
        fields.validate()?;
        self.client.create_user(&fields)
    }

    fn update_user(&mut self, id: u64, fields: UserFields) -> AdminResult<UserRecord> {
        fields.validate()?;
        self.client.update_user(id, &fields)
    }

    fn delete_user(&mut self, id: u64) -> AdminResult<()> {
        self.client.delete_user(id)
    }

    fn stats(&mut self, _today: NaiveDate) -> AdminResult<AggregateStats> {
        self.client.stats()
    }

    /// The full users export comes from the server; everything else is
    /// rendered locally from fetched records and server statistics.
    fn export(&mut self, request: &ExportRequest, today: NaiveDate) -> AdminResult<Export> {
        if request.kind == ReportKind::Users && request.date_range == DateRange::All {
            let bytes = self.client.export_blob(request.format)?;
            info!(bytes = bytes.len(), "server export received");
            return Ok(Export {
                file_name: request.file_name(today),
                content_type: request.format.content_type(),
                bytes,
            });
        }
        match request.kind {
            ReportKind::Users => {
                let records = self.client.list_users(&ListFilter::default())?;
                report::generate(&records, None, request, today)
            }
            ReportKind::Statistics => {
                let stats = self.client.stats()?;
                report::generate(&[], Some(&stats), request, today)
            }
        }
    }
}
