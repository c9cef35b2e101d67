//! In-memory record repository.
//!
//! Owns the user records for the session. Order is insertion order; nothing
//! is sorted implicitly. Ids are allocated monotonically and never reused
//! within a session.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{AdminError, AdminResult};
use crate::model::{Photo, Status, UserFields, UserRecord};
use crate::search::ListFilter;

#[derive(Clone, Debug, Default)]
pub struct Repository {
    records: Vec<UserRecord>,
    next_id: u64,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from existing records; the next id follows the highest one.
    pub fn from_records(records: Vec<UserRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self { records, next_id }
    }

    /// The built-in demo data set.
    pub fn with_demo_data() -> Self {
        Self::from_records(demo_records())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn all(&self) -> &[UserRecord] {
        &self.records
    }

    /// Records matching `filter`, in insertion order.
    pub fn list(&self, filter: &ListFilter) -> Vec<UserRecord> {
        filter.apply(&self.records)
    }

    pub fn get(&self, id: u64) -> AdminResult<&UserRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AdminError::not_found(id))
    }

    pub fn create(&mut self, fields: UserFields, today: NaiveDate) -> AdminResult<UserRecord> {
        fields.validate()?;
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        let record = UserRecord {
            id,
            name: fields.name.trim().to_string(),
            email: fields.email.trim().to_string(),
            phone: fields.phone,
            address: fields.address,
            city: fields.city,
            country: fields.country,
            status: fields.status.unwrap_or_default(),
            created_at: today,
            photo: fields.photo,
        };
        debug!(id, "created record");
        self.records.push(record.clone());
        Ok(record)
    }

    /// Replace the mutable fields of `id`. `id` and `created_at` never change;
    /// a missing photo keeps the current one.
    pub fn update(&mut self, id: u64, fields: UserFields) -> AdminResult<UserRecord> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AdminError::not_found(id))?;
        fields.validate()?;
        record.name = fields.name.trim().to_string();
        record.email = fields.email.trim().to_string();
        record.phone = fields.phone;
        record.address = fields.address;
        record.city = fields.city;
        record.country = fields.country;
        if let Some(status) = fields.status {
            record.status = status;
        }
        if let Some(photo) = fields.photo {
            record.photo = Some(photo);
        }
        debug!(id, "updated record");
        Ok(record.clone())
    }

    pub fn delete(&mut self, id: u64) -> AdminResult<()> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AdminError::not_found(id))?;
        self.records.remove(idx);
        debug!(id, "deleted record");
        Ok(())
    }
}

/// Page `page_number` (1-indexed) of `records` with `page_size` rows.
///
/// Out-of-range pages, page 0 and a zero page size all yield an empty slice.
pub fn paginate<T>(records: &[T], page_size: usize, page_number: usize) -> &[T] {
    if page_size == 0 || page_number == 0 {
        return &[];
    }
    let start = (page_number - 1).saturating_mul(page_size);
    if start >= records.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(records.len());
    &records[start..end]
}

/// Number of pages needed to show `len` rows; at least 1 so the UI can say "page 1/1".
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    len.div_ceil(page_size).max(1)
}

const PEXELS: &str = "https://images.pexels.com/photos";

#[allow(clippy::too_many_arguments)]
fn demo(
    id: u64,
    name: &str,
    email: &str,
    phone: &str,
    address: &str,
    city: &str,
    country: &str,
    status: Status,
    created: (i32, u32, u32),
    photo: Option<&str>,
) -> UserRecord {
    UserRecord {
        id,
        name: name.to_string(),
        email: email.to_string(),
        phone: Some(phone.to_string()),
        address: Some(address.to_string()),
        city: Some(city.to_string()),
        country: Some(country.to_string()),
        status,
        created_at: NaiveDate::from_ymd_opt(created.0, created.1, created.2).unwrap_or_default(),
        photo: photo.map(|p| Photo::Url(format!("{PEXELS}/{p}"))),
    }
}

/// The seven demo users.
pub fn demo_records() -> Vec<UserRecord> {
    use Status::{Active, Inactive};
    vec![
        demo(1, "John Doe", "john@example.com", "+1 (555) 123-4567", "123 Main St", "New York", "USA", Active, (2023, 1, 15), Some("220453/pexels-photo-220453.jpeg")),
        demo(2, "Jane Smith", "jane@example.com", "+1 (555) 987-6543", "456 Park Ave", "Los Angeles", "USA", Active, (2023, 2, 20), Some("774909/pexels-photo-774909.jpeg")),
        demo(3, "Robert Johnson", "robert@example.com", "+1 (555) 456-7890", "789 Oak Dr", "Chicago", "USA", Inactive, (2023, 3, 10), Some("2379004/pexels-photo-2379004.jpeg")),
        demo(4, "Emily Davis", "emily@example.com", "+1 (555) 234-5678", "321 Pine St", "Houston", "USA", Active, (2023, 4, 5), Some("1239291/pexels-photo-1239291.jpeg")),
        demo(5, "Michael Brown", "michael@example.com", "+1 (555) 876-5432", "654 Cedar Ln", "Phoenix", "USA", Active, (2023, 5, 22), Some("614810/pexels-photo-614810.jpeg")),
        demo(6, "Sarah Wilson", "sarah@example.com", "+1 (555) 345-6789", "987 Maple Rd", "Philadelphia", "USA", Inactive, (2023, 6, 18), None),
        demo(7, "David Taylor", "david@example.com", "+1 (555) 765-4321", "246 Elm St", "San Antonio", "USA", Active, (2023, 7, 30), None),
    ]
}
