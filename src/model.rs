//! Record types shared by the repository, the HTTP client, reports and the UI.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, AdminResult};

/// Account status. Always one of the two values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }

    /// Capitalized label used in tables and badges.
    pub fn label(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            other => Err(format!("unknown status '{other}' (expected active|inactive)")),
        }
    }
}

/// Image attached to a record: either a remote URL or an uploaded payload.
///
/// Serialized as a plain string: URLs verbatim, payloads as
/// `data:<mime>;base64,<bytes>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Photo {
    Url(String),
    Inline { content_type: String, bytes: Vec<u8> },
}

impl Photo {
    /// Read an image from disk. The content type is guessed from the extension
    /// and must be an `image/*` type.
    pub fn from_file(path: &Path) -> AdminResult<Self> {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(AdminError::validation(
                "photo",
                format!("{} is not an image ({})", path.display(), mime.essence_str()),
            ));
        }
        let bytes = std::fs::read(path).map_err(|e| {
            AdminError::validation("photo", format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(Photo::Inline {
            content_type: mime.essence_str().to_string(),
            bytes,
        })
    }

    pub fn to_data_url(&self) -> String {
        match self {
            Photo::Url(url) => url.clone(),
            Photo::Inline {
                content_type,
                bytes,
            } => format!("data:{content_type};base64,{}", BASE64.encode(bytes)),
        }
    }

    /// Short human description for detail views.
    pub fn describe(&self) -> String {
        match self {
            Photo::Url(url) => url.clone(),
            Photo::Inline {
                content_type,
                bytes,
            } => format!("{content_type}, {:.1} KiB (uploaded)", bytes.len() as f64 / 1024.0),
        }
    }

    /// File name used for the multipart `photo` part.
    pub fn file_name(&self) -> String {
        let ext = match self {
            Photo::Inline { content_type, .. } => mime_guess::get_mime_extensions_str(content_type)
                .and_then(|exts| exts.first())
                .copied()
                .unwrap_or("bin"),
            Photo::Url(_) => "bin",
        };
        format!("photo.{ext}")
    }
}

impl From<Photo> for String {
    fn from(p: Photo) -> Self {
        p.to_data_url()
    }
}

impl TryFrom<String> for Photo {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let Some(rest) = s.strip_prefix("data:") else {
            return Ok(Photo::Url(s));
        };
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| "malformed data URL".to_string())?;
        let content_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| "only base64 data URLs are supported".to_string())?;
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| format!("invalid base64 payload: {e}"))?;
        Ok(Photo::Inline {
            content_type: content_type.to_string(),
            bytes,
        })
    }
}

/// One managed user record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(with = "date_prefix")]
    pub created_at: NaiveDate,
    #[serde(rename = "photo_url", default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,
}

impl UserRecord {
    /// `YYYY-MM-DD`, the stored textual form of `created_at`.
    pub fn created_date(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }

    /// "City, Country" with whichever parts are present.
    pub fn location(&self) -> String {
        [self.city.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Dates are stored as `YYYY-MM-DD`; servers may send a full timestamp, in
/// which case only the date prefix is kept.
mod date_prefix {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        let prefix = raw.get(..10).unwrap_or(&raw);
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").map_err(serde::de::Error::custom)
    }
}

/// Mutable fields carried by create and update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserFields {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// `None` on create means active.
    pub status: Option<Status>,
    /// `None` on update keeps the current photo.
    pub photo: Option<Photo>,
}

impl UserFields {
    /// Check required fields. Returns the first failure.
    pub fn validate(&self) -> AdminResult<()> {
        if self.name.trim().is_empty() {
            return Err(AdminError::validation("name", "is required"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(AdminError::validation("email", "is required"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(AdminError::validation(
                "email",
                format!("'{email}' is not a valid address"),
            )),
        }
    }

    /// Text fields as `(name, value)` pairs, skipping empty optionals.
    pub fn text_pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("name", self.name.trim().to_string()),
            ("email", self.email.trim().to_string()),
        ];
        for (key, value) in [
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("country", &self.country),
        ] {
            if let Some(v) = value {
                out.push((key, v.clone()));
            }
        }
        if let Some(status) = self.status {
            out.push(("status", status.as_str().to_string()));
        }
        out
    }
}

/// Identity stored for an authenticated session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Last submitted create-form payload, shown once on the result screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub photo_preview: String,
}

impl FormData {
    pub fn from_fields(fields: &UserFields) -> Self {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name: fields.name.trim().to_string(),
            email: fields.email.trim().to_string(),
            phone: opt(&fields.phone),
            address: opt(&fields.address),
            city: opt(&fields.city),
            country: opt(&fields.country),
            photo_preview: fields.photo.as_ref().map(Photo::describe).unwrap_or_default(),
        }
    }
}

/// `Some(trimmed)` for non-blank input, `None` otherwise.
pub fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}
