//! Contact source contract and fetch helpers.

use super::raw::RawContact;
use crate::model::contact::Contact;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Contact field a caller asks the provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Id,
    Name,
    Image,
}

/// Provider-side ordering request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactSort {
    /// Whatever order the user configured on the device.
    UserDefault,
    FirstName,
    LastName,
}

/// Parameters for one provider fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub fields: Vec<ContactField>,
    /// `None` means no ordering guarantee.
    pub sort: Option<ContactSort>,
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self {
            fields: vec![ContactField::Id, ContactField::Name, ContactField::Image],
            sort: Some(ContactSort::UserDefault),
        }
    }
}

impl FetchRequest {
    pub fn wants(&self, field: ContactField) -> bool {
        self.fields.contains(&field)
    }
}

/// Provider failure while fetching contacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactSourceError {
    /// User has not granted contact access.
    PermissionDenied,
    Unavailable(String),
    /// Provider returned data that could not be read at all.
    InvalidPayload(String),
}

impl Display for ContactSourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "contact access was denied"),
            Self::Unavailable(message) => write!(f, "contact provider unavailable: {message}"),
            Self::InvalidPayload(message) => write!(f, "invalid contact payload: {message}"),
        }
    }
}

impl Error for ContactSourceError {}

/// Read-only provider of device contacts.
pub trait ContactSource {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawContact>, ContactSourceError>;
}

/// In-memory contact source.
///
/// Used where the host platform hands over contact records directly.
#[derive(Debug, Clone, Default)]
pub struct StaticContactSource {
    records: Vec<RawContact>,
}

impl StaticContactSource {
    pub fn new(records: Vec<RawContact>) -> Self {
        Self { records }
    }

    /// Parses a JSON array of provider records.
    pub fn from_json(raw: &str) -> Result<Self, ContactSourceError> {
        serde_json::from_str::<Vec<RawContact>>(raw)
            .map(Self::new)
            .map_err(|err| ContactSourceError::InvalidPayload(err.to_string()))
    }
}

impl ContactSource for StaticContactSource {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawContact>, ContactSourceError> {
        let mut records = self.records.clone();
        if !request.wants(ContactField::Image) {
            for record in &mut records {
                record.image = None;
            }
        }
        match request.sort {
            Some(ContactSort::FirstName) => records.sort_by_key(first_name_key),
            Some(ContactSort::LastName) => records.sort_by_key(last_name_key),
            Some(ContactSort::UserDefault) | None => {}
        }
        Ok(records)
    }
}

/// Fetches and validates contacts, falling back to empty on failure.
///
/// # Side effects
/// - Logs skipped record counts and provider failures.
pub fn load_contacts(source: &dyn ContactSource, request: &FetchRequest) -> Vec<Contact> {
    let started_at = Instant::now();
    let records = match source.fetch(request) {
        Ok(records) => records,
        Err(err) => {
            error!(
                "event=contacts_fetch module=contacts status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Vec::new();
        }
    };

    let fetched = records.len();
    let contacts: Vec<Contact> = records
        .into_iter()
        .filter_map(|record| match record.validate() {
            Ok(contact) => Some(contact),
            Err(err) => {
                debug!(
                    "event=contacts_validate module=contacts status=skipped error_code={}",
                    err.code()
                );
                None
            }
        })
        .collect();
    let skipped = fetched - contacts.len();
    if skipped > 0 {
        warn!("event=contacts_validate module=contacts status=partial skipped={skipped}");
    }
    info!(
        "event=contacts_fetch module=contacts status=ok count={} duration_ms={}",
        contacts.len(),
        started_at.elapsed().as_millis()
    );
    contacts
}

fn first_name_key(record: &RawContact) -> String {
    record.name.as_deref().unwrap_or_default().trim().to_lowercase()
}

fn last_name_key(record: &RawContact) -> String {
    let name = first_name_key(record);
    match name.rsplit_once(' ') {
        Some((rest, last)) => format!("{last} {rest}"),
        None => name,
    }
}
