//! Untyped contact records as delivered by the platform provider.

use crate::model::contact::{Contact, ContactImage};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Picture reference as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawContactImage {
    #[serde(default)]
    pub uri: Option<String>,
}

/// Provider record before validation.
///
/// Every field is optional and unknown fields are ignored, so provider
/// payloads that carry phone numbers, emails, etc. still parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawContact {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<RawContactImage>,
}

/// Reason a provider record was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    MissingId,
    MissingName { id: String },
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId => write!(f, "contact record has no id"),
            Self::MissingName { id } => write!(f, "contact `{id}` has no name"),
        }
    }
}

impl ContactValidationError {
    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingId => "missing_id",
            Self::MissingName { .. } => "missing_name",
        }
    }
}

impl Error for ContactValidationError {}

impl RawContact {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            image: None,
        }
    }

    /// Converts this record into a validated `Contact`.
    ///
    /// Rules:
    /// - `id` must be present and non-blank (kept verbatim).
    /// - `name` must be present and non-blank (trimmed).
    /// - an image without a non-blank uri is dropped.
    pub fn validate(self) -> Result<Contact, ContactValidationError> {
        let id = self
            .id
            .filter(|value| !value.trim().is_empty())
            .ok_or(ContactValidationError::MissingId)?;
        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(ContactValidationError::MissingName { id }),
        };
        let image = self
            .image
            .and_then(|image| image.uri)
            .filter(|uri| !uri.trim().is_empty())
            .map(|uri| ContactImage { uri });

        Ok(Contact { id, name, image })
    }
}

impl From<Contact> for RawContact {
    fn from(value: Contact) -> Self {
        Self {
            id: Some(value.id),
            name: Some(value.name),
            image: value.image.map(|image| RawContactImage {
                uri: Some(image.uri),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactValidationError, RawContact, RawContactImage};

    #[test]
    fn validate_trims_name_and_keeps_image() {
        let raw = RawContact {
            id: Some("42".to_string()),
            name: Some("  Ana Lopez ".to_string()),
            image: Some(RawContactImage {
                uri: Some("content://42/photo".to_string()),
            }),
        };
        let contact = raw.validate().unwrap();
        assert_eq!(contact.name, "Ana Lopez");
        assert_eq!(contact.image.unwrap().uri, "content://42/photo");
    }

    #[test]
    fn validate_rejects_missing_or_blank_id() {
        let raw = RawContact {
            id: Some("  ".to_string()),
            name: Some("Ana".to_string()),
            image: None,
        };
        assert_eq!(raw.validate(), Err(ContactValidationError::MissingId));
    }

    #[test]
    fn validate_rejects_nameless_contact() {
        let raw = RawContact {
            id: Some("7".to_string()),
            ..RawContact::default()
        };
        assert_eq!(
            raw.validate(),
            Err(ContactValidationError::MissingName { id: "7".to_string() })
        );
    }

    #[test]
    fn validation_errors_have_stable_codes() {
        assert_eq!(ContactValidationError::MissingId.code(), "missing_id");
        let missing_name = ContactValidationError::MissingName { id: "7".to_string() };
        assert_eq!(missing_name.code(), "missing_name");
    }

    #[test]
    fn image_without_uri_is_dropped() {
        let raw = RawContact {
            image: Some(RawContactImage { uri: None }),
            ..RawContact::new("1", "Ana")
        };
        assert!(raw.validate().unwrap().image.is_none());
    }

    #[test]
    fn unknown_provider_fields_are_ignored() {
        let raw: RawContact = serde_json::from_str(
            r#"{"id":"1","name":"Ana","phoneNumbers":[{"number":"123"}],"contactType":"person"}"#,
        )
        .unwrap();
        assert_eq!(raw.validate().unwrap().id, "1");
    }
}
