//! Contact snapshot model.
//!
//! # Responsibility
//! - Represent one device contact after boundary validation.
//!
//! # Invariants
//! - `id` is opaque and owned by the contact provider.
//! - `image` is omitted from JSON when absent.

use serde::{Deserialize, Serialize};

/// Optional contact picture reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactImage {
    /// Platform URI of the picture.
    pub uri: String,
}

/// Validated contact record.
///
/// Values are immutable once obtained; note entries store their own clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Stable identifier from the contact provider.
    pub id: String,
    /// Display name used for listing and search.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ContactImage>,
}

impl Contact {
    /// Creates a contact without an image.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: None,
        }
    }

    /// Attaches an image reference.
    pub fn with_image(mut self, uri: impl Into<String>) -> Self {
        self.image = Some(ContactImage { uri: uri.into() });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Contact;

    #[test]
    fn serializes_without_image_field_when_absent() {
        let json = serde_json::to_string(&Contact::new("c1", "Ana")).unwrap();
        assert_eq!(json, r#"{"id":"c1","name":"Ana"}"#);
    }

    #[test]
    fn serializes_nested_image_uri() {
        let contact = Contact::new("c1", "Ana").with_image("content://photo/1");
        let json = serde_json::to_string(&contact).unwrap();
        assert!(json.contains(r#""image":{"uri":"content://photo/1"}"#));
    }
}
