use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FragmentError, FragmentId, FragmentResult};

/// Base mime types a fragment may be created with
pub const SUPPORTED_TYPES: &[&str] = &[
    "text/plain",
    "text/markdown",
    "text/html",
    "text/csv",
    "application/json",
    "application/yaml",
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/avif",
    "image/gif",
];

const IMAGE_TARGETS: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/gif",
    "image/avif",
];

/// Normalize a content-type string to its base mime type.
///
/// `"text/plain; charset=utf-8"` → `"text/plain"`. Returns `None` when the
/// value does not look like a `type/subtype` media type.
pub fn base_mime(value: &str) -> Option<String> {
    let base = value.split(';').next()?.trim().to_ascii_lowercase();
    let (kind, subtype) = base.split_once('/')?;
    if kind.is_empty() || subtype.is_empty() || base.contains(char::is_whitespace) {
        return None;
    }
    Some(base)
}

/// Base mime types a fragment of the given base mime may be converted to.
///
/// Textual formats only convert toward plain text (plus Markdown→HTML,
/// JSON→YAML, CSV→JSON); image formats interconvert freely. Unknown mimes
/// have no targets.
pub fn conversion_targets(mime: &str) -> &'static [&'static str] {
    match mime {
        "text/plain" => &["text/plain"],
        "text/markdown" => &["text/markdown", "text/html", "text/plain"],
        "text/html" => &["text/html", "text/plain"],
        "text/csv" => &["text/csv", "text/plain", "application/json"],
        "application/json" => &["application/json", "application/yaml", "text/plain"],
        "application/yaml" => &["application/yaml", "text/plain"],
        "image/png" | "image/jpeg" | "image/webp" | "image/gif" | "image/avif" => IMAGE_TARGETS,
        _ => &[],
    }
}

/// Map a file-extension token to its candidate base mime type
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        ".txt" => Some("text/plain"),
        ".md" => Some("text/markdown"),
        ".html" => Some("text/html"),
        ".json" => Some("application/json"),
        ".yaml" | ".yml" => Some("application/yaml"),
        ".csv" => Some("text/csv"),
        ".png" => Some("image/png"),
        ".jpg" | ".jpeg" => Some("image/jpeg"),
        ".webp" => Some("image/webp"),
        ".gif" => Some("image/gif"),
        ".avif" => Some("image/avif"),
        _ => None,
    }
}

/// A typed piece of data owned by a single principal.
///
/// The struct doubles as the persisted metadata record and the external JSON
/// projection: `{id, ownerId, type, size, created, updated}`. The blob bytes
/// themselves live in a [`BlobStore`](crate::BlobStore) and are reached
/// through [`FragmentAdapter`](crate::FragmentAdapter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub id: FragmentId,
    pub owner_id: String,
    /// Full declared content type, parameters included
    #[serde(rename = "type")]
    pub content_type: String,
    /// Byte length of the last successfully stored blob
    #[serde(default)]
    pub size: u64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Fragment {
    /// Create a new fragment with a generated ID and current timestamps.
    ///
    /// Fails with [`FragmentError::Validation`] when the owner is empty or
    /// the content type is missing/unsupported.
    pub fn new<O: Into<String>, T: Into<String>>(owner_id: O, content_type: T) -> FragmentResult<Self> {
        let now = Utc::now();
        let fragment = Self {
            id: FragmentId::new(),
            owner_id: owner_id.into(),
            content_type: content_type.into(),
            size: 0,
            created: now,
            updated: now,
        };
        fragment.validate()?;
        Ok(fragment)
    }

    /// Re-check the record invariants.
    ///
    /// Used when rehydrating records from a metadata store, so a stored
    /// record that has drifted out of the supported set fails loudly instead
    /// of flowing downstream.
    pub fn validate(&self) -> FragmentResult<()> {
        if self.owner_id.is_empty() {
            return Err(FragmentError::validation("ownerId is required"));
        }
        if self.content_type.is_empty() {
            return Err(FragmentError::validation("type is required"));
        }
        if !Self::is_supported_type(&self.content_type) {
            return Err(FragmentError::validation(format!(
                "unsupported type: {}",
                self.content_type
            )));
        }
        Ok(())
    }

    /// Whether a possibly-parameterized content-type string is supported.
    ///
    /// Never fails; any parse failure is treated as unsupported.
    pub fn is_supported_type(value: &str) -> bool {
        match base_mime(value) {
            Some(mime) => SUPPORTED_TYPES.contains(&mime.as_str()),
            None => false,
        }
    }

    /// The fragment's mime type without parameters
    pub fn mime_type(&self) -> String {
        // content_type was validated as parseable at construction
        base_mime(&self.content_type).unwrap_or_else(|| self.content_type.to_ascii_lowercase())
    }

    /// Whether this is a text fragment (`text/*`)
    pub fn is_text(&self) -> bool {
        self.mime_type().starts_with("text/")
    }

    /// Base mime types this fragment can be converted to
    pub fn formats(&self) -> &'static [&'static str] {
        conversion_targets(&self.mime_type())
    }

    /// Whether this fragment can be converted to the given extension token
    /// (e.g. `".html"`, `".png"`)
    pub fn can_convert_to(&self, ext: &str) -> bool {
        match mime_for_extension(ext) {
            Some(target) => self.formats().contains(&target),
            None => false,
        }
    }

    /// The external projection of the metadata record
    pub fn to_json(&self) -> FragmentResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
