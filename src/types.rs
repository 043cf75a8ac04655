use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Fragment;

/// Unique identifier for a fragment, scoped to an owner
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentId(pub String);

impl FragmentId {
    /// Generate a new random fragment ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FragmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FragmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Listing of an owner's fragments.
///
/// The metadata store can project down to bare identifiers, so callers get a
/// tagged result instead of having to sniff element types. Ordering within
/// either variant is backend-defined.
#[derive(Debug, Clone)]
pub enum FragmentListing {
    /// Identifiers only (`expand = false`)
    Ids(Vec<String>),
    /// Fully hydrated metadata records (`expand = true`)
    Full(Vec<Fragment>),
}

impl FragmentListing {
    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::Full(fragments) => fragments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
