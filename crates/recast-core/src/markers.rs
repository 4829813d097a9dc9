use crate::common_enum;
use once_cell::sync::Lazy;
use std::sync::Arc;

common_enum! {
    /// Opaque metadata tag attached to a node. Markers are orthogonal to
    /// structural equality; they never influence change detection.
    pub enum Marker {
        /// Flags a node produced or matched by a search-style recipe.
        SearchResult(Option<String>),
        /// Hint for the printing collaborator.
        FormatHint(String),
        /// Free-form tag.
        Tag(String),
    }
}

/// Immutable, possibly-empty marker set. Adding a marker builds a new set;
/// the empty set is a shared sentinel rather than a fresh allocation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Markers {
    items: Arc<Vec<Marker>>,
}

static EMPTY_MARKERS: Lazy<Markers> = Lazy::new(|| Markers {
    items: Arc::new(Vec::new()),
});

impl Markers {
    pub fn empty() -> Self {
        EMPTY_MARKERS.clone()
    }

    pub fn from_vec(items: Vec<Marker>) -> Self {
        if items.is_empty() {
            Self::empty()
        } else {
            Self {
                items: Arc::new(items),
            }
        }
    }

    pub fn with(&self, marker: Marker) -> Self {
        let mut items = self.items.as_ref().clone();
        items.push(marker);
        Self {
            items: Arc::new(items),
        }
    }

    pub fn contains(&self, marker: &Marker) -> bool {
        self.items.contains(marker)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::empty()
    }
}
