//! Workspace locations and the breadcrumb trail.

use serde::{Deserialize, Serialize};

/// Label of the first breadcrumb.
pub const HOME_LABEL: &str = "Home";

/// Where the user currently is: the root, or inside a specific folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    #[default]
    Root,
    Folder(i64),
}

impl Location {
    /// Folder id to scope requests to; `None` for the root.
    pub fn folder_id(self) -> Option<i64> {
        match self {
            Location::Root => None,
            Location::Folder(id) => Some(id),
        }
    }

    pub fn is_root(self) -> bool {
        matches!(self, Location::Root)
    }
}

impl From<Option<i64>> for Location {
    fn from(id: Option<i64>) -> Self {
        id.map_or(Location::Root, Location::Folder)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Root => f.write_str("root"),
            Location::Folder(id) => write!(f, "folder {}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub location: Location,
    pub name: String,
}

impl Breadcrumb {
    pub fn home() -> Self {
        Self {
            location: Location::Root,
            name: HOME_LABEL.to_string(),
        }
    }
}

/// Path from the root to the current location.
///
/// Always holds at least one element, the home crumb; the last element
/// names the current location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbTrail {
    items: Vec<Breadcrumb>,
}

impl Default for BreadcrumbTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl BreadcrumbTrail {
    pub fn new() -> Self {
        Self {
            items: vec![Breadcrumb::home()],
        }
    }

    pub fn items(&self) -> &[Breadcrumb] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Never true; the home crumb cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current(&self) -> &Breadcrumb {
        // Non-empty by construction.
        &self.items[self.items.len() - 1]
    }

    pub fn location(&self) -> Location {
        self.current().location
    }

    pub fn get(&self, index: usize) -> Option<&Breadcrumb> {
        self.items.get(index)
    }

    /// Record descending into `folder_id`.
    pub fn push(&mut self, folder_id: i64, name: impl Into<String>) {
        self.items.push(Breadcrumb {
            location: Location::Folder(folder_id),
            name: name.into(),
        });
    }

    /// Keep elements `0..=index`. Returns the new current location, or
    /// `None` (leaving the trail untouched) when `index` is out of range.
    pub fn truncate(&mut self, index: usize) -> Option<Location> {
        if index >= self.items.len() {
            return None;
        }
        self.items.truncate(index + 1);
        Some(self.location())
    }

    /// Index of the crumb before the current one, if any.
    pub fn parent_index(&self) -> Option<usize> {
        self.items.len().checked_sub(2)
    }

    /// Drop everything but the home crumb.
    pub fn reset(&mut self) {
        self.items.truncate(1);
    }
}
