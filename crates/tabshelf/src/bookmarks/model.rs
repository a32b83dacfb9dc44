use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A node of the external bookmark tree.
///
/// Nodes are owned by the tree store; tabshelf only reads them. A node without
/// a `url` is a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkNode {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    /// Only populated when fetched as part of a tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BookmarkNode>>,
}

impl BookmarkNode {
    pub fn folder(id: impl Into<String>, parent_id: Option<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id,
            title: title.into(),
            url: None,
            index: 0,
            date_added: None,
            children: None,
        }
    }

    pub fn page(
        id: impl Into<String>,
        parent_id: Option<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::folder(id, parent_id, title)
        }
    }

    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }

    /// Apply the fields of a change notification.
    pub fn merge(&mut self, changes: &ChangeInfo) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(url) = &changes.url {
            self.url = Some(url.clone());
        }
    }
}

/// Arguments for creating a node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateDetails {
    pub parent_id: String,
    pub title: String,
    /// `None` creates a folder.
    pub url: Option<String>,
    /// `None` appends.
    pub index: Option<usize>,
}

/// Where to move a node.
///
/// `index` follows browser semantics: it is a position in the destination's
/// children *before* the moved node is taken out. `None` appends.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveDestination {
    pub parent_id: String,
    pub index: Option<usize>,
}

impl MoveDestination {
    pub fn append_to(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            index: None,
        }
    }

    pub fn at(parent_id: impl Into<String>, index: usize) -> Self {
        Self {
            parent_id: parent_id.into(),
            index: Some(index),
        }
    }
}

/// Old and new location of a moved node; `index` is the final position.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveInfo {
    pub parent_id: String,
    pub old_parent_id: String,
    pub index: usize,
    pub old_index: usize,
}

/// Fields changed by an update. Also used as the update request itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeInfo {
    pub title: Option<String>,
    pub url: Option<String>,
}

/// Change notifications emitted by a [`BookmarkTree`](super::tree::BookmarkTree).
///
/// A move is always a single event carrying both locations.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
    Created(BookmarkNode),
    Removed {
        id: String,
        parent_id: String,
        index: usize,
    },
    Moved {
        id: String,
        info: MoveInfo,
    },
    Changed {
        id: String,
        info: ChangeInfo,
    },
    ChildrenReordered {
        parent_id: String,
    },
}
