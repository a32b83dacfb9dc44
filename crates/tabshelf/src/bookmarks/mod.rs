//! # Bookmarks Drawer
//!
//! The drawer shows the contents of one folder of the external bookmark tree
//! at a time, keeps that view live while the tree changes underneath it, and
//! lets the user reorganize bookmarks by dragging.
//!
//! ```text
//!   BookmarkTree (external, source of truth)
//!        │  get_children / TreeEvent
//!        ▼
//!   Navigator ── stack: [root, .., current]
//!        │        slots: SlotList (one ViewSlot per child)
//!        ▼
//!   Editor ───── DragState (offset + expand flags while dragging)
//!                Dialog   (create / edit / delete)
//! ```
//!
//! The view is a cache. Whenever it cannot be patched with confidence it is
//! re-fetched from the tree.
//!
//! ## System Folders
//!
//! Every tree has a synthetic root and three fixed top-level folders. None of
//! them may be renamed, moved, or deleted, and nothing may be created directly
//! in the root.
//!
//! | Id | Folder |
//! |----|--------|
//! | `0` | root |
//! | `1` | bookmarks bar |
//! | `2` | other bookmarks |
//! | `3` | mobile bookmarks |

pub mod dialog;
pub mod drag;
pub mod editor;
pub mod menu;
pub mod model;
pub mod navigator;
pub mod tree;
pub mod view;

pub use editor::{DropAction, DropDetail, Editor};
pub use model::{BookmarkNode, ChangeInfo, CreateDetails, MoveDestination, MoveInfo, TreeEvent};
pub use navigator::{Navigator, Tooltip};
pub use tree::mem::MemBookmarkTree;
pub use tree::BookmarkTree;
pub use view::{Offset, SlotList, SlotOp, ViewSlot};

pub const ROOT_ID: &str = "0";

pub const PROTECTED_IDS: [&str; 4] = [ROOT_ID, "1", "2", "3"];

pub fn node_is_editable(id: &str) -> bool {
    !PROTECTED_IDS.contains(&id)
}

/// Title shown for a node: its title, else its url, else a placeholder.
pub fn display_title(node: &BookmarkNode) -> String {
    if !node.title.is_empty() {
        return node.title.clone();
    }
    match node.url.as_deref() {
        Some(url) if !url.is_empty() => url.to_string(),
        _ if node.id == ROOT_ID => "Bookmarks".to_string(),
        _ => "(Untitled Folder)".to_string(),
    }
}

/// Prepend `http://` to urls without a scheme. Empty input is returned as is.
pub fn fix_url(url: &str) -> String {
    if url.is_empty() || url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}
