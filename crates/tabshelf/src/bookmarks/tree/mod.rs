//! # Bookmark Tree Store
//!
//! The bookmark tree is owned by an external store (the browser's bookmarks
//! API in production). tabshelf only ever talks to it through
//! [`BookmarkTree`]:
//!
//! - reads: `get_node`, `get_children`, `get_tree`
//! - writes: `create`, `move_node`, `update`, `remove`, `remove_tree`
//! - notifications: every successful write queues a [`TreeEvent`], drained
//!   with `take_events` and handed to the navigator by the host.
//!
//! Ids are assigned by the store; callers never invent them. Missing ids are
//! reported as [`TabshelfError::UnresolvedNode`](crate::error::TabshelfError::UnresolvedNode).
//!
//! [`mem::MemBookmarkTree`] is a complete in-memory implementation with the
//! browser's semantics, used in tests and by hosts without a native tree.

use crate::bookmarks::model::{BookmarkNode, ChangeInfo, CreateDetails, MoveDestination, TreeEvent};
use crate::error::Result;

pub mod mem;

pub trait BookmarkTree {
    fn get_node(&self, id: &str) -> Result<BookmarkNode>;

    /// Direct children in order. Pages have no children.
    fn get_children(&self, id: &str) -> Result<Vec<BookmarkNode>>;

    /// The root with `children` populated recursively.
    fn get_tree(&self) -> Result<BookmarkNode>;

    fn create(&self, details: CreateDetails) -> Result<BookmarkNode>;

    fn move_node(&self, id: &str, destination: MoveDestination) -> Result<BookmarkNode>;

    fn update(&self, id: &str, changes: ChangeInfo) -> Result<BookmarkNode>;

    /// Remove a page or an empty folder.
    fn remove(&self, id: &str) -> Result<()>;

    /// Remove a folder and everything under it.
    fn remove_tree(&self, id: &str) -> Result<()>;

    /// Drain queued change notifications, oldest first.
    fn take_events(&self) -> Vec<TreeEvent>;
}
