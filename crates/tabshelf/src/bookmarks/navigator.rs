//! # Navigator
//!
//! Projects one folder of the bookmark tree onto a [`SlotList`] and keeps it
//! in step with [`TreeEvent`]s without reloading when a patch is possible.
//!
//! The navigation stack always starts at the root and is never empty:
//!
//! ```text
//! [0, 1, 42, 57]
//!  │         └── current folder (shown)
//!  └── root
//! ```
//!
//! ## Reconciliation
//!
//! | Event | Current folder involved | Otherwise |
//! |-------|-------------------------|-----------|
//! | created | upsert slot at `index` | ignored |
//! | removed | remove slot at `index` | id in stack: truncate stack before it, reopen |
//! | moved | relocate / upsert / remove slot | id in stack: rebuild stack from parent links, reopen |
//! | changed | merge fields into slot | ignored |
//! | children reordered | reopen | ignored |
//!
//! Stale ids are not errors here. Anything that fails to resolve makes the
//! operation a no-op and is logged at debug level.

use crate::bookmarks::model::{BookmarkNode, ChangeInfo, MoveInfo, TreeEvent};
use crate::bookmarks::tree::BookmarkTree;
use crate::bookmarks::view::{SlotList, SlotOp};
use crate::bookmarks::{display_title, ROOT_ID};
use crate::error::TabshelfError;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, warn};

/// A title shown next to a slot while the drawer is in small mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub id: String,
    pub text: String,
}

pub struct Navigator<T> {
    tree: Rc<T>,
    stack: Vec<String>,
    slots: SlotList,
    tooltip: Option<Tooltip>,
}

impl<T: BookmarkTree> Navigator<T> {
    /// A navigator positioned at the root. Nothing is fetched until the
    /// first `open_folder` or `refresh`.
    pub fn new(tree: Rc<T>, small: bool) -> Self {
        Self {
            tree,
            stack: vec![ROOT_ID.to_string()],
            slots: SlotList::new(small),
            tooltip: None,
        }
    }

    pub fn tree(&self) -> &Rc<T> {
        &self.tree
    }

    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    pub fn slots(&self) -> &SlotList {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut SlotList {
        &mut self.slots
    }

    pub fn current_folder(&self) -> &str {
        self.stack.last().map(String::as_str).unwrap_or(ROOT_ID)
    }

    /// The folder below the current one on the stack; `None` at the root.
    pub fn parent_folder(&self) -> Option<&str> {
        match self.stack.len() {
            0 | 1 => None,
            n => Some(self.stack[n - 2].as_str()),
        }
    }

    /// Show folder `id`, pushing it unless it is already current.
    ///
    /// Pages and unknown ids are ignored.
    pub fn open_folder(&mut self, id: &str) -> Vec<SlotOp> {
        let node = match self.tree.get_node(id) {
            Ok(node) => node,
            Err(err) => {
                log_lookup_failure(id, &err);
                return Vec::new();
            }
        };
        if !node.is_folder() {
            debug!(id, "open_folder ignored for a page");
            return Vec::new();
        }
        let children = match self.tree.get_children(id) {
            Ok(children) => children,
            Err(err) => {
                log_lookup_failure(id, &err);
                return Vec::new();
            }
        };
        if self.current_folder() != id {
            self.stack.push(id.to_string());
        }
        self.hide_tooltip();
        self.slots.reconcile(children)
    }

    /// Re-fetch the current folder.
    pub fn refresh(&mut self) -> Vec<SlotOp> {
        let current = self.current_folder().to_string();
        self.open_folder(&current)
    }

    /// Go up one level. No-op at the root.
    pub fn ascend(&mut self) -> Vec<SlotOp> {
        if self.stack.len() <= 1 {
            return Vec::new();
        }
        self.stack.pop();
        self.refresh()
    }

    pub fn handle_event(&mut self, event: &TreeEvent) -> Vec<SlotOp> {
        match event {
            TreeEvent::Created(node) => self.on_created(node),
            TreeEvent::Removed {
                id,
                parent_id,
                index,
            } => self.on_removed(id, parent_id, *index),
            TreeEvent::Moved { id, info } => self.on_moved(id, info),
            TreeEvent::Changed { id, info } => self.on_changed(id, info),
            TreeEvent::ChildrenReordered { parent_id } => self.on_children_reordered(parent_id),
        }
    }

    pub fn on_created(&mut self, node: &BookmarkNode) -> Vec<SlotOp> {
        if node.parent_id.as_deref() != Some(self.current_folder()) {
            return Vec::new();
        }
        vec![self.slots.upsert(node.index, node.clone())]
    }

    pub fn on_removed(&mut self, id: &str, parent_id: &str, index: usize) -> Vec<SlotOp> {
        if parent_id == self.current_folder() {
            return self.remove_slot(id, index);
        }
        if let Some(pos) = self.stack.iter().position(|s| s == id) {
            debug!(id, depth = pos, "folder on the stack was removed");
            self.stack.truncate(pos.max(1));
            return self.refresh();
        }
        Vec::new()
    }

    pub fn on_moved(&mut self, id: &str, info: &MoveInfo) -> Vec<SlotOp> {
        let current = self.current_folder().to_string();
        let into_current = info.parent_id == current;
        let from_current = info.old_parent_id == current;

        if into_current && from_current {
            if self.slots.get(info.index).is_some_and(|s| s.id() == id) {
                return Vec::new();
            }
            return match self.locate(id, info.old_index) {
                Some(from) => self.slots.relocate(from, info.index),
                None => self.refresh(),
            };
        }
        if into_current {
            return match self.tree.get_node(id) {
                Ok(mut node) => {
                    node.index = info.index;
                    vec![self.slots.upsert(info.index, node)]
                }
                Err(err) => {
                    log_lookup_failure(id, &err);
                    self.refresh()
                }
            };
        }
        if from_current {
            return self.remove_slot(id, info.old_index);
        }
        if let Some(pos) = self.stack.iter().position(|s| s == id) {
            self.rebuild_stack(id, pos);
            return self.refresh();
        }
        Vec::new()
    }

    pub fn on_changed(&mut self, id: &str, info: &ChangeInfo) -> Vec<SlotOp> {
        let op = self.slots.merge(id, info);
        if let (Some(tooltip), Some(slot)) = (self.tooltip.as_mut(), self.slots.position(id)) {
            if tooltip.id == id {
                tooltip.text = display_title(&self.slots.as_slice()[slot].node);
            }
        }
        op.into_iter().collect()
    }

    pub fn on_children_reordered(&mut self, parent_id: &str) -> Vec<SlotOp> {
        if parent_id == self.current_folder() {
            return self.refresh();
        }
        Vec::new()
    }

    /// Apply display density to every slot.
    pub fn update_size(&mut self, small: bool) {
        self.slots.set_small(small);
        if !small {
            self.hide_tooltip();
        }
    }

    pub fn is_small(&self) -> bool {
        self.slots.small()
    }

    /// Show the title of `id` as a tooltip. Only happens in small mode.
    pub fn maybe_show_tooltip(&mut self, id: &str) -> Option<&Tooltip> {
        if !self.is_small() {
            return None;
        }
        let text = match self.slots.position(id) {
            Some(index) => display_title(&self.slots.as_slice()[index].node),
            None => match self.tree.get_node(id) {
                Ok(node) => display_title(&node),
                Err(err) => {
                    log_lookup_failure(id, &err);
                    return None;
                }
            },
        };
        self.tooltip = Some(Tooltip {
            id: id.to_string(),
            text,
        });
        self.tooltip.as_ref()
    }

    pub fn hide_tooltip(&mut self) {
        self.tooltip = None;
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Index of the slot holding `id`, checking `hint` first.
    fn locate(&self, id: &str, hint: usize) -> Option<usize> {
        match self.slots.get(hint) {
            Some(slot) if slot.id() == id => Some(hint),
            _ => self.slots.position(id),
        }
    }

    fn remove_slot(&mut self, id: &str, hint: usize) -> Vec<SlotOp> {
        match self.locate(id, hint) {
            Some(index) => self.slots.remove(index).into_iter().collect(),
            None => {
                debug!(id, index = hint, "no slot to remove");
                Vec::new()
            }
        }
    }

    /// Replace the stack above the moved folder with its new ancestry,
    /// keeping whatever was open below it.
    fn rebuild_stack(&mut self, id: &str, pos: usize) {
        let tail: Vec<String> = self.stack.split_off(pos + 1);
        match self.path_to_root(id) {
            Some(mut path) => {
                path.extend(tail);
                self.stack = path;
            }
            None => {
                warn!(id, "could not rebuild navigation stack; returning to root");
                self.stack = vec![ROOT_ID.to_string()];
            }
        }
    }

    /// `[root, .., id]` following parent links, or `None` on a missing
    /// parent or a cycle.
    fn path_to_root(&self, id: &str) -> Option<Vec<String>> {
        let mut path = vec![id.to_string()];
        let mut seen = HashSet::from([id.to_string()]);
        let mut current = id.to_string();

        while current != ROOT_ID {
            let parent = self.tree.get_node(&current).ok()?.parent_id?;
            if !seen.insert(parent.clone()) {
                return None;
            }
            path.push(parent.clone());
            current = parent;
        }
        path.reverse();
        Some(path)
    }
}

fn log_lookup_failure(id: &str, err: &TabshelfError) {
    if err.is_unresolved() {
        debug!(id, "bookmark node no longer exists");
    } else {
        warn!(id, error = %err, "bookmark tree lookup failed");
    }
}
