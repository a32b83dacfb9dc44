//! # Editor
//!
//! Everything the user can change in the drawer goes through the [`Editor`]:
//! drag and drop, the context menu and its dialogs. The editor owns the
//! [`Navigator`] it edits so that local feedback (offset flags, eager
//! splices) and tree reconciliation act on the same slots.
//!
//! A drop resolves to one of:
//!
//! | Dragged | Folder drop | Result |
//! |---------|-------------|--------|
//! | bookmark | yes, onto an editable folder | move into that folder (appended) |
//! | bookmark | no | reorder within the current folder |
//! | external link | yes | create inside that folder |
//! | external link | no | create at the drop position |
//!
//! Reorders and plain external drops do nothing while the root is shown.
//! Drag state is always reset after a drop, whatever happened.

use crate::bookmarks::dialog::{Dialog, DialogOutcome};
use crate::bookmarks::drag::{DragOver, DragState};
use crate::bookmarks::menu::{ContextMenu, MenuAction};
use crate::bookmarks::model::{BookmarkNode, CreateDetails, MoveDestination};
use crate::bookmarks::navigator::Navigator;
use crate::bookmarks::tree::BookmarkTree;
use crate::bookmarks::{fix_url, node_is_editable, ROOT_ID};
use crate::error::Result;
use std::rc::Rc;
use tracing::debug;

/// Payload carried by a drop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DropDetail {
    /// Set for bookmarks dragged within the drawer; `None` for external links.
    pub bookmark_id: Option<String>,
    pub title: String,
    pub url: Option<String>,
}

impl DropDetail {
    pub fn internal(id: impl Into<String>) -> Self {
        Self {
            bookmark_id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn external(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            bookmark_id: None,
            title: title.into(),
            url: Some(url.into()),
        }
    }
}

/// What a drop did to the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DropAction {
    MovedInto { id: String, folder_id: String },
    Reordered { id: String, index: usize },
    Created(BookmarkNode),
    Ignored,
}

pub struct Editor<T> {
    navigator: Navigator<T>,
    drag: Option<DragState>,
    menu: Option<ContextMenu>,
    dialog: Option<Dialog>,
}

impl<T: BookmarkTree> Editor<T> {
    pub fn new(navigator: Navigator<T>) -> Self {
        Self {
            navigator,
            drag: None,
            menu: None,
            dialog: None,
        }
    }

    pub fn navigator(&self) -> &Navigator<T> {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator<T> {
        &mut self.navigator
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    // --- Drag and drop ---

    /// Start dragging the row at `index`.
    pub fn drag_start(&mut self, index: usize) -> bool {
        match self.navigator.slots().get(index) {
            Some(slot) => {
                self.drag = Some(DragState::internal(index, slot.id()));
                true
            }
            None => false,
        }
    }

    /// Something from outside the drawer entered it. No-op if a drag is
    /// already in progress.
    pub fn drag_enter_external(&mut self) {
        if self.drag.is_none() {
            self.drag = Some(DragState::external(self.navigator.slots().len()));
        }
    }

    /// Pointer moved over a row. Returns `false` when nothing changed.
    pub fn handle_drag_over(&mut self, over: DragOver) -> bool {
        let Some(mut drag) = self.drag.take() else {
            return false;
        };
        let folder_drop = self
            .navigator
            .slots()
            .get(over.index)
            .is_some_and(|slot| drag.is_folder_drop(&slot.node, &over));

        let previous = drag.over();
        let changed = drag.update(self.navigator.slots_mut(), over.index, folder_drop);
        if changed {
            self.mark_expanded(previous, over.index, folder_drop);
        }
        self.drag = Some(drag);
        changed
    }

    fn mark_expanded(&mut self, previous: Option<usize>, index: usize, expand: bool) {
        let slots = self.navigator.slots_mut();
        if let Some(previous) = previous {
            if let Some(slot) = slots.get_mut(previous) {
                slot.expand = false;
            }
        }
        let mut expanded_id = None;
        if let Some(slot) = slots.get_mut(index) {
            slot.expand = expand;
            if expand {
                expanded_id = Some(slot.id().to_string());
            }
        }
        match expanded_id {
            Some(id) => {
                self.navigator.maybe_show_tooltip(&id);
            }
            None => self.navigator.hide_tooltip(),
        }
    }

    /// Commit a drop at `over`. Drag state is reset whatever the outcome.
    pub fn handle_drop(&mut self, over: DragOver, detail: DropDetail) -> Result<DropAction> {
        let drag = self.drag.take().unwrap_or_else(|| self.implicit_drag(&detail));
        let result = self.commit_drop(&drag, &over, &detail);
        self.reset_drag_state();
        if result.is_err() {
            self.navigator.refresh();
        }
        result
    }

    /// Drag state for a drop that arrived without a preceding drag start.
    fn implicit_drag(&self, detail: &DropDetail) -> DragState {
        let slots = self.navigator.slots();
        match detail
            .bookmark_id
            .as_deref()
            .and_then(|id| slots.position(id).map(|index| (index, id)))
        {
            Some((index, id)) => DragState::internal(index, id),
            None => DragState::external(slots.len()),
        }
    }

    fn commit_drop(&mut self, drag: &DragState, over: &DragOver, detail: &DropDetail) -> Result<DropAction> {
        let tree = Rc::clone(self.navigator.tree());
        let current = self.navigator.current_folder().to_string();
        let len = self.navigator.slots().len();
        let target = self.navigator.slots().get(over.index).map(|s| s.node.clone());
        let folder_drop = target
            .as_ref()
            .is_some_and(|node| drag.is_folder_drop(node, over));

        match (&detail.bookmark_id, target) {
            (Some(id), Some(target))
                if folder_drop && target.id != *id && node_is_editable(&target.id) =>
            {
                tree.move_node(id, MoveDestination::append_to(&target.id))?;
                Ok(DropAction::MovedInto {
                    id: id.clone(),
                    folder_id: target.id,
                })
            }
            (Some(id), _) => {
                if current == ROOT_ID {
                    debug!(id = %id, "reorder ignored in root");
                    return Ok(DropAction::Ignored);
                }
                let index = drag.reorder_destination(over.index, len);
                let start = self.navigator.slots().position(id).unwrap_or(drag.start());
                let final_index = if index > start { index - 1 } else { index };
                self.navigator.slots_mut().relocate(start, final_index);
                tree.move_node(id, MoveDestination::at(&current, index))?;
                Ok(DropAction::Reordered {
                    id: id.clone(),
                    index,
                })
            }
            (None, Some(target)) if folder_drop => {
                let node = tree.create(self.creation(&target.id, None, detail))?;
                Ok(DropAction::Created(node))
            }
            (None, _) => {
                if current == ROOT_ID {
                    debug!("external drop ignored in root");
                    return Ok(DropAction::Ignored);
                }
                let node = tree.create(self.creation(&current, Some(over.index.min(len)), detail))?;
                Ok(DropAction::Created(node))
            }
        }
    }

    fn creation(&self, parent_id: &str, index: Option<usize>, detail: &DropDetail) -> CreateDetails {
        let url = fix_url(detail.url.as_deref().unwrap_or_default());
        let title = if detail.title.is_empty() {
            url.clone()
        } else {
            detail.title.clone()
        };
        CreateDetails {
            parent_id: parent_id.to_string(),
            title,
            url: Some(url),
            index,
        }
    }

    /// Drop onto the "up" control: move or create into the parent folder.
    pub fn handle_drop_on_up_button(&mut self, detail: DropDetail) -> Result<DropAction> {
        let result = self.drop_into_parent(&detail);
        self.reset_drag_state();
        result
    }

    fn drop_into_parent(&mut self, detail: &DropDetail) -> Result<DropAction> {
        let parent = match self.navigator.parent_folder() {
            Some(parent) if parent != ROOT_ID => parent.to_string(),
            _ => return Ok(DropAction::Ignored),
        };
        let tree = Rc::clone(self.navigator.tree());
        match &detail.bookmark_id {
            Some(id) => {
                if !node_is_editable(id) {
                    return Ok(DropAction::Ignored);
                }
                tree.move_node(id, MoveDestination::append_to(&parent))?;
                Ok(DropAction::MovedInto {
                    id: id.clone(),
                    folder_id: parent,
                })
            }
            None => {
                let node = tree.create(self.creation(&parent, None, detail))?;
                Ok(DropAction::Created(node))
            }
        }
    }

    pub fn drag_end(&mut self) {
        self.reset_drag_state();
    }

    /// The pointer left a drop zone; only leaving the drawer cancels.
    pub fn drag_leave(&mut self, outside: bool) {
        if outside {
            self.reset_drag_state();
        }
    }

    pub fn reset_drag_state(&mut self) {
        self.drag = None;
        self.navigator.slots_mut().reset_visuals();
        self.navigator.hide_tooltip();
    }

    // --- Context menu and dialogs ---

    /// Open the context menu on the row holding `target_id`, or on the
    /// background when `None`.
    pub fn open_ctx_menu(&mut self, target_id: Option<&str>) -> &ContextMenu {
        let slots = self.navigator.slots();
        let target = target_id.and_then(|id| {
            slots
                .position(id)
                .and_then(|index| slots.get(index).map(|slot| (index, &slot.node)))
        });
        let menu = ContextMenu::build(target, self.navigator.current_folder());
        self.menu.insert(menu)
    }

    pub fn close_ctx_menu(&mut self) {
        self.menu = None;
    }

    pub fn ctx_menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }

    /// Choose a menu entry. Opens its dialog unless the entry is disabled.
    pub fn choose_menu_action(&mut self, action: MenuAction) -> Option<&mut Dialog> {
        let menu = self.menu.take()?;
        let dialog = Dialog::for_action(&menu, action)?;
        Some(self.dialog.insert(dialog))
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut Dialog> {
        self.dialog.as_mut()
    }

    /// Apply the open dialog. The dialog stays open if the tree refuses.
    pub fn submit_dialog(&mut self) -> Result<Option<DialogOutcome>> {
        let Some(dialog) = self.dialog.as_ref() else {
            return Ok(None);
        };
        let outcome = dialog.submit(self.navigator.tree().as_ref())?;
        self.dialog = None;
        Ok(Some(outcome))
    }

    pub fn cancel_dialog(&mut self) {
        self.dialog = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::tree::mem::fixtures::TreeFixture;
    use crate::bookmarks::tree::mem::MemBookmarkTree;
    use crate::bookmarks::view::Offset;

    const ROW: f64 = 20.0;

    fn editor_in(fx: &TreeFixture, folder: &str) -> Editor<MemBookmarkTree> {
        let mut nav = Navigator::new(Rc::clone(&fx.tree), false);
        nav.open_folder(folder);
        Editor::new(nav)
    }

    fn pump(editor: &mut Editor<MemBookmarkTree>) {
        let events = editor.navigator().tree().take_events();
        for event in events {
            editor.navigator_mut().handle_event(&event);
        }
    }

    fn titles(editor: &Editor<MemBookmarkTree>) -> Vec<String> {
        editor
            .navigator()
            .slots()
            .iter()
            .map(|s| s.node.title.clone())
            .collect()
    }

    fn tree_titles(fx: &TreeFixture, parent: &str) -> Vec<String> {
        fx.tree
            .get_children(parent)
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect()
    }

    #[test]
    fn test_drag_down_commits_after_target() {
        let fx = TreeFixture::new().with_pages("1", 6).settled();
        let mut editor = editor_in(&fx, "1");

        assert!(editor.drag_start(2));
        editor.handle_drag_over(DragOver::middle_of(3, ROW));
        editor.handle_drag_over(DragOver::middle_of(4, ROW));
        let action = editor
            .handle_drop(DragOver::middle_of(4, ROW), DropDetail::internal(fx.id("Page 3")))
            .unwrap();

        assert_eq!(
            action,
            DropAction::Reordered {
                id: fx.id("Page 3"),
                index: 5
            }
        );
        let expected = vec!["Page 1", "Page 2", "Page 4", "Page 5", "Page 3", "Page 6"];
        assert_eq!(titles(&editor), expected);
        assert_eq!(tree_titles(&fx, "1"), expected);

        // The tree's own notification agrees with the eager splice.
        pump(&mut editor);
        assert_eq!(titles(&editor), expected);
        assert!(editor.drag_state().is_none());
        assert!(editor
            .navigator()
            .slots()
            .iter()
            .all(|s| s.offset == Offset::None && !s.expand));
    }

    #[test]
    fn test_drag_up_commits_before_target() {
        let fx = TreeFixture::new().with_pages("1", 6).settled();
        let mut editor = editor_in(&fx, "1");

        editor.drag_start(4);
        editor.handle_drag_over(DragOver::middle_of(1, ROW));
        let action = editor
            .handle_drop(DragOver::middle_of(1, ROW), DropDetail::internal(fx.id("Page 5")))
            .unwrap();

        assert_eq!(
            action,
            DropAction::Reordered {
                id: fx.id("Page 5"),
                index: 1
            }
        );
        assert_eq!(
            tree_titles(&fx, "1"),
            vec!["Page 1", "Page 5", "Page 2", "Page 3", "Page 4", "Page 6"]
        );
    }

    #[test]
    fn test_drop_in_trailing_whitespace_appends() {
        let fx = TreeFixture::new().with_pages("1", 3).settled();
        let mut editor = editor_in(&fx, "1");

        editor.drag_start(0);
        editor
            .handle_drop(DragOver::middle_of(7, ROW), DropDetail::internal(fx.id("Page 1")))
            .unwrap();

        assert_eq!(tree_titles(&fx, "1"), vec!["Page 2", "Page 3", "Page 1"]);
        assert_eq!(titles(&editor), vec!["Page 2", "Page 3", "Page 1"]);
    }

    #[test]
    fn test_internal_folder_drop_moves_into_folder() {
        let fx = TreeFixture::new()
            .with_page("1", "Doc", "https://doc.example")
            .with_page("1", "Spacer", "https://spacer.example")
            .with_folder("1", "Archive")
            .settled();
        let mut editor = editor_in(&fx, "1");

        editor.drag_start(0);
        editor.handle_drag_over(DragOver::middle_of(2, ROW));
        assert!(editor.navigator().slots().get(2).unwrap().expand);

        let action = editor
            .handle_drop(DragOver::middle_of(2, ROW), DropDetail::internal(fx.id("Doc")))
            .unwrap();

        assert_eq!(
            action,
            DropAction::MovedInto {
                id: fx.id("Doc"),
                folder_id: fx.id("Archive")
            }
        );
        assert_eq!(tree_titles(&fx, &fx.id("Archive")), vec!["Doc"]);
        pump(&mut editor);
        assert_eq!(titles(&editor), vec!["Spacer", "Archive"]);
    }

    #[test]
    fn test_external_drop_on_expanded_folder_creates_child() {
        let fx = TreeFixture::new()
            .with_pages("1", 2)
            .with_folder("1", "Inbox")
            .settled();
        let mut editor = editor_in(&fx, "1");

        editor.drag_enter_external();
        editor.handle_drag_over(DragOver::middle_of(2, ROW));
        assert!(editor.navigator().slots().get(2).unwrap().expand);

        let action = editor
            .handle_drop(
                DragOver::middle_of(2, ROW),
                DropDetail::external("Rust", "rust-lang.org"),
            )
            .unwrap();

        let DropAction::Created(node) = action else {
            panic!("expected a created bookmark");
        };
        assert_eq!(node.parent_id, Some(fx.id("Inbox")));
        assert_eq!(node.url.as_deref(), Some("http://rust-lang.org"));
        assert_eq!(tree_titles(&fx, "1"), vec!["Page 1", "Page 2", "Inbox"]);
    }

    #[test]
    fn test_external_plain_drop_creates_at_index() {
        let fx = TreeFixture::new().with_pages("1", 3).settled();
        let mut editor = editor_in(&fx, "1");

        editor.drag_enter_external();
        editor
            .handle_drop(
                DragOver::middle_of(1, ROW),
                DropDetail::external("", "https://new.example"),
            )
            .unwrap();

        assert_eq!(
            tree_titles(&fx, "1"),
            vec!["Page 1", "https://new.example", "Page 2", "Page 3"]
        );
    }

    #[test]
    fn test_drops_in_root_only_enter_system_folders() {
        let fx = TreeFixture::new();
        let mut editor = editor_in(&fx, ROOT_ID);

        // The bottom edge of a system folder is still "inside".
        editor.drag_enter_external();
        let action = editor
            .handle_drop(
                DragOver::new(0, 19.0, 0.0, ROW),
                DropDetail::external("A", "a.example"),
            )
            .unwrap();
        assert!(matches!(action, DropAction::Created(_)));
        assert_eq!(tree_titles(&fx, "1"), vec!["A"]);

        editor.drag_start(1);
        let action = editor
            .handle_drop(DragOver::middle_of(2, ROW), DropDetail::internal("2"))
            .unwrap();
        assert_eq!(action, DropAction::Ignored);
    }

    #[test]
    fn test_drop_on_up_button() {
        let fx = TreeFixture::new()
            .with_folder("1", "Outer")
            .with_folder("Outer", "Inner")
            .with_page("Inner", "Deep", "https://deep.example")
            .settled();
        let mut editor = editor_in(&fx, "1");
        editor.navigator_mut().open_folder(&fx.id("Outer"));
        editor.navigator_mut().open_folder(&fx.id("Inner"));

        editor.drag_start(0);
        let action = editor
            .handle_drop_on_up_button(DropDetail::internal(fx.id("Deep")))
            .unwrap();
        assert_eq!(
            action,
            DropAction::MovedInto {
                id: fx.id("Deep"),
                folder_id: fx.id("Outer")
            }
        );

        // Parent of the bookmarks bar is the root: nothing to do.
        let mut top = editor_in(&fx, "1");
        let action = top
            .handle_drop_on_up_button(DropDetail::external("X", "x.example"))
            .unwrap();
        assert_eq!(action, DropAction::Ignored);
    }

    #[test]
    fn test_drag_leave_inside_keeps_state() {
        let fx = TreeFixture::new().with_pages("1", 3).settled();
        let mut editor = editor_in(&fx, "1");

        editor.drag_start(0);
        editor.handle_drag_over(DragOver::middle_of(2, ROW));
        editor.drag_leave(false);
        assert!(editor.drag_state().is_some());

        editor.drag_leave(true);
        assert!(editor.drag_state().is_none());
        assert!(editor
            .navigator()
            .slots()
            .iter()
            .all(|s| s.offset == Offset::None));
    }

    #[test]
    fn test_failed_drop_resyncs_slots() {
        let fx = TreeFixture::new().with_pages("1", 3).settled();
        let mut editor = editor_in(&fx, "1");

        editor.drag_start(0);
        let stale = fx.id("Page 1");
        fx.tree.remove(&stale).unwrap();
        fx.tree.take_events();

        let result = editor.handle_drop(DragOver::middle_of(2, ROW), DropDetail::internal(stale));
        assert!(result.is_err());
        assert_eq!(titles(&editor), vec!["Page 2", "Page 3"]);
    }

    #[test]
    fn test_expand_shows_tooltip_in_small_mode() {
        let fx = TreeFixture::new()
            .with_page("1", "Doc", "https://doc.example")
            .with_folder("1", "Archive")
            .settled();
        let mut editor = editor_in(&fx, "1");
        editor.navigator_mut().update_size(true);

        editor.drag_start(0);
        editor.handle_drag_over(DragOver::middle_of(1, ROW));
        assert_eq!(
            editor.navigator().tooltip().map(|t| t.text.as_str()),
            Some("Archive")
        );

        editor.drag_end();
        assert!(editor.navigator().tooltip().is_none());
    }

    #[test]
    fn test_context_menu_to_dialog() {
        let fx = TreeFixture::new()
            .with_page("1", "Doc", "https://doc.example")
            .settled();
        let mut editor = editor_in(&fx, "1");

        let doc = fx.id("Doc");
        assert!(editor.open_ctx_menu(Some(doc.as_str())).is_enabled(MenuAction::Delete));
        editor.choose_menu_action(MenuAction::Delete).unwrap();
        let outcome = editor.submit_dialog().unwrap();

        assert_eq!(outcome, Some(DialogOutcome::Deleted(doc)));
        assert!(editor.dialog().is_none());
        pump(&mut editor);
        assert!(editor.navigator().slots().is_empty());
    }

    #[test]
    fn test_cancel_dialog() {
        let fx = TreeFixture::new();
        let mut editor = editor_in(&fx, "2");

        editor.open_ctx_menu(None);
        let dialog = editor.choose_menu_action(MenuAction::AddFolder).unwrap();
        dialog.title = "Never".into();
        editor.cancel_dialog();

        assert_eq!(editor.submit_dialog().unwrap(), None);
        assert!(fx.tree.get_children("2").unwrap().is_empty());
    }
}
