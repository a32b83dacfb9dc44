//! # New Tab
//!
//! [`NewTab`] is the wiring a host page needs: one settings store, one
//! bookmark tree, and the drawer editor, with the drawer's density following
//! the `bookmarks-drawer-small` setting.
//!
//! The host owns the event loop. It forwards storage change callbacks to
//! [`NewTab::sync_settings`] and tree notifications to
//! [`NewTab::pump_tree_events`]; everything else is synchronous.
//!
//! A density change that arrives while the host holds the editor is kept
//! pending and applied on the next [`NewTab::editor`] borrow.

use crate::bookmarks::editor::Editor;
use crate::bookmarks::navigator::Navigator;
use crate::bookmarks::tree::BookmarkTree;
use crate::bookmarks::view::SlotOp;
use crate::error::Result;
use crate::settings::storage::SettingsStorage;
use crate::settings::store::{SettingsStore, SettingsSubscription};
use crate::settings::SettingKey;
use std::cell::{Cell, RefCell, RefMut};
use std::rc::Rc;
use tracing::debug;

pub struct NewTab<S: SettingsStorage + 'static, T: BookmarkTree + 'static> {
    settings: Rc<SettingsStore<S>>,
    editor: Rc<RefCell<Editor<T>>>,
    pending_small: Rc<Cell<Option<bool>>>,
    size_subscription: SettingsSubscription,
}

impl<S: SettingsStorage + 'static, T: BookmarkTree + 'static> NewTab<S, T> {
    /// Build the drawer at the root of `tree` and keep its density in step
    /// with `settings`.
    pub fn new(settings: Rc<SettingsStore<S>>, tree: Rc<T>) -> Self {
        let small = settings.get_bool(SettingKey::BookmarksDrawerSmall);
        let mut navigator = Navigator::new(tree, small);
        navigator.refresh();
        let editor = Rc::new(RefCell::new(Editor::new(navigator)));

        let pending_small = Rc::new(Cell::new(None));
        let weak = Rc::downgrade(&editor);
        let pending = Rc::clone(&pending_small);
        let size_subscription = settings.on_changed(SettingKey::BookmarksDrawerSmall, move |value| {
            let Some(editor) = weak.upgrade() else {
                return;
            };
            let small = value.as_bool().unwrap_or(false);
            match editor.try_borrow_mut() {
                Ok(mut editor) => {
                    pending.set(None);
                    editor.navigator_mut().update_size(small);
                }
                Err(_) => {
                    debug!(small, "drawer busy; density change deferred");
                    pending.set(Some(small));
                }
            };
        });

        Self {
            settings,
            editor,
            pending_small,
            size_subscription,
        }
    }

    pub fn settings(&self) -> &Rc<SettingsStore<S>> {
        &self.settings
    }

    pub fn editor(&self) -> RefMut<'_, Editor<T>> {
        let mut editor = self.editor.borrow_mut();
        if let Some(small) = self.pending_small.take() {
            editor.navigator_mut().update_size(small);
        }
        editor
    }

    /// Apply pending settings storage changes.
    pub fn sync_settings(&self) -> Result<()> {
        self.settings.sync()
    }

    /// Deliver queued tree notifications to the drawer, in order.
    pub fn pump_tree_events(&self) -> Vec<SlotOp> {
        let mut editor = self.editor();
        let events = editor.navigator().tree().take_events();
        events
            .iter()
            .flat_map(|event| editor.navigator_mut().handle_event(event))
            .collect()
    }
}

impl<S: SettingsStorage + 'static, T: BookmarkTree + 'static> Drop for NewTab<S, T> {
    fn drop(&mut self) {
        self.settings.unsubscribe(self.size_subscription);
    }
}
