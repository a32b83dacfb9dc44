use crate::bookmarks::model::BookmarkNode;
use crate::bookmarks::{node_is_editable, ROOT_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddPage,
    AddFolder,
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub action: MenuAction,
    pub enabled: bool,
}

/// A context menu opened on a row, or on the empty drawer background.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    /// The row's node; `None` for the background.
    pub target: Option<BookmarkNode>,
    /// Folder new pages and folders are created in.
    pub parent_id: String,
    /// Creation position within `parent_id`; `None` appends.
    pub insert_index: Option<usize>,
    pub items: Vec<MenuItem>,
}

impl ContextMenu {
    /// Menu for the row at `index` holding `target`, shown inside `current_folder`.
    ///
    /// New items go right after the clicked row. Nothing can be created in
    /// the root itself, so a click on one of its folders creates inside that
    /// folder instead. System folders cannot be edited or deleted.
    pub fn build(target: Option<(usize, &BookmarkNode)>, current_folder: &str) -> Self {
        let (parent_id, insert_index) = match target {
            Some((_, node)) if current_folder == ROOT_ID && node.is_folder() => {
                (node.id.clone(), None)
            }
            Some((index, _)) => (current_folder.to_string(), Some(index + 1)),
            None => (current_folder.to_string(), None),
        };
        let can_create = parent_id != ROOT_ID;
        let can_edit = target.is_some_and(|(_, node)| node_is_editable(&node.id));

        let items = vec![
            MenuItem {
                action: MenuAction::AddPage,
                enabled: can_create,
            },
            MenuItem {
                action: MenuAction::AddFolder,
                enabled: can_create,
            },
            MenuItem {
                action: MenuAction::Edit,
                enabled: can_edit,
            },
            MenuItem {
                action: MenuAction::Delete,
                enabled: can_edit,
            },
        ];

        Self {
            target: target.map(|(_, node)| node.clone()),
            parent_id,
            insert_index,
            items,
        }
    }

    pub fn is_enabled(&self, action: MenuAction) -> bool {
        self.items
            .iter()
            .any(|item| item.action == action && item.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_background_disables_everything() {
        let menu = ContextMenu::build(None, ROOT_ID);

        assert!(menu.items.iter().all(|item| !item.enabled));
    }

    #[test]
    fn test_system_folder_in_root_creates_inside_it() {
        let other = BookmarkNode::folder("2", Some(ROOT_ID.into()), "Other bookmarks");
        let menu = ContextMenu::build(Some((1, &other)), ROOT_ID);

        assert!(menu.is_enabled(MenuAction::AddPage));
        assert!(menu.is_enabled(MenuAction::AddFolder));
        assert!(!menu.is_enabled(MenuAction::Edit));
        assert!(!menu.is_enabled(MenuAction::Delete));
        assert_eq!(menu.parent_id, "2");
        assert_eq!(menu.insert_index, None);
    }

    #[test]
    fn test_row_menu_in_regular_folder() {
        let page = BookmarkNode::page("42", Some("1".into()), "A", "https://a.example");
        let menu = ContextMenu::build(Some((3, &page)), "1");

        assert!(menu.is_enabled(MenuAction::AddPage));
        assert!(menu.is_enabled(MenuAction::AddFolder));
        assert!(menu.is_enabled(MenuAction::Edit));
        assert!(menu.is_enabled(MenuAction::Delete));
        assert_eq!(menu.insert_index, Some(4));
        assert_eq!(menu.parent_id, "1");
    }

    #[test]
    fn test_background_menu_only_creates() {
        let menu = ContextMenu::build(None, "1");

        assert!(menu.is_enabled(MenuAction::AddPage));
        assert!(!menu.is_enabled(MenuAction::Edit));
        assert!(!menu.is_enabled(MenuAction::Delete));
        assert_eq!(menu.insert_index, None);
    }
}
