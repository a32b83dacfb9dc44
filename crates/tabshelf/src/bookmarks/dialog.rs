use crate::bookmarks::menu::{ContextMenu, MenuAction};
use crate::bookmarks::model::{BookmarkNode, ChangeInfo, CreateDetails};
use crate::bookmarks::tree::BookmarkTree;
use crate::bookmarks::{fix_url, node_is_editable};
use crate::error::{Result, TabshelfError};

#[derive(Debug, Clone, PartialEq)]
pub enum DialogKind {
    CreatePage {
        parent_id: String,
        index: Option<usize>,
    },
    CreateFolder {
        parent_id: String,
        index: Option<usize>,
    },
    Edit {
        node: BookmarkNode,
    },
    ConfirmDelete {
        node: BookmarkNode,
    },
}

/// An open dialog and its form fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogOutcome {
    Created(BookmarkNode),
    Updated(BookmarkNode),
    Deleted(String),
}

impl Dialog {
    /// The dialog `action` opens from `menu`, or `None` if the action is disabled.
    pub fn for_action(menu: &ContextMenu, action: MenuAction) -> Option<Self> {
        if !menu.is_enabled(action) {
            return None;
        }
        let (kind, title, url) = match action {
            MenuAction::AddPage => (
                DialogKind::CreatePage {
                    parent_id: menu.parent_id.clone(),
                    index: menu.insert_index,
                },
                String::new(),
                String::new(),
            ),
            MenuAction::AddFolder => (
                DialogKind::CreateFolder {
                    parent_id: menu.parent_id.clone(),
                    index: menu.insert_index,
                },
                String::new(),
                String::new(),
            ),
            MenuAction::Edit => {
                let node = menu.target.clone()?;
                let title = node.title.clone();
                let url = node.url.clone().unwrap_or_default();
                (DialogKind::Edit { node }, title, url)
            }
            MenuAction::Delete => {
                let node = menu.target.clone()?;
                let title = node.title.clone();
                (DialogKind::ConfirmDelete { node }, title, String::new())
            }
        };
        Some(Self { kind, title, url })
    }

    /// Carry out the dialog against the tree using its current fields.
    pub fn submit<T: BookmarkTree>(&self, tree: &T) -> Result<DialogOutcome> {
        match &self.kind {
            DialogKind::CreatePage { parent_id, index } => {
                let url = fix_url(self.url.trim());
                if url.is_empty() {
                    return Err(TabshelfError::InvalidInput("a page needs a url".into()));
                }
                let node = tree.create(CreateDetails {
                    parent_id: parent_id.clone(),
                    title: self.title.clone(),
                    url: Some(url),
                    index: *index,
                })?;
                Ok(DialogOutcome::Created(node))
            }
            DialogKind::CreateFolder { parent_id, index } => {
                let node = tree.create(CreateDetails {
                    parent_id: parent_id.clone(),
                    title: self.title.clone(),
                    url: None,
                    index: *index,
                })?;
                Ok(DialogOutcome::Created(node))
            }
            DialogKind::Edit { node } => {
                ensure_editable(node)?;
                let url = if node.is_folder() {
                    None
                } else {
                    let url = fix_url(self.url.trim());
                    if url.is_empty() {
                        return Err(TabshelfError::InvalidInput("a page needs a url".into()));
                    }
                    Some(url)
                };
                let updated = tree.update(
                    &node.id,
                    ChangeInfo {
                        title: Some(self.title.clone()),
                        url,
                    },
                )?;
                Ok(DialogOutcome::Updated(updated))
            }
            DialogKind::ConfirmDelete { node } => {
                ensure_editable(node)?;
                if node.is_folder() {
                    tree.remove_tree(&node.id)?;
                } else {
                    tree.remove(&node.id)?;
                }
                Ok(DialogOutcome::Deleted(node.id.clone()))
            }
        }
    }
}

fn ensure_editable(node: &BookmarkNode) -> Result<()> {
    if node_is_editable(&node.id) {
        Ok(())
    } else {
        Err(TabshelfError::ProtectedNode(node.id.clone()))
    }
}
