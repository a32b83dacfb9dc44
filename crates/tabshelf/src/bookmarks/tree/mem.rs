use super::BookmarkTree;
use crate::bookmarks::model::{
    BookmarkNode, ChangeInfo, CreateDetails, MoveDestination, MoveInfo, TreeEvent,
};
use crate::bookmarks::{node_is_editable, ROOT_ID};
use crate::error::{Result, TabshelfError};
use chrono::Utc;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Entry {
    node: BookmarkNode,
    children: Vec<String>,
}

/// In-memory bookmark tree with browser semantics.
///
/// Starts with the fixed skeleton every browser profile has:
///
/// ```text
/// 0  (root, untitled)
/// ├── 1  Bookmarks bar
/// ├── 2  Other bookmarks
/// └── 3  Mobile bookmarks
/// ```
///
/// Uses `RefCell` for interior mutability since tabshelf is single-threaded.
#[derive(Debug)]
pub struct MemBookmarkTree {
    entries: RefCell<HashMap<String, Entry>>,
    next_id: Cell<u64>,
    events: RefCell<Vec<TreeEvent>>,
}

impl Default for MemBookmarkTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemBookmarkTree {
    pub fn new() -> Self {
        let tree = Self {
            entries: RefCell::new(HashMap::new()),
            next_id: Cell::new(4),
            events: RefCell::new(Vec::new()),
        };
        {
            let mut entries = tree.entries.borrow_mut();
            entries.insert(
                ROOT_ID.to_string(),
                Entry {
                    node: BookmarkNode::folder(ROOT_ID, None, ""),
                    children: vec!["1".into(), "2".into(), "3".into()],
                },
            );
            for (index, (id, title)) in [
                ("1", "Bookmarks bar"),
                ("2", "Other bookmarks"),
                ("3", "Mobile bookmarks"),
            ]
            .into_iter()
            .enumerate()
            {
                let mut node = BookmarkNode::folder(id, Some(ROOT_ID.to_string()), title);
                node.index = index;
                entries.insert(
                    id.to_string(),
                    Entry {
                        node,
                        children: Vec::new(),
                    },
                );
            }
        }
        tree
    }

    /// Build a tree from a nested node (e.g. a deserialized export).
    ///
    /// Ids are kept; new ids continue after the largest numeric id found.
    pub fn from_tree(root: BookmarkNode) -> Self {
        let tree = Self {
            entries: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            events: RefCell::new(Vec::new()),
        };
        let mut max_id = 0;
        let mut pending = vec![(root, None::<String>, 0usize)];
        {
            let mut entries = tree.entries.borrow_mut();
            while let Some((mut node, parent_id, index)) = pending.pop() {
                if let Ok(n) = node.id.parse::<u64>() {
                    max_id = max_id.max(n);
                }
                let children = node.children.take().unwrap_or_default();
                let child_ids = children.iter().map(|c| c.id.clone()).collect();
                for (i, child) in children.into_iter().enumerate() {
                    pending.push((child, Some(node.id.clone()), i));
                }
                node.parent_id = parent_id;
                node.index = index;
                entries.insert(
                    node.id.clone(),
                    Entry {
                        node,
                        children: child_ids,
                    },
                );
            }
        }
        tree.next_id.set(max_id + 1);
        tree
    }

    /// Reorder a folder's children, as a "sort by name" would.
    ///
    /// `order` must be a permutation of the current child ids.
    pub fn reorder_children(&self, parent_id: &str, order: &[&str]) -> Result<()> {
        {
            let mut entries = self.entries.borrow_mut();
            let parent = entries
                .get_mut(parent_id)
                .ok_or_else(|| TabshelfError::UnresolvedNode(parent_id.to_string()))?;
            let mut current: Vec<&str> = parent.children.iter().map(String::as_str).collect();
            let mut wanted = order.to_vec();
            current.sort_unstable();
            wanted.sort_unstable();
            if current != wanted {
                return Err(TabshelfError::Store(format!(
                    "reorder of {} is not a permutation of its children",
                    parent_id
                )));
            }
            parent.children = order.iter().map(|s| s.to_string()).collect();
            reindex(&mut entries, parent_id);
        }
        self.push_event(TreeEvent::ChildrenReordered {
            parent_id: parent_id.to_string(),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn push_event(&self, event: TreeEvent) {
        self.events.borrow_mut().push(event);
    }

    fn allocate_id(&self) -> String {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id.to_string()
    }

    fn ensure_editable(&self, id: &str) -> Result<()> {
        if !self.entries.borrow().contains_key(id) {
            return Err(TabshelfError::UnresolvedNode(id.to_string()));
        }
        if !node_is_editable(id) {
            return Err(TabshelfError::ProtectedNode(id.to_string()));
        }
        Ok(())
    }

    /// Validate that `id` names a folder new children may be added to.
    fn ensure_container(entries: &HashMap<String, Entry>, id: &str) -> Result<()> {
        let entry = entries
            .get(id)
            .ok_or_else(|| TabshelfError::UnresolvedNode(id.to_string()))?;
        if !entry.node.is_folder() {
            return Err(TabshelfError::Store(format!("{} is not a folder", id)));
        }
        if id == ROOT_ID {
            return Err(TabshelfError::ProtectedNode(id.to_string()));
        }
        Ok(())
    }

    fn is_same_or_ancestor(entries: &HashMap<String, Entry>, ancestor: &str, id: &str) -> bool {
        let mut current = Some(id.to_string());
        let mut steps = 0;
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            steps += 1;
            if steps > entries.len() {
                return false;
            }
            current = entries.get(&cur).and_then(|e| e.node.parent_id.clone());
        }
        false
    }

    fn detach(entries: &mut HashMap<String, Entry>, id: &str) -> Option<(String, usize)> {
        let parent_id = entries.get(id)?.node.parent_id.clone()?;
        let parent = entries.get_mut(&parent_id)?;
        let index = parent.children.iter().position(|c| c == id)?;
        parent.children.remove(index);
        reindex(entries, &parent_id);
        Some((parent_id, index))
    }

    fn build(entries: &HashMap<String, Entry>, id: &str) -> Option<BookmarkNode> {
        let entry = entries.get(id)?;
        let mut node = entry.node.clone();
        if node.is_folder() {
            node.children = Some(
                entry
                    .children
                    .iter()
                    .filter_map(|child| Self::build(entries, child))
                    .collect(),
            );
        }
        Some(node)
    }
}

fn reindex(entries: &mut HashMap<String, Entry>, parent_id: &str) {
    let children = match entries.get(parent_id) {
        Some(parent) => parent.children.clone(),
        None => return,
    };
    for (index, child) in children.iter().enumerate() {
        if let Some(entry) = entries.get_mut(child) {
            entry.node.index = index;
        }
    }
}

impl BookmarkTree for MemBookmarkTree {
    fn get_node(&self, id: &str) -> Result<BookmarkNode> {
        self.entries
            .borrow()
            .get(id)
            .map(|e| e.node.clone())
            .ok_or_else(|| TabshelfError::UnresolvedNode(id.to_string()))
    }

    fn get_children(&self, id: &str) -> Result<Vec<BookmarkNode>> {
        let entries = self.entries.borrow();
        let entry = entries
            .get(id)
            .ok_or_else(|| TabshelfError::UnresolvedNode(id.to_string()))?;
        Ok(entry
            .children
            .iter()
            .filter_map(|child| entries.get(child).map(|e| e.node.clone()))
            .collect())
    }

    fn get_tree(&self) -> Result<BookmarkNode> {
        let entries = self.entries.borrow();
        Self::build(&entries, ROOT_ID).ok_or_else(|| TabshelfError::UnresolvedNode(ROOT_ID.to_string()))
    }

    fn create(&self, details: CreateDetails) -> Result<BookmarkNode> {
        let node = {
            let mut entries = self.entries.borrow_mut();
            Self::ensure_container(&entries, &details.parent_id)?;

            let id = self.allocate_id();
            let mut node = BookmarkNode::folder(id.clone(), Some(details.parent_id.clone()), details.title);
            node.url = details.url;
            node.date_added = Some(Utc::now());

            if let Some(parent) = entries.get_mut(&details.parent_id) {
                let index = details
                    .index
                    .unwrap_or(parent.children.len())
                    .min(parent.children.len());
                parent.children.insert(index, id.clone());
            }
            entries.insert(
                id.clone(),
                Entry {
                    node,
                    children: Vec::new(),
                },
            );
            reindex(&mut entries, &details.parent_id);
            entries
                .get(&id)
                .map(|e| e.node.clone())
                .ok_or(TabshelfError::UnresolvedNode(id))?
        };
        self.push_event(TreeEvent::Created(node.clone()));
        Ok(node)
    }

    fn move_node(&self, id: &str, destination: MoveDestination) -> Result<BookmarkNode> {
        self.ensure_editable(id)?;
        let (node, info) = {
            let mut entries = self.entries.borrow_mut();
            Self::ensure_container(&entries, &destination.parent_id)?;
            if Self::is_same_or_ancestor(&entries, id, &destination.parent_id) {
                return Err(TabshelfError::Store(format!(
                    "cannot move {} into itself or its descendant",
                    id
                )));
            }

            let (old_parent_id, old_index) = Self::detach(&mut entries, id)
                .ok_or_else(|| TabshelfError::UnresolvedNode(id.to_string()))?;

            let parent = entries
                .get_mut(&destination.parent_id)
                .ok_or_else(|| TabshelfError::UnresolvedNode(destination.parent_id.clone()))?;
            // The requested index counts the moved node in its old place.
            let mut index = destination.index.unwrap_or(parent.children.len());
            if old_parent_id == destination.parent_id && index > old_index {
                index -= 1;
            }
            let index = index.min(parent.children.len());
            parent.children.insert(index, id.to_string());

            if let Some(entry) = entries.get_mut(id) {
                entry.node.parent_id = Some(destination.parent_id.clone());
            }
            reindex(&mut entries, &destination.parent_id);

            let node = entries
                .get(id)
                .map(|e| e.node.clone())
                .ok_or_else(|| TabshelfError::UnresolvedNode(id.to_string()))?;
            let info = MoveInfo {
                parent_id: destination.parent_id,
                old_parent_id,
                index,
                old_index,
            };
            (node, info)
        };
        self.push_event(TreeEvent::Moved {
            id: id.to_string(),
            info,
        });
        Ok(node)
    }

    fn update(&self, id: &str, changes: ChangeInfo) -> Result<BookmarkNode> {
        self.ensure_editable(id)?;
        let (node, applied) = {
            let mut entries = self.entries.borrow_mut();
            let entry = entries
                .get_mut(id)
                .ok_or_else(|| TabshelfError::UnresolvedNode(id.to_string()))?;
            // Folders have no url to change.
            let applied = ChangeInfo {
                title: changes.title,
                url: if entry.node.is_folder() { None } else { changes.url },
            };
            entry.node.merge(&applied);
            (entry.node.clone(), applied)
        };
        self.push_event(TreeEvent::Changed {
            id: id.to_string(),
            info: applied,
        });
        Ok(node)
    }

    fn remove(&self, id: &str) -> Result<()> {
        self.ensure_editable(id)?;
        let has_children = self
            .entries
            .borrow()
            .get(id)
            .is_some_and(|e| !e.children.is_empty());
        if has_children {
            return Err(TabshelfError::Store(format!("folder {} is not empty", id)));
        }
        self.remove_tree(id)
    }

    fn remove_tree(&self, id: &str) -> Result<()> {
        self.ensure_editable(id)?;
        let (parent_id, index) = {
            let mut entries = self.entries.borrow_mut();
            let (parent_id, index) = Self::detach(&mut entries, id)
                .ok_or_else(|| TabshelfError::UnresolvedNode(id.to_string()))?;

            let mut doomed = vec![id.to_string()];
            while let Some(next) = doomed.pop() {
                if let Some(entry) = entries.remove(&next) {
                    doomed.extend(entry.children);
                }
            }
            (parent_id, index)
        };
        self.push_event(TreeEvent::Removed {
            id: id.to_string(),
            parent_id,
            index,
        });
        Ok(())
    }

    fn take_events(&self) -> Vec<TreeEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use std::rc::Rc;

    /// Builds a `MemBookmarkTree` and remembers the id of every node it adds,
    /// keyed by title.
    pub struct TreeFixture {
        pub tree: Rc<MemBookmarkTree>,
        ids: HashMap<String, String>,
    }

    impl Default for TreeFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TreeFixture {
        pub fn new() -> Self {
            Self {
                tree: Rc::new(MemBookmarkTree::new()),
                ids: HashMap::new(),
            }
        }

        /// Add a folder under `parent`, which is a fixture title or a raw id.
        pub fn with_folder(mut self, parent: &str, title: &str) -> Self {
            let parent_id = self.resolve(parent);
            let node = self
                .tree
                .create(CreateDetails {
                    parent_id,
                    title: title.to_string(),
                    url: None,
                    index: None,
                })
                .unwrap();
            self.ids.insert(title.to_string(), node.id);
            self
        }

        pub fn with_page(mut self, parent: &str, title: &str, url: &str) -> Self {
            let parent_id = self.resolve(parent);
            let node = self
                .tree
                .create(CreateDetails {
                    parent_id,
                    title: title.to_string(),
                    url: Some(url.to_string()),
                    index: None,
                })
                .unwrap();
            self.ids.insert(title.to_string(), node.id);
            self
        }

        /// `count` pages titled "Page 1".."Page N".
        pub fn with_pages(mut self, parent: &str, count: usize) -> Self {
            for i in 0..count {
                let title = format!("Page {}", i + 1);
                let url = format!("https://example.com/{}", i + 1);
                self = self.with_page(parent, &title, &url);
            }
            self
        }

        /// Drop the creation events so tests start from a quiet tree.
        pub fn settled(self) -> Self {
            self.tree.take_events();
            self
        }

        /// Id of the node added with `title`.
        pub fn id(&self, title: &str) -> String {
            self.ids
                .get(title)
                .cloned()
                .unwrap_or_else(|| panic!("no fixture node titled {:?}", title))
        }

        fn resolve(&self, parent: &str) -> String {
            self.ids
                .get(parent)
                .cloned()
                .unwrap_or_else(|| parent.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(tree: &MemBookmarkTree, parent: &str) -> Vec<String> {
        tree.get_children(parent)
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect()
    }

    fn page(tree: &MemBookmarkTree, parent: &str, title: &str) -> BookmarkNode {
        tree.create(CreateDetails {
            parent_id: parent.into(),
            title: title.into(),
            url: Some(format!("https://{}.example", title.to_lowercase())),
            index: None,
        })
        .unwrap()
    }

    #[test]
    fn test_skeleton() {
        let tree = MemBookmarkTree::new();
        let root = tree.get_tree().unwrap();
        assert_eq!(root.id, ROOT_ID);
        let ids: Vec<_> = root.children.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_create_assigns_ids_and_indexes() {
        let tree = MemBookmarkTree::new();
        let a = page(&tree, "1", "A");
        let b = page(&tree, "1", "B");
        let c = tree
            .create(CreateDetails {
                parent_id: "1".into(),
                title: "C".into(),
                url: None,
                index: Some(0),
            })
            .unwrap();

        assert_ne!(a.id, b.id);
        assert!(c.is_folder());
        assert_eq!(titles(&tree, "1"), vec!["C", "A", "B"]);
        assert_eq!(tree.get_node(&b.id).unwrap().index, 2);
        assert_eq!(tree.take_events().len(), 3);
    }

    #[test]
    fn test_cannot_create_in_root() {
        let tree = MemBookmarkTree::new();
        let err = tree
            .create(CreateDetails {
                parent_id: ROOT_ID.into(),
                title: "Nope".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, TabshelfError::ProtectedNode(_)));
    }

    #[test]
    fn test_move_down_uses_pre_removal_index() {
        let tree = MemBookmarkTree::new();
        let ids: Vec<_> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|t| page(&tree, "1", t).id)
            .collect();
        tree.take_events();

        // Move C (2) to before F: index 5 in the list that still contains C.
        tree.move_node(&ids[2], MoveDestination::at("1", 5)).unwrap();

        assert_eq!(titles(&tree, "1"), vec!["A", "B", "D", "E", "C", "F"]);
        assert_eq!(
            tree.take_events(),
            vec![TreeEvent::Moved {
                id: ids[2].clone(),
                info: MoveInfo {
                    parent_id: "1".into(),
                    old_parent_id: "1".into(),
                    index: 4,
                    old_index: 2,
                },
            }]
        );
    }

    #[test]
    fn test_move_up_and_across_folders() {
        let tree = MemBookmarkTree::new();
        let a = page(&tree, "1", "A");
        let b = page(&tree, "1", "B");
        page(&tree, "2", "X");

        tree.move_node(&b.id, MoveDestination::at("1", 0)).unwrap();
        assert_eq!(titles(&tree, "1"), vec!["B", "A"]);

        tree.move_node(&a.id, MoveDestination::append_to("2")).unwrap();
        assert_eq!(titles(&tree, "1"), vec!["B"]);
        assert_eq!(titles(&tree, "2"), vec!["X", "A"]);
        assert_eq!(tree.get_node(&a.id).unwrap().parent_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_move_into_descendant_is_refused() {
        let tree = MemBookmarkTree::new();
        let outer = tree
            .create(CreateDetails {
                parent_id: "1".into(),
                title: "Outer".into(),
                ..Default::default()
            })
            .unwrap();
        let inner = tree
            .create(CreateDetails {
                parent_id: outer.id.clone(),
                title: "Inner".into(),
                ..Default::default()
            })
            .unwrap();

        assert!(tree.move_node(&outer.id, MoveDestination::append_to(&inner.id)).is_err());
        assert!(tree.move_node(&outer.id, MoveDestination::append_to(&outer.id)).is_err());
    }

    #[test]
    fn test_protected_nodes_cannot_change() {
        let tree = MemBookmarkTree::new();
        assert!(matches!(
            tree.remove_tree("1"),
            Err(TabshelfError::ProtectedNode(_))
        ));
        assert!(matches!(
            tree.update("2", ChangeInfo { title: Some("Mine".into()), url: None }),
            Err(TabshelfError::ProtectedNode(_))
        ));
        assert!(matches!(
            tree.move_node("3", MoveDestination::append_to("1")),
            Err(TabshelfError::ProtectedNode(_))
        ));
    }

    #[test]
    fn test_remove_refuses_non_empty_folder() {
        let tree = MemBookmarkTree::new();
        let folder = tree
            .create(CreateDetails {
                parent_id: "1".into(),
                title: "F".into(),
                ..Default::default()
            })
            .unwrap();
        let child = page(&tree, &folder.id, "Child");
        tree.take_events();

        assert!(tree.remove(&folder.id).is_err());
        tree.remove_tree(&folder.id).unwrap();

        assert!(tree.get_node(&child.id).is_err());
        assert_eq!(
            tree.take_events(),
            vec![TreeEvent::Removed {
                id: folder.id,
                parent_id: "1".into(),
                index: 0,
            }]
        );
    }

    #[test]
    fn test_update_ignores_url_on_folders() {
        let tree = MemBookmarkTree::new();
        let folder = tree
            .create(CreateDetails {
                parent_id: "1".into(),
                title: "F".into(),
                ..Default::default()
            })
            .unwrap();

        let updated = tree
            .update(
                &folder.id,
                ChangeInfo {
                    title: Some("G".into()),
                    url: Some("http://x".into()),
                },
            )
            .unwrap();
        assert_eq!(updated.title, "G");
        assert!(updated.is_folder());
    }

    #[test]
    fn test_reorder_children() {
        let tree = MemBookmarkTree::new();
        let a = page(&tree, "1", "A");
        let b = page(&tree, "1", "B");
        tree.take_events();

        tree.reorder_children("1", &[b.id.as_str(), a.id.as_str()]).unwrap();
        assert_eq!(titles(&tree, "1"), vec!["B", "A"]);
        assert_eq!(
            tree.take_events(),
            vec![TreeEvent::ChildrenReordered {
                parent_id: "1".into()
            }]
        );

        assert!(tree.reorder_children("1", &[a.id.as_str()]).is_err());
    }

    #[test]
    fn test_from_tree_continues_ids() {
        let source = MemBookmarkTree::new();
        page(&source, "1", "A");
        page(&source, "2", "B");
        let exported = source.get_tree().unwrap();

        let tree = MemBookmarkTree::from_tree(exported);
        assert_eq!(titles(&tree, "1"), vec!["A"]);
        assert_eq!(titles(&tree, "2"), vec!["B"]);

        let c = page(&tree, "1", "C");
        assert_eq!(c.id, "6");
        assert_eq!(tree.len(), 7);
    }
}
