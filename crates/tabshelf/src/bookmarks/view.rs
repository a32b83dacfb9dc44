use crate::bookmarks::model::{BookmarkNode, ChangeInfo};

/// Visual displacement of a slot while something is dragged past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Offset {
    #[default]
    None,
    TranslateUp,
    TranslateDown,
}

/// One visible row of the drawer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSlot {
    pub node: BookmarkNode,
    /// Display density.
    pub small: bool,
    /// Highlighted as a folder-drop target.
    pub expand: bool,
    pub offset: Offset,
}

impl ViewSlot {
    pub fn new(node: BookmarkNode, small: bool) -> Self {
        Self {
            node,
            small,
            expand: false,
            offset: Offset::None,
        }
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn reset_visual(&mut self) {
        self.expand = false;
        self.offset = Offset::None;
    }
}

/// A change applied to the slot list, for renderers that patch rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOp {
    Removed { index: usize, id: String },
    Updated { index: usize, id: String },
    Inserted { index: usize, id: String },
}

/// Ordered view records, reused by position across reloads.
#[derive(Debug, Clone, Default)]
pub struct SlotList {
    slots: Vec<ViewSlot>,
    small: bool,
}

impl SlotList {
    pub fn new(small: bool) -> Self {
        Self {
            slots: Vec::new(),
            small,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ViewSlot> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ViewSlot> {
        self.slots.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewSlot> {
        self.slots.iter()
    }

    pub fn as_slice(&self) -> &[ViewSlot] {
        &self.slots
    }

    pub fn ids(&self) -> Vec<&str> {
        self.slots.iter().map(ViewSlot::id).collect()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.id() == id)
    }

    pub fn small(&self) -> bool {
        self.small
    }

    /// Align the list with `children`.
    ///
    /// Surplus slots are dropped from the end first, then each child is
    /// assigned to the slot at its index. Slots whose node is already equal
    /// produce no op.
    pub fn reconcile(&mut self, children: Vec<BookmarkNode>) -> Vec<SlotOp> {
        let mut ops = Vec::new();

        while self.slots.len() > children.len() {
            let index = self.slots.len() - 1;
            if let Some(slot) = self.slots.pop() {
                ops.push(SlotOp::Removed {
                    index,
                    id: slot.node.id,
                });
            }
        }

        for (index, child) in children.into_iter().enumerate() {
            match self.slots.get_mut(index) {
                Some(slot) if slot.node == child => {}
                Some(slot) => {
                    slot.node = child;
                    slot.reset_visual();
                    ops.push(SlotOp::Updated {
                        index,
                        id: slot.node.id.clone(),
                    });
                }
                None => {
                    ops.push(SlotOp::Inserted {
                        index,
                        id: child.id.clone(),
                    });
                    self.slots.push(ViewSlot::new(child, self.small));
                }
            }
        }
        ops
    }

    /// Put `node` at `index`, overwriting in place when that slot already
    /// holds the same id.
    pub fn upsert(&mut self, index: usize, node: BookmarkNode) -> SlotOp {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.id() == node.id {
                slot.node = node;
                return SlotOp::Updated {
                    index,
                    id: slot.node.id.clone(),
                };
            }
        }
        let index = index.min(self.slots.len());
        let id = node.id.clone();
        self.slots.insert(index, ViewSlot::new(node, self.small));
        SlotOp::Inserted { index, id }
    }

    pub fn remove(&mut self, index: usize) -> Option<SlotOp> {
        if index >= self.slots.len() {
            return None;
        }
        let slot = self.slots.remove(index);
        Some(SlotOp::Removed {
            index,
            id: slot.node.id,
        })
    }

    /// Move the slot at `from` so it ends up at `to`.
    pub fn relocate(&mut self, from: usize, to: usize) -> Vec<SlotOp> {
        if from >= self.slots.len() || from == to {
            return Vec::new();
        }
        let slot = self.slots.remove(from);
        let to = to.min(self.slots.len());
        let id = slot.node.id.clone();
        self.slots.insert(to, slot);
        vec![
            SlotOp::Removed {
                index: from,
                id: id.clone(),
            },
            SlotOp::Inserted { index: to, id },
        ]
    }

    /// Merge changed fields into the slot holding `id`.
    pub fn merge(&mut self, id: &str, changes: &ChangeInfo) -> Option<SlotOp> {
        let index = self.position(id)?;
        let slot = &mut self.slots[index];
        slot.node.merge(changes);
        Some(SlotOp::Updated {
            index,
            id: id.to_string(),
        })
    }

    /// Apply display density to every slot, and to slots created later.
    pub fn set_small(&mut self, small: bool) {
        self.small = small;
        for slot in &mut self.slots {
            slot.small = small;
        }
    }

    pub fn reset_visuals(&mut self) {
        for slot in &mut self.slots {
            slot.reset_visual();
        }
    }
}
