//! # Drag Reorder Algebra
//!
//! While an item is dragged over the drawer, the rows between where it came
//! from (`start`) and where it would land (`target`) slide out of the way:
//!
//! ```text
//! dragging down (start < target)     dragging up (target < start)
//!
//!   0                                   0
//!   1                                   1  target   ↓ TranslateDown
//!   2  start                            2           ↓ TranslateDown
//!   3           ↑ TranslateUp           3  start
//!   4  target   ↑ TranslateUp           4
//! ```
//!
//! Offsets depend only on `start` and `target`, so moving the target only
//! touches rows between the old and the new target. Targets past the last
//! row (trailing whitespace) count as the last row, except that the last row
//! never shifts down for them. An external drag has no row of its own and
//! starts one past the end of the list.
//!
//! ## Folder Drop
//!
//! Hovering a folder can mean "put it here" or "put it inside". The part of
//! the folder's row nearest the origin of the drag, [`DEAD_ZONE`] of its
//! height, still means "here"; beyond that it means "inside". System folders
//! are always "inside".

use crate::bookmarks::model::BookmarkNode;
use crate::bookmarks::node_is_editable;
use crate::bookmarks::view::{Offset, SlotList};

/// Fraction of a folder row that still counts as a reorder target.
pub const DEAD_ZONE: f64 = 0.3;

/// Pointer position over a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOver {
    /// Row under the pointer; `>= len` is the empty space below the list.
    pub index: usize,
    pub pointer_y: f64,
    pub target_top: f64,
    pub target_height: f64,
}

impl DragOver {
    pub fn new(index: usize, pointer_y: f64, target_top: f64, target_height: f64) -> Self {
        Self {
            index,
            pointer_y,
            target_top,
            target_height,
        }
    }

    /// Pointer over the middle of row `index`, for rows of `height` stacked
    /// from zero.
    pub fn middle_of(index: usize, height: f64) -> Self {
        let top = index as f64 * height;
        Self::new(index, top + height / 2.0, top, height)
    }

    /// Where the pointer sits within the row, 0.0 at the top edge.
    fn fraction(&self) -> Option<f64> {
        (self.target_height > 0.0).then(|| (self.pointer_y - self.target_top) / self.target_height)
    }
}

/// An in-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    start: usize,
    dragged_id: Option<String>,
    over: Option<usize>,
    folder_drop: bool,
}

impl DragState {
    /// Dragging the row at `index`.
    pub fn internal(index: usize, id: impl Into<String>) -> Self {
        Self {
            start: index,
            dragged_id: Some(id.into()),
            over: None,
            folder_drop: false,
        }
    }

    /// Dragging something from outside into a list of `len` rows.
    pub fn external(len: usize) -> Self {
        Self {
            start: len,
            dragged_id: None,
            over: None,
            folder_drop: false,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.dragged_id.as_deref()
    }

    pub fn is_external(&self) -> bool {
        self.dragged_id.is_none()
    }

    pub fn over(&self) -> Option<usize> {
        self.over
    }

    pub fn folder_drop(&self) -> bool {
        self.folder_drop
    }

    pub fn is_dragging_down(&self, target: usize) -> bool {
        self.start < target
    }

    fn dragged_is_editable(&self) -> bool {
        self.dragged_id.as_deref().map_or(true, node_is_editable)
    }

    /// Whether dropping on `target` at `over` means "inside the folder".
    pub fn is_folder_drop(&self, target: &BookmarkNode, over: &DragOver) -> bool {
        if over.index == self.start || !self.dragged_is_editable() || !target.is_folder() {
            return false;
        }
        if self.dragged_id.as_deref() == Some(target.id.as_str()) {
            return false;
        }
        if !node_is_editable(&target.id) {
            return true;
        }
        match over.fraction() {
            Some(f) if self.is_dragging_down(over.index) => f > DEAD_ZONE,
            Some(f) => f < 1.0 - DEAD_ZONE,
            None => false,
        }
    }

    /// The offset row `index` should have while targeting `target`.
    fn offset_for(&self, index: usize, target: usize) -> Offset {
        if self.start < target && self.start < index && index <= target {
            Offset::TranslateUp
        } else if target < self.start && target <= index && index < self.start {
            Offset::TranslateDown
        } else {
            Offset::None
        }
    }

    /// Record a new pointer position and update slot offsets.
    ///
    /// Returns `false` when nothing changed.
    pub fn update(&mut self, slots: &mut SlotList, index: usize, folder_drop: bool) -> bool {
        if self.over == Some(index) && self.folder_drop == folder_drop {
            return false;
        }
        self.folder_drop = folder_drop;
        if self.over == Some(index) {
            return true;
        }

        let len = slots.len();
        if len > 0 {
            let clamp = |i: usize| i.min(len - 1);
            let previous = clamp(self.over.unwrap_or(self.start));
            let target = clamp(index);
            let lo = previous.min(target).min(clamp(self.start));
            let hi = previous.max(target).max(clamp(self.start));
            for i in lo..=hi {
                let offset = self.offset_for(i, target);
                if let Some(slot) = slots.get_mut(i) {
                    slot.offset = offset;
                }
            }
            // Nothing sits below the last row to make room for.
            if index >= len {
                if let Some(last) = slots.get_mut(len - 1) {
                    if last.offset == Offset::TranslateDown {
                        last.offset = Offset::None;
                    }
                }
            }
        }
        self.over = Some(index);
        true
    }

    /// Position to hand to the tree's move for a reorder dropped at `index`.
    ///
    /// Counts the dragged row in its old place, so dropping below the start
    /// lands after the target.
    pub fn reorder_destination(&self, index: usize, len: usize) -> usize {
        if index >= len {
            len
        } else if self.is_dragging_down(index) {
            index + 1
        } else {
            index
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(n: usize) -> SlotList {
        let mut list = SlotList::new(false);
        list.reconcile(
            (0..n)
                .map(|i| {
                    let id = (10 + i).to_string();
                    if i % 2 == 0 {
                        BookmarkNode::folder(id, Some("1".into()), format!("F{}", i))
                    } else {
                        BookmarkNode::page(id, Some("1".into()), format!("P{}", i), "https://x.example")
                    }
                })
                .collect(),
        );
        list
    }

    fn offsets(list: &SlotList) -> Vec<Offset> {
        list.iter().map(|s| s.offset).collect()
    }

    use Offset::{None as N, TranslateDown as D, TranslateUp as U};

    #[test]
    fn test_dragging_down_shifts_rows_up() {
        let mut list = slots(6);
        let mut drag = DragState::internal(2, "12");

        assert!(drag.update(&mut list, 4, false));
        assert_eq!(offsets(&list), vec![N, N, N, U, U, N]);
    }

    #[test]
    fn test_dragging_up_shifts_rows_down() {
        let mut list = slots(6);
        let mut drag = DragState::internal(4, "14");

        drag.update(&mut list, 1, false);
        assert_eq!(offsets(&list), vec![N, D, D, D, N, N]);
    }

    #[test]
    fn test_returning_to_start_clears() {
        let mut list = slots(6);
        let mut drag = DragState::internal(2, "12");

        drag.update(&mut list, 5, false);
        drag.update(&mut list, 2, false);
        assert_eq!(offsets(&list), vec![N; 6]);
    }

    #[test]
    fn test_crossing_the_start_flips_direction() {
        let mut list = slots(6);
        let mut drag = DragState::internal(2, "12");

        drag.update(&mut list, 4, false);
        drag.update(&mut list, 0, false);
        assert_eq!(offsets(&list), vec![D, D, N, N, N, N]);
    }

    #[test]
    fn test_shrinking_target_range() {
        let mut list = slots(6);
        let mut drag = DragState::internal(0, "10");

        drag.update(&mut list, 5, false);
        drag.update(&mut list, 2, false);
        assert_eq!(offsets(&list), vec![N, U, U, N, N, N]);
    }

    #[test]
    fn test_trailing_whitespace_is_clamped() {
        let mut list = slots(4);
        let mut drag = DragState::internal(1, "11");

        drag.update(&mut list, 9, false);
        assert_eq!(offsets(&list), vec![N, N, U, U]);
        assert_eq!(drag.over(), Some(9));
    }

    #[test]
    fn test_external_drag_into_trailing_whitespace_clears_last_row() {
        let mut list = slots(4);
        let mut drag = DragState::external(list.len());

        drag.update(&mut list, 9, false);
        assert_eq!(offsets(&list), vec![N; 4]);

        let mut list = slots(4);
        let mut drag = DragState::external(list.len());
        drag.update(&mut list, 1, false);
        assert_eq!(offsets(&list), vec![N, D, D, D]);
        drag.update(&mut list, 9, false);
        assert_eq!(offsets(&list), vec![N; 4]);
        assert_eq!(drag.reorder_destination(9, list.len()), 4);
    }

    #[test]
    fn test_external_drag_shifts_down_from_target() {
        let mut list = slots(4);
        let mut drag = DragState::external(list.len());

        drag.update(&mut list, 2, false);
        assert_eq!(offsets(&list), vec![N, N, D, D]);
        drag.update(&mut list, 3, false);
        assert_eq!(offsets(&list), vec![N, N, N, D]);
    }

    #[test]
    fn test_repeated_update_is_a_no_op() {
        let mut list = slots(6);
        let mut drag = DragState::internal(2, "12");

        assert!(drag.update(&mut list, 4, false));
        assert!(!drag.update(&mut list, 4, false));
        assert!(drag.update(&mut list, 4, true));
        assert_eq!(offsets(&list), vec![N, N, N, U, U, N]);
    }

    #[test]
    fn test_folder_drop_dead_zone_dragging_down() {
        let drag = DragState::internal(0, "10");
        let folder = BookmarkNode::folder("12", Some("1".into()), "F");

        // Row 2 spans 40..60. Entering from above, the top 30% is a reorder.
        assert!(!drag.is_folder_drop(&folder, &DragOver::new(2, 45.0, 40.0, 20.0)));
        assert!(drag.is_folder_drop(&folder, &DragOver::new(2, 47.0, 40.0, 20.0)));
        assert!(drag.is_folder_drop(&folder, &DragOver::new(2, 59.0, 40.0, 20.0)));
    }

    #[test]
    fn test_folder_drop_dead_zone_dragging_up() {
        let drag = DragState::internal(5, "15");
        let folder = BookmarkNode::folder("12", Some("1".into()), "F");

        // Entering from below, the bottom 30% is a reorder.
        assert!(drag.is_folder_drop(&folder, &DragOver::new(2, 41.0, 40.0, 20.0)));
        assert!(!drag.is_folder_drop(&folder, &DragOver::new(2, 55.0, 40.0, 20.0)));
    }

    #[test]
    fn test_folder_drop_guards() {
        let folder = BookmarkNode::folder("12", Some("1".into()), "F");
        let page = BookmarkNode::page("13", Some("1".into()), "P", "https://x.example");
        let middle = DragOver::middle_of(2, 20.0);

        assert!(!DragState::internal(0, "10").is_folder_drop(&page, &middle));
        assert!(!DragState::internal(2, "12").is_folder_drop(&folder, &middle));
        assert!(!DragState::internal(0, "1").is_folder_drop(&folder, &middle));
        assert!(DragState::external(6).is_folder_drop(&folder, &middle));
    }

    #[test]
    fn test_system_folder_is_always_a_folder_drop() {
        let drag = DragState::external(3);
        let bar = BookmarkNode::folder("1", Some("0".into()), "Bookmarks bar");

        // Even in the dead zone.
        assert!(drag.is_folder_drop(&bar, &DragOver::new(0, 19.0, 0.0, 20.0)));
    }

    #[test]
    fn test_reorder_destination() {
        let drag = DragState::internal(2, "12");
        assert_eq!(drag.reorder_destination(4, 6), 5);
        assert_eq!(drag.reorder_destination(0, 6), 0);
        assert_eq!(drag.reorder_destination(2, 6), 2);
        assert_eq!(drag.reorder_destination(8, 6), 6);
    }
}
