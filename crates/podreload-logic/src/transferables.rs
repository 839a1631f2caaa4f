//! Transfer requests merged per resource kind.
//!
//! The reload dialog works on *transferables*: one logical request per
//! distinct resource kind, aggregating every source stack of that kind on
//! the map. A pawn is a single-stack transferable of count 1; an item kind
//! merges all of its stacks so the player adjusts one number and the
//! loaders pull from whichever stacks are closest.

use serde::{Deserialize, Serialize};

/// Identity of a resource kind (thing definition in the host game).
pub type KindId = u32;

/// Identity of a concrete thing on the map (a pawn or one item stack).
pub type ThingId = u64;

/// Whether a transferable moves people or cargo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Pawn,
    Item,
}

/// One source stack backing a transferable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub thing: ThingId,
    pub count: u32,
}

/// A logical request to move some quantity of one resource kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transferable {
    pub kind: KindId,
    pub label: String,
    pub category: Category,
    /// Source stacks, in discovery order. Pawns always have exactly one
    /// stack of count 1.
    pub stacks: Vec<Stack>,
    /// How many of this kind the player wants loaded.
    pub count_to_transfer: u32,
}

impl Transferable {
    /// Total quantity available across all source stacks.
    pub fn max_to_transfer(&self) -> u32 {
        self.stacks.iter().map(|s| s.count).sum()
    }

    /// Set the selected count, clamped to what is actually available.
    pub fn adjust_to(&mut self, count: u32) {
        self.count_to_transfer = count.min(self.max_to_transfer());
    }
}

/// Ordered collection of transferables with at most one entry per kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferableSet {
    entries: Vec<Transferable>,
}

impl TransferableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a stack into the entry for its kind, creating an unselected
    /// entry if this is the first stack of that kind.
    pub fn add_stack(&mut self, kind: KindId, label: &str, category: Category, stack: Stack) {
        match self.entries.iter_mut().find(|t| t.kind == kind) {
            Some(t) => t.stacks.push(stack),
            None => self.entries.push(Transferable {
                kind,
                label: label.to_string(),
                category,
                stacks: vec![stack],
                count_to_transfer: 0,
            }),
        }
    }

    /// Merge a stack and mark its full quantity as selected. Used for
    /// pawns already aboard a pod or queued on a pending load list, which
    /// start the dialog pre-selected.
    pub fn add_stack_selected(
        &mut self,
        kind: KindId,
        label: &str,
        category: Category,
        stack: Stack,
    ) {
        self.add_stack(kind, label, category, stack);
        if let Some(t) = self.entries.iter_mut().find(|t| t.kind == kind) {
            t.adjust_to(t.count_to_transfer + stack.count);
        }
    }

    pub fn get(&self, kind: KindId) -> Option<&Transferable> {
        self.entries.iter().find(|t| t.kind == kind)
    }

    /// Set the selected count for one kind. Returns false if the kind is
    /// not present.
    pub fn adjust(&mut self, kind: KindId, count: u32) -> bool {
        match self.entries.iter_mut().find(|t| t.kind == kind) {
            Some(t) => {
                t.adjust_to(count);
                true
            }
            None => false,
        }
    }

    /// Select the full available quantity of every entry.
    pub fn select_everything(&mut self) {
        for t in &mut self.entries {
            t.adjust_to(t.max_to_transfer());
        }
    }

    pub fn entries(&self) -> &[Transferable] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transferable> {
        self.entries.iter()
    }

    pub fn pawns(&self) -> impl Iterator<Item = &Transferable> {
        self.entries.iter().filter(|t| t.category == Category::Pawn)
    }

    pub fn items(&self) -> impl Iterator<Item = &Transferable> {
        self.entries.iter().filter(|t| t.category == Category::Item)
    }

    /// True if any entry has a nonzero selected count.
    pub fn any_selected(&self) -> bool {
        self.entries.iter().any(|t| t.count_to_transfer != 0)
    }

    /// Sum of all selected counts.
    pub fn total_selected(&self) -> u64 {
        self.entries.iter().map(|t| t.count_to_transfer as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(thing: ThingId, count: u32) -> Stack {
        Stack { thing, count }
    }

    #[test]
    fn stacks_of_same_kind_merge() {
        let mut set = TransferableSet::new();
        set.add_stack(7, "Steel", Category::Item, stack(1, 40));
        set.add_stack(7, "Steel", Category::Item, stack(2, 35));
        assert_eq!(set.len(), 1, "same kind should merge into one entry");
        let t = set.get(7).unwrap();
        assert_eq!(t.max_to_transfer(), 75);
        assert_eq!(t.count_to_transfer, 0, "merged stacks start unselected");
    }

    #[test]
    fn distinct_kinds_stay_separate() {
        let mut set = TransferableSet::new();
        set.add_stack(7, "Steel", Category::Item, stack(1, 40));
        set.add_stack(8, "Wood", Category::Item, stack(2, 20));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn adjust_clamps_to_available() {
        let mut set = TransferableSet::new();
        set.add_stack(7, "Steel", Category::Item, stack(1, 40));
        assert!(set.adjust(7, 1000));
        assert_eq!(set.get(7).unwrap().count_to_transfer, 40);
        assert!(!set.adjust(99, 5), "unknown kind is not adjustable");
    }

    #[test]
    fn preselected_stack_raises_count() {
        let mut set = TransferableSet::new();
        set.add_stack_selected(3, "Colonist", Category::Pawn, stack(10, 1));
        assert_eq!(set.get(3).unwrap().count_to_transfer, 1);
        // A second aboard pawn of the same kind adds to the selection.
        set.add_stack_selected(3, "Colonist", Category::Pawn, stack(11, 1));
        assert_eq!(set.get(3).unwrap().count_to_transfer, 2);
    }

    #[test]
    fn select_everything_maxes_all_entries() {
        let mut set = TransferableSet::new();
        set.add_stack(7, "Steel", Category::Item, stack(1, 40));
        set.add_stack(8, "Wood", Category::Item, stack(2, 20));
        set.select_everything();
        assert_eq!(set.total_selected(), 60);
        assert!(set.any_selected());
    }
}
