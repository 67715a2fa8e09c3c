use serde::Serialize;

use crate::item::ItemSignature;

/// One item placed at one logical slot of a screen.
///
/// Assignments are replaced, never edited. Two assignments are equal when both
/// the item and the index are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SlotAssignment {
    item: ItemSignature,
    index: usize,
}

impl SlotAssignment {
    pub fn new(index: usize, item: ItemSignature) -> Self {
        Self { item, index }
    }

    pub fn item(&self) -> &ItemSignature {
        &self.item
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn into_parts(self) -> (usize, ItemSignature) {
        (self.index, self.item)
    }

    /// Cheap comparison used by the router without building a temporary value.
    pub fn is(&self, index: usize, item: &ItemSignature) -> bool {
        self.index == index && &self.item == item
    }
}

/// Slot counts accepted for a screen: positive multiples of 9, or the compact 5.
pub fn is_valid_slot_count(slot_count: usize) -> bool {
    slot_count == 5 || (slot_count > 0 && slot_count % 9 == 0)
}
