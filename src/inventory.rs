//! Player inventory: a small stash plus a hand slot.

use crate::components::ItemSpec;

/// Inventory component carried by the player. Items in the stash are inert;
/// only the hand item is used for melee.
#[derive(Debug, Clone)]
pub struct Inventory {
    stash: Vec<ItemSpec>,
    capacity: usize,
    pub hand: Option<ItemSpec>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            stash: Vec::with_capacity(capacity),
            capacity,
            hand: None,
        }
    }

    /// Stash an item. Returns false when the stash is full.
    pub fn put_item(&mut self, item: ItemSpec) -> bool {
        if self.stash.len() < self.capacity {
            self.stash.push(item);
            true
        } else {
            false
        }
    }

    /// Take the item out of a stash slot. An out-of-range or empty slot
    /// yields `None`.
    pub fn take_item(&mut self, slot: usize) -> Option<ItemSpec> {
        if slot < self.stash.len() {
            Some(self.stash.remove(slot))
        } else {
            None
        }
    }

    /// Swap a stash item into the hand, returning any previously held item
    /// to the stash. An empty slot is a no-op and returns false. Taking the
    /// slot first frees room, so the swap-back cannot fail; if it does, the
    /// inventory is corrupt and the turn aborts.
    pub fn swap_into_hand(&mut self, slot: usize) -> bool {
        let Some(item) = self.take_item(slot) else {
            return false;
        };
        if let Some(held) = self.hand.take() {
            let returned = self.put_item(held);
            assert!(returned, "hand swap-back found the stash full");
        }
        self.hand = Some(item);
        true
    }

    pub fn stash(&self) -> &[ItemSpec] {
        &self.stash
    }

    pub fn is_full(&self) -> bool {
        self.stash.len() == self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stick(damage: i32) -> ItemSpec {
        ItemSpec { damage, radius: 2 }
    }

    #[test]
    fn test_put_respects_capacity() {
        let mut inv = Inventory::new(2);
        assert!(inv.put_item(stick(1)));
        assert!(inv.put_item(stick(2)));
        assert!(!inv.put_item(stick(3)));
        assert!(inv.is_full());
        assert_eq!(inv.stash().len(), 2);
    }

    #[test]
    fn test_take_from_empty_slot_is_none() {
        let mut inv = Inventory::new(2);
        assert_eq!(inv.take_item(0), None);
        inv.put_item(stick(1));
        assert_eq!(inv.take_item(5), None);
        assert_eq!(inv.take_item(0), Some(stick(1)));
        assert!(inv.stash().is_empty());
    }

    #[test]
    fn test_swap_returns_held_item_to_stash() {
        let mut inv = Inventory::new(2);
        inv.put_item(stick(1));
        inv.put_item(stick(2));

        assert!(inv.swap_into_hand(0));
        assert_eq!(inv.hand, Some(stick(1)));
        assert_eq!(inv.stash(), &[stick(2)]);

        // Swapping again returns the old hand to the stash.
        assert!(inv.swap_into_hand(0));
        assert_eq!(inv.hand, Some(stick(2)));
        assert_eq!(inv.stash(), &[stick(1)]);
    }

    #[test]
    fn test_swap_from_empty_slot_is_a_noop() {
        let mut inv = Inventory::new(2);
        inv.put_item(stick(1));
        inv.swap_into_hand(0);
        assert!(!inv.swap_into_hand(0));
        assert_eq!(inv.hand, Some(stick(1)));
    }

    #[test]
    fn test_swap_works_when_stash_is_full() {
        // A full stash still swaps: taking the slot frees the space the
        // held item goes back into.
        let mut inv = Inventory::new(2);
        inv.put_item(stick(1));
        inv.swap_into_hand(0);
        inv.put_item(stick(2));
        inv.put_item(stick(3));
        assert!(inv.is_full());

        assert!(inv.swap_into_hand(1));
        assert_eq!(inv.hand, Some(stick(3)));
        assert_eq!(inv.stash(), &[stick(2), stick(1)]);
    }
}
