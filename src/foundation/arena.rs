use std::marker::PhantomData;

use crate::foundation::ids::SlotKey;

/// Slot arena with a free list. Removed slots are recycled by later inserts.
#[derive(Debug, Clone)]
pub(crate) struct Arena<K, T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
    _key: PhantomData<K>,
}

impl<K: SlotKey, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _key: PhantomData,
        }
    }
}

impl<K: SlotKey, T> Arena<K, T> {
    pub(crate) fn insert(&mut self, value: T) -> K {
        self.len += 1;
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(value);
            return K::from_slot(slot);
        }
        self.slots.push(Some(value));
        K::from_slot(self.slots.len() - 1)
    }

    pub(crate) fn remove(&mut self, key: K) -> Option<T> {
        let value = self.slots.get_mut(key.slot())?.take()?;
        self.free.push(key.slot());
        self.len -= 1;
        Some(value)
    }

    pub(crate) fn get(&self, key: K) -> Option<&T> {
        self.slots.get(key.slot())?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots.get_mut(key.slot())?.as_mut()
    }

    pub(crate) fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, v)| v.as_ref().map(|v| (K::from_slot(slot), v)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/arena.rs"]
mod tests;
