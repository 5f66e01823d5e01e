//! Slot+generation handle table.
//!
//! A handle packs a slot index (upper 32 bits) and a generation (lower 32
//! bits). Removing a value bumps the slot's generation, so every handle that
//! pointed at it goes stale. Generations start at 1: the all-zero handle is
//! never valid, which catches zero-initialised handle variables on the C
//! side.

fn encode(slot: u32, generation: u32) -> u64 {
    (u64::from(slot) << 32) | u64::from(generation)
}

fn decode(handle: u64) -> (usize, u32) {
    ((handle >> 32) as usize, handle as u32)
}

enum Entry<T> {
    Occupied {
        generation: u32,
        value: T,
    },
    /// A free slot. `next_free` links the intrusive free list.
    Vacant {
        generation: u32,
        next_free: Option<u32>,
    },
}

/// Table mapping `u64` handles to owned values.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> HandleTable<T> {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Number of live values.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Store `value` and return its handle.
    pub(crate) fn insert(&mut self, value: T) -> u64 {
        self.len += 1;
        if let Some(slot) = self.free_head {
            let entry = &mut self.entries[slot as usize];
            if let Entry::Vacant {
                generation,
                next_free,
            } = *entry
            {
                self.free_head = next_free;
                *entry = Entry::Occupied { generation, value };
                return encode(slot, generation);
            }
        }
        let slot = self.entries.len() as u32;
        self.entries.push(Entry::Occupied {
            generation: 1,
            value,
        });
        encode(slot, 1)
    }

    pub(crate) fn get(&self, handle: u64) -> Option<&T> {
        let (slot, expected) = decode(handle);
        match self.entries.get(slot)? {
            Entry::Occupied { generation, value } if *generation == expected => Some(value),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, handle: u64) -> Option<&mut T> {
        let (slot, expected) = decode(handle);
        match self.entries.get_mut(slot)? {
            Entry::Occupied { generation, value } if *generation == expected => Some(value),
            _ => None,
        }
    }

    /// Remove and return the value behind `handle`.
    ///
    /// A slot whose generation would wrap is retired instead of recycled, so
    /// a stale handle can never come back to life.
    pub(crate) fn remove(&mut self, handle: u64) -> Option<T> {
        let (slot, expected) = decode(handle);
        let entry = self.entries.get_mut(slot)?;
        match &*entry {
            Entry::Occupied { generation, .. } if *generation == expected => {}
            _ => return None,
        }
        let next_generation = expected.wrapping_add(1);
        let retired = next_generation == 0;
        let vacant = Entry::Vacant {
            generation: next_generation,
            next_free: if retired { None } else { self.free_head },
        };
        let Entry::Occupied { value, .. } = std::mem::replace(entry, vacant) else {
            return None;
        };
        if !retired {
            self.free_head = Some(slot as u32);
        }
        self.len -= 1;
        Some(value)
    }
}
