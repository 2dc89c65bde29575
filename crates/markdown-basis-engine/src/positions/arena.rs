//! Slot storage backing live [`Position`](super::Position) handles.
//!
//! Each handle owns one slot, addressed by a generation-checked key. A slot is
//! freed when its handle drops, so the arena only ever holds positions that
//! somebody still references.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotKey {
    slot: usize,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotState {
    pub(crate) index: usize,
    pub(crate) valid: bool,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    state: Option<SlotState>,
}

#[derive(Debug, Default)]
pub(crate) struct PositionArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
}

impl PositionArena {
    pub(crate) fn register(&mut self, state: SlotState) -> SlotKey {
        self.live += 1;
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot];
            entry.state = Some(state);
            return SlotKey {
                slot,
                generation: entry.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            state: Some(state),
        });
        SlotKey {
            slot: self.slots.len() - 1,
            generation: 0,
        }
    }

    pub(crate) fn release(&mut self, key: SlotKey) {
        let Some(entry) = self.slots.get_mut(key.slot) else {
            return;
        };
        if entry.generation != key.generation || entry.state.is_none() {
            return;
        }
        entry.state = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(key.slot);
        self.live -= 1;
    }

    pub(crate) fn get(&self, key: SlotKey) -> Option<SlotState> {
        self.slots
            .get(key.slot)
            .filter(|entry| entry.generation == key.generation)
            .and_then(|entry| entry.state)
    }

    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Shifts every position at or after `at` right by `count`.
    pub(crate) fn inserted(&mut self, at: usize, count: usize) -> usize {
        let mut shifted = 0;
        for state in self.states_mut() {
            if state.index >= at {
                state.index += count;
                shifted += 1;
            }
        }
        shifted
    }

    /// Invalidates positions in `[start, start + count)`, pinning them to
    /// `start`, and shifts later ones left by `count`.
    pub(crate) fn removed(&mut self, start: usize, count: usize) -> usize {
        let end = start + count;
        let mut touched = 0;
        for state in self.states_mut() {
            if state.index >= end {
                state.index -= count;
                touched += 1;
            } else if state.index >= start {
                state.index = start;
                state.valid = false;
                touched += 1;
            }
        }
        touched
    }

    /// Drops every occupied slot. Outstanding keys go stale, so their handles
    /// read as invalid at 0 and no later renumbering reaches them.
    pub(crate) fn detach_all(&mut self) -> usize {
        let mut detached = 0;
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            if entry.state.take().is_some() {
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(slot);
                detached += 1;
            }
        }
        self.live -= detached;
        detached
    }

    fn states_mut(&mut self) -> impl Iterator<Item = &mut SlotState> {
        self.slots.iter_mut().filter_map(|entry| entry.state.as_mut())
    }
}
