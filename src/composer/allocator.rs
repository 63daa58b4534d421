use std::collections::HashMap;

use super::StateId;

/// Hands out fresh state ids above a floor. Asking twice for the same source id
/// returns the same fresh id, so remapping one graph through one allocator keeps
/// its topology while moving it into an id range no other allocator has used.
pub struct StateAllocator {
    next: StateId,
    assigned: HashMap<StateId, StateId>,
}

impl StateAllocator {
    pub fn new(floor: StateId) -> Self {
        StateAllocator {
            next: floor,
            assigned: HashMap::new(),
        }
    }

    pub fn get(&mut self, source: StateId) -> StateId {
        if let Some(id) = self.assigned.get(&source) {
            return *id;
        }
        let id = self.fresh();
        self.assigned.insert(source, id);
        id
    }

    // Not tied to any source id, never returned by `get`.
    pub fn fresh(&mut self) -> StateId {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn next_free(&self) -> StateId {
        self.next
    }
}
