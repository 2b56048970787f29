use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// Generated solids kept for STEP export. Holds at most `capacity` entries;
/// inserting past that evicts the oldest.
#[derive(Debug)]
pub struct DieStore<S> {
    capacity: usize,
    solids: HashMap<Uuid, S>,
    order: VecDeque<Uuid>,
}

impl<S> DieStore<S> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            solids: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Stores `solid` under `id` and returns the ids evicted to make room.
    pub fn insert(&mut self, id: Uuid, solid: S) -> Vec<Uuid> {
        if self.solids.insert(id, solid).is_none() {
            self.order.push_back(id);
        }
        let mut evicted = Vec::new();
        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.solids.remove(&old);
                evicted.push(old);
            }
        }
        evicted
    }

    pub fn get(&self, id: &Uuid) -> Option<&S> {
        self.solids.get(id)
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<S> {
        let solid = self.solids.remove(id)?;
        self.order.retain(|kept| kept != id);
        Some(solid)
    }

    pub fn len(&self) -> usize {
        self.solids.len()
    }
}
