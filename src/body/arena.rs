use super::Body;

/// Lightweight, copyable reference to a body slot.
///
/// A handle stays valid only while its slot still holds the body it was issued
/// for; removing the body (or clearing the arena) bumps the slot generation and
/// every older handle stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Externally-owned, ordered body collection with generation-checked handles.
#[derive(Debug, Clone, Default)]
pub struct BodyArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl BodyArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: Body) -> BodyHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            return BodyHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            body: Some(body),
        });
        BodyHandle {
            index,
            generation: 0,
        }
    }

    pub fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(body)
    }

    /// Drops every body. All handles issued so far become stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.body.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        // Reuse low indices first.
        self.free.reverse();
        self.len = 0;
    }

    /// Whether `handle` still refers to a live body this frame.
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_ref()
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body.as_ref().map(|body| {
                (
                    BodyHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    body,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut Body)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                let generation = slot.generation;
                slot.body.as_mut().map(|body| {
                    (
                        BodyHandle {
                            index: index as u32,
                            generation,
                        },
                        body,
                    )
                })
            })
    }

    pub fn find_by_name(&self, name: &str) -> Option<BodyHandle> {
        self.iter()
            .find(|(_, body)| body.name == name)
            .map(|(handle, _)| handle)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_glm as glm;

    fn body(name: &str) -> Body {
        Body::new(name, glm::vec3(0.0, 0.0, 0.0), 1.0)
    }

    #[test]
    fn removed_handle_goes_stale_and_slot_is_reused() {
        let mut arena = BodyArena::new();
        let a = arena.insert(body("a"));
        let b = arena.insert(body("b"));
        assert_eq!(arena.len(), 2);

        assert_eq!(arena.remove(a).map(|b| b.name), Some("a".to_string()));
        assert!(!arena.contains(a));
        assert!(arena.contains(b));

        let c = arena.insert(body("c"));
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(c).map(|b| b.name.as_str()), Some("c"));
    }

    #[test]
    fn double_remove_is_harmless() {
        let mut arena = BodyArena::new();
        let a = arena.insert(body("a"));
        assert!(arena.remove(a).is_some());
        assert!(arena.remove(a).is_none());
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn clear_invalidates_everything() {
        let mut arena = BodyArena::new();
        let handles: Vec<_> = ["a", "b", "c"].iter().map(|n| arena.insert(body(n))).collect();
        arena.clear();
        assert!(arena.is_empty());
        assert!(handles.iter().all(|h| !arena.contains(*h)));

        let fresh = arena.insert(body("d"));
        assert_eq!(fresh.index(), 0);
        assert_eq!(arena.iter().count(), 1);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut arena = BodyArena::new();
        for name in ["sun", "earth", "moon"] {
            arena.insert(body(name));
        }
        let names: Vec<_> = arena.iter().map(|(_, b)| b.name.clone()).collect();
        assert_eq!(names, ["sun", "earth", "moon"]);
        assert!(arena.find_by_name("moon").is_some());
        assert!(arena.find_by_name("pluto").is_none());
    }
}
