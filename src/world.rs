//! Entity store: a typed registry of live scene objects keyed by kind.
//!
//! Systems never hold on to entities between calls. They ask the store for
//! a fresh view (`query`, `query_role`, `rects`) each tick and act on ids.

use std::collections::BTreeMap;

use crate::entities::{Entity, EntityId, EntityKind, Rect, Role, Size, Vec2};

#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    next_id: u64,
    by_kind: BTreeMap<EntityKind, Vec<Entity>>,
}

impl EntityStore {
    pub fn new() -> Self {
        EntityStore::default()
    }

    /// Create an entity with unit scale and return it for further setup.
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2, base_size: Size) -> &mut Entity {
        self.next_id += 1;
        let entity = Entity {
            id: EntityId(self.next_id),
            kind,
            pos,
            base_size,
            scale: 1.0,
            lane: None,
            velocity: None,
            text: None,
            visible: true,
            texture_offset: 0.0,
        };
        let list = self.by_kind.entry(kind).or_default();
        list.push(entity);
        let last = list.len() - 1;
        &mut list[last]
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.by_kind.values().flatten().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.by_kind.values_mut().flatten().find(|e| e.id == id)
    }

    pub fn query(&self, kind: EntityKind) -> &[Entity] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn query_mut(&mut self, kind: EntityKind) -> &mut [Entity] {
        self.by_kind.entry(kind).or_default().as_mut_slice()
    }

    pub fn query_role(&self, role: Role) -> Vec<&Entity> {
        self.by_kind
            .iter()
            .filter(|(kind, _)| kind.role() == role)
            .flat_map(|(_, list)| list.iter())
            .collect()
    }

    pub fn first(&self, kind: EntityKind) -> Option<&Entity> {
        self.query(kind).first()
    }

    pub fn first_mut(&mut self, kind: EntityKind) -> Option<&mut Entity> {
        self.by_kind.get_mut(&kind).and_then(|list| list.first_mut())
    }

    /// Hit boxes of every entity of `kind`, paired with their ids.
    pub fn rects(&self, kind: EntityKind) -> Vec<(EntityId, Rect)> {
        self.query(kind).iter().map(|e| (e.id, e.rect())).collect()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.query(kind).len()
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.by_kind.values().flatten()
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        for list in self.by_kind.values_mut() {
            if let Some(idx) = list.iter().position(|e| e.id == id) {
                return Some(list.remove(idx));
            }
        }
        None
    }

    /// Keep only the entities of `kind` matching `keep`; returns how many
    /// were dropped.
    pub fn retain<F>(&mut self, kind: EntityKind, mut keep: F) -> usize
    where
        F: FnMut(&Entity) -> bool,
    {
        let Some(list) = self.by_kind.get_mut(&kind) else {
            return 0;
        };
        let before = list.len();
        list.retain(|e| keep(e));
        before - list.len()
    }

    pub fn clear_kind(&mut self, kind: EntityKind) -> usize {
        self.by_kind.remove(&kind).map(|list| list.len()).unwrap_or(0)
    }
}
