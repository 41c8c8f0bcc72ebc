//! Hit-box tests between the player and everything it can touch.

use crate::entities::{EntityId, EntityKind, Rect};
use crate::world::EntityStore;

/// Inclusive AABB overlap: boxes that share an edge are touching.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x <= b.right() && b.x <= a.right() && a.y <= b.bottom() && b.y <= a.bottom()
}

/// Ids of every entity of `kind` whose box touches `body`.
pub fn touching(body: &Rect, store: &EntityStore, kind: EntityKind) -> Vec<EntityId> {
    store
        .query(kind)
        .iter()
        .filter(|e| overlaps(body, &e.rect()))
        .map(|e| e.id)
        .collect()
}

/// Remove every reward the player touches. All of them are collected in
/// the same tick; returns how many.
pub fn collect_rewards(body: &Rect, store: &mut EntityStore) -> usize {
    let hits = touching(body, store, EntityKind::Pine);
    for id in &hits {
        store.remove(*id);
    }
    hits.len()
}

/// First hazard the player touches, if any.
pub fn first_hazard_hit(body: &Rect, store: &EntityStore) -> Option<EntityId> {
    store
        .query(EntityKind::Poison)
        .iter()
        .find(|e| overlaps(body, &e.rect()))
        .map(|e| e.id)
}
