//! Read-only view of a session for renderers.

use crate::config::GameConfig;
use crate::entities::{EntityId, EntityKind, GameSession, GameStatus, Rect, Role, Size, Vec2};

/// Back-to-front draw order for world sprites.
const DRAW_ORDER: [EntityKind; 5] = [
    EntityKind::ForestBackground,
    EntityKind::WoodBackground,
    EntityKind::Road,
    EntityKind::Pine,
    EntityKind::Poison,
];

#[derive(Clone, Debug, PartialEq)]
pub struct SpriteView {
    pub id: Option<EntityId>,
    pub kind: EntityKind,
    /// World coordinates; subtract `Snapshot::camera_x` for screen space.
    pub rect: Rect,
    pub texture_offset: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextView {
    pub kind: EntityKind,
    /// Screen coordinates.
    pub pos: Vec2,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub status: GameStatus,
    pub camera_x: f32,
    pub view: Size,
    pub ground_y: f32,
    /// Player last.
    pub sprites: Vec<SpriteView>,
    pub texts: Vec<TextView>,
    pub score: u64,
    pub high_score: Option<u64>,
}

pub fn snapshot(state: &GameSession, cfg: &GameConfig) -> Snapshot {
    let mut sprites: Vec<SpriteView> = DRAW_ORDER
        .iter()
        .flat_map(|&kind| state.store.query(kind).iter())
        .filter(|e| e.visible)
        .map(|e| SpriteView {
            id: Some(e.id),
            kind: e.kind,
            rect: e.rect(),
            texture_offset: e.texture_offset,
        })
        .collect();
    sprites.push(SpriteView {
        id: None,
        kind: EntityKind::Player,
        rect: state.player.rect(),
        texture_offset: 0.0,
    });

    let texts = state
        .store
        .query_role(Role::Text)
        .into_iter()
        .filter(|e| e.visible)
        .filter_map(|e| {
            e.text.as_ref().map(|text| TextView {
                kind: e.kind,
                pos: e.pos,
                text: text.clone(),
            })
        })
        .collect();

    Snapshot {
        status: state.status,
        camera_x: state.camera_x,
        view: Size::new(cfg.world.view_width, cfg.world.view_height),
        ground_y: cfg.world.ground_y,
        sprites,
        texts,
        score: state.score,
        high_score: state.high_score,
    }
}
