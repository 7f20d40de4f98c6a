// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Capability tables: the Method symbols each entity kind understands.
//!
//! A call is looked up in the kind's own table first, then in the table every
//! entity shares. A known method with unreadable arguments does nothing.
use strata_core::args::{self, Depth};
use strata_core::math::Quat;
use strata_core::{EntityId, MethodCall};
use strata_geom::{place, AxisMode, SurfaceDirection};
use tracing::{debug, warn};

use crate::scene::{EntityKind, Scene};

type Handler = fn(&mut Scene, EntityId, &MethodCall<'_>);

/// A named method and the code that runs it.
#[derive(Debug, Clone, Copy)]
pub struct Capability {
    /// Method name as written in the grammar.
    pub name: &'static str,
    handler: Handler,
}

/// Methods every entity understands.
pub const SHARED_METHODS: &[Capability] = &[
    Capability {
        name: "SetPos",
        handler: set_pos,
    },
    Capability {
        name: "SetRot",
        handler: set_rot,
    },
    Capability {
        name: "SetParent",
        handler: set_parent,
    },
    Capability {
        name: "Move",
        handler: move_local,
    },
];

/// Methods only tiles understand.
pub const TILE_METHODS: &[Capability] = &[Capability {
    name: "Place",
    handler: place_tile,
}];

/// Lookup order for `kind`.
pub fn capabilities(kind: &EntityKind) -> impl Iterator<Item = &'static Capability> {
    let own: &'static [Capability] = match kind {
        EntityKind::Tile(_) => TILE_METHODS,
        _ => &[],
    };
    own.iter().chain(SHARED_METHODS)
}

/// Runs `call` on `entity`; `false` when the entity lacks the method.
pub(crate) fn dispatch(scene: &mut Scene, entity: EntityId, call: &MethodCall<'_>) -> bool {
    let Some(kind) = scene.get(entity).map(|e| e.kind()) else {
        return false;
    };
    let Some(capability) = capabilities(kind).find(|c| c.name == call.name) else {
        return false;
    };
    debug!(%entity, method = call.name, args = call.args, "method");
    (capability.handler)(scene, entity, call);
    true
}

/// `SetPos(x,y,z)`: world position.
fn set_pos(scene: &mut Scene, entity: EntityId, call: &MethodCall<'_>) {
    let (Some(position), Some(world)) = (args::vec3(call.args), scene.world_transform(entity)) else {
        return;
    };
    scene.set_world_transform(entity, world.with_translation(position));
}

/// `SetRot(x,y,z)`: Euler degrees applied in world space on top of the
/// current orientation.
fn set_rot(scene: &mut Scene, entity: EntityId, call: &MethodCall<'_>) {
    let (Some(euler), Some(world)) = (args::vec3(call.args), scene.world_transform(entity)) else {
        return;
    };
    let rotation = Quat::from_euler_degrees(euler).multiply(&world.rotation()).normalize();
    scene.set_world_transform(entity, world.with_rotation(rotation));
}

/// `Move(x,y,z)`: offset in parent space.
fn move_local(scene: &mut Scene, entity: EntityId, call: &MethodCall<'_>) {
    let (Some(offset), Some(local)) = (args::vec3(call.args), scene.get(entity).map(|e| e.local())) else {
        return;
    };
    scene.set_local_transform(entity, local.with_translation(local.translation().add(&offset)));
}

/// Entity `depth` producers up the lineage; `None` when that producer has no
/// entity or the walk goes nowhere.
fn ancestor(lineage: &[Option<EntityId>], depth: Depth) -> Option<EntityId> {
    let index = match depth {
        Depth::Root => lineage.len().checked_sub(1)?,
        Depth::Levels(levels) => levels.min(lineage.len()).checked_sub(1)?,
    };
    lineage.get(index).copied().flatten()
}

/// `SetParent(keepWorld[,depth|root])`.
fn set_parent(scene: &mut Scene, entity: EntityId, call: &MethodCall<'_>) {
    let parts = args::split(call.args);
    let Some(keep) = parts.first().map(|p| args::flag(p)) else {
        return;
    };
    let depth = match parts.get(1) {
        None => Depth::Levels(1),
        Some(raw) => match args::depth(raw) {
            Some(depth) => depth,
            None => return,
        },
    };
    let Some(parent) = ancestor(call.lineage, depth) else {
        return;
    };
    if !scene.set_parent(entity, parent, keep) {
        warn!(%entity, %parent, "reparent refused");
    }
}

/// `Place(anchorFace,thisFace)`: joins this tile to the tile of the symbol
/// that produced the method. Vertical joins (or a `Y` anywhere in the arguments)
/// use the stacking rotation rule.
fn place_tile(scene: &mut Scene, entity: EntityId, call: &MethodCall<'_>) {
    let parts = args::split(call.args);
    let (Some(anchor_face), Some(moving_face)) = (
        parts.first().and_then(|p| p.parse::<SurfaceDirection>().ok()),
        parts.get(1).and_then(|p| p.parse::<SurfaceDirection>().ok()),
    ) else {
        return;
    };
    let Some(anchor) = call.producer else {
        return;
    };
    let (Some(EntityKind::Tile(anchor_shape)), Some(EntityKind::Tile(moving_shape))) = (
        scene.get(anchor).map(|e| e.kind().clone()),
        scene.get(entity).map(|e| e.kind().clone()),
    ) else {
        return;
    };
    let (Some(anchor_world), Some(moving_world)) = (scene.world_transform(anchor), scene.world_transform(entity))
    else {
        return;
    };
    let mode = if call.args.contains('Y') || anchor_face.is_vertical() {
        AxisMode::Y
    } else {
        AxisMode::Xz
    };
    match place(
        &anchor_shape,
        &anchor_world,
        anchor_face,
        &moving_shape,
        &moving_world,
        moving_face,
        mode,
    ) {
        Ok(world) => scene.set_world_transform(entity, world),
        Err(err) => warn!(%entity, %anchor, %err, "placement refused"),
    }
}
