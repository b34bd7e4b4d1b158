//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Test utilities for ECS testing

use crate::ecs::capabilities::StaticLevel;
use crate::ecs::components::{Name, Player, Transform};
use crate::ecs::creature_builder::CreatureBuilder;
use crate::ecs::{EcsEntity, EntityRegistry, GameWorld, PlayerRoster};
use glam::Vec3;
use minimotes_common::{NetworkId, PlayerId};

/// Create a test world
pub fn create_test_world() -> GameWorld {
    GameWorld::new()
}

/// Spawn a creature with default tuning at the origin
pub fn spawn_test_creature(world: &mut GameWorld, registry: &mut EntityRegistry) -> (EcsEntity, NetworkId) {
    let builder = CreatureBuilder::new("Test Mote");
    let id = builder.id;
    let entity = builder
        .spawn(world, registry, &StaticLevel::default())
        .expect("test creature spawns");
    (entity, id)
}

/// Spawn a player avatar and add it to the roster
pub fn spawn_test_player(world: &mut GameWorld, roster: &mut PlayerRoster, id: PlayerId) -> EcsEntity {
    let entity = world.spawn((
        Player::new(id),
        Name::new(format!("Test {}", id)),
        Transform::new(Vec3::new(5.0, 0.0, 5.0)),
    ));
    roster.join(id, entity).expect("test player joins");
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::CreatureBrain;

    #[test]
    fn test_create_world() {
        let world = create_test_world();
        assert!(world.is_empty());
    }

    #[test]
    fn test_spawn_creature() {
        let mut world = create_test_world();
        let mut registry = EntityRegistry::new();
        let (entity, id) = spawn_test_creature(&mut world, &mut registry);

        assert!(world.get::<&CreatureBrain>(entity).is_ok());
        assert!(world.get::<&Name>(entity).is_ok());
        assert_eq!(registry.get_entity(id), Some(entity));
    }

    #[test]
    fn test_spawn_player() {
        let mut world = create_test_world();
        let mut roster = PlayerRoster::new();
        let entity = spawn_test_player(&mut world, &mut roster, PlayerId(3));

        assert_eq!(world.get::<&Player>(entity).unwrap().id, PlayerId(3));
        assert_eq!(roster.resolve(PlayerId(3)), Some(entity));
    }
}
