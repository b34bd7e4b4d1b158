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

//! Deferred spawn placement system

use crate::ecs::capabilities::{Navigator, PointSampler};
use crate::ecs::components::{PlacementStep, SpawnPlacement, Transform};
use crate::ecs::events::{CreatureEvent, EventBus};
use crate::ecs::{Entity, GameWorld};

pub struct PlacementSystem {
    event_bus: EventBus,
}

impl PlacementSystem {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Advance pending placements, detaching each one when it completes
    pub fn update(&mut self, world: &mut GameWorld, delta_time: f32, level: &dyn PointSampler) {
        let mut finished = Vec::new();

        for (entity, placement, navigator, transform) in
            world.query_mut::<(Entity, &mut SpawnPlacement, &mut Navigator, &mut Transform)>()
        {
            match placement.advance(delta_time, level, transform.position) {
                PlacementStep::Waiting => continue,
                PlacementStep::Place(point) => {
                    navigator.warp(point);
                    navigator.enable();
                    transform.position = point;
                    tracing::debug!("Creature {:?} placed at {}", entity, point);
                    self.event_bus.publish(CreatureEvent::Placed {
                        entity,
                        position: point,
                    });
                }
                PlacementStep::Failed => {
                    navigator.enable();
                    tracing::warn!(
                        "No navmesh near {} for creature {:?}, enabling in place",
                        transform.position,
                        entity
                    );
                    self.event_bus
                        .publish(CreatureEvent::PlacementFailed { entity });
                }
            }
            finished.push(entity);
        }

        for entity in finished {
            if let Err(e) = world.remove_one::<SpawnPlacement>(entity) {
                tracing::warn!("Failed to detach placement from {:?}: {}", entity, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityRegistry;
    use crate::ecs::capabilities::{MockPointSampler, StaticLevel};
    use crate::ecs::creature_builder::CreatureBuilder;
    use glam::Vec3;

    #[test]
    fn test_deferred_creature_is_placed_after_delays() {
        let mut world = GameWorld::new();
        let mut registry = EntityRegistry::new();
        let level = StaticLevel::default();
        let creature = CreatureBuilder::new("Hiccubz")
            .at(Vec3::new(4.0, 1.5, 4.0))
            .spawn(&mut world, &mut registry, &level)
            .unwrap();
        let bus = EventBus::new();
        let mut system = PlacementSystem::new(bus.clone());

        for _ in 0..7 {
            system.update(&mut world, 0.5, &level);
        }
        assert!(world.get::<&SpawnPlacement>(creature).is_ok());
        assert!(!world.get::<&Navigator>(creature).unwrap().is_enabled());

        system.update(&mut world, 0.5, &level);
        assert!(world.get::<&SpawnPlacement>(creature).is_err());
        assert!(world.get::<&Navigator>(creature).unwrap().is_enabled());
        assert_eq!(
            world.get::<&Transform>(creature).unwrap().position,
            Vec3::new(4.0, 0.0, 4.0)
        );
        assert_eq!(bus.queue_len(), 1);
    }

    #[test]
    fn test_failed_placement_still_enables() {
        let mut world = GameWorld::new();
        let mut registry = EntityRegistry::new();
        let creature = CreatureBuilder::new("Hiccubz")
            .spawn(&mut world, &mut registry, &StaticLevel::default())
            .unwrap();

        let mut level = MockPointSampler::new();
        level.expect_sample_navmesh().times(1).returning(|_, _| None);

        let bus = EventBus::new();
        let mut system = PlacementSystem::new(bus.clone());
        system.update(&mut world, 2.5, &level);

        assert!(world.get::<&SpawnPlacement>(creature).is_err());
        assert!(world.get::<&Navigator>(creature).unwrap().is_enabled());
        bus.subscribe(|event| assert!(matches!(event, CreatureEvent::PlacementFailed { .. })));
        assert_eq!(bus.process_events(), 1);
    }
}
