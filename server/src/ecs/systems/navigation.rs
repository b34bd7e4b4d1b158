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

//! Navigation system moving creatures along their current destination

use crate::ecs::GameWorld;
use crate::ecs::capabilities::Navigator;
use crate::ecs::components::Transform;

#[derive(Debug, Default)]
pub struct NavigationSystem;

impl NavigationSystem {
    pub fn new() -> Self {
        Self
    }

    /// Execute one tick of movement and copy the result into `Transform`
    pub fn update(&mut self, world: &mut GameWorld, delta_time: f32) {
        for (navigator, transform) in world.query_mut::<(&mut Navigator, &mut Transform)>() {
            navigator.advance(delta_time);
            if navigator.is_enabled() {
                transform.position = navigator.position();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::capabilities::NavigationKind;
    use glam::Vec3;

    #[test]
    fn test_moves_enabled_agents() {
        let mut world = GameWorld::new();
        let mut navigator = NavigationKind::Standard.build(Vec3::ZERO, 2.0);
        navigator.set_destination(Vec3::new(0.0, 0.0, 10.0));
        let entity = world.spawn((navigator, Transform::default()));

        let mut system = NavigationSystem::new();
        for _ in 0..10 {
            system.update(&mut world, 0.1);
        }

        let transform = world.get::<&Transform>(entity).unwrap();
        assert!((transform.position.z - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_disabled_agent_leaves_transform_alone() {
        let mut world = GameWorld::new();
        let mut navigator = NavigationKind::Enemy.build(Vec3::ZERO, 2.0);
        navigator.disable(5.0);
        let entity = world.spawn((navigator, Transform::new(Vec3::new(1.0, 2.0, 3.0))));

        let mut system = NavigationSystem::new();
        system.update(&mut world, 0.1);

        let transform = world.get::<&Transform>(entity).unwrap();
        assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
    }
}
