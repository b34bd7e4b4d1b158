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

//! Creature builder
//!
//! Assembles the full component set of a creature and spawns it into a world.
//! Tuning is validated here so nothing downstream has to re-check it.

use crate::ecs::capabilities::{PointSampler, SurfaceId};
use crate::ecs::components::{
    CreatureBrain, CreatureSignals, CreatureTuning, ENABLE_DELAY, EmotionScheduler, Face,
    HurtPulse, Name, NetworkIdentity, PlacementKind, Presentation, Replica, RotationSpring,
    SETTLE_DELAY, SNAP_DISTANCE, SpawnPlacement, Transform,
};
use crate::ecs::{EcsEntity, EntityRegistry, GameWorld};
use glam::Vec3;
use minimotes_common::NetworkId;

/// Builder for one creature
#[derive(Debug, Clone)]
pub struct CreatureBuilder {
    /// Display name
    pub name: String,

    /// Identity shared by every node's copy
    pub id: NetworkId,

    /// Spawn position
    pub position: Vec3,

    /// Behavior constants
    pub tuning: CreatureTuning,

    /// Surfaces showing the hurt overlay
    pub surfaces: Vec<SurfaceId>,

    /// Hurt ramp rate per second
    pub hurt_rate: f32,

    /// Rotation spring speed and damping until velocity first takes over
    pub spring_speed: f32,
    pub spring_damping: f32,
}

impl CreatureBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let pulse = HurtPulse::default();
        let spring = RotationSpring::default();
        Self {
            name: name.into(),
            id: NetworkId::new(),
            position: Vec3::ZERO,
            tuning: CreatureTuning::default(),
            surfaces: pulse.surfaces().to_vec(),
            hurt_rate: pulse.rate(),
            spring_speed: spring.speed,
            spring_damping: spring.damping,
        }
    }

    pub fn with_id(mut self, id: NetworkId) -> Self {
        self.id = id;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_tuning(mut self, tuning: CreatureTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_surfaces(mut self, surfaces: Vec<SurfaceId>) -> Self {
        self.surfaces = surfaces;
        self
    }

    /// Validate the builder
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Creature name is required".to_string());
        }
        if let Err(e) = self.tuning.validate() {
            errors.push(e);
        }
        if !self.hurt_rate.is_finite() || self.hurt_rate <= 0.0 {
            errors.push(format!("Hurt rate must be positive, got {}", self.hurt_rate));
        }
        if self.spring_speed < 0.0 || self.spring_damping < 0.0 {
            errors.push("Rotation spring parameters must be non-negative".to_string());
        }
        if !self.position.is_finite() {
            errors.push("Spawn position must be finite".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Spawn the creature and register its network identity
    ///
    /// With deferred placement navigation starts disabled and a
    /// `SpawnPlacement` is attached; immediate placement snaps to the navmesh
    /// right away when one is within reach.
    pub fn spawn(
        self,
        world: &mut GameWorld,
        registry: &mut EntityRegistry,
        level: &dyn PointSampler,
    ) -> Result<EcsEntity, String> {
        self.validate().map_err(|errors| errors.join("; "))?;
        if registry.contains_id(self.id) {
            return Err(format!("Network id {} is already registered", self.id));
        }

        let mut position = self.position;
        let mut navigator = self
            .tuning
            .navigation
            .build(position, self.tuning.move_speed);
        let deferred = self.tuning.placement == PlacementKind::Deferred;
        if deferred {
            navigator.disable(SETTLE_DELAY + ENABLE_DELAY);
        } else if let Some(point) = level.sample_navmesh(position, SNAP_DISTANCE) {
            navigator.warp(point);
            position = point;
        }

        let entity = world.spawn((
            NetworkIdentity(self.id),
            Replica::default(),
            Name::new(self.name),
            Transform::new(position),
            CreatureBrain::new(self.tuning),
            CreatureSignals::default(),
            Face::new(),
            EmotionScheduler::new(),
            HurtPulse::new(self.hurt_rate, self.surfaces),
            RotationSpring::new(self.spring_speed, self.spring_damping),
            Presentation::new(),
            navigator,
        ));
        if deferred {
            world
                .insert_one(entity, SpawnPlacement::new())
                .map_err(|e| format!("Failed to attach placement: {}", e))?;
        }
        if let Err(e) = registry.register(entity, self.id) {
            let _ = world.despawn(entity);
            return Err(e);
        }
        Ok(entity)
    }
}
