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

//! Cosmetic presentation system
//!
//! Runs on every node from locally known inputs only: the emotion timeline,
//! the hurt pulse and the rotation spring. Nothing here is replicated.

use crate::ecs::GameWorld;
use crate::ecs::capabilities::{Navigator, SurfaceId};
use crate::ecs::components::{
    EmotionScheduler, Face, HurtPulse, Presentation, ResponseCurve, RotationSpring, Transform,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Presentation constants shared by every creature on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationSettings {
    /// Hurt ramp rate per second
    pub hurt_rate: f32,
    /// Surfaces that show the hurt overlay
    pub hurt_surfaces: Vec<SurfaceId>,
    /// Maps pulse progress to overlay intensity
    pub hurt_curve: ResponseCurve,
    /// Spring speed applied while the creature is moving
    pub spring_speed: f32,
    /// Spring damping applied while the creature is moving
    pub spring_damping: f32,
    /// Normalized horizontal speed above which the creature turns to face its motion
    pub velocity_threshold: f32,
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            hurt_rate: 2.5,
            hurt_surfaces: vec![SurfaceId(0)],
            hurt_curve: ResponseCurve::impact(),
            spring_speed: 15.0,
            spring_damping: 0.8,
            velocity_threshold: 0.1,
        }
    }
}

impl PresentationSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !self.hurt_rate.is_finite() || self.hurt_rate <= 0.0 {
            return Err(format!("hurt_rate must be positive, got {}", self.hurt_rate));
        }
        if self.spring_speed < 0.0 || self.spring_damping < 0.0 {
            return Err("spring_speed and spring_damping must be non-negative".to_string());
        }
        if !(0.0..1.0).contains(&self.velocity_threshold) {
            return Err(format!(
                "velocity_threshold must be in [0, 1), got {}",
                self.velocity_threshold
            ));
        }
        Ok(())
    }
}

pub struct PresentationSystem {
    settings: PresentationSettings,
}

impl PresentationSystem {
    pub fn new(settings: PresentationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PresentationSettings {
        &self.settings
    }

    /// Advance timelines, hurt pulses and rotation springs
    pub fn update(&mut self, world: &mut GameWorld, delta_time: f32, rng: &mut dyn RngCore) {
        for (scheduler, face, pulse, spring, sink, navigator, transform) in world.query_mut::<(
            &mut EmotionScheduler,
            &mut Face,
            &mut HurtPulse,
            &mut RotationSpring,
            &mut Presentation,
            &Navigator,
            &mut Transform,
        )>() {
            scheduler.advance(delta_time, face, &mut *sink, rng);
            pulse.update(delta_time, &self.settings.hurt_curve, &mut *sink);

            if spring.face_velocity(navigator.velocity(), self.settings.velocity_threshold) {
                spring.speed = self.settings.spring_speed;
                spring.damping = self.settings.spring_damping;
            }
            transform.rotation = spring.step(delta_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityRegistry;
    use crate::ecs::components::{EmotionTimeline, Expression, TimerRange};
    use crate::ecs::test_utils::spawn_test_creature;
    use glam::{Quat, Vec3};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(PresentationSettings::default().validate().is_ok());
        let settings = PresentationSettings {
            velocity_threshold: 1.5,
            ..PresentationSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_creature_turns_toward_motion() {
        let mut world = GameWorld::new();
        let mut registry = EntityRegistry::new();
        let (creature, _) = spawn_test_creature(&mut world, &mut registry);
        {
            let mut navigator = world.get::<&mut Navigator>(creature).unwrap();
            navigator.enable();
            navigator.set_destination(Vec3::new(10.0, 0.0, 0.0));
            navigator.advance(0.1);
        }

        let mut system = PresentationSystem::new(PresentationSettings::default());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..120 {
            system.update(&mut world, 1.0 / 60.0, &mut rng);
        }

        let transform = world.get::<&Transform>(creature).unwrap();
        let facing = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(transform.rotation.angle_between(facing) < 0.05);
    }

    #[test]
    fn test_idle_creature_keeps_orientation() {
        let mut world = GameWorld::new();
        let mut registry = EntityRegistry::new();
        let (creature, _) = spawn_test_creature(&mut world, &mut registry);

        let mut system = PresentationSystem::new(PresentationSettings::default());
        let mut rng = StdRng::seed_from_u64(2);
        system.update(&mut world, 0.5, &mut rng);

        let transform = world.get::<&Transform>(creature).unwrap();
        assert!(transform.rotation.angle_between(Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn test_timeline_and_pulse_advance() {
        let mut world = GameWorld::new();
        let mut registry = EntityRegistry::new();
        let (creature, _) = spawn_test_creature(&mut world, &mut registry);
        let mut rng = StdRng::seed_from_u64(3);
        {
            let (scheduler, face, pulse, sink) = world
                .query_one_mut::<(&mut EmotionScheduler, &mut Face, &mut HurtPulse, &mut Presentation)>(
                    creature,
                )
                .unwrap();
            scheduler.start(
                EmotionTimeline::hurt(0.4, TimerRange::fixed(1.0)),
                face,
                sink,
                &mut rng,
            );
            pulse.trigger();
        }

        let mut system = PresentationSystem::new(PresentationSettings::default());
        system.update(&mut world, 0.2, &mut rng);
        {
            let sink = world.get::<&Presentation>(creature).unwrap();
            assert!(sink.surface_intensity(SurfaceId(0)) > 0.0);
            assert_eq!(world.get::<&Face>(creature).unwrap().current(), Expression::Hit);
        }

        system.update(&mut world, 0.4, &mut rng);
        assert_eq!(world.get::<&Face>(creature).unwrap().current(), Expression::Angry);
        assert!(!world.get::<&HurtPulse>(creature).unwrap().is_active());
        assert_eq!(
            world
                .get::<&Presentation>(creature)
                .unwrap()
                .surface_intensity(SurfaceId(0)),
            0.0
        );
    }
}
