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

//! Spring-damper smoothing of body orientation

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Largest integration step; longer ticks are subdivided
const MAX_STEP: f32 = 1.0 / 120.0;

/// Upper bound on subdivisions per call; time beyond it is dropped
const MAX_SUBSTEPS: u32 = 600;

/// Orientation spring driving `current` toward `target`
///
/// Cosmetic only: every node runs it from locally known velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationSpring {
    /// Natural frequency (rad/s)
    pub speed: f32,
    /// Damping ratio, 1.0 is critical
    pub damping: f32,
    target: Quat,
    current: Quat,
    /// Angular velocity as a scaled axis
    velocity: Vec3,
}

impl RotationSpring {
    pub fn new(speed: f32, damping: f32) -> Self {
        Self {
            speed,
            damping,
            target: Quat::IDENTITY,
            current: Quat::IDENTITY,
            velocity: Vec3::ZERO,
        }
    }

    pub fn target(&self) -> Quat {
        self.target
    }

    pub fn current(&self) -> Quat {
        self.current
    }

    pub fn set_target(&mut self, target: Quat) {
        self.target = target.normalize();
    }

    /// Face the horizontal direction of `velocity` if it is meaningful
    ///
    /// Pitch and roll are discarded. Returns whether the target changed.
    pub fn face_velocity(&mut self, velocity: Vec3, threshold: f32) -> bool {
        let horizontal = Vec3::new(velocity.x, 0.0, velocity.z).normalize_or_zero();
        if horizontal.length() <= threshold {
            return false;
        }
        self.target = yaw_rotation(horizontal);
        true
    }

    /// Integrate the spring over `delta_time` and return the new orientation
    pub fn step(&mut self, delta_time: f32) -> Quat {
        if !delta_time.is_finite() {
            return self.current;
        }
        let mut remaining = delta_time.max(0.0);
        let mut substeps = 0;
        while remaining > 0.0 && substeps < MAX_SUBSTEPS {
            let dt = remaining.min(MAX_STEP);
            self.integrate(dt);
            remaining -= dt;
            substeps += 1;
        }
        self.current
    }

    fn integrate(&mut self, dt: f32) {
        let mut delta = self.target * self.current.inverse();
        if delta.w < 0.0 {
            delta = -delta;
        }
        let error = delta.to_scaled_axis();
        let acceleration =
            error * (self.speed * self.speed) - self.velocity * (2.0 * self.damping * self.speed);
        self.velocity += acceleration * dt;
        self.current = (Quat::from_scaled_axis(self.velocity * dt) * self.current).normalize();
    }
}

impl Default for RotationSpring {
    fn default() -> Self {
        Self::new(15.0, 0.8)
    }
}

/// Rotation about +Y that turns +Z toward `direction` on the XZ plane
pub fn yaw_rotation(direction: Vec3) -> Quat {
    Quat::from_rotation_y(direction.x.atan2(direction.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_rotation_faces_direction() {
        let facing = yaw_rotation(Vec3::new(1.0, 0.0, 0.0)) * Vec3::Z;
        assert!((facing - Vec3::X).length() < 1e-5);

        let facing = yaw_rotation(Vec3::new(0.0, 0.0, -1.0)) * Vec3::Z;
        assert!((facing + Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_face_velocity_ignores_stillness_and_vertical_motion() {
        let mut spring = RotationSpring::default();
        assert!(!spring.face_velocity(Vec3::ZERO, 0.1));
        assert!(!spring.face_velocity(Vec3::new(0.0, -9.0, 0.0), 0.1));
        assert_eq!(spring.target(), Quat::IDENTITY);
    }

    #[test]
    fn test_face_velocity_is_yaw_only() {
        let mut spring = RotationSpring::default();
        assert!(spring.face_velocity(Vec3::new(2.0, 5.0, 0.0), 0.1));
        let facing = spring.target() * Vec3::Z;
        assert!(facing.y.abs() < 1e-5);
        assert!((facing - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_spring_converges_on_target() {
        let mut spring = RotationSpring::new(15.0, 0.8);
        spring.set_target(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));

        let first = spring.step(1.0 / 60.0);
        assert!(first.angle_between(Quat::IDENTITY) > 0.0);
        assert!(first.angle_between(spring.target()) < std::f32::consts::FRAC_PI_2);

        for _ in 0..120 {
            spring.step(1.0 / 60.0);
        }
        assert!(spring.current().angle_between(spring.target()) < 1e-2);
    }

    #[test]
    fn test_spring_takes_short_way_round() {
        let mut spring = RotationSpring::new(15.0, 1.0);
        spring.set_target(Quat::from_rotation_y(-3.0));
        spring.step(1.0 / 60.0);
        let (axis, _) = spring.current().to_axis_angle();
        assert!(axis.y < 0.0);
    }

    #[test]
    fn test_large_step_is_stable() {
        let mut spring = RotationSpring::default();
        spring.set_target(Quat::from_rotation_y(1.0));
        let current = spring.step(2.0);
        assert!(current.is_normalized());
        assert!(current.angle_between(spring.target()) < 1e-2);
    }

    #[test]
    fn test_non_finite_step_leaves_orientation_alone() {
        let mut spring = RotationSpring::default();
        spring.set_target(Quat::from_rotation_y(1.0));
        spring.step(1.0 / 60.0);
        let before = spring.current();

        assert_eq!(spring.step(f32::INFINITY), before);
        assert_eq!(spring.step(f32::NAN), before);
        assert_eq!(spring.step(-1.0), before);
        assert!(spring.current().is_normalized());
    }

    #[test]
    fn test_huge_step_is_bounded() {
        let mut spring = RotationSpring::default();
        spring.set_target(Quat::from_rotation_y(1.0));
        let current = spring.step(1.0e9);
        assert!(current.is_normalized());
        assert!(current.angle_between(spring.target()) < 1e-2);
    }
}
