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

//! Navigation capability and its two in-memory backends

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Destination-seeking movement
///
/// Pathfinding is out of scope for the creature controller; the backends below
/// steer in a straight line so the headless host has velocities to work with.
pub trait Navigation: Send + Sync {
    /// Head toward `point`; ignored while disabled
    fn set_destination(&mut self, point: Vec3);

    /// Current velocity
    fn velocity(&self) -> Vec3;

    /// Current position
    fn position(&self) -> Vec3;

    /// Resume navigation
    fn enable(&mut self);

    /// Suspend navigation for `duration` seconds (backends may treat it as indefinite)
    fn disable(&mut self, duration: f32);

    /// Teleport without travelling
    fn warp(&mut self, point: Vec3);

    fn is_enabled(&self) -> bool;

    /// Execute movement for one tick
    fn advance(&mut self, delta_time: f32);
}

/// Which navigation backend a creature uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKind {
    #[default]
    Standard,
    Enemy,
}

impl NavigationKind {
    pub fn build(&self, position: Vec3, speed: f32) -> Navigator {
        match self {
            NavigationKind::Standard => Navigator::new(StandardAgent::new(position, speed)),
            NavigationKind::Enemy => Navigator::new(EnemyAgent::new(position, speed)),
        }
    }
}

/// Component wrapping whichever backend drives an entity
pub struct Navigator(Box<dyn Navigation>);

impl Navigator {
    pub fn new(backend: impl Navigation + 'static) -> Self {
        Self(Box::new(backend))
    }
}

impl std::ops::Deref for Navigator {
    type Target = dyn Navigation;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::ops::DerefMut for Navigator {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("position", &self.0.position())
            .field("velocity", &self.0.velocity())
            .field("enabled", &self.0.is_enabled())
            .finish()
    }
}

/// Distance under which an agent counts as arrived
const ARRIVAL_RADIUS: f32 = 0.05;

/// Move `position` toward `destination` at `speed`, returning the velocity used
fn steer(position: &mut Vec3, destination: Option<Vec3>, speed: f32, delta_time: f32) -> Vec3 {
    let Some(destination) = destination else {
        return Vec3::ZERO;
    };
    let offset = destination - *position;
    let distance = offset.length();
    if distance <= ARRIVAL_RADIUS || delta_time <= 0.0 {
        return Vec3::ZERO;
    }
    let step = (speed * delta_time).min(distance);
    let velocity = offset / distance * (step / delta_time);
    *position += velocity * delta_time;
    velocity
}

/// Plain navigation agent with an on/off switch
///
/// Disabling also makes the body kinematic so a carrier can move it freely;
/// the duration passed to `disable` is ignored.
#[derive(Debug, Clone)]
pub struct StandardAgent {
    position: Vec3,
    destination: Option<Vec3>,
    velocity: Vec3,
    speed: f32,
    enabled: bool,
    kinematic: bool,
}

impl StandardAgent {
    pub fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            destination: None,
            velocity: Vec3::ZERO,
            speed,
            enabled: true,
            kinematic: false,
        }
    }

    pub fn is_kinematic(&self) -> bool {
        self.kinematic
    }
}

impl Navigation for StandardAgent {
    fn set_destination(&mut self, point: Vec3) {
        if self.enabled {
            self.destination = Some(point);
        }
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn enable(&mut self) {
        self.enabled = true;
        self.kinematic = false;
    }

    fn disable(&mut self, _duration: f32) {
        self.enabled = false;
        self.kinematic = true;
        self.destination = None;
        self.velocity = Vec3::ZERO;
    }

    fn warp(&mut self, point: Vec3) {
        self.position = point;
        self.destination = None;
        self.velocity = Vec3::ZERO;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn advance(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }
        self.velocity = steer(&mut self.position, self.destination, self.speed, delta_time);
    }
}

/// Navigation agent that is locked out for a duration when disabled
#[derive(Debug, Clone)]
pub struct EnemyAgent {
    position: Vec3,
    destination: Option<Vec3>,
    velocity: Vec3,
    speed: f32,
    lockout: f32,
}

impl EnemyAgent {
    pub fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            destination: None,
            velocity: Vec3::ZERO,
            speed,
            lockout: 0.0,
        }
    }

    /// Seconds until the agent re-enables itself
    pub fn lockout(&self) -> f32 {
        self.lockout
    }
}

impl Navigation for EnemyAgent {
    fn set_destination(&mut self, point: Vec3) {
        if self.is_enabled() {
            self.destination = Some(point);
        }
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn enable(&mut self) {
        self.lockout = 0.0;
    }

    fn disable(&mut self, duration: f32) {
        self.lockout = duration.max(0.0);
        self.destination = None;
        self.velocity = Vec3::ZERO;
    }

    fn warp(&mut self, point: Vec3) {
        self.position = point;
        self.destination = None;
        self.velocity = Vec3::ZERO;
    }

    fn is_enabled(&self) -> bool {
        self.lockout <= 0.0
    }

    fn advance(&mut self, delta_time: f32) {
        if self.lockout > 0.0 {
            self.lockout = (self.lockout - delta_time).max(0.0);
            return;
        }
        self.velocity = steer(&mut self.position, self.destination, self.speed, delta_time);
    }
}
