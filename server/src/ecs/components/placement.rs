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

//! Deferred spawn placement

use crate::ecs::capabilities::PointSampler;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Wait before the navmesh is trusted to exist around a fresh spawn
pub const SETTLE_DELAY: f32 = 2.0;

/// Wait between snapping and handing the body to navigation
pub const ENABLE_DELAY: f32 = 2.0;

/// How far from the spawn point the navmesh may be
pub const SNAP_DISTANCE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Phase {
    Settling { remaining: f32 },
    Snapped { point: Vec3, remaining: f32 },
    Done,
}

/// What the placement system must do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementStep {
    Waiting,
    /// Warp onto `point` and enable navigation
    Place(Vec3),
    /// No navmesh within reach; enable navigation where the body stands
    Failed,
}

/// Spawn placement that waits for the level before enabling navigation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPlacement {
    phase: Phase,
}

impl SpawnPlacement {
    pub fn new() -> Self {
        Self {
            phase: Phase::Settling {
                remaining: SETTLE_DELAY,
            },
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Snapped point, once the navmesh has been found
    pub fn snapped(&self) -> Option<Vec3> {
        match self.phase {
            Phase::Snapped { point, .. } => Some(point),
            _ => None,
        }
    }

    pub fn advance(&mut self, delta_time: f32, level: &dyn PointSampler, position: Vec3) -> PlacementStep {
        match self.phase {
            Phase::Settling { remaining } => {
                let remaining = remaining - delta_time;
                if remaining > 0.0 {
                    self.phase = Phase::Settling { remaining };
                    return PlacementStep::Waiting;
                }
                match level.sample_navmesh(position, SNAP_DISTANCE) {
                    Some(point) => {
                        self.phase = Phase::Snapped {
                            point,
                            remaining: ENABLE_DELAY,
                        };
                        PlacementStep::Waiting
                    }
                    None => {
                        self.phase = Phase::Done;
                        PlacementStep::Failed
                    }
                }
            }
            Phase::Snapped { point, remaining } => {
                let remaining = remaining - delta_time;
                if remaining > 0.0 {
                    self.phase = Phase::Snapped { point, remaining };
                    return PlacementStep::Waiting;
                }
                self.phase = Phase::Done;
                PlacementStep::Place(point)
            }
            Phase::Done => PlacementStep::Waiting,
        }
    }
}

impl Default for SpawnPlacement {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::capabilities::{MockPointSampler, StaticLevel};

    #[test]
    fn test_deferred_placement_timeline() {
        let level = StaticLevel::default();
        let mut placement = SpawnPlacement::new();
        let spawn = Vec3::new(3.0, 6.0, -2.0);

        for _ in 0..3 {
            assert_eq!(placement.advance(0.5, &level, spawn), PlacementStep::Waiting);
        }
        assert_eq!(placement.advance(0.5, &level, spawn), PlacementStep::Waiting);
        assert_eq!(placement.snapped(), Some(Vec3::new(3.0, 0.0, -2.0)));

        for _ in 0..3 {
            assert_eq!(placement.advance(0.5, &level, spawn), PlacementStep::Waiting);
        }
        assert_eq!(
            placement.advance(0.5, &level, spawn),
            PlacementStep::Place(Vec3::new(3.0, 0.0, -2.0))
        );
        assert!(placement.is_done());
        assert_eq!(placement.advance(0.5, &level, spawn), PlacementStep::Waiting);
    }

    #[test]
    fn test_missing_navmesh_fails_once() {
        let mut level = MockPointSampler::new();
        level.expect_sample_navmesh().times(1).returning(|_, _| None);

        let mut placement = SpawnPlacement::new();
        assert_eq!(placement.advance(1.0, &level, Vec3::ZERO), PlacementStep::Waiting);
        assert_eq!(placement.advance(1.0, &level, Vec3::ZERO), PlacementStep::Failed);
        assert_eq!(placement.advance(1.0, &level, Vec3::ZERO), PlacementStep::Waiting);
        assert!(placement.is_done());
    }
}
