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

//! Level geometry probes and a static in-memory level

use crate::ecs::components::random_in_unit_sphere;
use glam::{Vec2, Vec3};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Collision layer a probe is restricted to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionLayer {
    #[default]
    Default,
    Ignore,
}

/// Point sampling and validity probes over level geometry
///
/// Every probe is fallible; callers treat `None`/`false` as "no valid point".
#[cfg_attr(test, mockall::automock)]
pub trait PointSampler {
    /// Pick a level point whose distance from `origin` lies in `min..=max`
    ///
    /// `selector` in `0.0..1.0` chooses among the qualifying points so the
    /// caller owns the randomness.
    fn level_point(
        &self,
        origin: Vec3,
        min_distance: f32,
        max_distance: f32,
        selector: f32,
    ) -> Option<Vec3>;

    /// Closest navigable point within `max_distance` of `point`
    fn sample_navmesh(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Whether solid ground on `layer` lies at most `max_distance` below `point`
    fn probe_down(&self, point: Vec3, max_distance: f32, layer: CollisionLayer) -> bool;
}

/// Axis-aligned walkable floor patch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorRegion {
    /// Minimum corner on the XZ plane
    pub min: Vec2,
    /// Maximum corner on the XZ plane
    pub max: Vec2,
    /// Floor height
    pub height: f32,
    #[serde(default)]
    pub layer: CollisionLayer,
}

impl FloorRegion {
    pub fn new(min: Vec2, max: Vec2, height: f32) -> Self {
        Self {
            min,
            max,
            height,
            layer: CollisionLayer::Default,
        }
    }

    fn contains_xz(&self, xz: Vec2) -> bool {
        xz.cmpge(self.min).all() && xz.cmple(self.max).all()
    }

    fn closest_point(&self, point: Vec3) -> Vec3 {
        let xz = Vec2::new(point.x, point.z).clamp(self.min, self.max);
        Vec3::new(xz.x, self.height, xz.y)
    }
}

/// Level made of named waypoints and flat walkable regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticLevel {
    #[serde(default)]
    pub level_points: Vec<Vec3>,
    #[serde(default)]
    pub floors: Vec<FloorRegion>,
}

impl StaticLevel {
    pub fn new(level_points: Vec<Vec3>, floors: Vec<FloorRegion>) -> Self {
        Self {
            level_points,
            floors,
        }
    }
}

impl Default for StaticLevel {
    /// A 120 x 120 courtyard with waypoints on a 30 unit grid
    fn default() -> Self {
        let mut level_points = Vec::new();
        for x in [-45.0, -15.0, 15.0, 45.0] {
            for z in [-45.0, -15.0, 15.0, 45.0] {
                level_points.push(Vec3::new(x, 0.0, z));
            }
        }
        Self {
            level_points,
            floors: vec![FloorRegion::new(
                Vec2::splat(-60.0),
                Vec2::splat(60.0),
                0.0,
            )],
        }
    }
}

impl PointSampler for StaticLevel {
    fn level_point(
        &self,
        origin: Vec3,
        min_distance: f32,
        max_distance: f32,
        selector: f32,
    ) -> Option<Vec3> {
        let candidates: Vec<Vec3> = self
            .level_points
            .iter()
            .copied()
            .filter(|point| {
                let distance = point.distance(origin);
                distance >= min_distance && distance <= max_distance
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let index = (selector.clamp(0.0, 1.0) * candidates.len() as f32) as usize;
        candidates.get(index.min(candidates.len() - 1)).copied()
    }

    fn sample_navmesh(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        self.floors
            .iter()
            .filter(|floor| floor.layer == CollisionLayer::Default)
            .map(|floor| floor.closest_point(point))
            .map(|hit| (hit, hit.distance(point)))
            .filter(|(_, distance)| *distance <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(hit, _)| hit)
    }

    fn probe_down(&self, point: Vec3, max_distance: f32, layer: CollisionLayer) -> bool {
        const SKIN: f32 = 1e-3;
        let xz = Vec2::new(point.x, point.z);
        self.floors.iter().any(|floor| {
            floor.layer == layer
                && floor.contains_xz(xz)
                && point.y + SKIN >= floor.height
                && point.y - floor.height <= max_distance
        })
    }
}

/// Point near a level point, jittered, snapped to the navmesh and checked for ground
pub(crate) fn sample_destination(
    sampler: &dyn PointSampler,
    origin: Vec3,
    min_distance: f32,
    max_distance: f32,
    jitter: f32,
    probe_distance: f32,
    rng: &mut dyn RngCore,
) -> Option<Vec3> {
    let selector = rng.random::<f32>();
    let anchor = sampler.level_point(origin, min_distance, max_distance, selector)?;
    let candidate = anchor + random_in_unit_sphere(rng) * jitter;
    let hit = sampler.sample_navmesh(candidate, probe_distance)?;
    sampler
        .probe_down(hit, probe_distance, CollisionLayer::Default)
        .then_some(hit)
}
