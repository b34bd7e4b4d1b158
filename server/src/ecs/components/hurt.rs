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

//! Hurt overlay pulse

use crate::ecs::capabilities::{PresentationSink, SurfaceId};
use serde::{Deserialize, Serialize};

/// Piecewise-linear response curve over `0..=1`
///
/// Supplied by configuration; the pulse only samples it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCurve {
    /// `(time, value)` keyframes sorted by time
    keys: Vec<(f32, f32)>,
}

impl ResponseCurve {
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { keys }
    }

    /// Sharp rise then a long fade, the default impact shape
    pub fn impact() -> Self {
        Self::new(vec![(0.0, 0.0), (0.1, 1.0), (1.0, 0.0)])
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for pair in self.keys.windows(2) {
            let ((t0, v0), (t1, v1)) = (pair[0], pair[1]);
            if t <= t1 {
                let span = t1 - t0;
                if span <= f32::EPSILON {
                    return v1;
                }
                return v0 + (v1 - v0) * (t - t0) / span;
            }
        }
        last.1
    }
}

impl Default for ResponseCurve {
    fn default() -> Self {
        Self::impact()
    }
}

/// One-shot, retriggerable intensity ramp written to every hurtable surface
///
/// Runs on every node from local time only; it is never replicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HurtPulse {
    active: bool,
    intensity: f32,
    /// Intensity gained per second
    rate: f32,
    surfaces: Vec<SurfaceId>,
}

impl HurtPulse {
    pub fn new(rate: f32, surfaces: Vec<SurfaceId>) -> Self {
        Self {
            active: false,
            intensity: 0.0,
            rate,
            surfaces,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ramp rate per second
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }

    /// Begin the ramp, or restart it from zero if one is already running
    pub fn trigger(&mut self) {
        self.active = true;
        self.intensity = 0.0;
    }

    /// Advance the ramp and write the curve value to every surface
    pub fn update(&mut self, delta_time: f32, curve: &ResponseCurve, sink: &mut dyn PresentationSink) {
        if !self.active {
            return;
        }
        self.intensity = (self.intensity + self.rate * delta_time).clamp(0.0, 1.0);
        let value = curve.evaluate(self.intensity);
        for surface in &self.surfaces {
            sink.set_surface_intensity(*surface, value);
        }
        if self.intensity >= 1.0 {
            self.intensity = 0.0;
            self.active = false;
            for surface in &self.surfaces {
                sink.set_surface_intensity(*surface, 0.0);
            }
        }
    }
}

impl Default for HurtPulse {
    fn default() -> Self {
        Self::new(2.5, vec![SurfaceId(0)])
    }
}
