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

//! Recorded presentation state of an entity

use crate::ecs::capabilities::{PresentationSink, SurfaceId};
use crate::ecs::components::{AudioCue, Expression};
use std::collections::{BTreeMap, HashMap};

/// Presentation surface of a headless entity
///
/// Keeps the latest blend shape weights, animator flags and surface values,
/// plus counts of one-shot triggers and audio cues, so the host and tests can
/// observe what a renderer would have shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    weights: [f32; Expression::ALL.len()],
    bools: BTreeMap<String, bool>,
    triggers: HashMap<String, u32>,
    last_trigger: Option<String>,
    cues: HashMap<AudioCue, u32>,
    surfaces: BTreeMap<SurfaceId, f32>,
}

impl Presentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expression_weight(&self, expression: Expression) -> f32 {
        self.weights[expression.index()]
    }

    /// Expressions currently carrying weight
    pub fn active_expressions(&self) -> Vec<Expression> {
        Expression::ALL
            .into_iter()
            .filter(|expression| self.expression_weight(*expression) > 0.0)
            .collect()
    }

    pub fn animation_bool(&self, name: &str) -> bool {
        self.bools.get(name).copied().unwrap_or(false)
    }

    pub fn trigger_count(&self, name: &str) -> u32 {
        self.triggers.get(name).copied().unwrap_or(0)
    }

    pub fn last_trigger(&self) -> Option<&str> {
        self.last_trigger.as_deref()
    }

    pub fn cue_count(&self, cue: AudioCue) -> u32 {
        self.cues.get(&cue).copied().unwrap_or(0)
    }

    pub fn total_cues(&self) -> u32 {
        self.cues.values().sum()
    }

    pub fn surface_intensity(&self, surface: SurfaceId) -> f32 {
        self.surfaces.get(&surface).copied().unwrap_or(0.0)
    }

    pub fn surfaces_touched(&self) -> Vec<SurfaceId> {
        self.surfaces.keys().copied().collect()
    }
}

impl PresentationSink for Presentation {
    fn set_expression_weight(&mut self, expression: Expression, weight: f32) {
        self.weights[expression.index()] = weight;
    }

    fn set_animation_trigger(&mut self, name: &str) {
        *self.triggers.entry(name.to_string()).or_default() += 1;
        self.last_trigger = Some(name.to_string());
    }

    fn set_animation_bool(&mut self, name: &str, value: bool) {
        self.bools.insert(name.to_string(), value);
    }

    fn play_audio_cue(&mut self, cue: AudioCue) {
        *self.cues.entry(cue).or_default() += 1;
    }

    fn set_surface_intensity(&mut self, surface: SurfaceId, value: f32) {
        self.surfaces.insert(surface, value);
    }
}
