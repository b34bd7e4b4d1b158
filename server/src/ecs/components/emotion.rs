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

//! Emotion timelines and the single-flight scheduler that plays them

use crate::ecs::capabilities::PresentationSink;
use crate::ecs::components::{Expression, FULL_WEIGHT, Face};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Inclusive `min..=max` seconds range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerRange {
    pub min: f32,
    pub max: f32,
}

impl TimerRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(seconds: f32) -> Self {
        Self::new(seconds, seconds)
    }

    /// Uniform draw from the range; a collapsed or unbounded range yields `min`
    pub fn sample(&self, rng: &mut dyn RngCore) -> f32 {
        if !self.min.is_finite() {
            return 0.0;
        }
        if !self.max.is_finite() || self.max <= self.min {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }

    /// Both bounds are real numbers
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    pub fn contains(&self, seconds: f32) -> bool {
        seconds >= self.min && seconds <= self.max
    }
}

/// One expression held for a sampled duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionStep {
    pub expression: Expression,
    pub hold: TimerRange,
}

/// Ordered expressions followed by an implicit clear to a blank face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionTimeline {
    steps: Vec<EmotionStep>,
}

impl EmotionTimeline {
    pub fn new(steps: Vec<EmotionStep>) -> Self {
        Self { steps }
    }

    /// Sequence played while being carried
    pub fn grabbed(hold: TimerRange) -> Self {
        Self::new(
            [
                Expression::Scared,
                Expression::Sad,
                Expression::Angry,
                Expression::Blank,
                Expression::Curious,
            ]
            .into_iter()
            .map(|expression| EmotionStep { expression, hold })
            .collect(),
        )
    }

    /// Flinch then sulk after taking damage
    pub fn hurt(flinch: f32, sulk: TimerRange) -> Self {
        Self::new(vec![
            EmotionStep {
                expression: Expression::Hit,
                hold: TimerRange::fixed(flinch),
            },
            EmotionStep {
                expression: Expression::Angry,
                hold: sulk,
            },
        ])
    }

    pub fn steps(&self) -> &[EmotionStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Playback {
    timeline: EmotionTimeline,
    index: usize,
    remaining: f32,
}

/// Plays at most one emotion timeline at a time
///
/// The running sequence is plain state (step index and time left in the step)
/// advanced by the tick, so it can be inspected, replaced or cancelled
/// synchronously. Starting a timeline always cancels the previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionScheduler {
    playback: Option<Playback>,
}

impl EmotionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.playback.is_some()
    }

    /// Index of the step on display, if any
    pub fn current_step(&self) -> Option<usize> {
        self.playback.as_ref().map(|playback| playback.index)
    }

    /// Seconds left on the current step
    pub fn remaining(&self) -> Option<f32> {
        self.playback.as_ref().map(|playback| playback.remaining)
    }

    /// Cancel whatever is running and display the first step of `timeline`
    pub fn start(
        &mut self,
        timeline: EmotionTimeline,
        face: &mut Face,
        sink: &mut dyn PresentationSink,
        rng: &mut dyn RngCore,
    ) {
        self.cancel();
        let Some(first) = timeline.steps.first().copied() else {
            face.clear(sink);
            return;
        };
        face.show(sink, first.expression, FULL_WEIGHT);
        self.playback = Some(Playback {
            timeline,
            index: 0,
            remaining: first.hold.sample(rng),
        });
    }

    /// Stop immediately, leaving the face as it is
    pub fn cancel(&mut self) {
        self.playback = None;
    }

    /// Advance the running timeline by `delta_time`
    pub fn advance(
        &mut self,
        delta_time: f32,
        face: &mut Face,
        sink: &mut dyn PresentationSink,
        rng: &mut dyn RngCore,
    ) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        playback.remaining -= delta_time;
        while playback.remaining <= 0.0 {
            playback.index += 1;
            let Some(step) = playback.timeline.steps.get(playback.index).copied() else {
                break;
            };
            face.show(sink, step.expression, FULL_WEIGHT);
            playback.remaining += step.hold.sample(rng);
        }
        if playback.index >= playback.timeline.steps.len() {
            face.clear(sink);
            self.playback = None;
        }
    }
}
