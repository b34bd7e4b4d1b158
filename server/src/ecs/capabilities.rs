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

//! Collaborator capabilities consumed by the creature controller
//!
//! The controller never renders, plays audio, moves bodies or probes level
//! geometry itself. It talks to those collaborators through the traits in this
//! module; the in-memory backends here are what the headless host and the
//! tests drive.

pub(crate) mod level;
mod navigation;

pub use self::level::{CollisionLayer, FloorRegion, PointSampler, StaticLevel};
pub use self::navigation::{EnemyAgent, Navigation, NavigationKind, Navigator, StandardAgent};

#[cfg(test)]
pub use self::level::MockPointSampler;

use crate::ecs::components::{AudioCue, Expression};
use serde::{Deserialize, Serialize};

/// Identifier of a material surface that can display the hurt overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u16);

/// Sink for everything a creature shows or voices
#[cfg_attr(test, mockall::automock)]
pub trait PresentationSink {
    /// Set a facial blend shape weight in `0..=100`
    fn set_expression_weight(&mut self, expression: Expression, weight: f32);

    /// Fire a one-shot animation trigger
    fn set_animation_trigger(&mut self, name: &str);

    /// Set a looping animation flag
    fn set_animation_bool(&mut self, name: &str, value: bool);

    /// Play a one-shot audio clip
    fn play_audio_cue(&mut self, cue: AudioCue);

    /// Write the hurt overlay intensity of one surface
    fn set_surface_intensity(&mut self, surface: SurfaceId, value: f32);
}

/// Animator parameter names
pub mod anim {
    pub const IDLE_SIT: &str = "idleSit";
    pub const GRABBED: &str = "grabbed";
    pub const NOTICE: &str = "notice";
    pub const RUN_AWAY: &str = "runAway";
    pub const SLEEPING: &str = "sleeping";

    /// Looping flags cleared by every state transition
    pub const LOOPING: [&str; 2] = [RUN_AWAY, SLEEPING];
}
