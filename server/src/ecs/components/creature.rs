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

//! Creature behavior state machine
//!
//! The brain is evaluated only on the authoritative node. One `tick` reads a
//! `SensorFrame`, advances the state timers and returns the effects to apply
//! plus at most one state transition for the replication layer. The brain
//! never touches presentation or navigation itself.

use crate::ecs::EcsEntity;
use crate::ecs::capabilities::{NavigationKind, PointSampler, anim, level};
use crate::ecs::components::{EmotionTimeline, Expression, TimerRange};
use glam::Vec3;
use minimotes_common::CreatureState;
use rand::RngCore;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Where to look for somewhere to run to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleeSearch {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radius of the random offset applied to the chosen level point
    pub jitter: f32,
    /// Reach of the navmesh and ground probes
    pub probe_distance: f32,
}

impl Default for FleeSearch {
    fn default() -> Self {
        Self {
            min_distance: 25.0,
            max_distance: 999.0,
            jitter: 3.0,
            probe_distance: 5.0,
        }
    }
}

/// How a creature is put onto the level when it spawns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    /// Warp to a nearby level point straight away
    Immediate,
    /// Wait for the navmesh, snap to it, then enable navigation
    #[default]
    Deferred,
}

/// Per-creature constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureTuning {
    /// Minimum rest in `Idle` before a known target triggers `Notice`
    pub idle_timer: f32,
    pub notice_timer: f32,
    pub flee_timer: TimerRange,
    /// Time after release, outside storage, before returning to `Notice`
    pub release_timer: f32,
    /// Time held before the creature relaxes in its carrier's hands
    pub calmdown_timer: f32,
    /// Time in storage before falling asleep
    pub stashed_grace_timer: f32,
    /// Re-fire the calm-down cue every tick once expired instead of once
    pub calmdown_cue_repeats: bool,
    pub grabbed_hold: TimerRange,
    pub hurt_flinch: f32,
    pub hurt_sulk: TimerRange,
    /// Navigation lockout requested when picked up
    pub grab_lockout: f32,
    pub move_speed: f32,
    pub flee_search: FleeSearch,
    pub navigation: NavigationKind,
    pub placement: PlacementKind,
}

impl Default for CreatureTuning {
    fn default() -> Self {
        Self {
            idle_timer: 0.0,
            notice_timer: 1.0,
            flee_timer: TimerRange::new(8.0, 12.0),
            release_timer: 1.0,
            calmdown_timer: 4.0,
            stashed_grace_timer: 4.0,
            calmdown_cue_repeats: false,
            grabbed_hold: TimerRange::new(3.0, 4.0),
            hurt_flinch: 0.4,
            hurt_sulk: TimerRange::new(3.0, 4.0),
            grab_lockout: 9999.0,
            move_speed: 3.5,
            flee_search: FleeSearch::default(),
            navigation: NavigationKind::Standard,
            placement: PlacementKind::Deferred,
        }
    }
}

impl CreatureTuning {
    /// Reject negative timers and inverted ranges
    pub fn validate(&self) -> Result<(), String> {
        let timers = [
            ("idle_timer", self.idle_timer),
            ("notice_timer", self.notice_timer),
            ("release_timer", self.release_timer),
            ("calmdown_timer", self.calmdown_timer),
            ("stashed_grace_timer", self.stashed_grace_timer),
            ("hurt_flinch", self.hurt_flinch),
            ("grab_lockout", self.grab_lockout),
            ("move_speed", self.move_speed),
        ];
        for (name, value) in timers {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, value));
            }
        }
        let ranges = [
            ("flee_timer", self.flee_timer),
            ("grabbed_hold", self.grabbed_hold),
            ("hurt_sulk", self.hurt_sulk),
        ];
        for (name, range) in ranges {
            if !range.is_finite() || range.min < 0.0 || range.max < range.min {
                return Err(format!(
                    "{} must satisfy 0 <= min <= max, got {}..{}",
                    name, range.min, range.max
                ));
            }
        }
        let search = &self.flee_search;
        let reaches = [
            ("flee_search.jitter", search.jitter),
            ("flee_search.probe_distance", search.probe_distance),
        ];
        for (name, value) in reaches {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, value));
            }
        }
        if !search.min_distance.is_finite()
            || !search.max_distance.is_finite()
            || search.min_distance < 0.0
            || search.max_distance < search.min_distance
        {
            return Err(format!(
                "flee_search distances must satisfy 0 <= min <= max, got {}..{}",
                search.min_distance, search.max_distance
            ));
        }
        Ok(())
    }
}

/// Signals fed in by the physics and storage collaborators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureSignals {
    /// Currently being carried
    pub grabbed: bool,
    /// Currently inside the haul/extraction set
    pub in_haul: bool,
}

/// Everything the brain reads in one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorFrame {
    pub grabbed: bool,
    pub in_haul: bool,
    /// A detected player is assigned and still exists
    pub has_target: bool,
    pub position: Vec3,
}

/// Side effect requested by the brain, applied by the AI system
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Cancel any running timeline and display one expression
    ShowExpression(Expression),
    /// Replace any running timeline with this one
    StartTimeline(EmotionTimeline),
    CancelTimeline,
    AnimationTrigger(&'static str),
    AnimationBool(&'static str, bool),
    SetDestination(Vec3),
    EnableNavigation,
    DisableNavigation(f32),
    /// No valid flee destination was found
    FleeAborted,
}

/// Result of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub effects: Vec<Effect>,
    /// State entered this tick, to be broadcast
    pub transition: Option<CreatureState>,
}

/// Creature state machine context
#[derive(Debug, Clone)]
pub struct CreatureBrain {
    state: CreatureState,
    /// Raised by a transition, consumed by the next tick
    entered: bool,
    state_timer: f32,
    calmdown_timer: f32,
    calmdown_fired: bool,
    asleep: bool,
    /// Weak handle to the detected player; never owned
    target: Option<EcsEntity>,
    destination: Option<Vec3>,
    tuning: CreatureTuning,
}

impl CreatureBrain {
    /// A fresh brain in `Idle`, with the entry actions pending
    pub fn new(tuning: CreatureTuning) -> Self {
        Self {
            state: CreatureState::Idle,
            entered: true,
            state_timer: 0.0,
            calmdown_timer: 0.0,
            calmdown_fired: false,
            asleep: false,
            target: None,
            destination: None,
            tuning,
        }
    }

    pub fn state(&self) -> CreatureState {
        self.state
    }

    pub fn is_entering(&self) -> bool {
        self.entered
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn calmdown_timer(&self) -> f32 {
        self.calmdown_timer
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    pub fn target(&self) -> Option<EcsEntity> {
        self.target
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn tuning(&self) -> &CreatureTuning {
        &self.tuning
    }

    /// Store the detected player; returns whether it changed
    pub fn set_target(&mut self, target: Option<EcsEntity>) -> bool {
        let changed = self.target != target;
        self.target = target;
        changed
    }

    /// Move to `next` if it differs from the current state
    ///
    /// Raises the entry flag and resets the state timer. Returns `false`, with
    /// nothing touched, when already in `next`.
    pub fn update_state(&mut self, next: CreatureState) -> bool {
        if self.state == next {
            return false;
        }
        self.state = next;
        self.entered = true;
        self.state_timer = 0.0;
        self.destination = None;
        true
    }

    /// Overwrite the state with a value received from the authority
    ///
    /// Entry actions are not run. Returns the previous state when it changed.
    pub fn apply_replicated(&mut self, state: CreatureState) -> Option<CreatureState> {
        if self.state == state {
            return None;
        }
        let previous = self.state;
        self.state = state;
        Some(previous)
    }

    /// Evaluate one simulation step
    pub fn tick(
        &mut self,
        delta_time: f32,
        sensors: &SensorFrame,
        level: &dyn PointSampler,
        rng: &mut dyn RngCore,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let entering = std::mem::take(&mut self.entered);
        let next = match self.state {
            CreatureState::Idle => self.idle(entering, delta_time, sensors, &mut outcome, rng),
            CreatureState::Notice => self.notice(entering, delta_time, sensors, &mut outcome),
            CreatureState::Flee => self.flee(entering, delta_time, sensors, &mut outcome, level, rng),
            CreatureState::Grabbed => self.grabbed(entering, delta_time, sensors, &mut outcome),
            CreatureState::Stashed => self.stashed(entering, delta_time, sensors, &mut outcome, rng),
        };
        if let Some(next) = next {
            if self.update_state(next) {
                for name in anim::LOOPING {
                    outcome.effects.push(Effect::AnimationBool(name, false));
                }
                outcome.transition = Some(next);
            }
        }
        outcome
    }

    fn pick_up(&mut self, outcome: &mut TickOutcome) -> Option<CreatureState> {
        self.state_timer = 0.0;
        outcome
            .effects
            .push(Effect::DisableNavigation(self.tuning.grab_lockout));
        Some(CreatureState::Grabbed)
    }

    fn idle(
        &mut self,
        entering: bool,
        delta_time: f32,
        sensors: &SensorFrame,
        outcome: &mut TickOutcome,
        rng: &mut dyn RngCore,
    ) -> Option<CreatureState> {
        if sensors.grabbed {
            return self.pick_up(outcome);
        }
        if entering {
            self.state_timer = self.tuning.idle_timer;
            let expression = Expression::IDLE
                .choose(rng)
                .copied()
                .unwrap_or(Expression::Happy);
            outcome.effects.push(Effect::AnimationTrigger(anim::IDLE_SIT));
            outcome.effects.push(Effect::CancelTimeline);
            outcome.effects.push(Effect::ShowExpression(expression));
        }
        self.state_timer = (self.state_timer - delta_time).max(0.0);
        if sensors.has_target && self.state_timer <= 0.0 {
            return Some(CreatureState::Notice);
        }
        None
    }

    fn notice(
        &mut self,
        entering: bool,
        delta_time: f32,
        sensors: &SensorFrame,
        outcome: &mut TickOutcome,
    ) -> Option<CreatureState> {
        if sensors.grabbed {
            return self.pick_up(outcome);
        }
        if entering {
            self.state_timer = self.tuning.notice_timer;
            outcome.effects.push(Effect::AnimationTrigger(anim::NOTICE));
            outcome
                .effects
                .push(Effect::ShowExpression(Expression::Notice));
        }
        self.state_timer = (self.state_timer - delta_time).max(0.0);
        if self.state_timer <= 0.0 {
            return Some(CreatureState::Flee);
        }
        None
    }

    fn flee(
        &mut self,
        entering: bool,
        delta_time: f32,
        sensors: &SensorFrame,
        outcome: &mut TickOutcome,
        level: &dyn PointSampler,
        rng: &mut dyn RngCore,
    ) -> Option<CreatureState> {
        if sensors.grabbed {
            return self.pick_up(outcome);
        }
        if entering {
            self.state_timer = self.tuning.flee_timer.sample(rng);
            outcome
                .effects
                .push(Effect::AnimationBool(anim::RUN_AWAY, true));
            outcome
                .effects
                .push(Effect::ShowExpression(Expression::Scared));
            let search = self.tuning.flee_search;
            self.destination = level::sample_destination(
                level,
                sensors.position,
                search.min_distance,
                search.max_distance,
                search.jitter,
                search.probe_distance,
                rng,
            );
            if self.destination.is_none() {
                outcome.effects.push(Effect::FleeAborted);
                return Some(CreatureState::Idle);
            }
            return None;
        }
        let Some(destination) = self.destination else {
            return Some(CreatureState::Idle);
        };
        outcome.effects.push(Effect::SetDestination(destination));
        self.state_timer = (self.state_timer - delta_time).max(0.0);
        if self.state_timer <= 0.0 {
            return Some(CreatureState::Idle);
        }
        None
    }

    fn grabbed(
        &mut self,
        entering: bool,
        delta_time: f32,
        sensors: &SensorFrame,
        outcome: &mut TickOutcome,
    ) -> Option<CreatureState> {
        if entering {
            self.state_timer = self.tuning.release_timer;
            self.calmdown_timer = self.tuning.calmdown_timer;
            self.calmdown_fired = false;
            outcome.effects.push(Effect::AnimationTrigger(anim::GRABBED));
            outcome.effects.push(Effect::StartTimeline(EmotionTimeline::grabbed(
                self.tuning.grabbed_hold,
            )));
        }

        self.calmdown_timer = (self.calmdown_timer - delta_time).max(0.0);
        if self.calmdown_timer <= 0.0 && (!self.calmdown_fired || self.tuning.calmdown_cue_repeats) {
            self.calmdown_fired = true;
            outcome.effects.push(Effect::AnimationTrigger(anim::IDLE_SIT));
        }

        if sensors.grabbed {
            self.state_timer = self.tuning.release_timer;
            return None;
        }

        let next = if sensors.in_haul {
            Some(CreatureState::Stashed)
        } else {
            self.state_timer = (self.state_timer - delta_time).max(0.0);
            (self.state_timer <= 0.0).then_some(CreatureState::Notice)
        };
        if next.is_some() {
            outcome.effects.push(Effect::EnableNavigation);
        }
        next
    }

    fn stashed(
        &mut self,
        entering: bool,
        delta_time: f32,
        sensors: &SensorFrame,
        outcome: &mut TickOutcome,
        rng: &mut dyn RngCore,
    ) -> Option<CreatureState> {
        if sensors.grabbed {
            return self.pick_up(outcome);
        }
        if entering {
            self.state_timer = self.tuning.stashed_grace_timer;
            self.asleep = false;
            outcome.effects.push(Effect::AnimationTrigger(anim::IDLE_SIT));
            outcome
                .effects
                .push(Effect::ShowExpression(Expression::Happy));
        }
        if !sensors.in_haul {
            return Some(CreatureState::Notice);
        }
        self.state_timer = (self.state_timer - delta_time).max(0.0);
        if self.state_timer <= 0.0 && !self.asleep {
            self.asleep = true;
            let expression = Expression::SLEEP
                .choose(rng)
                .copied()
                .unwrap_or(Expression::Sleep);
            outcome
                .effects
                .push(Effect::AnimationBool(anim::SLEEPING, true));
            outcome.effects.push(Effect::ShowExpression(expression));
        }
        None
    }
}

impl Default for CreatureBrain {
    fn default() -> Self {
        Self::new(CreatureTuning::default())
    }
}
