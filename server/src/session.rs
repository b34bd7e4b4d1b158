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

//! Multi-node simulation session
//!
//! A session wires several `WorldContext`s to one replication medium, spawns
//! the same creatures and players on each, and feeds them a timed stimulus
//! script. Node 0 is the authority.

use crate::config::Configuration;
use crate::ecs::capabilities::StaticLevel;
use crate::ecs::context::{NodeSettings, WorldContext};
use crate::replication::{LocalChannel, LoopbackHub, ReplicationChannel, ReplicationError};
use glam::Vec3;
use minimotes_common::{CreatureState, NetworkId, PlayerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use uuid::Uuid;

/// External signal injected by the script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusKind {
    /// Vision sensor reports `player`
    Spot,
    Grab,
    Release,
    EnterHaul,
    LeaveHaul,
    Hurt,
    /// `player` leaves the session
    DespawnPlayer,
}

/// One scripted stimulus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedStimulus {
    /// Session time in seconds
    pub at: f32,
    pub action: StimulusKind,
    /// Player id for `spot` and `despawn_player`
    #[serde(default)]
    pub player: Option<u32>,
    /// Index of the creature in spawn order
    #[serde(default)]
    pub creature: usize,
}

impl ScriptedStimulus {
    pub fn new(at: f32, action: StimulusKind) -> Self {
        Self {
            at,
            action,
            player: None,
            creature: 0,
        }
    }

    pub fn with_player(mut self, player: u32) -> Self {
        self.player = Some(player);
        self
    }

    pub fn on_creature(mut self, creature: usize) -> Self {
        self.creature = creature;
        self
    }

    pub fn validate(&self, creatures: usize) -> Result<(), String> {
        if !self.at.is_finite() || self.at < 0.0 {
            return Err(format!("Stimulus time must be non-negative, got {}", self.at));
        }
        if self.creature >= creatures {
            return Err(format!(
                "Stimulus at {}s targets creature {} but only {} exist",
                self.at, self.creature, creatures
            ));
        }
        let needs_player = matches!(self.action, StimulusKind::Spot | StimulusKind::DespawnPlayer);
        if needs_player && self.player.is_none() {
            return Err(format!("Stimulus {:?} at {}s needs a player", self.action, self.at));
        }
        Ok(())
    }
}

/// Stimuli waiting for their time
#[derive(Debug, Clone, Default)]
pub struct StimulusScript {
    pending: VecDeque<ScriptedStimulus>,
}

impl StimulusScript {
    /// Build a script, ordering stimuli by time and keeping ties in the given order
    pub fn new(mut stimuli: Vec<ScriptedStimulus>) -> Self {
        stimuli.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self {
            pending: stimuli.into(),
        }
    }

    /// Remove and return every stimulus due at or before `elapsed`
    pub fn due(&mut self, elapsed: f32) -> Vec<ScriptedStimulus> {
        const EPSILON: f32 = 1e-4;
        let mut due = Vec::new();
        while self
            .pending
            .front()
            .is_some_and(|stimulus| stimulus.at <= elapsed + EPSILON)
        {
            due.extend(self.pending.pop_front());
        }
        due
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

/// Errors raised while building or driving a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to spawn: {0}")]
    Spawn(String),

    #[error("Invalid stimulus: {0}")]
    Script(String),

    #[error(transparent)]
    Replication(#[from] ReplicationError),
}

/// Everything needed to set up a session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub nodes: usize,
    pub creatures: usize,
    pub players: u32,
    pub settings: NodeSettings,
    pub level: StaticLevel,
    pub spawn_points: Vec<Vec3>,
    pub duplicate_rate: f64,
    pub reorder: bool,
    pub script: Vec<ScriptedStimulus>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            nodes: 1,
            creatures: 1,
            players: 1,
            settings: NodeSettings::default(),
            level: StaticLevel::default(),
            spawn_points: Vec::new(),
            duplicate_rate: 0.0,
            reorder: false,
            script: Vec::new(),
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &Configuration) -> Self {
        let simulation = &config.simulation;
        Self {
            nodes: simulation.nodes.count(),
            creatures: simulation.creatures.count(),
            players: simulation.players.count(),
            settings: NodeSettings {
                tuning: config.creature.clone(),
                presentation: config.presentation.clone(),
                seed: *simulation.seed,
            },
            level: config.level.to_level(),
            spawn_points: config.level.spawn_points.clone(),
            duplicate_rate: *simulation.duplicate_rate,
            reorder: *simulation.reorder,
            script: config.script.clone(),
        }
    }
}

/// Several nodes simulating the same creatures
pub struct Session {
    hub: Option<LoopbackHub>,
    nodes: Vec<WorldContext>,
    creatures: Vec<NetworkId>,
    players: Vec<PlayerId>,
    script: StimulusScript,
    elapsed: f32,
}

impl Session {
    pub fn from_config(config: &Configuration) -> Result<Self, SessionError> {
        Self::new(SessionOptions::from_config(config))
    }

    /// Create the nodes and populate each with identical creatures and players
    pub fn new(options: SessionOptions) -> Result<Self, SessionError> {
        if options.nodes == 0 {
            return Err(SessionError::Spawn("A session needs at least one node".to_string()));
        }
        for stimulus in &options.script {
            stimulus.validate(options.creatures).map_err(SessionError::Script)?;
        }

        let seed = options.settings.seed;
        let hub = (options.nodes > 1)
            .then(|| LoopbackHub::new(options.duplicate_rate, options.reorder, seed));

        let mut id_rng = StdRng::seed_from_u64(seed);
        let creatures: Vec<NetworkId> = (0..options.creatures)
            .map(|_| NetworkId::from_uuid(Uuid::from_u128(id_rng.random())))
            .collect();
        let players: Vec<PlayerId> = (1..=options.players).map(PlayerId).collect();

        let mut nodes = Vec::with_capacity(options.nodes);
        for index in 0..options.nodes {
            let channel: Box<dyn ReplicationChannel> = match &hub {
                Some(hub) => Box::new(hub.connect()),
                None => Box::new(LocalChannel::new()),
            };
            let settings = NodeSettings {
                seed: seed.wrapping_add(index as u64),
                ..options.settings.clone()
            };
            let mut node = WorldContext::new(channel, Box::new(options.level.clone()), settings);

            for (slot, id) in creatures.iter().enumerate() {
                let position = options
                    .spawn_points
                    .get(slot % options.spawn_points.len().max(1))
                    .copied()
                    .unwrap_or(Vec3::ZERO);
                node.spawn_creature(*id, &format!("Mote {}", slot), position)
                    .map_err(SessionError::Spawn)?;
            }
            for player in &players {
                let position = Vec3::new(5.0 * player.0 as f32, 0.0, 5.0);
                node.spawn_player(*player, position)
                    .map_err(SessionError::Spawn)?;
            }
            nodes.push(node);
        }

        tracing::info!(
            "Session ready with {} node(s), {} creature(s) and {} player(s)",
            nodes.len(),
            creatures.len(),
            players.len()
        );

        Ok(Self {
            hub,
            nodes,
            creatures,
            players,
            script: StimulusScript::new(options.script),
            elapsed: 0.0,
        })
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn nodes(&self) -> &[WorldContext] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&WorldContext> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut WorldContext> {
        self.nodes.get_mut(index)
    }

    /// The node driving creature behavior
    pub fn authority(&self) -> &WorldContext {
        &self.nodes[0]
    }

    pub fn creatures(&self) -> &[NetworkId] {
        &self.creatures
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// Stimuli not yet delivered
    pub fn pending_stimuli(&self) -> usize {
        self.script.remaining()
    }

    /// Replication deliveries made so far, duplicates included
    pub fn deliveries(&self) -> u64 {
        self.hub.as_ref().map_or(0, LoopbackHub::delivered)
    }

    /// Deliver due stimuli, then step every node, the authority first
    pub fn step(&mut self, delta_time: f32) {
        for stimulus in self.script.due(self.elapsed) {
            if let Err(e) = self.apply(&stimulus) {
                tracing::warn!("Stimulus {:?} at {}s failed: {}", stimulus.action, stimulus.at, e);
            }
        }
        for node in &mut self.nodes {
            node.step(delta_time);
        }
        self.elapsed += delta_time;
    }

    /// Step until `duration` seconds have elapsed
    pub fn run_for(&mut self, duration: f32, delta_time: f32) {
        let end = self.elapsed + duration;
        while self.elapsed + delta_time * 0.5 < end {
            self.step(delta_time);
        }
    }

    /// Deliver one stimulus to every node
    pub fn apply(&mut self, stimulus: &ScriptedStimulus) -> Result<(), SessionError> {
        let id = *self
            .creatures
            .get(stimulus.creature)
            .ok_or_else(|| SessionError::Script(format!("No creature {}", stimulus.creature)))?;
        let player = stimulus.player.map(PlayerId);
        tracing::debug!("t={:.2}s {:?} on {}", self.elapsed, stimulus.action, id);

        for node in &mut self.nodes {
            match (stimulus.action, player) {
                (StimulusKind::Spot, Some(player)) => {
                    node.on_vision(id, player)?;
                }
                (StimulusKind::Grab, _) => node.set_grabbed(id, true)?,
                (StimulusKind::Release, _) => node.set_grabbed(id, false)?,
                (StimulusKind::EnterHaul, _) => node.set_in_haul(id, true)?,
                (StimulusKind::LeaveHaul, _) => node.set_in_haul(id, false)?,
                (StimulusKind::Hurt, _) => node.on_hurt(id)?,
                (StimulusKind::DespawnPlayer, Some(player)) => {
                    node.despawn_player(player);
                }
                (action, None) => {
                    return Err(SessionError::Script(format!("{:?} needs a player", action)));
                }
            }
        }
        Ok(())
    }

    /// State of a creature on every node, in node order
    pub fn states(&self, creature: usize) -> Vec<Option<CreatureState>> {
        let Some(id) = self.creatures.get(creature) else {
            return Vec::new();
        };
        self.nodes.iter().map(|node| node.state_of(*id)).collect()
    }

    /// Whether every node agrees on every creature's state and target
    pub fn converged(&self) -> bool {
        let Some((authority, observers)) = self.nodes.split_first() else {
            return true;
        };
        self.creatures.iter().all(|id| {
            let state = authority.state_of(*id);
            let target = authority.target_of(*id);
            observers
                .iter()
                .all(|node| node.state_of(*id) == state && node.target_of(*id) == target)
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("nodes", &self.nodes.len())
            .field("creatures", &self.creatures)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}
