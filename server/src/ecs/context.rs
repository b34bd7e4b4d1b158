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

//! Per-node simulation context

use crate::ecs::capabilities::PointSampler;
use crate::ecs::components::{
    CreatureBrain, CreatureSignals, CreatureTuning, EmotionScheduler, EmotionTimeline, Face,
    HurtPulse, NetworkIdentity, Player, Presentation, Replica, Transform,
};
use crate::ecs::creature_builder::CreatureBuilder;
use crate::ecs::events::{CreatureEvent, EventBus};
use crate::ecs::systems::{
    CreatureAiSystem, NavigationSystem, PlacementSystem, PresentationSettings, PresentationSystem,
};
use crate::ecs::{EcsEntity, EntityRegistry, GameWorld, PlayerRoster};
use crate::replication::{Applied, ReplicationChannel, ReplicationError, apply_message};
use glam::Vec3;
use minimotes_common::{CreatureState, NetworkId, PlayerId, ReplicationMessage};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Settings shared by every creature simulated on a node
#[derive(Debug, Clone, Default)]
pub struct NodeSettings {
    pub tuning: CreatureTuning,
    pub presentation: PresentationSettings,
    pub seed: u64,
}

/// One node's copy of the simulation
///
/// Owns the ECS world, the identity registries, the level collaborator and the
/// node's replication endpoint. The context is advanced synchronously by
/// [`WorldContext::step`]; nothing in it blocks or suspends.
///
/// # Stepping
///
/// 1. Apply everything the channel delivered since the last step
/// 2. On the authority, evaluate every creature brain and broadcast transitions
/// 3. Apply again, so the authority's own echoes are consumed in the same step
/// 4. Run placement, navigation and presentation, which every node runs
/// 5. Deliver queued events to subscribers
///
/// # Sensor Inputs
///
/// - `on_vision()` - A player entered a creature's detection range
/// - `set_grabbed()` / `set_in_haul()` - Carry and storage signals
/// - `on_hurt()` - A damage event reached this node
pub struct WorldContext {
    world: GameWorld,
    registry: EntityRegistry,
    roster: PlayerRoster,
    level: Box<dyn PointSampler>,
    channel: Box<dyn ReplicationChannel>,
    event_bus: EventBus,
    rng: StdRng,
    tuning: CreatureTuning,
    ai: CreatureAiSystem,
    navigation: NavigationSystem,
    placement: PlacementSystem,
    presentation: PresentationSystem,
    elapsed: f32,
}

impl WorldContext {
    /// Create a context on top of a replication endpoint and a level
    pub fn new(
        channel: Box<dyn ReplicationChannel>,
        level: Box<dyn PointSampler>,
        settings: NodeSettings,
    ) -> Self {
        let event_bus = EventBus::new();
        Self {
            world: GameWorld::new(),
            registry: EntityRegistry::new(),
            roster: PlayerRoster::new(),
            level,
            channel,
            rng: StdRng::seed_from_u64(settings.seed),
            tuning: settings.tuning,
            ai: CreatureAiSystem::new(event_bus.clone()),
            navigation: NavigationSystem::new(),
            placement: PlacementSystem::new(event_bus.clone()),
            presentation: PresentationSystem::new(settings.presentation),
            event_bus,
            elapsed: 0.0,
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut GameWorld {
        &mut self.world
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn roster(&self) -> &PlayerRoster {
        &self.roster
    }

    /// Event bus; clones share the same queue and subscribers
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn is_authority(&self) -> bool {
        self.channel.is_authority()
    }

    /// Simulated seconds since the context was created
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Local handle of a replicated creature
    pub fn creature(&self, id: NetworkId) -> Option<EcsEntity> {
        self.registry.get_entity(id)
    }

    /// Current behavior state of a creature
    pub fn state_of(&self, id: NetworkId) -> Option<CreatureState> {
        let entity = self.registry.get_entity(id)?;
        let brain = self.world.get::<&CreatureBrain>(entity).ok()?;
        Some(brain.state())
    }

    /// Player a creature is currently targeting, if it still resolves
    pub fn target_of(&self, id: NetworkId) -> Option<PlayerId> {
        let entity = self.registry.get_entity(id)?;
        let target = self.world.get::<&CreatureBrain>(entity).ok()?.target()?;
        self.roster.player_of(target)
    }

    /// Snapshot of a creature's presentation record
    pub fn presentation_of(&self, id: NetworkId) -> Option<Presentation> {
        let entity = self.registry.get_entity(id)?;
        let presentation = self.world.get::<&Presentation>(entity).ok()?;
        Some((*presentation).clone())
    }

    pub fn position_of(&self, id: NetworkId) -> Option<Vec3> {
        let entity = self.registry.get_entity(id)?;
        Some(self.world.get::<&Transform>(entity).ok()?.position)
    }

    // ============================================================================
    // Population
    // ============================================================================

    /// Spawn a creature using this node's tuning
    pub fn spawn_creature(
        &mut self,
        id: NetworkId,
        name: &str,
        position: Vec3,
    ) -> Result<EcsEntity, String> {
        let settings = self.presentation.settings();
        let mut builder = CreatureBuilder::new(name)
            .with_id(id)
            .at(position)
            .with_tuning(self.tuning.clone())
            .with_surfaces(settings.hurt_surfaces.clone());
        builder.hurt_rate = settings.hurt_rate;
        builder.spring_speed = settings.spring_speed;
        builder.spring_damping = settings.spring_damping;

        let entity = builder.spawn(&mut self.world, &mut self.registry, self.level.as_ref())?;
        tracing::info!("Spawned creature {} ({}) at {}", name, id, position);
        self.event_bus
            .publish(CreatureEvent::Spawned { entity, position });
        Ok(entity)
    }

    /// Spawn a player avatar and add it to the roster
    pub fn spawn_player(&mut self, id: PlayerId, position: Vec3) -> Result<EcsEntity, String> {
        if self.roster.resolve(id).is_some() {
            return Err(format!("{} is already on the roster", id));
        }
        let entity = self.world.spawn((Player::new(id), Transform::new(position)));
        self.roster.join(id, entity)?;
        tracing::debug!("{} joined at {}", id, position);
        Ok(entity)
    }

    /// Remove a player; creatures targeting it lose the target on their next tick
    pub fn despawn_player(&mut self, id: PlayerId) -> bool {
        let Some(entity) = self.roster.leave(id) else {
            return false;
        };
        if let Err(e) = self.world.despawn(entity) {
            tracing::warn!("{} was on the roster but not in the world: {}", id, e);
        }
        tracing::debug!("{} left", id);
        true
    }

    // ============================================================================
    // Sensor Inputs
    // ============================================================================

    /// Report that a creature's vision sensor detected `player`
    ///
    /// Only the authority acts on detections: it broadcasts the assignment and
    /// every node, itself included, stores it when the message is applied.
    /// Returns whether a broadcast was made.
    pub fn on_vision(&mut self, id: NetworkId, player: PlayerId) -> Result<bool, ReplicationError> {
        if !self.channel.is_authority() {
            return Ok(false);
        }
        let entity = self
            .registry
            .get_entity(id)
            .ok_or(ReplicationError::UnknownEntity(id))?;
        let target = self
            .roster
            .resolve(player)
            .ok_or(ReplicationError::UnknownPlayer(player))?;
        let (brain, replica) = self
            .world
            .query_one_mut::<(&CreatureBrain, &mut Replica)>(entity)
            .map_err(|_| ReplicationError::NotACreature(id))?;
        if brain.target() == Some(target) {
            return Ok(false);
        }

        let message = ReplicationMessage::target_assigned(id, replica.next_target_revision(), player);
        self.channel.broadcast(message)?;
        tracing::debug!("Creature {} spotted {}", id, player);
        Ok(true)
    }

    /// Set whether a creature is currently being carried
    pub fn set_grabbed(&mut self, id: NetworkId, grabbed: bool) -> Result<(), ReplicationError> {
        self.signals_mut(id, |signals| signals.grabbed = grabbed)
    }

    /// Set whether a creature is currently inside the haul set
    pub fn set_in_haul(&mut self, id: NetworkId, in_haul: bool) -> Result<(), ReplicationError> {
        self.signals_mut(id, |signals| signals.in_haul = in_haul)
    }

    fn signals_mut(
        &mut self,
        id: NetworkId,
        update: impl FnOnce(&mut CreatureSignals),
    ) -> Result<(), ReplicationError> {
        let entity = self
            .registry
            .get_entity(id)
            .ok_or(ReplicationError::UnknownEntity(id))?;
        let mut signals = self
            .world
            .get::<&mut CreatureSignals>(entity)
            .map_err(|_| ReplicationError::NotACreature(id))?;
        update(&mut signals);
        Ok(())
    }

    /// Play the hurt reaction: the overlay pulse and the hurt emotion timeline
    ///
    /// Purely local; every node receiving the damage event calls this itself.
    pub fn on_hurt(&mut self, id: NetworkId) -> Result<(), ReplicationError> {
        let entity = self
            .registry
            .get_entity(id)
            .ok_or(ReplicationError::UnknownEntity(id))?;
        let (brain, pulse, scheduler, face, sink) = self
            .world
            .query_one_mut::<(
                &CreatureBrain,
                &mut HurtPulse,
                &mut EmotionScheduler,
                &mut Face,
                &mut Presentation,
            )>(entity)
            .map_err(|_| ReplicationError::NotACreature(id))?;

        let tuning = brain.tuning();
        pulse.trigger();
        scheduler.start(
            EmotionTimeline::hurt(tuning.hurt_flinch, tuning.hurt_sulk),
            face,
            sink,
            &mut self.rng,
        );
        self.event_bus.publish(CreatureEvent::Hurt { entity });
        Ok(())
    }

    // ============================================================================
    // Stepping
    // ============================================================================

    /// Advance the node by `delta_time` seconds
    pub fn step(&mut self, delta_time: f32) {
        self.pump();
        if self.channel.is_authority() {
            self.ai.update(
                &mut self.world,
                delta_time,
                self.level.as_ref(),
                self.channel.as_mut(),
                &mut self.rng,
            );
            self.pump();
        }
        self.placement
            .update(&mut self.world, delta_time, self.level.as_ref());
        self.navigation.update(&mut self.world, delta_time);
        self.presentation
            .update(&mut self.world, delta_time, &mut self.rng);
        self.event_bus.process_events();
        self.elapsed += delta_time;
    }

    /// Apply every message the channel has delivered, returning how many changed something
    pub fn pump(&mut self) -> usize {
        let mut changed = 0;
        for message in self.channel.receive() {
            let kind = message.payload.kind();
            match apply_message(&mut self.world, &self.registry, &self.roster, &message) {
                Ok(Applied::State { entity, from, to }) => {
                    changed += 1;
                    metrics::counter!("replication_messages_applied_total", "kind" => kind).increment(1);
                    tracing::trace!("Applied {} -> {} to {}", from, to, message.entity);
                    self.event_bus
                        .publish(CreatureEvent::StateChanged { entity, from, to });
                }
                Ok(Applied::Target { entity, player, .. }) => {
                    changed += 1;
                    metrics::counter!("replication_messages_applied_total", "kind" => kind).increment(1);
                    self.event_bus
                        .publish(CreatureEvent::TargetAssigned { entity, player });
                }
                Ok(Applied::Unchanged) | Ok(Applied::Stale) => {
                    tracing::trace!("Ignored redundant {} for {}", kind, message.entity);
                }
                Err(e) => {
                    metrics::counter!("replication_messages_dropped_total").increment(1);
                    tracing::warn!("Dropped {} message: {}", kind, e);
                }
            }
        }
        changed
    }

    /// Creatures whose network identity is registered on this node
    pub fn creature_ids(&self) -> Vec<NetworkId> {
        let mut ids: Vec<NetworkId> = self
            .world
            .query::<&NetworkIdentity>()
            .iter()
            .map(|identity| identity.id())
            .collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for WorldContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldContext")
            .field("authority", &self.channel.is_authority())
            .field("entities", &self.world.len())
            .field("players", &self.roster.len())
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}
