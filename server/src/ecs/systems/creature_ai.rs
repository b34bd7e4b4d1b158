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

//! Authoritative creature behavior system

use crate::ecs::capabilities::{Navigator, PointSampler, PresentationSink};
use crate::ecs::components::{
    CreatureBrain, CreatureSignals, Effect, EmotionScheduler, FULL_WEIGHT, Face, NetworkIdentity,
    Presentation, Replica, SensorFrame, Transform,
};
use crate::ecs::events::{CreatureEvent, EventBus};
use crate::ecs::{EcsEntity, Entity, GameWorld};
use crate::replication::ReplicationChannel;
use minimotes_common::ReplicationMessage;
use rand::RngCore;

pub struct CreatureAiSystem {
    event_bus: EventBus,
}

impl CreatureAiSystem {
    /// Create a new creature AI system
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Evaluate every creature brain once
    ///
    /// Must only run on the authority. Each genuine transition is broadcast on
    /// `channel`. Returns the number of transitions made.
    pub fn update(
        &mut self,
        world: &mut GameWorld,
        delta_time: f32,
        level: &dyn PointSampler,
        channel: &mut dyn ReplicationChannel,
        rng: &mut dyn RngCore,
    ) -> usize {
        let creatures: Vec<(EcsEntity, Option<EcsEntity>)> = world
            .query::<(Entity, &CreatureBrain)>()
            .iter()
            .map(|(entity, brain)| (entity, brain.target()))
            .collect();

        let mut transitions = 0;
        for (entity, target) in creatures {
            let has_target = match target {
                Some(target) if world.contains(target) => true,
                Some(_) => {
                    self.forget_target(world, entity);
                    false
                }
                None => false,
            };

            let Ok((brain, signals, transform, identity, replica)) = world.query_one_mut::<(
                &mut CreatureBrain,
                &CreatureSignals,
                &Transform,
                &NetworkIdentity,
                &mut Replica,
            )>(entity) else {
                continue;
            };

            let sensors = SensorFrame {
                grabbed: signals.grabbed,
                in_haul: signals.in_haul,
                has_target,
                position: transform.position,
            };
            let from = brain.state();
            let outcome = brain.tick(delta_time, &sensors, level, rng);
            let broadcast = outcome.transition.map(|to| {
                ReplicationMessage::state_changed(identity.id(), replica.next_state_revision(), to)
            });

            self.apply_effects(world, entity, outcome.effects, rng);

            let (Some(to), Some(message)) = (outcome.transition, broadcast) else {
                continue;
            };
            transitions += 1;
            tracing::debug!("Creature {} {} -> {}", message.entity, from, to);
            metrics::counter!("creature_state_transitions_total", "to" => to.as_str()).increment(1);
            if let Err(e) = channel.broadcast(message) {
                tracing::warn!("Failed to broadcast transition of {}: {}", message.entity, e);
            }
            self.event_bus
                .publish(CreatureEvent::StateChanged { entity, from, to });
        }
        transitions
    }

    /// Drop a target whose entity no longer exists
    fn forget_target(&self, world: &mut GameWorld, entity: EcsEntity) {
        if let Ok(mut brain) = world.get::<&mut CreatureBrain>(entity) {
            brain.set_target(None);
        }
        tracing::debug!("Creature {:?} lost its target", entity);
        self.event_bus.publish(CreatureEvent::TargetLost { entity });
    }

    fn apply_effects(
        &self,
        world: &mut GameWorld,
        entity: EcsEntity,
        effects: Vec<Effect>,
        rng: &mut dyn RngCore,
    ) {
        if effects.is_empty() {
            return;
        }
        let Ok((face, scheduler, sink, navigator)) = world.query_one_mut::<(
            &mut Face,
            &mut EmotionScheduler,
            &mut Presentation,
            &mut Navigator,
        )>(entity) else {
            tracing::warn!("Creature {:?} is missing presentation or navigation", entity);
            return;
        };

        for effect in effects {
            match effect {
                Effect::ShowExpression(expression) => {
                    scheduler.cancel();
                    face.show(&mut *sink, expression, FULL_WEIGHT);
                    self.event_bus
                        .publish(CreatureEvent::ExpressionShown { entity, expression });
                }
                Effect::StartTimeline(timeline) => scheduler.start(timeline, face, &mut *sink, rng),
                Effect::CancelTimeline => scheduler.cancel(),
                Effect::AnimationTrigger(name) => sink.set_animation_trigger(name),
                Effect::AnimationBool(name, value) => sink.set_animation_bool(name, value),
                Effect::SetDestination(point) => navigator.set_destination(point),
                Effect::EnableNavigation => navigator.enable(),
                Effect::DisableNavigation(duration) => navigator.disable(duration),
                Effect::FleeAborted => {
                    tracing::debug!("Creature {:?} found nowhere to flee", entity);
                    metrics::counter!("creature_flee_aborted_total").increment(1);
                    self.event_bus.publish(CreatureEvent::FleeAborted { entity });
                }
            }
        }
    }
}
