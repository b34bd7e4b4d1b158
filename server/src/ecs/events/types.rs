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

//! Event type definitions

use crate::ecs::EcsEntity;
use crate::ecs::components::Expression;
use glam::Vec3;
use minimotes_common::{CreatureState, PlayerId};
use serde::{Deserialize, Serialize};

/// Everything observable about a creature's life on one node
///
/// Events carry node-local `EcsEntity` handles. They are runtime
/// notifications and never leave the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CreatureEvent {
    // Lifecycle
    Spawned {
        entity: EcsEntity,
        position: Vec3,
    },
    Placed {
        entity: EcsEntity,
        position: Vec3,
    },
    PlacementFailed {
        entity: EcsEntity,
    },

    // Behavior
    StateChanged {
        entity: EcsEntity,
        from: CreatureState,
        to: CreatureState,
    },
    TargetAssigned {
        entity: EcsEntity,
        player: PlayerId,
    },
    TargetLost {
        entity: EcsEntity,
    },
    FleeAborted {
        entity: EcsEntity,
    },

    // Presentation
    ExpressionShown {
        entity: EcsEntity,
        expression: Expression,
    },
    Hurt {
        entity: EcsEntity,
    },
}

impl CreatureEvent {
    /// Creature the event is about
    pub fn entity(&self) -> EcsEntity {
        match self {
            CreatureEvent::Spawned { entity, .. }
            | CreatureEvent::Placed { entity, .. }
            | CreatureEvent::PlacementFailed { entity }
            | CreatureEvent::StateChanged { entity, .. }
            | CreatureEvent::TargetAssigned { entity, .. }
            | CreatureEvent::TargetLost { entity }
            | CreatureEvent::FleeAborted { entity }
            | CreatureEvent::ExpressionShown { entity, .. }
            | CreatureEvent::Hurt { entity } => *entity,
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            CreatureEvent::Spawned { .. } => "spawned",
            CreatureEvent::Placed { .. } => "placed",
            CreatureEvent::PlacementFailed { .. } => "placement_failed",
            CreatureEvent::StateChanged { .. } => "state_changed",
            CreatureEvent::TargetAssigned { .. } => "target_assigned",
            CreatureEvent::TargetLost { .. } => "target_lost",
            CreatureEvent::FleeAborted { .. } => "flee_aborted",
            CreatureEvent::ExpressionShown { .. } => "expression_shown",
            CreatureEvent::Hurt { .. } => "hurt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;

    #[test]
    fn test_event_serialization() {
        let mut world = World::new();
        let entity = world.spawn(());
        let event = CreatureEvent::StateChanged {
            entity,
            from: CreatureState::Flee,
            to: CreatureState::Grabbed,
        };

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: CreatureEvent = serde_json::from_str(&json).unwrap();

        match deserialized {
            CreatureEvent::StateChanged { from, to, .. } => {
                assert_eq!(from, CreatureState::Flee);
                assert_eq!(to, CreatureState::Grabbed);
            }
            _ => panic!("Wrong event type"),
        }
        assert_eq!(event.entity(), entity);
        assert_eq!(event.kind(), "state_changed");
    }
}
