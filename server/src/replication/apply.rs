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

//! Applying received replication messages to the local world

use super::ReplicationError;
use crate::ecs::components::{CreatureBrain, Replica};
use crate::ecs::{EcsEntity, EntityRegistry, GameWorld, PlayerRoster};
use minimotes_common::{CreatureState, PlayerId, ReplicationMessage, ReplicationPayload};

/// What applying a message changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    State {
        entity: EcsEntity,
        from: CreatureState,
        to: CreatureState,
    },
    Target {
        entity: EcsEntity,
        player: PlayerId,
        target: EcsEntity,
    },
    /// Already in effect; nothing to do
    Unchanged,
    /// Older than a revision already applied
    Stale,
}

/// Apply one replicated message by direct assignment
///
/// Used identically on the authority, for its own echoes, and on observers.
/// Re-applying a message is a no-op.
///
/// # Returns
/// * `Err(ReplicationError::UnknownEntity)` if the creature is not spawned here
/// * `Err(ReplicationError::UnknownPlayer)` if a target cannot be resolved
///   against the local roster
pub fn apply_message(
    world: &mut GameWorld,
    registry: &EntityRegistry,
    roster: &PlayerRoster,
    message: &ReplicationMessage,
) -> Result<Applied, ReplicationError> {
    let entity = registry
        .get_entity(message.entity)
        .ok_or(ReplicationError::UnknownEntity(message.entity))?;
    let (brain, replica) = world
        .query_one_mut::<(&mut CreatureBrain, &mut Replica)>(entity)
        .map_err(|_| ReplicationError::NotACreature(message.entity))?;

    match message.payload {
        ReplicationPayload::StateChanged(state) => {
            if !replica.accept_state(message.revision) {
                return Ok(Applied::Stale);
            }
            Ok(match brain.apply_replicated(state) {
                Some(from) => Applied::State {
                    entity,
                    from,
                    to: state,
                },
                None => Applied::Unchanged,
            })
        }
        ReplicationPayload::TargetAssigned(player) => {
            let target = roster
                .resolve(player)
                .ok_or(ReplicationError::UnknownPlayer(player))?;
            if !replica.accept_target(message.revision) {
                return Ok(Applied::Stale);
            }
            Ok(if brain.set_target(Some(target)) {
                Applied::Target {
                    entity,
                    player,
                    target,
                }
            } else {
                Applied::Unchanged
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::test_utils::{spawn_test_creature, spawn_test_player};
    use minimotes_common::NetworkId;

    struct Fixture {
        world: GameWorld,
        registry: EntityRegistry,
        roster: PlayerRoster,
        creature: EcsEntity,
        id: NetworkId,
    }

    fn fixture() -> Fixture {
        let mut world = GameWorld::new();
        let mut registry = EntityRegistry::new();
        let mut roster = PlayerRoster::new();
        let (creature, id) = spawn_test_creature(&mut world, &mut registry);
        spawn_test_player(&mut world, &mut roster, PlayerId(1));
        Fixture {
            world,
            registry,
            roster,
            creature,
            id,
        }
    }

    fn state_of(fixture: &Fixture) -> CreatureState {
        fixture
            .world
            .get::<&CreatureBrain>(fixture.creature)
            .unwrap()
            .state()
    }

    #[test]
    fn test_state_applies_and_repeats_are_noops() {
        let mut f = fixture();
        let message = ReplicationMessage::state_changed(f.id, 1, CreatureState::Flee);

        let first = apply_message(&mut f.world, &f.registry, &f.roster, &message).unwrap();
        assert_eq!(
            first,
            Applied::State {
                entity: f.creature,
                from: CreatureState::Idle,
                to: CreatureState::Flee
            }
        );
        assert_eq!(state_of(&f), CreatureState::Flee);

        let second = apply_message(&mut f.world, &f.registry, &f.roster, &message).unwrap();
        assert_eq!(second, Applied::Unchanged);
        assert_eq!(state_of(&f), CreatureState::Flee);
    }

    #[test]
    fn test_state_overwrites_whatever_was_there() {
        let mut f = fixture();
        for (revision, state) in [CreatureState::Stashed, CreatureState::Notice, CreatureState::Idle]
            .into_iter()
            .enumerate()
        {
            let message = ReplicationMessage::state_changed(f.id, revision as u64 + 1, state);
            apply_message(&mut f.world, &f.registry, &f.roster, &message).unwrap();
            assert_eq!(state_of(&f), state);
        }
    }

    #[test]
    fn test_stale_state_is_skipped() {
        let mut f = fixture();
        let newer = ReplicationMessage::state_changed(f.id, 2, CreatureState::Flee);
        let older = ReplicationMessage::state_changed(f.id, 1, CreatureState::Notice);

        apply_message(&mut f.world, &f.registry, &f.roster, &newer).unwrap();
        let result = apply_message(&mut f.world, &f.registry, &f.roster, &older).unwrap();
        assert_eq!(result, Applied::Stale);
        assert_eq!(state_of(&f), CreatureState::Flee);
    }

    #[test]
    fn test_target_resolves_against_roster() {
        let mut f = fixture();
        let player = f.roster.resolve(PlayerId(1)).unwrap();
        let message = ReplicationMessage::target_assigned(f.id, 1, PlayerId(1));

        let applied = apply_message(&mut f.world, &f.registry, &f.roster, &message).unwrap();
        assert_eq!(
            applied,
            Applied::Target {
                entity: f.creature,
                player: PlayerId(1),
                target: player
            }
        );
        let brain = f.world.get::<&CreatureBrain>(f.creature).unwrap();
        assert_eq!(brain.target(), Some(player));
    }

    #[test]
    fn test_unknown_player_is_an_error() {
        let mut f = fixture();
        let message = ReplicationMessage::target_assigned(f.id, 1, PlayerId(9));
        let result = apply_message(&mut f.world, &f.registry, &f.roster, &message);
        assert!(matches!(result, Err(ReplicationError::UnknownPlayer(PlayerId(9)))));

        // The failed attempt did not consume the revision
        let replica = f.world.get::<&Replica>(f.creature).unwrap();
        assert_eq!(replica.target_revision(), 0);
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        let mut f = fixture();
        let stranger = NetworkId::new();
        let message = ReplicationMessage::state_changed(stranger, 1, CreatureState::Flee);
        let result = apply_message(&mut f.world, &f.registry, &f.roster, &message);
        assert!(matches!(result, Err(ReplicationError::UnknownEntity(id)) if id == stranger));
    }

    #[test]
    fn test_non_creature_is_an_error() {
        let mut f = fixture();
        let id = NetworkId::new();
        let rock = f.world.spawn(());
        f.registry.register(rock, id).unwrap();
        let message = ReplicationMessage::state_changed(id, 1, CreatureState::Flee);
        let result = apply_message(&mut f.world, &f.registry, &f.roster, &message);
        assert!(matches!(result, Err(ReplicationError::NotACreature(_))));
    }
}
