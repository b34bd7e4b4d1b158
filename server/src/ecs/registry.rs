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

//! Registries mapping shared identifiers to node-local ECS handles
//!
//! Every node spawns its own copy of each creature and player, so `hecs`
//! handles differ between nodes. Replication messages therefore name
//! creatures by `NetworkId` and players by `PlayerId`, and each node resolves
//! them here:
//! - `EntityRegistry`: `NetworkId` <-> `EcsEntity` for replicated creatures
//! - `PlayerRoster`: `PlayerId` <-> `EcsEntity` for known players

use crate::ecs::EcsEntity;
use minimotes_common::{NetworkId, PlayerId};
use std::collections::HashMap;

/// Registry for mapping between ECS entities and network identities
#[derive(Debug, Default)]
pub struct EntityRegistry {
    /// Map from network id to ECS entity handle
    id_to_entity: HashMap<NetworkId, EcsEntity>,

    /// Map from ECS entity handle to network id
    entity_to_id: HashMap<EcsEntity, NetworkId>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            id_to_entity: HashMap::new(),
            entity_to_id: HashMap::new(),
        }
    }

    /// Register a mapping between an ECS entity and its network id
    ///
    /// # Arguments
    /// * `entity` - The ECS runtime entity handle
    /// * `id` - The identity shared by every node
    ///
    /// # Returns
    /// * `Ok(())` if registration succeeded
    /// * `Err(String)` if either the entity or the id is already registered
    pub fn register(&mut self, entity: EcsEntity, id: NetworkId) -> Result<(), String> {
        if self.entity_to_id.contains_key(&entity) {
            return Err(format!("Entity {:?} is already registered", entity));
        }
        if self.id_to_entity.contains_key(&id) {
            return Err(format!("Network id {} is already registered", id));
        }

        self.id_to_entity.insert(id, entity);
        self.entity_to_id.insert(entity, id);

        Ok(())
    }

    /// Unregister an entity by its ECS handle, returning its network id
    pub fn unregister_entity(&mut self, entity: EcsEntity) -> Option<NetworkId> {
        let id = self.entity_to_id.remove(&entity)?;
        self.id_to_entity.remove(&id);
        Some(id)
    }

    /// Unregister an entity by its network id, returning its handle
    pub fn unregister_id(&mut self, id: NetworkId) -> Option<EcsEntity> {
        let entity = self.id_to_entity.remove(&id)?;
        self.entity_to_id.remove(&entity);
        Some(entity)
    }

    /// Look up an ECS entity by its network id
    pub fn get_entity(&self, id: NetworkId) -> Option<EcsEntity> {
        self.id_to_entity.get(&id).copied()
    }

    /// Look up the network id of an ECS entity
    pub fn get_id(&self, entity: EcsEntity) -> Option<NetworkId> {
        self.entity_to_id.get(&entity).copied()
    }

    pub fn contains_entity(&self, entity: EcsEntity) -> bool {
        self.entity_to_id.contains_key(&entity)
    }

    pub fn contains_id(&self, id: NetworkId) -> bool {
        self.id_to_entity.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.id_to_entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_entity.is_empty()
    }

    /// Iterate over all registered network ids
    pub fn ids(&self) -> impl Iterator<Item = &NetworkId> {
        self.id_to_entity.keys()
    }
}

/// Players this node knows about
///
/// Targets are stored on creatures as plain entity handles. The roster is the
/// only place that maps a replicated `PlayerId` back to the local handle, so a
/// despawned player simply stops resolving.
#[derive(Debug, Default)]
pub struct PlayerRoster {
    by_id: HashMap<PlayerId, EcsEntity>,
    by_entity: HashMap<EcsEntity, PlayerId>,
}

impl PlayerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player
    ///
    /// # Returns
    /// * `Err(String)` if the player id or the entity is already on the roster
    pub fn join(&mut self, player: PlayerId, entity: EcsEntity) -> Result<(), String> {
        if self.by_id.contains_key(&player) {
            return Err(format!("{} is already on the roster", player));
        }
        if self.by_entity.contains_key(&entity) {
            return Err(format!("Entity {:?} is already on the roster", entity));
        }
        self.by_id.insert(player, entity);
        self.by_entity.insert(entity, player);
        Ok(())
    }

    /// Remove a player, returning the handle it was known by
    pub fn leave(&mut self, player: PlayerId) -> Option<EcsEntity> {
        let entity = self.by_id.remove(&player)?;
        self.by_entity.remove(&entity);
        Some(entity)
    }

    /// Resolve a replicated player reference against this node's roster
    pub fn resolve(&self, player: PlayerId) -> Option<EcsEntity> {
        self.by_id.get(&player).copied()
    }

    /// Player id of a local handle
    pub fn player_of(&self, entity: EcsEntity) -> Option<PlayerId> {
        self.by_entity.get(&entity).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
