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

//! Identity components for replicated entities and players

use minimotes_common::{NetworkId, PlayerId};
use serde::{Deserialize, Serialize};

/// Network identity shared by every node's copy of a replicated entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkIdentity(pub NetworkId);

impl NetworkIdentity {
    pub fn id(&self) -> NetworkId {
        self.0
    }
}

/// Last replication revisions stamped or accepted for an entity
///
/// The authority stamps outgoing messages from here; every node uses the same
/// counters to ignore a payload older than one it has already applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replica {
    state_revision: u64,
    target_revision: u64,
}

impl Replica {
    pub fn state_revision(&self) -> u64 {
        self.state_revision
    }

    pub fn target_revision(&self) -> u64 {
        self.target_revision
    }

    /// Stamp a new state transition
    pub fn next_state_revision(&mut self) -> u64 {
        self.state_revision += 1;
        self.state_revision
    }

    /// Stamp a new target assignment
    pub fn next_target_revision(&mut self) -> u64 {
        self.target_revision += 1;
        self.target_revision
    }

    /// Record `revision` unless a newer state has already been applied
    pub fn accept_state(&mut self, revision: u64) -> bool {
        accept(&mut self.state_revision, revision)
    }

    /// Record `revision` unless a newer target has already been applied
    pub fn accept_target(&mut self, revision: u64) -> bool {
        accept(&mut self.target_revision, revision)
    }
}

fn accept(current: &mut u64, revision: u64) -> bool {
    if revision < *current {
        return false;
    }
    *current = revision;
    true
}

/// Marks an entity as a player avatar known to this node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self { id }
    }
}

/// Display name, used in logs only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
