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

//! Shared creature types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discrete behavior state of a creature.
///
/// Exactly one value is current per creature. It starts at `Idle`, is changed
/// only by the authoritative node and is replicated verbatim to every observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureState {
    #[default]
    Idle,
    Grabbed,
    Notice,
    Stashed,
    Flee,
}

impl CreatureState {
    pub const ALL: [CreatureState; 5] = [
        CreatureState::Idle,
        CreatureState::Grabbed,
        CreatureState::Notice,
        CreatureState::Stashed,
        CreatureState::Flee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreatureState::Idle => "Idle",
            CreatureState::Grabbed => "Grabbed",
            CreatureState::Notice => "Notice",
            CreatureState::Stashed => "Stashed",
            CreatureState::Flee => "Flee",
        }
    }
}

impl std::fmt::Display for CreatureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network-wide identifier of a replicated entity
///
/// Every node spawns its own runtime handle for the same creature; this id is
/// what the nodes agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(pub Uuid);

impl NetworkId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player reference as carried on the wire (a view id, resolved per node)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player#{}", self.0)
    }
}
