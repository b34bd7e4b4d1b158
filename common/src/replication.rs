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

//! Replication envelope exchanged between the authority and its observers
//!
//! The authority broadcasts one message per genuine state transition and one per
//! newly detected player. Delivery is at-least-once with no ordering guarantee,
//! so receivers apply payloads by direct assignment. Each message carries the
//! authority's per-entity revision so a receiver can drop a stale payload that
//! arrives after a newer one.

use crate::creature::{CreatureState, NetworkId, PlayerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Replicated payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicationPayload {
    /// The authority moved the creature into a new state
    StateChanged(CreatureState),
    /// The authority's vision sensor reported a player
    TargetAssigned(PlayerId),
}

impl ReplicationPayload {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ReplicationPayload::StateChanged(_) => "state_changed",
            ReplicationPayload::TargetAssigned(_) => "target_assigned",
        }
    }
}

/// A payload addressed to one replicated entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationMessage {
    pub entity: NetworkId,
    /// Monotonic per entity and payload kind, stamped by the authority
    pub revision: u64,
    pub payload: ReplicationPayload,
}

impl ReplicationMessage {
    pub fn state_changed(entity: NetworkId, revision: u64, state: CreatureState) -> Self {
        Self {
            entity,
            revision,
            payload: ReplicationPayload::StateChanged(state),
        }
    }

    pub fn target_assigned(entity: NetworkId, revision: u64, player: PlayerId) -> Self {
        Self {
            entity,
            revision,
            payload: ReplicationPayload::TargetAssigned(player),
        }
    }

    /// Encode the message for transport
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a message received from transport
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Errors raised while moving messages through a byte transport.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes were not a valid replication message.
    #[error("Malformed replication message: {0}")]
    Malformed(#[from] serde_json::Error),
}
