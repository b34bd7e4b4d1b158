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

//! Authority and replication layer
//!
//! Exactly one node, the authority, evaluates creature behavior. Every genuine
//! transition and every newly detected player is broadcast as a
//! `ReplicationMessage`; all nodes, the authority included, feed what they
//! receive through [`apply_message`]. Application is a direct assignment, so
//! duplicates are harmless and a stale revision is skipped.

mod apply;
mod channel;
mod loopback;

pub use apply::{Applied, apply_message};
pub use channel::{LocalChannel, ReplicationChannel};
pub use loopback::{LoopbackHub, NetworkChannel};

#[cfg(test)]
pub use channel::MockReplicationChannel;

use minimotes_common::{CodecError, NetworkId, PlayerId};
use thiserror::Error;

/// Errors raised by the replication layer
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// Message could not be encoded or decoded
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Only the authority may broadcast
    #[error("Node {node} is not the authority")]
    NotAuthority { node: usize },

    /// No local entity carries this network id
    #[error("Unknown replicated entity {0}")]
    UnknownEntity(NetworkId),

    /// The entity exists but is not a creature
    #[error("Entity {0} has no creature brain")]
    NotACreature(NetworkId),

    /// The referenced player is not on this node's roster
    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),
}
