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

//! Replication channel contract and the single-participant channel

use super::ReplicationError;
use minimotes_common::ReplicationMessage;
use std::collections::VecDeque;

/// Broadcast transport between the nodes simulating one creature population
///
/// Delivery is at-least-once to every node including the sender, in no
/// particular order.
#[cfg_attr(test, mockall::automock)]
pub trait ReplicationChannel: Send {
    /// Whether this node drives creature behavior
    fn is_authority(&self) -> bool;

    /// Send `message` to every node, this one included
    fn broadcast(&mut self, message: ReplicationMessage) -> Result<(), ReplicationError>;

    /// Drain everything delivered to this node since the last call
    fn receive(&mut self) -> Vec<ReplicationMessage>;
}

/// Channel for a single participant with no network
///
/// Broadcasts loop straight back to the local inbox so a solo node applies its
/// own transitions through the same path a networked node does.
#[derive(Debug, Default)]
pub struct LocalChannel {
    inbox: VecDeque<ReplicationMessage>,
}

impl LocalChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.inbox.len()
    }
}

impl ReplicationChannel for LocalChannel {
    fn is_authority(&self) -> bool {
        true
    }

    fn broadcast(&mut self, message: ReplicationMessage) -> Result<(), ReplicationError> {
        self.inbox.push_back(message);
        Ok(())
    }

    fn receive(&mut self) -> Vec<ReplicationMessage> {
        self.inbox.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minimotes_common::{CreatureState, NetworkId};

    #[test]
    fn test_local_channel_loops_back_in_order() {
        let mut channel = LocalChannel::new();
        let id = NetworkId::new();
        assert!(channel.is_authority());

        channel
            .broadcast(ReplicationMessage::state_changed(id, 1, CreatureState::Notice))
            .unwrap();
        channel
            .broadcast(ReplicationMessage::state_changed(id, 2, CreatureState::Flee))
            .unwrap();
        assert_eq!(channel.pending(), 2);

        let received = channel.receive();
        assert_eq!(received.len(), 2);
        assert_eq!(received[1].revision, 2);
        assert!(channel.receive().is_empty());
    }
}
