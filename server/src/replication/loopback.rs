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

//! In-process broadcast hub connecting several simulated nodes
//!
//! Messages travel as encoded bytes over unbounded channels, one per node. The
//! hub can duplicate deliveries and each node can shuffle what it drains, which
//! is enough to exercise at-least-once, unordered delivery without a network.

use super::{ReplicationChannel, ReplicationError};
use minimotes_common::ReplicationMessage;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

struct HubState {
    peers: Vec<mpsc::UnboundedSender<Vec<u8>>>,
    duplicate_rate: f64,
    reorder: bool,
    seed: u64,
    rng: StdRng,
    delivered: u64,
}

/// Shared broadcast medium; the first node to connect is the authority
#[derive(Clone)]
pub struct LoopbackHub {
    state: Arc<Mutex<HubState>>,
}

impl LoopbackHub {
    /// Create a hub
    ///
    /// # Arguments
    /// * `duplicate_rate` - Chance in `0..=1` that a delivery is sent twice
    /// * `reorder` - Whether nodes shuffle each batch they drain
    /// * `seed` - Seed for the duplication and shuffle decisions
    pub fn new(duplicate_rate: f64, reorder: bool, seed: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                peers: Vec::new(),
                duplicate_rate: duplicate_rate.clamp(0.0, 1.0),
                reorder,
                seed,
                rng: StdRng::seed_from_u64(seed),
                delivered: 0,
            })),
        }
    }

    /// Attach a new node
    pub fn connect(&self) -> NetworkChannel {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let node = state.peers.len();
        state.peers.push(sender);
        tracing::debug!("Node {} joined the replication hub", node);
        NetworkChannel {
            node,
            hub: self.clone(),
            inbox: receiver,
            reorder: state.reorder,
            rng: StdRng::seed_from_u64(state.seed.wrapping_add(node as u64 + 1)),
        }
    }

    pub fn node_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .peers
            .len()
    }

    /// Total deliveries pushed to node inboxes, duplicates included
    pub fn delivered(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .delivered
    }

    fn fan_out(&self, bytes: Vec<u8>) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;
        let mut delivered = 0;
        for index in 0..state.peers.len() {
            let copies = if state.rng.random_bool(state.duplicate_rate) {
                2
            } else {
                1
            };
            for _ in 0..copies {
                if state.peers[index].send(bytes.clone()).is_ok() {
                    delivered += 1;
                } else {
                    tracing::trace!("Node {} has disconnected, skipping delivery", index);
                }
            }
        }
        state.delivered += delivered;
    }
}

impl std::fmt::Debug for LoopbackHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackHub")
            .field("nodes", &self.node_count())
            .field("delivered", &self.delivered())
            .finish()
    }
}

/// One node's endpoint on a [`LoopbackHub`]
pub struct NetworkChannel {
    node: usize,
    hub: LoopbackHub,
    inbox: mpsc::UnboundedReceiver<Vec<u8>>,
    reorder: bool,
    rng: StdRng,
}

impl NetworkChannel {
    /// Index of this node on the hub
    pub fn node(&self) -> usize {
        self.node
    }
}

impl ReplicationChannel for NetworkChannel {
    fn is_authority(&self) -> bool {
        self.node == 0
    }

    fn broadcast(&mut self, message: ReplicationMessage) -> Result<(), ReplicationError> {
        if !self.is_authority() {
            return Err(ReplicationError::NotAuthority { node: self.node });
        }
        let bytes = message.encode()?;
        self.hub.fan_out(bytes);
        Ok(())
    }

    fn receive(&mut self) -> Vec<ReplicationMessage> {
        let mut batch = Vec::new();
        while let Ok(bytes) = self.inbox.try_recv() {
            batch.push(bytes);
        }
        if self.reorder {
            batch.shuffle(&mut self.rng);
        }
        batch
            .into_iter()
            .filter_map(|bytes| match ReplicationMessage::decode(&bytes) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!("Node {} dropped a replication message: {}", self.node, e);
                    metrics::counter!("replication_messages_dropped_total").increment(1);
                    None
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for NetworkChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkChannel")
            .field("node", &self.node)
            .field("reorder", &self.reorder)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minimotes_common::{CreatureState, NetworkId};

    #[test]
    fn test_first_node_is_authority() {
        let hub = LoopbackHub::new(0.0, false, 1);
        let authority = hub.connect();
        let observer = hub.connect();

        assert!(authority.is_authority());
        assert!(!observer.is_authority());
        assert_eq!(observer.node(), 1);
        assert_eq!(hub.node_count(), 2);
    }

    #[test]
    fn test_broadcast_reaches_every_node() {
        let hub = LoopbackHub::new(0.0, false, 2);
        let mut authority = hub.connect();
        let mut observer = hub.connect();
        let message = ReplicationMessage::state_changed(NetworkId::new(), 1, CreatureState::Notice);

        authority.broadcast(message).unwrap();

        assert_eq!(authority.receive(), vec![message]);
        assert_eq!(observer.receive(), vec![message]);
        assert_eq!(hub.delivered(), 2);
    }

    #[test]
    fn test_observer_cannot_broadcast() {
        let hub = LoopbackHub::new(0.0, false, 3);
        let _authority = hub.connect();
        let mut observer = hub.connect();
        let message = ReplicationMessage::state_changed(NetworkId::new(), 1, CreatureState::Flee);

        let result = observer.broadcast(message);
        assert!(matches!(result, Err(ReplicationError::NotAuthority { node: 1 })));
        assert_eq!(hub.delivered(), 0);
    }

    #[test]
    fn test_full_duplication() {
        let hub = LoopbackHub::new(1.0, true, 4);
        let mut authority = hub.connect();
        let mut observer = hub.connect();
        let id = NetworkId::new();

        for revision in 1..=3 {
            authority
                .broadcast(ReplicationMessage::state_changed(id, revision, CreatureState::Idle))
                .unwrap();
        }

        let mut received = observer.receive();
        assert_eq!(received.len(), 6);
        received.sort_by_key(|message| message.revision);
        assert_eq!(received[0].revision, 1);
        assert_eq!(received[5].revision, 3);
        assert_eq!(authority.receive().len(), 6);
    }

    #[test]
    fn test_dropped_node_does_not_block_broadcast() {
        let hub = LoopbackHub::new(0.0, false, 5);
        let mut authority = hub.connect();
        drop(hub.connect());

        let message = ReplicationMessage::state_changed(NetworkId::new(), 1, CreatureState::Stashed);
        authority.broadcast(message).unwrap();
        assert_eq!(authority.receive(), vec![message]);
        assert_eq!(hub.delivered(), 1);
    }
}
