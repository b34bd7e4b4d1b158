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

//! Deferred delivery of creature events
//!
//! Systems publish while they hold world borrows; handlers only run when the
//! context drains the queue at the end of a step.

use super::types::CreatureEvent;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

type Handler = Box<dyn Fn(&CreatureEvent) + Send + Sync>;

#[derive(Default)]
struct Shared {
    handlers: RwLock<Vec<Handler>>,
    pending: Mutex<Vec<CreatureEvent>>,
}

/// Queue of creature events plus the handlers they fan out to
///
/// Clones share both the queue and the handler list.
#[derive(Clone, Default)]
pub struct EventBus {
    shared: Arc<Shared>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler that sees every event drained after this call
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&CreatureEvent) + Send + Sync + 'static,
    {
        self.shared
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(handler));
    }

    pub fn publish(&self, event: CreatureEvent) {
        self.pending().push(event);
    }

    /// Hand every queued event to every handler, returning how many were drained
    ///
    /// Events published by a handler wait for the next call.
    pub fn process_events(&self) -> usize {
        let events = std::mem::take(&mut *self.pending());
        let handlers = self.shared.handlers.read().unwrap_or_else(PoisonError::into_inner);
        for event in &events {
            metrics::counter!("creature_events_total", "kind" => event.kind()).increment(1);
            handlers.iter().for_each(|handler| handler(event));
        }
        events.len()
    }

    pub fn queue_len(&self) -> usize {
        self.pending().len()
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Vec<CreatureEvent>> {
        self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("queued", &self.queue_len())
            .finish_non_exhaustive()
    }
}
