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

//! Minimotes Server Library
//!
//! Headless simulation host for Minimotes creatures. Each participating node
//! owns a `WorldContext`; exactly one node is the authority that evaluates the
//! creature state machine, the others mirror its replicated decisions and run
//! the cosmetic subsystems locally.

pub mod config;
pub mod ecs;
pub mod replication;
pub mod session;

pub use ecs::context::WorldContext;
pub use session::Session;
