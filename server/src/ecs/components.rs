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

//! ECS Components
//!
//! This module contains all component definitions for the simulation world.
//! Components are plain data; the logic that mutates them across ticks lives
//! either on the component itself (timers, filters) or in `systems`.

mod creature;
mod emotion;
mod expression;
mod hurt;
mod identity;
mod placement;
mod presentation;
mod rotation;
mod spatial;

// Re-export all components
pub use creature::*;
pub use emotion::*;
pub use expression::*;
pub use hurt::*;
pub use identity::*;
pub use placement::*;
pub use presentation::*;
pub use rotation::*;
pub use spatial::*;
